//! Presentation synthesis.
//!
//! [`synthesize`] turns an [`AnalysisResult`] and a [`VisualConfig`] into a
//! single self-contained HTML document: markup, an embedded stylesheet and an
//! embedded navigation script, with no external references. Output is a pure
//! function of the inputs, so identical inputs give byte-identical documents
//! (the SHA-256 digest in [`RenderedDocument`] can be used as a cache key).
//!
//! # Sections
//!
//! | Index | Section | Rendered when |
//! |-------|---------|---------------|
//! | 0 | Overview | always |
//! | 1 | Metrics | `keyMetrics` non-empty and the `metrics` feature enabled |
//! | 2 | Insights & Recommendations | insights or (enabled) recommendations non-empty |
//!
//! Empty sections are omitted, never filled with placeholders; indices are
//! assigned after omission. Exactly one section is visible at a time, with
//! navigation rules identical to [`crate::navigation::NavState`]. Printing
//! shows every section on its own page and hides the controls.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::config::RenderConfig;
use crate::models::{AnalysisResult, KeyMetric, Recommendation, RenderedDocument, Trend};
use crate::navigation::NavKey;
use crate::theme::{resolve_visual, VisualConfig};

/// Colors used for chart segments after the palette's own two.
const CHART_EXTRA_COLORS: [&str; 4] = ["#F4A261", "#2A9D8F", "#E76F51", "#264653"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("missing required input: {field}")]
    MissingInput { field: &'static str },
}

/// Presentation component identifiers selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Expandable,
    Flip,
    Popout,
    TimelineVertical,
    TimelineHorizontal,
    Pie,
    Bar,
    Line,
    Swot,
    Metrics,
    Team,
    Recommendations,
}

impl Feature {
    pub const ALL: [Feature; 12] = [
        Feature::Expandable,
        Feature::Flip,
        Feature::Popout,
        Feature::TimelineVertical,
        Feature::TimelineHorizontal,
        Feature::Pie,
        Feature::Bar,
        Feature::Line,
        Feature::Swot,
        Feature::Metrics,
        Feature::Team,
        Feature::Recommendations,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Feature::Expandable => "expandable",
            Feature::Flip => "flip",
            Feature::Popout => "popout",
            Feature::TimelineVertical => "timeline-vertical",
            Feature::TimelineHorizontal => "timeline-horizontal",
            Feature::Pie => "pie",
            Feature::Bar => "bar",
            Feature::Line => "line",
            Feature::Swot => "swot",
            Feature::Metrics => "metrics",
            Feature::Team => "team",
            Feature::Recommendations => "recommendations",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(id.trim()))
    }
}

/// Selected features. An empty selection enables every feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    /// Builds a set from identifiers, ignoring unknown ones.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            ids.into_iter()
                .filter_map(|id| Feature::parse(id.as_ref()))
                .collect(),
        )
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.0.is_empty() || self.0.contains(&feature)
    }
}

/// Body of the synthesis entry point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequest {
    #[serde(default)]
    pub analyzed_data: Option<AnalysisResult>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub palette: Option<String>,
    #[serde(default)]
    pub selected_features: Option<Vec<String>>,
}

impl PresentationRequest {
    /// Resolves the request against configured defaults and renders it.
    pub fn render(&self, defaults: &RenderConfig) -> Result<RenderedDocument, SynthesisError> {
        let analysis = self
            .analyzed_data
            .as_ref()
            .ok_or(SynthesisError::MissingInput {
                field: "analyzedData",
            })?;
        let visual = resolve_visual(
            self.theme.as_deref().unwrap_or(&defaults.theme),
            self.palette.as_deref().unwrap_or(&defaults.palette),
        );
        let features = match &self.selected_features {
            Some(ids) => FeatureSet::from_ids(ids),
            None => FeatureSet::from_ids(&defaults.features),
        };
        Ok(synthesize(analysis, &visual, &features))
    }
}

struct Section {
    id: &'static str,
    nav_label: &'static str,
    title: &'static str,
    body: String,
}

/// Renders the complete presentation document.
pub fn synthesize(
    analysis: &AnalysisResult,
    visual: &VisualConfig,
    features: &FeatureSet,
) -> RenderedDocument {
    let sections = build_sections(analysis, features);
    debug!(sections = sections.len(), "synthesizing presentation");

    let title = if analysis.title.trim().is_empty() {
        "Untitled Presentation"
    } else {
        analysis.title.as_str()
    };

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(
        html,
        "<meta name=\"generator\" content=\"dataviz-studio {}\">",
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(html, "<title>{}</title>", escape_html(title));
    let _ = writeln!(html, "<style>{}</style>", stylesheet(visual));
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<header class=\"header\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(title));
    if !analysis.subtitle.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"subtitle\">{}</p>",
            escape_html(&analysis.subtitle)
        );
    }
    if let Some(date) = &analysis.generated_on {
        let _ = writeln!(html, "<p class=\"date\">{}</p>", escape_html(date));
    }
    html.push_str("</header>\n");

    html.push_str("<nav class=\"navigation\">\n");
    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(
            html,
            "<button type=\"button\" class=\"nav-btn{}\" data-slide=\"{}\">{}</button>",
            if i == 0 { " active" } else { "" },
            i,
            section.nav_label
        );
    }
    html.push_str("</nav>\n");

    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(
            html,
            "<section class=\"slide{}\" id=\"slide-{}\" data-section=\"{}\">",
            if i == 0 { " active" } else { "" },
            i,
            section.id
        );
        let _ = writeln!(html, "<h2 class=\"slide-title\">{}</h2>", section.title);
        html.push_str(&section.body);
        html.push_str("</section>\n");
    }

    html.push_str(concat!(
        "<div class=\"control-panel\">\n",
        "<button type=\"button\" class=\"control-btn\" data-action=\"prev\">&#9664; Prev</button>\n",
        "<button type=\"button\" class=\"control-btn\" data-action=\"next\">Next &#9654;</button>\n",
        "<button type=\"button\" class=\"control-btn\" data-action=\"print\">Print</button>\n",
        "</div>\n",
    ));
    html.push_str("</div>\n");
    let _ = writeln!(html, "<script>{}</script>", navigation_script());
    html.push_str("</body>\n</html>\n");

    let digest = hex::encode(Sha256::digest(html.as_bytes()));
    RenderedDocument {
        size: html.len(),
        digest,
        html,
    }
}

fn build_sections(analysis: &AnalysisResult, features: &FeatureSet) -> Vec<Section> {
    let mut sections = vec![Section {
        id: "overview",
        nav_label: "Overview",
        title: "Executive Summary",
        body: overview_body(analysis),
    }];

    if features.is_enabled(Feature::Metrics) && !analysis.key_metrics.is_empty() {
        sections.push(Section {
            id: "metrics",
            nav_label: "Metrics",
            title: "Key Metrics",
            body: metrics_body(&analysis.key_metrics, features),
        });
    }

    let recommendations: &[Recommendation] = if features.is_enabled(Feature::Recommendations) {
        &analysis.recommendations
    } else {
        &[]
    };
    if !analysis.insights.is_empty() || !recommendations.is_empty() {
        let mut body = insights_body(&analysis.insights);
        body.push_str(&recommendations_body(
            recommendations,
            features.is_enabled(Feature::Expandable),
        ));
        sections.push(Section {
            id: "insights",
            nav_label: "Insights",
            title: "Insights &amp; Recommendations",
            body,
        });
    }

    sections
}

fn overview_body(analysis: &AnalysisResult) -> String {
    if analysis.summary.trim().is_empty() {
        return String::new();
    }
    format!(
        "<p class=\"summary\">{}</p>\n",
        escape_html(&analysis.summary)
    )
}

fn metrics_body(metrics: &[KeyMetric], features: &FeatureSet) -> String {
    let mut out = String::from("<div class=\"metrics-grid\">\n");
    for metric in metrics {
        let (trend_class, arrow) = match metric.trend {
            Some(Trend::Up) => (" trend-up", "&#9650;"),
            Some(Trend::Down) => (" trend-down", "&#9660;"),
            Some(Trend::Neutral) => (" trend-neutral", "&#9644;"),
            None => ("", ""),
        };
        let _ = write!(
            out,
            "<div class=\"metric-card{}\"><div class=\"metric-value\">{}",
            trend_class,
            escape_html(&metric.value)
        );
        if !arrow.is_empty() {
            let _ = write!(out, " <span class=\"trend\">{}</span>", arrow);
        }
        let _ = writeln!(
            out,
            "</div><div class=\"metric-label\">{}</div></div>",
            escape_html(&metric.label)
        );
    }
    out.push_str("</div>\n");

    let numeric: Vec<(&str, f64)> = metrics
        .iter()
        .filter_map(|m| parse_metric_number(&m.value).map(|v| (m.label.as_str(), v)))
        .filter(|(_, v)| *v > 0.0)
        .collect();

    if features.is_enabled(Feature::Bar) && !numeric.is_empty() {
        out.push_str(&bar_chart(&numeric));
    }
    let total: f64 = numeric.iter().map(|(_, v)| *v).sum();
    if features.is_enabled(Feature::Pie) && numeric.len() >= 2 && total.is_finite() {
        out.push_str(&pie_chart(&numeric));
    }
    out
}

fn bar_chart(values: &[(&str, f64)]) -> String {
    let max = values.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let mut out = String::from("<div class=\"bar-chart\">\n");
    for (i, (label, value)) in values.iter().enumerate() {
        let _ = writeln!(
            out,
            "<div class=\"bar\"><div class=\"bar-fill\" style=\"height: {:.1}%; background: {};\"></div><div class=\"bar-label\">{}</div></div>",
            value / max * 100.0,
            chart_color(i),
            escape_html(label)
        );
    }
    out.push_str("</div>\n");
    out
}

/// `values` must be positive with a finite sum.
fn pie_chart(values: &[(&str, f64)]) -> String {
    let total: f64 = values.iter().map(|(_, v)| *v).sum();
    let mut stops = Vec::with_capacity(values.len());
    let mut legend = String::new();
    let mut start = 0.0_f64;
    for (i, (label, value)) in values.iter().enumerate() {
        let share = value / total * 100.0;
        let end = if i + 1 == values.len() {
            100.0
        } else {
            start + share
        };
        stops.push(format!("{} {:.1}% {:.1}%", chart_color(i), start, end));
        let _ = writeln!(
            legend,
            "<li><span class=\"swatch\" style=\"background: {};\"></span>{} ({:.1}%)</li>",
            chart_color(i),
            escape_html(label),
            share
        );
        start = end;
    }
    format!(
        "<div class=\"pie-wrap\"><div class=\"pie-chart\" style=\"background: conic-gradient({});\"></div>\n<ul class=\"pie-legend\">\n{}</ul></div>\n",
        stops.join(", "),
        legend
    )
}

/// Palette colors come from CSS variables so charts follow the theme.
fn chart_color(index: usize) -> &'static str {
    match index % (CHART_EXTRA_COLORS.len() + 2) {
        0 => "var(--primary)",
        1 => "var(--secondary)",
        n => CHART_EXTRA_COLORS[n - 2],
    }
}

fn insights_body(insights: &[String]) -> String {
    if insights.is_empty() {
        return String::new();
    }
    let mut out = String::from("<h3>Key Insights</h3>\n<ul class=\"insights-list\">\n");
    for insight in insights {
        let _ = writeln!(
            out,
            "<li class=\"insight-item\">{}</li>",
            escape_html(insight)
        );
    }
    out.push_str("</ul>\n");
    out
}

fn recommendations_body(recommendations: &[Recommendation], expandable: bool) -> String {
    if recommendations.is_empty() {
        return String::new();
    }
    let mut out = String::from("<h3>Recommendations</h3>\n<div class=\"recommendations-list\">\n");
    for rec in recommendations {
        let priority = rec.priority.as_str();
        let badge = format!(
            "<span class=\"priority-badge priority-{p}\">{p} PRIORITY</span>",
            p = priority
        );
        if expandable {
            let _ = writeln!(
                out,
                "<details class=\"recommendation-card\"><summary>{} <strong>{}</strong></summary><p>{}</p></details>",
                badge,
                escape_html(&rec.title),
                escape_html(&rec.description)
            );
        } else {
            let _ = writeln!(
                out,
                "<div class=\"recommendation-card\">{}<h4>{}</h4><p>{}</p></div>",
                badge,
                escape_html(&rec.title),
                escape_html(&rec.description)
            );
        }
    }
    out.push_str("</div>\n");
    out
}

/// Parses display values such as `12.5K`, `$2.4M`, `94%` or `+24%`.
pub fn parse_metric_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '%' | '+' | ' '))
        .collect();
    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1e3),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1e6),
        'b' | 'B' => (&cleaned[..cleaned.len() - 1], 1e9),
        _ => (cleaned.as_str(), 1.0),
    };
    let n: f64 = digits.parse().ok()?;
    let v = n * multiplier;
    v.is_finite().then_some(v)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stylesheet(visual: &VisualConfig) -> String {
    STYLESHEET
        .replace("%BACKGROUND%", &visual.background_gradient)
        .replace("%PRIMARY%", &visual.primary_color)
        .replace("%SECONDARY%", &visual.secondary_color)
}

fn js_string_array(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|k| format!("'{}'", k)).collect();
    format!("[{}]", quoted.join(", "))
}

fn navigation_script() -> String {
    NAVIGATION_SCRIPT
        .replace("%FORWARD_KEYS%", &js_string_array(&NavKey::FORWARD_KEYS))
        .replace("%BACKWARD_KEYS%", &js_string_array(&NavKey::BACKWARD_KEYS))
}

const STYLESHEET: &str = r#"
:root { --primary: %PRIMARY%; --secondary: %SECONDARY%; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: %BACKGROUND%; color: #343A40; line-height: 1.6; min-height: 100vh; }
.container { max-width: 1200px; margin: 0 auto; padding: 40px 20px; }
.header { text-align: center; margin-bottom: 50px; color: white; }
.header h1 { font-size: 3rem; margin-bottom: 15px; text-shadow: 0 4px 20px rgba(0,0,0,0.3); }
.subtitle { font-size: 1.3rem; opacity: 0.9; }
.date { font-size: 1rem; opacity: 0.8; margin-top: 10px; }
.navigation { display: flex; gap: 15px; justify-content: center; margin-bottom: 40px; flex-wrap: wrap; }
.nav-btn { background: rgba(255,255,255,0.9); border: 2px solid transparent; padding: 12px 25px; border-radius: 25px; font-size: 1rem; font-weight: 600; cursor: pointer; transition: all 0.3s ease; }
.nav-btn:hover { transform: translateY(-2px); box-shadow: 0 8px 20px rgba(0,0,0,0.2); }
.nav-btn.active { background: var(--primary); color: white; }
.slide { display: none; background: white; border-radius: 20px; padding: 40px; box-shadow: 0 10px 40px rgba(0,0,0,0.2); animation: slideIn 0.5s ease; }
.slide.active { display: block; }
@keyframes slideIn { from { opacity: 0; transform: translateY(20px); } to { opacity: 1; transform: translateY(0); } }
.slide-title { font-size: 2rem; color: var(--primary); margin-bottom: 30px; border-bottom: 3px solid var(--primary); padding-bottom: 15px; }
.slide h3 { margin: 30px 0 20px; }
.summary { font-size: 1.2rem; color: #555; margin-bottom: 30px; line-height: 1.8; }
.metrics-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin: 30px 0; }
.metric-card { background: linear-gradient(135deg, var(--primary), var(--secondary)); color: white; padding: 25px; border-radius: 15px; text-align: center; transition: transform 0.3s ease; }
.metric-card:hover { transform: translateY(-5px); box-shadow: 0 15px 35px rgba(0,0,0,0.2); }
.metric-value { font-size: 3rem; font-weight: bold; margin-bottom: 10px; }
.metric-label { font-size: 1.2rem; opacity: 0.9; }
.trend { font-size: 1.2rem; vertical-align: middle; }
.trend-up .trend { color: #C8F7C5; }
.trend-down .trend { color: #FFD1D1; }
.bar-chart { display: flex; align-items: flex-end; gap: 16px; height: 260px; margin: 30px 0; padding: 10px; border-bottom: 2px solid #dee2e6; }
.bar { flex: 1; display: flex; flex-direction: column; justify-content: flex-end; height: 100%; text-align: center; }
.bar-fill { border-radius: 8px 8px 0 0; min-height: 2px; }
.bar-label { font-size: 0.85rem; margin-top: 6px; }
.pie-wrap { display: flex; align-items: center; gap: 30px; margin: 30px 0; flex-wrap: wrap; }
.pie-chart { width: 220px; height: 220px; border-radius: 50%; }
.pie-legend { list-style: none; }
.pie-legend li { margin-bottom: 6px; }
.swatch { display: inline-block; width: 12px; height: 12px; border-radius: 3px; margin-right: 8px; }
.insights-list { list-style: none; padding: 0; }
.insight-item, .recommendation-card { background: #f5f7fa; padding: 20px; margin-bottom: 15px; border-radius: 12px; border-left: 5px solid var(--primary); }
.recommendation-card h4 { margin: 10px 0; }
details.recommendation-card summary { cursor: pointer; }
details.recommendation-card p { margin-top: 10px; }
.priority-badge { display: inline-block; padding: 4px 12px; border-radius: 12px; font-size: 0.8rem; font-weight: bold; margin-bottom: 10px; }
.priority-HIGH { background: #D32F2F; color: white; }
.priority-MEDIUM { background: #F57C00; color: white; }
.priority-LOW { background: #388E3C; color: white; }
.control-panel { position: fixed; bottom: 20px; right: 20px; background: rgba(255,255,255,0.95); border-radius: 15px; padding: 10px; box-shadow: 0 8px 25px rgba(0,0,0,0.15); display: flex; flex-direction: column; gap: 8px; z-index: 1000; }
.control-btn { background: var(--primary); color: white; border: none; padding: 10px 15px; border-radius: 8px; cursor: pointer; transition: all 0.3s ease; font-weight: 500; }
.control-btn:hover { background: var(--secondary); transform: scale(1.05); }
@media (max-width: 768px) {
  .header h1 { font-size: 2rem; }
  .metrics-grid { grid-template-columns: 1fr; }
  .control-panel { bottom: 10px; right: 10px; left: 10px; flex-direction: row; justify-content: center; }
}
@media print {
  body { background: white; }
  .header { color: #343A40; }
  .control-panel, .navigation { display: none !important; }
  .slide { display: block !important; box-shadow: none; animation: none; page-break-after: always; break-after: page; }
}
"#;

const NAVIGATION_SCRIPT: &str = r#"
(function () {
  var slides = document.querySelectorAll('.slide');
  var navBtns = document.querySelectorAll('.nav-btn');
  var forwardKeys = %FORWARD_KEYS%;
  var backwardKeys = %BACKWARD_KEYS%;
  var current = 0;

  function showSlide(index) {
    if (index < 0 || index >= slides.length) return;
    for (var i = 0; i < slides.length; i++) {
      slides[i].classList.toggle('active', i === index);
      navBtns[i].classList.toggle('active', i === index);
    }
    current = index;
    window.scrollTo({ top: 0, behavior: 'smooth' });
  }

  function nextSlide() {
    if (current < slides.length - 1) showSlide(current + 1);
  }

  function prevSlide() {
    if (current > 0) showSlide(current - 1);
  }

  for (var i = 0; i < navBtns.length; i++) {
    navBtns[i].addEventListener('click', function (e) {
      showSlide(parseInt(e.currentTarget.getAttribute('data-slide'), 10));
    });
  }

  var actions = { prev: prevSlide, next: nextSlide, print: function () { window.print(); } };
  var controls = document.querySelectorAll('.control-btn');
  for (var j = 0; j < controls.length; j++) {
    controls[j].addEventListener('click', function (e) {
      actions[e.currentTarget.getAttribute('data-action')]();
    });
  }

  document.addEventListener('keydown', function (e) {
    if (forwardKeys.indexOf(e.key) !== -1) {
      e.preventDefault();
      nextSlide();
    } else if (backwardKeys.indexOf(e.key) !== -1) {
      e.preventDefault();
      prevSlide();
    }
  });
})();
"#;
