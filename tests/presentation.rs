//! Integration tests for theme resolution and presentation synthesis.

use dataviz_studio::config::RenderConfig;
use dataviz_studio::models::{AnalysisResult, KeyMetric, Priority, Recommendation, Trend};
use dataviz_studio::navigation::{NavKey, NavState};
use dataviz_studio::render::{synthesize, FeatureSet, PresentationRequest, SynthesisError};
use dataviz_studio::theme::{resolve_visual, Palette, Theme};

fn full_analysis() -> AnalysisResult {
    AnalysisResult {
        title: "Q3 Business Review".into(),
        subtitle: "Prepared for the board".into(),
        summary: "Revenue grew while churn fell.".into(),
        key_metrics: vec![
            KeyMetric {
                label: "Revenue".into(),
                value: "$1.2M".into(),
                trend: Some(Trend::Up),
            },
            KeyMetric {
                label: "Churn".into(),
                value: "3%".into(),
                trend: Some(Trend::Down),
            },
        ],
        insights: vec!["EMEA outperformed plan".into()],
        recommendations: vec![Recommendation {
            title: "Expand EMEA sales".into(),
            description: "Hire two account executives".into(),
            priority: Priority::High,
        }],
        generated_on: Some("October 16, 2026".into()),
    }
}

#[test]
fn identical_inputs_render_identically() {
    let visual = resolve_visual("corporate", "ocean");
    let a = synthesize(&full_analysis(), &visual, &FeatureSet::all());
    let b = synthesize(&full_analysis(), &visual, &FeatureSet::all());
    assert_eq!(a.html, b.html);
    assert_eq!(a.digest, b.digest);
    assert_eq!(a.size, a.html.len());
}

#[test]
fn every_theme_and_palette_changes_output() {
    let analysis = full_analysis();
    let base = synthesize(&analysis, &resolve_visual("modern", "purple"), &FeatureSet::all());
    for theme in Theme::ALL.iter().skip(1) {
        let other = synthesize(&analysis, &resolve_visual(theme.id(), "purple"), &FeatureSet::all());
        assert_ne!(other.digest, base.digest, "theme {}", theme.id());
    }
    for palette in Palette::ALL.iter().skip(1) {
        let other = synthesize(&analysis, &resolve_visual("modern", palette.id()), &FeatureSet::all());
        assert_ne!(other.digest, base.digest, "palette {}", palette.id());
    }
}

#[test]
fn empty_sections_are_omitted() {
    let analysis = AnalysisResult {
        title: "Sparse".into(),
        insights: vec!["Only an insight".into()],
        ..AnalysisResult::default()
    };
    let doc = synthesize(&analysis, &resolve_visual("minimal", "coral"), &FeatureSet::all());
    assert!(!doc.html.contains("data-section=\"metrics\""));
    assert!(doc.html.contains("data-section=\"insights\""));
    assert!(doc.html.contains("Only an insight"));
    assert!(!doc.html.contains("PRIORITY</span>"));
}

#[test]
fn high_priority_badge() {
    let doc = synthesize(
        &full_analysis(),
        &resolve_visual("vibrant", "sunset"),
        &FeatureSet::all(),
    );
    assert!(doc.html.contains("HIGH PRIORITY"));
    assert!(doc.html.contains("Expand EMEA sales"));
}

#[test]
fn document_is_self_contained() {
    let doc = synthesize(&full_analysis(), &resolve_visual("dark", "midnight"), &FeatureSet::all());
    assert!(!doc.html.contains("src=\"http"));
    assert!(!doc.html.contains("href=\"http"));
    assert!(!doc.html.contains("<link"));
    assert!(doc.html.contains("<style>"));
    assert!(doc.html.contains("<script>"));
    assert!(doc.html.contains("@media print"));
}

#[test]
fn print_layout_hides_controls_and_pages_every_section() {
    let doc = synthesize(&full_analysis(), &resolve_visual("modern", "purple"), &FeatureSet::all());
    let print = &doc.html[doc.html.find("@media print").unwrap()..];
    let print = &print[..print.find("</style>").unwrap()];
    assert!(print.contains(".control-panel, .navigation { display: none"));
    assert!(print.contains(".slide { display: block !important"));
    assert!(print.contains("page-break-after: always"));
}

#[test]
fn user_text_is_escaped() {
    let analysis = AnalysisResult {
        title: "<script>alert(1)</script>".into(),
        insights: vec!["a & b".into()],
        ..AnalysisResult::default()
    };
    let doc = synthesize(&analysis, &resolve_visual("modern", "purple"), &FeatureSet::all());
    assert!(!doc.html.contains("<script>alert(1)</script>"));
    assert!(doc.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(doc.html.contains("a &amp; b"));
}

#[test]
fn request_without_analysis_is_rejected() {
    let request: PresentationRequest =
        serde_json::from_str(r#"{"theme":"dark","selectedFeatures":["bar"]}"#).unwrap();
    assert_eq!(
        request.render(&RenderConfig::default()).unwrap_err(),
        SynthesisError::MissingInput {
            field: "analyzedData"
        }
    );
}

#[test]
fn request_with_unknown_ids_uses_defaults() {
    let request: PresentationRequest = serde_json::from_str(
        r#"{"analyzedData":{"title":"T","insights":["i"]},"theme":"neon","palette":"plaid"}"#,
    )
    .unwrap();
    let rendered = request.render(&RenderConfig::default()).unwrap();
    let expected = synthesize(
        request.analyzed_data.as_ref().unwrap(),
        &resolve_visual("modern", "purple"),
        &FeatureSet::all(),
    );
    assert_eq!(rendered, expected);
}

#[test]
fn navigation_model_walks_rendered_sections() {
    let doc = synthesize(&full_analysis(), &resolve_visual("nature", "forest"), &FeatureSet::all());
    let sections = doc.html.matches("<section class=\"slide").count();
    assert_eq!(sections, 3);

    let mut nav = NavState::new(sections);
    for key in ["ArrowRight", "ArrowRight", "ArrowRight", "PageDown"] {
        nav = nav.apply(NavKey::from_key(key).unwrap());
    }
    assert_eq!(nav.active(), 2);
    for key in ["ArrowLeft", "PageUp", "ArrowLeft"] {
        nav = nav.apply(NavKey::from_key(key).unwrap());
    }
    assert_eq!(nav.active(), 0);
}
