//! Core data models used throughout DataViz Studio.
//!
//! These types represent the uploaded files, their normalized extraction
//! results, and the analysis/presentation values that flow from the
//! ingestion pipeline into the synthesizer.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Raw uploaded file before adapter dispatch.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub declared_extension: String,
}

impl RawFile {
    /// Creates a raw file, inferring the extension from the last `.` segment
    /// of the name. A name without a dot has an empty extension.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let declared_extension = extension_of(&name);
        Self {
            name,
            bytes,
            declared_extension,
        }
    }

    /// Creates a raw file with an explicitly declared extension.
    pub fn with_extension(
        name: impl Into<String>,
        bytes: Vec<u8>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_extension: extension.into(),
        }
    }
}

/// Lowercased extension after the final `.`, or empty.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Source format tag carried by every [`ExtractedDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Excel,
    Csv,
    Pdf,
    Word,
    PowerPoint,
    Json,
    Unsupported,
}

impl SourceFormat {
    /// Case-insensitive match against the fixed extension set.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xlsx" | "xls" => SourceFormat::Excel,
            "csv" => SourceFormat::Csv,
            "pdf" => SourceFormat::Pdf,
            "docx" | "doc" => SourceFormat::Word,
            "pptx" | "ppt" => SourceFormat::PowerPoint,
            "json" => SourceFormat::Json,
            _ => SourceFormat::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Excel => "excel",
            SourceFormat::Csv => "csv",
            SourceFormat::Pdf => "pdf",
            SourceFormat::Word => "word",
            SourceFormat::PowerPoint => "powerpoint",
            SourceFormat::Json => "json",
            SourceFormat::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

/// One worksheet: its name and its rows, in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

/// All sheets of a workbook in workbook order.
///
/// Serializes as a JSON object keyed by sheet name, preserving order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Serialize for Workbook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for sheet in &self.sheets {
            map.serialize_entry(&sheet.name, &sheet.rows)?;
        }
        map.end()
    }
}

/// Text-only PDF extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PdfText {
    pub text: String,
    pub num_pages: usize,
    pub info: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Raw text of a word-processing document plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct WordText {
    pub text: String,
    pub messages: Vec<String>,
}

/// Per-slide text of a slide deck.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlideDeck {
    pub slides: Vec<String>,
    pub slide_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlideDeck {
    /// An empty deck flagged with an error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            slides: Vec::new(),
            slide_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Format-specific intermediate representation produced by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Representation {
    Spreadsheet(Workbook),
    Delimited(Vec<Vec<String>>),
    Pdf(PdfText),
    Word(WordText),
    SlideDeck(SlideDeck),
    Structured(serde_json::Value),
    Unsupported { message: String },
    /// Placeholder used when extraction failed outright.
    Empty,
}

/// Canonical per-file extraction result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub filename: String,
    #[serde(rename = "fileType")]
    pub source_format: SourceFormat,
    #[serde(rename = "data")]
    pub representation: Representation,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl ExtractedDocument {
    pub fn is_ok(&self) -> bool {
        self.extraction_error.is_none()
    }

    /// Non-fatal partial-extraction warnings carried by the representation.
    pub fn warnings(&self) -> Vec<&str> {
        match &self.representation {
            Representation::Pdf(pdf) => pdf.warnings.iter().map(String::as_str).collect(),
            Representation::Word(word) => word.messages.iter().map(String::as_str).collect(),
            Representation::SlideDeck(deck) => deck.error.as_deref().into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Trend direction of a key metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Narrative analysis of an ingested batch, consumed by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, alias = "metrics")]
    pub key_metrics: Vec<KeyMetric>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// Human-readable date shown under the subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_on: Option<String>,
}

/// Final synthesized HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    /// Length of `html` in bytes.
    pub size: usize,
    /// Hex-encoded SHA-256 of `html`.
    pub digest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_inferred_and_lowercased() {
        assert_eq!(RawFile::new("Report.XLSX", vec![]).declared_extension, "xlsx");
        assert_eq!(RawFile::new("archive.tar.gz", vec![]).declared_extension, "gz");
        assert_eq!(RawFile::new("README", vec![]).declared_extension, "");
    }

    #[test]
    fn format_from_extension_covers_fixed_set() {
        assert_eq!(SourceFormat::from_extension("XLS"), SourceFormat::Excel);
        assert_eq!(SourceFormat::from_extension(".docx"), SourceFormat::Word);
        assert_eq!(SourceFormat::from_extension("ppt"), SourceFormat::PowerPoint);
        assert_eq!(SourceFormat::from_extension("txt"), SourceFormat::Unsupported);
    }

    #[test]
    fn workbook_serializes_in_sheet_order() {
        let wb = Workbook {
            sheets: vec![
                Sheet {
                    name: "Zeta".into(),
                    rows: vec![vec![CellValue::Text("a".into()), CellValue::Number(1.5)]],
                },
                Sheet {
                    name: "Alpha".into(),
                    rows: vec![vec![CellValue::Blank, CellValue::Bool(true)]],
                },
            ],
        };
        let json = serde_json::to_string(&wb).unwrap();
        assert_eq!(json, r#"{"Zeta":[["a",1.5]],"Alpha":[[null,true]]}"#);
    }

    #[test]
    fn analysis_accepts_metrics_alias_and_missing_fields() {
        let json = r#"{"title":"T","metrics":[{"label":"Rows","value":"12","trend":"up"}]}"#;
        let a: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(a.key_metrics.len(), 1);
        assert_eq!(a.key_metrics[0].trend, Some(Trend::Up));
        assert!(a.insights.is_empty());
        assert!(a.recommendations.is_empty());
    }

    #[test]
    fn priority_parses_uppercase() {
        let r: Recommendation =
            serde_json::from_str(r#"{"title":"t","description":"d","priority":"HIGH"}"#).unwrap();
        assert_eq!(r.priority, Priority::High);
    }
}
