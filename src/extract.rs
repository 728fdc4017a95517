//! Format adapters: raw bytes to format-specific representations.
//!
//! Dispatch is keyed by [`SourceFormat`], derived from the file extension.
//! Spreadsheets go through `calamine`, delimited text through `csv`, PDFs
//! through `lopdf` (structure) and `pdf-extract` (text), and the OOXML word
//! and slide formats are read directly from their ZIP containers with
//! `quick-xml`.
//!
//! PDF, Word and slide-deck extraction recover partially where the format
//! allows it: problems are reported in the representation's warning or error
//! fields. Buffers that cannot be read at all produce an [`ExtractError`].

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use quick_xml::events::Event;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CellValue, PdfText, Representation, Sheet, SlideDeck, SourceFormat, WordText, Workbook,
};

/// Maximum sheets to read from one workbook.
const MAX_SHEETS: usize = 100;
/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;
/// Delimiters considered when sniffing delimited text.
const CSV_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
/// Compound File Binary signature used by legacy `.doc`, `.xls` and `.ppt`.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extraction failure for one file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },
    #[error("spreadsheet extraction failed: {0}")]
    Spreadsheet(String),
    #[error("CSV extraction failed: {0}")]
    Csv(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// True when the caller sent something this system does not accept,
    /// as opposed to a supported file that failed to parse.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExtractError::UnsupportedFormat { .. })
    }
}

/// Parses `bytes` according to the format implied by `extension`.
pub fn extract(bytes: &[u8], extension: &str) -> Result<Representation, ExtractError> {
    let format = SourceFormat::from_extension(extension);
    debug!(format = %format, len = bytes.len(), "extracting");
    match format {
        SourceFormat::Excel => extract_spreadsheet(bytes).map(Representation::Spreadsheet),
        SourceFormat::Csv => extract_delimited(bytes).map(Representation::Delimited),
        SourceFormat::Pdf => extract_pdf(bytes).map(Representation::Pdf),
        SourceFormat::Word => extract_word(bytes).map(Representation::Word),
        SourceFormat::PowerPoint => Ok(Representation::SlideDeck(extract_slides(bytes))),
        SourceFormat::Json => extract_json(bytes).map(Representation::Structured),
        SourceFormat::Unsupported => Err(ExtractError::UnsupportedFormat {
            extension: extension.to_string(),
        }),
    }
}

// ============ Spreadsheet ============

/// Reads every sheet of a legacy or zip-based workbook as raw rows.
pub fn extract_spreadsheet(bytes: &[u8]) -> Result<Workbook, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().into_iter().take(MAX_SHEETS) {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Spreadsheet(format!("sheet '{}': {}", name, e)))?;

        // calamine trims the range to the first used cell; re-anchor at A1.
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<CellValue>> = (0..row_offset).map(|_| Vec::new()).collect();
        for row in range.rows() {
            let mut cells = vec![CellValue::Blank; col_offset as usize];
            cells.extend(row.iter().map(cell_value));
            rows.push(cells);
        }
        sheets.push(Sheet { name, rows });
    }

    Ok(Workbook { sheets })
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Blank,
    }
}

// ============ Delimited text ============

/// Parses delimited text into rows of string fields. No header is assumed.
pub fn extract_delimited(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractError> {
    let content = String::from_utf8_lossy(bytes);
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::Csv(e.to_string()))?;
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Picks the candidate delimiter occurring most often, outside quotes, on the
/// first non-empty line. Comma wins ties and the no-match case.
fn detect_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();

    let mut counts = [0usize; CSV_DELIMITERS.len()];
    let mut in_quotes = false;
    for b in first_line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(idx) = CSV_DELIMITERS.iter().position(|d| *d == b) {
                counts[idx] += 1;
            }
        }
    }

    let mut best = 0;
    for (idx, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = idx;
        }
    }
    CSV_DELIMITERS[best]
}

// ============ PDF ============

/// Extracts full text, page count, the `/Info` dictionary and basic metadata.
pub fn extract_pdf(bytes: &[u8]) -> Result<PdfText, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut result = PdfText {
        num_pages: doc.get_pages().len(),
        info: pdf_info(&doc),
        ..PdfText::default()
    };

    result.metadata.insert("version".to_string(), doc.version.clone());
    result
        .metadata
        .insert("encrypted".to_string(), doc.is_encrypted().to_string());
    if let Some(xmp) = pdf_xmp_packet(&doc) {
        result.metadata.insert("xmp".to_string(), xmp);
    }

    // pdf-extract panics on some malformed content streams.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => result.text = text,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF text extraction failed; keeping structure only");
            result.warnings.push(format!("text extraction failed: {}", e));
        }
        Err(_) => {
            warn!("PDF text extractor panicked; keeping structure only");
            result
                .warnings
                .push("text extraction aborted on malformed content".to_string());
        }
    }

    Ok(result)
}

fn pdf_info(doc: &lopdf::Document) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    let Ok(obj) = doc.trailer.get(b"Info") else {
        return info;
    };
    let Ok((_, obj)) = doc.dereference(obj) else {
        return info;
    };
    let Ok(dict) = obj.as_dict() else {
        return info;
    };
    for (key, value) in dict.iter() {
        if let Some(text) = pdf_object_text(value) {
            info.insert(String::from_utf8_lossy(key).into_owned(), text);
        }
    }
    info
}

fn pdf_object_text(obj: &lopdf::Object) -> Option<String> {
    match obj {
        lopdf::Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        lopdf::Object::Integer(i) => Some(i.to_string()),
        lopdf::Object::Real(r) => Some(r.to_string()),
        lopdf::Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text strings are UTF-16BE when BOM-prefixed, otherwise treated as Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn pdf_xmp_packet(doc: &lopdf::Document) -> Option<String> {
    let catalog = doc.catalog().ok()?;
    let (_, obj) = doc.dereference(catalog.get(b"Metadata").ok()?).ok()?;
    let stream = obj.as_stream().ok()?;
    Some(String::from_utf8_lossy(&stream.content).into_owned())
}

// ============ Word ============

/// Elements whose content cannot be rendered as plain text.
const WORD_UNSUPPORTED: [(&[u8], &str); 4] = [
    (b"drawing", "drawing"),
    (b"pict", "picture"),
    (b"object", "embedded object"),
    (b"oMath", "equation"),
];

/// Extracts raw text from a `.docx`, discarding formatting.
pub fn extract_word(bytes: &[u8]) -> Result<WordText, ExtractError> {
    if bytes.starts_with(&OLE_MAGIC) {
        return Err(ExtractError::Ooxml(
            "legacy binary Word (.doc) documents are not supported; save as .docx".to_string(),
        ));
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Ooxml("word/document.xml not found".to_string()))?;
    let xml = read_bounded(entry, "word/document.xml")?;
    Ok(word_text(&xml))
}

/// Never fails: malformed XML ends the walk early and is reported in
/// `messages` next to the text read up to that point.
fn word_text(xml: &[u8]) -> WordText {
    let mut text = String::new();
    let mut skipped = [0usize; WORD_UNSUPPORTED.len()];
    let mut in_run_text = false;
    let mut bad_entities = 0usize;
    let mut truncated = None;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"t" {
                    in_run_text = true;
                } else if let Some(idx) = unsupported_index(name.as_ref()) {
                    skipped[idx] += 1;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                other => {
                    if let Some(idx) = unsupported_index(other) {
                        skipped[idx] += 1;
                    }
                }
            },
            Ok(Event::Text(te)) if in_run_text => match te.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => {
                    text.push_str(&String::from_utf8_lossy(&te));
                    bad_entities += 1;
                }
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed document.xml; keeping text read so far");
                truncated = Some(e.to_string());
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    let mut messages: Vec<String> = WORD_UNSUPPORTED
        .iter()
        .zip(skipped)
        .filter(|(_, count)| *count > 0)
        .map(|((_, label), count)| format!("skipped {} unsupported {} element(s)", count, label))
        .collect();
    if bad_entities > 0 {
        messages.push(format!(
            "kept {} text run(s) with invalid entities verbatim",
            bad_entities
        ));
    }
    if let Some(err) = truncated {
        messages.push(format!("document truncated at malformed XML: {}", err));
    }

    WordText {
        text: text.trim_end().to_string(),
        messages,
    }
}

fn unsupported_index(local_name: &[u8]) -> Option<usize> {
    WORD_UNSUPPORTED
        .iter()
        .position(|(name, _)| *name == local_name)
}

// ============ Slide deck ============

/// Extracts per-slide text from a `.pptx`. Never fails: problems are
/// reported through [`SlideDeck::error`]. A slide that cannot be fully read
/// keeps whatever text was recovered and is named in the error.
pub fn extract_slides(bytes: &[u8]) -> SlideDeck {
    if bytes.starts_with(&OLE_MAGIC) {
        return SlideDeck::failed("legacy binary PowerPoint (.ppt) files are not supported");
    }
    match read_slides(bytes) {
        Ok((slides, damaged)) if slides.is_empty() && damaged.is_empty() => {
            SlideDeck::failed("no slides found (expected ppt/slides/slide<N>.xml entries)")
        }
        Ok((slides, damaged)) => {
            let error = (!damaged.is_empty())
                .then(|| format!("could not fully read: {}", damaged.join("; ")));
            if let Some(e) = &error {
                warn!(error = %e, "partial slide extraction");
            }
            SlideDeck {
                slide_count: slides.len(),
                slides,
                error,
            }
        }
        Err(e) => {
            warn!(error = %e, "slide deck could not be read");
            SlideDeck::failed(e.to_string())
        }
    }
}

/// Returns the recovered slide texts and a description of each damaged entry.
fn read_slides(bytes: &[u8]) -> Result<(Vec<String>, Vec<String>), ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let mut slides = Vec::new();
    let mut damaged = Vec::new();
    for i in 0..archive.len() {
        let entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                damaged.push(format!("entry #{} ({})", i, e));
                continue;
            }
        };
        let name = entry.name().to_string();
        if !is_slide_entry(&name) {
            continue;
        }
        let xml = match read_bounded(entry, &name) {
            Ok(xml) => xml,
            Err(e) => {
                damaged.push(format!("{} ({})", name, e));
                continue;
            }
        };
        let (text, problem) = slide_text(&xml);
        if let Some(problem) = problem {
            damaged.push(format!("{} ({})", name, problem));
        }
        slides.push(text);
    }
    Ok((slides, damaged))
}

/// Matches `ppt/slides/slide<N>.xml` exactly.
fn is_slide_entry(name: &str) -> bool {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Joins the text of every `a:t` run in the slide with a single space.
///
/// Runs with invalid entities are kept verbatim. Malformed XML stops the
/// walk; the runs read so far are returned along with the problem.
fn slide_text(xml: &[u8]) -> (String, Option<String>) {
    let mut runs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut problem = None;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => current = Some(String::new()),
            Ok(Event::Text(te)) => {
                if let Some(run) = current.as_mut() {
                    match te.unescape() {
                        Ok(s) => run.push_str(&s),
                        Err(e) => {
                            run.push_str(&String::from_utf8_lossy(&te));
                            problem.get_or_insert_with(|| e.to_string());
                        }
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                if let Some(run) = current.take().filter(|r| !r.is_empty()) {
                    runs.push(run);
                }
                problem = Some(e.to_string());
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    (runs.join(" "), problem)
}

// ============ Structured data ============

pub fn extract_json(bytes: &[u8]) -> Result<serde_json::Value, ExtractError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_bounded(entry: impl Read, name: &str) -> Result<Vec<u8>, ExtractError> {
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, MAX_XML_ENTRY_BYTES
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, body) in entries {
                zip.start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn slide_xml(runs: &[&str]) -> String {
        let body: String = runs
            .iter()
            .map(|r| format!("<a:r><a:t>{}</a:t></a:r>", r))
            .collect();
        format!(
            "<p:sld xmlns:a=\"a\" xmlns:p=\"p\"><p:cSld><p:txBody><a:p>{}</a:p></p:txBody></p:cSld></p:sld>",
            body
        )
    }

    #[test]
    fn unsupported_extension_is_client_error() {
        let err = extract(b"foo", "exe").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { ref extension } if extension == "exe"));
        assert!(err.is_client_error());
    }

    #[test]
    fn csv_quoted_comma_stays_in_field() {
        let rows = extract_delimited(b"\"a,b\",c\n").unwrap();
        assert_eq!(rows, vec![vec!["a,b".to_string(), "c".to_string()]]);
    }

    #[test]
    fn csv_skips_empty_lines_and_keeps_first_row() {
        let rows = extract_delimited(b"name,qty\n\napple,3\n\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["name", "qty"]);
        assert_eq!(rows[1], vec!["apple", "3"]);
    }

    #[test]
    fn csv_detects_semicolon_and_tab() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\n"), b'\t');
        assert_eq!(detect_delimiter("\"x;y\",z"), b',');
        assert_eq!(detect_delimiter("single"), b',');
        let rows = extract_delimited(b"a;b\n\"1;5\";2\n").unwrap();
        assert_eq!(rows[1], vec!["1;5", "2"]);
    }

    #[test]
    fn csv_escaped_quotes() {
        let rows = extract_delimited(b"\"say \"\"hi\"\"\",x\n").unwrap();
        assert_eq!(rows[0], vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn json_malformed_is_typed_failure() {
        let err = extract(b"{\"a\": ", "json").unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn json_parses_tree() {
        let rep = extract(br#"{"rows":[1,2]}"#, "JSON").unwrap();
        assert_eq!(
            rep,
            Representation::Structured(serde_json::json!({"rows": [1, 2]}))
        );
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract(b"not a pdf", "pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn pdf_string_decoding() {
        assert_eq!(decode_pdf_string(b"Ada"), "Ada");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]), "Aé");
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = extract(b"not a zip", "docx").unwrap_err();
        assert!(matches!(err, ExtractError::Ooxml(_)));
    }

    #[test]
    fn legacy_doc_is_rejected_with_message() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0; 64]);
        let err = extract_word(&bytes).unwrap_err();
        assert!(err.to_string().contains(".doc"));
    }

    #[test]
    fn docx_text_with_paragraphs_and_warnings() {
        let xml = concat!(
            "<w:document xmlns:w=\"w\"><w:body>",
            "<w:p><w:r><w:t xml:space=\"preserve\">Hello </w:t></w:r><w:r><w:t>world &amp; co</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t></w:r><w:r><w:drawing><x/></w:drawing></w:r></w:p>",
            "</w:body></w:document>"
        );
        let docx = zip_of(&[("word/document.xml", xml)]);
        let word = extract_word(&docx).unwrap();
        assert_eq!(word.text, "Hello world & co\nA\tB");
        assert_eq!(word.messages, vec!["skipped 1 unsupported drawing element(s)"]);
    }

    #[test]
    fn docx_malformed_xml_keeps_text_read_so_far() {
        let xml = concat!(
            "<w:document xmlns:w=\"w\"><w:body>",
            "<w:p><w:r><w:t>R&D plan</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Second</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>broken</w:x>"
        );
        let docx = zip_of(&[("word/document.xml", xml)]);
        let word = extract_word(&docx).unwrap();
        assert!(word.text.starts_with("R&D plan\nSecond"));
        assert!(word.messages.iter().any(|m| m.contains("invalid entities")));
        assert!(word.messages.iter().any(|m| m.contains("truncated")));
    }

    #[test]
    fn docx_without_document_xml_fails() {
        let docx = zip_of(&[("word/styles.xml", "<x/>")]);
        let err = extract_word(&docx).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn pptx_slides_in_archive_order_space_joined() {
        let second = slide_xml(&["Second", "slide"]);
        let first = slide_xml(&["Q3 &amp; Q4", "Revenue"]);
        let pptx = zip_of(&[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/slides/slide2.xml", second.as_str()),
            ("ppt/slides/_rels/slide2.xml.rels", "<Relationships/>"),
            ("ppt/slides/slide1.xml", first.as_str()),
        ]);
        let deck = extract_slides(&pptx);
        assert_eq!(deck.error, None);
        assert_eq!(deck.slide_count, 2);
        assert_eq!(deck.slides, vec!["Second slide", "Q3 & Q4 Revenue"]);
    }

    #[test]
    fn pptx_damaged_slide_keeps_the_rest() {
        let good = slide_xml(&["Good slide"]);
        let bad_entity = slide_xml(&["R&D budget"]);
        let truncated = "<p:sld xmlns:a=\"a\"><a:t>Half</a:t><a:t>way</a:x>";
        let deck = extract_slides(&zip_of(&[
            ("ppt/slides/slide1.xml", good.as_str()),
            ("ppt/slides/slide2.xml", bad_entity.as_str()),
            ("ppt/slides/slide3.xml", truncated),
        ]));
        assert_eq!(deck.slide_count, 3);
        assert_eq!(deck.slides[0], "Good slide");
        assert_eq!(deck.slides[1], "R&D budget");
        assert!(deck.slides[2].starts_with("Half"));
        let error = deck.error.unwrap();
        assert!(error.contains("ppt/slides/slide2.xml"));
        assert!(error.contains("ppt/slides/slide3.xml"));
        assert!(!error.contains("slide1.xml"));
    }

    #[test]
    fn pptx_ignores_non_run_text() {
        let xml = "<p:sld xmlns:a=\"a\" xmlns:p=\"p\"><p:cNvPr name=\"x\"/><p:txt>noise</p:txt><a:t>kept</a:t></p:sld>";
        let deck = extract_slides(&zip_of(&[("ppt/slides/slide1.xml", xml)]));
        assert_eq!(deck.slides, vec!["kept"]);
    }

    #[test]
    fn pptx_without_slides_is_flagged_not_failed() {
        let deck = extract_slides(&zip_of(&[("ppt/presentation.xml", "<p/>")]));
        assert!(deck.slides.is_empty());
        assert_eq!(deck.slide_count, 0);
        assert!(deck.error.is_some());
    }

    #[test]
    fn pptx_unopenable_archive_is_flagged() {
        let rep = extract(b"garbage", "pptx").unwrap();
        match rep {
            Representation::SlideDeck(deck) => {
                assert_eq!(deck.slide_count, 0);
                assert!(deck.error.is_some());
            }
            other => panic!("unexpected representation: {:?}", other),
        }
    }

    #[test]
    fn slide_entry_matching() {
        assert!(is_slide_entry("ppt/slides/slide12.xml"));
        assert!(!is_slide_entry("ppt/slides/slide.xml"));
        assert!(!is_slide_entry("ppt/slides/slideA.xml"));
        assert!(!is_slide_entry("ppt/slideLayouts/slideLayout1.xml"));
        assert!(!is_slide_entry("ppt/slides/_rels/slide1.xml.rels"));
    }

    #[test]
    fn invalid_workbook_returns_error() {
        let err = extract(b"not a workbook", "xlsx").unwrap_err();
        assert!(matches!(err, ExtractError::Spreadsheet(_)));
    }
}
