//! Normalization of adapter output into [`ExtractedDocument`]s.
//!
//! Never fails: adapter errors are captured in
//! [`ExtractedDocument::extraction_error`] next to a placeholder
//! representation, so a batch is uniform whether or not each file parsed.

use crate::extract::ExtractError;
use crate::models::{ExtractedDocument, Representation, SourceFormat};

/// Builds the canonical document for one file from its adapter result.
pub fn normalize(
    filename: &str,
    extension: &str,
    result: Result<Representation, ExtractError>,
) -> ExtractedDocument {
    let source_format = SourceFormat::from_extension(extension);
    match result {
        Ok(representation) => ExtractedDocument {
            filename: filename.to_string(),
            source_format,
            representation,
            extraction_error: None,
        },
        Err(err @ ExtractError::UnsupportedFormat { .. }) => ExtractedDocument {
            filename: filename.to_string(),
            source_format: SourceFormat::Unsupported,
            representation: Representation::Unsupported {
                message: unsupported_message(extension),
            },
            extraction_error: Some(err.to_string()),
        },
        Err(err) => ExtractedDocument {
            filename: filename.to_string(),
            source_format,
            representation: Representation::Empty,
            extraction_error: Some(err.to_string()),
        },
    }
}

fn unsupported_message(extension: &str) -> String {
    if extension.is_empty() {
        "File has no extension; no content was extracted.".to_string()
    } else {
        format!(
            "Files of type '.{}' are not supported; no content was extracted.",
            extension
        )
    }
}
