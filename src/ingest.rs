//! Ingestion pipeline orchestration.
//!
//! Coordinates the per-file flow: extension dispatch → format adapter →
//! normalization. Output order always equals input order, and a failing file
//! never aborts the rest of the batch: its error is recorded in its own
//! [`ExtractedDocument`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::extract::{extract, ExtractError};
use crate::models::{ExtractedDocument, RawFile, SourceFormat};
use crate::normalize::normalize;
use crate::progress::{IngestProgressEvent, IngestProgressReporter, NoProgress};

/// Extracts a single file, surfacing the typed error.
///
/// Used by entry points that must distinguish client errors (unsupported
/// extension) from processing failures.
pub fn ingest_one(file: &RawFile) -> Result<ExtractedDocument, ExtractError> {
    let representation = extract(&file.bytes, &file.declared_extension)?;
    Ok(normalize(
        &file.name,
        &file.declared_extension,
        Ok(representation),
    ))
}

/// Extracts one file, converting any failure into the document's error field.
pub fn ingest_file(file: &RawFile) -> ExtractedDocument {
    let result = extract(&file.bytes, &file.declared_extension);
    if let Err(e) = &result {
        warn!(file = %file.name, error = %e, "extraction failed; continuing batch");
    }
    let doc = normalize(&file.name, &file.declared_extension, result);
    for w in doc.warnings() {
        warn!(file = %file.name, warning = %w, "partial extraction");
    }
    doc
}

/// Sequentially ingests a batch, preserving input order.
pub fn ingest(files: &[RawFile]) -> Vec<ExtractedDocument> {
    ingest_with_progress(files, &NoProgress)
}

pub fn ingest_with_progress(
    files: &[RawFile],
    progress: &dyn IngestProgressReporter,
) -> Vec<ExtractedDocument> {
    let total = files.len() as u64;
    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            progress.report(IngestProgressEvent::Extracting {
                file: file.name.clone(),
                n: i as u64 + 1,
                total,
            });
            let doc = ingest_file(file);
            progress.report(IngestProgressEvent::Finished {
                file: file.name.clone(),
                ok: doc.is_ok(),
            });
            doc
        })
        .collect()
}

/// Ingests each file on a blocking task and reassembles results in input order.
pub async fn ingest_concurrent(files: Vec<RawFile>) -> Vec<ExtractedDocument> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let name = file.name.clone();
            let ext = file.declared_extension.clone();
            (
                name,
                ext,
                tokio::task::spawn_blocking(move || ingest_file(&file)),
            )
        })
        .collect();

    let mut docs = Vec::with_capacity(handles.len());
    for (name, ext, handle) in handles {
        let doc = match handle.await {
            Ok(doc) => doc,
            Err(join_err) => {
                warn!(file = %name, error = %join_err, "extraction task aborted");
                ExtractedDocument {
                    filename: name,
                    source_format: SourceFormat::from_extension(&ext),
                    representation: crate::models::Representation::Empty,
                    extraction_error: Some(format!("extraction task aborted: {}", join_err)),
                }
            }
        };
        docs.push(doc);
    }
    docs
}

/// Expands CLI path arguments into an ordered list of files.
///
/// Files named explicitly are kept whatever their extension (so unsupported
/// files are reported rather than silently dropped). Directories are walked
/// recursively, keeping only supported extensions, sorted by path.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry =
                    entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                let ext = crate::models::extension_of(&name);
                if SourceFormat::from_extension(&ext) != SourceFormat::Unsupported {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            debug!(dir = %path.display(), files = found.len(), "expanded directory");
            out.extend(found);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

/// Reads files from disk and ingests them. Unreadable files become failed
/// documents rather than aborting the batch.
pub fn ingest_paths(
    paths: &[PathBuf],
    progress: &dyn IngestProgressReporter,
) -> Vec<ExtractedDocument> {
    let total = paths.len() as u64;
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let name = display_name(path);
            progress.report(IngestProgressEvent::Extracting {
                file: name.clone(),
                n: i as u64 + 1,
                total,
            });
            let doc = match std::fs::read(path) {
                Ok(bytes) => ingest_file(&RawFile::new(name.clone(), bytes)),
                Err(source) => {
                    let err = ExtractError::Io {
                        path: path.display().to_string(),
                        source,
                    };
                    warn!(error = %err, "could not read input file");
                    let ext = crate::models::extension_of(&name);
                    normalize(&name, &ext, Err(err))
                }
            };
            progress.report(IngestProgressEvent::Finished {
                file: name,
                ok: doc.is_ok(),
            });
            doc
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Representation;

    #[test]
    fn bad_file_does_not_abort_batch() {
        let files = vec![
            RawFile::new("broken.json", b"{oops".to_vec()),
            RawFile::new("ok.csv", b"a,b\n1,2\n".to_vec()),
        ];
        let docs = ingest(&files);
        assert_eq!(docs.len(), 2);
        assert!(docs[0].extraction_error.is_some());
        assert_eq!(docs[0].representation, Representation::Empty);
        assert!(docs[1].is_ok());
    }

    #[test]
    fn ingest_one_surfaces_unsupported() {
        let err = ingest_one(&RawFile::new("x.bin", vec![1, 2, 3])).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn declared_extension_wins_over_name() {
        let file = RawFile::with_extension("upload", b"[1,2]".to_vec(), "json");
        let doc = ingest_one(&file).unwrap();
        assert_eq!(doc.source_format, SourceFormat::Json);
    }

    #[tokio::test]
    async fn concurrent_ingest_preserves_order() {
        let files: Vec<RawFile> = (0..8)
            .map(|i| RawFile::new(format!("f{}.csv", i), format!("v,{}\n", i).into_bytes()))
            .collect();
        let docs = ingest_concurrent(files).await;
        let names: Vec<&str> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["f0.csv", "f1.csv", "f2.csv", "f3.csv", "f4.csv", "f5.csv", "f6.csv", "f7.csv"]
        );
        assert_eq!(
            docs[5].representation,
            Representation::Delimited(vec![vec!["v".to_string(), "5".to_string()]])
        );
    }

    #[test]
    fn missing_path_becomes_failed_document() {
        let docs = ingest_paths(&[PathBuf::from("/nonexistent/dir/q.csv")], &NoProgress);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "q.csv");
        assert!(docs[0]
            .extraction_error
            .as_deref()
            .unwrap()
            .starts_with("failed to read"));
    }
}
