//! Public entry points: strings, files and batches of files.
//!
//! The in-memory functions ([`normalize`], [`normalize_with_stats`]) are pure
//! and synchronous. The file functions read with `tokio::fs` so a batch of
//! many small files can be processed concurrently via
//! [`normalize_batch`]; [`normalize_file_sync`] wraps the async API for
//! callers without a runtime.

use crate::config::NormalizeConfig;
use crate::document::{Document, DocumentStats};
use crate::error::{FileError, MathDocError};
use crate::pipeline;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of normalising one text, with the intermediate string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOutput {
    pub document: Document,
    /// Text after sanitisation and delimiter normalisation.
    pub normalized: String,
    pub stats: DocumentStats,
    pub duration_ms: u64,
}

/// Outcome for one file of a batch. Exactly one of `document` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub document: Option<Document>,
    pub error: Option<FileError>,
    pub duration_ms: u64,
}

impl FileResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Normalise and segment one raw model response.
///
/// This is the primary entry point for the library. It never fails: input
/// that cannot be interpreted as math degrades to plain text.
pub fn normalize(raw: &str, config: &NormalizeConfig) -> Document {
    pipeline::run(raw, config)
}

/// Like [`normalize`], but also returns the normalised text, counts and timing.
pub fn normalize_with_stats(raw: &str, config: &NormalizeConfig) -> NormalizeOutput {
    let start = Instant::now();
    let normalized = pipeline::normalize_text(raw);
    let document = pipeline::run_normalized(&normalized, config);
    let stats = document.stats();
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "normalize: {} bytes → {} paragraphs in {}ms",
        raw.len(),
        stats.paragraphs,
        duration_ms
    );
    NormalizeOutput {
        document,
        normalized,
        stats,
        duration_ms,
    }
}

/// Read a UTF-8 text file and normalise its contents.
///
/// # Errors
/// - [`MathDocError::FileNotFound`] if `path` does not exist
/// - [`MathDocError::InputReadFailed`] for any other I/O or UTF-8 failure
pub async fn normalize_file(
    path: impl AsRef<Path>,
    config: &NormalizeConfig,
) -> Result<NormalizeOutput, MathDocError> {
    let path = path.as_ref();
    let raw = read_input(path).await?;
    let output = normalize_with_stats(&raw, config);
    info!(
        "Normalised {}: {} paragraphs, {} math segments",
        path.display(),
        output.stats.paragraphs,
        output.stats.inline_math + output.stats.display_math
    );
    Ok(output)
}

/// Synchronous wrapper around [`normalize_file`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn normalize_file_sync(
    path: impl AsRef<Path>,
    config: &NormalizeConfig,
) -> Result<NormalizeOutput, MathDocError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MathDocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(normalize_file(path, config))
}

/// Normalise a file and write the resulting [`Document`] as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn normalize_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &NormalizeConfig,
) -> Result<DocumentStats, MathDocError> {
    let output = normalize_file(input, config).await?;
    let json = serde_json::to_string_pretty(&output.document)?;
    write_atomic(output_path.as_ref(), &json).await?;
    Ok(output.stats)
}

/// Normalise many files concurrently.
///
/// Returns one [`FileResult`] per input, in input order. A file that cannot
/// be read is reported in its `FileResult` and does not stop the batch.
pub async fn normalize_batch<P: AsRef<Path>>(
    paths: &[P],
    config: &NormalizeConfig,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> Vec<FileResult> {
    let total = paths.len();
    if let Some(ref cb) = progress {
        cb.on_batch_start(total);
    }

    let mut results: Vec<(usize, FileResult)> =
        stream::iter(paths.iter().enumerate().map(|(idx, path)| {
            let path = path.as_ref().to_path_buf();
            let progress = progress.clone();
            async move {
                let file_num = idx + 1;
                let shown = path.display().to_string();
                if let Some(ref cb) = progress {
                    cb.on_file_start(file_num, total, &shown);
                }
                let result = process_file(&path, config).await;
                if let Some(ref cb) = progress {
                    match (&result.document, &result.error) {
                        (_, Some(e)) => cb.on_file_error(file_num, total, &e.to_string()),
                        (Some(doc), None) => {
                            cb.on_file_complete(file_num, total, doc.segments().count())
                        }
                        (None, None) => {}
                    }
                }
                (idx, result)
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);
    let results: Vec<FileResult> = results.into_iter().map(|(_, r)| r).collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    info!("Batch complete: {}/{} files", succeeded, total);
    if let Some(ref cb) = progress {
        cb.on_batch_complete(total, succeeded);
    }
    results
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn read_input(path: &Path) -> Result<String, MathDocError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MathDocError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MathDocError::InputReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

async fn process_file(path: &Path, config: &NormalizeConfig) -> FileResult {
    let start = Instant::now();
    let shown = path.display().to_string();
    let (document, error) = match normalize_file(path, config).await {
        Ok(output) => (Some(output.document), None),
        Err(e) => {
            warn!("Skipping {}: {}", shown, e);
            let detail = match &e {
                MathDocError::FileNotFound { .. } => "file not found".to_string(),
                MathDocError::InputReadFailed { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            let error = match e {
                MathDocError::FileNotFound { .. } | MathDocError::InputReadFailed { .. } => {
                    FileError::ReadFailed {
                        path: shown.clone(),
                        detail,
                    }
                }
                _ => FileError::ProcessingFailed {
                    path: shown.clone(),
                    detail,
                },
            };
            (None, Some(error))
        }
    };
    FileResult {
        path: shown,
        document,
        error,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), MathDocError> {
    let write_err = |e: std::io::Error| MathDocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
