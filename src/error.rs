//! Error types for the mathdoc library.
//!
//! The normalisation core itself never fails: every stage is total over
//! UTF-8 input and degrades to plain text instead of erroring. Errors only
//! exist at the edges of the crate:
//!
//! * [`MathDocError`] — **Fatal** for one call: the input file cannot be read,
//!   the output cannot be written, or the configuration is invalid.
//!
//! * [`FileError`] — **Non-fatal**: one file of a batch failed while the
//!   others succeeded. Stored inside [`crate::convert::FileResult`].
//!
//! * [`RenderError`] — returned by an external math engine through the
//!   [`crate::render::MathRenderer`] seam. Never propagated out of this crate;
//!   the render helpers fall back to plain text instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mathdoc library.
#[derive(Debug, Error)]
pub enum MathDocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be serialised to JSON.
    #[error("Failed to serialise document: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file in a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The file could not be read.
    #[error("{path}: read failed: {detail}")]
    ReadFailed { path: String, detail: String },

    /// The file was read but processing it failed unexpectedly.
    #[error("{path}: processing failed: {detail}")]
    ProcessingFailed { path: String, detail: String },
}

/// Failure reported by an external math typesetting engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The engine could not parse the expression.
    #[error("math parse error in '{expr}': {detail}")]
    Parse { expr: String, detail: String },

    /// The engine does not support a command used by the expression.
    #[error("unsupported command '{command}'")]
    Unsupported { command: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let e = MathDocError::InvalidConfig("correct option index must be 0–3, got 7".into());
        assert!(e.to_string().contains("got 7"));
    }

    #[test]
    fn test_file_not_found_display() {
        let e = MathDocError::FileNotFound {
            path: PathBuf::from("/tmp/missing.txt"),
        };
        assert!(e.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_file_error_display() {
        let e = FileError::ReadFailed {
            path: "q1.txt".into(),
            detail: "permission denied".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("q1.txt"), "got: {msg}");
        assert!(msg.contains("permission denied"), "got: {msg}");
    }

    #[test]
    fn test_render_error_display() {
        let e = RenderError::Parse {
            expr: r"\frac{1".into(),
            detail: "unexpected end of input".into(),
        };
        assert!(e.to_string().contains(r"\frac{1"));
    }

    #[test]
    fn test_serialization_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: MathDocError = bad.into();
        assert!(e.to_string().starts_with("Failed to serialise"));
    }
}
