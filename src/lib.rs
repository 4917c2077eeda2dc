//! # mathdoc
//!
//! Turn raw, messy LLM output containing math into a render-ready document.
//!
//! Model responses mix `\(…\)`, `\[…\]`, `$…$`, `$$…$$` and fenced `latex`
//! blocks, arrive with JSON transport escapes still in them (`\n`, `\"`), and
//! sometimes contain LaTeX with no delimiters at all. This crate normalises
//! all of that into one convention and segments the text into paragraphs of
//! plain, inline-math and display-math segments. Optionally it also recovers
//! worked-solution steps and multiple-choice options.
//!
//! ## Pipeline Overview
//!
//! ```text
//! raw text
//!  │
//!  ├─ 1. Sanitize    transport escapes, invisible chars, line endings
//!  ├─ 2. Delimiters  \(…\) \[…\] ```latex → $…$ / $$…$$
//!  ├─ 3. Steps       long "1. … 2. …" solutions → ordered steps (opt-in)
//!  ├─ 4. Segment     paragraphs of plain / inline / display segments
//!  ├─ 5. Options     "(1) … (4)" / "(A) … (D)" → answer options (opt-in)
//!  └─ 6. Reclassify  undelimited \frac, x^2 … → inline math
//! ```
//!
//! The core is pure and total: it never fails and never panics on UTF-8
//! input. Only the file layer in [`convert`] returns errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use mathdoc::{normalize, NormalizeConfig, Segment};
//!
//! let config = NormalizeConfig::builder()
//!     .extract_options(true)
//!     .build()
//!     .unwrap();
//! let doc = normalize(r"Solve \(x^2 = 4\). (1) 2 (2) -2", &config);
//!
//! assert_eq!(doc.paragraphs[0].segments[1], Segment::InlineMath("x^2 = 4".into()));
//! assert_eq!(doc.options.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mathdoc` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mathdoc = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{NormalizeConfig, NormalizeConfigBuilder, ParagraphBreak, DEFAULT_STEP_MIN_LEN};
pub use convert::{
    normalize, normalize_batch, normalize_file, normalize_file_sync, normalize_to_file,
    normalize_with_stats, write_atomic, FileResult, NormalizeOutput,
};
pub use document::{AnswerOption, Document, DocumentStats, Paragraph, Segment, Step};
pub use error::{FileError, MathDocError, RenderError};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::{render_document, render_paragraph, render_segment, MathRenderer, Rendered};
