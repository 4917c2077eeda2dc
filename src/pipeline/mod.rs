//! Pipeline stages for math-text normalisation and segmentation.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! raw ──▶ sanitize ──▶ delimiters ──▶ steps ──▶ segment ──▶ options ──▶ reclassify
//!        (escapes)    ($ / $$ only)  (opt.)    (AST)       (opt.)      (opt.)
//! ```
//!
//! 1. [`sanitize`]   — undo transport escaping, drop invisible characters,
//!    normalise line endings, collapse blank-line runs
//! 2. [`delimiters`] — rewrite `\(…\)`, `\[…\]` and math fences to `$`/`$$`
//! 3. [`steps`]      — split long worked solutions into ordered steps
//! 4. [`segment`]    — paragraphs of plain / inline / display segments
//! 5. [`options`]    — pull `(1)`…`(4)` / `(A)`…`(D)` choices out of prose
//! 6. [`reclassify`] — promote undelimited LaTeX in plain text to inline math
//!
//! Stages 1 and 2 are string → string and idempotent. Stages 3, 5 and 6 are
//! switched by [`NormalizeConfig`].

pub mod delimiters;
pub mod options;
pub mod reclassify;
pub mod sanitize;
pub mod segment;
pub mod steps;

use crate::config::NormalizeConfig;
use crate::document::Document;
use tracing::debug;

/// Sanitise and normalise delimiters: the string-level half of the pipeline.
pub fn normalize_text(raw: &str) -> String {
    delimiters::normalize_delimiters(&sanitize::sanitize(raw))
}

/// Run the whole pipeline on one raw model response.
pub fn run(raw: &str, config: &NormalizeConfig) -> Document {
    run_normalized(&normalize_text(raw), config)
}

/// Run the structural stages on text that already went through
/// [`normalize_text`].
pub(crate) fn run_normalized(text: &str, config: &NormalizeConfig) -> Document {
    let mode = config.paragraph_break;

    let mut doc = if config.extract_steps {
        let split = steps::extract_steps(text, config.step_min_len, mode);
        let mut doc = segment::segment_with(&split.residual, mode);
        doc.steps = split.steps;
        doc
    } else {
        segment::segment_with(text, mode)
    };

    if config.extract_options {
        let (rest, options) = options::extract_options(doc, config.correct_option_index);
        doc = rest;
        doc.options.extend(options);
    }

    if config.reclassify_bare_math {
        doc = reclassify::reclassify(doc);
    }

    debug!(
        "pipeline: {} paragraphs, {} steps, {} options",
        doc.paragraphs.len(),
        doc.steps.len(),
        doc.options.len()
    );
    doc
}

// ── Tests ────────────────────────────────────────────────────────────────────
