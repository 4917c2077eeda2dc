//! Embedded multiple-choice option extraction.
//!
//! Question text frequently arrives with its answer choices inlined:
//! `Which is a root? (1) x=2 (2) x=-2 (3) Both (4) None`. This pass pulls each
//! `(1)`–`(4)` / `(A)`–`(D)` run out of its paragraph into a standalone
//! [`AnswerOption`] so the choices are not rendered twice.
//!
//! A run is a marker plus everything up to the next marker or the end of the
//! paragraph. Markers inside a math span (`$f(A)$`) are not markers.
//!
//! Runs are cut out of the paragraph source by the byte range the marker
//! scan found, never by text search, so an identical string inside a math
//! span or earlier prose is left alone.

use crate::document::{AnswerOption, Document};
use crate::pipeline::segment::{scan, segment_paragraph};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

static RE_OPTION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([1-4A-D])\)").unwrap());

/// Extract answer options from every paragraph of `doc`.
///
/// `correct_index` is 0-based by label position (0 = `1`/`A`); when `None`,
/// `is_correct` stays `None` on every option. Paragraphs left empty after
/// extraction are dropped.
pub fn extract_options(doc: Document, correct_index: Option<u32>) -> (Document, Vec<AnswerOption>) {
    let Document {
        paragraphs: source_paragraphs,
        steps,
        options: existing,
    } = doc;
    let mut options = Vec::new();
    let mut paragraphs = Vec::with_capacity(source_paragraphs.len());

    for paragraph in source_paragraphs {
        let source = paragraph.to_markup();
        let markers = find_markers(&source);
        if markers.is_empty() {
            paragraphs.push(paragraph);
            continue;
        }

        // Runs tile the source from the first marker to the end.
        let residual = &source[..markers[0].0.start];
        for (k, (range, label)) in markers.iter().enumerate() {
            let end = markers.get(k + 1).map_or(source.len(), |(next, _)| next.start);

            let mut option = AnswerOption {
                label: label.clone(),
                body: segment_paragraph(source[range.end..end].trim()).segments,
                is_correct: None,
            };
            if let Some(idx) = correct_index {
                option.is_correct = Some(option.label_index() == Some(idx));
            }
            options.push(option);
        }

        let rest = segment_paragraph(residual.trim());
        if !rest.is_empty() {
            paragraphs.push(rest);
        }
    }

    debug!("extract_options: {} options", options.len());
    (
        Document {
            paragraphs,
            steps,
            options: existing,
        },
        options,
    )
}

/// Option markers outside math spans, with their labels.
fn find_markers(source: &str) -> Vec<(Range<usize>, String)> {
    let math: Vec<Range<usize>> = scan(source)
        .into_iter()
        .filter(|span| span.is_math())
        .map(|span| span.outer)
        .collect();

    RE_OPTION_MARKER
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if math.iter().any(|m| m.contains(&whole.start())) {
                return None;
            }
            Some((whole.range(), caps[1].to_string()))
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
