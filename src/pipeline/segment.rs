//! Segmenter: split normalised text into paragraphs of typed segments.
//!
//! Works on canonical delimiters only (`$…$`, `$$…$$`), so it must run after
//! [`crate::pipeline::delimiters`]. Scanning is a single left-to-right pass
//! over the bytes of each paragraph; `$` and `\` are ASCII, so every slice
//! boundary is also a UTF-8 character boundary.
//!
//! ## Policies
//!
//! - `$$` is tried before `$` at every position.
//! - The first unescaped closing delimiter wins; an empty body is not math.
//! - `\$` is a literal dollar sign.
//! - An opener with no closer before the end of the paragraph is not math:
//!   it and everything after it become plain text. A missing `$` therefore
//!   never swallows the rest of the document.

use crate::config::ParagraphBreak;
use crate::document::{Document, Paragraph, Segment};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::trace;

/// Kind of a scanned span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    Inline,
    Display,
}

/// A scanned region of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    /// Byte range including delimiters.
    pub outer: Range<usize>,
    /// Byte range of the payload (equal to `outer` for plain text).
    pub inner: Range<usize>,
}

impl Span {
    pub fn is_math(&self) -> bool {
        self.kind != SpanKind::Plain
    }
}

/// Segment normalised text, splitting paragraphs on blank lines.
pub fn segment(s: &str) -> Document {
    segment_with(s, ParagraphBreak::BlankLine)
}

/// Segment normalised text with an explicit paragraph-break policy.
pub fn segment_with(s: &str, mode: ParagraphBreak) -> Document {
    let paragraphs: Vec<Paragraph> = split_paragraphs(s, mode)
        .into_iter()
        .map(segment_paragraph)
        .collect();
    trace!("segment: {} paragraphs", paragraphs.len());
    Document {
        paragraphs,
        ..Default::default()
    }
}

static RE_BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split into trimmed, non-empty paragraph slices.
pub fn split_paragraphs(s: &str, mode: ParagraphBreak) -> Vec<&str> {
    let pieces: Vec<&str> = match mode {
        ParagraphBreak::BlankLine => RE_BLANK_LINE.split(s).collect(),
        ParagraphBreak::Newline => s.split('\n').collect(),
    };
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Scan one paragraph into typed segments.
pub fn segment_paragraph(p: &str) -> Paragraph {
    let segments = scan(p)
        .into_iter()
        .map(|span| {
            let body = p[span.inner].to_string();
            match span.kind {
                SpanKind::Plain => Segment::PlainText(body),
                SpanKind::Inline => Segment::InlineMath(body),
                SpanKind::Display => Segment::DisplayMath(body),
            }
        })
        .collect();
    Paragraph::new(segments)
}

/// Scan a paragraph into plain, inline and display spans covering it exactly.
pub fn scan(p: &str) -> Vec<Span> {
    let bytes = p.as_bytes();
    let mut spans = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || is_escaped(bytes, i) {
            i += 1;
            continue;
        }

        let display = bytes.get(i + 1) == Some(&b'$');
        let (open_len, kind) = if display {
            (2, SpanKind::Display)
        } else {
            (1, SpanKind::Inline)
        };

        // Body must be at least one byte long.
        let Some(close) = find_closing(bytes, i + open_len + 1, display) else {
            trace!("scan: unterminated delimiter at byte {}", i);
            break;
        };

        if text_start < i {
            spans.push(plain_span(text_start..i));
        }
        let end = close + open_len;
        spans.push(Span {
            kind,
            outer: i..end,
            inner: i + open_len..close,
        });
        i = end;
        text_start = end;
    }

    if text_start < bytes.len() {
        spans.push(plain_span(text_start..bytes.len()));
    }
    spans
}

fn plain_span(range: Range<usize>) -> Span {
    Span {
        kind: SpanKind::Plain,
        outer: range.clone(),
        inner: range,
    }
}

/// Position of the first unescaped closing `$` (or `$$`) at or after `from`.
fn find_closing(bytes: &[u8], from: usize, display: bool) -> Option<usize> {
    (from..bytes.len()).find(|&j| {
        bytes[j] == b'$'
            && !is_escaped(bytes, j)
            && (!display || bytes.get(j + 1) == Some(&b'$'))
    })
}

/// True if the byte at `pos` is preceded by an odd run of backslashes.
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

// ── Tests ────────────────────────────────────────────────────────────────────
