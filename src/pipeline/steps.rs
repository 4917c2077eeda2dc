//! Derivation-step detection for long worked solutions.
//!
//! Models like to write solutions as `1. … 2. …` or `**Step 1:** …` lists.
//! When a long text carries at least two such markers at line starts, this
//! pass re-groups it into ordered [`Step`]s so the renderer can lay each one
//! out as its own block.
//!
//! Steps are numbered by discovery order. A text whose markers read
//! `Step 1`, `Step 5` still yields indices 1 and 2; the written numbers are
//! not validated or corrected.

use crate::config::ParagraphBreak;
use crate::document::Step;
use crate::pipeline::segment::segment_with;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Result of step detection: text left outside any step, plus the steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSplit {
    /// Text before the first marker (or the whole input when no steps fired).
    pub residual: String,
    pub steps: Vec<Step>,
}

static RE_STEP_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?:(?P<num>\d+)\.|\*\*Step[ \t]+(?P<bold>\d+):\*\*|###[ \t]+Step[ \t]+(?P<head>\d+))(?P<rest>[^\n]*)",
    )
    .unwrap()
});

struct Marker {
    start: usize,
    line_end: usize,
    written: u32,
    title: Option<String>,
}

/// Split `text` into steps if it is longer than `min_len` characters and
/// contains at least two line-start step markers; otherwise a no-op.
pub fn extract_steps(text: &str, min_len: usize, mode: ParagraphBreak) -> StepSplit {
    let no_steps = || StepSplit {
        residual: text.to_string(),
        steps: Vec::new(),
    };

    if text.chars().count() <= min_len {
        return no_steps();
    }

    let markers = find_markers(text);
    if markers.len() < 2 {
        debug!("extract_steps: {} marker(s), not splitting", markers.len());
        return no_steps();
    }

    let steps: Vec<Step> = markers
        .iter()
        .enumerate()
        .map(|(k, marker)| {
            let index = k as u32 + 1;
            if marker.written != index {
                debug!(
                    "extract_steps: marker written as {} is step {} in document order",
                    marker.written, index
                );
            }
            let end = markers.get(k + 1).map_or(text.len(), |next| next.start);
            let body = segment_with(&text[marker.line_end..end], mode).paragraphs;
            Step {
                index,
                title: marker.title.clone(),
                body,
            }
        })
        .collect();

    debug!("extract_steps: {} steps", steps.len());
    StepSplit {
        residual: text[..markers[0].start].trim_end().to_string(),
        steps,
    }
}

fn find_markers(text: &str) -> Vec<Marker> {
    RE_STEP_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            let written = caps
                .name("num")
                .or_else(|| caps.name("bold"))
                .or_else(|| caps.name("head"))?;

            // "3.14 is pi" is a number, not a list marker.
            if caps.name("num").is_some() && !rest.is_empty() && !rest.starts_with(char::is_whitespace)
            {
                return None;
            }

            let title = rest.trim().trim_start_matches(':').trim();
            Some(Marker {
                start: whole.start(),
                line_end: whole.end(),
                written: written.as_str().parse().unwrap_or(0),
                title: (!title.is_empty()).then(|| title.to_string()),
            })
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Segment;

    const FILLER: &str = "We carefully rearrange the terms and keep track of every sign so that nothing is lost along the way. ";

    fn split(text: &str) -> StepSplit {
        extract_steps(text, 200, ParagraphBreak::BlankLine)
    }

    #[test]
    fn test_short_text_single_marker_is_noop() {
        let text = "1. Add both sides and simplify the result now.";
        assert!(text.len() < 200);
        let out = split(text);
        assert!(out.steps.is_empty());
        assert_eq!(out.residual, text);
    }

    #[test]
    fn test_short_text_two_markers_is_noop() {
        let out = split("1. first\n2. second");
        assert!(out.steps.is_empty());
    }

    #[test]
    fn test_long_text_single_marker_is_noop() {
        let text = format!("1. Only one step\n{}{}{}", FILLER, FILLER, FILLER);
        assert!(text.len() > 200);
        assert!(split(&text).steps.is_empty());
    }

    #[test]
    fn test_bold_step_markers() {
        let text = format!(
            "**Step 1:** Expand\n{FILLER}$x^2$ appears.\n**Step 2:** Solve\n{FILLER}{FILLER}"
        );
        assert!(text.len() > 290);
        let out = split(&text);
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.steps[0].index, 1);
        assert_eq!(out.steps[0].title.as_deref(), Some("Expand"));
        assert_eq!(out.steps[1].title.as_deref(), Some("Solve"));
        assert!(out.steps[0].body[0]
            .segments
            .contains(&Segment::InlineMath("x^2".into())));
        assert!(out.residual.is_empty());
    }

    #[test]
    fn test_heading_markers_and_colon_title() {
        let text = format!("### Step 1: Setup\n{FILLER}\n### Step 2\n{FILLER}{FILLER}");
        let out = split(&text);
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.steps[0].title.as_deref(), Some("Setup"));
        assert_eq!(out.steps[1].title, None);
        assert_eq!(out.steps[1].display_title(), "Step 2");
    }

    #[test]
    fn test_numbering_follows_document_order() {
        let text = format!("1. Start\n{FILLER}\n5. Jump\n{FILLER}{FILLER}");
        let out = split(&text);
        let indices: Vec<u32> = out.steps.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(out.steps[1].title.as_deref(), Some("Jump"));
    }

    #[test]
    fn test_preamble_is_residual() {
        let text = format!("Consider the quadratic.\n\n1. Factor\n{FILLER}\n2. Solve\n{FILLER}{FILLER}");
        let out = split(&text);
        assert_eq!(out.residual, "Consider the quadratic.");
        assert_eq!(out.steps.len(), 2);
    }

    #[test]
    fn test_decimal_is_not_a_marker() {
        let text = format!("3.14 is close to pi\n{FILLER}\n2.71 is close to e\n{FILLER}{FILLER}");
        assert!(split(&text).steps.is_empty());
    }

    #[test]
    fn test_marker_without_body() {
        let text = format!("1. {FILLER}\n2. {FILLER}{FILLER}");
        let out = split(&text);
        assert_eq!(out.steps.len(), 2);
        assert!(out.steps[0].body.is_empty());
        assert!(out.steps[0].title.is_some());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let out = extract_steps("1. a\n2. b", 0, ParagraphBreak::BlankLine);
        assert_eq!(out.steps.len(), 2);
    }
}
