//! Property tests for the text pipeline.
//!
//! Inputs are drawn from small alphabets heavy in the characters the
//! pipeline treats specially (`\`, brackets, `$`, digits, newlines), so
//! adjacent escapes and delimiters collide far more often than in real
//! model output.
//!
//! Run with:
//!   cargo test --test properties

use mathdoc::pipeline::delimiters::normalize_delimiters;
use mathdoc::pipeline::normalize_text;
use mathdoc::{normalize, Document, NormalizeConfig};
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────────────

/// Arbitrary mixes of delimiter pieces, transport escapes and text.
fn noisy_text() -> impl Strategy<Value = String> {
    let pieces = vec![
        "\\", "(", ")", "[", "]", "$", "0", "1", "2", "3", "n", "r", "a", "x", " ", "\n",
        "\"", "`", "```latex", "```", "\\alpha", "\\nabla", "\r\n", "\u{200B}", "\u{E000}",
        "\u{E002}",
    ];
    proptest::collection::vec(prop::sample::select(pieces), 0..48).prop_map(|v| v.concat())
}

/// Text whose only backslash-bracket sequences are escaped literals
/// (`\\(` etc.); no real delimiters and no fences.
fn literal_text() -> impl Strategy<Value = String> {
    let pieces = vec![
        "\\\\(", "\\\\)", "\\\\[", "\\\\]", "\\\\", "\\alpha ", "(", ")", "[", "]", "0", "1",
        "2", "3", "a", " ", "\n", "$",
    ];
    proptest::collection::vec(prop::sample::select(pieces), 0..32).prop_map(|v| v.concat())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn content(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect()
}

fn document_content(doc: &Document) -> String {
    doc.segments().map(|s| content(s.text())).collect()
}

fn is_private_use(c: char) -> bool {
    ('\u{E000}'..='\u{F8FF}').contains(&c)
}

/// Private-use characters in `out` that were not already in `input`.
fn leaked(input: &str, out: &str) -> Vec<char> {
    out.chars()
        .filter(|c| is_private_use(*c) && !input.contains(*c))
        .collect()
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn test_normalize_text_idempotent(raw in noisy_text()) {
        let once = normalize_text(&raw);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_segmentation_loses_nothing(raw in noisy_text()) {
        let text = normalize_text(&raw);
        let doc = normalize(&raw, &NormalizeConfig::default());
        prop_assert_eq!(document_content(&doc), content(&text));
    }

    #[test]
    fn test_no_placeholder_leaks(raw in noisy_text()) {
        let text = normalize_text(&raw);
        prop_assert!(leaked(&raw, &text).is_empty(), "normalised: {:?}", text);

        let doc = normalize(&raw, &NormalizeConfig::default());
        for seg in doc.segments() {
            prop_assert!(leaked(&raw, seg.text()).is_empty(), "segment: {:?}", seg);
        }
    }

    #[test]
    fn test_escaped_literals_round_trip(s in literal_text()) {
        prop_assert_eq!(normalize_delimiters(&s), s);
    }
}
