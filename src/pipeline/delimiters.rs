//! Delimiter normalisation: one canonical math delimiter convention.
//!
//! Models mix `\(…\)`, `\[…\]`, fenced ```` ```latex ```` blocks and the
//! canonical `$…$` / `$$…$$`. This stage rewrites everything into the
//! canonical pair so the segmenter only has to understand one convention.
//!
//! ## Rule Order
//!
//! 1. Protect escaped delimiters (`\\(`, `\\)`, `\\[`, `\\]`) behind sentinel
//!    tokens; these mean "literal bracket", not math.
//! 2. Rewrite `\(…\)` → `$…$` and `\[…\]` → `$$…$$`.
//! 3. Restore the sentinels to the exact text they replaced.
//! 4. Rewrite ```` ```latex … ``` ```` and ```` ```math … ``` ```` → `$$…$$`.
//!
//! Step 2 only ever rewrites an opener together with its closer, and repeats
//! until nothing changes, so a stray `\(` stays literal and a second run of
//! the whole stage is a no-op.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Rewrite every supported math delimiter into the canonical `$`/`$$` form.
///
/// Total: input that matches no rule is returned unchanged.
pub fn normalize_delimiters(s: &str) -> String {
    let result = match Sentinel::for_input(s) {
        Some(sentinel) => {
            let protected = sentinel.protect(s);
            let rewritten = rewrite_math_pairs(&protected);
            sentinel.restore(&rewritten)
        }
        None => {
            // Every private-use codepoint already occurs in the input; without
            // a safe placeholder the bracket forms cannot be told apart.
            warn!("normalize_delimiters: no free sentinel character, skipping bracket rewrite");
            s.to_string()
        }
    };
    let result = rewrite_fences(&result);
    debug!("normalize_delimiters: {} → {} bytes", s.len(), result.len());
    result
}

// ── Steps 1 & 3: Sentinel substitution ──────────────────────────────────────

static RE_ESCAPED_DELIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\([()\[\]])").unwrap());

/// Reversible placeholders for the four escaped delimiter forms.
///
/// Each form gets its own private-use character that does not occur anywhere
/// in the input. A token is that single character, so tokens never overlap
/// each other or neighbouring author text.
struct Sentinel {
    marks: [char; 4],
}

const ESCAPED_FORMS: [&str; 4] = [r"\\(", r"\\)", r"\\[", r"\\]"];

impl Sentinel {
    fn for_input(s: &str) -> Option<Self> {
        let mut free = ('\u{E000}'..='\u{F8FF}').filter(|c| !s.contains(*c));
        let marks = [free.next()?, free.next()?, free.next()?, free.next()?];
        Some(Self { marks })
    }

    fn slot(delim: &str) -> usize {
        match delim {
            "(" => 0,
            ")" => 1,
            "[" => 2,
            _ => 3,
        }
    }

    fn protect(&self, s: &str) -> String {
        RE_ESCAPED_DELIM
            .replace_all(s, |caps: &Captures<'_>| {
                self.marks[Self::slot(&caps[1])].to_string()
            })
            .into_owned()
    }

    fn restore(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 8);
        for c in s.chars() {
            match self.marks.iter().position(|m| *m == c) {
                Some(slot) => out.push_str(ESCAPED_FORMS[slot]),
                None => out.push(c),
            }
        }
        out
    }
}

// ── Step 2: Bracket delimiters ──────────────────────────────────────────────

// A body may contain backslash commands (and `\\` line breaks) but never
// another bracket delimiter; inline bodies also stay on one line.
static RE_DISPLAY_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\[((?:[^\\]|\\[^()\[\]])+?)\\\]").unwrap());
static RE_INLINE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\(((?:[^\\\n]|\\[^()\[\]\n])+?)\\\)").unwrap());

fn rewrite_math_pairs(input: &str) -> String {
    let mut current = input.to_string();
    // Each productive round removes at least two delimiter tokens.
    loop {
        let display = RE_DISPLAY_PAIR.replace_all(&current, |caps: &Captures<'_>| {
            format!("$${}$$", &caps[1])
        });
        let next = RE_INLINE_PAIR
            .replace_all(&display, |caps: &Captures<'_>| format!("${}$", &caps[1]))
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

// ── Step 4: Fenced math blocks ──────────────────────────────────────────────

static RE_MATH_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:latex|math)(.*?)```").unwrap());

fn rewrite_fences(input: &str) -> String {
    RE_MATH_FENCE
        .replace_all(input, |caps: &Captures<'_>| format!("$${}$$", &caps[1]))
        .into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
