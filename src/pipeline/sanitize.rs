//! Sanitizer: remove transport artefacts from LLM output.
//!
//! Generated text usually reaches us after one JSON round-trip too many, so
//! newlines and quotes arrive as the literal two-character escapes `\n`,
//! `\r` and `\"`. The hard part is that a backslash followed by `n` or `r`
//! is also how LaTeX spells `\neq`, `\nu`, `\rho` or `\right`; those must
//! survive untouched.
//!
//! ## Rule Order
//!
//! Invisible characters go first so a zero-width space can never hide an
//! escape sequence or a blank line from the later rules; line endings are
//! normalised before blank-line collapsing so `\r\n\r\n\r\n` collapses too.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Apply every sanitizer rule to raw pipeline input.
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// Rules (applied in order):
/// 1. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 2. Decode literal `\n`, `\r`, `\"` transport escapes (LaTeX commands excepted)
/// 3. Normalise line endings (CRLF / CR → LF)
/// 4. Collapse 3+ consecutive newlines down to 2
pub fn sanitize(raw: &str) -> String {
    let s = remove_invisible_chars(raw);
    let s = decode_transport_escapes(&s);
    let s = normalise_line_endings(&s);
    let s = collapse_newlines(&s);
    debug!("sanitize: {} → {} bytes", raw.len(), s.len());
    s
}

// ── Rule 1: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 2: Decode transport escapes ────────────────────────────────────────

/// LaTeX control words beginning with `n` or `r`. A backslash followed by
/// one of these words is math, not an escaped newline.
static LATEX_NR_COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // n…
        "nabla", "natural", "ncong", "ne", "nearrow", "neg", "neq", "newline", "nexists",
        "ngeq", "ngtr", "ni", "nleftarrow", "nleq", "nless", "nmid", "noindent", "nolimits",
        "nonumber", "not", "notin", "nparallel", "nprec", "nrightarrow", "nsim", "nsubseteq",
        "nsucc", "nsupseteq", "nu", "nvdash", "nwarrow",
        // r…
        "rangle", "rbrace", "rbrack", "rceil", "Re", "restriction", "rfloor", "rgroup",
        "rhd", "rho", "right", "rightarrow", "rightharpoondown", "rightharpoonup",
        "rightleftarrows", "rightleftharpoons", "rightrightarrows", "rightsquigarrow",
        "rightthreetimes", "risingdotseq", "rm", "rmoustache", "root", "rq", "rtimes", "rVert",
        "rvert",
    ]
    .into_iter()
    .collect()
});

/// Decode `\n`, `\r`, `\"` where the backslash is a lone transport escape.
///
/// Backslash runs are read as pairs: in `\\n` the backslashes form a LaTeX
/// line break and the `n` is ordinary text; in `\\\n` the last backslash is
/// unpaired and escapes the `n`.
fn decode_transport_escapes(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let run = rest[pos..].bytes().take_while(|&b| b == b'\\').count();
        let after = &rest[pos + run..];

        // Paired backslashes are literal.
        out.push_str(&rest[pos..pos + run - run % 2]);

        if run % 2 == 0 {
            rest = after;
            continue;
        }

        match after.chars().next() {
            Some('"') => {
                out.push('"');
                rest = &after[1..];
            }
            Some(c @ ('n' | 'r')) if !starts_latex_command(after) => {
                out.push(if c == 'n' { '\n' } else { '\r' });
                rest = &after[1..];
            }
            _ => {
                out.push('\\');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// `word` is the text right after a backslash; true if its leading letters
/// spell a known LaTeX command.
fn starts_latex_command(word: &str) -> bool {
    let len = word
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    LATEX_NR_COMMANDS.contains(&word[..len])
}

// ── Rule 3: Normalise line endings ──────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 4: Collapse excessive newlines ─────────────────────────────────────

static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_newlines(input: &str) -> String {
    RE_NEWLINE_RUN.replace_all(input, "\n\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_literal_newlines() {
        assert_eq!(sanitize(r"first\nsecond"), "first\nsecond");
        assert_eq!(sanitize(r"para one\n\npara two"), "para one\n\npara two");
    }

    #[test]
    fn test_decodes_escaped_quotes() {
        assert_eq!(sanitize(r#"say \"hi\""#), r#"say "hi""#);
    }

    #[test]
    fn test_keeps_latex_commands() {
        let input = r"$a \neq b$, $\nu = \rho \nabla f$, $\left( x \right)$";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_newline_before_capitalised_word() {
        // "\nStep" is not a command, so it is a newline followed by "Step".
        assert_eq!(sanitize(r"Intro.\nStep 1"), "Intro.\nStep 1");
    }

    #[test]
    fn test_latex_line_break_untouched() {
        let input = r"\begin{cases} x \\ n \end{cases}";
        assert_eq!(sanitize(input), input);
        assert_eq!(sanitize(r"a \\nb"), r"a \\nb");
    }

    #[test]
    fn test_odd_backslash_run_escapes_last() {
        assert_eq!(sanitize(r"a\\\nb"), "a\\\\\nb");
    }

    #[test]
    fn test_escaped_crlf() {
        assert_eq!(sanitize(r"a\r\nb"), "a\nb");
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(sanitize("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(sanitize(r"a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(sanitize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(sanitize("x\u{200B}\\ny\u{FEFF}"), "x\ny");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r"a\\\nb\n\n\n\nc",
            r#"\"quoted\" \neq \n"#,
            "plain text",
            "\\",
            r"trailing\",
            "a\r\n\r\n\r\n\r\nb",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(sanitize("θ = 30° — ✓"), "θ = 30° — ✓");
    }
}
