//! Bare-math reclassifier: give undelimited LaTeX a chance to render.
//!
//! Models sometimes forget the delimiters and emit `\frac{1}{2}` or `x^2`
//! straight into prose. A plain-text segment that contains a known command
//! token or a subscript/superscript is handed to the math engine as inline
//! math, verbatim. This over-guesses on purpose: if the engine cannot parse
//! the result, the renderer falls back to literal text (see
//! [`crate::render`]).

use crate::document::{AnswerOption, Document, Paragraph, Segment, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Commands whose presence marks a plain-text segment as bare math.
pub const MATH_COMMANDS: &[&str] = &[
    "frac", "dfrac", "tfrac", "sqrt", "sum", "prod", "int", "iint", "oint", "lim", "times",
    "div", "pm", "mp", "cdot", "leq", "geq", "neq", "approx", "infty", "partial", "vec",
    "hat", "bar", "overline", "mathrm", "mathbf", "log", "ln", "sin", "cos", "tan", "alpha",
    "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta", "vartheta",
    "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon",
    "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi",
    "Sigma", "Phi", "Psi", "Omega",
];

static RE_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\\ce\{{|\\(?:{})(?:[^A-Za-z]|$)",
        MATH_COMMANDS.join("|")
    ))
    .unwrap()
});

// A single-letter identifier, a number, or a closing bracket, immediately
// followed by `_`/`^` and then `{` or an alphanumeric. Word characters before
// the identifier rule out snake_case prose.
static RE_SUB_SUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:^|[^A-Za-z0-9_\\])(?:[A-Za-z]|\d+)|[)\]}])[_^](?:\{|[A-Za-z0-9])")
        .unwrap()
});

/// True if a plain-text fragment looks like undelimited math.
pub fn looks_like_math(text: &str) -> bool {
    RE_COMMAND.is_match(text) || RE_SUB_SUP.is_match(text)
}

/// Reclassify bare-math plain text as inline math across the whole document.
///
/// Idempotent: math segments are never touched, so a second pass finds
/// nothing left to change.
pub fn reclassify(doc: Document) -> Document {
    let mut changed = 0usize;
    let doc = Document {
        paragraphs: doc
            .paragraphs
            .into_iter()
            .map(|p| reclassify_paragraph(p, &mut changed))
            .collect(),
        steps: doc
            .steps
            .into_iter()
            .map(|step| Step {
                body: step
                    .body
                    .into_iter()
                    .map(|p| reclassify_paragraph(p, &mut changed))
                    .collect(),
                ..step
            })
            .collect(),
        options: doc
            .options
            .into_iter()
            .map(|opt| AnswerOption {
                body: reclassify_segments(opt.body, &mut changed),
                ..opt
            })
            .collect(),
    };
    if changed > 0 {
        debug!("reclassify: {} plain segments promoted to inline math", changed);
    }
    doc
}

fn reclassify_paragraph(p: Paragraph, changed: &mut usize) -> Paragraph {
    Paragraph::new(reclassify_segments(p.segments, changed))
}

fn reclassify_segments(segments: Vec<Segment>, changed: &mut usize) -> Vec<Segment> {
    segments
        .into_iter()
        .map(|seg| match seg {
            Segment::PlainText(text) if looks_like_math(&text) => {
                *changed += 1;
                Segment::InlineMath(text)
            }
            other => other,
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
