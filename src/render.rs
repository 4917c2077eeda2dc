//! Seam between a [`Document`] and an external math typesetting engine.
//!
//! This crate does not typeset anything itself. A host application plugs
//! its engine (KaTeX over FFI, MathJax in a sidecar, a MathML converter…) in
//! through [`MathRenderer`] and walks the document with the helpers below.
//!
//! Rendering never fails from the caller's point of view: when the engine
//! rejects an expression, the helpers log a warning and emit the payload as
//! literal text with its delimiters stripped.

use crate::document::{Document, Paragraph, Segment};
use crate::error::RenderError;
use tracing::warn;

/// An external math engine.
pub trait MathRenderer: Send + Sync {
    /// Typeset one expression. `expr` is [`Segment::math_source`] output:
    /// delimiter-free, whitespace-collapsed.
    fn render(&self, expr: &str, display_mode: bool) -> Result<String, RenderError>;
}

/// One rendered segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Prose, or math the engine rejected (payload without delimiters).
    Text(String),
    /// Engine output for an inline expression.
    Inline(String),
    /// Engine output for a display expression.
    Display(String),
}

impl Rendered {
    pub fn as_str(&self) -> &str {
        match self {
            Rendered::Text(s) | Rendered::Inline(s) | Rendered::Display(s) => s,
        }
    }
}

/// Render one segment, falling back to literal text on engine failure.
pub fn render_segment(renderer: &dyn MathRenderer, segment: &Segment) -> Rendered {
    let display = matches!(segment, Segment::DisplayMath(_));
    let Some(source) = segment.math_source() else {
        return Rendered::Text(segment.text().to_string());
    };

    match renderer.render(&source, display) {
        Ok(out) if display => Rendered::Display(out),
        Ok(out) => Rendered::Inline(out),
        Err(e) => {
            warn!("math render failed, showing source text: {}", e);
            Rendered::Text(segment.text().to_string())
        }
    }
}

/// Render every segment of a paragraph in order.
pub fn render_paragraph(renderer: &dyn MathRenderer, paragraph: &Paragraph) -> Vec<Rendered> {
    paragraph
        .segments
        .iter()
        .map(|seg| render_segment(renderer, seg))
        .collect()
}

/// Render a whole document to a flat string: paragraphs, steps and options
/// separated by blank lines.
pub fn render_document(renderer: &dyn MathRenderer, doc: &Document) -> String {
    let join = |segments: Vec<Rendered>| -> String {
        segments.iter().map(Rendered::as_str).collect::<String>()
    };

    let mut parts: Vec<String> = doc
        .paragraphs
        .iter()
        .map(|p| join(render_paragraph(renderer, p)))
        .collect();

    for step in &doc.steps {
        parts.push(step.display_title());
        parts.extend(step.body.iter().map(|p| join(render_paragraph(renderer, p))));
    }

    for opt in &doc.options {
        let body = join(opt.body.iter().map(|s| render_segment(renderer, s)).collect());
        parts.push(format!("({}) {}", opt.label, body));
    }

    parts.join("\n\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Wraps expressions in tags; rejects anything with unbalanced braces.
    #[derive(Default)]
    struct TagRenderer {
        seen: Mutex<Vec<(String, bool)>>,
    }

    impl MathRenderer for TagRenderer {
        fn render(&self, expr: &str, display_mode: bool) -> Result<String, RenderError> {
            self.seen.lock().unwrap().push((expr.to_string(), display_mode));
            if expr.matches('{').count() != expr.matches('}').count() {
                return Err(RenderError::Parse {
                    expr: expr.to_string(),
                    detail: "unbalanced braces".into(),
                });
            }
            let tag = if display_mode { "D" } else { "I" };
            Ok(format!("<{tag}>{expr}</{tag}>"))
        }
    }

    #[test]
    fn test_plain_text_bypasses_engine() {
        let r = TagRenderer::default();
        let out = render_segment(&r, &Segment::PlainText("hello".into()));
        assert_eq!(out, Rendered::Text("hello".into()));
        assert!(r.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_engine_receives_collapsed_source_and_mode() {
        let r = TagRenderer::default();
        let out = render_segment(&r, &Segment::DisplayMath("\n  a +\n b \n".into()));
        assert_eq!(out, Rendered::Display("<D>a + b</D>".into()));
        assert_eq!(r.seen.lock().unwrap()[0], ("a + b".to_string(), true));
    }

    #[test]
    fn test_failure_falls_back_to_literal_payload() {
        let r = TagRenderer::default();
        let out = render_segment(&r, &Segment::InlineMath(r"\frac{1".into()));
        assert_eq!(out, Rendered::Text(r"\frac{1".into()));
    }

    #[test]
    fn test_render_paragraph_keeps_order() {
        let r = TagRenderer::default();
        let p = Paragraph::new(vec![
            Segment::PlainText("Let ".into()),
            Segment::InlineMath("x".into()),
            Segment::PlainText(" vary.".into()),
        ]);
        let out: Vec<String> = render_paragraph(&r, &p)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        assert_eq!(out, vec!["Let ", "<I>x</I>", " vary."]);
    }

    #[test]
    fn test_render_document_sections() {
        let r = TagRenderer::default();
        let doc = crate::normalize(
            "Pick: (A) $y$ (B) $z{$",
            &crate::NormalizeConfig {
                extract_options: true,
                ..Default::default()
            },
        );
        assert_eq!(render_document(&r, &doc), "Pick:\n\n(A) <I>y</I>\n\n(B) z{");
    }
}
