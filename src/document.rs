//! Output types produced by the normalisation pipeline.
//!
//! A [`Document`] is an immutable value: produced once per input, handed to
//! the rendering layer, then dropped. Every [`Step`] and [`AnswerOption`] is
//! self-contained so the renderer never needs to look back at the raw text.

use serde::{Deserialize, Serialize};

/// Smallest typed unit of a document.
///
/// Math payloads are stored without their surrounding `$`/`$$` delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    PlainText(String),
    InlineMath(String),
    DisplayMath(String),
}

impl Segment {
    /// The raw payload, delimiter-stripped for math.
    pub fn text(&self) -> &str {
        match self {
            Segment::PlainText(s) | Segment::InlineMath(s) | Segment::DisplayMath(s) => s,
        }
    }

    pub fn is_math(&self) -> bool {
        !matches!(self, Segment::PlainText(_))
    }

    /// The exact string handed to a math engine, or `None` for plain text.
    ///
    /// Whitespace runs (including newlines inside multi-line display math)
    /// are collapsed to one space and the result is trimmed.
    pub fn math_source(&self) -> Option<String> {
        match self {
            Segment::PlainText(_) => None,
            Segment::InlineMath(s) | Segment::DisplayMath(s) => Some(collapse_whitespace(s)),
        }
    }

    /// Re-emit the segment in canonical markup.
    pub fn to_markup(&self) -> String {
        match self {
            Segment::PlainText(s) => s.clone(),
            Segment::InlineMath(s) => format!("${}$", s),
            Segment::DisplayMath(s) => format!("$${}$$", s),
        }
    }
}

/// Ordered run of segments that never crosses a paragraph boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub segments: Vec<Segment>,
    /// The paragraph is exactly one display-math span and can be laid out
    /// as its own block.
    pub is_standalone_display: bool,
}

impl Paragraph {
    /// Build a paragraph and derive its standalone-display flag.
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut non_blank = segments
            .iter()
            .filter(|s| !matches!(s, Segment::PlainText(t) if t.trim().is_empty()));
        let is_standalone_display = matches!(
            (non_blank.next(), non_blank.next()),
            (Some(Segment::DisplayMath(_)), None)
        );
        Self {
            segments,
            is_standalone_display,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text().trim().is_empty())
    }

    pub fn to_markup(&self) -> String {
        self.segments.iter().map(Segment::to_markup).collect()
    }

    /// Concatenated payloads with all delimiters stripped.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }
}

/// One derivation step recovered from a numbered explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in document order (not the number written in the marker).
    pub index: u32,
    pub title: Option<String>,
    pub body: Vec<Paragraph>,
}

impl Step {
    /// Title to show, falling back to `Step N`.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => format!("Step {}", self.index),
        }
    }
}

/// A multiple-choice option pulled out of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// `"1"`–`"4"` or `"A"`–`"D"`.
    pub label: String,
    pub body: Vec<Segment>,
    pub is_correct: Option<bool>,
}

impl AnswerOption {
    /// 0-based position implied by the label (`1`/`A` → 0 … `4`/`D` → 3).
    pub fn label_index(&self) -> Option<u32> {
        match self.label.as_str() {
            "1" | "A" => Some(0),
            "2" | "B" => Some(1),
            "3" | "C" => Some(2),
            "4" | "D" => Some(3),
            _ => None,
        }
    }

    pub fn to_markup(&self) -> String {
        let body: String = self.body.iter().map(Segment::to_markup).collect();
        format!("({}) {}", self.label, body)
    }
}

/// The render-ready result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<AnswerOption>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.steps.is_empty() && self.options.is_empty()
    }

    /// Every segment in document order: paragraphs, then step bodies, then options.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.paragraphs
            .iter()
            .chain(self.steps.iter().flat_map(|s| s.body.iter()))
            .flat_map(|p| p.segments.iter())
            .chain(self.options.iter().flat_map(|o| o.body.iter()))
    }

    /// Re-emit the document as canonical `$`/`$$` markup.
    pub fn to_markup(&self) -> String {
        let mut parts: Vec<String> = self.paragraphs.iter().map(Paragraph::to_markup).collect();

        for step in &self.steps {
            let mut block = format!("**Step {}:**", step.index);
            if let Some(ref t) = step.title {
                block.push(' ');
                block.push_str(t);
            }
            for p in &step.body {
                block.push('\n');
                block.push_str(&p.to_markup());
            }
            parts.push(block);
        }

        if !self.options.is_empty() {
            let opts: Vec<String> = self.options.iter().map(AnswerOption::to_markup).collect();
            parts.push(opts.join(" "));
        }

        parts.join("\n\n")
    }

    /// Plain reading text with every math delimiter stripped.
    pub fn plain_text(&self) -> String {
        let mut parts: Vec<String> = self.paragraphs.iter().map(Paragraph::plain_text).collect();
        for step in &self.steps {
            parts.push(step.display_title());
            parts.extend(step.body.iter().map(Paragraph::plain_text));
        }
        for opt in &self.options {
            let body: String = opt.body.iter().map(Segment::text).collect();
            parts.push(format!("({}) {}", opt.label, body));
        }
        parts.join("\n\n")
    }

    /// Count what the pipeline produced.
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            paragraphs: self.paragraphs.len(),
            standalone_display: self
                .paragraphs
                .iter()
                .filter(|p| p.is_standalone_display)
                .count(),
            steps: self.steps.len(),
            options: self.options.len(),
            ..Default::default()
        };
        for seg in self.segments() {
            match seg {
                Segment::PlainText(_) => stats.plain_segments += 1,
                Segment::InlineMath(_) => stats.inline_math += 1,
                Segment::DisplayMath(_) => stats.display_math += 1,
            }
        }
        stats
    }
}

/// Summary counts for a [`Document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub paragraphs: usize,
    pub standalone_display: usize,
    pub plain_segments: usize,
    pub inline_math: usize,
    pub display_math: usize,
    pub steps: usize,
    pub options: usize,
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
