//! Configuration types for text normalisation.
//!
//! Every optional behaviour of the pipeline is controlled through
//! [`NormalizeConfig`], built via its [`NormalizeConfigBuilder`]. The struct is
//! passed by value into the entry points; there is no loosely-typed option
//! bag and no global state.

use crate::error::MathDocError;
use serde::{Deserialize, Serialize};

/// Default minimum text length (in characters) before step detection runs.
pub const DEFAULT_STEP_MIN_LEN: usize = 200;

/// Configuration for one normalisation call.
///
/// Built via [`NormalizeConfig::builder()`] or using
/// [`NormalizeConfig::default()`].
///
/// # Example
/// ```rust
/// use mathdoc::NormalizeConfig;
///
/// let config = NormalizeConfig::builder()
///     .extract_options(true)
///     .correct_option_index(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.correct_option_index, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Re-group long numbered explanations into [`crate::document::Step`]s. Default: false.
    ///
    /// Only fires when the normalised text is longer than `step_min_len`
    /// characters and contains at least two step markers.
    pub extract_steps: bool,

    /// Pull `(1) … (4)` / `(A) … (D)` runs out into
    /// [`crate::document::AnswerOption`]s. Default: false.
    pub extract_options: bool,

    /// 0-based index of the correct option (0 = `1`/`A`, 3 = `4`/`D`).
    /// When `None`, `is_correct` is left unset on every option.
    pub correct_option_index: Option<u32>,

    /// Character count the text must exceed before step detection runs. Default: 200.
    pub step_min_len: usize,

    /// What counts as a paragraph boundary. Default: [`ParagraphBreak::BlankLine`].
    pub paragraph_break: ParagraphBreak,

    /// Run the bare-math reclassifier over remaining plain text. Default: true.
    pub reclassify_bare_math: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            extract_steps: false,
            extract_options: false,
            correct_option_index: None,
            step_min_len: DEFAULT_STEP_MIN_LEN,
            paragraph_break: ParagraphBreak::default(),
            reclassify_bare_math: true,
        }
    }
}

impl NormalizeConfig {
    /// Create a new builder for `NormalizeConfig`.
    pub fn builder() -> NormalizeConfigBuilder {
        NormalizeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NormalizeConfig`].
#[derive(Debug)]
pub struct NormalizeConfigBuilder {
    config: NormalizeConfig,
}

impl NormalizeConfigBuilder {
    pub fn extract_steps(mut self, v: bool) -> Self {
        self.config.extract_steps = v;
        self
    }

    pub fn extract_options(mut self, v: bool) -> Self {
        self.config.extract_options = v;
        self
    }

    pub fn correct_option_index(mut self, index: u32) -> Self {
        self.config.correct_option_index = Some(index);
        self
    }

    pub fn step_min_len(mut self, chars: usize) -> Self {
        self.config.step_min_len = chars;
        self
    }

    pub fn paragraph_break(mut self, mode: ParagraphBreak) -> Self {
        self.config.paragraph_break = mode;
        self
    }

    pub fn reclassify_bare_math(mut self, v: bool) -> Self {
        self.config.reclassify_bare_math = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NormalizeConfig, MathDocError> {
        if let Some(idx) = self.config.correct_option_index {
            if idx > 3 {
                return Err(MathDocError::InvalidConfig(format!(
                    "correct option index must be 0–3, got {}",
                    idx
                )));
            }
        }
        Ok(self.config)
    }
}

/// Which boundaries split the normalised text into paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphBreak {
    /// Blank lines separate paragraphs; single newlines stay inside one. (default)
    #[default]
    BlankLine,
    /// Every newline starts a new paragraph.
    Newline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = NormalizeConfig::default();
        assert!(!c.extract_steps);
        assert!(!c.extract_options);
        assert_eq!(c.correct_option_index, None);
        assert_eq!(c.step_min_len, 200);
        assert_eq!(c.paragraph_break, ParagraphBreak::BlankLine);
        assert!(c.reclassify_bare_math);
    }

    #[test]
    fn test_builder_rejects_out_of_range_index() {
        let err = NormalizeConfig::builder()
            .correct_option_index(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, MathDocError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_sets_fields() {
        let c = NormalizeConfig::builder()
            .extract_steps(true)
            .step_min_len(50)
            .paragraph_break(ParagraphBreak::Newline)
            .reclassify_bare_math(false)
            .build()
            .unwrap();
        assert!(c.extract_steps);
        assert_eq!(c.step_min_len, 50);
        assert_eq!(c.paragraph_break, ParagraphBreak::Newline);
        assert!(!c.reclassify_bare_math);
    }

    #[test]
    fn test_deserialises_partial_json() {
        let c: NormalizeConfig =
            serde_json::from_str(r#"{"extract_options": true, "paragraph_break": "newline"}"#)
                .unwrap();
        assert!(c.extract_options);
        assert_eq!(c.paragraph_break, ParagraphBreak::Newline);
        assert_eq!(c.step_min_len, DEFAULT_STEP_MIN_LEN);
    }
}
