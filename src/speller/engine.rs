use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    WordBreaking,
    SpellingErrors,
    SpellingErrorsWithSuggestions,
}

/// One unit of analysis, usually a word, owning its sub-segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub length: usize,
    pub is_clean: bool,
    pub sub_segments: Vec<Segment>,
    pub suggestions: Vec<String>,
}

impl Segment {
    pub fn new(start: usize, length: usize) -> Self {
        Self {
            start,
            length,
            is_clean: true,
            sub_segments: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn flagged(mut self) -> Self {
        self.is_clean = false;
        self
    }

    pub fn with_children(mut self, children: Vec<Segment>) -> Self {
        self.sub_segments = children;
        self
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub start: usize,
    pub end: usize,
    pub segments: Vec<Segment>,
}

/// Pluggable linguistic analysis over plain-text buffers.
pub trait LinguisticEngine {
    fn initialize(&mut self) -> Result<(), EngineError>;

    /// Returns `false` when the locale is not supported.
    fn set_locale(&mut self, locale: &str) -> bool;

    fn set_mode(&mut self, mode: EngineMode);

    /// The sentence starting at or after `from`, `None` once the buffer is exhausted.
    fn next_sentence(&mut self, text: &[char], from: usize) -> Option<Sentence>;

    /// Skip this word in later analysis.
    fn ignore_word(&mut self, _word: &str) {}
}
