//! Pull iteration over engine sentences and extraction of minimal error spans.

use crate::speller::engine::{LinguisticEngine, Segment, Sentence};

/// Sentences of a buffer, pulled from the engine one at a time.
pub struct SentenceIter<'a> {
    engine: &'a mut dyn LinguisticEngine,
    text: &'a [char],
    next: usize,
}

impl<'a> SentenceIter<'a> {
    pub fn new(engine: &'a mut dyn LinguisticEngine, text: &'a [char]) -> Self {
        Self { engine, text, next: 0 }
    }
}

impl Iterator for SentenceIter<'_> {
    type Item = Sentence;

    fn next(&mut self) -> Option<Sentence> {
        if self.next >= self.text.len() {
            return None;
        }
        let sentence = self.engine.next_sentence(self.text, self.next)?;
        // An engine that reports an empty sentence must not stall the walk.
        self.next = sentence.end.max(self.next + 1);
        Some(sentence)
    }
}

/// The smallest flagged segments of `segment`.
///
/// A flagged segment whose children are all clean is itself the error.
pub fn error_segments<'s>(segment: &'s Segment, out: &mut Vec<&'s Segment>) {
    let before = out.len();
    for child in &segment.sub_segments {
        error_segments(child, out);
    }
    if out.len() == before && !segment.is_clean {
        out.push(segment);
    }
}

/// Errors of one sentence, in buffer order.
pub fn sentence_errors(sentence: &Sentence) -> Vec<&Segment> {
    let mut out = Vec::new();
    for segment in &sentence.segments {
        error_segments(segment, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_error_spans() {
        let compound = Segment::new(0, 9)
            .flagged()
            .with_children(vec![Segment::new(0, 4), Segment::new(5, 4).flagged()]);
        let whole = Segment::new(10, 3).flagged().with_children(vec![Segment::new(10, 3)]);
        let clean = Segment::new(14, 2);
        let sentence = Sentence {
            start: 0,
            end: 16,
            segments: vec![compound, whole, clean],
        };
        let spans: Vec<(usize, usize)> = sentence_errors(&sentence)
            .iter()
            .map(|s| (s.start, s.length))
            .collect();
        assert_eq!(spans, vec![(5, 4), (10, 3)]);
    }
}
