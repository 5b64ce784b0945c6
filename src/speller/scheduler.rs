use crate::config::ScanSettings;
use crate::speller::document::TextTree;
use crate::speller::engine::{EngineMode, LinguisticEngine};
use crate::speller::segments::{sentence_errors, SentenceIter};
use crate::speller::status::StatusTable;
use crate::speller::text_map::TextMap;
use crate::LogicalDirection;
use log::{debug, trace};
use std::ops::Range;
use std::time::Instant;

/// Words longer than this many strides are cut at the window edge.
const MAX_WORD_STRIDES: usize = 8;

/// The part of the document a scan may retag, and the wider margin the engine reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWindow {
    pub content: Range<usize>,
    pub context: Range<usize>,
}

/// One scan step over a document, borrowing everything it touches.
pub struct ScanScheduler<'a> {
    tree: &'a dyn TextTree,
    status: &'a mut StatusTable,
    engine: &'a mut dyn LinguisticEngine,
    settings: &'a ScanSettings,
}

impl<'a> ScanScheduler<'a> {
    pub fn new(
        tree: &'a dyn TextTree,
        status: &'a mut StatusTable,
        engine: &'a mut dyn LinguisticEngine,
        settings: &'a ScanSettings,
    ) -> Self {
        Self {
            tree,
            status,
            engine,
            settings,
        }
    }

    fn stride(&self) -> usize {
        self.settings.stride.max(1)
    }

    /// Word ranges, in document offsets, of `window`.
    pub fn word_ranges(&mut self, window: Range<usize>) -> Vec<Range<usize>> {
        let end = window.end.min(self.tree.symbol_count());
        if window.start >= end {
            return Vec::new();
        }
        self.engine.set_mode(EngineMode::WordBreaking);
        let map = TextMap::new(self.tree, window.start, end, window.start, end);
        let mut words = Vec::new();
        for sentence in SentenceIter::new(&mut *self.engine, map.text()) {
            words.extend(
                sentence
                    .segments
                    .iter()
                    .map(|segment| map.map_range(segment.start, segment.length)),
            );
        }
        words
    }

    /// The word touching `position`, ends included.
    pub fn word_at(&mut self, position: usize) -> Option<Range<usize>> {
        let stride = self.stride();
        let window = position.saturating_sub(stride)..position + stride;
        self.word_ranges(window)
            .into_iter()
            .find(|word| word.start <= position && position <= word.end)
    }

    /// Start of the word containing `position`, or `position` between words.
    fn word_start(&mut self, position: usize) -> usize {
        let stride = self.stride();
        for strides in 1..=MAX_WORD_STRIDES {
            let window_start = position.saturating_sub(stride * strides);
            let window = window_start..position + stride;
            let Some(word) = self
                .word_ranges(window)
                .into_iter()
                .find(|word| word.start <= position && position < word.end)
            else {
                return position;
            };
            if word.start > window_start || window_start == 0 {
                return word.start;
            }
        }
        position
    }

    /// End of the word containing `position - 1`, or `position` between words.
    fn word_end(&mut self, position: usize) -> usize {
        let length = self.tree.symbol_count();
        if position == 0 || position >= length {
            return position.min(length);
        }
        let stride = self.stride();
        for strides in 1..=MAX_WORD_STRIDES {
            let window_end = (position + stride * strides).min(length);
            let window = position.saturating_sub(stride)..window_end;
            let Some(word) = self
                .word_ranges(window)
                .into_iter()
                .find(|word| word.start < position && position <= word.end)
            else {
                return position;
            };
            if word.end < window_end || window_end == length {
                return word.end;
            }
        }
        position
    }

    /// Start of the last uniform-language run of `[from, to)`.
    fn last_language_run_start(&self, from: usize, to: usize) -> usize {
        let mut start = from;
        let mut position = from;
        while position < to {
            let end = self.tree.language_run_end(position, to);
            if end < to {
                start = end;
            }
            position = end.max(position + 1);
        }
        start
    }

    /// Widen a dirty range to whole words plus enough surrounding words for phrase detection.
    ///
    /// The context stops early at a language change, at an error run or at the document edge.
    pub fn expand(&mut self, dirty: Range<usize>) -> ScanWindow {
        let length = self.tree.symbol_count();
        let content_start = self.word_start(dirty.start.min(length));
        let content_end = self.word_end(dirty.end.min(length)).max(content_start);
        let stride = self.stride();
        let needed = self.settings.min_word_breaks;

        let mut context_start = content_start;
        let mut context_end = content_end;
        if needed == 0 {
            return ScanWindow {
                content: content_start..content_end,
                context: context_start..context_end,
            };
        }

        let floor = self
            .status
            .next_error_transition(content_start, LogicalDirection::Backward)
            .unwrap_or(0);
        let mut window_start = content_start;
        while window_start > floor {
            window_start = window_start.saturating_sub(stride).max(floor);
            let language_start = self.last_language_run_start(window_start, content_start);
            let halted = language_start > window_start || window_start == floor;
            // A word starting right at an open window edge may be cut.
            let starts: Vec<usize> = self
                .word_ranges(language_start..content_start)
                .into_iter()
                .map(|word| word.start)
                .filter(|&start| halted || start > window_start)
                .collect();
            if starts.len() >= needed {
                context_start = starts[starts.len() - needed];
                break;
            }
            if halted {
                context_start = language_start;
                break;
            }
        }

        let ceiling = self
            .status
            .next_error_transition(content_end, LogicalDirection::Forward)
            .unwrap_or(length)
            .min(length);
        let mut window_end = content_end;
        while window_end < ceiling {
            window_end = (window_end + stride).min(ceiling);
            let language_end = self.tree.language_run_end(content_end, window_end);
            let halted = language_end < window_end || window_end == ceiling;
            let ends: Vec<usize> = self
                .word_ranges(content_end..language_end)
                .into_iter()
                .map(|word| word.end)
                .filter(|&end| halted || end < window_end)
                .collect();
            if ends.len() >= needed {
                context_end = ends[needed - 1];
                break;
            }
            if halted {
                context_end = language_end;
                break;
            }
        }

        trace!(
            "expanded {:?} to content {:?} context {:?}",
            dirty,
            content_start..content_end,
            context_start..context_end
        );
        ScanWindow {
            content: content_start..content_end,
            context: context_start..context_end,
        }
    }

    /// Scan `content` with `context` as read-only margin.
    ///
    /// Returns the timeout position when `deadline` passed before the content was
    /// finished. That position is always past `content.start`; everything from it
    /// on is dirty again.
    pub fn scan_range(&mut self, content: Range<usize>, context: Range<usize>, deadline: Option<Instant>) -> Option<usize> {
        if content.is_empty() {
            return None;
        }
        self.status.mark_clean(content.clone());

        let mut position = content.start;
        while position < content.end {
            let chunk_end = self.tree.language_run_end(position, content.end);
            let language = self.tree.language_at(position);
            if !self.engine.set_locale(&language) {
                debug!("no engine support for {}, leaving {:?} clean", language, position..chunk_end);
                position = chunk_end;
                continue;
            }
            self.engine.set_mode(EngineMode::SpellingErrors);

            let context_start = if position == content.start { context.start } else { position };
            let context_end = if chunk_end == content.end { context.end } else { chunk_end };
            let map = TextMap::new(self.tree, context_start, context_end, position, chunk_end);
            let (content_lo, content_hi) = (map.content_start_offset(), map.content_end_offset());

            for sentence in SentenceIter::new(&mut *self.engine, map.text()) {
                for segment in sentence_errors(&sentence) {
                    if segment.start >= content_lo && segment.end() <= content_hi {
                        self.status.mark_error(map.map_range(segment.start, segment.length));
                    } else if segment.start < content_hi && segment.end() > content_lo {
                        debug!(
                            "dropping error {:?} that straddles the content edge",
                            map.map_range(segment.start, segment.length)
                        );
                    }
                }
                if sentence.end > content_lo {
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            let reached = map.map_position(sentence.end.min(content_hi));
                            let timeout = reached.clamp(content.start + 1, content.end);
                            if timeout < content.end {
                                debug!("scan timed out at {} of {:?}", timeout, content);
                                self.status.mark_dirty(timeout..content.end);
                                return Some(timeout);
                            }
                        }
                    }
                }
                if sentence.end >= content_hi {
                    break;
                }
            }
            position = chunk_end;
        }
        None
    }
}

/// Split `content` around `excluded`, returning the parts that may be scanned now.
pub fn exclude(content: &Range<usize>, excluded: &Range<usize>) -> Vec<Range<usize>> {
    if excluded.is_empty() || excluded.end <= content.start || excluded.start >= content.end {
        return vec![content.clone()];
    }
    [content.start..excluded.start, excluded.end..content.end]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;
    use crate::checker::DictionaryEngine;
    use crate::speller::document::{ElementInfo, SymbolDocument};
    use crate::speller::status::RunTag;
    use crate::Config;

    fn engine(words: &[&str]) -> DictionaryEngine {
        let mut engine = DictionaryEngine::new(Dictionary::from_words(words).unwrap(), &Config::default());
        engine.initialize().unwrap();
        engine
    }

    fn errors(status: &StatusTable) -> Vec<Range<usize>> {
        status
            .iter()
            .filter(|(_, state)| state.tag() == RunTag::Error)
            .map(|(range, _)| range)
            .collect()
    }

    const WORDS: &[&str] = &["one", "two", "three", "four", "five", "six", "seven", "eight"];

    #[test]
    fn test_expand_to_words_and_context() {
        let doc = SymbolDocument::from_text("one two three four five six seven eight", "en-US");
        let mut status = StatusTable::new(doc.symbol_count());
        let mut engine = engine(WORDS);
        let settings = ScanSettings {
            stride: 4,
            min_word_breaks: 2,
            ..Default::default()
        };
        let mut scheduler = ScanScheduler::new(&doc, &mut status, &mut engine, &settings);
        // "fo|ur fi|ve"
        let window = scheduler.expand(16..21);
        assert_eq!(window.content, 14..23);
        assert_eq!(window.context, 4..33);
    }

    #[test]
    fn test_context_halts_at_language_change() {
        let mut doc = SymbolDocument::new("en-US");
        doc.open(ElementInfo::block().with_language("fr-FR"))
            .push_text("un deux trois")
            .close()
            .push_text(" one two three");
        let mut status = StatusTable::new(doc.symbol_count());
        let mut engine = engine(WORDS);
        let settings = ScanSettings::default();
        let mut scheduler = ScanScheduler::new(&doc, &mut status, &mut engine, &settings);
        let window = scheduler.expand(20..23);
        assert_eq!(window.content, 20..23);
        assert_eq!(window.context.start, 15);
    }

    #[test]
    fn test_scan_marks_errors_in_content_only() {
        let doc = SymbolDocument::from_text("one twoo three fuor five", "en-US");
        let mut status = StatusTable::new(doc.symbol_count());
        let mut engine = engine(WORDS);
        let settings = ScanSettings::default();
        let mut scheduler = ScanScheduler::new(&doc, &mut status, &mut engine, &settings);
        assert_eq!(scheduler.scan_range(9..19, 0..24, None), None);
        assert_eq!(errors(&status), vec![15..19]);
        assert_eq!(status.get_first_dirty_range(0), Some(0..9));
    }

    #[test]
    fn test_zero_budget_still_progresses() {
        let doc = SymbolDocument::from_text("one two. three four. five six. seven eight.", "en-US");
        let mut status = StatusTable::new(doc.symbol_count());
        let mut engine = engine(WORDS);
        let settings = ScanSettings::default();
        let mut scheduler = ScanScheduler::new(&doc, &mut status, &mut engine, &settings);
        let end = doc.symbol_count();
        let mut start = 0;
        let mut steps = 0;
        while let Some(timeout) = scheduler.scan_range(start..end, 0..end, Some(Instant::now())) {
            assert!(timeout > start);
            start = timeout;
            steps += 1;
        }
        assert!(steps >= 3);
        assert_eq!(status.get_first_dirty_range(0), None);
    }

    #[test]
    fn test_exclusion_splits_content() {
        assert_eq!(exclude(&(0..10), &(3..5)), vec![0..3, 5..10]);
        assert_eq!(exclude(&(0..10), &(0..5)), vec![5..10]);
        assert_eq!(exclude(&(0..10), &(10..12)), vec![0..10]);
        assert_eq!(exclude(&(0..10), &(4..4)), vec![0..10]);
        assert!(exclude(&(2..6), &(0..8)).is_empty());
    }
}
