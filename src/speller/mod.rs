//! Incremental spell scanning of an editable document.
//!
//! A `Speller` keeps a [`StatusTable`] in step with document edits and, when
//! the host is idle, scans dirty text in time-sliced steps.

pub mod document;
pub mod engine;
pub mod scheduler;
pub mod segments;
pub mod status;
pub mod text_map;

use crate::config::ScanSettings;
use crate::LogicalDirection;
use document::{ChangeKind, TextChange, TextTree};
use engine::{EngineMode, LinguisticEngine};
use log::{debug, warn};
use scheduler::{exclude, ScanScheduler};
use segments::{sentence_errors, SentenceIter};
use serde::Serialize;
use status::{RunTag, StatusTable};
use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::time::{Duration, Instant};
use text_map::TextMap;

/// A flagged word, in document offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellingError {
    pub start: usize,
    pub end: usize,
    pub word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStatus {
    /// Nothing left to scan.
    Done,
    /// Budget used up; run again on the next idle slot.
    Continue,
}

/// Handle held by queued idle callbacks; goes dead when the session detaches.
#[derive(Debug, Clone)]
pub struct IdleTicket {
    alive: Rc<Cell<bool>>,
}

impl IdleTicket {
    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

pub struct Speller {
    engine: Box<dyn LinguisticEngine>,
    status: StatusTable,
    settings: ScanSettings,
    failed: bool,
    alive: Rc<Cell<bool>>,
    caret: Option<usize>,
    composition: Option<Range<usize>>,
    deferred: Option<Range<usize>>,
}

impl Speller {
    /// Start a session over a document of `length` symbols, all of them dirty.
    ///
    /// An engine that fails to initialise turns the session into a no-op.
    pub fn new(mut engine: Box<dyn LinguisticEngine>, length: usize, settings: ScanSettings) -> Self {
        let failed = match engine.initialize() {
            Ok(()) => false,
            Err(e) => {
                warn!("spell checking disabled: {}", e);
                true
            }
        };
        Self {
            engine,
            status: StatusTable::new(length),
            settings,
            failed,
            alive: Rc::new(Cell::new(true)),
            caret: None,
            composition: None,
            deferred: None,
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn status(&self) -> &StatusTable {
        &self.status
    }

    pub fn ticket(&self) -> IdleTicket {
        IdleTicket {
            alive: Rc::clone(&self.alive),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.alive.get()
    }

    /// Detach from the document. Tickets already handed out go dead.
    pub fn detach(&mut self) {
        self.alive.set(false);
        self.deferred = None;
    }

    fn active(&self) -> bool {
        !self.failed && self.alive.get()
    }

    pub fn on_text_change(&mut self, change: TextChange) {
        if !self.active() {
            return;
        }
        self.status.on_text_change(&change);
        if let Some(deferred) = self.deferred.as_mut() {
            *deferred = shift_range(deferred, &change);
        }
    }

    /// Move the caret. Returns `true` when deferred text became scannable.
    pub fn on_selection_changed(&mut self, caret: Option<usize>) -> bool {
        self.caret = caret;
        let released = match (&self.deferred, caret) {
            (Some(deferred), Some(position)) => position < deferred.start || position > deferred.end,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if released {
            self.deferred = None;
        }
        released && self.active()
    }

    /// Open, update or close (`None`) an input-method composition.
    pub fn on_composition_changed(&mut self, composition: Option<Range<usize>>) -> bool {
        let closed = self.composition.is_some() && composition.is_none();
        self.composition = composition;
        if closed && self.deferred.take().is_some() {
            return self.active();
        }
        false
    }

    pub fn on_focus_lost(&mut self) -> bool {
        self.caret = None;
        self.composition = None;
        self.deferred.take().is_some() && self.active()
    }

    /// Scan dirty text until done or `budget` runs out.
    ///
    /// Dirty text lying wholly under the caret word or the composition is skipped
    /// and does not keep the session busy; it waits for the next selection move.
    pub fn run_idle(&mut self, tree: &dyn TextTree, budget: Duration) -> IdleStatus {
        if !self.active() {
            return IdleStatus::Done;
        }
        let deadline = Instant::now() + budget;
        let mut search_start = 0;
        let mut deferred = self.deferred.take();

        let excluded = match (self.caret, &self.composition) {
            (None, None) => None,
            _ => {
                let mut scheduler = ScanScheduler::new(tree, &mut self.status, self.engine.as_mut(), &self.settings);
                let caret_word = self.caret.and_then(|position| scheduler.word_at(position));
                merge_exclusion(caret_word, self.composition.clone())
            }
        };

        let status = loop {
            let Some(dirty) = self.status.get_first_dirty_range(search_start) else {
                break IdleStatus::Done;
            };
            if let Some(range) = excluded.as_ref().filter(|range| range.start <= dirty.start && dirty.end <= range.end) {
                debug!("skipping {:?} under the caret", dirty);
                deferred = Some(widen(deferred, range));
                search_start = dirty.end;
                continue;
            }

            let mut scheduler = ScanScheduler::new(tree, &mut self.status, self.engine.as_mut(), &self.settings);
            let window = scheduler.expand(dirty.clone());
            let parts = match &excluded {
                Some(range) => {
                    let parts = exclude(&window.content, range);
                    if parts.len() != 1 || parts[0] != window.content {
                        debug!("deferring {:?} under the caret", range);
                        deferred = Some(widen(deferred, range));
                    }
                    parts
                }
                None => vec![window.content.clone()],
            };

            let mut timed_out = false;
            for part in parts {
                if scheduler.scan_range(part, window.context.clone(), Some(deadline)).is_some() {
                    timed_out = true;
                    break;
                }
            }
            if timed_out || Instant::now() >= deadline {
                break IdleStatus::Continue;
            }
            search_start = window.content.end.max(dirty.start + 1);
        };
        self.deferred = deferred;
        status
    }

    /// Run idle cycles until the document is fully scanned.
    pub fn scan_to_completion(&mut self, tree: &dyn TextTree) {
        let budget = Duration::from_millis(self.settings.time_budget_ms);
        while self.run_idle(tree, budget) == IdleStatus::Continue {}
    }

    /// The error next to `position`. A dirty word there is scanned first when `force_evaluation` is set.
    pub fn get_error(
        &mut self,
        tree: &dyn TextTree,
        position: usize,
        direction: LogicalDirection,
        force_evaluation: bool,
    ) -> Option<SpellingError> {
        if !self.active() {
            return None;
        }
        let (state, _) = self.status.get_run(position, direction)?;
        if state.tag() == RunTag::Dirty && force_evaluation {
            let around = match direction {
                LogicalDirection::Forward => position..position + 1,
                LogicalDirection::Backward => position - 1..position,
            };
            let mut scheduler = ScanScheduler::new(tree, &mut self.status, self.engine.as_mut(), &self.settings);
            let window = scheduler.expand(around);
            scheduler.scan_range(window.content, window.context, None);
        }
        let range = self.status.get_error(position, direction)?;
        Some(SpellingError {
            word: tree.text_between(range.start, range.end),
            start: range.start,
            end: range.end,
        })
    }

    /// Start of the next error run from `position`.
    pub fn get_next_spelling_error_position(&self, position: usize, direction: LogicalDirection) -> Option<usize> {
        if !self.active() {
            return None;
        }
        self.status.next_error_start(position, direction)
    }

    /// Suggestions for `error`, computed on first request and kept with the error run.
    pub fn get_suggestions_for_error(&mut self, tree: &dyn TextTree, error: &SpellingError) -> Vec<String> {
        if !self.active() {
            return Vec::new();
        }
        if let Some(cached) = self.status.suggestions(error.start) {
            return cached.to_vec();
        }
        if self.status.get_error(error.start, LogicalDirection::Forward).is_none() {
            return Vec::new();
        }
        if !self.engine.set_locale(&tree.language_at(error.start)) {
            return Vec::new();
        }
        self.engine.set_mode(EngineMode::SpellingErrorsWithSuggestions);
        let map = TextMap::new(tree, error.start, error.end, error.start, error.end);
        let suggestions = SentenceIter::new(self.engine.as_mut(), map.text())
            .find_map(|sentence| {
                sentence_errors(&sentence)
                    .first()
                    .map(|segment| segment.suggestions.clone())
            })
            .unwrap_or_default();
        self.engine.set_mode(EngineMode::SpellingErrors);
        self.status.set_suggestions(error.start, suggestions.clone());
        suggestions
    }

    /// Stop flagging `word` anywhere, now and in later scans.
    pub fn ignore_all(&mut self, tree: &dyn TextTree, word: &str) {
        if !self.active() {
            return;
        }
        let cleared = self
            .status
            .ignore_all(word, |range| tree.text_between(range.start, range.end));
        debug!("ignore all '{}' cleared {} errors", word, cleared);
        self.engine.ignore_word(word);
    }

    /// Every error currently in the status table.
    pub fn errors(&self, tree: &dyn TextTree) -> Vec<SpellingError> {
        if !self.active() {
            return Vec::new();
        }
        self.status
            .iter()
            .filter(|(_, state)| state.tag() == RunTag::Error)
            .map(|(range, _)| SpellingError {
                word: tree.text_between(range.start, range.end),
                start: range.start,
                end: range.end,
            })
            .collect()
    }
}

/// The caret word joined with the composition; neither may be scanned right now.
fn merge_exclusion(caret_word: Option<Range<usize>>, composition: Option<Range<usize>>) -> Option<Range<usize>> {
    let caret_word = caret_word.filter(|word| !word.is_empty());
    let composition = composition.filter(|range| !range.is_empty());
    match (caret_word, composition) {
        (Some(word), Some(composition)) => Some(word.start.min(composition.start)..word.end.max(composition.end)),
        (word, composition) => word.or(composition),
    }
}

fn widen(deferred: Option<Range<usize>>, range: &Range<usize>) -> Range<usize> {
    match deferred {
        Some(previous) => previous.start.min(range.start)..previous.end.max(range.end),
        None => range.clone(),
    }
}

fn shift_range(range: &Range<usize>, change: &TextChange) -> Range<usize> {
    let shift = |position: usize| match change.kind {
        ChangeKind::Insert if position >= change.offset => position + change.length,
        ChangeKind::Remove if position >= change.offset + change.length => position - change.length,
        ChangeKind::Remove if position > change.offset => change.offset,
        _ => position,
    };
    shift(range.start)..shift(range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;
    use crate::checker::DictionaryEngine;
    use crate::error::EngineError;
    use crate::speller::document::SymbolDocument;
    use crate::speller::engine::Sentence;
    use crate::Config;

    fn speller(doc: &SymbolDocument, words: &[&str]) -> Speller {
        let engine = DictionaryEngine::new(Dictionary::from_words(words).unwrap(), &Config::default());
        Speller::new(Box::new(engine), doc.symbol_count(), ScanSettings::default())
    }

    fn words(errors: &[SpellingError]) -> Vec<&str> {
        errors.iter().map(|e| e.word.as_str()).collect()
    }

    #[test]
    fn test_scan_finds_errors() {
        let doc = SymbolDocument::from_text("the quick bruwn fox jumpd", "en-US");
        let mut speller = speller(&doc, &["the", "quick", "brown", "fox", "jumped"]);
        speller.scan_to_completion(&doc);
        assert_eq!(words(&speller.errors(&doc)), vec!["bruwn", "jumpd"]);
        assert_eq!(speller.status().get_first_dirty_range(0), None);
    }

    #[test]
    fn test_get_error_and_navigation() {
        let doc = SymbolDocument::from_text("one tow three", "en-US");
        let mut speller = speller(&doc, &["one", "two", "three"]);
        assert_eq!(speller.get_error(&doc, 5, LogicalDirection::Forward, false), None);
        let error = speller.get_error(&doc, 5, LogicalDirection::Forward, true).unwrap();
        assert_eq!((error.start, error.end, error.word.as_str()), (4, 7, "tow"));
        assert_eq!(speller.get_next_spelling_error_position(0, LogicalDirection::Forward), Some(4));
        assert_eq!(speller.get_next_spelling_error_position(13, LogicalDirection::Backward), Some(4));
    }

    #[test]
    fn test_suggestions_are_cached() {
        let doc = SymbolDocument::from_text("one tow", "en-US");
        let mut speller = speller(&doc, &["one", "two", "tow truck"]);
        speller.scan_to_completion(&doc);
        let error = speller.errors(&doc).remove(0);
        assert_eq!(speller.get_suggestions_for_error(&doc, &error), vec!["two"]);
        assert_eq!(speller.status().suggestions(error.start), Some(&["two".to_string()][..]));
    }

    #[test]
    fn test_ignore_all_clears_and_sticks() {
        let mut doc = SymbolDocument::from_text("Zorp and zorp", "en-US");
        let mut speller = speller(&doc, &["and"]);
        speller.scan_to_completion(&doc);
        assert_eq!(speller.errors(&doc).len(), 2);
        speller.ignore_all(&doc, "ZORP");
        assert!(speller.errors(&doc).is_empty());

        let change = doc.insert_text(13, " zorp");
        speller.on_text_change(change);
        speller.scan_to_completion(&doc);
        assert!(speller.errors(&doc).is_empty());
    }

    #[test]
    fn test_edit_rescans_only_dirty_text() {
        let mut doc = SymbolDocument::from_text("one two three", "en-US");
        let mut speller = speller(&doc, &["one", "two", "three"]);
        speller.scan_to_completion(&doc);
        let change = doc.insert_text(4, "x");
        speller.on_text_change(change);
        assert_eq!(speller.status().get_first_dirty_range(0), Some(4..5));
        speller.scan_to_completion(&doc);
        assert_eq!(words(&speller.errors(&doc)), vec!["xtwo"]);
    }

    struct BrokenEngine;

    impl LinguisticEngine for BrokenEngine {
        fn initialize(&mut self) -> Result<(), EngineError> {
            Err(EngineError::Initialization("no backend".into()))
        }
        fn set_locale(&mut self, _locale: &str) -> bool {
            true
        }
        fn set_mode(&mut self, _mode: EngineMode) {}
        fn next_sentence(&mut self, _text: &[char], _from: usize) -> Option<Sentence> {
            panic!("a failed engine is never asked for sentences");
        }
    }

    #[test]
    fn test_failed_engine_is_sticky_noop() {
        let doc = SymbolDocument::from_text("anything at all", "en-US");
        let mut speller = Speller::new(Box::new(BrokenEngine), doc.symbol_count(), ScanSettings::default());
        assert!(speller.has_failed());
        assert_eq!(speller.run_idle(&doc, Duration::from_millis(10)), IdleStatus::Done);
        assert_eq!(speller.get_error(&doc, 0, LogicalDirection::Forward, true), None);
        assert!(speller.errors(&doc).is_empty());
    }

    #[test]
    fn test_shift_deferred_range() {
        let insert = TextChange { offset: 2, length: 3, kind: ChangeKind::Insert };
        assert_eq!(shift_range(&(4..6), &insert), 7..9);
        let remove = TextChange { offset: 3, length: 2, kind: ChangeKind::Remove };
        assert_eq!(shift_range(&(4..8), &remove), 3..6);
    }
}
