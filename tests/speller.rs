use flowspell::checker::dictionary::Dictionary;
use flowspell::config::ScanSettings;
use flowspell::error::EngineError;
use flowspell::speller::document::{SymbolDocument, TextTree};
use flowspell::speller::engine::{EngineMode, LinguisticEngine, Segment, Sentence};
use flowspell::speller::status::RunState;
use flowspell::{Config, DictionaryEngine, IdleStatus, LogicalDirection, Speller};
use std::time::Duration;

const WORDS: &[&str] = &["one", "two", "three", "four", "five", "six", "seven", "eight"];

fn dictionary_speller(doc: &SymbolDocument) -> Speller {
    let engine = DictionaryEngine::new(Dictionary::from_words(WORDS).unwrap(), &Config::default());
    Speller::new(Box::new(engine), doc.symbol_count(), ScanSettings::default())
}

fn dirty_symbols(speller: &Speller) -> usize {
    speller
        .status()
        .iter()
        .filter(|(_, state)| matches!(state, RunState::Dirty))
        .map(|(range, _)| range.len())
        .sum()
}

fn error_words(speller: &Speller, doc: &SymbolDocument) -> Vec<String> {
    speller.errors(doc).into_iter().map(|e| e.word).collect()
}

/// Splits on non-alphanumerics and flags every occurrence of `phrase` as one segment.
struct PhraseEngine {
    phrase: Vec<char>,
    mode: EngineMode,
}

impl PhraseEngine {
    fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.chars().collect(),
            mode: EngineMode::SpellingErrors,
        }
    }
}

impl LinguisticEngine for PhraseEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn set_locale(&mut self, _locale: &str) -> bool {
        true
    }

    fn set_mode(&mut self, mode: EngineMode) {
        self.mode = mode;
    }

    fn next_sentence(&mut self, text: &[char], from: usize) -> Option<Sentence> {
        if from >= text.len() {
            return None;
        }
        let mut segments = Vec::new();
        let mut i = from;
        while i < text.len() {
            if !text[i].is_alphanumeric() {
                i += 1;
                continue;
            }
            if self.mode != EngineMode::WordBreaking && text[i..].starts_with(&self.phrase) {
                segments.push(Segment::new(i, self.phrase.len()).flagged());
                i += self.phrase.len();
                continue;
            }
            let start = i;
            while i < text.len() && text[i].is_alphanumeric() {
                i += 1;
            }
            segments.push(Segment::new(start, i - start));
        }
        Some(Sentence {
            start: from,
            end: text.len(),
            segments,
        })
    }
}

#[test]
fn test_zero_budget_still_makes_progress() {
    let text = "one two thre four. five six sevn eight. one two three four. five siix seven eight.";
    let doc = SymbolDocument::from_text(text, "en-US");
    let mut speller = dictionary_speller(&doc);

    let mut remaining = dirty_symbols(&speller);
    let mut cycles = 0;
    while speller.run_idle(&doc, Duration::ZERO) == IdleStatus::Continue {
        let now = dirty_symbols(&speller);
        assert!(now < remaining || now == 0, "idle cycle made no progress");
        remaining = now;
        cycles += 1;
        assert!(cycles < 1000);
    }

    assert!(cycles >= 1);
    assert_eq!(dirty_symbols(&speller), 0);
    assert_eq!(error_words(&speller, &doc), vec!["thre", "sevn", "siix"]);
}

#[test]
fn test_runs_stay_coalesced_after_edits() {
    let mut doc = SymbolDocument::from_text("one two three four five", "en-US");
    let mut speller = dictionary_speller(&doc);
    speller.scan_to_completion(&doc);
    assert_eq!(speller.status().run_count(), 1);

    let change = doc.insert_text(8, "x");
    speller.on_text_change(change);
    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["xthree"]);

    let change = doc.remove_text(8, 1);
    speller.on_text_change(change);
    speller.scan_to_completion(&doc);
    assert!(speller.errors(&doc).is_empty());
    assert_eq!(speller.status().run_count(), 1);
    assert_eq!(speller.status().len(), doc.symbol_count());
}

#[test]
fn test_errors_crossing_a_scanned_part_are_dropped() {
    let doc = SymbolDocument::from_text("one two three four five six", "en-US");

    let mut speller = Speller::new(Box::new(PhraseEngine::new("three four")), doc.symbol_count(), ScanSettings::default());
    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["three four"]);

    // With the caret in "three" the scan is split around it and the phrase
    // crosses both parts.
    let mut speller = Speller::new(Box::new(PhraseEngine::new("three four")), doc.symbol_count(), ScanSettings::default());
    speller.on_selection_changed(Some(10));
    speller.scan_to_completion(&doc);
    assert!(speller.errors(&doc).is_empty());
    assert_eq!(speller.status().get_first_dirty_range(0), Some(8..13));

    assert!(speller.on_selection_changed(Some(0)));
    speller.scan_to_completion(&doc);
    assert!(speller.errors(&doc).is_empty());
    assert_eq!(speller.status().get_first_dirty_range(0), None);
}

#[test]
fn test_caret_word_is_deferred_until_the_caret_leaves() {
    let doc = SymbolDocument::from_text("one tow three", "en-US");
    let mut speller = dictionary_speller(&doc);

    assert!(!speller.on_selection_changed(Some(5)));
    speller.scan_to_completion(&doc);
    assert!(speller.errors(&doc).is_empty());
    assert_eq!(speller.status().get_first_dirty_range(0), Some(4..7));

    // Moving inside the word keeps it deferred.
    assert!(!speller.on_selection_changed(Some(6)));

    assert!(speller.on_selection_changed(Some(13)));
    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["tow"]);
}

#[test]
fn test_text_under_the_caret_does_not_keep_the_scan_busy() {
    let doc = SymbolDocument::from_text("one twoo three fuor five six seven eight", "en-US");
    let mut speller = dictionary_speller(&doc);
    speller.on_selection_changed(Some(1));

    let mut cycles = 0;
    while speller.run_idle(&doc, Duration::ZERO) == IdleStatus::Continue {
        cycles += 1;
        assert!(cycles < 100, "idle loop kept running for deferred text");
    }
    assert_eq!(speller.status().get_first_dirty_range(0), Some(0..3));
    assert_eq!(error_words(&speller, &doc), vec!["twoo", "fuor"]);
    assert_eq!(speller.run_idle(&doc, Duration::ZERO), IdleStatus::Done);

    assert!(speller.on_selection_changed(Some(40)));
    speller.scan_to_completion(&doc);
    assert_eq!(dirty_symbols(&speller), 0);
    assert_eq!(error_words(&speller, &doc), vec!["twoo", "fuor"]);
}

#[test]
fn test_zero_budget_setting_terminates_with_deferred_text() {
    let doc = SymbolDocument::from_text("one tow three", "en-US");
    let engine = DictionaryEngine::new(Dictionary::from_words(WORDS).unwrap(), &Config::default());
    let settings = ScanSettings {
        time_budget_ms: 0,
        ..ScanSettings::default()
    };
    let mut speller = Speller::new(Box::new(engine), doc.symbol_count(), settings);
    speller.on_composition_changed(Some(0..3));
    speller.scan_to_completion(&doc);
    assert_eq!(speller.status().get_first_dirty_range(0), Some(0..3));
    assert_eq!(error_words(&speller, &doc), vec!["tow"]);
}

#[test]
fn test_composition_is_not_scanned_until_it_closes() {
    let doc = SymbolDocument::from_text("one tow three", "en-US");
    let mut speller = dictionary_speller(&doc);

    assert!(!speller.on_composition_changed(Some(4..7)));
    speller.scan_to_completion(&doc);
    assert!(speller.errors(&doc).is_empty());

    assert!(speller.on_composition_changed(None));
    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["tow"]);
}

#[test]
fn test_focus_loss_releases_deferred_text() {
    let doc = SymbolDocument::from_text("one tow three", "en-US");
    let mut speller = dictionary_speller(&doc);
    speller.on_selection_changed(Some(5));
    speller.scan_to_completion(&doc);

    assert!(speller.on_focus_lost());
    assert!(!speller.on_focus_lost());
    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["tow"]);
}

#[test]
fn test_detach_kills_queued_tickets() {
    let doc = SymbolDocument::from_text("one tow three", "en-US");
    let mut speller = dictionary_speller(&doc);
    let ticket = speller.ticket();
    assert!(ticket.is_alive());

    speller.detach();
    assert!(!ticket.is_alive());
    assert!(!speller.is_attached());
    assert_eq!(speller.run_idle(&doc, Duration::from_millis(50)), IdleStatus::Done);
    assert_eq!(speller.get_error(&doc, 5, LogicalDirection::Forward, true), None);
}

#[test]
fn test_forced_lookup_scans_only_around_the_position() {
    let text = "one tow three four five six seven eight one two three four five six seven eigth";
    let doc = SymbolDocument::from_text(text, "en-US");
    let mut speller = dictionary_speller(&doc);

    let error = speller
        .get_error(&doc, 5, LogicalDirection::Forward, true)
        .unwrap();
    assert_eq!(error.word, "tow");
    assert!(dirty_symbols(&speller) > 0);

    speller.scan_to_completion(&doc);
    assert_eq!(error_words(&speller, &doc), vec!["tow", "eigth"]);
}
