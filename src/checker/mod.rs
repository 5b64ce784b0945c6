pub mod dictionary;
pub mod suggestions;
pub mod tokenizer;

use crate::error::EngineError;
use crate::speller::engine::{EngineMode, LinguisticEngine, Segment, Sentence};
use crate::Config;
use anyhow::{Context, Result};
use dictionary::Dictionary;
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tokenizer::Token;

/// Dictionary-backed linguistic engine.
pub struct DictionaryEngine {
    dictionary: Dictionary,
    language: String,
    personal_words: HashSet<String>,
    ignored_words: HashSet<String>,
    pattern_sources: Vec<String>,
    ignore_patterns: Vec<Regex>,
    max_suggestions: usize,
    case_sensitive: bool,
    mode: EngineMode,
}

fn normalize_locale(locale: &str) -> String {
    locale.replace('_', "-").to_lowercase()
}

fn primary_subtag(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

impl DictionaryEngine {
    pub fn new(dictionary: Dictionary, config: &Config) -> Self {
        Self {
            dictionary,
            language: normalize_locale(&config.language),
            personal_words: HashSet::new(),
            ignored_words: HashSet::new(),
            pattern_sources: config.ignore_patterns.clone(),
            ignore_patterns: Vec::new(),
            max_suggestions: config.max_suggestions,
            case_sensitive: config.case_sensitive,
            mode: EngineMode::SpellingErrors,
        }
    }

    /// Load the dictionary and the personal word list named by `config`.
    pub fn from_config(config: &Config, data_dir: Option<&Path>) -> Result<Self> {
        let dictionary = Dictionary::load(&config.language, data_dir)?;
        Self::with_dictionary(dictionary, config)
    }

    /// Engine over an already loaded dictionary, plus the personal word list named by `config`.
    pub fn with_dictionary(dictionary: Dictionary, config: &Config) -> Result<Self> {
        let mut engine = Self::new(dictionary, config);

        if let Some(personal_dict_path) = &config.personal_dictionary {
            if personal_dict_path.exists() {
                let content = fs::read_to_string(personal_dict_path)
                    .context("Failed to read personal dictionary")?;
                for line in content.lines() {
                    let word = line.trim();
                    if !word.is_empty() && !word.starts_with('#') {
                        engine.add_personal_word(word);
                    }
                }
            }
        }

        Ok(engine)
    }

    pub fn add_personal_word(&mut self, word: &str) {
        self.personal_words.insert(word.to_lowercase());
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn supports(&self, locale: &str) -> Result<(), EngineError> {
        let requested = normalize_locale(locale);
        if requested == self.language || primary_subtag(&requested) == primary_subtag(&self.language) {
            Ok(())
        } else {
            Err(EngineError::UnsupportedLocale(locale.to_string()))
        }
    }

    fn should_ignore(&self, word: &str) -> bool {
        if word.chars().count() <= 1 {
            return true;
        }

        if word.chars().all(|c| c.is_numeric()) {
            return true;
        }

        self.ignore_patterns.iter().any(|pattern| pattern.is_match(word))
    }

    fn in_dictionary(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if !self.case_sensitive {
            return self.dictionary.contains(&lower);
        }
        // Case-sensitive lookups accept the stored form and its capitalised form.
        let mut chars = word.chars();
        let capitalised = chars.next().map_or(false, char::is_uppercase) && chars.as_str() == chars.as_str().to_lowercase();
        (word == lower || capitalised) && self.dictionary.contains(&lower)
    }

    fn is_known(&self, word: &str) -> bool {
        if self.should_ignore(word) {
            return true;
        }
        let lower = word.to_lowercase();
        if self.personal_words.contains(&lower) || self.ignored_words.contains(&lower) {
            return true;
        }
        if self.in_dictionary(word) {
            return true;
        }
        ["'s", "\u{2019}s"]
            .iter()
            .find_map(|suffix| word.strip_suffix(suffix))
            .map_or(false, |stem| self.in_dictionary(stem))
    }

    fn word_segment(&self, token: &Token) -> Segment {
        let segment = Segment::new(token.start, token.length);
        if self.mode == EngineMode::WordBreaking || self.is_known(token.text) {
            return segment;
        }
        let mut segment = segment.flagged();
        if self.mode == EngineMode::SpellingErrorsWithSuggestions {
            segment.suggestions = suggestions::generate(&token.text.to_lowercase(), &self.dictionary, self.max_suggestions);
        }
        segment
    }

    /// `auto-mobile`: one segment owning a segment per part.
    fn compound_segment(&self, tokens: &[Token]) -> Segment {
        let start = tokens[0].start;
        let length = tokens[tokens.len() - 1].end() - start;
        let whole: String = tokens.iter().map(|t| t.text).collect();
        let parts: Vec<&Token> = tokens.iter().filter(|t| t.is_word).collect();

        if self.mode != EngineMode::WordBreaking && self.is_known(&whole) {
            let children = parts.iter().map(|t| Segment::new(t.start, t.length)).collect();
            return Segment::new(start, length).with_children(children);
        }
        let children: Vec<Segment> = parts.iter().map(|t| self.word_segment(t)).collect();
        let parent = Segment::new(start, length);
        if children.iter().any(|c| !c.is_clean) {
            parent.flagged().with_children(children)
        } else {
            parent.with_children(children)
        }
    }

    /// Two words separated by one space that the dictionary lists together.
    fn phrase_segment(&self, tokens: &[Token]) -> Option<Segment> {
        if self.mode == EngineMode::WordBreaking || tokens.len() < 3 {
            return None;
        }
        let (first, gap, second) = (&tokens[0], &tokens[1], &tokens[2]);
        if gap.text != " " || !second.is_word {
            return None;
        }
        let phrase = format!("{} {}", first.text.to_lowercase(), second.text.to_lowercase());
        if !self.dictionary.contains(&phrase) {
            return None;
        }
        let children = vec![
            Segment::new(first.start, first.length),
            Segment::new(second.start, second.length),
        ];
        Some(Segment::new(first.start, second.end() - first.start).with_children(children))
    }

    fn segments(&self, tokens: &[Token]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if !tokens[i].is_word {
                i += 1;
                continue;
            }
            let mut last = i;
            while last + 2 < tokens.len() && tokens[last + 1].is_hyphen() && tokens[last + 2].is_word {
                last += 2;
            }
            if last > i {
                segments.push(self.compound_segment(&tokens[i..=last]));
                i = last + 1;
            } else if let Some(phrase) = self.phrase_segment(&tokens[i..]) {
                segments.push(phrase);
                i += 3;
            } else {
                segments.push(self.word_segment(&tokens[i]));
                i += 1;
            }
        }
        segments
    }
}

impl LinguisticEngine for DictionaryEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        if self.dictionary.is_empty() {
            return Err(EngineError::Initialization(format!(
                "dictionary for {} has no words",
                self.language
            )));
        }
        self.ignore_patterns.clear();
        for pattern in &self.pattern_sources {
            match Regex::new(pattern) {
                Ok(re) => self.ignore_patterns.push(re),
                Err(e) => warn!("Invalid regex pattern '{}': {}", pattern, e),
            }
        }
        debug!("dictionary engine ready: {} words for {}", self.dictionary.len(), self.language);
        Ok(())
    }

    fn set_locale(&mut self, locale: &str) -> bool {
        match self.supports(locale) {
            Ok(()) => true,
            Err(e) => {
                debug!("{}", e);
                false
            }
        }
    }

    fn set_mode(&mut self, mode: EngineMode) {
        self.mode = mode;
    }

    fn next_sentence(&mut self, text: &[char], from: usize) -> Option<Sentence> {
        let length = tokenizer::sentence_length(text, from);
        if length == 0 {
            return None;
        }
        let end = from + length;
        let sentence: String = text[from..end].iter().collect();
        let tokens = tokenizer::word_tokens(&sentence, from);
        Some(Sentence {
            start: from,
            end,
            segments: self.segments(&tokens),
        })
    }

    fn ignore_word(&mut self, word: &str) {
        self.ignored_words.insert(word.to_lowercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speller::segments::sentence_errors;

    fn engine(words: &[&str]) -> DictionaryEngine {
        let config = Config {
            language: "en_US".to_string(),
            ..Default::default()
        };
        let mut engine = DictionaryEngine::new(Dictionary::from_words(words).unwrap(), &config);
        engine.initialize().unwrap();
        engine
    }

    fn errors(engine: &mut DictionaryEngine, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut found = Vec::new();
        let mut from = 0;
        while let Some(sentence) = engine.next_sentence(&chars, from) {
            for segment in sentence_errors(&sentence) {
                found.push(chars[segment.start..segment.end()].iter().collect());
            }
            from = sentence.end;
        }
        found
    }

    #[test]
    fn test_flags_unknown_words() {
        let mut engine = engine(&["the", "cat", "sat"]);
        assert_eq!(errors(&mut engine, "The cat sta. The caat sat."), vec!["sta", "caat"]);
    }

    #[test]
    fn test_ignore_rules() {
        let mut engine = engine(&["the", "cat"]);
        engine.add_personal_word("Zorblax");
        assert!(errors(&mut engine, "the cat 1234 NASA zorblax x").is_empty());
        engine.ignore_word("Meow");
        assert!(errors(&mut engine, "meow cat's").is_empty());
    }

    #[test]
    fn test_compounds_and_phrases() {
        let mut engine = engine(&["auto", "mobile", "e-mail", "los angeles", "in"]);
        assert!(errors(&mut engine, "auto-mobile e-mail").is_empty());
        assert_eq!(errors(&mut engine, "auto-mobbile"), vec!["mobbile"]);
        assert!(errors(&mut engine, "in Los Angeles").is_empty());
        assert_eq!(errors(&mut engine, "in Angeles"), vec!["Angeles"]);
    }

    #[test]
    fn test_word_breaking_mode_never_flags() {
        let mut engine = engine(&["the"]);
        engine.set_mode(EngineMode::WordBreaking);
        assert!(errors(&mut engine, "qwzx vvbn").is_empty());
    }

    #[test]
    fn test_suggestion_mode() {
        let mut engine = engine(&["hello", "world"]);
        engine.set_mode(EngineMode::SpellingErrorsWithSuggestions);
        let chars: Vec<char> = "helo".chars().collect();
        let sentence = engine.next_sentence(&chars, 0).unwrap();
        assert_eq!(sentence.segments[0].suggestions, vec!["hello"]);
    }

    #[test]
    fn test_locale_matching() {
        let mut engine = engine(&["the"]);
        assert!(engine.set_locale("en-GB"));
        assert!(engine.set_locale("EN_us"));
        assert!(!engine.set_locale("fr-FR"));
    }

    #[test]
    fn test_empty_dictionary_fails_initialization() {
        let mut engine = DictionaryEngine::new(Dictionary::from_words::<&str>(&[]).unwrap(), &Config::default());
        assert!(matches!(engine.initialize(), Err(EngineError::Initialization(_))));
    }
}
