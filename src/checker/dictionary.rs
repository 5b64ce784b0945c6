use crate::error::EngineError;
use anyhow::{Context, Result};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Load the installed dictionary for `language`, or the bundled word list when none is installed.
    pub fn load(language: &str, data_dir: Option<&Path>) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => crate::config::Config::data_dir(),
        };
        if let Some(path) = dir.map(|dir| Self::path_in(&dir, language)) {
            if path.exists() {
                return Self::load_from_path(&path);
            }
            debug!("no dictionary at {}, using bundled word list", path.display());
        }
        Self::from_words(&Self::basic_wordlist(language))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

        let reader = BufReader::new(file);
        let bytes = reader.bytes().collect::<Result<Vec<_>, _>>()?;
        let set = Set::new(bytes)
            .map_err(|e| EngineError::CorruptDictionary(format!("{}: {}", path.display(), e)))?;

        Ok(Self { set })
    }

    /// In-memory dictionary. Words are lowercased, sorted and deduplicated.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let set = Set::from_iter(normalize(words))
            .map_err(|e| EngineError::CorruptDictionary(e.to_string()))?;
        Ok(Self { set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Every word of the dictionary. Expensive; suggestions only use it for very short words.
    pub fn all_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }

        words
    }

    /// Write an fst dictionary file, returning the number of distinct words.
    pub fn build_from_words<S: AsRef<str>>(words: &[S], output_path: &Path) -> Result<usize> {
        let sorted_words = normalize(words);

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in &sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(sorted_words.len())
    }

    pub fn path_in(data_dir: &Path, language: &str) -> PathBuf {
        data_dir.join(format!("{}.dict", language))
    }

    fn basic_wordlist(language: &str) -> Vec<&'static str> {
        match language {
            "en_US" | "en_GB" | "en-US" | "en-GB" | "en" => COMMON_ENGLISH.to_vec(),
            _ => COMMON_ENGLISH[..10].to_vec(),
        }
    }
}

fn normalize<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut sorted: Vec<String> = words
        .iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    sorted.sort();
    sorted.dedup();
    sorted
}

const COMMON_ENGLISH: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on", "with",
    "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say", "her",
    "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so", "up",
    "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like", "time",
    "no", "just", "him", "know", "take", "people", "into", "year", "your", "good", "some", "could",
    "them", "see", "other", "than", "then", "now", "look", "only", "come", "its", "over", "think",
    "also", "back", "after", "use", "two", "how", "our", "work", "first", "well", "way", "even",
    "new", "want", "because", "any", "these", "give", "day", "most", "us", "is", "are", "was",
    "were", "hello", "world", "text", "page", "line", "word", "second", "paragraph", "document",
    "new york", "los angeles", "san francisco",
];
