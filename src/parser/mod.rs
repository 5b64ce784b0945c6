pub mod markdown;
pub mod plaintext;

use crate::speller::document::{SymbolDocument, TextTree};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Markdown,
    PlainText,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "md" | "mdx" | "markdown" => FileType::Markdown,
            _ => FileType::PlainText,
        }
    }
}

/// Where a text run of the document came from in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    symbol: usize,
    byte: usize,
    chars: usize,
}

/// A file loaded as a symbol document, able to point back into its source.
pub struct LoadedDocument {
    pub document: SymbolDocument,
    source: String,
    anchors: Vec<Anchor>,
}

impl LoadedDocument {
    fn new(source: &str, language: &str) -> Self {
        Self {
            document: SymbolDocument::new(language),
            source: source.to_string(),
            anchors: Vec::new(),
        }
    }

    /// Append text that appears verbatim in the source at `byte`.
    fn push_source_text(&mut self, text: &str, byte: usize) {
        if text.is_empty() {
            return;
        }
        self.anchors.push(Anchor {
            symbol: self.document.symbol_count(),
            byte,
            chars: text.chars().count(),
        });
        self.document.push_text(text);
    }

    fn byte_of(&self, symbol: usize) -> usize {
        let index = self.anchors.partition_point(|a| a.symbol <= symbol);
        let Some(anchor) = index.checked_sub(1).map(|i| self.anchors[i]) else {
            return 0;
        };
        let tail = &self.source[anchor.byte.min(self.source.len())..];
        anchor.byte
            + tail
                .char_indices()
                .nth((symbol - anchor.symbol).min(anchor.chars))
                .map_or(tail.len(), |(offset, _)| offset)
    }

    /// 1-based line and column of a document offset in the source.
    pub fn locate(&self, symbol: usize) -> (usize, usize) {
        let byte = self.byte_of(symbol);
        let before = &self.source[..byte];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = self.source[line_start..byte].chars().count() + 1;
        (line, column)
    }

    /// The source line around a document offset, cut to about 20 chars either side.
    pub fn context(&self, symbol: usize, length: usize) -> String {
        let (line_number, column) = self.locate(symbol);
        let line: Vec<char> = self
            .source
            .lines()
            .nth(line_number - 1)
            .unwrap_or("")
            .chars()
            .collect();
        let offset = column - 1;
        let start = offset.saturating_sub(20);
        let end = (offset + length + 20).min(line.len());
        let context: String = line[start.min(end)..end].iter().collect();

        match (start > 0, end < line.len()) {
            (true, true) => format!("...{}...", context),
            (true, false) => format!("...{}", context),
            (false, true) => format!("{}...", context),
            (false, false) => context,
        }
    }
}

/// Load a file into a symbol document according to its type.
pub fn load_file(path: &Path, content: &str, language: &str) -> Result<LoadedDocument> {
    match FileType::from_path(path) {
        FileType::Markdown => markdown::load(content, language),
        FileType::PlainText => plaintext::load(content, language),
    }
}
