//! The editable text tree the speller works against.

use crate::LogicalDirection;

/// What sits next to a position in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerContext {
    None,
    Text(char),
    ElementStart { formatting: bool },
    ElementEnd { formatting: bool },
    Embedded,
}

/// Symbol-addressed document. Every character, element edge and embedded
/// object occupies exactly one offset.
pub trait TextTree {
    fn symbol_count(&self) -> usize;

    /// The symbol starting at `offset`, `PointerContext::None` past the end.
    fn symbol_at(&self, offset: usize) -> PointerContext;

    /// Language in effect at `offset`.
    fn language_at(&self, offset: usize) -> String;

    fn pointer_context(&self, offset: usize, direction: LogicalDirection) -> PointerContext {
        match direction {
            LogicalDirection::Forward => self.symbol_at(offset),
            LogicalDirection::Backward if offset == 0 => PointerContext::None,
            LogicalDirection::Backward => self.symbol_at(offset - 1),
        }
    }

    fn move_by_offset(&self, offset: usize, delta: isize) -> usize {
        let target = offset as isize + delta;
        target.clamp(0, self.symbol_count() as isize) as usize
    }

    /// Characters adjacent to `offset` up to `limit`, stopping at the first non-text symbol.
    /// Backward runs are returned in document order.
    fn text_run(&self, offset: usize, direction: LogicalDirection, limit: usize) -> String {
        let mut chars = Vec::new();
        let mut position = offset;
        while chars.len() < limit {
            match self.pointer_context(position, direction) {
                PointerContext::Text(ch) => chars.push(ch),
                _ => break,
            }
            position = match direction {
                LogicalDirection::Forward => position + 1,
                LogicalDirection::Backward => position - 1,
            };
        }
        if direction == LogicalDirection::Backward {
            chars.reverse();
        }
        chars.into_iter().collect()
    }

    /// First offset in `(offset, limit)` whose language differs from the one at `offset`, else `limit`.
    fn language_run_end(&self, offset: usize, limit: usize) -> usize {
        let language = self.language_at(offset);
        (offset + 1..limit)
            .find(|&position| self.language_at(position) != language)
            .unwrap_or(limit.max(offset))
    }

    /// Plain characters of `[start, end)`, markup omitted.
    fn text_between(&self, start: usize, end: usize) -> String {
        (start..end.min(self.symbol_count()))
            .filter_map(|offset| match self.symbol_at(offset) {
                PointerContext::Text(ch) => Some(ch),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Remove,
    Property,
}

/// Change notification emitted by every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChange {
    pub offset: usize,
    pub length: usize,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Formatting elements (emphasis, links) do not break words.
    pub formatting: bool,
    pub language: Option<String>,
}

impl ElementInfo {
    pub fn block() -> Self {
        Self {
            formatting: false,
            language: None,
        }
    }

    pub fn formatting() -> Self {
        Self {
            formatting: true,
            language: None,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Symbol {
    Char(char),
    Start(ElementInfo),
    End { formatting: bool },
    Embedded,
}

/// In-memory `TextTree`.
#[derive(Debug, Clone)]
pub struct SymbolDocument {
    symbols: Vec<Symbol>,
    open: Vec<bool>,
    language: String,
}

impl SymbolDocument {
    pub fn new(language: &str) -> Self {
        Self {
            symbols: Vec::new(),
            open: Vec::new(),
            language: language.to_string(),
        }
    }

    pub fn from_text(text: &str, language: &str) -> Self {
        let mut doc = Self::new(language);
        doc.push_text(text);
        doc
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.symbols.extend(text.chars().map(Symbol::Char));
        self
    }

    pub fn open(&mut self, element: ElementInfo) -> &mut Self {
        self.open.push(element.formatting);
        self.symbols.push(Symbol::Start(element));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        let formatting = self.open.pop();
        debug_assert!(formatting.is_some(), "close without open element");
        self.symbols.push(Symbol::End {
            formatting: formatting.unwrap_or(false),
        });
        self
    }

    pub fn push_embedded(&mut self) -> &mut Self {
        self.symbols.push(Symbol::Embedded);
        self
    }

    pub fn insert_text(&mut self, offset: usize, text: &str) -> TextChange {
        let offset = offset.min(self.symbols.len());
        let inserted: Vec<Symbol> = text.chars().map(Symbol::Char).collect();
        let length = inserted.len();
        self.symbols.splice(offset..offset, inserted);
        TextChange {
            offset,
            length,
            kind: ChangeKind::Insert,
        }
    }

    /// Remove plain characters. Element edges in the range are kept so the tree stays balanced.
    pub fn remove_text(&mut self, offset: usize, length: usize) -> TextChange {
        let end = (offset + length).min(self.symbols.len());
        let offset = offset.min(end);
        let before = self.symbols.len();
        let mut index = offset;
        let mut remaining = end - offset;
        while remaining > 0 {
            if matches!(self.symbols[index], Symbol::Char(_)) {
                self.symbols.remove(index);
            } else {
                index += 1;
            }
            remaining -= 1;
        }
        TextChange {
            offset,
            length: before - self.symbols.len(),
            kind: ChangeKind::Remove,
        }
    }

    /// Change the language of the element starting at `offset`.
    pub fn set_language(&mut self, offset: usize, language: &str) -> Option<TextChange> {
        let Some(Symbol::Start(element)) = self.symbols.get_mut(offset) else {
            return None;
        };
        element.language = Some(language.to_string());
        let end = self.matching_end(offset);
        Some(TextChange {
            offset,
            length: end + 1 - offset,
            kind: ChangeKind::Property,
        })
    }

    fn matching_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        for (i, symbol) in self.symbols.iter().enumerate().skip(start) {
            match symbol {
                Symbol::Start(_) => depth += 1,
                Symbol::End { .. } => {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => {}
            }
        }
        self.symbols.len().saturating_sub(1)
    }
}

impl TextTree for SymbolDocument {
    fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    fn symbol_at(&self, offset: usize) -> PointerContext {
        match self.symbols.get(offset) {
            None => PointerContext::None,
            Some(Symbol::Char(ch)) => PointerContext::Text(*ch),
            Some(Symbol::Start(element)) => PointerContext::ElementStart {
                formatting: element.formatting,
            },
            Some(Symbol::End { formatting }) => PointerContext::ElementEnd {
                formatting: *formatting,
            },
            Some(Symbol::Embedded) => PointerContext::Embedded,
        }
    }

    fn language_at(&self, offset: usize) -> String {
        let mut depth = 0usize;
        for symbol in self.symbols[..offset.min(self.symbols.len())].iter().rev() {
            match symbol {
                Symbol::End { .. } => depth += 1,
                Symbol::Start(element) if depth == 0 => {
                    if let Some(language) = &element.language {
                        return language.clone();
                    }
                }
                Symbol::Start(_) => depth -= 1,
                _ => {}
            }
        }
        self.language.clone()
    }

    fn language_run_end(&self, offset: usize, limit: usize) -> usize {
        let limit = limit.min(self.symbols.len());
        if offset >= limit {
            return limit.max(offset);
        }
        let language = self.language_at(offset);
        let mut current = language.clone();
        let mut enclosing: Vec<String> = Vec::new();
        for position in offset + 1..limit {
            match &self.symbols[position - 1] {
                Symbol::Start(element) => {
                    enclosing.push(current.clone());
                    if let Some(inner) = &element.language {
                        current = inner.clone();
                    }
                }
                Symbol::End { .. } => {
                    current = match enclosing.pop() {
                        Some(outer) => outer,
                        None => self.language_at(position),
                    };
                }
                _ => {}
            }
            if current != language {
                return position;
            }
        }
        limit
    }
}
