use crate::speller::document::{PointerContext, TextTree};
use std::ops::Range;

/// Stands in for embedded objects in the plain text.
pub const EMBEDDED_SENTINEL: char = '\u{F8FF}';

/// Plain-text window over a document, with the way back to symbol offsets.
///
/// `[context_start, context_end)` is walked; the content window inside it is
/// the part whose status may be changed by a scan.
#[derive(Debug, Clone)]
pub struct TextMap {
    text: Vec<char>,
    base_position: usize,
    /// Offset of each character relative to `base_position`, plus a trailing sentinel.
    position_map: Vec<usize>,
    content_start_offset: usize,
    content_end_offset: usize,
}

impl TextMap {
    pub fn new(
        tree: &dyn TextTree,
        context_start: usize,
        context_end: usize,
        content_start: usize,
        content_end: usize,
    ) -> Self {
        debug_assert!(context_start <= content_start && content_start <= content_end && content_end <= context_end);
        let context_end = context_end.min(tree.symbol_count());
        let mut text = Vec::with_capacity(context_end.saturating_sub(context_start));
        let mut position_map = Vec::with_capacity(text.capacity() + 1);
        let mut content_start_offset = None;
        let mut content_end_offset = None;
        let mut inline_count = 0usize;

        for offset in context_start..context_end {
            if offset == content_start && content_start_offset.is_none() {
                content_start_offset = Some(text.len());
            }
            if offset == content_end && content_end_offset.is_none() {
                content_end_offset = Some(text.len());
            }
            let ch = match tree.symbol_at(offset) {
                PointerContext::Text(ch) => ch,
                PointerContext::ElementStart { formatting: true } | PointerContext::ElementEnd { formatting: true } => {
                    inline_count += 1;
                    continue;
                }
                PointerContext::ElementStart { .. } | PointerContext::ElementEnd { .. } => ' ',
                PointerContext::Embedded => EMBEDDED_SENTINEL,
                PointerContext::None => break,
            };
            text.push(ch);
            position_map.push(offset - context_start);
        }
        let sentinel = position_map.last().map_or(0, |last| last + 1);
        position_map.push(sentinel);
        log::trace!("text map over {}..{} skipped {} inline edges", context_start, context_end, inline_count);

        let length = text.len();
        let content_start_offset = content_start_offset.unwrap_or(length);
        let content_end_offset = content_end_offset.unwrap_or(length).max(content_start_offset);
        Self {
            text,
            base_position: context_start,
            position_map,
            content_start_offset,
            content_end_offset,
        }
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn text_length(&self) -> usize {
        self.text.len()
    }

    pub fn content_start_offset(&self) -> usize {
        self.content_start_offset
    }

    pub fn content_end_offset(&self) -> usize {
        self.content_end_offset
    }

    /// Document offset of plain-text index `index`; the text length maps past the last character.
    pub fn map_position(&self, index: usize) -> usize {
        let index = index.min(self.text.len());
        self.base_position + self.position_map[index]
    }

    /// Document range covered by `length` characters starting at plain index `start`.
    pub fn map_range(&self, start: usize, length: usize) -> Range<usize> {
        if length == 0 {
            let at = self.map_position(start);
            return at..at;
        }
        let last = (start + length - 1).min(self.text.len().saturating_sub(1));
        self.map_position(start)..self.map_position(last) + 1
    }

    pub fn slice(&self, start: usize, length: usize) -> String {
        let end = (start + length).min(self.text.len());
        self.text[start.min(end)..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speller::document::{ElementInfo, SymbolDocument};

    fn doc() -> SymbolDocument {
        let mut doc = SymbolDocument::new("en-US");
        doc.open(ElementInfo::block())
            .push_text("ab ")
            .open(ElementInfo::formatting())
            .push_text("cd")
            .close()
            .push_embedded()
            .close()
            .open(ElementInfo::block())
            .push_text("ef")
            .close();
        doc
    }

    #[test]
    fn test_markup_translation() {
        let doc = doc();
        let map = TextMap::new(&doc, 0, doc.symbol_count(), 0, doc.symbol_count());
        let text: String = map.text().iter().collect();
        assert_eq!(text, format!(" ab cd{}  ef ", EMBEDDED_SENTINEL));
        assert_eq!(map.map_position(4), 5);
        assert_eq!(map.map_range(4, 2), 5..7);
        assert_eq!(map.text_length(), 12);
        assert_eq!(map.map_position(map.text_length()), doc.symbol_count());
    }

    #[test]
    fn test_position_map_is_monotonic() {
        let doc = doc();
        for start in 0..doc.symbol_count() {
            let map = TextMap::new(&doc, start, doc.symbol_count(), start, doc.symbol_count());
            let positions: Vec<usize> = (0..=map.text_length()).map(|i| map.map_position(i)).collect();
            assert!(positions.windows(2).all(|w| w[0] <= w[1]));
            if map.text_length() > 0 {
                assert_eq!(positions[map.text_length()], positions[map.text_length() - 1] + 1);
            }
        }
    }

    #[test]
    fn test_content_window_offsets() {
        let doc = doc();
        let map = TextMap::new(&doc, 1, 13, 4, 8);
        // "ab " then formatting edge skipped: content starts at "cd".
        assert_eq!(map.content_start_offset(), 3);
        assert_eq!(map.slice(map.content_start_offset(), 2), "cd");
        assert_eq!(map.content_end_offset(), 5);
        assert!(map.content_start_offset() <= map.content_end_offset());
        assert!(map.content_end_offset() <= map.text_length());
    }

    #[test]
    fn test_empty_window() {
        let doc = doc();
        let map = TextMap::new(&doc, 5, 5, 5, 5);
        assert_eq!(map.text_length(), 0);
        assert_eq!(map.map_position(0), 5);
        assert_eq!(map.content_end_offset(), 0);
    }
}
