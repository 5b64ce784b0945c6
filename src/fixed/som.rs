use crate::fixed::node::FixedNode;
use crate::geometry::Rect;

/// A run of characters from one glyph run that share script, culture and bidi level.
#[derive(Debug, Clone, PartialEq)]
pub struct SomTextRun {
    pub node: FixedNode,
    /// Full text of the originating glyph run; `start_index..end_index` selects this run.
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub culture: String,
    pub bidi_level: u8,
    pub sideways: bool,
    /// Page-space bounding box.
    pub bounds: Rect,
    pub font_size: f64,
    pub line_index: usize,
    pub navigate_uri: Option<String>,
}

impl SomTextRun {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.end_index <= self.start_index
    }

    pub fn is_reversed(&self) -> bool {
        self.bidi_level % 2 == 1
    }

    /// Characters of `start_index..end_index`.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.text
            .chars()
            .skip(self.start_index)
            .take(self.end_index - self.start_index)
    }

    pub fn visible_text(&self) -> String {
        self.chars().collect()
    }

    pub fn last_char(&self) -> Option<char> {
        if self.is_empty() {
            return None;
        }
        self.text.chars().nth(self.end_index - 1)
    }

    /// Restrict to a sub-range of the glyph run, clamped to its length.
    pub fn slice(&self, start: usize, end: usize) -> SomTextRun {
        let total = self.text.chars().count();
        let end = end.min(total);
        let start = start.min(end);
        SomTextRun {
            start_index: start,
            end_index: end,
            ..self.clone()
        }
    }
}

/// A non-text leaf: an image or an image-filled path.
#[derive(Debug, Clone, PartialEq)]
pub struct SomImage {
    pub node: FixedNode,
    pub bounds: Rect,
    pub navigate_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SomElement {
    Text(SomTextRun),
    Image(SomImage),
}

impl SomElement {
    pub fn node(&self) -> &FixedNode {
        match self {
            SomElement::Text(t) => &t.node,
            SomElement::Image(i) => &i.node,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            SomElement::Text(t) => t.bounds,
            SomElement::Image(i) => i.bounds,
        }
    }

    pub fn navigate_uri(&self) -> Option<&str> {
        match self {
            SomElement::Text(t) => t.navigate_uri.as_deref(),
            SomElement::Image(i) => i.navigate_uri.as_deref(),
        }
    }
}
