use crate::geometry::{Point, Rect, Transform};
use serde::{Deserialize, Serialize};

/// One positioned element of a fixed page. Containers nest, everything else is a leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixedElement {
    Glyphs(GlyphRun),
    Image(ImageElement),
    Path(PathElement),
    Container(ContainerElement),
}

impl FixedElement {
    pub fn name(&self) -> Option<&str> {
        match self {
            FixedElement::Glyphs(g) => g.name.as_deref(),
            FixedElement::Image(i) => i.name.as_deref(),
            FixedElement::Path(p) => p.name.as_deref(),
            FixedElement::Container(c) => c.name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlyphRun {
    #[serde(default)]
    pub name: Option<String>,
    pub text: String,
    /// Baseline origin in the coordinate space of the parent container.
    pub origin: Point,
    pub font_size: f64,
    /// Advance width per character. Missing entries default to half an em.
    #[serde(default)]
    pub advances: Vec<f64>,
    #[serde(default)]
    pub bidi_level: u8,
    #[serde(default)]
    pub sideways: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub navigate_uri: Option<String>,
}

impl GlyphRun {
    pub fn new(text: &str, origin: Point, font_size: f64) -> Self {
        Self {
            name: None,
            text: text.to_string(),
            origin,
            font_size,
            advances: Vec::new(),
            bidi_level: 0,
            sideways: false,
            language: None,
            navigate_uri: None,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_rtl(&self) -> bool {
        self.bidi_level % 2 == 1
    }

    pub fn advance_width(&self) -> f64 {
        (0..self.char_count())
            .map(|i| {
                self.advances
                    .get(i)
                    .copied()
                    .unwrap_or(self.font_size * 0.5)
            })
            .sum()
    }

    /// Box spanned by the run in its local space, `None` when it has no measurable extent.
    pub fn local_bounds(&self) -> Option<Rect> {
        if self.text.is_empty() || self.font_size <= 0.0 {
            return None;
        }
        let width = self.advance_width();
        if width <= 0.0 {
            return None;
        }
        let rect = if self.sideways {
            Rect::new(self.origin.x, self.origin.y, self.font_size, width)
        } else if self.is_rtl() {
            Rect::new(
                self.origin.x - width,
                self.origin.y - self.font_size,
                width,
                self.font_size,
            )
        } else {
            Rect::new(
                self.origin.x,
                self.origin.y - self.font_size,
                width,
                self.font_size,
            )
        };
        Some(rect)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(default)]
    pub name: Option<String>,
    pub bounds: Rect,
    #[serde(default)]
    pub navigate_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathFill {
    #[default]
    None,
    Solid,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathElement {
    #[serde(default)]
    pub name: Option<String>,
    pub bounds: Rect,
    #[serde(default)]
    pub fill: PathFill,
    #[serde(default)]
    pub navigate_uri: Option<String>,
}

impl PathElement {
    pub fn is_image(&self) -> bool {
        self.fill == PathFill::Image
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerElement {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub children: Vec<FixedElement>,
}

/// A page of positioned content as supplied by the layout collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPage {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub children: Vec<FixedElement>,
}

fn default_language() -> String {
    "en-US".to_string()
}

impl FixedPage {
    pub fn new(children: Vec<FixedElement>) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            language: default_language(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_bounds() {
        let mut run = GlyphRun::new("abcd", Point::new(10.0, 20.0), 10.0);
        assert_eq!(run.local_bounds(), Some(Rect::new(10.0, 10.0, 20.0, 10.0)));

        run.bidi_level = 1;
        assert_eq!(run.local_bounds(), Some(Rect::new(-10.0, 10.0, 20.0, 10.0)));

        run.advances = vec![0.0; 4];
        assert_eq!(run.local_bounds(), None);
    }

    #[test]
    fn test_page_from_json() {
        let json = r#"{
            "children": [
                {"type": "glyphs", "text": "Hi", "origin": {"x": 0, "y": 12}, "font_size": 12},
                {"type": "container", "transform": {"m11": 1, "m12": 0, "m21": 0, "m22": 1, "dx": 5, "dy": 5},
                 "children": [{"type": "path", "bounds": {"x": 0, "y": 0, "width": 4, "height": 4}, "fill": "image"}]}
            ]
        }"#;
        let page: FixedPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.language, "en-US");
        assert_eq!(page.children.len(), 2);
        match &page.children[1] {
            FixedElement::Container(c) => match &c.children[0] {
                FixedElement::Path(p) => assert!(p.is_image()),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }
}
