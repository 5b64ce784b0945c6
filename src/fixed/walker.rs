use crate::fixed::element::{FixedElement, FixedPage, PathElement};
use crate::fixed::node::FixedNode;
use crate::fixed::som::{SomElement, SomImage, SomTextRun};
use crate::geometry::{Rect, Transform};
use std::collections::HashMap;

/// Result of walking one page: leaves in markup order plus the name table.
#[derive(Debug, Clone, Default)]
pub struct WalkedPage {
    pub page_index: usize,
    pub nodes: Vec<FixedNode>,
    /// Parallel to `nodes`.
    pub leaves: Vec<SomElement>,
    /// Element name to the index in `nodes` of the first leaf at or after it.
    pub names: HashMap<String, usize>,
}

impl WalkedPage {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position_of_name(&self, name: &str) -> Option<&FixedNode> {
        self.names.get(name).and_then(|&i| self.nodes.get(i))
    }
}

struct WalkContext<'a, F> {
    page: &'a FixedPage,
    out: WalkedPage,
    path: Vec<usize>,
    on_geometry: F,
}

/// Walk a page pre-order, collecting text and image leaves.
///
/// `on_geometry` receives every path that is not image-filled, with its
/// bounds already in page coordinates.
pub fn walk_page<F>(page_index: usize, page: &FixedPage, on_geometry: F) -> WalkedPage
where
    F: FnMut(&PathElement, Rect),
{
    let mut ctx = WalkContext {
        page,
        out: WalkedPage {
            page_index,
            ..Default::default()
        },
        path: Vec::with_capacity(4),
        on_geometry,
    };
    ctx.walk(&page.children, &Transform::identity());
    ctx.out
}

impl<F> WalkContext<'_, F>
where
    F: FnMut(&PathElement, Rect),
{
    fn walk(&mut self, children: &[FixedElement], transform: &Transform) {
        for (index, child) in children.iter().enumerate() {
            self.path.push(index);
            if let Some(name) = child.name() {
                let position = self.out.nodes.len();
                self.out.names.entry(name.to_string()).or_insert(position);
            }
            self.visit(child, transform);
            self.path.pop();
        }
    }

    fn visit(&mut self, element: &FixedElement, transform: &Transform) {
        match element {
            FixedElement::Container(container) => {
                let nested = container.transform.then(transform);
                self.walk(&container.children, &nested);
            }
            FixedElement::Glyphs(glyphs) => {
                let Some(local) = glyphs.local_bounds() else {
                    return;
                };
                let node = self.node();
                let run = SomTextRun {
                    node: node.clone(),
                    text: glyphs.text.clone(),
                    start_index: 0,
                    end_index: glyphs.char_count(),
                    culture: glyphs
                        .language
                        .clone()
                        .unwrap_or_else(|| self.page.language.clone()),
                    bidi_level: glyphs.bidi_level,
                    sideways: glyphs.sideways,
                    bounds: transform.transform_rect(&local),
                    font_size: glyphs.font_size,
                    line_index: 0,
                    navigate_uri: glyphs.navigate_uri.clone(),
                };
                self.push(node, SomElement::Text(run));
            }
            FixedElement::Image(image) => {
                let node = self.node();
                let leaf = SomImage {
                    node: node.clone(),
                    bounds: transform.transform_rect(&image.bounds),
                    navigate_uri: image.navigate_uri.clone(),
                };
                self.push(node, SomElement::Image(leaf));
            }
            FixedElement::Path(path) if path.is_image() => {
                let node = self.node();
                let leaf = SomImage {
                    node: node.clone(),
                    bounds: transform.transform_rect(&path.bounds),
                    navigate_uri: path.navigate_uri.clone(),
                };
                self.push(node, SomElement::Image(leaf));
            }
            FixedElement::Path(path) => {
                let bounds = transform.transform_rect(&path.bounds);
                (self.on_geometry)(path, bounds);
            }
        }
    }

    fn node(&self) -> FixedNode {
        FixedNode::new(self.out.page_index, &self.path)
    }

    fn push(&mut self, node: FixedNode, leaf: SomElement) {
        self.out.nodes.push(node);
        self.out.leaves.push(leaf);
    }
}
