use crate::config::FlowSettings;
use crate::fixed::flow::{ElementKind, FlowElement};
use crate::fixed::walker::WalkedPage;
use crate::geometry::Rect;

/// Semantic container tree handed to the flow builder. Leaves index into
/// `WalkedPage::leaves`; a range restricts a text leaf to part of its glyphs.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticNode {
    Container {
        element: FlowElement,
        children: Vec<SemanticNode>,
    },
    Leaf {
        index: usize,
        range: Option<(usize, usize)>,
    },
}

impl SemanticNode {
    pub fn container(kind: ElementKind, children: Vec<SemanticNode>) -> Self {
        SemanticNode::Container {
            element: FlowElement::new(kind),
            children,
        }
    }

    pub fn leaf(index: usize) -> Self {
        SemanticNode::Leaf { index, range: None }
    }
}

/// Supplies the semantic grouping of a walked page.
pub trait PageGrouper: Send + Sync {
    fn group(&self, page: &WalkedPage) -> Vec<SemanticNode>;
}

/// Groups leaves into paragraphs by vertical gaps, all inside one section.
#[derive(Debug, Clone, Default)]
pub struct ParagraphGrouper {
    settings: FlowSettings,
}

impl ParagraphGrouper {
    pub fn new(settings: FlowSettings) -> Self {
        Self { settings }
    }
}

impl PageGrouper for ParagraphGrouper {
    fn group(&self, page: &WalkedPage) -> Vec<SemanticNode> {
        if page.is_empty() {
            return Vec::new();
        }

        let mut paragraphs = Vec::new();
        let mut current: Vec<SemanticNode> = Vec::new();
        let mut previous: Option<Rect> = None;
        for (index, leaf) in page.leaves.iter().enumerate() {
            let bounds = leaf.bounds();
            if let Some(prev) = previous {
                let gap = bounds.top() - prev.bottom();
                let line_height = prev.height.min(bounds.height).max(1.0);
                if gap > line_height * self.settings.paragraph_gap && !current.is_empty() {
                    paragraphs.push(SemanticNode::container(
                        ElementKind::Paragraph,
                        std::mem::take(&mut current),
                    ));
                }
            }
            current.push(SemanticNode::leaf(index));
            previous = Some(bounds);
        }
        if !current.is_empty() {
            paragraphs.push(SemanticNode::container(ElementKind::Paragraph, current));
        }

        vec![SemanticNode::container(ElementKind::Section, paragraphs)]
    }
}
