use crate::fixed::node::FixedNode;
use crate::geometry::Rect;
use serde::Serialize;
use std::fmt;

pub type ScopeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Section,
    Paragraph,
    Hyperlink,
    Span,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
}

/// Payload of a scope: the element type and the properties it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowElement {
    pub kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl FlowElement {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            navigate_uri: None,
            language: None,
        }
    }

    pub fn hyperlink(uri: &str) -> Self {
        Self {
            kind: ElementKind::Hyperlink,
            navigate_uri: Some(uri.to_string()),
            language: None,
        }
    }
}

/// One fixed text run contributing to a flow Run node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRunElement {
    pub node: FixedNode,
    pub offset_in_node: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub is_reversed: bool,
    /// A synthesized space follows this element's glyphs in the flow text.
    pub separator: bool,
}

impl FlowRunElement {
    pub fn glyph_len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Length in flow characters, including the separator.
    pub fn flow_len(&self) -> usize {
        self.glyph_len() + usize::from(self.separator)
    }

    pub fn flow_end(&self) -> usize {
        self.offset_in_node + self.flow_len()
    }

    /// Glyph index for a local flow offset; reflected for reversed runs.
    pub fn glyph_index(&self, local: usize) -> usize {
        let local = local.min(self.glyph_len());
        if self.is_reversed {
            self.end_index - local
        } else {
            self.start_index + local
        }
    }

    /// Local flow offset for a glyph index; the inverse of `glyph_index`.
    pub fn local_offset(&self, glyph_index: usize) -> usize {
        let index = glyph_index.clamp(self.start_index, self.end_index);
        if self.is_reversed {
            self.end_index - index
        } else {
            index - self.start_index
        }
    }
}

/// The embedded element wrapped by an Object node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowObject {
    pub node: FixedNode,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeType {
    Start,
    End,
    Run,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowNode {
    Start {
        scope: ScopeId,
        element: FlowElement,
    },
    End {
        scope: ScopeId,
    },
    Run {
        text: String,
        length: usize,
        elements: Vec<FlowRunElement>,
    },
    Object(FlowObject),
}

impl FlowNode {
    pub fn node_type(&self) -> FlowNodeType {
        match self {
            FlowNode::Start { .. } => FlowNodeType::Start,
            FlowNode::End { .. } => FlowNodeType::End,
            FlowNode::Run { .. } => FlowNodeType::Run,
            FlowNode::Object(_) => FlowNodeType::Object,
        }
    }

    /// Number of flow offsets inside the node.
    pub fn len(&self) -> usize {
        match self {
            FlowNode::Run { length, .. } => *length,
            FlowNode::Object(_) => 1,
            FlowNode::Start { .. } | FlowNode::End { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_content(&self) -> bool {
        matches!(self, FlowNode::Run { .. } | FlowNode::Object(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FlowNode::Run { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNode::Start { element, .. } => match &element.navigate_uri {
                Some(uri) => write!(f, "Start({:?} {})", element.kind, uri),
                None => write!(f, "Start({:?})", element.kind),
            },
            FlowNode::End { .. } => write!(f, "End"),
            FlowNode::Run { text, .. } => write!(f, "Run({:?})", text),
            FlowNode::Object(object) => write!(f, "Object({})", object.node),
        }
    }
}
