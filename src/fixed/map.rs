use crate::fixed::builder::BuiltPage;
use crate::fixed::flow::FlowNode;
use crate::fixed::lines::LineTable;
use crate::fixed::node::{FixedNode, FixedPosition};
use crate::LogicalDirection;
use std::collections::HashMap;

/// Offset in the flow: a node of a page's flow sequence and an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowPosition {
    pub page: usize,
    pub node: usize,
    pub offset: usize,
}

impl FlowPosition {
    pub fn new(page: usize, node: usize, offset: usize) -> Self {
        Self { page, node, offset }
    }
}

/// Flow nodes of one page plus the fixed-node back index.
#[derive(Debug, Clone, Default)]
pub struct PageFlow {
    nodes: Vec<FlowNode>,
    lines: LineTable,
    by_fixed: HashMap<FixedNode, Vec<(usize, usize)>>,
}

impl PageFlow {
    pub fn new(built: BuiltPage) -> Self {
        let mut by_fixed: HashMap<FixedNode, Vec<(usize, usize)>> = HashMap::new();
        for (i, node) in built.nodes.iter().enumerate() {
            match node {
                FlowNode::Run { elements, .. } => {
                    debug_assert!(
                        elements.windows(2).all(|w| w[0].offset_in_node <= w[1].offset_in_node),
                        "run element offsets must be non-decreasing"
                    );
                    for (e, element) in elements.iter().enumerate() {
                        by_fixed.entry(element.node.clone()).or_default().push((i, e));
                    }
                }
                FlowNode::Object(object) => {
                    by_fixed.entry(object.node.clone()).or_default().push((i, 0));
                }
                FlowNode::Start { .. } | FlowNode::End { .. } => {}
            }
        }
        Self {
            nodes: built.nodes,
            lines: built.lines,
            by_fixed,
        }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn lines(&self) -> &LineTable {
        &self.lines
    }

    /// Flow text of the page; Object nodes read as U+FFFC.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            match node {
                FlowNode::Run { text: run, .. } => text.push_str(run),
                FlowNode::Object(_) => text.push('\u{FFFC}'),
                FlowNode::Start { .. } | FlowNode::End { .. } => {}
            }
        }
        text
    }
}

/// A fixed glyph range selected by a flow range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRangeElement {
    pub node: FixedNode,
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRangeElements {
    pub elements: Vec<FixedRangeElement>,
    /// Glyph offset where the range starts inside the first element.
    pub first_offset: usize,
    /// Glyph offset where the range ends inside the last element.
    pub last_offset: usize,
}

/// Bidirectional fixed/flow index, one slot per page.
#[derive(Debug, Clone, Default)]
pub struct FixedFlowMap {
    pages: Vec<Option<PageFlow>>,
}

impl FixedFlowMap {
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![None; page_count],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, page: usize) -> Option<&PageFlow> {
        self.pages.get(page).and_then(Option::as_ref)
    }

    pub fn is_built(&self, page: usize) -> bool {
        self.page(page).is_some()
    }

    /// Replace a page's mapping; the previous entries are dropped first.
    pub fn set_page(&mut self, page: usize, flow: PageFlow) {
        if page >= self.pages.len() {
            self.pages.resize(page + 1, None);
        }
        self.pages[page] = Some(flow);
    }

    pub fn discard_page(&mut self, page: usize) {
        if let Some(slot) = self.pages.get_mut(page) {
            *slot = None;
        }
    }

    pub fn fixed_to_flow(&self, position: &FixedPosition) -> Option<FlowPosition> {
        let page = position.node.page();
        let flow = self.page(page)?;
        if position.node == FixedNode::page_start(page) {
            return Some(FlowPosition::new(page, 0, 0));
        }
        if position.node == FixedNode::page_end(page) {
            return Some(FlowPosition::new(page, flow.nodes.len(), 0));
        }

        let entries = flow.by_fixed.get(&position.node)?;
        for &(node_index, element_index) in entries {
            match &flow.nodes[node_index] {
                FlowNode::Run { elements, .. } => {
                    let element = &elements[element_index];
                    if (element.start_index..=element.end_index).contains(&position.offset) {
                        let offset = element.offset_in_node + element.local_offset(position.offset);
                        return Some(FlowPosition::new(page, node_index, offset));
                    }
                }
                FlowNode::Object(_) => {
                    return Some(FlowPosition::new(page, node_index, position.offset.min(1)));
                }
                FlowNode::Start { .. } | FlowNode::End { .. } => {}
            }
        }
        None
    }

    pub fn flow_to_fixed(&self, position: FlowPosition, direction: LogicalDirection) -> Option<FixedPosition> {
        let flow = self.page(position.page)?;
        let Some(node) = flow.nodes.get(position.node) else {
            return Some(FixedPosition::new(FixedNode::page_end(position.page), 0));
        };

        match node {
            FlowNode::Run { elements, .. } => {
                let target = position.offset;
                let mut index = elements
                    .partition_point(|e| e.offset_in_node <= target)
                    .saturating_sub(1);
                if direction == LogicalDirection::Backward
                    && index > 0
                    && elements[index].offset_in_node == target
                    && elements[index - 1].flow_end() == target
                {
                    index -= 1;
                }
                let element = elements.get(index)?;
                let local = target.saturating_sub(element.offset_in_node);
                Some(FixedPosition::new(element.node.clone(), element.glyph_index(local)))
            }
            FlowNode::Object(object) => Some(FixedPosition::new(object.node.clone(), position.offset.min(1))),
            FlowNode::Start { .. } | FlowNode::End { .. } => {
                Some(Self::nearest_content(flow, position.page, position.node, direction))
            }
        }
    }

    fn nearest_content(flow: &PageFlow, page: usize, from: usize, direction: LogicalDirection) -> FixedPosition {
        match direction {
            LogicalDirection::Forward => flow.nodes[from..]
                .iter()
                .find_map(|node| match node {
                    FlowNode::Run { elements, .. } => elements
                        .first()
                        .map(|e| FixedPosition::new(e.node.clone(), e.glyph_index(0))),
                    FlowNode::Object(object) => Some(FixedPosition::new(object.node.clone(), 0)),
                    _ => None,
                })
                .unwrap_or_else(|| FixedPosition::new(FixedNode::page_end(page), 0)),
            LogicalDirection::Backward => flow.nodes[..from]
                .iter()
                .rev()
                .find_map(|node| match node {
                    FlowNode::Run { elements, .. } => elements
                        .last()
                        .map(|e| FixedPosition::new(e.node.clone(), e.glyph_index(e.glyph_len()))),
                    FlowNode::Object(object) => Some(FixedPosition::new(object.node.clone(), 1)),
                    _ => None,
                })
                .unwrap_or_else(|| FixedPosition::new(FixedNode::page_start(page), 0)),
        }
    }

    /// Fixed elements covered by `[start, end)`, or `None` when nothing is covered.
    pub fn range_to_elements(&self, start: FlowPosition, end: FlowPosition) -> Option<FlowRangeElements> {
        if end <= start {
            return None;
        }
        let mut elements = Vec::new();
        let mut first_offset = None;
        let mut last_offset = 0;

        for page in start.page..=end.page {
            let Some(flow) = self.page(page) else {
                continue;
            };
            for (index, node) in flow.nodes.iter().enumerate() {
                if page == start.page && index < start.node {
                    continue;
                }
                if page == end.page && index > end.node {
                    break;
                }
                let from = if page == start.page && index == start.node {
                    start.offset
                } else {
                    0
                };
                let to = if page == end.page && index == end.node {
                    end.offset.min(node.len())
                } else {
                    node.len()
                };
                if from >= to {
                    continue;
                }

                match node {
                    FlowNode::Object(object) => {
                        first_offset.get_or_insert(0);
                        last_offset = 1;
                        elements.push(FixedRangeElement {
                            node: object.node.clone(),
                            start_index: 0,
                            end_index: 1,
                        });
                    }
                    FlowNode::Run { elements: runs, .. } => {
                        for element in runs {
                            let lo = from.max(element.offset_in_node) - element.offset_in_node;
                            let hi = to.min(element.flow_end()).saturating_sub(element.offset_in_node);
                            let hi = hi.min(element.glyph_len());
                            if element.offset_in_node >= to || element.flow_end() <= from || lo >= hi {
                                continue;
                            }
                            let a = element.glyph_index(lo);
                            let b = element.glyph_index(hi);
                            first_offset.get_or_insert(a);
                            last_offset = b;
                            elements.push(FixedRangeElement {
                                node: element.node.clone(),
                                start_index: a.min(b),
                                end_index: a.max(b),
                            });
                        }
                    }
                    FlowNode::Start { .. } | FlowNode::End { .. } => {}
                }
            }
        }

        let first_offset = first_offset?;
        Some(FlowRangeElements {
            elements,
            first_offset,
            last_offset,
        })
    }
}
