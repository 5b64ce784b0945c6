use std::cmp::Ordering;
use std::fmt;

/// Identifies one positioned leaf on a page by its child-index path.
///
/// Depth one and two are stored inline; deeper paths spill to the heap.
/// Every page also owns two artificial boundary nodes that sort before and
/// after all real content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedNode {
    page: usize,
    path: NodePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodePath {
    PageStart,
    Depth1([usize; 1]),
    Depth2([usize; 2]),
    Deep(Box<[usize]>),
    PageEnd,
}

impl FixedNode {
    /// Create a node from the child indices leading to it, outermost first.
    pub fn new(page: usize, path: &[usize]) -> Self {
        let path = match *path {
            [a] => NodePath::Depth1([a]),
            [a, b] => NodePath::Depth2([a, b]),
            _ => {
                debug_assert!(!path.is_empty(), "fixed node path cannot be empty");
                NodePath::Deep(path.into())
            }
        };
        Self { page, path }
    }

    pub fn page_start(page: usize) -> Self {
        Self {
            page,
            path: NodePath::PageStart,
        }
    }

    pub fn page_end(page: usize) -> Self {
        Self {
            page,
            path: NodePath::PageEnd,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self.path, NodePath::PageStart | NodePath::PageEnd)
    }

    pub fn depth(&self) -> usize {
        self.indices().len()
    }

    pub fn indices(&self) -> &[usize] {
        match &self.path {
            NodePath::PageStart | NodePath::PageEnd => &[],
            NodePath::Depth1(p) => p,
            NodePath::Depth2(p) => p,
            NodePath::Deep(p) => p,
        }
    }

    fn rank(&self) -> u8 {
        match self.path {
            NodePath::PageStart => 0,
            NodePath::PageEnd => 2,
            _ => 1,
        }
    }
}

impl Ord for FixedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page
            .cmp(&other.page)
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| self.indices().cmp(other.indices()))
    }
}

impl PartialOrd for FixedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FixedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            NodePath::PageStart => write!(f, "{}:start", self.page),
            NodePath::PageEnd => write!(f, "{}:end", self.page),
            _ => {
                let parts: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
                write!(f, "{}:{}", self.page, parts.join("/"))
            }
        }
    }
}

/// A character offset inside a fixed node. Boundary nodes only use offset 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedPosition {
    pub node: FixedNode,
    pub offset: usize,
}

impl FixedPosition {
    pub fn new(node: FixedNode, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_order() {
        let start = FixedNode::page_start(0);
        let a = FixedNode::new(0, &[0]);
        let b = FixedNode::new(0, &[0, 3]);
        let c = FixedNode::new(0, &[1, 0, 2]);
        let end = FixedNode::page_end(0);
        let next = FixedNode::page_start(1);

        let mut nodes = vec![next.clone(), c.clone(), end.clone(), a.clone(), start.clone(), b.clone()];
        nodes.sort();
        assert_eq!(nodes, vec![start, a, b, c, end, next]);
    }

    #[test]
    fn test_inline_depths() {
        assert_eq!(FixedNode::new(2, &[4]).depth(), 1);
        assert_eq!(FixedNode::new(2, &[4, 5]).indices(), &[4, 5]);
        assert_eq!(FixedNode::new(2, &[1, 2, 3]).to_string(), "2:1/2/3");
        assert!(FixedNode::page_end(2).is_boundary());
    }
}
