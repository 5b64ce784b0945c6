use crate::fixed::node::FixedNode;
use crate::geometry::{Point, Rect};

/// One visual line: the distinct fixed nodes on it and their combined bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    pub index: usize,
    pub nodes: Vec<FixedNode>,
    pub bounds: Rect,
}

impl LineResult {
    fn new(index: usize) -> Self {
        Self {
            index,
            nodes: Vec::new(),
            bounds: Rect::default(),
        }
    }

    pub(crate) fn add(&mut self, node: &FixedNode, bounds: &Rect) {
        if !self.nodes.contains(node) {
            self.nodes.push(node.clone());
        }
        self.bounds = self.bounds.union(bounds);
    }
}

/// Accumulates lines while a page is being built.
#[derive(Debug, Default)]
pub(crate) struct LineBuilder {
    lines: Vec<LineResult>,
    current: Option<LineResult>,
}

impl LineBuilder {
    /// Index of the line the next run lands on.
    pub(crate) fn place(&mut self, node: &FixedNode, bounds: &Rect, new_line: bool) -> usize {
        if new_line {
            if let Some(done) = self.current.take() {
                self.lines.push(done);
            }
        }
        let next_index = self.lines.len();
        let line = self.current.get_or_insert_with(|| LineResult::new(next_index));
        line.add(node, bounds);
        line.index
    }

    pub(crate) fn finish(mut self) -> LineTable {
        if let Some(done) = self.current.take() {
            self.lines.push(done);
        }
        LineTable { lines: self.lines }
    }
}

/// Immutable per-page line table used for line navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineTable {
    lines: Vec<LineResult>,
}

impl LineTable {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineResult> {
        self.lines.get(index)
    }

    pub fn first(&self) -> Option<&LineResult> {
        self.lines.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineResult> {
        self.lines.iter()
    }

    /// Line containing `node`.
    pub fn line_of(&self, node: &FixedNode) -> Option<&LineResult> {
        self.lines.iter().find(|l| l.nodes.contains(node))
    }

    /// Move `count` lines from `index`, stopping at either end.
    pub fn next(&self, index: usize, count: isize) -> Option<&LineResult> {
        if self.lines.is_empty() {
            return None;
        }
        let last = self.lines.len() as isize - 1;
        let target = (index as isize + count).clamp(0, last);
        self.lines.get(target as usize)
    }

    /// The line hit by `point`, or else the vertically closest one.
    pub fn line_at(&self, point: Point) -> Option<&LineResult> {
        if let Some(hit) = self.lines.iter().find(|l| l.bounds.contains(point)) {
            return Some(hit);
        }
        self.lines.iter().min_by(|a, b| {
            a.bounds
                .vertical_distance(point)
                .total_cmp(&b.bounds.vertical_distance(point))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LineTable {
        let mut builder = LineBuilder::default();
        let a = FixedNode::new(0, &[0]);
        let b = FixedNode::new(0, &[1]);
        let c = FixedNode::new(0, &[2]);
        assert_eq!(builder.place(&a, &Rect::new(0.0, 0.0, 10.0, 10.0), false), 0);
        assert_eq!(builder.place(&a, &Rect::new(0.0, 0.0, 10.0, 10.0), false), 0);
        assert_eq!(builder.place(&b, &Rect::new(12.0, 0.0, 10.0, 10.0), false), 0);
        assert_eq!(builder.place(&c, &Rect::new(0.0, 20.0, 10.0, 10.0), true), 1);
        builder.finish()
    }

    #[test]
    fn test_line_grouping() {
        let lines = table();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap().nodes.len(), 2);
        assert_eq!(lines.first().unwrap().bounds, Rect::new(0.0, 0.0, 22.0, 10.0));
        assert_eq!(lines.line_of(&FixedNode::new(0, &[2])).unwrap().index, 1);
    }

    #[test]
    fn test_line_navigation() {
        let lines = table();
        assert_eq!(lines.next(0, 1).unwrap().index, 1);
        assert_eq!(lines.next(1, 5).unwrap().index, 1);
        assert_eq!(lines.next(1, -3).unwrap().index, 0);
        assert_eq!(lines.line_at(Point::new(5.0, 25.0)).unwrap().index, 1);
        assert_eq!(lines.line_at(Point::new(5.0, 14.0)).unwrap().index, 0);
    }
}
