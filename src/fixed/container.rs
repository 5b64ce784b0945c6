use crate::config::FlowSettings;
use crate::error::FlowError;
use crate::fixed::builder::{build_page, BuildContext};
use crate::fixed::element::FixedPage;
use crate::fixed::grouping::{PageGrouper, ParagraphGrouper};
use crate::fixed::hyperlink::ShadowHyperlinks;
use crate::fixed::lines::LineResult;
use crate::fixed::map::{FixedFlowMap, FlowPosition, PageFlow};
use crate::fixed::node::{FixedNode, FixedPosition};
use crate::fixed::walker::walk_page;
use crate::geometry::Point;
use crate::LogicalDirection;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

/// Fixed document exposed as flow text. Pages are built on first access.
pub struct FixedTextContainer {
    pages: Vec<FixedPage>,
    map: FixedFlowMap,
    names: Vec<Option<HashMap<String, FixedNode>>>,
    grouper: Box<dyn PageGrouper>,
    settings: FlowSettings,
}

type PageBuild = (PageFlow, HashMap<String, FixedNode>);

/// Build one page. Scope ids are page-local, so a page numbers its scopes the
/// same whatever order pages are built in.
fn build_one(index: usize, page: &FixedPage, grouper: &dyn PageGrouper, settings: &FlowSettings) -> PageBuild {
    let mut ctx = BuildContext::new();
    let mut shadows = ShadowHyperlinks::new();
    let walked = walk_page(index, page, |path, bounds| shadows.collect(path, bounds));
    let grouping = grouper.group(&walked);
    let names = walked
        .names
        .iter()
        .filter_map(|(name, &i)| walked.nodes.get(i).map(|node| (name.clone(), node.clone())))
        .collect();
    let built = build_page(&walked, &grouping, shadows, settings, &mut ctx);
    (PageFlow::new(built), names)
}

impl FixedTextContainer {
    pub fn new(pages: Vec<FixedPage>, settings: FlowSettings) -> Self {
        let grouper = Box::new(ParagraphGrouper::new(settings.clone()));
        Self::with_grouper(pages, settings, grouper)
    }

    pub fn with_grouper(pages: Vec<FixedPage>, settings: FlowSettings, grouper: Box<dyn PageGrouper>) -> Self {
        let count = pages.len();
        Self {
            pages,
            map: FixedFlowMap::new(count),
            names: vec![None; count],
            grouper,
            settings,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn map(&self) -> &FixedFlowMap {
        &self.map
    }

    fn check_page(&self, page: usize) -> Result<(), FlowError> {
        if page < self.pages.len() {
            Ok(())
        } else {
            Err(FlowError::PageOutOfRange {
                page,
                count: self.pages.len(),
            })
        }
    }

    /// Build the page's flow if it is not built yet.
    pub fn ensure_page(&mut self, page: usize) -> Result<&PageFlow, FlowError> {
        self.check_page(page)?;
        if !self.map.is_built(page) {
            debug!("devirtualizing page {}", page);
            let (flow, names) = build_one(page, &self.pages[page], self.grouper.as_ref(), &self.settings);
            self.map.set_page(page, flow);
            self.names[page] = Some(names);
        }
        self.map
            .page(page)
            .ok_or(FlowError::PageOutOfRange {
                page,
                count: self.pages.len(),
            })
    }

    /// Drop a page's flow structure; it is rebuilt on next access.
    pub fn virtualize(&mut self, page: usize) {
        if self.map.is_built(page) {
            debug!("virtualizing page {}", page);
        }
        self.map.discard_page(page);
        if let Some(slot) = self.names.get_mut(page) {
            *slot = None;
        }
    }

    /// Build every page not built yet on the rayon pool.
    pub fn build_all_parallel(&mut self) {
        let grouper = self.grouper.as_ref();
        let settings = &self.settings;
        let map = &self.map;
        let built: Vec<(usize, PageBuild)> = self
            .pages
            .par_iter()
            .enumerate()
            .filter(|(index, _)| !map.is_built(*index))
            .map(|(index, page)| (index, build_one(index, page, grouper, settings)))
            .collect();
        for (index, (flow, names)) in built {
            self.map.set_page(index, flow);
            self.names[index] = Some(names);
        }
    }

    pub fn create_flow_position(&mut self, fixed: &FixedPosition) -> Result<Option<FlowPosition>, FlowError> {
        self.ensure_page(fixed.node.page())?;
        Ok(self.map.fixed_to_flow(fixed))
    }

    pub fn get_fixed_position(
        &mut self,
        flow: FlowPosition,
        direction: LogicalDirection,
    ) -> Result<Option<FixedPosition>, FlowError> {
        self.ensure_page(flow.page)?;
        Ok(self.map.flow_to_fixed(flow, direction))
    }

    /// Distinct fixed nodes touched by `[start, end)`, in flow order.
    pub fn get_fixed_nodes_for_flow_range(
        &mut self,
        start: FlowPosition,
        end: FlowPosition,
    ) -> Result<Vec<FixedNode>, FlowError> {
        for page in start.page..=end.page {
            self.ensure_page(page)?;
        }
        let mut nodes: Vec<FixedNode> = Vec::new();
        if let Some(range) = self.map.range_to_elements(start, end) {
            for element in range.elements {
                if !nodes.contains(&element.node) {
                    nodes.push(element.node);
                }
            }
        }
        Ok(nodes)
    }

    pub fn get_first_line(&mut self, page: usize) -> Result<Option<LineResult>, FlowError> {
        Ok(self.ensure_page(page)?.lines().first().cloned())
    }

    pub fn get_next_line(&mut self, page: usize, line: usize, count: isize) -> Result<Option<LineResult>, FlowError> {
        Ok(self.ensure_page(page)?.lines().next(line, count).cloned())
    }

    pub fn get_line(&mut self, page: usize, point: Point) -> Result<Option<LineResult>, FlowError> {
        Ok(self.ensure_page(page)?.lines().line_at(point).cloned())
    }

    /// Resolve a named element, building pages in order until found.
    pub fn find_name(&mut self, name: &str) -> Result<Option<FixedNode>, FlowError> {
        for page in 0..self.pages.len() {
            self.ensure_page(page)?;
            if let Some(node) = self.names[page].as_ref().and_then(|names| names.get(name)) {
                return Ok(Some(node.clone()));
            }
        }
        Ok(None)
    }
}
