use crate::config::FlowSettings;
use crate::fixed::adjacency::{compare_glyphs, compare_run_to_box, is_non_contiguous, needs_separator_after, GlyphComparison};
use crate::fixed::flow::{ElementKind, FlowElement, FlowNode, FlowObject, FlowRunElement, ScopeId};
use crate::fixed::grouping::SemanticNode;
use crate::fixed::hyperlink::ShadowHyperlinks;
use crate::fixed::lines::{LineBuilder, LineTable};
use crate::fixed::som::{SomElement, SomImage, SomTextRun};
use crate::fixed::walker::WalkedPage;
use log::trace;

/// Traversal state shared by the builders of one pass, passed explicitly.
#[derive(Debug, Default)]
pub struct BuildContext {
    next_scope: ScopeId,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_scope(&mut self) -> ScopeId {
        let id = self.next_scope;
        self.next_scope += 1;
        id
    }
}

/// Output of one page build.
#[derive(Debug, Clone, Default)]
pub struct BuiltPage {
    pub nodes: Vec<FlowNode>,
    pub lines: LineTable,
}

/// Properties that must match for runs to share a Run node.
#[derive(Debug, Clone, PartialEq)]
struct RunProperties {
    culture: String,
    bidi_level: u8,
    sideways: bool,
}

impl RunProperties {
    fn of(run: &SomTextRun) -> Self {
        Self {
            culture: run.culture.to_ascii_lowercase(),
            bidi_level: run.bidi_level,
            sideways: run.sideways,
        }
    }
}

/// Single-pass builder turning a pre-order semantic walk into flow nodes.
pub struct FlowModelBuilder<'a> {
    ctx: &'a mut BuildContext,
    settings: FlowSettings,
    shadows: ShadowHyperlinks,
    nodes: Vec<FlowNode>,
    open_scopes: Vec<ScopeId>,
    pending: Vec<SomTextRun>,
    pending_props: Option<RunProperties>,
    pending_uri: Option<String>,
    trailing_separator: bool,
    open_hyperlink: Option<ScopeId>,
    lines: LineBuilder,
    last_text: Option<SomTextRun>,
}

impl<'a> FlowModelBuilder<'a> {
    pub fn new(ctx: &'a mut BuildContext, settings: FlowSettings, shadows: ShadowHyperlinks) -> Self {
        Self {
            ctx,
            settings,
            shadows,
            nodes: Vec::new(),
            open_scopes: Vec::new(),
            pending: Vec::new(),
            pending_props: None,
            pending_uri: None,
            trailing_separator: false,
            open_hyperlink: None,
            lines: LineBuilder::default(),
            last_text: None,
        }
    }

    pub fn add_start_node(&mut self, kind: ElementKind) {
        self.add_start_element(FlowElement::new(kind));
    }

    pub fn add_start_element(&mut self, element: FlowElement) {
        self.flush();
        let scope = self.ctx.next_scope();
        self.nodes.push(FlowNode::Start { scope, element });
        self.open_scopes.push(scope);
    }

    pub fn add_end_node(&mut self) {
        self.flush();
        match self.open_scopes.pop() {
            Some(scope) => self.nodes.push(FlowNode::End { scope }),
            None => debug_assert!(false, "end node without a matching start node"),
        }
    }

    pub fn add_element(&mut self, element: SomElement) {
        match element {
            SomElement::Text(run) => self.add_text(run),
            SomElement::Image(image) => self.add_image(image),
        }
    }

    fn add_text(&mut self, mut run: SomTextRun) {
        let uri = match &run.navigate_uri {
            Some(uri) => Some(uri.clone()),
            None => self.shadows.claim(&run.bounds, self.settings.hyperlink_overlap),
        };
        let props = RunProperties::of(&run);
        if !self.pending.is_empty()
            && (self.pending_props.as_ref() != Some(&props) || self.pending_uri != uri)
        {
            self.flush();
        }
        if self.pending.is_empty() {
            if let Some(uri) = &uri {
                self.open_hyperlink(uri);
            }
            self.pending_props = Some(props);
            self.pending_uri = uri;
        }

        let new_line = match &self.last_text {
            Some(prev) => compare_glyphs(prev, &run, &self.settings) == GlyphComparison::DifferentLine,
            None => false,
        };
        run.line_index = self.lines.place(&run.node, &run.bounds, new_line);
        self.last_text = Some(run.clone());
        self.pending.push(run);
    }

    fn add_image(&mut self, image: SomImage) {
        if let Some(last) = self.pending.last() {
            let comparison = compare_run_to_box(last, &image.bounds, &self.settings);
            if needs_separator_after(last, comparison) {
                self.trailing_separator = true;
            }
        }
        self.flush();

        let uri = match &image.navigate_uri {
            Some(uri) => Some(uri.clone()),
            None => self.shadows.claim(&image.bounds, self.settings.hyperlink_overlap),
        };
        if let Some(uri) = &uri {
            self.open_hyperlink(uri);
        }
        self.nodes.push(FlowNode::Object(FlowObject {
            node: image.node,
            bounds: image.bounds,
        }));
        self.close_hyperlink();
    }

    fn open_hyperlink(&mut self, uri: &str) {
        let scope = self.ctx.next_scope();
        self.nodes.push(FlowNode::Start {
            scope,
            element: FlowElement::hyperlink(uri),
        });
        self.open_hyperlink = Some(scope);
    }

    fn close_hyperlink(&mut self) {
        if let Some(scope) = self.open_hyperlink.take() {
            self.nodes.push(FlowNode::End { scope });
        }
    }

    /// Emit the pending runs as one Run node and close any inline wrapper.
    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let trailing = std::mem::take(&mut self.trailing_separator);
        self.pending_props = None;
        self.pending_uri = None;

        let mut text = String::new();
        let mut length = 0;
        let mut elements = Vec::with_capacity(pending.len());
        for (i, run) in pending.iter().enumerate() {
            let separator = match pending.get(i + 1) {
                Some(next) if next.node == run.node => next.start_index != run.end_index,
                Some(next) => {
                    let comparison = compare_glyphs(run, next, &self.settings);
                    is_non_contiguous(run, next, comparison)
                }
                None => trailing,
            };
            if run.is_reversed() {
                let mut chars: Vec<char> = run.chars().collect();
                chars.reverse();
                text.extend(chars);
            } else {
                text.extend(run.chars());
            }
            if separator {
                text.push(' ');
            }
            let element = FlowRunElement {
                node: run.node.clone(),
                offset_in_node: length,
                start_index: run.start_index,
                end_index: run.end_index,
                is_reversed: run.is_reversed(),
                separator,
            };
            length += element.flow_len();
            elements.push(element);
        }

        if length > 0 {
            trace!("flow run {:?} from {} elements", text, elements.len());
            self.nodes.push(FlowNode::Run {
                text,
                length,
                elements,
            });
        }
        self.close_hyperlink();
    }

    pub fn finish_mapping(mut self) -> BuiltPage {
        self.flush();
        debug_assert!(self.open_scopes.is_empty(), "unbalanced start nodes at page end");
        while let Some(scope) = self.open_scopes.pop() {
            self.nodes.push(FlowNode::End { scope });
        }

        let unused: Vec<String> = self.shadows.unused().map(|r| r.uri.clone()).collect();
        for uri in unused {
            let paragraph = self.ctx.next_scope();
            self.nodes.push(FlowNode::Start {
                scope: paragraph,
                element: FlowElement::new(ElementKind::Paragraph),
            });
            self.open_hyperlink(&uri);
            self.close_hyperlink();
            self.nodes.push(FlowNode::End { scope: paragraph });
        }

        BuiltPage {
            nodes: self.nodes,
            lines: self.lines.finish(),
        }
    }
}

/// Build the flow of one walked page following a semantic grouping.
pub fn build_page(
    walked: &WalkedPage,
    grouping: &[SemanticNode],
    shadows: ShadowHyperlinks,
    settings: &FlowSettings,
    ctx: &mut BuildContext,
) -> BuiltPage {
    let mut builder = FlowModelBuilder::new(ctx, settings.clone(), shadows);
    for node in grouping {
        feed(&mut builder, walked, node);
    }
    builder.finish_mapping()
}

fn feed(builder: &mut FlowModelBuilder<'_>, walked: &WalkedPage, node: &SemanticNode) {
    match node {
        SemanticNode::Container { element, children } => {
            builder.add_start_element(element.clone());
            for child in children {
                feed(builder, walked, child);
            }
            builder.add_end_node();
        }
        SemanticNode::Leaf { index, range } => {
            let Some(leaf) = walked.leaves.get(*index) else {
                debug_assert!(false, "semantic leaf {} out of range", index);
                return;
            };
            let leaf = match (leaf, range) {
                (SomElement::Text(run), Some((start, end))) => SomElement::Text(run.slice(*start, *end)),
                (leaf, _) => leaf.clone(),
            };
            builder.add_element(leaf);
        }
    }
}
