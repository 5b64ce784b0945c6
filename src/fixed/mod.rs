//! Reconstruction of flow text from fixed (positioned) page content.
//!
//! A page is walked into leaves, the leaves are grouped semantically, and
//! the builder turns the grouping into Start/End/Run/Object flow nodes.
//! `FixedFlowMap` then translates positions between the two worlds.

pub mod adjacency;
pub mod builder;
pub mod container;
pub mod element;
pub mod flow;
pub mod grouping;
pub mod hyperlink;
pub mod lines;
pub mod map;
pub mod node;
pub mod som;
pub mod walker;

pub use container::FixedTextContainer;
pub use element::{FixedElement, FixedPage};
pub use flow::{ElementKind, FlowNode};
pub use map::{FixedFlowMap, FlowPosition};
pub use node::{FixedNode, FixedPosition};
