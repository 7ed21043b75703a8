//! Live board view and identity-keyed reconciliation.
//!
//! # Responsibility
//! - Define the DOM-like surface the reconciler patches (`ViewBackend`).
//! - Provide an in-memory board (`MemoryView`) for headless hosts and tests.
//!
//! # Invariants
//! - Shape nodes are keyed by the `data-id` attribute, never by position.
//! - The view tree is authoritative; any id-to-node map is a rebuildable cache.

mod memory;
pub mod reconcile;

pub use memory::{ElementData, MemoryView, NodeRef};
pub use reconcile::{ReconcileStats, Reconciler};

use crate::model::shape::ShapeKind;

/// Class carried by every shape node.
pub const SHAPE_CLASS: &str = "shape";

/// Element id of the counter display for `kind`.
pub fn counter_element_id(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Square => "cntSquares",
        ShapeKind::Circle => "cntCircles",
    }
}

/// Mutable view tree holding one container of shape nodes plus counters.
///
/// `Node` is a handle; two handles compare equal iff they address the same
/// live node.
pub trait ViewBackend {
    type Node: Clone + PartialEq;

    /// Shape container children, in visual order.
    fn children(&self) -> Vec<Self::Node>;
    /// Raw `data-id` attribute of `node`.
    fn data_id(&self, node: &Self::Node) -> Option<String>;
    /// Creates a detached node tagged with `data-id` and `SHAPE_CLASS`.
    fn create_node(&mut self, data_id: &str) -> Self::Node;
    /// Appends `node` at the end of the container.
    fn append(&mut self, node: &Self::Node);
    fn remove(&mut self, node: &Self::Node);
    fn toggle_class(&mut self, node: &Self::Node, class: &str, on: bool);
    fn set_background(&mut self, node: &Self::Node, color: &str);
    fn set_counter(&mut self, kind: ShapeKind, value: usize);
}
