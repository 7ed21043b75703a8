//! Identity-keyed reconciliation of a `ViewBackend` against store snapshots.
//!
//! # Responsibility
//! - Patch the view so each shape node maps 1:1 to a live shape.
//! - Write counter displays straight from the supplied counts.
//!
//! # Invariants
//! - A node whose shape is still live is never removed or recreated.
//! - New nodes are appended; no position is ever used as a key.
//! - The id-to-node index is derived from the view and rebuilt on every pass.

use super::{ViewBackend, SHAPE_CLASS};
use crate::model::shape::{ShapeId, ShapeKind};
use crate::model::snapshot::{ShapeCounts, StateSnapshot};
use crate::store::{Store, Subscription};
use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Node churn of one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Keeps a view in step with store snapshots.
pub struct Reconciler<V: ViewBackend> {
    view: V,
    index: HashMap<ShapeId, V::Node>,
}

impl<V: ViewBackend> Reconciler<V> {
    /// Wraps `view`, indexing whatever shape nodes it already holds.
    pub fn new(view: V) -> Self {
        let mut reconciler = Self {
            view,
            index: HashMap::new(),
        };
        reconciler.rebuild_index();
        reconciler
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Direct view access for host-side state (focus, edits).
    ///
    /// Shape nodes touched here are re-validated on the next pass.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Node currently rendering shape `id`.
    pub fn node_for(&self, id: ShapeId) -> Option<&V::Node> {
        self.index.get(&id)
    }

    /// Shape id carried by `node`, e.g. to resolve a click on the board.
    pub fn shape_id_of(&self, node: &V::Node) -> Option<ShapeId> {
        parse_shape_id(self.view.data_id(node)?.as_str())
    }

    /// Rebuilds the id-to-node index by scanning the view.
    ///
    /// The first node seen for an id wins.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for node in self.view.children() {
            if let Some(id) = self.shape_id_of(&node) {
                self.index.entry(id).or_insert(node);
            }
        }
    }

    /// Patches the view to match `snapshot` and shows `counts`.
    pub fn reconcile(&mut self, snapshot: &StateSnapshot, counts: &ShapeCounts) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let live: HashSet<ShapeId> = snapshot.ids().collect();

        self.index.clear();
        for node in self.view.children() {
            match self.shape_id_of(&node) {
                Some(id) if live.contains(&id) && !self.index.contains_key(&id) => {
                    self.index.insert(id, node);
                }
                _ => {
                    self.view.remove(&node);
                    stats.removed += 1;
                }
            }
        }

        for shape in snapshot.shapes() {
            let node = match self.index.get(&shape.id) {
                Some(node) => {
                    stats.updated += 1;
                    node.clone()
                }
                None => {
                    let node = self.view.create_node(&shape.id.to_string());
                    self.view.append(&node);
                    self.index.insert(shape.id, node.clone());
                    stats.created += 1;
                    node
                }
            };
            self.view.toggle_class(&node, SHAPE_CLASS, true);
            for kind in ShapeKind::ALL {
                self.view.toggle_class(&node, kind.as_str(), kind == shape.kind);
            }
            self.view.set_background(&node, shape.color.as_str());
        }

        for kind in ShapeKind::ALL {
            self.view.set_counter(kind, counts.get(kind));
        }

        debug!(
            "event=view_reconcile module=view status=ok shapes={} created={} updated={} removed={}",
            snapshot.len(),
            stats.created,
            stats.updated,
            stats.removed
        );
        stats
    }
}

impl<V: ViewBackend + 'static> Reconciler<V> {
    /// Subscribes this reconciler to `store`; the first pass runs immediately.
    pub fn attach(self, store: &Store) -> (Rc<RefCell<Self>>, Subscription) {
        let shared = Rc::new(RefCell::new(self));
        let target = Rc::clone(&shared);
        let subscription = store.subscribe(move |snapshot, counts| {
            target.borrow_mut().reconcile(snapshot, counts);
        });
        (shared, subscription)
    }
}

fn parse_shape_id(value: &str) -> Option<ShapeId> {
    value.parse::<ShapeId>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::{ReconcileStats, Reconciler};
    use crate::model::shape::{Color, Shape, ShapeKind};
    use crate::model::snapshot::{ShapeCounts, StateSnapshot};
    use crate::view::{MemoryView, ViewBackend};

    fn snapshot(shapes: &[(u64, ShapeKind, &str)]) -> (StateSnapshot, ShapeCounts) {
        let shapes: Vec<Shape> = shapes
            .iter()
            .map(|(id, kind, color)| Shape::new(*id, *kind, Color::new(*color)))
            .collect();
        (StateSnapshot::capture(&shapes), ShapeCounts::tally(&shapes))
    }

    #[test]
    fn first_pass_creates_one_node_per_shape() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (state, counts) = snapshot(&[
            (1, ShapeKind::Square, "red"),
            (2, ShapeKind::Circle, "blue"),
        ]);

        let stats = reconciler.reconcile(&state, &counts);

        assert_eq!(stats, ReconcileStats { created: 2, updated: 0, removed: 0 });
        let view = reconciler.view();
        let square = view.element(*reconciler.node_for(1).unwrap()).unwrap();
        assert!(square.has_class("shape") && square.has_class("square"));
        assert!(!square.has_class("circle"));
        assert_eq!(square.background.as_deref(), Some("red"));
        assert_eq!(view.counter(ShapeKind::Square), Some("1"));
        assert_eq!(view.counter(ShapeKind::Circle), Some("1"));
    }

    #[test]
    fn surviving_nodes_keep_identity_and_local_state() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (first, counts) = snapshot(&[
            (1, ShapeKind::Square, "red"),
            (2, ShapeKind::Circle, "blue"),
        ]);
        reconciler.reconcile(&first, &counts);
        let node = *reconciler.node_for(2).unwrap();
        reconciler.view_mut().set_local_state(node, "focused");

        let (second, counts) = snapshot(&[
            (2, ShapeKind::Circle, "green"),
            (3, ShapeKind::Square, "gray"),
        ]);
        let stats = reconciler.reconcile(&second, &counts);

        assert_eq!(stats, ReconcileStats { created: 1, updated: 1, removed: 1 });
        assert_eq!(reconciler.node_for(2), Some(&node));
        let element = reconciler.view().element(node).unwrap();
        assert_eq!(element.local_state.as_deref(), Some("focused"));
        assert_eq!(element.background.as_deref(), Some("green"));
    }

    #[test]
    fn reordered_snapshot_does_not_churn_nodes() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (forward, counts) = snapshot(&[
            (1, ShapeKind::Square, "a"),
            (2, ShapeKind::Circle, "b"),
        ]);
        reconciler.reconcile(&forward, &counts);

        let (backward, counts) = snapshot(&[
            (2, ShapeKind::Circle, "b"),
            (1, ShapeKind::Square, "a"),
        ]);
        let stats = reconciler.reconcile(&backward, &counts);

        assert_eq!(stats.created + stats.removed, 0);
    }

    #[test]
    fn empty_snapshot_clears_board_and_zeroes_counters() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (state, counts) = snapshot(&[(1, ShapeKind::Square, "a"), (2, ShapeKind::Circle, "b")]);
        reconciler.reconcile(&state, &counts);

        let (empty, counts) = snapshot(&[]);
        reconciler.reconcile(&empty, &counts);

        assert!(reconciler.view().is_empty());
        assert_eq!(reconciler.view().counter(ShapeKind::Square), Some("0"));
        assert_eq!(reconciler.view().counter(ShapeKind::Circle), Some("0"));
    }

    #[test]
    fn foreign_and_duplicate_nodes_are_removed() {
        let mut view = MemoryView::new();
        let keep = view.insert_foreign(Some("1"));
        view.insert_foreign(Some("1"));
        view.insert_foreign(None);
        view.insert_foreign(Some("abc"));
        let mut reconciler = Reconciler::new(view);
        assert_eq!(reconciler.node_for(1), Some(&keep));

        let (state, counts) = snapshot(&[(1, ShapeKind::Circle, "x")]);
        let stats = reconciler.reconcile(&state, &counts);

        assert_eq!(stats.removed, 3);
        assert_eq!(reconciler.view().children(), vec![keep]);
        assert!(reconciler.view().element(keep).unwrap().has_class("shape"));
    }

    #[test]
    fn externally_removed_node_is_recreated() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (state, counts) = snapshot(&[(1, ShapeKind::Square, "a")]);
        reconciler.reconcile(&state, &counts);
        let stale = *reconciler.node_for(1).unwrap();
        reconciler.view_mut().remove(&stale);

        let stats = reconciler.reconcile(&state, &counts);

        assert_eq!(stats.created, 1);
        assert_ne!(reconciler.node_for(1), Some(&stale));
        assert_eq!(reconciler.view().len(), 1);
    }

    #[test]
    fn shape_id_of_resolves_clicked_node() {
        let mut reconciler = Reconciler::new(MemoryView::new());
        let (state, counts) = snapshot(&[(4, ShapeKind::Square, "a"), (9, ShapeKind::Circle, "b")]);
        reconciler.reconcile(&state, &counts);

        let clicked = reconciler.view().node_at(1).unwrap();
        assert_eq!(reconciler.shape_id_of(&clicked), Some(9));
    }
}
