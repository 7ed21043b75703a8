//! Read-only views handed to observers.

use crate::model::shape::{Shape, ShapeId, ShapeKind};
use std::sync::Arc;

/// Immutable point-in-time copy of the shape collection.
///
/// Backed by `Arc<[Shape]>`, so clones are cheap and a retained snapshot can
/// never observe later store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    shapes: Arc<[Shape]>,
}

impl StateSnapshot {
    pub(crate) fn capture(shapes: &[Shape]) -> Self {
        Self {
            shapes: Arc::from(shapes.to_vec()),
        }
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.iter().map(|shape| shape.id)
    }
}

impl From<Vec<Shape>> for StateSnapshot {
    fn from(shapes: Vec<Shape>) -> Self {
        Self {
            shapes: Arc::from(shapes),
        }
    }
}

/// Per-kind shape counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeCounts {
    pub squares: usize,
    pub circles: usize,
}

impl ShapeCounts {
    /// Recounts from scratch; there are no incremental counters to drift.
    pub fn tally(shapes: &[Shape]) -> Self {
        shapes.iter().fold(Self::default(), |mut counts, shape| {
            match shape.kind {
                ShapeKind::Square => counts.squares += 1,
                ShapeKind::Circle => counts.circles += 1,
            }
            counts
        })
    }

    pub fn get(&self, kind: ShapeKind) -> usize {
        match kind {
            ShapeKind::Square => self.squares,
            ShapeKind::Circle => self.circles,
        }
    }

    pub fn total(&self) -> usize {
        self.squares + self.circles
    }
}

#[cfg(test)]
mod tests {
    use super::{ShapeCounts, StateSnapshot};
    use crate::model::shape::{Color, Shape, ShapeKind};

    #[test]
    fn tally_counts_each_kind() {
        let shapes = vec![
            Shape::new(1, ShapeKind::Square, Color::default()),
            Shape::new(2, ShapeKind::Circle, Color::default()),
            Shape::new(3, ShapeKind::Square, Color::default()),
        ];
        let counts = ShapeCounts::tally(&shapes);
        assert_eq!(counts.get(ShapeKind::Square), 2);
        assert_eq!(counts.get(ShapeKind::Circle), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn snapshot_is_detached_from_source() {
        let mut shapes = vec![Shape::new(1, ShapeKind::Square, Color::new("red"))];
        let snapshot = StateSnapshot::capture(&shapes);
        shapes[0].color = Color::new("blue");
        shapes.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(1).unwrap().color, Color::new("red"));
    }
}
