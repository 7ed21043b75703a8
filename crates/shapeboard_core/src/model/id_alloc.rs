//! Monotonic shape id allocation.
//!
//! # Invariants
//! - Every issued id is strictly greater than every id issued before it.
//! - Issued ids never exceed `MAX_SHAPE_ID`; the allocator reports exhaustion
//!   instead of wrapping.
//! - The seed is derived from persisted state, so ids of deleted shapes stay
//!   retired across restarts.

use crate::model::shape::{Shape, ShapeId, MAX_SHAPE_ID};

/// Issues strictly increasing shape ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: ShapeId,
}

impl IdAllocator {
    /// Seeds from loaded shapes and an optional persisted counter.
    ///
    /// `seed = max(persisted_next, max(id) + 1, 1)`, so a stale counter that
    /// lags behind the stored shapes is ignored. A counter above
    /// `MAX_SHAPE_ID` is treated as missing.
    pub fn seeded(shapes: &[Shape], persisted_next: Option<ShapeId>) -> Self {
        let after_max = shapes
            .iter()
            .map(|shape| shape.id.saturating_add(1))
            .max()
            .unwrap_or(1);
        let persisted = persisted_next
            .filter(|next| *next <= MAX_SHAPE_ID)
            .unwrap_or(1);
        Self {
            next: after_max.max(persisted).max(1),
        }
    }

    /// Value the next call to `next()` would return; persisted as `nextId`.
    pub fn peek(&self) -> ShapeId {
        self.next
    }

    /// Whether every id up to `MAX_SHAPE_ID` has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.next > MAX_SHAPE_ID
    }
}

impl Iterator for IdAllocator {
    type Item = ShapeId;

    /// Returns the next id and advances the counter, or `None` once the id
    /// space is used up.
    fn next(&mut self) -> Option<ShapeId> {
        if self.is_exhausted() {
            return None;
        }
        let id = self.next;
        self.next = id.checked_add(1)?;
        Some(id)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}
