//! Domain model for the shape board.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and the view layer.
//! - Keep id allocation and derived counts next to the data they describe.
//!
//! # Invariants
//! - Every shape is identified by a stable `ShapeId` that is never reused.
//! - Counts are always derived from the collection, never tracked separately.

pub mod id_alloc;
pub mod shape;
pub mod snapshot;
