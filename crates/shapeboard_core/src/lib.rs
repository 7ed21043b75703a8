//! Core of the shape board: a reactive store with persisted state and an
//! identity-keyed view reconciler.
//! This crate is the single source of truth for board invariants.

pub mod color;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod store;
pub mod view;

pub use color::{ColorSource, RandomHsl};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::id_alloc::IdAllocator;
pub use model::shape::{Color, InvalidKind, Shape, ShapeId, ShapeKind, DEFAULT_COLOR, MAX_SHAPE_ID};
pub use model::snapshot::{ShapeCounts, StateSnapshot};
pub use persist::{
    MemoryStorage, PersistError, PersistResult, PersistenceAdapter, SqliteStorage,
    DEFAULT_STORAGE_KEY,
};
pub use store::{Mutation, Observer, Store, StoreError, StoreResult, Subscription};
pub use view::{MemoryView, NodeRef, ReconcileStats, Reconciler, ViewBackend};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
