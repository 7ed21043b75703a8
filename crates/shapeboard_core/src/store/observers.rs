//! Ordered observer registry.
//!
//! # Invariants
//! - Observers are kept in subscription order.
//! - Observer ids are never reused, so a stale `Subscription` can not remove
//!   an observer registered later.

use crate::model::snapshot::{ShapeCounts, StateSnapshot};
use std::cell::RefCell;
use std::rc::Rc;

/// Callback receiving the full state after every change.
pub type Observer = Box<dyn FnMut(&StateSnapshot, &ShapeCounts)>;

pub(crate) type SharedObserver = Rc<RefCell<Observer>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ObserverId(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(ObserverId, SharedObserver)>,
}

impl ObserverRegistry {
    pub(crate) fn insert(&mut self, observer: Observer) -> (ObserverId, SharedObserver) {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        let shared = Rc::new(RefCell::new(observer));
        self.entries.push((id, Rc::clone(&shared)));
        (id, shared)
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: ObserverId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Copy of the current list, so callbacks can (un)subscribe mid fan-out.
    pub(crate) fn handles(&self) -> Vec<(ObserverId, SharedObserver)> {
        self.entries
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
