//! Reactive shape store.
//!
//! # Responsibility
//! - Own the canonical shape collection and the id counter.
//! - Persist the full record after every state change.
//! - Replay the full state to every observer after every state change.
//!
//! # Invariants
//! - Only `create`/`remove`/`recolor` (directly or via `defer`) change state.
//! - A call that changes nothing writes nothing and notifies nobody.
//! - Order is always mutate, persist, then notify in subscription order.
//! - Mutations never run inside a fan-out; they are rejected or deferred.
//! - Storage and decode failures are logged and absorbed, never surfaced.

mod observers;

pub use observers::Observer;

use crate::color::{ColorSource, RandomHsl};
use crate::model::id_alloc::IdAllocator;
use crate::model::shape::{InvalidKind, Shape, ShapeId, ShapeKind};
use crate::model::snapshot::{ShapeCounts, StateSnapshot};
use crate::persist::{decode_record, encode_record, LoadedState, PersistenceAdapter};
use log::{debug, info, warn};
use observers::{ObserverId, ObserverRegistry};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to store callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidKind(InvalidKind),
    /// A mutation was called from inside an observer callback.
    Reentrant { operation: &'static str },
    /// Every id up to `MAX_SHAPE_ID` has already been issued.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKind(err) => write!(f, "{err}"),
            Self::Reentrant { operation } => write!(
                f,
                "`{operation}` called during observer notification; use Store::defer"
            ),
            Self::IdsExhausted => write!(f, "no shape ids left to issue"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKind(err) => Some(err),
            Self::Reentrant { .. } | Self::IdsExhausted => None,
        }
    }
}

impl From<InvalidKind> for StoreError {
    fn from(value: InvalidKind) -> Self {
        Self::InvalidKind(value)
    }
}

/// Mutation queued through `Store::defer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create(ShapeKind),
    Remove(ShapeId),
    Recolor(ShapeKind),
}

struct StoreState {
    shapes: Vec<Shape>,
    ids: IdAllocator,
    colors: Box<dyn ColorSource>,
    storage: Box<dyn PersistenceAdapter>,
}

struct StoreInner {
    state: RefCell<StoreState>,
    observers: RefCell<ObserverRegistry>,
    fan_out_depth: Cell<usize>,
    draining: Cell<bool>,
    deferred: RefCell<VecDeque<Mutation>>,
}

/// Shared handle to one store instance.
///
/// Cloning is cheap and every clone addresses the same state; build one at
/// startup and pass it to each consumer.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// Opens a store over `storage` with random HSL colors.
    pub fn open(storage: impl PersistenceAdapter + 'static) -> Self {
        Self::with_colors(storage, RandomHsl::new())
    }

    /// Opens a store reading its initial state from `storage`.
    ///
    /// Never fails: unreadable or malformed records start an empty board.
    pub fn with_colors(
        storage: impl PersistenceAdapter + 'static,
        colors: impl ColorSource + 'static,
    ) -> Self {
        let loaded = load_initial(&storage);
        let ids = IdAllocator::seeded(&loaded.shapes, loaded.next_id);
        info!(
            "event=store_open module=store status=ok shapes={} skipped={} next_id={}",
            loaded.shapes.len(),
            loaded.skipped,
            ids.peek()
        );

        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(StoreState {
                    shapes: loaded.shapes,
                    ids,
                    colors: Box::new(colors),
                    storage: Box::new(storage),
                }),
                observers: RefCell::new(ObserverRegistry::default()),
                fan_out_depth: Cell::new(0),
                draining: Cell::new(false),
                deferred: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Adds a shape with a fresh color and returns its id.
    ///
    /// Fails with `IdsExhausted`, changing nothing, once no id is left.
    pub fn create(&self, kind: ShapeKind) -> StoreResult<ShapeId> {
        self.ensure_idle("create")?;
        let created = self.apply_create(kind);
        self.drain_deferred();
        created
    }

    /// Removes a shape. Returns `false`, with no side effects, if it is absent.
    pub fn remove(&self, id: ShapeId) -> StoreResult<bool> {
        self.ensure_idle("remove")?;
        let removed = self.apply_remove(id);
        self.drain_deferred();
        Ok(removed)
    }

    /// Gives every shape of `kind` a fresh color.
    ///
    /// Returns `false`, with no side effects, if no shape has that kind.
    pub fn recolor(&self, kind: ShapeKind) -> StoreResult<bool> {
        self.ensure_idle("recolor")?;
        let changed = self.apply_recolor(kind);
        self.drain_deferred();
        Ok(changed)
    }

    /// Queues a mutation for after the current fan-out.
    ///
    /// Runs it immediately when no notification is in progress. This is the
    /// only way an observer may change state.
    pub fn defer(&self, mutation: Mutation) {
        debug!("event=store_defer module=store status=queued mutation={mutation:?}");
        self.inner.deferred.borrow_mut().push_back(mutation);
        self.drain_deferred();
    }

    /// Registers `observer` and calls it once with the current state.
    pub fn subscribe(
        &self,
        observer: impl FnMut(&StateSnapshot, &ShapeCounts) + 'static,
    ) -> Subscription {
        let (id, shared) = self.inner.observers.borrow_mut().insert(Box::new(observer));
        let snapshot = self.snapshot();
        let counts = self.counts();
        {
            let _fan_out = FanOut::enter(&self.inner.fan_out_depth);
            let mut callback = shared.borrow_mut();
            (*callback)(&snapshot, &counts);
        }
        self.drain_deferred();

        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Fresh copy of the current collection.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(&self.inner.state.borrow().shapes)
    }

    /// Per-kind counts recomputed from the current collection.
    pub fn counts(&self) -> ShapeCounts {
        ShapeCounts::tally(&self.inner.state.borrow().shapes)
    }

    /// Id the next `create` will issue.
    pub fn next_id(&self) -> ShapeId {
        self.inner.state.borrow().ids.peek()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Whether an observer fan-out is running right now.
    pub fn is_notifying(&self) -> bool {
        self.inner.fan_out_depth.get() > 0
    }

    fn ensure_idle(&self, operation: &'static str) -> StoreResult<()> {
        if self.is_notifying() {
            warn!(
                "event=store_mutate module=store status=rejected reason=reentrant op={operation}"
            );
            return Err(StoreError::Reentrant { operation });
        }
        Ok(())
    }

    fn apply(&self, mutation: Mutation) {
        match mutation {
            Mutation::Create(kind) => {
                let _ = self.apply_create(kind);
            }
            Mutation::Remove(id) => {
                self.apply_remove(id);
            }
            Mutation::Recolor(kind) => {
                self.apply_recolor(kind);
            }
        }
    }

    fn apply_create(&self, kind: ShapeKind) -> StoreResult<ShapeId> {
        let id = {
            let mut state = self.inner.state.borrow_mut();
            let Some(id) = state.ids.next() else {
                warn!("event=shape_create module=store status=rejected reason=ids_exhausted");
                return Err(StoreError::IdsExhausted);
            };
            let color = state.colors.next_color();
            state.shapes.push(Shape::new(id, kind, color));
            id
        };
        debug!("event=shape_create module=store status=ok id={id} kind={kind}");
        self.commit();
        Ok(id)
    }

    fn apply_remove(&self, id: ShapeId) -> bool {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let before = state.shapes.len();
            state.shapes.retain(|shape| shape.id != id);
            state.shapes.len() != before
        };
        if !removed {
            debug!("event=shape_remove module=store status=noop id={id}");
            return false;
        }
        debug!("event=shape_remove module=store status=ok id={id}");
        self.commit();
        true
    }

    fn apply_recolor(&self, kind: ShapeKind) -> bool {
        let matched = {
            let mut state = self.inner.state.borrow_mut();
            let StoreState { shapes, colors, .. } = &mut *state;
            let mut matched = 0usize;
            for shape in shapes.iter_mut().filter(|shape| shape.kind == kind) {
                shape.color = colors.next_color();
                matched += 1;
            }
            matched
        };
        if matched == 0 {
            debug!("event=shape_recolor module=store status=noop kind={kind}");
            return false;
        }
        debug!("event=shape_recolor module=store status=ok kind={kind} matched={matched}");
        self.commit();
        true
    }

    fn commit(&self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        let state = self.inner.state.borrow();
        let bytes = match encode_record(&state.shapes, state.ids.peek()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "event=state_save module=persist status=error error_code=encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = state.storage.save(&bytes) {
            warn!(
                "event=state_save module=persist status=error error_code=save_failed error={err}"
            );
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let counts = self.counts();
        let _fan_out = FanOut::enter(&self.inner.fan_out_depth);
        let handles = self.inner.observers.borrow().handles();
        for (id, observer) in handles {
            if !self.is_subscribed(id) {
                continue;
            }
            let mut callback = observer.borrow_mut();
            (*callback)(&snapshot, &counts);
        }
    }

    fn drain_deferred(&self) {
        if self.is_notifying() || self.inner.draining.get() {
            return;
        }
        let _draining = Draining::enter(&self.inner.draining);
        loop {
            let next = self.inner.deferred.borrow_mut().pop_front();
            let Some(mutation) = next else {
                break;
            };
            self.apply(mutation);
        }
    }

    fn is_subscribed(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow().contains(id)
    }
}

/// Handle returned by `Store::subscribe`.
///
/// Dropping it keeps the observer registered; call `unsubscribe` to stop.
pub struct Subscription {
    store: Weak<StoreInner>,
    id: ObserverId,
}

impl Subscription {
    /// Deregisters the observer. Extra calls are no-ops.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            if inner.observers.borrow_mut().remove(self.id) {
                debug!("event=store_unsubscribe module=store status=ok");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.store
            .upgrade()
            .is_some_and(|inner| inner.observers.borrow().contains(self.id))
    }
}

/// Marks a fan-out in progress; restores the depth even if an observer panics.
struct FanOut<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> FanOut<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for FanOut<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

struct Draining<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> Draining<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for Draining<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

fn load_initial(storage: &dyn PersistenceAdapter) -> LoadedState {
    let bytes = match storage.load() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return LoadedState::default(),
        Err(err) => {
            warn!(
                "event=state_load module=persist status=error error_code=load_failed error={err}"
            );
            return LoadedState::default();
        }
    };
    match decode_record(&bytes) {
        Ok(loaded) => loaded,
        Err(err) => {
            warn!(
                "event=state_load module=persist status=error error_code=decode_failed error={err}"
            );
            LoadedState::default()
        }
    }
}
