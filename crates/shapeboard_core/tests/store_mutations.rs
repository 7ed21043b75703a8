use shapeboard_core::{
    Color, MemoryStorage, ShapeCounts, ShapeKind, StateSnapshot, Store, StoreError,
};
use std::cell::RefCell;
use std::rc::Rc;

fn sequential_colors() -> impl FnMut() -> Color {
    let mut n = 0;
    move || {
        n += 1;
        Color::new(format!("color-{n}"))
    }
}

fn open_store() -> (Store, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = Store::with_colors(storage.clone(), sequential_colors());
    (store, storage)
}

type Calls = Rc<RefCell<Vec<(StateSnapshot, ShapeCounts)>>>;

fn record_calls(store: &Store) -> Calls {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let _subscription = store.subscribe(move |snapshot, counts| {
        sink.borrow_mut().push((snapshot.clone(), *counts));
    });
    calls
}

#[test]
fn create_issues_ascending_ids_and_counts_per_kind() {
    let (store, _) = open_store();

    let first = store.create(ShapeKind::Square).unwrap();
    let second = store.create(ShapeKind::Circle).unwrap();
    let third = store.create(ShapeKind::Square).unwrap();

    assert_eq!((first, second, third), (1, 2, 3));
    assert_eq!(
        store.counts(),
        ShapeCounts {
            squares: 2,
            circles: 1
        }
    );
}

#[test]
fn create_appends_persists_and_notifies_once() {
    let (store, storage) = open_store();
    let calls = record_calls(&store);

    let id = store.create(ShapeKind::Circle).unwrap();

    assert_eq!(storage.write_count(), 1);
    let calls = calls.borrow();
    assert_eq!(calls.len(), 2);
    let (snapshot, counts) = &calls[1];
    assert_eq!(snapshot.get(id).unwrap().kind, ShapeKind::Circle);
    assert_eq!(snapshot.get(id).unwrap().color, Color::new("color-1"));
    assert_eq!(counts.circles, 1);
}

#[test]
fn unknown_kind_is_rejected_before_reaching_the_store() {
    let (store, storage) = open_store();
    let calls = record_calls(&store);

    let result: Result<_, StoreError> = "triangle"
        .parse::<ShapeKind>()
        .map_err(StoreError::from)
        .and_then(|kind| store.create(kind));

    let err = result.unwrap_err();
    assert!(matches!(err, StoreError::InvalidKind(_)));
    assert!(err.to_string().contains("triangle"));
    assert!(store.snapshot().is_empty());
    assert_eq!(storage.write_count(), 0);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn remove_missing_id_on_empty_store_is_a_true_noop() {
    let (store, storage) = open_store();
    let calls = record_calls(&store);

    assert!(!store.remove(99).unwrap());

    assert!(store.snapshot().is_empty());
    assert_eq!(storage.write_count(), 0);
    assert_eq!(storage.bytes(), None);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn remove_existing_id_persists_and_notifies() {
    let (store, storage) = open_store();
    let keep = store.create(ShapeKind::Square).unwrap();
    let gone = store.create(ShapeKind::Circle).unwrap();
    let calls = record_calls(&store);

    assert!(store.remove(gone).unwrap());
    assert!(!store.remove(gone).unwrap());

    assert_eq!(storage.write_count(), 3);
    assert_eq!(calls.borrow().len(), 2);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec![keep]);
}

#[test]
fn ids_are_never_reused_after_remove() {
    let (store, _) = open_store();
    let first = store.create(ShapeKind::Square).unwrap();
    let second = store.create(ShapeKind::Square).unwrap();
    store.remove(second).unwrap();
    store.remove(first).unwrap();

    assert_eq!(store.create(ShapeKind::Circle).unwrap(), 3);
}

#[test]
fn recolor_without_matches_returns_false_silently() {
    let (store, storage) = open_store();
    store.create(ShapeKind::Square).unwrap();
    let calls = record_calls(&store);
    let writes = storage.write_count();

    assert!(!store.recolor(ShapeKind::Circle).unwrap());

    assert_eq!(storage.write_count(), writes);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn recolor_changes_only_matching_shapes() {
    let (store, storage) = open_store();
    let square_a = store.create(ShapeKind::Square).unwrap();
    let circle = store.create(ShapeKind::Circle).unwrap();
    let square_b = store.create(ShapeKind::Square).unwrap();
    let before = store.snapshot();
    let calls = record_calls(&store);

    assert!(store.recolor(ShapeKind::Square).unwrap());

    let after = store.snapshot();
    for id in [square_a, square_b] {
        assert_ne!(after.get(id).unwrap().color, before.get(id).unwrap().color);
    }
    assert_eq!(after.get(circle).unwrap().color, before.get(circle).unwrap().color);
    assert_eq!(storage.write_count(), 4);
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn subscribe_replays_current_state_immediately_once() {
    let (store, _) = open_store();
    store.create(ShapeKind::Square).unwrap();
    store.create(ShapeKind::Circle).unwrap();

    let calls = record_calls(&store);

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.len(), 2);
    assert_eq!(calls[0].1.total(), 2);
}

#[test]
fn observers_run_in_subscription_order() {
    let (store, _) = open_store();
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut subscriptions = Vec::new();
    for name in ["a", "b", "c"] {
        let log = Rc::clone(&order);
        subscriptions.push(store.subscribe(move |_, _| log.borrow_mut().push(name)));
    }
    order.borrow_mut().clear();

    store.create(ShapeKind::Square).unwrap();

    assert_eq!(order.borrow().as_slice(), &["a", "b", "c"]);
}

#[test]
fn unsubscribe_is_idempotent() {
    let (store, _) = open_store();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let subscription = store.subscribe(move |_, _| *counter.borrow_mut() += 1);
    assert!(subscription.is_active());

    subscription.unsubscribe();
    subscription.unsubscribe();
    store.create(ShapeKind::Square).unwrap();

    assert!(!subscription.is_active());
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn unsubscribe_after_store_dropped_is_harmless() {
    let (store, _) = open_store();
    let subscription = store.subscribe(|_, _| {});
    drop(store);

    subscription.unsubscribe();
    assert!(!subscription.is_active());
}

#[test]
fn retained_snapshots_are_isolated_from_later_mutations() {
    let (store, _) = open_store();
    let id = store.create(ShapeKind::Square).unwrap();
    let retained = store.snapshot();

    store.recolor(ShapeKind::Square).unwrap();
    store.remove(id).unwrap();

    assert_eq!(retained.len(), 1);
    assert_eq!(retained.get(id).unwrap().color, Color::new("color-1"));
    assert!(store.snapshot().is_empty());
}

#[test]
fn save_failures_never_block_mutation_or_notification() {
    let (store, storage) = open_store();
    let calls = record_calls(&store);
    storage.set_fail_saves(true);

    let id = store.create(ShapeKind::Circle).unwrap();

    assert_eq!(store.snapshot().get(id).map(|shape| shape.kind), Some(ShapeKind::Circle));
    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn persisted_record_is_rewritten_in_full() {
    let (store, storage) = open_store();
    store.create(ShapeKind::Square).unwrap();
    store.create(ShapeKind::Circle).unwrap();
    store.remove(1).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&storage.bytes().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "shapes": [{"id": 2, "type": "circle", "color": "color-2"}],
            "nextId": 3
        })
    );
}
