//! Integration tests for Store dispatch ordering and effect feedback.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use persona_core::{Tagged, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use persona_runtime::Store;
use persona_testing::EventRecorder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum DoorAction {
    Open,
    Close,
    /// Opens, then closes again once the spawned future completes
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DoorEventKind {
    Opened,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
enum DoorEvent {
    Opened { times: u32 },
    Closed,
}

impl Tagged for DoorEvent {
    type Tag = DoorEventKind;

    fn tag(&self) -> DoorEventKind {
        match self {
            DoorEvent::Opened { .. } => DoorEventKind::Opened,
            DoorEvent::Closed => DoorEventKind::Closed,
        }
    }
}

#[derive(Debug, Default)]
struct DoorState {
    open: bool,
    times_opened: u32,
}

struct DoorReducer;

impl Reducer for DoorReducer {
    type State = DoorState;
    type Action = DoorAction;
    type Event = DoorEvent;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action, Self::Event>; 4]> {
        match action {
            DoorAction::Open => {
                state.open = true;
                state.times_opened += 1;
                smallvec![Effect::Emit(DoorEvent::Opened {
                    times: state.times_opened
                })]
            }
            DoorAction::Close => {
                state.open = false;
                smallvec![Effect::Emit(DoorEvent::Closed)]
            }
            DoorAction::Bounce => {
                state.open = true;
                state.times_opened += 1;
                smallvec![
                    Effect::Emit(DoorEvent::Opened {
                        times: state.times_opened
                    }),
                    Effect::future(async { Some(DoorAction::Close) }),
                ]
            }
        }
    }
}

type DoorStore = Store<DoorState, DoorAction, (), DoorReducer>;

fn door() -> DoorStore {
    Store::new(DoorState::default(), DoorReducer, ())
}

const ALL: [DoorEventKind; 2] = [DoorEventKind::Opened, DoorEventKind::Closed];

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn emit_is_delivered_before_send_returns() {
    let store = door();
    let recorder = EventRecorder::attach(store.events(), ALL);

    store.send(DoorAction::Open);

    assert_eq!(recorder.events(), vec![DoorEvent::Opened { times: 1 }]);
    assert!(store.state(|s| s.open));
}

#[tokio::test]
async fn handlers_observe_the_mutation_they_are_told_about() {
    let store = door();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let reader = store.clone();
    let sink = Arc::clone(&observed);
    let _subscription = store.events().subscribe(DoorEventKind::Opened, move |_| {
        sink.lock().unwrap().push(reader.state(|s| (s.open, s.times_opened)));
    });

    store.send(DoorAction::Open);
    store.send(DoorAction::Close);
    store.send(DoorAction::Open);

    assert_eq!(*observed.lock().unwrap(), vec![(true, 1), (true, 2)]);
}

#[tokio::test]
async fn future_effect_feeds_its_action_back() {
    let store = door();
    let recorder = EventRecorder::attach(store.events(), ALL);

    store.send(DoorAction::Bounce);
    assert!(store.state(|s| s.open));
    assert_eq!(store.pending_effects(), 1);

    store.settled().await;

    assert!(!store.state(|s| s.open));
    assert_eq!(store.pending_effects(), 0);
    assert_eq!(
        recorder.events(),
        vec![DoorEvent::Opened { times: 1 }, DoorEvent::Closed]
    );
}

#[tokio::test]
async fn send_from_a_handler_is_queued_until_the_current_dispatch_finishes() {
    let store = door();
    let recorder = EventRecorder::attach(store.events(), ALL);
    let order = Arc::new(Mutex::new(Vec::new()));

    // Registered before the second Opened handler: it sends Close while the
    // Open dispatch is still delivering.
    let sender = store.clone();
    let first_order = Arc::clone(&order);
    let _first = store.events().subscribe(DoorEventKind::Opened, move |_| {
        first_order.lock().unwrap().push("first");
        sender.send(DoorAction::Close);
        first_order.lock().unwrap().push("first-returned");
    });

    let second_order = Arc::clone(&order);
    let reader = store.clone();
    let _second = store.events().subscribe(DoorEventKind::Opened, move |_| {
        // The queued Close has not been applied yet.
        assert!(reader.state(|s| s.open));
        second_order.lock().unwrap().push("second");
    });

    store.send(DoorAction::Open);

    assert_eq!(
        *order.lock().unwrap(),
        vec!["first", "first-returned", "second"]
    );
    assert_eq!(
        recorder.events(),
        vec![DoorEvent::Opened { times: 1 }, DoorEvent::Closed]
    );
    assert!(!store.state(|s| s.open));
}

#[tokio::test]
async fn settled_without_effects_returns_immediately() {
    let store = door();
    store.send(DoorAction::Open);
    store.settled().await;
    assert_eq!(store.state(|s| s.times_opened), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn settled_waits_for_feedback_queued_behind_a_busy_dispatch() {
    let store = door();
    let busy = Arc::new(AtomicBool::new(false));

    // The first Opened queues a second Open; its handler keeps the dispatch
    // loop busy while the Bounce future completes on another worker.
    let sender = store.clone();
    let flag = Arc::clone(&busy);
    let _subscription = store.events().subscribe(DoorEventKind::Opened, move |event| {
        match event {
            DoorEvent::Opened { times: 1 } => sender.send(DoorAction::Open),
            DoorEvent::Opened { times: 2 } => {
                flag.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
            },
            _ => {},
        }
    });

    let dispatcher = store.clone();
    let dispatch = tokio::task::spawn_blocking(move || dispatcher.send(DoorAction::Bounce));

    while !busy.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    // Close is now queued behind the sleeping handler.
    tokio::time::sleep(Duration::from_millis(50)).await;

    store.settled().await;
    assert!(!store.state(|s| s.open));
    assert_eq!(store.state(|s| s.times_opened), 2);
    assert_eq!(store.pending_effects(), 0);

    dispatch.await.unwrap();
}
