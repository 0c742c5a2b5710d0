//! # Persona Testing
//!
//! Testing utilities and helpers for the Persona authentication coordinator.
//!
//! This crate provides:
//! - [`ReducerTest`]: a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - [`EventRecorder`]: captures every event fired on an [`EventChannel`]
//! - [`init_tracing`]: log output for tests, filtered by `RUST_LOG`
//!
//! ## Example
//!
//! ```ignore
//! use persona_testing::EventRecorder;
//!
//! #[tokio::test]
//! async fn login_flow() {
//!     let store = Store::new(state, reducer, env);
//!     let recorder = EventRecorder::attach(store.events(), ALL_KINDS);
//!
//!     store.send(Action::Start);
//!     store.settled().await;
//!
//!     assert_eq!(recorder.events(), vec![Event::Started, Event::Done]);
//! }
//! ```

use persona_core::{EventChannel, Subscription, Tagged};
use std::sync::{Arc, Mutex, PoisonError};

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Captures events fired on an [`EventChannel`], in firing order.
///
/// The recorder subscribes to every tag it is attached with and keeps a
/// clone of each delivered event.
pub struct EventRecorder<E> {
    events: Arc<Mutex<Vec<E>>>,
    subscription: Subscription,
}

impl<E> EventRecorder<E>
where
    E: Tagged + Clone + Send + 'static,
{
    /// Subscribe a recorder to `tags` on `channel`.
    #[must_use]
    pub fn attach<I>(channel: &EventChannel<E>, tags: I) -> Self
    where
        I: IntoIterator<Item = E::Tag>,
    {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscription = Subscription::combine(tags.into_iter().map(|tag| {
            let sink = Arc::clone(&events);
            channel.subscribe(tag, move |event: &E| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(event.clone());
            })
        }));
        Self {
            events,
            subscription,
        }
    }

    /// Every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<E> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the events recorded so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Stop recording. Already recorded events are kept.
    pub fn detach(&self) {
        self.subscription.release();
    }
}

/// Install a `fmt` subscriber writing through the test harness.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`. Safe to call from
/// every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Up,
        Down,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Move {
        Up(u8),
        Down,
    }

    impl Tagged for Move {
        type Tag = Kind;

        fn tag(&self) -> Kind {
            match self {
                Move::Up(_) => Kind::Up,
                Move::Down => Kind::Down,
            }
        }
    }

    #[test]
    fn records_in_firing_order() {
        init_tracing();
        let channel = EventChannel::new();
        let recorder = EventRecorder::attach(&channel, [Kind::Up, Kind::Down]);

        channel.fire(&Move::Up(1));
        channel.fire(&Move::Down);
        channel.fire(&Move::Up(2));

        assert_eq!(
            recorder.events(),
            vec![Move::Up(1), Move::Down, Move::Up(2)]
        );
    }

    #[test]
    fn only_attached_tags_are_recorded() {
        let channel = EventChannel::new();
        let recorder = EventRecorder::attach(&channel, [Kind::Down]);

        channel.fire(&Move::Up(1));
        channel.fire(&Move::Down);

        assert_eq!(recorder.events(), vec![Move::Down]);
    }

    #[test]
    fn detach_stops_recording_and_clear_forgets() {
        let channel = EventChannel::new();
        let recorder = EventRecorder::attach(&channel, [Kind::Up]);

        channel.fire(&Move::Up(1));
        recorder.detach();
        channel.fire(&Move::Up(2));
        assert_eq!(recorder.events(), vec![Move::Up(1)]);

        recorder.clear();
        assert!(recorder.events().is_empty());
        assert_eq!(channel.handler_count(Kind::Up), 0);
    }
}
