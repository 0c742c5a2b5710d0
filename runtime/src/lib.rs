//! # Persona Runtime
//!
//! Runtime implementation for the Persona authentication coordinator.
//!
//! This crate provides the Store runtime that coordinates reducer execution,
//! event publication and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer and executes its effects
//! - **Dispatch loop**: Processes one action at a time, in arrival order
//! - **Effect executor**: Fires `Emit` effects synchronously and spawns
//!   `Future` effects, feeding their actions back into the loop
//!
//! ## Example
//!
//! ```ignore
//! use persona_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Subscribe to events
//! let subscription = store.events().subscribe(MyEventKind::Changed, |event| {
//!     tracing::info!(?event, "changed");
//! });
//!
//! // Send an action
//! store.send(Action::DoSomething);
//!
//! // Wait for spawned effects and read state
//! store.settled().await;
//! let value = store.state(|s| s.some_field);
//! ```

use persona_core::{EventChannel, Tagged, effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::Notify;

/// Counts effects that are still running and wakes waiters when none are left.
#[derive(Debug, Default)]
struct EffectTracker {
    pending: AtomicUsize,
    idle: Notify,
}

impl EffectTracker {
    fn start(self: &Arc<Self>) -> PendingGuard {
        self.pending.fetch_add(1, Ordering::SeqCst);
        PendingGuard(Arc::clone(self))
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the pending effect count on drop, even if the effect panicked.
///
/// A future's guard travels with the action it feeds back and is dropped only
/// once that action has been dispatched.
struct PendingGuard(Arc<EffectTracker>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.0.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Clears the dispatching flag on drop, so a panicking handler does not wedge
/// the dispatch loop.
struct DispatchFlag<'a>(&'a AtomicBool);

impl Drop for DispatchFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An action waiting for the dispatch loop.
struct Queued<A> {
    action: A,
    effect: Option<PendingGuard>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        AtomicBool, DispatchFlag, Effect, EffectTracker, EventChannel, Ordering, PendingGuard,
        PoisonError, Queued, Reducer, RwLock, Tagged, VecDeque, lock,
    };
    use std::sync::{Arc, Mutex};

    struct Inner<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        R::Event: Tagged,
    {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        events: EventChannel<R::Event>,
        queue: Mutex<VecDeque<Queued<A>>>,
        dispatching: AtomicBool,
        effects: Arc<EffectTracker>,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind a lock, read through [`Store::state`])
    /// 2. Reducer (state machine logic)
    /// 3. Environment (injected dependencies)
    /// 4. An [`EventChannel`] that `Effect::Emit` publishes to
    /// 5. Effect execution (with feedback loop)
    ///
    /// Actions are processed strictly one at a time. An action sent while
    /// another is being dispatched (from an event handler, or from a completed
    /// effect) is queued and processed once the current one has finished,
    /// including the firing of all its events.
    ///
    /// Cloning a Store is cheap and yields a handle to the same runtime.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        R::Event: Tagged,
    {
        inner: Arc<Inner<S, A, E, R>>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        R::Event: Tagged,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        R::Event: Tagged + Send + 'static,
        A: Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// # Arguments
        ///
        /// - `initial_state`: The starting state for the store
        /// - `reducer`: The reducer implementation
        /// - `environment`: Injected dependencies
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                inner: Arc::new(Inner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment,
                    events: EventChannel::new(),
                    queue: Mutex::new(VecDeque::new()),
                    dispatching: AtomicBool::new(false),
                    effects: Arc::new(EffectTracker::default()),
                }),
            }
        }

        /// Send an action to the store
        ///
        /// If no other action is being dispatched, the action is reduced and
        /// its effects executed before this returns: events are fired to
        /// their handlers, futures are spawned. Otherwise it is queued behind
        /// the actions already waiting.
        ///
        /// `Effect::Future` is spawned with [`tokio::spawn`], so a future
        /// effect must be produced from within a Tokio runtime.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&self, action: A) {
            self.enqueue(action, None);
        }

        fn enqueue(&self, action: A, effect: Option<PendingGuard>) {
            lock(&self.inner.queue).push_back(Queued { action, effect });
            self.drain();
        }

        /// Process queued actions until the queue is empty.
        ///
        /// Only one caller drains at a time; any other caller returns right
        /// away, leaving its action to the active drainer.
        fn drain(&self) {
            loop {
                if self.inner.dispatching.swap(true, Ordering::AcqRel) {
                    tracing::trace!("Dispatch in progress, action queued");
                    return;
                }

                {
                    let _flag = DispatchFlag(&self.inner.dispatching);
                    loop {
                        let next = lock(&self.inner.queue).pop_front();
                        let Some(Queued { action, effect }) = next else {
                            break;
                        };
                        self.dispatch(action);
                        drop(effect);
                    }
                }

                // An action may have been queued between the last pop and the
                // release of the flag.
                if lock(&self.inner.queue).is_empty() {
                    return;
                }
            }
        }

        fn dispatch(&self, action: A) {
            tracing::debug!("Processing action");
            metrics::counter!("store.actions.total").increment(1);

            let effects = {
                let mut state = self
                    .inner
                    .state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();
                self.inner
                    .reducer
                    .reduce(&mut state, action, &self.inner.environment)
            };

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect);
            }
        }

        fn execute_effect(&self, effect: Effect<A, R::Event>) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Emit(event) => {
                    metrics::counter!("store.effects.executed", "type" => "emit").increment(1);
                    let tag = event.tag();
                    let delivered = self.inner.events.fire(&event);
                    metrics::counter!("store.events.fired").increment(1);
                    tracing::debug!(?tag, handlers = delivered, "Fired event");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let guard = self.inner.effects.start();
                    let store = self.clone();
                    tokio::spawn(async move {
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.enqueue(action, Some(guard));
                        } else {
                            drop(guard);
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let status = store.state(|s| s.session.status());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self
                .inner
                .state
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            f(&state)
        }

        /// The channel `Effect::Emit` publishes to.
        #[must_use]
        pub fn events(&self) -> &EventChannel<R::Event> {
            &self.inner.events
        }

        /// The environment the reducer runs with.
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.inner.environment
        }

        /// Number of spawned effects that have not completed yet.
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.inner.effects.pending()
        }

        /// Wait until every spawned effect, and every effect spawned by the
        /// actions they fed back, has completed.
        ///
        /// An effect counts as pending until the action it produced has been
        /// dispatched, even when another thread's dispatch loop picks it up.
        pub async fn settled(&self) {
            self.inner.effects.settled().await;
        }
    }
}

pub use store::Store;
