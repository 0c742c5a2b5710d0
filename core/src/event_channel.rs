//! Synchronous, typed publish/subscribe channel.
//!
//! The [`EventChannel`] fans out events to in-process handlers. Handlers are
//! registered against an event *tag* (the variant of a closed event enum, see
//! [`Tagged`]) and every registration returns a [`Subscription`] that removes
//! exactly that handler when released.
//!
//! # Delivery guarantees
//!
//! - [`EventChannel::fire`] invokes every handler subscribed to the event's tag,
//!   in subscription order, before it returns.
//! - The handler list is snapshotted at fire time: handlers added during a
//!   dispatch do not see the event being dispatched, and handlers may release
//!   themselves or others while being called.
//! - Releasing a [`Subscription`] is idempotent.
//!
//! # Example
//!
//! ```
//! use persona_core::{EventChannel, Tagged};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Ping }
//!
//! struct Ping;
//! impl Tagged for Ping {
//!     type Tag = Kind;
//!     fn tag(&self) -> Kind { Kind::Ping }
//! }
//!
//! let channel = EventChannel::new();
//! let seen = Arc::new(Mutex::new(0));
//! let counter = Arc::clone(&seen);
//! let subscription = channel.subscribe(Kind::Ping, move |_: &Ping| {
//!     *counter.lock().unwrap() += 1;
//! });
//!
//! channel.fire(&Ping);
//! subscription.release();
//! subscription.release(); // no-op
//! channel.fire(&Ping);
//!
//! assert_eq!(*seen.lock().unwrap(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Events that can be routed by tag.
///
/// Implemented by closed event enums; the tag is usually a field-less mirror
/// of the enum's variants.
pub trait Tagged {
    /// The routing key for this event type.
    type Tag: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// The tag this event is delivered under.
    fn tag(&self) -> Self::Tag;
}

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;
type Release = Box<dyn FnOnce() + Send>;

struct Registry<E: Tagged> {
    next_id: u64,
    handlers: HashMap<E::Tag, Vec<(u64, Handler<E>)>>,
}

impl<E: Tagged> Registry<E> {
    fn remove(&mut self, tag: E::Tag, id: u64) {
        if let Some(handlers) = self.handlers.get_mut(&tag) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Typed publish/subscribe registry keyed by event tag.
///
/// Cloning an `EventChannel` yields another handle to the same registry.
pub struct EventChannel<E: Tagged> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> EventChannel<E>
where
    E: Tagged + 'static,
{
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for events tagged `tag`.
    ///
    /// Handlers for the same tag are called in the order they were added.
    pub fn subscribe<F>(&self, tag: E::Tag, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .handlers
                .entry(tag)
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription::from_release(Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).remove(tag, id);
            }
        }))
    }

    /// Deliver `event` to every handler currently subscribed to its tag.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&self, event: &E) -> usize {
        let snapshot: Vec<Handler<E>> = {
            let registry = lock(&self.registry);
            registry
                .handlers
                .get(&event.tag())
                .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    /// Number of handlers currently subscribed to `tag`.
    #[must_use]
    pub fn handler_count(&self, tag: E::Tag) -> usize {
        lock(&self.registry)
            .handlers
            .get(&tag)
            .map_or(0, Vec::len)
    }
}

impl<E> Default for EventChannel<E>
where
    E: Tagged + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Tagged> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: Tagged> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        let total: usize = registry.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventChannel")
            .field("handlers", &total)
            .finish()
    }
}

/// Handle returned by every handler registration.
///
/// [`Subscription::release`] removes the handler(s) it was created for. It can
/// be called any number of times; only the first call has an effect. Dropping
/// a `Subscription` does **not** release it.
pub struct Subscription {
    pending: Mutex<Vec<Release>>,
}

impl Subscription {
    fn from_release(release: Release) -> Self {
        Self {
            pending: Mutex::new(vec![release]),
        }
    }

    /// Merge several subscriptions into one handle that releases them all.
    #[must_use]
    pub fn combine<I>(subscriptions: I) -> Self
    where
        I: IntoIterator<Item = Subscription>,
    {
        let pending = subscriptions
            .into_iter()
            .flat_map(|subscription| {
                subscription
                    .pending
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner)
            })
            .collect();
        Self {
            pending: Mutex::new(pending),
        }
    }

    /// Remove the handler(s) behind this subscription.
    pub fn release(&self) {
        let pending = std::mem::take(&mut *lock(&self.pending));
        for release in pending {
            release();
        }
    }

    /// `true` once [`release`](Self::release) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        lock(&self.pending).is_empty()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish()
    }
}
