//! # Persona Core
//!
//! Core traits and types for the Persona authentication coordinator.
//!
//! This crate provides the fundamental abstractions the coordinator is built
//! from: a state machine expressed as a Reducer, effect descriptions returned
//! by that reducer, and a synchronous typed event channel for fan-out to
//! application code.
//!
//! ## Core Concepts
//!
//! - **State**: The data a feature owns (for Persona, the current session)
//! - **Action**: All possible inputs (provider callbacks, backend results)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (emit an event, run a future)
//! - **Environment**: Injected collaborators (backend, audience)
//!
//! ## Example
//!
//! ```ignore
//! use persona_core::*;
//!
//! impl Reducer for LampReducer {
//!     type State = LampState;
//!     type Action = LampAction;
//!     type Event = LampEvent;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut LampState,
//!         action: LampAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<LampAction, LampEvent>; 4]> {
//!         state.on = !state.on;
//!         smallvec![Effect::Emit(LampEvent::Toggled(state.on))]
//!     }
//! }
//! ```

pub use smallvec::{SmallVec, smallvec};

pub mod event_channel;

pub use event_channel::{EventChannel, Subscription, Tagged};

/// Reducer module - The core trait for state machine logic
///
/// Reducers are functions `(State, Action, Environment) → (State, Effects)`.
/// They mutate state in place and describe, but never perform, side effects.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Event`: The notifications this reducer asks the runtime to publish
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The event type published to subscribers
        type Event;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// The state is mutated before any returned effect runs, so an
        /// `Effect::Emit` always describes a mutation that has already
        /// happened.
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime, in order
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action, Self::Event>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers and executed by the Store
/// runtime. They are not executed by the reducer itself.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future produced by an [`Effect::Future`].
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that futures can produce (feedback loop)
    /// - `Event`: The event type published on the runtime's event channel
    pub enum Effect<Action, Event> {
        /// No-op effect
        None,

        /// Publish an event to every current subscriber of its kind.
        ///
        /// The runtime fires it synchronously, on the same turn as the state
        /// mutation that produced it.
        Emit(Event),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(EffectFuture<Action>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action, Event> std::fmt::Debug for Effect<Action, Event>
    where
        Event: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Emit(event) => f.debug_tuple("Effect::Emit").field(event).finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action, Event> Effect<Action, Event> {
        /// Wrap an async computation into an [`Effect::Future`].
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Returns the event if this is an [`Effect::Emit`].
        #[must_use]
        pub const fn as_event(&self) -> Option<&Event> {
            match self {
                Effect::Emit(event) => Some(event),
                Effect::None | Effect::Future(_) => None,
            }
        }
    }
}
