//! Persona reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//!
//! Every transition mutates the session first and then returns the event
//! describing it as `Effect::Emit`, ahead of any backend call, so subscribers
//! always observe the status their event announces.

pub mod login;
pub mod logout;

use crate::actions::{KnownSession, PersonaAction};
use crate::environment::PersonaEnvironment;
use crate::events::AuthEvent;
use crate::providers::Backend;
use crate::state::{PersonaState, Session};
use persona_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;

// Re-export
pub use login::LoginReducer;
pub use logout::LogoutReducer;

/// Effects returned by the Persona reducers.
pub type PersonaEffects = SmallVec<[Effect<PersonaAction, AuthEvent>; 4]>;

/// Replace the session, logging the status change.
///
/// `next` receives the current session and may take the identity it holds.
pub(crate) fn transition<F>(state: &mut PersonaState, next: F)
where
    F: FnOnce(&mut Session) -> Session,
{
    let from = state.status();
    state.session = next(&mut state.session);
    tracing::debug!(%from, to = %state.status(), "Session transition");
}

/// Unified Persona reducer.
///
/// Handles initialization and cancellation itself and routes login and
/// logout actions to their sub-reducers.
pub struct PersonaReducer<B>
where
    B: Backend + 'static,
{
    login: LoginReducer<B>,
    logout: LogoutReducer<B>,
}

impl<B> PersonaReducer<B>
where
    B: Backend + 'static,
{
    /// Create a new unified reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            login: LoginReducer::new(),
            logout: LogoutReducer::new(),
        }
    }

    fn initialize(state: &mut PersonaState, known: KnownSession) -> PersonaEffects {
        match known {
            KnownSession::LoggedIn(user) if !user.is_empty() => {
                transition(state, |_| Session::LoggedIn { user });
            },
            KnownSession::LoggedOut => transition(state, |_| Session::LoggedOut),
            KnownSession::LoggedIn(_) | KnownSession::Unknown => {
                tracing::debug!(status = %state.status(), "No known session, waiting for provider");
            },
        }
        SmallVec::new()
    }

    fn cancel(state: &mut PersonaState) -> PersonaEffects {
        transition(state, |session| Session::Cancelled {
            previous: session.take_identity(),
        });
        smallvec![Effect::Emit(AuthEvent::Cancelled)]
    }
}

impl<B> Default for PersonaReducer<B>
where
    B: Backend + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for PersonaReducer<B>
where
    B: Backend + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonaReducer").finish_non_exhaustive()
    }
}

impl<B> Reducer for PersonaReducer<B>
where
    B: Backend + 'static,
{
    type State = PersonaState;
    type Action = PersonaAction;
    type Event = AuthEvent;
    type Environment = PersonaEnvironment<B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> PersonaEffects {
        match action {
            PersonaAction::Initialize { known } => Self::initialize(state, known),

            PersonaAction::ProviderCancelled => Self::cancel(state),

            // Login
            PersonaAction::ProviderLogin { .. }
            | PersonaAction::Verified { .. }
            | PersonaAction::VerificationFailed { .. } => self.login.reduce(state, action, env),

            // Logout
            PersonaAction::ProviderLogout
            | PersonaAction::LogoutSucceeded
            | PersonaAction::LogoutFailed { .. } => self.logout.reduce(state, action, env),
        }
    }
}
