//! Login reducer.
//!
//! # Flow
//!
//! 1. The provider hands over an assertion (`ProviderLogin`)
//! 2. Session becomes `Verifying`, `Verifying` is emitted
//! 3. The backend verifies the assertion against the audience
//! 4. `Verified` logs the user in and emits `Success`;
//!    `VerificationFailed` logs out and emits `Failure` with the backend's
//!    message
//!
//! A new assertion is accepted in any status, including `LoggedIn`
//! (re-authentication) and `Verifying` (the later result wins).

use super::{PersonaEffects, transition};
use crate::actions::PersonaAction;
use crate::constants::{messages, outcomes};
use crate::environment::PersonaEnvironment;
use crate::events::AuthEvent;
use crate::providers::Backend;
use crate::state::{PersonaState, Session};
use persona_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Login reducer.
///
/// Handles `ProviderLogin`, `Verified` and `VerificationFailed`.
pub struct LoginReducer<B> {
    _phantom: PhantomData<B>,
}

impl<B> LoginReducer<B> {
    /// Create a new login reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B> Default for LoginReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Reducer for LoginReducer<B>
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
            // ═══════════════════════════════════════════════════════════════
            // ProviderLogin: start verification
            // ═══════════════════════════════════════════════════════════════
            PersonaAction::ProviderLogin { assertion } => {
                if !state.status().is_quiescent() {
                    tracing::debug!(status = %state.status(), "Assertion received while a backend call is pending");
                }
                transition(state, |_| Session::Verifying);

                let backend = Arc::clone(&env.backend);
                let audience = env.audience.clone();

                smallvec![
                    Effect::Emit(AuthEvent::Verifying),
                    Effect::future(async move {
                        match backend.verify(&assertion, &audience).await {
                            Ok(user) => {
                                metrics::counter!("persona.verify.total", "outcome" => outcomes::VERIFIED)
                                    .increment(1);
                                Some(PersonaAction::Verified { user })
                            },
                            Err(error) => {
                                tracing::warn!(kind = error.label(), %error, "Assertion verification failed");
                                metrics::counter!("persona.verify.total", "outcome" => error.label())
                                    .increment(1);
                                Some(PersonaAction::VerificationFailed {
                                    reason: error.to_string(),
                                })
                            },
                        }
                    }),
                ]
            },

            // ═══════════════════════════════════════════════════════════════
            // Verified: log the user in
            // ═══════════════════════════════════════════════════════════════
            PersonaAction::Verified { user } => {
                if user.is_empty() {
                    tracing::warn!("Backend verified an empty user identifier");
                    transition(state, |_| Session::Error);
                    return smallvec![Effect::Emit(AuthEvent::Failure {
                        message: messages::EMPTY_USER.to_string(),
                    })];
                }

                transition(state, |_| Session::LoggedIn { user: user.clone() });
                smallvec![Effect::Emit(AuthEvent::Success { user })]
            },

            // ═══════════════════════════════════════════════════════════════
            // VerificationFailed: log out, pass the message through
            // ═══════════════════════════════════════════════════════════════
            PersonaAction::VerificationFailed { reason } => {
                transition(state, |_| Session::LoggedOut);
                smallvec![Effect::Emit(AuthEvent::Failure { message: reason })]
            },

            _ => {
                tracing::trace!("Action not handled by login reducer");
                SmallVec::new()
            },
        }
    }
}
