//! Logout reducer.
//!
//! # Flow
//!
//! 1. The provider reports its session ended (`ProviderLogout`)
//! 2. Session becomes `LoggingOut`, `LoggingOut` is emitted
//! 3. The backend closes its session
//! 4. `LogoutSucceeded` emits `LoggedOut`; `LogoutFailed` restores the
//!    identity held since step 2 and emits `Failure`
//!
//! A failed logout keeps the user logged in, unlike a failed login: the
//! provider session is gone but the backend session is still valid.

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

/// Logout reducer.
///
/// Handles `ProviderLogout`, `LogoutSucceeded` and `LogoutFailed`.
pub struct LogoutReducer<B> {
    _phantom: PhantomData<B>,
}

impl<B> LogoutReducer<B> {
    /// Create a new logout reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B> Default for LogoutReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Reducer for LogoutReducer<B>
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
            PersonaAction::ProviderLogout => {
                transition(state, |session| Session::LoggingOut {
                    previous: session.take_identity(),
                });

                let backend = Arc::clone(&env.backend);

                smallvec![
                    Effect::Emit(AuthEvent::LoggingOut),
                    Effect::future(async move {
                        match backend.logout().await {
                            Ok(()) => {
                                metrics::counter!("persona.logout.total", "outcome" => outcomes::LOGGED_OUT)
                                    .increment(1);
                                Some(PersonaAction::LogoutSucceeded)
                            },
                            Err(error) => {
                                tracing::warn!(kind = error.label(), %error, "Backend logout failed");
                                metrics::counter!("persona.logout.total", "outcome" => error.label())
                                    .increment(1);
                                Some(PersonaAction::LogoutFailed {
                                    reason: error.to_string(),
                                })
                            },
                        }
                    }),
                ]
            },

            PersonaAction::LogoutSucceeded => {
                transition(state, |_| Session::LoggedOut);
                smallvec![Effect::Emit(AuthEvent::LoggedOut)]
            },

            PersonaAction::LogoutFailed { reason } => {
                transition(state, |session| match session.take_identity() {
                    Some(user) => Session::LoggedIn { user },
                    None => Session::LoggedOut,
                });
                smallvec![Effect::Emit(AuthEvent::Failure {
                    message: format!("{}{reason}", messages::LOGOUT_FAILURE_PREFIX),
                })]
            },

            _ => {
                tracing::trace!("Action not handled by logout reducer");
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::mocks::MockBackend;
    use crate::state::Status;
    use persona_testing::{ReducerTest, assertions};

    fn env(backend: &MockBackend) -> PersonaEnvironment<MockBackend> {
        PersonaEnvironment::new(Arc::new(backend.clone()), "https://app.example.com")
    }

    fn state(session: Session) -> PersonaState {
        PersonaState { session }
    }

    fn bob() -> Session {
        Session::LoggedIn {
            user: "bob@example.com".into(),
        }
    }

    #[test]
    fn provider_logout_enters_logging_out() {
        ReducerTest::new(LogoutReducer::<MockBackend>::new())
            .with_env(env(&MockBackend::new()))
            .given_state(state(bob()))
            .when_action(PersonaAction::ProviderLogout)
            .then_state(|state| {
                assert_eq!(state.status(), Status::LoggingOut);
                assert!(state.current_user().is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_emitted(effects, &[AuthEvent::LoggingOut]);
                assertions::assert_emits_before_futures(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn logout_future_feeds_back_failure_reason() {
        let backend = MockBackend::new();
        backend.push_logout_outcome(Err(BackendError::rejected("session gone")));

        let mut persona = state(bob());
        let mut effects =
            LogoutReducer::<MockBackend>::new().reduce(&mut persona, PersonaAction::ProviderLogout, &env(&backend));

        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("logout always ends with a backend call");
        };
        assert_eq!(
            fut.await,
            Some(PersonaAction::LogoutFailed {
                reason: "session gone".into()
            })
        );
        assert_eq!(backend.logout_calls(), 1);
    }

    #[test]
    fn logout_success_logs_out() {
        ReducerTest::new(LogoutReducer::<MockBackend>::new())
            .with_env(env(&MockBackend::new()))
            .given_state(state(Session::LoggingOut {
                previous: Some("bob@example.com".into()),
            }))
            .when_action(PersonaAction::LogoutSucceeded)
            .then_state(|state| {
                assert_eq!(state.status(), Status::LoggedOut);
                assert!(state.current_user().is_none());
            })
            .then_effects(|effects| {
                assertions::assert_emitted(effects, &[AuthEvent::LoggedOut]);
            })
            .run();
    }

    #[test]
    fn logout_failure_restores_user() {
        ReducerTest::new(LogoutReducer::<MockBackend>::new())
            .with_env(env(&MockBackend::new()))
            .given_state(state(Session::LoggingOut {
                previous: Some("bob@example.com".into()),
            }))
            .when_action(PersonaAction::LogoutFailed {
                reason: "session gone".into(),
            })
            .then_state(|state| {
                assert_eq!(state.status(), Status::LoggedIn);
                assert_eq!(state.current_user(), Some("bob@example.com"));
            })
            .then_effects(|effects| {
                assertions::assert_emitted(
                    effects,
                    &[AuthEvent::Failure {
                        message: "Error logging out: session gone".into(),
                    }],
                );
            })
            .run();
    }

    #[test]
    fn logout_failure_without_identity_logs_out() {
        ReducerTest::new(LogoutReducer::<MockBackend>::new())
            .with_env(env(&MockBackend::new()))
            .given_state(state(Session::LoggingOut { previous: None }))
            .when_action(PersonaAction::LogoutFailed {
                reason: "session gone".into(),
            })
            .then_state(|state| {
                assert_eq!(state.status(), Status::LoggedOut);
                assert!(state.current_user().is_none());
            })
            .run();
    }

    #[test]
    fn logout_failure_after_cancel_restores_user() {
        ReducerTest::new(LogoutReducer::<MockBackend>::new())
            .with_env(env(&MockBackend::new()))
            .given_state(state(Session::Cancelled {
                previous: Some("bob@example.com".into()),
            }))
            .when_action(PersonaAction::LogoutFailed {
                reason: "timeout".into(),
            })
            .then_state(|state| {
                assert_eq!(state.current_user(), Some("bob@example.com"));
            })
            .run();
    }
}
