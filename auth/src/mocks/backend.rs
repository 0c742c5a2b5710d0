//! Mock verification backend.

use super::lock;
use crate::error::BackendError;
use crate::providers::Backend;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Answer given when no verification outcome has been scripted.
pub const UNSCRIPTED_VERIFY: &str = "MockBackend: no verify outcome scripted";

#[derive(Debug, Default)]
struct Script {
    verify_outcomes: VecDeque<Result<String, BackendError>>,
    logout_outcomes: VecDeque<Result<(), BackendError>>,
    verify_calls: Vec<(String, String)>,
    logout_calls: usize,
}

/// Mock backend.
///
/// Answers from queues of scripted outcomes, in order, and records every
/// call. Clones share the same script, so a test can keep a handle after
/// giving one to `Persona`.
///
/// Unscripted calls: `verify` fails with [`UNSCRIPTED_VERIFY`], `logout`
/// succeeds.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
}

impl MockBackend {
    /// Create a mock backend with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of a future `verify` call.
    pub fn push_verify_outcome(&self, outcome: Result<String, BackendError>) {
        lock(&self.script).verify_outcomes.push_back(outcome);
    }

    /// Queue the outcome of a future `logout` call.
    pub fn push_logout_outcome(&self, outcome: Result<(), BackendError>) {
        lock(&self.script).logout_outcomes.push_back(outcome);
    }

    /// Next `verify` succeeds for `user`.
    pub fn will_verify(&self, user: impl Into<String>) {
        self.push_verify_outcome(Ok(user.into()));
    }

    /// Next `verify` is rejected with `reason`.
    pub fn will_reject(&self, reason: impl Into<String>) {
        self.push_verify_outcome(Err(BackendError::rejected(reason)));
    }

    /// Next `logout` is rejected with `reason`.
    pub fn will_fail_logout(&self, reason: impl Into<String>) {
        self.push_logout_outcome(Err(BackendError::rejected(reason)));
    }

    /// Every `verify` call so far, as `(assertion, audience)`.
    #[must_use]
    pub fn verify_calls(&self) -> Vec<(String, String)> {
        lock(&self.script).verify_calls.clone()
    }

    /// Number of `logout` calls so far.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        lock(&self.script).logout_calls
    }

    /// Total number of backend calls so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        let script = lock(&self.script);
        script.verify_calls.len() + script.logout_calls
    }
}

impl Backend for MockBackend {
    fn verify(
        &self,
        assertion: &str,
        audience: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send {
        let outcome = {
            let mut script = lock(&self.script);
            script
                .verify_calls
                .push((assertion.to_string(), audience.to_string()));
            script
                .verify_outcomes
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::transport(UNSCRIPTED_VERIFY)))
        };
        async move { outcome }
    }

    fn logout(&self) -> impl Future<Output = Result<(), BackendError>> + Send {
        let outcome = {
            let mut script = lock(&self.script);
            script.logout_calls += 1;
            script.logout_outcomes.pop_front().unwrap_or(Ok(()))
        };
        async move { outcome }
    }
}
