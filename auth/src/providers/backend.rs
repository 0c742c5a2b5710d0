//! Verification backend trait.

use crate::error::BackendError;
use std::future::Future;

/// Application backend that verifies assertions and owns the server-side
/// session.
///
/// Both calls resolve exactly once. Completion is delivered to the state
/// machine on a later turn of the runtime, never from inside the call that
/// triggered it.
pub trait Backend: Send + Sync {
    /// Verify `assertion` for `audience`.
    ///
    /// # Returns
    ///
    /// The verified user identifier.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`BackendError::Rejected`] if the backend refused the assertion
    /// - [`BackendError::Transport`] if the exchange could not be completed
    fn verify(
        &self,
        assertion: &str,
        audience: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Close the backend session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the backend refused the logout or could
    /// not be reached.
    fn logout(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}
