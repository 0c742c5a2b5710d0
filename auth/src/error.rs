//! Error types for the Persona coordinator.

use thiserror::Error;

/// Result type alias for Persona operations.
pub type Result<T> = std::result::Result<T, PersonaError>;

/// Errors surfaced to the application.
///
/// Lifecycle errors are programmer errors and are returned from the call that
/// caused them. Backend errors never reach the caller of `login`/`logout`:
/// the state machine turns them into [`AuthEvent::Failure`](crate::AuthEvent::Failure).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersonaError {
    /// An operation was invoked before `init`.
    #[error("Persona has not been initialized")]
    NotInitialized,

    /// `init` was called a second time.
    #[error("Persona has already been initialized")]
    AlreadyInitialized,

    /// The backend failed to verify an assertion or to log out.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A page location could not be turned into an origin.
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),
}

/// Failure reported by a [`Backend`](crate::providers::Backend).
///
/// The state machine treats both variants the same way; the distinction is
/// for the backend adapter and for logs. `Display` is exactly the carried
/// message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered and refused (invalid assertion, logout refused).
    #[error("{0}")]
    Rejected(String),

    /// The exchange with the backend could not be completed.
    #[error("{0}")]
    Transport(String),
}

impl BackendError {
    /// Create a rejection.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Create a transport failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Transport(_) => "transport",
        }
    }
}
