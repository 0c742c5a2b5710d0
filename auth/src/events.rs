//! Authentication events published to the application.
//!
//! Every status transition of the state machine is announced by exactly one
//! [`AuthEvent`], fired after the transition has been applied.

use persona_core::Tagged;
use serde::{Deserialize, Serialize};

/// Notification fired to application subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    /// An assertion was received and is being verified.
    Verifying,
    /// The backend verified the assertion for `user`.
    Success {
        /// The verified user identifier.
        user: String,
    },
    /// A backend call failed.
    ///
    /// The message is human readable and opaque; do not parse it.
    Failure {
        /// What went wrong.
        message: String,
    },
    /// The backend session was closed.
    LoggedOut,
    /// The provider ended its session and the backend logout started.
    LoggingOut,
    /// The user dismissed the login dialog.
    Cancelled,
}

impl AuthEvent {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> AuthEventKind {
        match self {
            Self::Verifying => AuthEventKind::Verifying,
            Self::Success { .. } => AuthEventKind::Success,
            Self::Failure { .. } => AuthEventKind::Failure,
            Self::LoggedOut => AuthEventKind::LoggedOut,
            Self::LoggingOut => AuthEventKind::LoggingOut,
            Self::Cancelled => AuthEventKind::Cancelled,
        }
    }
}

impl Tagged for AuthEvent {
    type Tag = AuthEventKind;

    fn tag(&self) -> AuthEventKind {
        self.kind()
    }
}

/// Field-less mirror of [`AuthEvent`], used to subscribe by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthEventKind {
    /// [`AuthEvent::Verifying`]
    Verifying,
    /// [`AuthEvent::Success`]
    Success,
    /// [`AuthEvent::Failure`]
    Failure,
    /// [`AuthEvent::LoggedOut`]
    LoggedOut,
    /// [`AuthEvent::LoggingOut`]
    LoggingOut,
    /// [`AuthEvent::Cancelled`]
    Cancelled,
}

impl AuthEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Verifying,
        Self::Success,
        Self::Failure,
        Self::LoggedOut,
        Self::LoggingOut,
        Self::Cancelled,
    ];
}

/// Handler object receiving every kind of [`AuthEvent`].
///
/// All methods default to doing nothing, so implementors only override what
/// they care about. Register with [`Persona::add_handler`](crate::Persona::add_handler).
pub trait AuthHandler: Send + Sync {
    /// See [`AuthEvent::Verifying`].
    fn on_verifying(&self) {}

    /// See [`AuthEvent::Success`].
    fn on_success(&self, _user: &str) {}

    /// See [`AuthEvent::Failure`].
    fn on_failure(&self, _message: &str) {}

    /// See [`AuthEvent::LoggedOut`].
    fn on_logged_out(&self) {}

    /// See [`AuthEvent::LoggingOut`].
    fn on_logging_out(&self) {}

    /// See [`AuthEvent::Cancelled`].
    fn on_cancelled(&self) {}

    /// Route `event` to the matching method.
    fn handle(&self, event: &AuthEvent) {
        match event {
            AuthEvent::Verifying => self.on_verifying(),
            AuthEvent::Success { user } => self.on_success(user),
            AuthEvent::Failure { message } => self.on_failure(message),
            AuthEvent::LoggedOut => self.on_logged_out(),
            AuthEvent::LoggingOut => self.on_logging_out(),
            AuthEvent::Cancelled => self.on_cancelled(),
        }
    }
}
