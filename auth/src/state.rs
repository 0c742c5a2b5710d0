//! Authentication state types.
//!
//! The session is a closed enum: the current user lives inside the
//! `LoggedIn` variant, so a user without `LoggedIn` (or `LoggedIn` without a
//! user) cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Status
// ═══════════════════════════════════════════════════════════════════════

/// Authentication status, as observed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// No interaction has happened yet.
    Unknown,
    /// The user is logged out.
    LoggedOut,
    /// An assertion has been received and is being verified by the backend.
    Verifying,
    /// The backend accepted an assertion; a current user is set.
    LoggedIn,
    /// The provider ended its session; the backend logout is in progress.
    LoggingOut,
    /// The user dismissed the provider's login dialog.
    Cancelled,
    /// The backend answered outside its contract.
    Error,
}

impl Status {
    /// Get the status name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::LoggedOut => "logged_out",
            Self::Verifying => "verifying",
            Self::LoggedIn => "logged_in",
            Self::LoggingOut => "logging_out",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        }
    }

    /// `true` when no backend call is pending for this status.
    #[must_use]
    pub const fn is_quiescent(&self) -> bool {
        !matches!(self, Self::Verifying | Self::LoggingOut)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// Status paired with the current user.
///
/// `LoggingOut` and `Cancelled` remember the identity that was logged in when
/// they were entered. That identity is not a current user (see
/// [`Session::current_user`]); it is what a failed backend logout restores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    /// See [`Status::Unknown`].
    #[default]
    Unknown,
    /// See [`Status::LoggedOut`].
    LoggedOut,
    /// See [`Status::Verifying`].
    Verifying,
    /// See [`Status::LoggedIn`].
    LoggedIn {
        /// The verified user identifier.
        user: String,
    },
    /// See [`Status::LoggingOut`].
    LoggingOut {
        /// Identity held while the backend logout runs.
        previous: Option<String>,
    },
    /// See [`Status::Cancelled`].
    Cancelled {
        /// Identity held across the cancelled login dialog.
        previous: Option<String>,
    },
    /// See [`Status::Error`].
    Error,
}

impl Session {
    /// The status of this session.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Unknown => Status::Unknown,
            Self::LoggedOut => Status::LoggedOut,
            Self::Verifying => Status::Verifying,
            Self::LoggedIn { .. } => Status::LoggedIn,
            Self::LoggingOut { .. } => Status::LoggingOut,
            Self::Cancelled { .. } => Status::Cancelled,
            Self::Error => Status::Error,
        }
    }

    /// The current user; present exactly when the status is `LoggedIn`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use persona_auth::{Session, Status};
    /// let session = Session::LoggedIn { user: "alice@example.com".to_string() };
    /// assert_eq!(session.current_user(), Some("alice@example.com"));
    ///
    /// let session = Session::LoggingOut { previous: Some("alice@example.com".to_string()) };
    /// assert_eq!(session.status(), Status::LoggingOut);
    /// assert_eq!(session.current_user(), None);
    /// ```
    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        match self {
            Self::LoggedIn { user } => Some(user),
            _ => None,
        }
    }

    /// Take the identity a new `LoggingOut`/`Cancelled` session should hold.
    pub(crate) fn take_identity(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::LoggedIn { user } => Some(user),
            Self::LoggingOut { previous } | Self::Cancelled { previous } => previous,
            Self::Unknown | Self::LoggedOut | Self::Verifying | Self::Error => None,
        }
    }
}

/// Root state managed by the Persona reducer.
///
/// # Examples
///
/// ```
/// # use persona_auth::{PersonaState, Status};
/// let state = PersonaState::default();
/// assert_eq!(state.status(), Status::Unknown);
/// assert!(state.current_user().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaState {
    /// The current session.
    pub session: Session,
}

impl PersonaState {
    /// Shorthand for `self.session.status()`.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.session.status()
    }

    /// Shorthand for `self.session.current_user()`.
    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        self.session.current_user()
    }
}
