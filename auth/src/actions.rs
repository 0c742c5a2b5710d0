//! Inputs to the Persona state machine.
//!
//! Actions come from three places: the application (`Initialize`), the
//! identity provider's callbacks (`Provider*`), and completed backend calls
//! fed back by the runtime.

use serde::{Deserialize, Serialize};

/// What the application knows about the session when it initializes.
///
/// Handed to the identity provider as well, so it can reconcile its own
/// session with the application's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnownSession {
    /// Nothing is known; the provider's session detection decides.
    #[default]
    Unknown,
    /// The application has a session for this user.
    LoggedIn(String),
    /// The application knows nobody is logged in.
    LoggedOut,
}

impl KnownSession {
    /// Build from an optional known user. An empty identifier counts as none.
    #[must_use]
    pub fn from_user(user: Option<String>) -> Self {
        match user {
            Some(user) if !user.is_empty() => Self::LoggedIn(user),
            _ => Self::Unknown,
        }
    }

    /// The known user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::LoggedIn(user) => Some(user),
            Self::Unknown | Self::LoggedOut => None,
        }
    }
}

/// Persona action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonaAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Application
    // ═══════════════════════════════════════════════════════════════════════
    /// Seed the session from what the application already knows.
    Initialize {
        /// Known session.
        known: KnownSession,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Identity provider callbacks
    // ═══════════════════════════════════════════════════════════════════════
    /// The provider produced an assertion.
    ProviderLogin {
        /// Opaque assertion to verify.
        assertion: String,
    },

    /// The provider ended its session.
    ProviderLogout,

    /// The user dismissed the login dialog.
    ProviderCancelled,

    // ═══════════════════════════════════════════════════════════════════════
    // Backend results
    // ═══════════════════════════════════════════════════════════════════════
    /// The backend verified the assertion.
    Verified {
        /// Verified user identifier.
        user: String,
    },

    /// The backend refused the assertion or could not be reached.
    VerificationFailed {
        /// Backend message, passed through untouched.
        reason: String,
    },

    /// The backend session was closed.
    LogoutSucceeded,

    /// The backend logout failed.
    LogoutFailed {
        /// Backend message, passed through untouched.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_session_from_user() {
        assert_eq!(
            KnownSession::from_user(Some("bob@example.com".into())),
            KnownSession::LoggedIn("bob@example.com".into())
        );
        assert_eq!(KnownSession::from_user(Some(String::new())), KnownSession::Unknown);
        assert_eq!(KnownSession::from_user(None), KnownSession::Unknown);
        assert_eq!(KnownSession::LoggedOut.user(), None);
    }
}
