//! Persona constants.

/// Messages carried by [`AuthEvent::Failure`](crate::AuthEvent::Failure)
/// that originate in the state machine rather than the backend.
pub mod messages {
    /// Prefix prepended to the backend's reason when a logout fails.
    pub const LOGOUT_FAILURE_PREFIX: &str = "Error logging out: ";

    /// The backend reported success for an empty user identifier.
    pub const EMPTY_USER: &str = "Backend returned an empty user identifier";
}

/// Outcome labels for the `persona.verify.total` and
/// `persona.logout.total` counters.
pub mod outcomes {
    /// The backend verified the assertion.
    pub const VERIFIED: &str = "verified";

    /// The backend closed its session.
    pub const LOGGED_OUT: &str = "logged_out";
}
