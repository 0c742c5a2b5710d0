//! Identity provider trait and the callbacks it drives.

use crate::actions::{KnownSession, PersonaAction};
use crate::config::DisplayOptions;
use std::fmt;
use std::sync::Arc;

type Sink = Arc<dyn Fn(PersonaAction) + Send + Sync>;

/// Callbacks an identity provider invokes when its widget reports a result.
///
/// Cheap to clone. Each call feeds one action to the state machine; calls
/// must be made from within a Tokio runtime, because they may start backend
/// requests.
#[derive(Clone)]
pub struct ProviderCallbacks {
    sink: Sink,
}

impl ProviderCallbacks {
    pub(crate) fn new<F>(sink: F) -> Self
    where
        F: Fn(PersonaAction) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// The user authenticated and the provider issued `assertion`.
    pub fn on_login(&self, assertion: impl Into<String>) {
        (self.sink)(PersonaAction::ProviderLogin {
            assertion: assertion.into(),
        });
    }

    /// The provider session ended.
    pub fn on_logout(&self) {
        (self.sink)(PersonaAction::ProviderLogout);
    }

    /// The user dismissed the login dialog.
    pub fn on_cancel(&self) {
        (self.sink)(PersonaAction::ProviderCancelled);
    }
}

impl fmt::Debug for ProviderCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCallbacks").finish_non_exhaustive()
    }
}

/// Identity provider widget binding.
///
/// Triggers return immediately; results arrive later through the
/// [`ProviderCallbacks`] handed to [`register_callbacks`](Self::register_callbacks).
pub trait IdentityProvider: Send + Sync {
    /// Install the login/logout/cancel callbacks.
    ///
    /// `known` is what the application knows about the session, so the
    /// provider can reconcile it with its own (for example, call
    /// [`ProviderCallbacks::on_logout`] when the application believes a user
    /// is logged in but the provider has no session).
    fn register_callbacks(&self, known: &KnownSession, callbacks: ProviderCallbacks);

    /// Open the login dialog.
    fn request_login(&self, display: &DisplayOptions);

    /// End the provider session.
    fn request_logout(&self);

    /// Origin of the current page (`scheme://host[:port]`).
    ///
    /// See [`origin_from_location`](crate::config::origin_from_location).
    fn default_audience(&self) -> String;
}
