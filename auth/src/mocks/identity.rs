//! Mock identity provider.

use super::lock;
use crate::actions::KnownSession;
use crate::config::DisplayOptions;
use crate::providers::{IdentityProvider, ProviderCallbacks};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Widget {
    callbacks: Option<ProviderCallbacks>,
    known: Option<KnownSession>,
    login_requests: Vec<DisplayOptions>,
    logout_requests: usize,
    default_audience: String,
    echo_logout: bool,
}

/// Mock identity provider.
///
/// Stores the registered callbacks and lets the test play the widget:
/// [`emit_login`](Self::emit_login), [`emit_logout`](Self::emit_logout) and
/// [`emit_cancel`](Self::emit_cancel) invoke them synchronously. Clones share
/// the same widget.
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    widget: Arc<Mutex<Widget>>,
}

impl MockIdentityProvider {
    /// Default audience reported by [`new`](Self::new).
    pub const DEFAULT_AUDIENCE: &'static str = "http://localhost:8080";

    /// Create a mock provider on `http://localhost:8080`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_audience(Self::DEFAULT_AUDIENCE)
    }

    /// Create a mock provider reporting `audience` as the page origin.
    #[must_use]
    pub fn with_default_audience(audience: impl Into<String>) -> Self {
        Self {
            widget: Arc::new(Mutex::new(Widget {
                callbacks: None,
                known: None,
                login_requests: Vec::new(),
                logout_requests: 0,
                default_audience: audience.into(),
                echo_logout: false,
            })),
        }
    }

    /// Answer every logout request with the logout callback, as a real
    /// widget does once its session has ended.
    #[must_use]
    pub fn with_logout_echo(self) -> Self {
        lock(&self.widget).echo_logout = true;
        self
    }

    /// `true` once callbacks have been registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        lock(&self.widget).callbacks.is_some()
    }

    /// The session the application reported at registration.
    #[must_use]
    pub fn known_session(&self) -> Option<KnownSession> {
        lock(&self.widget).known.clone()
    }

    /// Display options of every login request so far.
    #[must_use]
    pub fn login_requests(&self) -> Vec<DisplayOptions> {
        lock(&self.widget).login_requests.clone()
    }

    /// Number of logout requests so far.
    #[must_use]
    pub fn logout_requests(&self) -> usize {
        lock(&self.widget).logout_requests
    }

    /// Play a successful login producing `assertion`.
    pub fn emit_login(&self, assertion: &str) {
        if let Some(callbacks) = self.callbacks() {
            callbacks.on_login(assertion);
        }
    }

    /// Play the end of the provider session.
    pub fn emit_logout(&self) {
        if let Some(callbacks) = self.callbacks() {
            callbacks.on_logout();
        }
    }

    /// Play the user dismissing the login dialog.
    pub fn emit_cancel(&self) {
        if let Some(callbacks) = self.callbacks() {
            callbacks.on_cancel();
        }
    }

    // Cloned out so a callback may call back into this provider.
    fn callbacks(&self) -> Option<ProviderCallbacks> {
        let callbacks = lock(&self.widget).callbacks.clone();
        if callbacks.is_none() {
            tracing::warn!("MockIdentityProvider: no callbacks registered, nothing emitted");
        }
        callbacks
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn register_callbacks(&self, known: &KnownSession, callbacks: ProviderCallbacks) {
        let mut widget = lock(&self.widget);
        widget.known = Some(known.clone());
        widget.callbacks = Some(callbacks);
    }

    fn request_login(&self, display: &DisplayOptions) {
        lock(&self.widget).login_requests.push(display.clone());
    }

    fn request_logout(&self) {
        let echo = {
            let mut widget = lock(&self.widget);
            widget.logout_requests += 1;
            widget.echo_logout
        };
        if echo {
            self.emit_logout();
        }
    }

    fn default_audience(&self) -> String {
        lock(&self.widget).default_audience.clone()
    }
}
