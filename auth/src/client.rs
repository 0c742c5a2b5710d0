//! Application-facing Persona handle.
//!
//! [`Persona`] wires the reducer into a [`Store`], hands the identity
//! provider callbacks that feed the store, and exposes status queries and
//! handler registration.

use crate::actions::{KnownSession, PersonaAction};
use crate::config::PersonaConfig;
use crate::environment::PersonaEnvironment;
use crate::error::{PersonaError, Result};
use crate::events::{AuthEvent, AuthEventKind, AuthHandler};
use crate::providers::{Backend, IdentityProvider, ProviderCallbacks};
use crate::reducers::PersonaReducer;
use crate::state::{PersonaState, Session, Status};
use persona_core::{EventChannel, Subscription};
use persona_runtime::Store;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type PersonaStore<B> = Store<PersonaState, PersonaAction, PersonaEnvironment<B>, PersonaReducer<B>>;

/// Persona login coordinator.
///
/// One instance per page (or per test). Provider callbacks and backend
/// results are processed one at a time, in arrival order; every status
/// change is followed, before anything else happens, by its event.
///
/// Backend calls run on the Tokio runtime, so provider callbacks must fire
/// from within one.
///
/// # Example
///
/// ```ignore
/// let persona = Persona::new(config, HttpBackend::new(backend_config)?, provider);
///
/// let _on_success = persona.add_success_handler(|user| println!("hello {user}"));
/// persona.init(None)?;
/// persona.login()?;
/// ```
pub struct Persona<B, P>
where
    B: Backend + 'static,
    P: IdentityProvider,
{
    store: PersonaStore<B>,
    provider: Arc<P>,
    config: PersonaConfig,
    initialized: AtomicBool,
}

impl<B, P> Persona<B, P>
where
    B: Backend + 'static,
    P: IdentityProvider,
{
    /// Create a coordinator in status `Unknown`.
    ///
    /// An unset or empty audience resolves to the provider's default
    /// audience now.
    #[must_use]
    pub fn new(config: PersonaConfig, backend: B, provider: P) -> Self {
        Self::with_shared(config, Arc::new(backend), Arc::new(provider))
    }

    /// Like [`new`](Self::new), for ports shared with other owners.
    #[must_use]
    pub fn with_shared(config: PersonaConfig, backend: Arc<B>, provider: Arc<P>) -> Self {
        let audience = config.audience_or_else(|| provider.default_audience());
        tracing::debug!(%audience, "Persona audience resolved");

        let store = Store::new(
            PersonaState::default(),
            PersonaReducer::new(),
            PersonaEnvironment::new(backend, audience),
        );

        Self {
            store,
            provider,
            config,
            initialized: AtomicBool::new(false),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Initialize with what the application knows.
    ///
    /// `Some(user)` logs `user` in without contacting the backend. `None`
    /// leaves the status `Unknown` for the provider's session detection to
    /// resolve. Provider callbacks are registered in both cases. No event is
    /// fired.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::AlreadyInitialized`] on every call after the
    /// first.
    #[tracing::instrument(skip(self, known_user), fields(known = known_user.is_some()))]
    pub fn init(&self, known_user: Option<String>) -> Result<()> {
        self.initialize(KnownSession::from_user(known_user))
    }

    /// Initialize knowing that nobody is logged in.
    ///
    /// Status becomes `LoggedOut`; otherwise behaves like [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::AlreadyInitialized`] if already initialized.
    #[tracing::instrument(skip(self))]
    pub fn init_logged_out(&self) -> Result<()> {
        self.initialize(KnownSession::LoggedOut)
    }

    fn initialize(&self, known: KnownSession) -> Result<()> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            tracing::warn!("Persona initialized twice");
            return Err(PersonaError::AlreadyInitialized);
        }

        if let Some(warning) = self.config.display.policy_pair_warning() {
            tracing::warn!(warning, "Incomplete display options");
        }

        self.store.send(PersonaAction::Initialize {
            known: known.clone(),
        });

        let store = self.store.clone();
        self.provider
            .register_callbacks(&known, ProviderCallbacks::new(move |action| store.send(action)));

        tracing::info!(status = %self.status(), audience = %self.audience(), "Persona initialized");
        Ok(())
    }

    /// `true` once [`init`](Self::init) or
    /// [`init_logged_out`](Self::init_logged_out) has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PersonaError::NotInitialized)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Open the provider's login dialog with the configured display options.
    ///
    /// The status does not change until the provider calls back. Repeated
    /// calls are forwarded as they come.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::NotInitialized`] before `init`.
    #[tracing::instrument(skip(self))]
    pub fn login(&self) -> Result<()> {
        self.ensure_initialized()?;

        let status = self.status();
        if !status.is_quiescent() {
            tracing::debug!(%status, "Login requested while a backend call is pending");
        }
        self.provider.request_login(&self.config.display);
        Ok(())
    }

    /// Ask the provider to end its session.
    ///
    /// The status does not change until the provider calls back.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::NotInitialized`] before `init`.
    #[tracing::instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.ensure_initialized()?;

        let status = self.status();
        if !status.is_quiescent() {
            tracing::debug!(%status, "Logout requested while a backend call is pending");
        }
        self.provider.request_logout();
        Ok(())
    }

    /// Wait until no backend call is in flight.
    pub async fn settled(&self) {
        self.store.settled().await;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Current status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.store.state(PersonaState::status)
    }

    /// Current user; present exactly when the status is `LoggedIn`.
    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.store.state(|s| s.current_user().map(str::to_string))
    }

    /// Snapshot of the whole session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.store.state(|s| s.session.clone())
    }

    /// Audience assertions are verified against.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.store.environment().audience
    }

    /// The configuration this coordinator was created with.
    #[must_use]
    pub const fn config(&self) -> &PersonaConfig {
        &self.config
    }

    /// The channel events are fired on.
    #[must_use]
    pub fn events(&self) -> &EventChannel<AuthEvent> {
        self.store.events()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Handlers
    // ═══════════════════════════════════════════════════════════════════════

    /// Call `handler` with the user on every [`AuthEvent::Success`].
    pub fn add_success_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.events().subscribe(AuthEventKind::Success, move |event| {
            if let AuthEvent::Success { user } = event {
                handler(user);
            }
        })
    }

    /// Call `handler` with the message on every [`AuthEvent::Failure`].
    pub fn add_failure_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.events().subscribe(AuthEventKind::Failure, move |event| {
            if let AuthEvent::Failure { message } = event {
                handler(message);
            }
        })
    }

    /// Call `handler` on every [`AuthEvent::Verifying`].
    pub fn add_verifying_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events()
            .subscribe(AuthEventKind::Verifying, move |_| handler())
    }

    /// Call `handler` on every [`AuthEvent::LoggingOut`].
    pub fn add_logging_out_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events()
            .subscribe(AuthEventKind::LoggingOut, move |_| handler())
    }

    /// Call `handler` on every [`AuthEvent::LoggedOut`].
    pub fn add_logged_out_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events()
            .subscribe(AuthEventKind::LoggedOut, move |_| handler())
    }

    /// Call `handler` on every [`AuthEvent::Cancelled`].
    pub fn add_cancelled_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events()
            .subscribe(AuthEventKind::Cancelled, move |_| handler())
    }

    /// Register `handler` for all six kinds.
    ///
    /// The returned subscription releases all six registrations at once.
    pub fn add_handler<H>(&self, handler: Arc<H>) -> Subscription
    where
        H: AuthHandler + ?Sized + 'static,
    {
        Subscription::combine(AuthEventKind::ALL.into_iter().map(|kind| {
            let handler = Arc::clone(&handler);
            self.events()
                .subscribe(kind, move |event| handler.handle(event))
        }))
    }
}

impl<B, P> fmt::Debug for Persona<B, P>
where
    B: Backend + 'static,
    P: IdentityProvider,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persona")
            .field("status", &self.status())
            .field("audience", &self.audience())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
