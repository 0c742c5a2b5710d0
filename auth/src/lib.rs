//! # Persona Authentication
//!
//! Browser-side identity-assertion login, expressed as a reducer.
//!
//! An identity provider widget issues assertions; the application backend
//! verifies them. This crate sits in between and keeps a single observable
//! authentication status, announcing every change to subscribers.
//!
//! ## Architecture
//!
//! ```text
//! provider callback → PersonaAction → PersonaReducer → (Session, Effects)
//!                                                         │
//!                         Emit(AuthEvent) → handlers ◄────┤
//!                         Future(backend call) ───────────┘→ PersonaAction
//! ```
//!
//! - [`Persona`]: application handle (init, login, logout, handlers, status)
//! - [`PersonaReducer`]: the transitions
//! - [`providers::Backend`] / [`providers::IdentityProvider`]: the ports
//! - [`mocks`]: in-memory ports for tests (feature `test-utils`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use persona_auth::*;
//!
//! let persona = Persona::new(PersonaConfig::new(), backend, provider);
//! let _handlers = persona.add_handler(Arc::new(MyHandler));
//! persona.init(None)?;
//!
//! // The provider calls back with an assertion...
//! persona.settled().await;
//! assert_eq!(persona.status(), Status::LoggedIn);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod client;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod events;
pub mod providers;
pub mod reducers;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::{KnownSession, PersonaAction};
pub use client::Persona;
pub use config::{DisplayOptions, PersonaConfig};
pub use environment::PersonaEnvironment;
pub use error::{BackendError, PersonaError, Result};
pub use events::{AuthEvent, AuthEventKind, AuthHandler};
pub use persona_core::Subscription;
pub use reducers::PersonaReducer;
pub use state::{PersonaState, Session, Status};
