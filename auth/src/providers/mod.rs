//! Ports to the outside world.
//!
//! The state machine depends on these traits only:
//!
//! - [`Backend`]: the application server that verifies assertions and owns
//!   the server-side session
//! - [`IdentityProvider`]: the identity widget that issues assertions and
//!   reports login, logout and cancellation through [`ProviderCallbacks`]
//!
//! [`HttpBackend`] is the production [`Backend`]; in-memory doubles live in
//! `crate::mocks`.

pub mod backend;
pub mod http;
pub mod identity;

pub use backend::Backend;
pub use http::HttpBackend;
pub use identity::{IdentityProvider, ProviderCallbacks};
