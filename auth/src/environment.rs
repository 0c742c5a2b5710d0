//! Persona environment.
//!
//! Dependencies injected into the Persona reducer.

use crate::providers::Backend;
use std::sync::Arc;

/// Persona environment.
///
/// # Type Parameters
///
/// - `B`: Verification backend
pub struct PersonaEnvironment<B>
where
    B: Backend,
{
    /// Verification backend.
    pub backend: Arc<B>,

    /// Audience every assertion is verified against.
    pub audience: String,
}

impl<B> PersonaEnvironment<B>
where
    B: Backend,
{
    /// Create a new environment.
    #[must_use]
    pub fn new(backend: Arc<B>, audience: impl Into<String>) -> Self {
        Self {
            backend,
            audience: audience.into(),
        }
    }
}

impl<B> Clone for PersonaEnvironment<B>
where
    B: Backend,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            audience: self.audience.clone(),
        }
    }
}
