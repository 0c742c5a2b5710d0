//! Mock port implementations for testing.
//!
//! In-memory, deterministic doubles for the two ports, for use in unit and
//! integration tests and in demos.

pub mod backend;
pub mod identity;

pub use backend::MockBackend;
pub use identity::MockIdentityProvider;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
