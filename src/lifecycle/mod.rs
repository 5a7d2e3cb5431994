//! Runtime wiring: the store task that owns resource state, and logging setup.

pub mod store;
pub mod tracing;

pub use store::{ResourceStore, StoreHandle, StoreRequest};
pub use self::tracing::setup_tracing;
