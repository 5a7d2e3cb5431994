//! Request wiring between a backend and a resource store.

pub mod memory;
pub mod resource_client;
pub mod transport;

pub use memory::*;
pub use resource_client::*;
pub use transport::*;
