//! Pure data structures (DTOs) stored as [`Entity`](crate::framework::Entity) values.

pub mod note;

pub use note::*;
