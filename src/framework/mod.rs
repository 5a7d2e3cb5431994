//! Generic resource state management.
//!
//! This module provides the building blocks for keeping a remote collection in a
//! normalized, immutable client-side state driven by action records.
//!
//! # Main Components
//!
//! - [`Action`] / [`ActionType`] - The records flowing through a store, with the `RESOURCE/DOMAIN/METHOD` wire type
//! - [`ResourceActions`] - Factory producing every action a resource understands
//! - [`ResourceReducer`] - Pure transition function over [`Resource`] snapshots
//! - [`ReducerOptions`] - Customization hooks for merging, drafts and payloads
//! - [`ResourceForm`] - Form helper that edits a named draft through a [`ResourceBinding`]
//! - [`ResourceError`] - Errors for misuse of the factory and the store seam
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test forms and clients without spawning a store.

pub mod action;
pub mod error;
pub mod factory;
pub mod form;
pub mod mock;
pub mod options;
pub mod reducer;
pub mod state;

pub use action::{Action, ActionKind, ActionMeta, ActionType, ChangesetMethod, Operation, Phase};
pub use error::ResourceError;
pub use factory::{create_resource_actions, ResourceActions};
pub use form::{FieldBinding, ResourceBinding, ResourceForm};
pub use options::{shallow_merge, ChangeReducer, ChangesetReducer, OnUpdate, PayloadReducer, ReducerOptions};
pub use reducer::{create_resource_reducer, ResourceReducer};
pub use state::{Draft, Entity, EntityId, Resource, Status, StatusMap};
