//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing`
//! crate for binaries and demos built on this library.
//!
//! ## Configuration
//!
//! Log lines use the compact format without the crate/module prefix
//! (`with_target(false)`); the `resource` field already says where a line came from.
//! Levels are controlled by the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Store Lifecycle** (`info`): startup and shutdown with the number of applied actions
//! - **Routing** (`debug`): every dispatched action and whether it changed the state
//! - **Client Requests** (`info`/`debug`): one span per request with the resource and form key
//! - **Malformed Input** (`warn`): entities without an id, edits to a form that was never
//!   created, payloads that do not decode into the entity type
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and failures only
//! RUST_LOG=info cargo run
//!
//! # Every dispatched action
//! RUST_LOG=debug cargo run
//!
//! # Only the reducer
//! RUST_LOG=resource_store::framework::reducer=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a create round trip of the demo looks like:
//!
//! ```text
//! DEBUG Dispatch resource="NOTES" action=NOTES/CHANGESET/CREATE changed=true
//! DEBUG Dispatch resource="NOTES" action=NOTES/CHANGESET/UPDATE changed=true
//! INFO create{resource="notes" form="create"}: Created id=1 size=1
//! DEBUG create{resource="notes" form="create"}: Created
//! DEBUG Dispatch resource="NOTES" action=NOTES/CREATE/START changed=true
//! DEBUG Dispatch resource="NOTES" action=NOTES/CREATE/SUCCESS changed=true
//! ```

/// Installs a global compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already set, so call it once from `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
