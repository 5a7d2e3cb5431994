#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Resource Store
//!
//! > **Normalized client-side state for REST resources, driven by actions.**
//!
//! This crate keeps a remote collection (notes, users, orders...) in an immutable,
//! normalized snapshot. Every change is an action record such as `NOTES/FETCH/SUCCESS`
//! that a pure reducer turns into the next snapshot. Alongside the entities, each
//! resource tracks request status per operation and named drafts ("changesets") for
//! the forms that edit it.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why Actions + Reducers?
//!
//! - **Predictability**: the state only changes by applying an action, in dispatch order.
//! - **Cheap snapshots**: state is shared as `Arc<Resource<T>>`; readers never see a
//!   half-applied change, and a no-op hands back the very same `Arc`.
//! - **No boilerplate**: one factory call yields the sixteen action creators of a
//!   resource, one reducer call handles them all.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! You'll see `ResourceReducer<T: Entity>` everywhere. Entities default to
//! `serde_json::Value`; plug in any serde type (like [`Note`](model::Note)) to keep
//! them typed. Drafts and payloads stay JSON because they are partial by nature.
//!
//! ### Mocking: Testing without Pain
//! Forms and clients talk to a store through [`ResourceBinding`](framework::ResourceBinding)
//! and to the backend through [`Transport`](clients::Transport). Both have mocks in the
//! [`framework::mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Total Reducer
//! [`ResourceReducer::reduce`](framework::ResourceReducer::reduce) never fails. Malformed
//! input is logged with `tracing` at `warn` and leaves the state as it was. Errors
//! ([`ResourceError`](framework::ResourceError)) are reserved for programming mistakes
//! such as an empty resource name, and for a store that has shut down.
//!
//! ### 2. Concurrency Model
//! A [`ResourceStore`](lifecycle::ResourceStore) runs in its own Tokio task and applies
//! actions sequentially, so the state needs no lock. Handles publish snapshots through
//! a `watch` channel.
//!
//! ### 3. Observability
//! We use `tracing` everywhere with structured fields. See the [`lifecycle::tracing`]
//! module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Actions, the action factory, the reducer and its options, the state types and the
//! form helper.
//! - **Key items**: [`ResourceActions`](framework::ResourceActions),
//!   [`ResourceReducer`](framework::ResourceReducer), [`Resource`](framework::Resource),
//!   [`ResourceForm`](framework::ResourceForm).
//!
//! ### 2. The Runtime ([`lifecycle`])
//! - **Role**: Owns the state in a task and hands out cloneable handles.
//! - **Key items**: [`ResourceStore`](lifecycle::ResourceStore), [`StoreHandle`](lifecycle::StoreHandle).
//!
//! ### 3. The Interface ([`clients`])
//! - **Role**: Wires START/SUCCESS/FAILURE around backend requests.
//! - **Key items**: [`ResourceClient`](clients::ResourceClient), [`InMemoryTransport`](clients::InMemoryTransport).
//!
//! ### 4. The Data ([`model`])
//! Sample entity types used by the demo and the tests.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use resource_store::framework::{create_resource_actions, create_resource_reducer, ReducerOptions};
//! use serde_json::json;
//!
//! let actions = create_resource_actions("notes").unwrap();
//! let reducer = create_resource_reducer::<serde_json::Value>("notes", ReducerOptions::new()).unwrap();
//!
//! let state = reducer(None, &actions.fetch_success(json!([{ "id": 1, "text": "hi" }]), None));
//! assert_eq!(state.len(), 1);
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! # Run with info logs
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
