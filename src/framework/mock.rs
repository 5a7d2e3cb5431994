//! # Mock Framework
//!
//! Utilities for testing forms and clients in isolation.
//!
//! ## MockBinding
//!
//! [`MockBinding`] implements [`ResourceBinding`] without a store task. It records
//! every dispatched action and, when built with [`MockBinding::with_reducer`], applies
//! it synchronously so reads see the result immediately.
//!
//! ```rust
//! use resource_store::framework::mock::MockBinding;
//! use resource_store::framework::{ResourceActions, ResourceReducer};
//!
//! let actions = ResourceActions::new("notes").unwrap();
//! let binding = MockBinding::with_reducer(ResourceReducer::<serde_json::Value>::new("notes").unwrap());
//!
//! let form = actions.resource_form("create", &binding);
//! form.init().unwrap();
//! form.field("text").set("hello").unwrap();
//!
//! assert_eq!(form.field("text").value(), Some(serde_json::json!("hello")));
//! assert_eq!(binding.dispatched().len(), 2);
//! ```
//!
//! ## MockTransport
//!
//! [`MockTransport`] implements [`Transport`] from a queue of expectations, so the
//! START/SUCCESS/FAILURE wiring of a [`ResourceClient`](crate::clients::ResourceClient)
//! can be exercised without a server, including failures that are hard to produce
//! against a real one.
//!
//! ```rust
//! use resource_store::clients::Transport;
//! use resource_store::framework::mock::MockTransport;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockTransport::new();
//!     mock.expect_create().return_err(json!({ "text": "too long" }));
//!
//!     let result = mock.create(json!({ "text": "..." })).await;
//!     assert_eq!(result, Err(json!({ "text": "too long" })));
//!     mock.verify();
//! }
//! ```

use crate::clients::transport::{Transport, TransportResult};
use crate::framework::error::ResourceError;
use crate::framework::form::ResourceBinding;
use crate::framework::reducer::ResourceReducer;
use crate::framework::state::{Entity, EntityId, Resource};
use crate::framework::Action;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// BINDING
// =============================================================================

/// In-memory [`ResourceBinding`] that records dispatched actions.
pub struct MockBinding<T = Value> {
    state: Mutex<Arc<Resource<T>>>,
    reducer: Option<ResourceReducer<T>>,
    dispatched: Mutex<Vec<Action>>,
}

impl<T: Entity> Default for MockBinding<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> MockBinding<T> {
    /// Records actions only; the snapshot stays empty.
    pub fn new() -> Self {
        Self::with_state(Resource::new())
    }

    /// Records actions only; the snapshot is fixed to `state`.
    pub fn with_state(state: Resource<T>) -> Self {
        Self {
            state: Mutex::new(Arc::new(state)),
            reducer: None,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Records actions and applies them with `reducer`.
    pub fn with_reducer(reducer: ResourceReducer<T>) -> Self {
        Self {
            state: Mutex::new(reducer.initial_state()),
            reducer: Some(reducer),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Every action dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<Action> {
        self.dispatched.lock().unwrap().clone()
    }

    /// Wire types of the dispatched actions, e.g. `"NOTES/CHANGESET/CREATE"`.
    pub fn dispatched_types(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|action| action.action_type.to_string())
            .collect()
    }
}

impl<T: Entity> ResourceBinding for MockBinding<T> {
    type Entity = T;

    fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        if let Some(reducer) = &self.reducer {
            let mut state = self.state.lock().unwrap();
            *state = reducer.reduce(Some(state.clone()), &action);
        }
        self.dispatched.lock().unwrap().push(action);
        Ok(())
    }

    fn snapshot(&self) -> Arc<Resource<T>> {
        self.state.lock().unwrap().clone()
    }
}

// =============================================================================
// TRANSPORT EXPECTATION BUILDER API
// =============================================================================

/// The request an expectation stands for.
#[derive(Debug, Clone, PartialEq)]
enum ExpectedRequest {
    Index,
    Create,
    Update(EntityId),
    Destroy(EntityId),
}

struct Expectation {
    request: ExpectedRequest,
    response: TransportResult,
}

/// A mock transport with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new();
/// mock.expect_index().return_ok(json!([{ "id": 1 }]));
/// mock.expect_destroy(1u64).return_ok(json!({ "id": 1 }));
///
/// // hand `mock` to a ResourceClient...
/// mock.verify(); // Ensures all expectations were met
/// ```
#[derive(Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_index(&self) -> ExpectationBuilder {
        self.expect(ExpectedRequest::Index)
    }

    pub fn expect_create(&self) -> ExpectationBuilder {
        self.expect(ExpectedRequest::Create)
    }

    pub fn expect_update(&self, id: impl Into<EntityId>) -> ExpectationBuilder {
        self.expect(ExpectedRequest::Update(id.into()))
    }

    pub fn expect_destroy(&self, id: impl Into<EntityId>) -> ExpectationBuilder {
        self.expect(ExpectedRequest::Destroy(id.into()))
    }

    fn expect(&self, request: ExpectedRequest) -> ExpectationBuilder {
        ExpectationBuilder {
            request,
            expectations: self.expectations.clone(),
        }
    }

    /// Request bodies received by `create` and `update`, in order.
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn respond(&self, request: ExpectedRequest) -> TransportResult {
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(expectation) if expectation.request == request => expectation.response,
            Some(expectation) => panic!(
                "Unexpected request {:?}, expected {:?}",
                request, expectation.request
            ),
            None => panic!("Unexpected request {:?}, no expectations left", request),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn index(&self) -> TransportResult {
        self.respond(ExpectedRequest::Index)
    }

    async fn create(&self, body: Value) -> TransportResult {
        self.bodies.lock().unwrap().push(body);
        self.respond(ExpectedRequest::Create)
    }

    async fn update(&self, id: &EntityId, body: Value) -> TransportResult {
        self.bodies.lock().unwrap().push(body);
        self.respond(ExpectedRequest::Update(id.clone()))
    }

    async fn destroy(&self, id: &EntityId) -> TransportResult {
        self.respond(ExpectedRequest::Destroy(id.clone()))
    }
}

/// Builder for transport expectations.
pub struct ExpectationBuilder {
    request: ExpectedRequest,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Sets the expectation to return a successful response body.
    pub fn return_ok(self, body: Value) {
        self.push(Ok(body));
    }

    /// Sets the expectation to return a failure body.
    pub fn return_err(self, body: Value) {
        self.push(Err(body));
    }

    fn push(self, response: TransportResult) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            request: self.request,
            response,
        });
    }
}
