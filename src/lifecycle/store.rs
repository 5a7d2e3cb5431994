//! # Resource Store
//!
//! The runtime half of the framework. A [`ResourceStore`] owns the current
//! [`Resource`] snapshot and runs the reducer in its own Tokio task; everything else
//! talks to it through a cloneable [`StoreHandle`].
//!
//! ## Ordering
//!
//! Actions are applied strictly in the order they were dispatched, one at a time.
//! `dispatch` only enqueues, so a read right after a dispatch may still see the old
//! snapshot. Await [`StoreHandle::flush`] when a caller needs its own writes to be
//! visible.
//!
//! ```rust
//! use resource_store::framework::{ResourceActions, ResourceReducer};
//! use resource_store::lifecycle::ResourceStore;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let actions = ResourceActions::new("notes").unwrap();
//!     let (task, store) = ResourceStore::spawn(ResourceReducer::<serde_json::Value>::new("notes").unwrap());
//!
//!     store.dispatch(actions.fetch_success(json!([{ "id": 1 }]), None)).unwrap();
//!     store.flush().await.unwrap();
//!     assert_eq!(store.state().len(), 1);
//!
//!     drop(store);
//!     task.await.unwrap();
//! }
//! ```

use crate::framework::{Action, Entity, Resource, ResourceBinding, ResourceError, ResourceReducer};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Messages accepted by the store task.
#[derive(Debug)]
pub enum StoreRequest {
    /// Apply one action.
    Dispatch(Action),
    /// Reply once every earlier request has been applied.
    Flush { respond_to: oneshot::Sender<()> },
}

/// Owner of a resource's state.
///
/// The snapshot lives only inside the task running [`ResourceStore::run`]; readers get
/// shared `Arc`s through a `watch` channel, so no lock guards the state.
pub struct ResourceStore<T: Entity> {
    receiver: mpsc::UnboundedReceiver<StoreRequest>,
    reducer: ResourceReducer<T>,
    state: watch::Sender<Arc<Resource<T>>>,
}

impl<T: Entity> ResourceStore<T> {
    pub fn new(reducer: ResourceReducer<T>) -> (Self, StoreHandle<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (state, snapshots) = watch::channel(reducer.initial_state());
        let store = Self {
            receiver,
            reducer,
            state,
        };
        let handle = StoreHandle { sender, snapshots };
        (store, handle)
    }

    /// Creates the store and runs it on the current Tokio runtime.
    pub fn spawn(reducer: ResourceReducer<T>) -> (JoinHandle<()>, StoreHandle<T>) {
        let (store, handle) = Self::new(reducer);
        (tokio::spawn(store.run()), handle)
    }

    /// Processes requests until every [`StoreHandle`] is dropped.
    pub async fn run(mut self) {
        let resource = self.reducer.name().to_string();
        info!(%resource, "Store started");

        let mut applied = 0usize;
        while let Some(request) = self.receiver.recv().await {
            match request {
                StoreRequest::Dispatch(action) => {
                    let current = self.state.borrow().clone();
                    let next = self.reducer.reduce(Some(current.clone()), &action);
                    let changed = !Arc::ptr_eq(&current, &next);
                    debug!(%resource, action = %action.action_type, changed, "Dispatch");
                    if changed {
                        self.state.send_replace(next);
                    }
                    applied += 1;
                }
                StoreRequest::Flush { respond_to } => {
                    let _ = respond_to.send(());
                }
            }
        }

        let size = self.state.borrow().len();
        info!(%resource, applied, size, "Shutdown");
    }
}

/// Cloneable access to a running [`ResourceStore`].
pub struct StoreHandle<T> {
    sender: mpsc::UnboundedSender<StoreRequest>,
    snapshots: watch::Receiver<Arc<Resource<T>>>,
}

impl<T> Clone for StoreHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<T: Entity> StoreHandle<T> {
    /// Enqueues an action. Fails only when the store task has stopped.
    pub fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        self.sender
            .send(StoreRequest::Dispatch(action))
            .map_err(|_| ResourceError::StoreClosed)
    }

    /// Latest published snapshot.
    pub fn state(&self) -> Arc<Resource<T>> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified whenever an action changes the state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Resource<T>>> {
        self.snapshots.clone()
    }

    /// Waits until every action dispatched before this call has been applied.
    pub async fn flush(&self) -> Result<(), ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Flush { respond_to })
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)
    }
}

#[async_trait]
impl<T: Entity> ResourceBinding for StoreHandle<T> {
    type Entity = T;

    fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        StoreHandle::dispatch(self, action)
    }

    fn snapshot(&self) -> Arc<Resource<T>> {
        self.state()
    }

    async fn settle(&self) -> Result<(), ResourceError> {
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{EntityId, Operation, ResourceActions};
    use serde_json::json;

    fn spawn_notes() -> (ResourceActions, JoinHandle<()>, StoreHandle<serde_json::Value>) {
        let (task, handle) = ResourceStore::spawn(ResourceReducer::new("notes").unwrap());
        (ResourceActions::new("notes").unwrap(), task, handle)
    }

    #[tokio::test]
    async fn test_actions_apply_in_dispatch_order() {
        let (actions, _task, store) = spawn_notes();

        store.dispatch(actions.fetch_start(None, None)).unwrap();
        store.dispatch(actions.fetch_success(json!([{ "id": 1 }, { "id": 2 }]), None)).unwrap();
        store.dispatch(actions.destroy_success(json!(1), None)).unwrap();
        store.flush().await.unwrap();

        let state = store.state();
        assert_eq!(state.results(), &[EntityId::from("2")]);
        assert_eq!(state.status(Operation::Fetch).success, Some(true));
    }

    #[tokio::test]
    async fn test_subscriber_sees_only_changes() {
        let (actions, _task, store) = spawn_notes();
        let mut changes = store.subscribe();
        changes.mark_unchanged();

        let foreign = ResourceActions::new("users").unwrap();
        store.dispatch(foreign.fetch_success(json!([{ "id": 9 }]), None)).unwrap();
        store.flush().await.unwrap();
        assert!(!changes.has_changed().unwrap());

        store.dispatch(actions.create_success(json!({ "id": 3 }), None)).unwrap();
        store.flush().await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().len(), 1);
    }

    #[tokio::test]
    async fn test_task_ends_when_handles_drop() {
        let (_actions, task, store) = spawn_notes();
        let clone = store.clone();
        drop(store);
        drop(clone);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_fails() {
        let (store, handle) = ResourceStore::new(ResourceReducer::<serde_json::Value>::new("notes").unwrap());
        drop(store);

        let actions = ResourceActions::new("notes").unwrap();
        assert!(matches!(
            handle.dispatch(actions.fetch_start(None, None)),
            Err(ResourceError::StoreClosed)
        ));
        assert!(matches!(handle.flush().await, Err(ResourceError::StoreClosed)));
    }
}
