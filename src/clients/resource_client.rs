//! # Resource Client
//!
//! The request wiring every screen would otherwise repeat: dispatch `START`, run the
//! request, then dispatch `SUCCESS` or `FAILURE` with the body that came back.
//! Domain failures are not errors here; they are recorded in the resource status.
//! The `Result` only reports a store that can no longer accept actions.

use crate::clients::transport::Transport;
use crate::framework::{EntityId, ResourceActions, ResourceBinding, ResourceError, ResourceForm};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Couples a [`Transport`] with the action creators and the binding of one resource.
pub struct ResourceClient<Tr, B> {
    actions: ResourceActions,
    transport: Tr,
    binding: B,
}

impl<Tr, B> ResourceClient<Tr, B>
where
    Tr: Transport,
    B: ResourceBinding,
{
    pub fn new(actions: ResourceActions, transport: Tr, binding: B) -> Self {
        Self {
            actions,
            transport,
            binding,
        }
    }

    pub fn actions(&self) -> &ResourceActions {
        &self.actions
    }

    pub fn transport(&self) -> &Tr {
        &self.transport
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Loads the collection. Returns whether the request succeeded.
    #[instrument(skip(self), fields(resource = self.actions.resource_name()))]
    pub async fn fetch(&self) -> Result<bool, ResourceError> {
        self.binding.dispatch(self.actions.fetch_start(None, None))?;
        match self.transport.index().await {
            Ok(body) => {
                debug!("Fetched");
                self.binding.dispatch(self.actions.fetch_success(body, None))?;
                Ok(true)
            }
            Err(body) => {
                info!("Fetch failed");
                self.binding.dispatch(self.actions.fetch_failure(body, None))?;
                Ok(false)
            }
        }
    }

    /// Submits the draft of `form` as a new entity and resets the form on success.
    ///
    /// Edits still queued in the form's store are applied before the draft is read.
    #[instrument(skip(self, form), fields(resource = self.actions.resource_name(), form = form.key()))]
    pub async fn create<F: ResourceBinding>(&self, form: &ResourceForm<F>) -> Result<bool, ResourceError> {
        let body = Value::Object(form.submitted_changeset().await?);
        self.binding.dispatch(self.actions.create_start(None, None))?;
        match self.transport.create(body).await {
            Ok(body) => {
                debug!("Created");
                self.binding.dispatch(self.actions.create_success(body, None))?;
                form.reset()?;
                Ok(true)
            }
            Err(body) => {
                info!("Create failed");
                self.binding.dispatch(self.actions.create_failure(body, None))?;
                Ok(false)
            }
        }
    }

    /// Submits the draft of `form` as an update of `id` and resets the form on success.
    #[instrument(skip(self, form), fields(resource = self.actions.resource_name(), form = form.key()))]
    pub async fn update<F: ResourceBinding>(&self, id: &EntityId, form: &ResourceForm<F>) -> Result<bool, ResourceError> {
        let body = Value::Object(form.submitted_changeset().await?);
        self.binding.dispatch(self.actions.update_start(None, None))?;
        match self.transport.update(id, body).await {
            Ok(body) => {
                debug!("Updated");
                self.binding.dispatch(self.actions.update_success(body, None))?;
                form.reset()?;
                Ok(true)
            }
            Err(body) => {
                info!("Update failed");
                self.binding.dispatch(self.actions.update_failure(body, None))?;
                Ok(false)
            }
        }
    }

    /// Removes `id`. The success action carries the bare id.
    #[instrument(skip(self), fields(resource = self.actions.resource_name()))]
    pub async fn destroy(&self, id: &EntityId) -> Result<bool, ResourceError> {
        self.binding.dispatch(self.actions.destroy_start(None, None))?;
        match self.transport.destroy(id).await {
            Ok(_) => {
                debug!("Destroyed");
                self.binding.dispatch(self.actions.destroy_success(id.to_value(), None))?;
                Ok(true)
            }
            Err(body) => {
                info!("Destroy failed");
                self.binding.dispatch(self.actions.destroy_failure(body, None))?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{MockBinding, MockTransport};
    use crate::framework::{Operation, ResourceReducer};
    use crate::lifecycle::ResourceStore;
    use serde_json::json;

    fn setup() -> (ResourceActions, MockTransport, MockBinding) {
        (
            ResourceActions::new("notes").unwrap(),
            MockTransport::new(),
            MockBinding::with_reducer(ResourceReducer::new("notes").unwrap()),
        )
    }

    #[tokio::test]
    async fn test_fetch_dispatches_start_then_success() {
        let (actions, transport, binding) = setup();
        transport.expect_index().return_ok(json!([{ "id": 1, "text": "hi" }]));
        let client = ResourceClient::new(actions, transport, &binding);

        assert!(client.fetch().await.unwrap());
        assert_eq!(
            binding.dispatched_types(),
            vec!["NOTES/FETCH/START".to_string(), "NOTES/FETCH/SUCCESS".to_string()]
        );
        assert_eq!(binding.snapshot().len(), 1);
        client.transport().verify();
    }

    #[tokio::test]
    async fn test_create_failure_keeps_draft_and_records_errors() {
        let (actions, transport, binding) = setup();
        transport.expect_create().return_err(json!({ "text": "too long" }));
        let form = actions.resource_form("create", &binding);
        let client = ResourceClient::new(actions.clone(), transport, &binding);

        form.init().unwrap();
        form.field("text").set("way too long").unwrap();
        assert!(!client.create(&form).await.unwrap());

        assert_eq!(form.errors(Operation::Create), Some(json!({ "text": "too long" })));
        assert_eq!(form.field("text").value(), Some(json!("way too long")));
        assert_eq!(client.transport().bodies(), vec![json!({ "text": "way too long" })]);
    }

    #[tokio::test]
    async fn test_create_success_resets_form() {
        let (actions, transport, binding) = setup();
        transport.expect_create().return_ok(json!({ "id": 4, "text": "ok" }));
        let form = actions.resource_form("create", &binding);
        let client = ResourceClient::new(actions.clone(), transport, &binding);

        form.init().unwrap();
        form.field("text").set("ok").unwrap();
        assert!(client.create(&form).await.unwrap());

        let state = binding.snapshot();
        assert_eq!(state.get(&EntityId::from(4u64)), Some(&json!({ "id": 4, "text": "ok" })));
        assert!(form.changeset().is_empty());
        assert!(state.status(Operation::Create).is_idle());
    }

    #[tokio::test]
    async fn test_create_over_store_reads_queued_edits() {
        let actions = ResourceActions::new("notes").unwrap();
        let (_task, store) = ResourceStore::spawn(ResourceReducer::<Value>::new("notes").unwrap());
        let transport = MockTransport::new();
        transport.expect_create().return_ok(json!({ "id": 1, "text": "hello" }));
        let form = actions.resource_form("create", store.clone());
        let client = ResourceClient::new(actions, transport, store.clone());

        form.init().unwrap();
        form.field("text").set("hello").unwrap();
        assert!(client.create(&form).await.unwrap());

        assert_eq!(client.transport().bodies(), vec![json!({ "text": "hello" })]);
        store.flush().await.unwrap();
        assert_eq!(store.state().len(), 1);
        assert!(form.changeset().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_removes_entity() {
        let (actions, transport, binding) = setup();
        binding.dispatch(actions.fetch_success(json!([{ "id": 1 }, { "id": 2 }]), None)).unwrap();
        transport.expect_destroy(1u64).return_ok(json!(null));
        let client = ResourceClient::new(actions, transport, &binding);

        assert!(client.destroy(&EntityId::from(1u64)).await.unwrap());
        assert_eq!(binding.snapshot().results(), &[EntityId::from(2u64)]);
    }
}
