//! # Changeset Forms
//!
//! A [`ResourceForm`] is the glue between a UI form and the draft stored under one
//! form key. Reads come from the latest state snapshot; writes are dispatched as
//! `CHANGESET` actions through a [`ResourceBinding`], the seam to whatever store
//! owns the state (see [`StoreHandle`](crate::lifecycle::StoreHandle) and
//! [`MockBinding`](crate::framework::mock::MockBinding)).
//!
//! Form keys are arbitrary. When a key names an operation (`"create"`, `"update"`)
//! the form also clears that operation's status slice on [`ResourceForm::reset`];
//! use [`ResourceForm::for_operation`] to pick the slice explicitly.

use crate::framework::action::{ActionMeta, Operation};
use crate::framework::error::ResourceError;
use crate::framework::factory::ResourceActions;
use crate::framework::state::{Draft, Entity, Resource};
use crate::framework::Action;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Connection between the form helper and the store that owns a resource.
#[async_trait]
pub trait ResourceBinding: Send + Sync {
    type Entity: Entity;

    /// Queues an action for the store's reducer.
    fn dispatch(&self, action: Action) -> Result<(), ResourceError>;

    /// Latest state snapshot.
    fn snapshot(&self) -> Arc<Resource<Self::Entity>>;

    /// Resolves once every action dispatched so far is visible in [`snapshot`](Self::snapshot).
    /// Bindings that apply actions synchronously keep the default.
    async fn settle(&self) -> Result<(), ResourceError> {
        Ok(())
    }
}

#[async_trait]
impl<B: ResourceBinding + ?Sized> ResourceBinding for &B {
    type Entity = B::Entity;

    fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        (**self).dispatch(action)
    }

    fn snapshot(&self) -> Arc<Resource<Self::Entity>> {
        (**self).snapshot()
    }

    async fn settle(&self) -> Result<(), ResourceError> {
        (**self).settle().await
    }
}

/// Form helper bound to one changeset key.
#[derive(Debug, Clone)]
pub struct ResourceForm<B> {
    actions: ResourceActions,
    form_key: String,
    operation: Option<Operation>,
    binding: B,
}

impl<B: ResourceBinding> ResourceForm<B> {
    pub(crate) fn new(actions: ResourceActions, form_key: String, binding: B) -> Self {
        let operation = form_key.parse().ok();
        Self {
            actions,
            form_key,
            operation,
            binding,
        }
    }

    /// Sets the operation whose status slice [`reset`](Self::reset) clears.
    pub fn for_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn key(&self) -> &str {
        &self.form_key
    }

    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    fn meta(&self) -> ActionMeta {
        ActionMeta::form(self.form_key.clone())
    }

    /// Binding for one field of the draft.
    pub fn field(&self, name: impl Into<String>) -> FieldBinding<'_, B> {
        FieldBinding {
            form: self,
            name: name.into(),
        }
    }

    /// Starts an empty draft.
    pub fn init(&self) -> Result<(), ResourceError> {
        self.binding.dispatch(self.actions.changeset_create(None, self.meta()))
    }

    /// Seeds the draft from an existing entity (edit mode).
    pub fn set(&self, entity: &B::Entity) -> Result<(), ResourceError> {
        let payload = serde_json::to_value(entity)?;
        self.binding.dispatch(self.actions.changeset_create(payload, self.meta()))
    }

    /// Discards the draft and clears the form's status slice.
    pub fn clear(&self) -> Result<(), ResourceError> {
        self.binding.dispatch(self.actions.changeset_destroy(None, self.meta()))?;
        if let Some(operation) = self.operation {
            self.binding.dispatch(self.actions.clear_status(operation))?;
        }
        debug!(resource = self.actions.resource_name(), form = %self.form_key, "Form cleared");
        Ok(())
    }

    /// Same as [`clear`](Self::clear); called after a successful submission.
    pub fn reset(&self) -> Result<(), ResourceError> {
        self.clear()
    }

    /// Failure payload of `operation`, if its last attempt failed.
    pub fn errors(&self, operation: Operation) -> Option<Value> {
        self.binding.snapshot().status(operation).errors().cloned()
    }

    /// Snapshot of the draft; empty when the form was never created.
    ///
    /// Reads the published state. Await [`submitted_changeset`](Self::submitted_changeset)
    /// to include edits still queued in the store.
    pub fn changeset(&self) -> Draft {
        self.binding
            .snapshot()
            .changeset(&self.form_key)
            .cloned()
            .unwrap_or_default()
    }

    /// The draft after every queued edit has been applied: what the user typed.
    pub async fn submitted_changeset(&self) -> Result<Draft, ResourceError> {
        self.binding.settle().await?;
        Ok(self.changeset())
    }

    /// True once the draft exists in the store.
    pub fn is_initialized(&self) -> bool {
        self.binding.snapshot().changeset(&self.form_key).is_some()
    }
}

/// A single field of a [`ResourceForm`]: current value plus setter.
pub struct FieldBinding<'a, B> {
    form: &'a ResourceForm<B>,
    name: String,
}

impl<B: ResourceBinding> FieldBinding<'_, B> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<Value> {
        self.form
            .binding
            .snapshot()
            .changeset(&self.form.form_key)
            .and_then(|draft| draft.get(&self.name).cloned())
    }

    /// Dispatches `CHANGESET/UPDATE` for this field.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), ResourceError> {
        let meta = self.form.meta().with_field(self.name.clone());
        self.form
            .binding
            .dispatch(self.form.actions.changeset_update(value.into(), meta))
    }

    /// Dispatches `CHANGESET/DESTROY` for this field only.
    pub fn clear(&self) -> Result<(), ResourceError> {
        let meta = self.form.meta().with_field(self.name.clone());
        self.form
            .binding
            .dispatch(self.form.actions.changeset_destroy(None, meta))
    }
}
