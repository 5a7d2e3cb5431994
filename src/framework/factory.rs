//! # Action Factory
//!
//! [`ResourceActions`] produces the action records a [`ResourceReducer`] with the same
//! resource name understands. Every creator is a pure constructor: it returns an
//! [`Action`] and dispatches nothing. Hand the action to a store (or use the
//! [`ResourceForm`] helper, which dispatches through a [`ResourceBinding`]).
//!
//! The creator methods are generated, one per operation and phase:
//!
//! | operation | creators |
//! |---|---|
//! | fetch | `fetch_start`, `fetch_success`, `fetch_failure` |
//! | create | `create_start`, `create_success`, `create_failure` |
//! | update | `update_start`, `update_success`, `update_failure` |
//! | destroy | `destroy_start`, `destroy_success`, `destroy_failure` |
//!
//! plus `changeset_create`, `changeset_update`, `changeset_destroy` and `status_clear`.
//! All take `(payload, meta)`; both arguments accept `None`.
//!
//! [`ResourceReducer`]: crate::framework::ResourceReducer

use crate::framework::action::{Action, ActionKind, ActionMeta, ActionType, ChangesetMethod, Operation, Phase};
use crate::framework::error::{wire_name, ResourceError};
use crate::framework::form::{ResourceBinding, ResourceForm};
use serde_json::Value;

macro_rules! operation_creators {
    ($($op:ident => $variant:ident, $token:literal);* $(;)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Builds a `<RESOURCE>/", $token, "/START` action.")]
                pub fn [<$op _start>](
                    &self,
                    payload: impl Into<Option<Value>>,
                    meta: impl Into<Option<ActionMeta>>,
                ) -> Action {
                    self.action(ActionKind::Operation(Operation::$variant, Phase::Start), payload, meta)
                }

                #[doc = concat!("Builds a `<RESOURCE>/", $token, "/SUCCESS` action.")]
                pub fn [<$op _success>](
                    &self,
                    payload: impl Into<Option<Value>>,
                    meta: impl Into<Option<ActionMeta>>,
                ) -> Action {
                    self.action(ActionKind::Operation(Operation::$variant, Phase::Success), payload, meta)
                }

                #[doc = concat!("Builds a `<RESOURCE>/", $token, "/FAILURE` action (`error` is set).")]
                pub fn [<$op _failure>](
                    &self,
                    payload: impl Into<Option<Value>>,
                    meta: impl Into<Option<ActionMeta>>,
                ) -> Action {
                    self.action(ActionKind::Operation(Operation::$variant, Phase::Failure), payload, meta)
                }
            )*
        }
    };
}

macro_rules! changeset_creators {
    ($($method:ident => $variant:ident, $token:literal);* $(;)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Builds a `<RESOURCE>/CHANGESET/", $token, "` action. The form key and field go in `meta`.")]
                pub fn [<changeset_ $method>](
                    &self,
                    payload: impl Into<Option<Value>>,
                    meta: impl Into<Option<ActionMeta>>,
                ) -> Action {
                    self.action(ActionKind::Changeset(ChangesetMethod::$variant), payload, meta)
                }
            )*
        }
    };
}

/// The action creators of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceActions {
    resource_name: String,
    wire_name: String,
}

/// Builds the action creators for `resource_name`.
pub fn create_resource_actions(resource_name: &str) -> Result<ResourceActions, ResourceError> {
    ResourceActions::new(resource_name)
}

impl ResourceActions {
    /// # Errors
    /// Fails when `resource_name` is empty or contains `/`.
    pub fn new(resource_name: &str) -> Result<Self, ResourceError> {
        Ok(Self {
            wire_name: wire_name(resource_name)?,
            resource_name: resource_name.to_string(),
        })
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn action_type(&self, kind: ActionKind) -> ActionType {
        ActionType::from_wire_name(&self.wire_name, kind)
    }

    /// Generic creator behind all the named ones.
    pub fn action(
        &self,
        kind: ActionKind,
        payload: impl Into<Option<Value>>,
        meta: impl Into<Option<ActionMeta>>,
    ) -> Action {
        Action::new(self.action_type(kind), payload.into(), meta.into())
    }

    operation_creators! {
        fetch => Fetch, "FETCH";
        create => Create, "CREATE";
        update => Update, "UPDATE";
        destroy => Destroy, "DESTROY";
    }

    changeset_creators! {
        create => Create, "CREATE";
        update => Update, "UPDATE";
        destroy => Destroy, "DESTROY";
    }

    /// Builds a `<RESOURCE>/STATUS/CLEAR` action. The reducer clears the slice named
    /// by `meta.operation`; see [`ResourceActions::clear_status`].
    pub fn status_clear(&self, payload: impl Into<Option<Value>>, meta: impl Into<Option<ActionMeta>>) -> Action {
        self.action(ActionKind::StatusClear, payload, meta)
    }

    /// `STATUS/CLEAR` targeting `operation`.
    pub fn clear_status(&self, operation: Operation) -> Action {
        self.status_clear(None, ActionMeta::operation(operation))
    }

    /// Every action type this resource produces, in declaration order.
    pub fn action_types(&self) -> Vec<ActionType> {
        let operations = Operation::ALL.into_iter().flat_map(|op| {
            [Phase::Start, Phase::Success, Phase::Failure]
                .into_iter()
                .map(move |phase| ActionKind::Operation(op, phase))
        });
        let changesets = [ChangesetMethod::Create, ChangesetMethod::Update, ChangesetMethod::Destroy]
            .into_iter()
            .map(ActionKind::Changeset);

        operations
            .chain(changesets)
            .chain(std::iter::once(ActionKind::StatusClear))
            .map(|kind| self.action_type(kind))
            .collect()
    }

    /// Form helper for the draft stored under `form_key`, dispatching through `binding`.
    pub fn resource_form<B: ResourceBinding>(&self, form_key: impl Into<String>, binding: B) -> ResourceForm<B> {
        ResourceForm::new(self.clone(), form_key.into(), binding)
    }
}
