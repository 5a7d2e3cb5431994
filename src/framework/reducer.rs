//! # Resource Reducer
//!
//! This module defines the [`ResourceReducer`], the pure state machine behind a
//! resource. It is the "server" half of the protocol: the action factory builds
//! records, the store feeds them here one at a time, and every call returns the next
//! state snapshot.
//!
//! ## Routing
//!
//! * Actions addressed to another resource return the input `Arc` untouched, which
//!   is what lets many reducers share one dispatch stream.
//! * `CHANGESET/*` edits the draft stored under `meta.form`.
//! * `STATUS/CLEAR` resets the status slice named by `meta.operation`.
//! * `<OPERATION>/START|SUCCESS|FAILURE` drives that operation's status and, on
//!   success, merges the payload into the normalized store.
//!
//! ## Totality
//!
//! `reduce` never fails. Malformed input (missing ids, edits to a form that was never
//! created, payloads that do not decode into `T`) is logged with `tracing` and leaves
//! the affected part of the state as it was.

use crate::framework::action::{Action, ActionKind, ActionMeta, ChangesetMethod, Operation, Phase};
use crate::framework::error::{wire_name, ResourceError};
use crate::framework::options::ReducerOptions;
use crate::framework::state::{Draft, Entity, EntityId, Resource, Status};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The reducer for one named resource.
///
/// # Immutability
/// State is shared as `Arc<Resource<T>>`. A transition clones the current value,
/// edits the clone and wraps it in a fresh `Arc`; snapshots already handed out to
/// readers never change. A no-op returns the same `Arc`, so callers can detect it
/// with [`Arc::ptr_eq`].
///
/// ```
/// use resource_store::framework::{ResourceActions, ResourceReducer};
/// use serde_json::json;
///
/// let actions = ResourceActions::new("notes").unwrap();
/// let reducer = ResourceReducer::<serde_json::Value>::new("notes").unwrap();
///
/// let state = reducer.reduce(None, &actions.fetch_start(None, None));
/// let state = reducer.reduce(Some(state), &actions.fetch_success(json!([{ "id": 1, "text": "hi" }]), None));
///
/// assert_eq!(state.results().len(), 1);
/// assert_eq!(state.status(resource_store::framework::Operation::Fetch).success, Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct ResourceReducer<T = Value> {
    name: String,
    options: ReducerOptions<T>,
}

/// Builds a reducer and returns it as a plain `(state, action) -> state` function.
pub fn create_resource_reducer<T: Entity>(
    resource_name: &str,
    options: ReducerOptions<T>,
) -> Result<impl Fn(Option<Arc<Resource<T>>>, &Action) -> Arc<Resource<T>>, ResourceError> {
    let reducer = ResourceReducer::with_options(resource_name, options)?;
    Ok(move |state: Option<Arc<Resource<T>>>, action: &Action| reducer.reduce(state, action))
}

impl<T: Entity> ResourceReducer<T> {
    /// Creates a reducer with default options.
    ///
    /// # Errors
    /// Fails when `resource_name` is empty or contains `/`.
    pub fn new(resource_name: &str) -> Result<Self, ResourceError> {
        Self::with_options(resource_name, ReducerOptions::default())
    }

    pub fn with_options(resource_name: &str, options: ReducerOptions<T>) -> Result<Self, ResourceError> {
        Ok(Self {
            name: wire_name(resource_name)?,
            options,
        })
    }

    /// Upper-cased resource name this reducer answers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ReducerOptions<T> {
        &self.options
    }

    pub fn initial_state(&self) -> Arc<Resource<T>> {
        Arc::new(Resource::new())
    }

    /// Applies one action. A missing state starts from [`Resource::new`].
    pub fn reduce(&self, state: Option<Arc<Resource<T>>>, action: &Action) -> Arc<Resource<T>> {
        let state = state.unwrap_or_else(|| self.initial_state());

        if action.action_type.resource() != self.name {
            return state;
        }

        match action.kind() {
            ActionKind::Changeset(method) => self.handle_changeset(state, method, action),
            ActionKind::StatusClear => self.handle_status_clear(state, action),
            ActionKind::Operation(operation, Phase::Start) => {
                let mut next = Resource::clone(&state);
                next.set_status(operation, Status::started(action.payload.clone()));
                debug!(resource = %self.name, %operation, "Started");
                Arc::new(next)
            }
            ActionKind::Operation(operation, Phase::Success) => self.handle_success(state, operation, action),
            ActionKind::Operation(operation, Phase::Failure) => {
                let payload = action
                    .payload
                    .clone()
                    .filter(is_truthy)
                    .map(|payload| (self.options.error_reducer)(operation, payload, action.meta.as_ref()));
                let mut next = Resource::clone(&state);
                next.set_status(operation, Status::failed(payload));
                debug!(resource = %self.name, %operation, "Failed");
                Arc::new(next)
            }
        }
    }

    fn handle_success(&self, state: Arc<Resource<T>>, operation: Operation, action: &Action) -> Arc<Resource<T>> {
        let Some(payload) = action.payload.clone().filter(is_truthy) else {
            debug!(resource = %self.name, %operation, "Success without payload ignored");
            return state;
        };

        let mut next = Resource::clone(&state);
        next.set_status(operation, Status::succeeded(payload.clone()));

        let data = (self.options.entity_reducer)(operation, payload, action.meta.as_ref());
        match operation {
            Operation::Destroy => self.destroy_in(&mut next, &data),
            _ => self.update_in(&mut next, data),
        }
        debug!(resource = %self.name, %operation, size = next.len(), "Succeeded");
        Arc::new(next)
    }

    fn update_in(&self, state: &mut Resource<T>, data: Value) {
        let id_attribute = self.options.id_attribute.as_str();
        let items = match data {
            Value::Array(items) => items,
            other => vec![other],
        };

        for item in items {
            let Some(id) = item.get(id_attribute).and_then(EntityId::from_value) else {
                warn!(resource = %self.name, id_attribute, "Missing id attribute, unable to add data to store");
                continue;
            };
            match serde_json::from_value::<T>(item) {
                Ok(entity) => state.upsert(id, entity, |prev, next| (self.options.on_update)(prev, next)),
                Err(e) => warn!(resource = %self.name, %id, error = %e, "Payload is not a valid entity"),
            }
        }
    }

    // The destroy payload is either an entity carrying the id attribute or the bare id.
    fn destroy_in(&self, state: &mut Resource<T>, data: &Value) {
        let id_attribute = self.options.id_attribute.as_str();
        let id = match data {
            Value::Object(fields) => fields.get(id_attribute).and_then(EntityId::from_value),
            scalar => EntityId::from_value(scalar),
        };
        let Some(id) = id else {
            warn!(resource = %self.name, id_attribute, "Missing id attribute, unable to remove data from store");
            return;
        };
        if state.remove(&id).is_none() {
            debug!(resource = %self.name, %id, "Destroyed entity was not in store");
        }
    }

    fn handle_changeset(&self, state: Arc<Resource<T>>, method: ChangesetMethod, action: &Action) -> Arc<Resource<T>> {
        let meta = action.meta.as_ref();
        let Some(form) = meta.and_then(|m| m.form.as_deref()) else {
            warn!(resource = %self.name, method = method.token(), "Changeset action without a form key");
            return state;
        };
        let field = meta.and_then(|m| m.field.as_deref());

        match method {
            ChangesetMethod::Create => {
                let draft = action
                    .payload
                    .as_ref()
                    .map(|payload| (self.options.changeset_reducer)(payload))
                    .and_then(into_draft)
                    .unwrap_or_default();
                let mut next = Resource::clone(&state);
                next.set_changeset(form, draft);
                debug!(resource = %self.name, form, "Changeset created");
                Arc::new(next)
            }
            ChangesetMethod::Update => {
                let current = match self.existing_form(&state, form) {
                    Some(draft) => draft.clone(),
                    None => return state,
                };
                let Some(field) = field else {
                    warn!(resource = %self.name, form, "Changeset update without a field");
                    return state;
                };
                let value = action.payload.clone().unwrap_or(Value::Null);
                let draft = (self.options.change_reducer)(current, field, value);
                let mut next = Resource::clone(&state);
                next.set_changeset(form, draft);
                Arc::new(next)
            }
            ChangesetMethod::Destroy => {
                if self.existing_form(&state, form).is_none() {
                    return state;
                }
                let mut next = Resource::clone(&state);
                match field {
                    Some(field) => {
                        if let Some(draft) = next.changeset_mut(form) {
                            draft.remove(field);
                        }
                    }
                    None => next.set_changeset(form, Draft::new()),
                }
                debug!(resource = %self.name, form, field = ?field, "Changeset destroyed");
                Arc::new(next)
            }
        }
    }

    fn existing_form<'a>(&self, state: &'a Resource<T>, form: &str) -> Option<&'a Draft> {
        let draft = state.changeset(form);
        if draft.is_none() {
            let existing: Vec<&str> = state.changesets().keys().map(String::as_str).collect();
            warn!(
                resource = %self.name,
                form,
                existing = ?existing,
                "Form is not set. Did you initialize the form?"
            );
        }
        draft
    }

    fn handle_status_clear(&self, state: Arc<Resource<T>>, action: &Action) -> Arc<Resource<T>> {
        let Some(operation) = action.meta.as_ref().and_then(|m: &ActionMeta| m.operation) else {
            warn!(resource = %self.name, "Status clear without a target operation");
            return state;
        };
        let mut next = Resource::clone(&state);
        next.set_status(operation, Status::default());
        debug!(resource = %self.name, %operation, "Status cleared");
        Arc::new(next)
    }
}

/// Mirrors the truthiness test a dynamic dispatcher would apply to a payload:
/// null, `false`, zero and the empty string are treated as absent. Empty arrays and
/// objects count as present, so an empty fetch still completes.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn into_draft(value: Value) -> Option<Draft> {
    match value {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::factory::ResourceActions;
    use serde_json::json;
    use std::collections::HashSet;

    fn setup() -> (ResourceActions, ResourceReducer) {
        (
            ResourceActions::new("notes").unwrap(),
            ResourceReducer::new("notes").unwrap(),
        )
    }

    fn assert_in_sync<T>(state: &Resource<T>) {
        let results: HashSet<&EntityId> = state.results().iter().collect();
        let keys: HashSet<&EntityId> = state.entities().keys().collect();
        assert_eq!(results.len(), state.results().len(), "duplicate ids in results");
        assert_eq!(results, keys);
    }

    #[test]
    fn test_empty_resource_name_fails() {
        assert!(matches!(
            ResourceReducer::<Value>::new(""),
            Err(ResourceError::MissingResourceName)
        ));
    }

    #[test]
    fn test_foreign_actions_return_same_state() {
        let (_, reducer) = setup();
        let users = ResourceActions::new("users").unwrap();
        let state = reducer.initial_state();

        let next = reducer.reduce(Some(state.clone()), &users.fetch_success(json!([{ "id": 1 }]), None));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_fetch_lifecycle() {
        let (actions, reducer) = setup();

        let state = reducer.reduce(None, &actions.fetch_start(None, None));
        assert_eq!(
            *state.status(Operation::Fetch),
            Status {
                pending: Some(true),
                busy: true,
                success: None,
                payload: None
            }
        );

        let state = reducer.reduce(Some(state), &actions.fetch_success(json!([{ "id": 1, "text": "hi" }]), None));
        assert_eq!(state.results(), &[EntityId::from(1u64)]);
        assert_eq!(state.get(&EntityId::from("1")), Some(&json!({ "id": 1, "text": "hi" })));
        let fetch = state.status(Operation::Fetch);
        assert_eq!(fetch.success, Some(true));
        assert_eq!(fetch.pending, Some(false));
        assert!(!fetch.busy);
    }

    #[test]
    fn test_failure_keeps_pending() {
        let (actions, reducer) = setup();

        let state = reducer.reduce(None, &actions.create_failure(json!({ "text": "too long" }), None));
        assert_eq!(
            *state.status(Operation::Create),
            Status {
                pending: Some(true),
                busy: false,
                success: Some(false),
                payload: Some(json!({ "text": "too long" }))
            }
        );
    }

    #[test]
    fn test_failure_without_payload_skips_error_reducer() {
        let (actions, _) = setup();
        let reducer = ResourceReducer::<Value>::with_options(
            "notes",
            ReducerOptions::new().with_error_reducer(|_, _, _| json!("reduced")),
        )
        .unwrap();

        let state = reducer.reduce(None, &actions.update_failure(None, None));
        assert_eq!(state.status(Operation::Update).payload, None);

        let state = reducer.reduce(Some(state), &actions.update_failure(json!({ "e": 1 }), None));
        assert_eq!(state.status(Operation::Update).payload, Some(json!("reduced")));
    }

    #[test]
    fn test_success_without_payload_is_ignored() {
        let (actions, reducer) = setup();
        let started = reducer.reduce(None, &actions.fetch_start(None, None));

        for payload in [None, Some(json!(null)), Some(json!(false)), Some(json!(""))] {
            let next = reducer.reduce(Some(started.clone()), &actions.fetch_success(payload, None));
            assert!(Arc::ptr_eq(&started, &next));
        }
    }

    #[test]
    fn test_empty_list_success_completes_fetch() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.fetch_success(json!([]), None));
        assert_eq!(state.status(Operation::Fetch).success, Some(true));
        assert!(state.is_empty());
    }

    #[test]
    fn test_merge_law_uses_on_update() {
        let (actions, _) = setup();
        let reducer = ResourceReducer::<Value>::with_options(
            "notes",
            ReducerOptions::new().with_on_update(crate::framework::options::shallow_merge),
        )
        .unwrap();

        let first = json!([{ "id": 1, "text": "hi" }, { "id": 2, "text": "yo" }]);
        let second = json!([{ "id": 1, "done": true }]);
        let state = reducer.reduce(None, &actions.fetch_success(first, None));
        let state = reducer.reduce(Some(state), &actions.fetch_success(second, None));

        assert_eq!(state.results(), &[EntityId::from("1"), EntityId::from("2")]);
        assert_eq!(
            state.get(&"1".into()),
            Some(&json!({ "id": 1, "text": "hi", "done": true }))
        );
        assert_in_sync(&state);
    }

    #[test]
    fn test_default_on_update_replaces() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.create_success(json!({ "id": "a", "x": 1 }), None));
        let state = reducer.reduce(Some(state), &actions.update_success(json!({ "id": "a", "y": 2 }), None));
        assert_eq!(state.results().len(), 1);
        assert_eq!(state.get(&"a".into()), Some(&json!({ "id": "a", "y": 2 })));
    }

    #[test]
    fn test_missing_id_is_skipped() {
        let (actions, reducer) = setup();
        let payload = json!([{ "text": "no id" }, { "id": 3, "text": "ok" }, { "id": "", "text": "empty" }]);
        let state = reducer.reduce(None, &actions.fetch_success(payload, None));

        assert_eq!(state.results(), &[EntityId::from("3")]);
        assert_eq!(state.status(Operation::Fetch).success, Some(true));
        assert_in_sync(&state);
    }

    #[test]
    fn test_destroy_law() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.create_success(json!({ "id": "7", "text": "a" }), None));
        let state = reducer.reduce(Some(state), &actions.update_success(json!({ "id": "7", "text": "b" }), None));
        let state = reducer.reduce(Some(state), &actions.destroy_success(json!({ "id": "7" }), None));

        assert!(!state.results().contains(&"7".into()));
        assert!(!state.contains(&"7".into()));
        assert_eq!(state.status(Operation::Destroy).success, Some(true));
    }

    #[test]
    fn test_destroy_accepts_bare_id() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.fetch_success(json!([{ "id": 1 }, { "id": 2 }]), None));
        let state = reducer.reduce(Some(state), &actions.destroy_success(json!(1), None));
        assert_eq!(state.results(), &[EntityId::from("2")]);
        assert_in_sync(&state);
    }

    #[test]
    fn test_custom_id_attribute_and_entity_reducer() {
        let (actions, _) = setup();
        let reducer = ResourceReducer::<Value>::with_options(
            "notes",
            ReducerOptions::new()
                .with_id_attribute("uuid")
                .with_entity_reducer(|_, payload, _| payload.get("data").cloned().unwrap_or(Value::Null)),
        )
        .unwrap();

        let payload = json!({ "data": [{ "uuid": "u-1" }, { "id": 5 }] });
        let state = reducer.reduce(None, &actions.fetch_success(payload, None));
        assert_eq!(state.results(), &[EntityId::from("u-1")]);
    }

    #[test]
    fn test_changeset_round_trip() {
        let (actions, reducer) = setup();
        let form = || ActionMeta::form("create");

        let state = reducer.reduce(None, &actions.changeset_create(json!({ "name": "a" }), form()));
        let state = reducer.reduce(Some(state), &actions.changeset_update(json!("b"), form().with_field("name")));
        assert_eq!(Value::Object(state.changeset("create").unwrap().clone()), json!({ "name": "b" }));

        let state = reducer.reduce(Some(state), &actions.changeset_destroy(None, form()));
        assert_eq!(state.changeset("create"), Some(&Draft::new()));
    }

    #[test]
    fn test_changeset_destroy_single_field() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.changeset_create(json!({ "a": 1, "b": 2 }), ActionMeta::form("f")));
        let state = reducer.reduce(Some(state), &actions.changeset_destroy(None, ActionMeta::form("f").with_field("a")));
        assert_eq!(Value::Object(state.changeset("f").unwrap().clone()), json!({ "b": 2 }));
    }

    #[test]
    fn test_changeset_on_missing_form_is_a_noop() {
        let (actions, reducer) = setup();
        let state = reducer.initial_state();

        let next = reducer.reduce(Some(state.clone()), &actions.changeset_update(json!("x"), ActionMeta::form("edit").with_field("name")));
        assert!(Arc::ptr_eq(&state, &next));
        assert!(next.changeset("edit").is_none());

        let next = reducer.reduce(Some(state.clone()), &actions.changeset_destroy(None, ActionMeta::form("edit")));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_changeset_create_without_object_payload_is_empty() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.changeset_create(None, ActionMeta::form("new")));
        assert_eq!(state.changeset("new"), Some(&Draft::new()));

        let state = reducer.reduce(Some(state), &actions.changeset_create(json!(42), ActionMeta::form("other")));
        assert_eq!(state.changeset("other"), Some(&Draft::new()));
    }

    #[test]
    fn test_custom_changeset_and_change_reducers() {
        let (actions, _) = setup();
        let reducer = ResourceReducer::<Value>::with_options(
            "notes",
            ReducerOptions::new()
                .with_changeset_reducer(|entity| json!({ "text": entity["text"], "dirty": false }))
                .with_change_reducer(|mut draft, field, value| {
                    draft.insert(field.to_string(), value);
                    draft.insert("dirty".to_string(), json!(true));
                    draft
                }),
        )
        .unwrap();

        let state = reducer.reduce(None, &actions.changeset_create(json!({ "id": 1, "text": "hi" }), ActionMeta::form("update")));
        assert_eq!(Value::Object(state.changeset("update").unwrap().clone()), json!({ "text": "hi", "dirty": false }));

        let state = reducer.reduce(Some(state), &actions.changeset_update(json!("ho"), ActionMeta::form("update").with_field("text")));
        assert_eq!(Value::Object(state.changeset("update").unwrap().clone()), json!({ "text": "ho", "dirty": true }));
    }

    #[test]
    fn test_status_clear_resets_named_slice() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.create_failure(json!({ "text": "too long" }), None));
        let state = reducer.reduce(Some(state), &actions.fetch_start(None, None));

        let state = reducer.reduce(Some(state), &actions.clear_status(Operation::Create));
        assert!(state.status(Operation::Create).is_idle());
        assert!(state.status(Operation::Fetch).busy);
    }

    #[test]
    fn test_status_clear_without_target_is_a_noop() {
        let (actions, reducer) = setup();
        let state = reducer.reduce(None, &actions.fetch_start(None, None));
        let next = reducer.reduce(Some(state.clone()), &actions.status_clear(None, None));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_transitions_do_not_touch_previous_snapshot() {
        let (actions, reducer) = setup();
        let before = reducer.reduce(None, &actions.fetch_success(json!([{ "id": 1 }]), None));
        let after = reducer.reduce(Some(before.clone()), &actions.fetch_success(json!([{ "id": 2 }]), None));

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_closure_form() {
        let actions = ResourceActions::new("notes").unwrap();
        let reduce = create_resource_reducer::<Value>("notes", ReducerOptions::default()).unwrap();
        let state = reduce(None, &actions.fetch_success(json!({ "id": 9 }), None));
        assert_eq!(state.results(), &[EntityId::from("9")]);
    }
}
