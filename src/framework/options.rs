//! # Reducer Options
//!
//! Every hook the reducer calls is a field of [`ReducerOptions`] with a default that
//! reproduces the plain behavior: read ids from `"id"`, replace on update, use
//! entities as drafts, assign one field per edit, and store payloads untouched.
//! Override only what you need with the `with_*` builder methods.

use crate::framework::action::{ActionMeta, Operation};
use crate::framework::state::{Draft, Entity};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Merge strategy applied when an id already exists: `(previous, incoming) -> stored`.
pub type OnUpdate<T> = Arc<dyn Fn(Option<&T>, T) -> T + Send + Sync>;

/// Turns an entity payload into its draft representation on `CHANGESET/CREATE`.
/// A result that is not a JSON object yields an empty draft.
pub type ChangesetReducer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Applies one field edit to a draft: `(draft, field, value) -> draft`.
pub type ChangeReducer = Arc<dyn Fn(Draft, &str, Value) -> Draft + Send + Sync>;

/// Transforms a success or failure payload before it is stored.
pub type PayloadReducer = Arc<dyn Fn(Operation, Value, Option<&ActionMeta>) -> Value + Send + Sync>;

/// Configuration of a [`ResourceReducer`](crate::framework::ResourceReducer).
pub struct ReducerOptions<T = Value> {
    pub(crate) id_attribute: String,
    pub(crate) singleton: bool,
    pub(crate) on_update: OnUpdate<T>,
    pub(crate) changeset_reducer: ChangesetReducer,
    pub(crate) change_reducer: ChangeReducer,
    pub(crate) entity_reducer: PayloadReducer,
    pub(crate) error_reducer: PayloadReducer,
}

impl<T: Entity> Default for ReducerOptions<T> {
    fn default() -> Self {
        Self {
            id_attribute: "id".to_string(),
            singleton: false,
            on_update: Arc::new(|_: Option<&T>, next: T| next),
            changeset_reducer: Arc::new(|resource: &Value| resource.clone()),
            change_reducer: Arc::new(|mut form: Draft, field: &str, value: Value| {
                form.insert(field.to_string(), value);
                form
            }),
            entity_reducer: Arc::new(|_: Operation, payload: Value, _: Option<&ActionMeta>| payload),
            error_reducer: Arc::new(|_: Operation, payload: Value, _: Option<&ActionMeta>| payload),
        }
    }
}

impl<T> Clone for ReducerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            id_attribute: self.id_attribute.clone(),
            singleton: self.singleton,
            on_update: Arc::clone(&self.on_update),
            changeset_reducer: Arc::clone(&self.changeset_reducer),
            change_reducer: Arc::clone(&self.change_reducer),
            entity_reducer: Arc::clone(&self.entity_reducer),
            error_reducer: Arc::clone(&self.error_reducer),
        }
    }
}

impl<T> fmt::Debug for ReducerOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerOptions")
            .field("id_attribute", &self.id_attribute)
            .field("singleton", &self.singleton)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> ReducerOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field read off each entity to obtain its identifier.
    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = id_attribute.into();
        self
    }

    /// Marks the resource as holding a single entity. Recorded only; the reducer
    /// treats singleton resources like any other.
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn with_on_update(mut self, f: impl Fn(Option<&T>, T) -> T + Send + Sync + 'static) -> Self {
        self.on_update = Arc::new(f);
        self
    }

    pub fn with_changeset_reducer(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.changeset_reducer = Arc::new(f);
        self
    }

    pub fn with_change_reducer(mut self, f: impl Fn(Draft, &str, Value) -> Draft + Send + Sync + 'static) -> Self {
        self.change_reducer = Arc::new(f);
        self
    }

    pub fn with_entity_reducer(
        mut self,
        f: impl Fn(Operation, Value, Option<&ActionMeta>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.entity_reducer = Arc::new(f);
        self
    }

    pub fn with_error_reducer(
        mut self,
        f: impl Fn(Operation, Value, Option<&ActionMeta>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.error_reducer = Arc::new(f);
        self
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }
}

/// Shallow merge for JSON entities: fields of `next` overwrite those of `prev`,
/// fields only present in `prev` survive. Non-object values are replaced.
///
/// ```
/// use resource_store::framework::{shallow_merge, ReducerOptions};
/// use serde_json::json;
///
/// let options = ReducerOptions::<serde_json::Value>::new().with_on_update(shallow_merge);
/// # let _ = options;
/// assert_eq!(
///     shallow_merge(Some(&json!({ "id": 1, "a": 1 })), json!({ "id": 1, "b": 2 })),
///     json!({ "id": 1, "a": 1, "b": 2 })
/// );
/// ```
pub fn shallow_merge(prev: Option<&Value>, next: Value) -> Value {
    match (prev, next) {
        (Some(Value::Object(prev)), Value::Object(next)) => {
            let mut merged = prev.clone();
            merged.extend(next);
            Value::Object(merged)
        }
        (_, next) => next,
    }
}
