//! # Resource State
//!
//! The normalized state owned by the store and evolved by the reducer.
//!
//! Entities live in an id-keyed map while `results` keeps the first-seen order.
//! The two always hold the same set of ids: the only way to change either is through
//! the crate-private `upsert` and `remove`, which update both together.

use crate::framework::action::Operation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug};
use std::ops::Index;

/// Trait that any entity type must satisfy to be stored in a [`Resource`].
///
/// Payloads travel as JSON values; entities are decoded from them on merge, so
/// anything serde can round-trip qualifies. `serde_json::Value` is the default.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Entity for T where T: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

// 2^53: beyond this floats stop being exact integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Identifier of an entity, read off the payload through the id attribute.
///
/// Numeric ids are kept as their decimal text, so `1` and `"1"` address the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an id from a JSON scalar. Null, booleans, zero, empty strings and
    /// containers are not ids. Whole floats normalize to integer text (`1.0` is `1`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => {
                let text = if let Some(u) = n.as_u64() {
                    u.to_string()
                } else if let Some(i) = n.as_i64() {
                    i.to_string()
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => (f as i64).to_string(),
                        _ => n.to_string(),
                    }
                };
                (text != "0").then_some(Self(text))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// A draft: field name to value, a partial entity under edit.
pub type Draft = Map<String, Value>;

/// Lifecycle record of one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub pending: Option<bool>,
    pub busy: bool,
    pub success: Option<bool>,
    pub payload: Option<Value>,
}

impl Status {
    pub(crate) fn started(payload: Option<Value>) -> Self {
        Self {
            pending: Some(true),
            busy: true,
            success: None,
            payload,
        }
    }

    pub(crate) fn succeeded(payload: Value) -> Self {
        Self {
            pending: Some(false),
            busy: false,
            success: Some(true),
            payload: Some(payload),
        }
    }

    // `pending` stays set after a failure: the user is still trying.
    pub(crate) fn failed(payload: Option<Value>) -> Self {
        Self {
            pending: Some(true),
            busy: false,
            success: Some(false),
            payload,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_failed(&self) -> bool {
        self.success == Some(false)
    }

    /// The failure payload, present only when the last attempt failed.
    pub fn errors(&self) -> Option<&Value> {
        if self.is_failed() {
            self.payload.as_ref()
        } else {
            None
        }
    }
}

/// The four status slices. Always fully populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMap {
    pub fetch: Status,
    pub create: Status,
    pub update: Status,
    pub destroy: Status,
}

impl StatusMap {
    pub fn get(&self, operation: Operation) -> &Status {
        match operation {
            Operation::Fetch => &self.fetch,
            Operation::Create => &self.create,
            Operation::Update => &self.update,
            Operation::Destroy => &self.destroy,
        }
    }

    fn get_mut(&mut self, operation: Operation) -> &mut Status {
        match operation {
            Operation::Fetch => &mut self.fetch,
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Destroy => &mut self.destroy,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &Status)> {
        Operation::ALL.into_iter().map(move |op| (op, self.get(op)))
    }
}

impl Index<Operation> for StatusMap {
    type Output = Status;

    fn index(&self, operation: Operation) -> &Status {
        self.get(operation)
    }
}

/// State of one named resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T = Value> {
    results: Vec<EntityId>,
    entities: HashMap<EntityId, T>,
    meta: Map<String, Value>,
    changeset: BTreeMap<String, Draft>,
    status: StatusMap,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            entities: HashMap::new(),
            meta: Map::new(),
            changeset: BTreeMap::new(),
            status: StatusMap::default(),
        }
    }
}

impl<T> Resource<T> {
    /// Empty state: no entities, no drafts, every status slice idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids in first-seen order.
    pub fn results(&self) -> &[EntityId] {
        &self.results
    }

    pub fn entities(&self) -> &HashMap<EntityId, T> {
        &self.entities
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Entities in `results` order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.results.iter().filter_map(|id| self.entities.get(id))
    }

    /// Re-materializes the ordered entity list for rendering.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn status(&self, operation: Operation) -> &Status {
        self.status.get(operation)
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.status
    }

    pub fn changeset(&self, form: &str) -> Option<&Draft> {
        self.changeset.get(form)
    }

    pub fn changesets(&self) -> &BTreeMap<String, Draft> {
        &self.changeset
    }

    pub(crate) fn set_status(&mut self, operation: Operation, status: Status) {
        *self.status.get_mut(operation) = status;
    }

    /// Inserts or merges an entity, appending its id on first sight.
    pub(crate) fn upsert(&mut self, id: EntityId, entity: T, on_update: impl FnOnce(Option<&T>, T) -> T) {
        let merged = on_update(self.entities.get(&id), entity);
        if !self.entities.contains_key(&id) {
            self.results.push(id.clone());
        }
        self.entities.insert(id, merged);
    }

    /// Removes an entity and the first matching id in `results`.
    pub(crate) fn remove(&mut self, id: &EntityId) -> Option<T> {
        if let Some(idx) = self.results.iter().position(|r| r == id) {
            self.results.remove(idx);
        }
        self.entities.remove(id)
    }

    pub(crate) fn set_changeset(&mut self, form: &str, draft: Draft) {
        self.changeset.insert(form.to_string(), draft);
    }

    pub(crate) fn changeset_mut(&mut self, form: &str) -> Option<&mut Draft> {
        self.changeset.get_mut(form)
    }
}
