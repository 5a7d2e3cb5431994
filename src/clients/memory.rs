//! # In-Memory Transport
//!
//! A process-memory stand-in for a REST backend. Records get sequential numeric ids
//! (starting at 1) under the `"id"` attribute and are listed in creation order.
//! Optional length limits on string fields produce failure bodies of the form
//! `{ "<field>": "too long" }`, enough to drive the error paths of a form.

use crate::clients::transport::{Transport, TransportResult};
use crate::framework::EntityId;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Default)]
struct Records {
    rows: BTreeMap<u64, Map<String, Value>>,
    next_id: u64,
}

/// In-memory [`Transport`].
#[derive(Default)]
pub struct InMemoryTransport {
    records: Mutex<Records>,
    limits: Vec<(String, usize)>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects creates and updates whose `field` is a string longer than `max` chars.
    pub fn with_max_len(mut self, field: impl Into<String>, max: usize) -> Self {
        self.limits.push((field.into(), max));
        self
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate(&self, body: Value) -> Result<Map<String, Value>, Value> {
        let Value::Object(fields) = body else {
            return Err(json!({ "base": "expected an object" }));
        };
        let mut errors = Map::new();
        for (field, max) in &self.limits {
            if let Some(Value::String(text)) = fields.get(field) {
                if text.chars().count() > *max {
                    errors.insert(field.clone(), json!("too long"));
                }
            }
        }
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(Value::Object(errors))
        }
    }

    fn row_id(id: &EntityId) -> Result<u64, Value> {
        id.as_str()
            .parse()
            .map_err(|_| json!({ "base": format!("not found: {id}") }))
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn index(&self) -> TransportResult {
        let records = self.lock();
        debug!(size = records.rows.len(), "Index");
        Ok(Value::Array(records.rows.values().cloned().map(Value::Object).collect()))
    }

    async fn create(&self, body: Value) -> TransportResult {
        let mut fields = self.validate(body).inspect_err(|errors| warn!(?errors, "Create rejected"))?;
        let mut records = self.lock();
        records.next_id += 1;
        let id = records.next_id;
        fields.insert("id".to_string(), json!(id));
        records.rows.insert(id, fields.clone());
        info!(id, size = records.rows.len(), "Created");
        Ok(Value::Object(fields))
    }

    async fn update(&self, id: &EntityId, body: Value) -> TransportResult {
        let row_id = Self::row_id(id)?;
        let changes = self.validate(body).inspect_err(|errors| warn!(%id, ?errors, "Update rejected"))?;
        let mut records = self.lock();
        let Some(row) = records.rows.get_mut(&row_id) else {
            warn!(%id, "Not found");
            return Err(json!({ "base": format!("not found: {id}") }));
        };
        row.extend(changes);
        row.insert("id".to_string(), json!(row_id));
        info!(%id, "Updated");
        Ok(Value::Object(row.clone()))
    }

    async fn destroy(&self, id: &EntityId) -> TransportResult {
        let row_id = Self::row_id(id)?;
        let mut records = self.lock();
        match records.rows.remove(&row_id) {
            Some(row) => {
                info!(%id, size = records.rows.len(), "Deleted");
                Ok(Value::Object(row))
            }
            None => {
                warn!(%id, "Not found");
                Err(json!({ "base": format!("not found: {id}") }))
            }
        }
    }
}
