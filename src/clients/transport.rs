//! # Transport Seam
//!
//! The network side of a resource is not part of this crate. [`Transport`] is the
//! contract a [`ResourceClient`](crate::clients::ResourceClient) needs from it: four
//! requests, each resolving to the response body or to the failure body the server
//! sent back. Failure bodies end up in `status.<op>.payload` and from there in
//! [`ResourceForm::errors`](crate::framework::ResourceForm::errors).

use crate::framework::EntityId;
use async_trait::async_trait;
use serde_json::Value;

/// `Ok` carries the response body, `Err` the failure body.
pub type TransportResult = Result<Value, Value>;

/// Requests a resource client can issue.
#[async_trait]
pub trait Transport: Send + Sync {
    /// List the collection. The body is an entity or an array of entities.
    async fn index(&self) -> TransportResult;

    /// Create an entity from a draft. The body is the stored entity.
    async fn create(&self, body: Value) -> TransportResult;

    /// Update an entity from a draft. The body is the stored entity.
    async fn update(&self, id: &EntityId, body: Value) -> TransportResult;

    /// Remove an entity.
    async fn destroy(&self, id: &EntityId) -> TransportResult;
}
