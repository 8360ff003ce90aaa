//! Sequenced item store.
//!
//! The persistence boundary of the sync engine. A store is bound to one
//! collection and speaks in loosely typed documents on the way in
//! ([`Fields`]) and typed items on the way out; validation happens here so
//! nothing downstream handles untyped maps.
//!
//! Every call is a single attempt. Retrying is the caller's business.

mod document;
mod json_file;
mod memory;

use crate::item::{OrderUpdate, Sequenced};
use async_trait::async_trait;
use thiserror::Error;

pub use document::{DocumentSet, Fields, CREATED_AT_FIELD, UPDATED_AT_FIELD};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors surfaced by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a not found error
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound(id.into())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::ValidationError(msg.into())
    }
}

/// Persistence operations for one ordered collection.
#[async_trait]
pub trait SequencedStore<T: Sequenced>: Send + Sync {
    /// Create an item from domain fields. The store assigns `id` and puts the
    /// item at the append position.
    async fn create_item(&self, fields: Fields) -> Result<T, StoreError>;

    /// Merge domain fields into an existing item
    async fn update_item(&self, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Remove an item. Remaining orders are left as they are.
    async fn delete_item(&self, id: &str) -> Result<(), StoreError>;

    /// All items of the collection, in arrival order
    async fn list_items(&self) -> Result<Vec<T>, StoreError>;

    /// Apply every order write or none of them
    async fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), StoreError>;
}
