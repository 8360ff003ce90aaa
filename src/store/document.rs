//! Document-level operations shared by the store backends.
//!
//! A collection is a list of JSON objects kept in arrival order. All mutations
//! are validated against the typed item before they are applied, and batched
//! order writes check every id before touching anything.

use super::StoreError;
use crate::item::{OrderUpdate, Sequenced, ID_FIELD, ORDER_FIELD};
use crate::utils::now_iso;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Loosely typed document fields, as a document database accepts them
pub type Fields = serde_json::Map<String, Value>;

/// Document field holding the creation timestamp
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Document field holding the last update timestamp
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// The documents of one collection, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    #[serde(default)]
    pub documents: Vec<Fields>,
}

impl DocumentSet {
    /// Build a document set from typed items
    pub fn from_items<T: Serialize>(items: &[T]) -> Result<Self, StoreError> {
        let documents = items
            .iter()
            .map(|item| match serde_json::to_value(item)? {
                Value::Object(fields) => Ok(fields),
                _ => Err(StoreError::validation("items must serialize to objects")),
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(Self { documents })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.get(ID_FIELD).and_then(Value::as_str) == Some(id))
    }

    /// One past the largest order in the collection, 0 when nothing is ordered
    #[must_use]
    pub fn next_order(&self) -> u32 {
        self.documents
            .iter()
            .filter_map(stored_order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Add a new document built from `fields` and return it typed.
    ///
    /// Documents without an order would sort after the new one, so they are
    /// given orders first, in arrival order, and the new document goes after
    /// them.
    pub fn insert<T: Sequenced + DeserializeOwned>(&mut self, fields: Fields) -> Result<T, StoreError> {
        reject_reserved_fields(&fields)?;

        let unordered: Vec<usize> = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| stored_order(doc).is_none())
            .map(|(position, _)| position)
            .collect();
        let first_free = self.next_order();
        let append_at =
            first_free.saturating_add(u32::try_from(unordered.len()).unwrap_or(u32::MAX));

        let now = now_iso();
        let mut doc = fields;
        doc.insert(ID_FIELD.to_string(), Value::from(uuid::Uuid::new_v4().to_string()));
        doc.insert(ORDER_FIELD.to_string(), Value::from(append_at));
        doc.insert(CREATED_AT_FIELD.to_string(), Value::from(now.clone()));
        doc.insert(UPDATED_AT_FIELD.to_string(), Value::from(now.clone()));

        let item = decode::<T>(&doc)
            .map_err(|e| StoreError::validation(format!("invalid {} item: {e}", T::COLLECTION)))?;

        self.assign_orders(unordered, first_free, &now);
        self.documents.push(doc);
        Ok(item)
    }

    /// Merge `fields` into the document with the given id.
    pub fn patch<T: Sequenced + DeserializeOwned>(&mut self, id: &str, fields: Fields) -> Result<(), StoreError> {
        reject_reserved_fields(&fields)?;

        let position = self.position(id).ok_or_else(|| StoreError::not_found(id))?;
        let mut merged = self
            .documents
            .get(position)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))?;
        merged.extend(fields);
        merged.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_iso()));

        decode::<T>(&merged)
            .map_err(|e| StoreError::validation(format!("invalid {} item: {e}", T::COLLECTION)))?;

        if let Some(slot) = self.documents.get_mut(position) {
            *slot = merged;
        }
        Ok(())
    }

    /// Remove the document with the given id
    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let position = self.position(id).ok_or_else(|| StoreError::not_found(id))?;
        self.documents.remove(position);
        Ok(())
    }

    /// Apply order writes. Unknown ids fail the whole batch before anything
    /// is changed.
    ///
    /// Documents that no longer decode as `T` are invisible to whoever built
    /// the batch, so afterwards they are moved behind every decodable
    /// document to keep orders unique.
    pub fn apply_orders<T: DeserializeOwned>(&mut self, updates: &[OrderUpdate]) -> Result<(), StoreError> {
        let positions = updates
            .iter()
            .map(|update| {
                self.position(&update.id)
                    .map(|position| (position, update.order))
                    .ok_or_else(|| StoreError::not_found(update.id.clone()))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let now = now_iso();
        for (position, order) in positions {
            if let Some(doc) = self.documents.get_mut(position) {
                stamp_order(doc, order, &now);
            }
        }

        let (malformed, valid): (Vec<usize>, Vec<usize>) = (0..self.documents.len())
            .partition(|&position| {
                self.documents
                    .get(position)
                    .is_some_and(|doc| decode::<T>(doc).is_err())
            });
        if !malformed.is_empty() {
            let after_valid = valid
                .iter()
                .filter_map(|&position| self.documents.get(position).and_then(stored_order))
                .max()
                .map_or(0, |max| max.saturating_add(1));
            self.assign_orders(malformed, after_valid, &now);
        }
        Ok(())
    }

    /// Give the documents at `positions` consecutive orders from `first`
    fn assign_orders(&mut self, positions: Vec<usize>, first: u32, now: &str) {
        let mut order = first;
        for position in positions {
            if let Some(doc) = self.documents.get_mut(position) {
                stamp_order(doc, order, now);
                order = order.saturating_add(1);
            }
        }
    }

    /// Decode every document into `T`, skipping the ones that no longer fit.
    #[must_use]
    pub fn decode_all<T: Sequenced + DeserializeOwned>(&self) -> Vec<T> {
        self.documents
            .iter()
            .filter_map(|doc| match decode::<T>(doc) {
                Ok(item) => Some(item),
                Err(e) => {
                    let id = doc.get(ID_FIELD).and_then(Value::as_str).unwrap_or("<no id>");
                    warn!(collection = T::COLLECTION, id, "Skipping malformed document: {e}");
                    None
                }
            })
            .collect()
    }
}

/// The document's order, if it carries a usable one
fn stored_order(doc: &Fields) -> Option<u32> {
    doc.get(ORDER_FIELD)
        .and_then(Value::as_u64)
        .and_then(|order| u32::try_from(order).ok())
}

/// Order writes count as updates, like field patches do
fn stamp_order(doc: &mut Fields, order: u32, now: &str) {
    doc.insert(ORDER_FIELD.to_string(), Value::from(order));
    doc.insert(UPDATED_AT_FIELD.to_string(), Value::from(now));
}

fn decode<T: DeserializeOwned>(doc: &Fields) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(doc.clone()))
}

/// `id` and `order` are owned by the store and the reorder batch respectively
fn reject_reserved_fields(fields: &Fields) -> Result<(), StoreError> {
    for reserved in [ID_FIELD, ORDER_FIELD] {
        if fields.contains_key(reserved) {
            return Err(StoreError::validation(format!(
                "field '{reserved}' cannot be set directly"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
