//! Common test utilities

#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use folio_sync::item::{OrderUpdate, Sequenced, Skill};
use folio_sync::ordering::sort_for_display;
use folio_sync::store::{Fields, MemoryStore, SequencedStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Build a JSON object from a `json!` literal
pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A skill whose name is its id upper-cased
pub fn skill(id: &str, order: Option<u32>) -> Skill {
    Skill {
        id: id.to_string(),
        order,
        name: id.to_uppercase(),
        icon_url: None,
        category: None,
        created_at: None,
        updated_at: None,
    }
}

/// The `[A(0), B(1), C(2)]` starting collection
pub fn abc() -> Vec<Skill> {
    vec![skill("a", Some(0)), skill("b", Some(1)), skill("c", Some(2))]
}

pub fn ids<T: Sequenced>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}

pub fn orders<T: Sequenced>(items: &[T]) -> Vec<Option<u32>> {
    items.iter().map(Sequenced::order).collect()
}

/// Memory store with scriptable failures and an optional gate that holds
/// order batches until the test releases them.
pub struct ScriptedStore<T> {
    inner: MemoryStore<T>,
    failing_batches: AtomicUsize,
    failing_lists: AtomicUsize,
    gate: Option<Semaphore>,
    batches: Mutex<Vec<Vec<OrderUpdate>>>,
}

impl<T: Sequenced + Serialize + DeserializeOwned> ScriptedStore<T> {
    pub fn new(items: &[T]) -> Self {
        Self::build(items, None)
    }

    /// Batches block until [`ScriptedStore::release`] hands out permits
    pub fn gated(items: &[T]) -> Self {
        Self::build(items, Some(Semaphore::new(0)))
    }

    fn build(items: &[T], gate: Option<Semaphore>) -> Self {
        Self {
            inner: MemoryStore::with_items(items).expect("seed items"),
            failing_batches: AtomicUsize::new(0),
            failing_lists: AtomicUsize::new(0),
            gate,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Let `count` held batches through
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Reject the next `count` order batches
    pub fn fail_next_batches(&self, count: usize) {
        self.failing_batches.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` list calls
    pub fn fail_next_lists(&self, count: usize) {
        self.failing_lists.store(count, Ordering::SeqCst);
    }

    /// Every batch that reached the store, in submission order
    pub fn submitted_batches(&self) -> Vec<Vec<OrderUpdate>> {
        self.batches.lock().expect("batches lock").clone()
    }

    /// The stored collection in display order
    pub async fn sorted_items(&self) -> Vec<T> {
        let mut items = self.inner.list_items().await.expect("list inner store");
        sort_for_display(&mut items);
        items
    }
}

#[allow(deprecated_in_future)]
fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl<T: Sequenced + Serialize + DeserializeOwned> SequencedStore<T> for ScriptedStore<T> {
    async fn create_item(&self, fields: Fields) -> Result<T, StoreError> {
        self.inner.create_item(fields).await
    }

    async fn update_item(&self, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.update_item(id, fields).await
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_item(id).await
    }

    async fn list_items(&self) -> Result<Vec<T>, StoreError> {
        if take(&self.failing_lists) {
            return Err(StoreError::Unavailable("injected list failure".to_string()));
        }
        self.inner.list_items().await
    }

    async fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), StoreError> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?
                .forget();
        }
        self.batches
            .lock()
            .expect("batches lock")
            .push(updates.to_vec());
        if take(&self.failing_batches) {
            return Err(StoreError::Unavailable("injected batch failure".to_string()));
        }
        self.inner.batch_update_order(updates).await
    }
}
