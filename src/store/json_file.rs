//! JSON-file backed store: one `<collection>.json` file per collection.
//!
//! Every mutation is a read-modify-write of the whole file under a per-store
//! lock, landed with an atomic rename. A batch of order writes is therefore
//! visible either completely or not at all.

use super::document::{DocumentSet, Fields};
use super::{SequencedStore, StoreError};
use crate::item::{OrderUpdate, Sequenced};
use crate::utils::atomic_write;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Store that keeps a collection in `<data_dir>/<collection>.json`.
pub struct JsonFileStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _item: PhantomData<fn() -> T>,
}

impl<T: Sequenced> JsonFileStore<T> {
    /// Open the store for `T`'s collection inside `data_dir`.
    ///
    /// Nothing is touched on disk until the first write; a missing file reads
    /// as an empty collection.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", T::COLLECTION)),
            write_lock: Mutex::new(()),
            _item: PhantomData,
        }
    }

    /// Path of the collection file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_set(&self) -> Result<DocumentSet, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DocumentSet::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_set(&self, set: &DocumentSet) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(set)?;
        atomic_write(&self.path, &content).await?;
        debug!(
            collection = T::COLLECTION,
            documents = set.documents.len(),
            "Wrote {}",
            self.path.display()
        );
        Ok(())
    }

    /// Read the file, apply `change`, and write it back if `change` succeeded.
    async fn mutate<R, F>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut DocumentSet) -> Result<R, StoreError> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut set = self.read_set().await?;
        let result = change(&mut set)?;
        self.write_set(&set).await?;
        Ok(result)
    }
}

#[async_trait]
impl<T: Sequenced + DeserializeOwned> SequencedStore<T> for JsonFileStore<T> {
    async fn create_item(&self, fields: Fields) -> Result<T, StoreError> {
        let item = self.mutate(|set| set.insert::<T>(fields)).await?;
        info!(collection = T::COLLECTION, "Created item: {}", item.id());
        Ok(item)
    }

    async fn update_item(&self, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.mutate(|set| set.patch::<T>(id, fields)).await?;
        info!(collection = T::COLLECTION, "Updated item: {}", id);
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|set| set.remove(id)).await?;
        info!(collection = T::COLLECTION, "Deleted item: {}", id);
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.read_set().await?.decode_all())
    }

    async fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        self.mutate(|set| set.apply_orders::<T>(updates)).await?;
        debug!(
            collection = T::COLLECTION,
            updates = updates.len(),
            "Applied order batch"
        );
        Ok(())
    }
}
