//! In-process store with the same contract as the file store.

use super::document::{DocumentSet, Fields};
use super::{SequencedStore, StoreError};
use crate::item::{OrderUpdate, Sequenced};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tokio::sync::Mutex;

/// Store that keeps a collection's documents in memory.
pub struct MemoryStore<T> {
    documents: Mutex<DocumentSet>,
    _item: PhantomData<fn() -> T>,
}

impl<T: Sequenced> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_documents(DocumentSet::default())
    }

    /// Seed the store with raw documents, e.g. legacy data without orders
    #[must_use]
    pub fn from_documents(documents: DocumentSet) -> Self {
        Self {
            documents: Mutex::new(documents),
            _item: PhantomData,
        }
    }

    /// Seed the store with typed items, kept in the given arrival order
    pub fn with_items(items: &[T]) -> Result<Self, StoreError>
    where
        T: Serialize,
    {
        Ok(Self::from_documents(DocumentSet::from_items(items)?))
    }

    /// Copy of the raw documents currently held
    pub async fn documents(&self) -> DocumentSet {
        self.documents.lock().await.clone()
    }
}

impl<T: Sequenced> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Sequenced + DeserializeOwned> SequencedStore<T> for MemoryStore<T> {
    async fn create_item(&self, fields: Fields) -> Result<T, StoreError> {
        self.documents.lock().await.insert(fields)
    }

    async fn update_item(&self, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.documents.lock().await.patch::<T>(id, fields)
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.documents.lock().await.remove(id)
    }

    async fn list_items(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.documents.lock().await.decode_all())
    }

    async fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), StoreError> {
        self.documents.lock().await.apply_orders::<T>(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SocialLink;
    use serde_json::json;

    fn link_fields(platform: &str) -> Fields {
        match json!({ "platform": platform, "url": format!("https://{platform}.com/me") }) {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store: MemoryStore<SocialLink> = MemoryStore::new();
        let github = store.create_item(link_fields("github")).await.unwrap();
        let mastodon = store.create_item(link_fields("mastodon")).await.unwrap();

        assert_eq!(github.order, Some(0));
        assert_eq!(mastodon.order, Some(1));

        store.delete_item(&github.id).await.unwrap();
        let remaining = store.list_items().await.unwrap();
        assert_eq!(remaining, vec![mastodon]);
    }

    #[tokio::test]
    async fn test_batch_with_unknown_id_changes_nothing() {
        let store: MemoryStore<SocialLink> = MemoryStore::new();
        let github = store.create_item(link_fields("github")).await.unwrap();
        let before = store.documents().await;

        let result = store
            .batch_update_order(&[
                OrderUpdate::new(github.id.clone(), 5),
                OrderUpdate::new("ghost", 0),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.documents().await, before);
    }

    #[tokio::test]
    async fn test_with_items_keeps_arrival_order() {
        let links = vec![
            SocialLink {
                id: "b".to_string(),
                order: Some(1),
                platform: "github".to_string(),
                url: "https://github.com/me".to_string(),
                icon_url: None,
                created_at: None,
                updated_at: None,
            },
            SocialLink {
                id: "a".to_string(),
                order: Some(0),
                platform: "mastodon".to_string(),
                url: "https://mastodon.social/@me".to_string(),
                icon_url: None,
                created_at: None,
                updated_at: None,
            },
        ];

        let store = MemoryStore::with_items(&links).unwrap();
        assert_eq!(store.list_items().await.unwrap(), links);
    }
}
