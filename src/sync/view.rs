//! Observable collection state owned by the reorder engine.

use crate::item::{OrderUpdate, Sequenced};
use crate::ordering::sort_for_display;

/// What a UI renders for one collection.
///
/// `items` is the optimistic state: it already reflects every reorder the
/// caller issued, persisted or not. `confirmed` trails behind it and only
/// advances when the store acknowledges a batch.
#[derive(Debug, Clone)]
pub struct CollectionView<T> {
    pub(super) items: Vec<T>,
    pub(super) confirmed: Vec<T>,
    pub(super) pending: usize,
    pub(super) generation: u64,
    pub(super) last_error: Option<String>,
    pub(super) loaded: bool,
}

impl<T> CollectionView<T> {
    pub(super) fn empty() -> Self {
        Self {
            items: Vec::new(),
            confirmed: Vec::new(),
            pending: 0,
            generation: 0,
            last_error: None,
            loaded: false,
        }
    }

    /// Items in display order
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// True while at least one reorder batch is queued or in flight
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.pending > 0
    }

    /// Number of reorder batches not yet resolved
    #[must_use]
    pub fn pending_batches(&self) -> usize {
        self.pending
    }

    /// Message of the most recent persistence failure, cleared by the next
    /// successful batch or reload
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the collection has been fetched from the store at least once
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(super) fn finish_batch(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

impl<T: Sequenced> CollectionView<T> {
    /// Replace everything with a freshly fetched collection.
    pub(super) fn replace(&mut self, items: Vec<T>) {
        self.items.clone_from(&items);
        self.confirmed = items;
        self.generation = self.generation.wrapping_add(1);
        self.last_error = None;
        self.loaded = true;
    }

    /// Record that the store accepted `updates`.
    pub(super) fn confirm(&mut self, updates: &[OrderUpdate]) {
        for update in updates {
            if let Some(item) = self.confirmed.iter_mut().find(|item| item.id() == update.id) {
                item.set_order(update.order);
            }
        }
        sort_for_display(&mut self.confirmed);
        self.last_error = None;
    }

    /// Throw away optimistic state after a failed batch.
    ///
    /// `fetched` is the collection re-read from the store; without it the view
    /// falls back to the last confirmed state. Either way the generation moves
    /// on so batches built from the discarded state are never submitted.
    pub(super) fn discard_optimistic(&mut self, fetched: Option<Vec<T>>, error: String) {
        match fetched {
            Some(items) => {
                self.items.clone_from(&items);
                self.confirmed = items;
            }
            None => self.items.clone_from(&self.confirmed),
        }
        self.generation = self.generation.wrapping_add(1);
        self.last_error = Some(error);
    }
}
