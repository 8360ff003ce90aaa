use super::error::SyncError;
use super::view::CollectionView;
use super::worker::{self, Command, PendingBatch};
use crate::item::{OrderUpdate, Sequenced};
use crate::ordering::{changed_orders, is_normalized, move_item, with_normalized_order};
use crate::store::SequencedStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

/// A "move item from one position to another" gesture.
///
/// Produced by whatever handles pointer or keyboard dragging. `item_id` is the
/// item the gesture started on, which lets the engine notice that the
/// collection changed underneath the drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    pub item_id: String,
    pub from: usize,
    pub to: usize,
}

impl MoveEvent {
    #[must_use]
    pub fn new(item_id: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            item_id: item_id.into(),
            from,
            to,
        }
    }
}

/// Resolves when a reorder has been persisted or has failed.
///
/// Dropping the handle does not cancel anything; the batch still runs.
#[derive(Debug)]
pub struct ReorderHandle {
    receiver: Option<oneshot::Receiver<Result<(), SyncError>>>,
}

impl ReorderHandle {
    fn ready() -> Self {
        Self { receiver: None }
    }

    /// True when the move changed nothing and no batch was queued
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.receiver.is_none()
    }

    /// Wait for the store's verdict on this reorder.
    pub async fn wait(self) -> Result<(), SyncError> {
        match self.receiver {
            None => Ok(()),
            Some(receiver) => receiver.await.map_err(|_| SyncError::WorkerStopped)?,
        }
    }
}

/// Optimistic reordering of one collection, persisted in FIFO batches.
///
/// The visible state changes the moment `reorder` returns. Persistence runs on
/// a background task that submits one batch at a time; when the store rejects
/// a batch the engine re-reads the collection and replaces the visible state
/// with it.
pub struct ReorderEngine<T: Sequenced> {
    view: Arc<watch::Sender<CollectionView<T>>>,
    commands: mpsc::UnboundedSender<Command>,
}

impl<T: Sequenced> ReorderEngine<T> {
    /// Spawn the persistence worker for `store`.
    ///
    /// Must be called from within a Tokio runtime. The view starts empty; call
    /// [`ReorderEngine::refresh`] to load the collection.
    #[must_use]
    pub fn start(store: Arc<dyn SequencedStore<T>>) -> Self {
        let (sender, _) = watch::channel(CollectionView::empty());
        let view = Arc::new(sender);
        let (commands, queue) = mpsc::unbounded_channel();
        tokio::spawn(worker::run(store, Arc::clone(&view), queue));
        Self { view, commands }
    }

    /// Load the collection from the store, replacing the visible state.
    ///
    /// Runs behind any batch already queued. Reorders issued while the reload
    /// is pending were derived from the state it replaces and are discarded.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Reload(reply))
            .map_err(|_| SyncError::WorkerStopped)?;
        outcome.await.map_err(|_| SyncError::WorkerStopped)?
    }

    /// Move the item at `from` to `to` using the current visible state.
    pub fn reorder(&self, from: usize, to: usize) -> Result<ReorderHandle, SyncError> {
        self.submit(from, to, None)
    }

    /// Like [`ReorderEngine::reorder`], but fails with
    /// [`SyncError::StaleIndex`] unless the item at `from` is the one the
    /// gesture started on.
    pub fn apply_move(&self, event: &MoveEvent) -> Result<ReorderHandle, SyncError> {
        self.submit(event.from, event.to, Some(&event.item_id))
    }

    /// Copy of the current view
    #[must_use]
    pub fn snapshot(&self) -> CollectionView<T> {
        self.view.borrow().clone()
    }

    /// Copy of the visible items
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.view.borrow().items().to_vec()
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.view.borrow().is_syncing()
    }

    /// Receiver notified on every visible change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionView<T>> {
        self.view.subscribe()
    }

    /// Wait until no reorder batch is queued or in flight.
    pub async fn settled(&self) -> Result<(), SyncError> {
        let mut receiver = self.view.subscribe();
        receiver
            .wait_for(|view| !view.is_syncing())
            .await
            .map(|_| ())
            .map_err(|_| SyncError::WorkerStopped)
    }

    fn submit(&self, from: usize, to: usize, expected: Option<&str>) -> Result<ReorderHandle, SyncError> {
        let mut outcome = Ok(ReorderHandle::ready());

        // Planning, queueing and the optimistic swap happen under one write so
        // the batch and the visible state cannot drift apart.
        self.view.send_if_modified(|view| {
            let planned = match plan_reorder(&view.items, from, to, expected) {
                Ok(Some(planned)) => planned,
                Ok(None) => return false,
                Err(e) => {
                    outcome = Err(e);
                    return false;
                }
            };

            let (reply, receiver) = oneshot::channel();
            let batch = PendingBatch {
                updates: planned.updates,
                generation: view.generation,
                reply,
            };
            if self.commands.send(Command::Reorder(batch)).is_err() {
                outcome = Err(SyncError::WorkerStopped);
                return false;
            }

            debug!(
                collection = T::COLLECTION,
                from,
                to,
                generation = view.generation,
                "Queued reorder"
            );
            view.items = planned.items;
            view.pending = view.pending.saturating_add(1);
            outcome = Ok(ReorderHandle {
                receiver: Some(receiver),
            });
            true
        });

        outcome
    }
}

struct PlannedReorder<T> {
    items: Vec<T>,
    updates: Vec<OrderUpdate>,
}

/// Compute the optimistic state and the batch for a move, or `None` when the
/// move changes nothing.
fn plan_reorder<T: Sequenced>(
    items: &[T],
    from: usize,
    to: usize,
    expected: Option<&str>,
) -> Result<Option<PlannedReorder<T>>, SyncError> {
    if let Some(expected) = expected {
        if items.get(from).map(Sequenced::id) != Some(expected) {
            return Err(SyncError::StaleIndex {
                expected: expected.to_string(),
                index: from,
            });
        }
    }

    let moved = move_item(items, from, to)?;
    if from == to {
        return Ok(None);
    }

    let reordered = with_normalized_order(&moved);
    debug_assert!(is_normalized(&reordered));
    let updates = changed_orders(items, &reordered);
    if updates.is_empty() {
        return Ok(None);
    }

    Ok(Some(PlannedReorder {
        items: reordered,
        updates,
    }))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
