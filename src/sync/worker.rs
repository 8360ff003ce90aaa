//! The single persistence task behind a reorder engine.
//!
//! Commands are drained strictly in the order they were queued, so batches
//! from the same engine reach the store one at a time and in issue order.

use super::error::SyncError;
use super::view::CollectionView;
use crate::item::{OrderUpdate, Sequenced};
use crate::ordering::sort_for_display;
use crate::store::SequencedStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub(super) type Reply = oneshot::Sender<Result<(), SyncError>>;

pub(super) struct PendingBatch {
    pub(super) updates: Vec<OrderUpdate>,
    /// Generation of the view the batch was derived from
    pub(super) generation: u64,
    pub(super) reply: Reply,
}

pub(super) enum Command {
    Reorder(PendingBatch),
    Reload(Reply),
}

pub(super) async fn run<T: Sequenced>(
    store: Arc<dyn SequencedStore<T>>,
    view: Arc<watch::Sender<CollectionView<T>>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Reorder(batch) => {
                let outcome = persist(store.as_ref(), &view, &batch.updates, batch.generation).await;
                respond(batch.reply, outcome);
            }
            Command::Reload(reply) => {
                let outcome = reload(store.as_ref(), &view).await;
                respond(reply, outcome);
            }
        }
    }
    debug!(collection = T::COLLECTION, "Command queue closed, sync worker exiting");
}

async fn persist<T: Sequenced>(
    store: &dyn SequencedStore<T>,
    view: &watch::Sender<CollectionView<T>>,
    updates: &[OrderUpdate],
    generation: u64,
) -> Result<(), SyncError> {
    let current = view.borrow().generation;
    if current != generation {
        view.send_modify(CollectionView::finish_batch);
        debug!(
            collection = T::COLLECTION,
            generation, current, "Dropping reorder derived from a replaced view"
        );
        return Err(SyncError::Discarded);
    }

    match store.batch_update_order(updates).await {
        Ok(()) => {
            view.send_modify(|v| {
                v.finish_batch();
                v.confirm(updates);
            });
            info!(
                collection = T::COLLECTION,
                updates = updates.len(),
                "Persisted reorder"
            );
            Ok(())
        }
        Err(e) => {
            warn!(collection = T::COLLECTION, "Reorder batch rejected, reloading: {e}");
            let fetched = match store.list_items().await {
                Ok(mut items) => {
                    sort_for_display(&mut items);
                    Some(items)
                }
                Err(reload_err) => {
                    warn!(
                        collection = T::COLLECTION,
                        "Reload failed, falling back to last confirmed state: {reload_err}"
                    );
                    None
                }
            };
            let message = e.to_string();
            view.send_modify(|v| {
                v.finish_batch();
                v.discard_optimistic(fetched, message);
            });
            Err(SyncError::PersistenceFailure(e))
        }
    }
}

async fn reload<T: Sequenced>(
    store: &dyn SequencedStore<T>,
    view: &watch::Sender<CollectionView<T>>,
) -> Result<(), SyncError> {
    let mut items = store.list_items().await?;
    sort_for_display(&mut items);
    let count = items.len();
    view.send_modify(|v| v.replace(items));
    info!(collection = T::COLLECTION, items = count, "Loaded collection");
    Ok(())
}

fn respond(reply: Reply, outcome: Result<(), SyncError>) {
    if reply.send(outcome).is_err() {
        debug!("Caller dropped its handle before the command completed");
    }
}
