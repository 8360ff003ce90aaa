//! Reorder synchronization engine.
//!
//! A reorder is applied to the visible collection immediately, then the order
//! writes it implies are queued as one batch for the store:
//!
//! ```text
//! MoveEvent ──▶ move_item ──▶ with_normalized_order ──▶ visible state (optimistic)
//!                                       │
//!                                 changed_orders
//!                                       ▼
//!                        FIFO worker ──▶ batch_update_order
//!                                       │
//!                  ok: confirm ◀────────┴────────▶ err: re-fetch, replace, report
//! ```
//!
//! Only one batch per engine is ever in flight. A later reorder builds on the
//! earlier one's optimistic state and is persisted after it. When a batch
//! fails, anything queued behind it was derived from state that no longer
//! exists and is dropped with [`SyncError::Discarded`].
//!
//! Edits from other clients are not reconciled; the store's last writer wins.

mod engine;
mod error;
mod view;
mod worker;

pub use engine::{MoveEvent, ReorderEngine, ReorderHandle};
pub use error::SyncError;
pub use view::CollectionView;
