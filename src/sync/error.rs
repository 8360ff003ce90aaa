use crate::ordering::OrderError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors reported by the reorder engine. None of them are fatal.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Index {index} is out of range for a collection of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Stale index: item '{expected}' is no longer at position {index}")]
    StaleIndex { expected: String, index: usize },

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),

    #[error("Reorder discarded: it was derived from a view that has since been replaced")]
    Discarded,

    #[error("Sync worker is no longer running")]
    WorkerStopped,
}

impl From<OrderError> for SyncError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::IndexOutOfRange { index, len } => SyncError::IndexOutOfRange { index, len },
        }
    }
}
