//! Optimistic reordering of portfolio collections with batched, serialized
//! persistence.
//!
//! [`sync::ReorderEngine`] owns the visible order of one collection, applies
//! moves immediately, and persists them through a [`store::SequencedStore`]
//! one batch at a time.

// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod item;
pub mod ordering;
pub mod store;
pub mod sync;
pub mod user_config;
pub mod utils;

// Re-export commonly used types
pub use item::{CollectionKind, OrderUpdate, Project, Sequenced, Skill, SocialLink};
pub use ordering::{move_item, with_normalized_order, OrderError};
pub use store::{Fields, JsonFileStore, MemoryStore, SequencedStore, StoreError};
pub use sync::{CollectionView, MoveEvent, ReorderEngine, ReorderHandle, SyncError};
pub use user_config::{load_user_config, resolve_data_dir, UserConfig, UserConfigError};
