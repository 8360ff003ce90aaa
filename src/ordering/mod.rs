//! Local ordered list model.
//!
//! Pure functions over in-memory sequences. Nothing here talks to a store;
//! the sync engine composes these to compute an optimistic state and the
//! batch that makes the store agree with it.

use crate::item::{OrderUpdate, Sequenced};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from local list operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Index {index} is out of range for a collection of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Move the element at `from` so it ends up at position `to`.
///
/// Both indices must be inside `[0, len)` of the input. Moving an element onto
/// its own position returns an unchanged copy.
pub fn move_item<T: Clone>(sequence: &[T], from: usize, to: usize) -> Result<Vec<T>, OrderError> {
    let len = sequence.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderError::IndexOutOfRange { index, len });
        }
    }

    let mut moved = sequence.to_vec();
    if from == to {
        return Ok(moved);
    }

    let item = moved.remove(from);
    // After the removal the valid insertion range is [0, len - 1]
    let target = to.min(moved.len());
    moved.insert(target, item);
    Ok(moved)
}

/// Copy of `sequence` where every element's order equals its position.
#[must_use]
pub fn with_normalized_order<T: Sequenced>(sequence: &[T]) -> Vec<T> {
    sequence
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let mut item = item.clone();
            item.set_order(u32::try_from(position).unwrap_or(u32::MAX));
            item
        })
        .collect()
}

/// Sort freshly loaded items into display order.
///
/// Items with an order ascend by it. Items without one go after all ordered
/// items. The sort is stable, so arrival order breaks every tie.
pub fn sort_for_display<T: Sequenced>(items: &mut [T]) {
    items.sort_by_key(|item| (item.order().is_none(), item.order()));
}

/// Order writes needed to turn `before` into `after`.
///
/// An entry is produced for every item of `after` whose order differs from the
/// same item's order in `before`, including items `before` does not contain.
#[must_use]
pub fn changed_orders<T: Sequenced>(before: &[T], after: &[T]) -> Vec<OrderUpdate> {
    let previous: HashMap<&str, Option<u32>> =
        before.iter().map(|item| (item.id(), item.order())).collect();

    after
        .iter()
        .filter_map(|item| {
            let order = item.order()?;
            match previous.get(item.id()) {
                Some(Some(old)) if *old == order => None,
                _ => Some(OrderUpdate::new(item.id(), order)),
            }
        })
        .collect()
}

/// Whether `items` carries orders `0..n-1` in sequence.
#[must_use]
pub fn is_normalized<T: Sequenced>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(position, item)| item.order().and_then(|o| usize::try_from(o).ok()) == Some(position))
}
