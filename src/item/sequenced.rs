//! The ordering contract every stored collection item satisfies.

use serde::{Deserialize, Serialize};

/// Document field holding the store-assigned identifier
pub const ID_FIELD: &str = "id";

/// Document field holding the item's position marker
pub const ORDER_FIELD: &str = "order";

/// An item that lives in an ordered collection.
///
/// `order` is optional because documents written before ordering existed do
/// not carry it. Such items sort after every ordered item until the first
/// reorder normalizes the collection.
pub trait Sequenced: Clone + Send + Sync + 'static {
    /// Name of the collection this item type is stored in
    const COLLECTION: &'static str;

    /// Store-assigned identifier, never reassigned
    fn id(&self) -> &str;

    /// Position marker, if the document has one
    fn order(&self) -> Option<u32>;

    /// Overwrite the position marker
    fn set_order(&mut self, order: u32);
}

/// A single field-level order write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: String,
    pub order: u32,
}

impl OrderUpdate {
    #[must_use]
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

impl std::fmt::Display for OrderUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.order)
    }
}
