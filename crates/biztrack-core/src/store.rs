//! # Entity Stores
//!
//! Ordered in-memory mirrors of server rows, one per entity type.
//!
//! ## Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set(items)      replace everything (after a fetch)                    │
//! │  add(item)       append; an existing id is replaced in place           │
//! │  update(id, x)   replace the row with that id; unknown id = no-op      │
//! │  remove(id)      drop the row; unknown id = no-op                      │
//! │                                                                         │
//! │  Last write wins by id. No versioning, no reconciliation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust
//! use biztrack_core::store::{Entity, EntityStore};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Row { id: String, n: i32 }
//! impl Entity for Row { fn id(&self) -> &str { &self.id } }
//!
//! let mut store = EntityStore::new();
//! store.add(Row { id: "a".into(), n: 1 });
//! store.update("zzz", Row { id: "zzz".into(), n: 9 }); // unknown id, ignored
//! store.remove("a");
//! store.remove("a"); // still fine
//! assert!(store.is_empty());
//! ```

use crate::types::*;

/// Anything with a stable string identifier.
pub trait Entity {
    fn id(&self) -> &str;
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_entity!(
    Business,
    Employee,
    Product,
    Supplier,
    Production,
    Delivery,
    Sale,
    SaleItem,
    Debt,
    DebtPayment,
    UserProfile,
);

/// An ordered collection of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore<T> {
    items: Vec<T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection.
    pub fn set(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Appends an item. If the id is already present the row is replaced
    /// where it stands.
    pub fn add(&mut self, item: T) {
        match self.position(item.id()) {
            Some(idx) => self.items[idx] = item,
            None => self.items.push(item),
        }
    }

    /// Replaces the row with this id. Returns `false` when no row
    /// matched, in which case the collection is untouched.
    pub fn update(&mut self, id: &str, item: T) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.items[idx] = item;
                true
            }
            None => false,
        }
    }

    /// Removes the row with this id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.position(id).map(|idx| self.items.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}
