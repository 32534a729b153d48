//! The player's item collection.
//!
//! Lookups are by case-insensitive name. Duplicate ids are permitted, since
//! distinct rooms may each define an item called "key", and removal always
//! takes the first match. Inventories hold tens of items at most, so every
//! operation is a linear walk over a `Vec`.

use crate::world::types::{normalize_id, Item};

/// Ordered collection of the items a player carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Duplicate ids are allowed.
    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_first(name).is_some()
    }

    /// Number of held items matching `name`.
    pub fn count(&self, name: &str) -> usize {
        let target = normalize_id(name);
        self.items.iter().filter(|item| item.id == target).count()
    }

    pub fn find_first(&self, name: &str) -> Option<&Item> {
        let target = normalize_id(name);
        self.items.iter().find(|item| item.id == target)
    }

    /// Remove and return the first item matching `name`.
    pub fn take(&mut self, name: &str) -> Option<Item> {
        let target = normalize_id(name);
        let index = self.items.iter().position(|item| item.id == target)?;
        Some(self.items.remove(index))
    }

    /// Items in acquisition order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for Inventory {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
