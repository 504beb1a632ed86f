//! Item inventory with declared capacity and type rules.
//!
//! Every mutator validates the resulting contents before committing, so an
//! inventory never holds more than `quantity_allowed` items in total nor an
//! item whose kind is outside `allowed_types`.

use crate::rules::InventoryError;

/// A stack of items sharing one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryEntry {
    pub key: String,
    /// Item type checked against [`InventoryRules::allowed_types`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: String,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub quantity: u32,
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

impl InventoryEntry {
    pub fn new(key: impl Into<String>, kind: impl Into<String>, quantity: u32) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
            quantity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InventoryRules {
    /// Total quantity across all entries. `None` is unbounded.
    pub quantity_allowed: Option<u32>,
    /// Accepted item kinds. Empty accepts any kind.
    pub allowed_types: Vec<String>,
}

impl InventoryRules {
    fn admits(&self, kind: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == kind)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Inventory {
    items: Vec<InventoryEntry>,
    rules: InventoryRules,
}

impl Inventory {
    /// Builds an inventory, rejecting contents that already break the rules.
    pub fn with_items(
        rules: InventoryRules,
        items: Vec<InventoryEntry>,
    ) -> Result<Self, InventoryError> {
        let inventory = Self { items, rules };
        inventory.validate(&inventory.items)?;
        Ok(inventory)
    }

    pub fn rules(&self) -> &InventoryRules {
        &self.rules
    }

    pub fn items(&self) -> &[InventoryEntry] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&InventoryEntry> {
        self.items.iter().find(|entry| entry.key == key)
    }

    /// Quantity held under `key`, zero when absent.
    pub fn quantity_of(&self, key: &str) -> u32 {
        self.get(key).map_or(0, |entry| entry.quantity)
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|entry| u64::from(entry.quantity)).sum()
    }

    /// Stacks onto an existing entry with the same key or appends a new one.
    pub fn add(&mut self, entry: InventoryEntry) -> Result<(), InventoryError> {
        let mut next = self.items.clone();
        match next.iter_mut().find(|existing| existing.key == entry.key) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(entry.quantity);
                if !entry.kind.is_empty() {
                    existing.kind = entry.kind;
                }
            }
            None => next.push(entry),
        }
        self.commit(next)
    }

    /// Replaces the entry with the same key, appending when absent.
    pub fn set(&mut self, entry: InventoryEntry) -> Result<(), InventoryError> {
        let mut next = self.items.clone();
        match next.iter_mut().find(|existing| existing.key == entry.key) {
            Some(existing) => *existing = entry,
            None => next.push(entry),
        }
        self.commit(next)
    }

    /// Removes the entry with `key`. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<InventoryEntry> {
        let index = self.items.iter().position(|entry| entry.key == key)?;
        Some(self.items.remove(index))
    }

    fn commit(&mut self, next: Vec<InventoryEntry>) -> Result<(), InventoryError> {
        self.validate(&next)?;
        self.items = next;
        Ok(())
    }

    fn validate(&self, items: &[InventoryEntry]) -> Result<(), InventoryError> {
        if let Some(entry) = items.iter().find(|entry| !self.rules.admits(&entry.kind)) {
            return Err(InventoryError::TypeNotAllowed {
                item: entry.key.clone(),
                kind: entry.kind.clone(),
            });
        }
        if let Some(allowed) = self.rules.quantity_allowed {
            let total: u64 = items.iter().map(|entry| u64::from(entry.quantity)).sum();
            if total > u64::from(allowed) {
                return Err(InventoryError::Capacity {
                    requested: total,
                    allowed,
                });
            }
        }
        Ok(())
    }
}
