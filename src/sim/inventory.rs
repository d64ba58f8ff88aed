//! Item counts keyed by item id. One id is always in stock and never decremented.

use std::collections::BTreeMap;

use crate::sim::types::FoodItem;

/// Item id that is always available regardless of stored count.
pub const UNLIMITED_ITEM: &str = "vegetables";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut items = BTreeMap::new();
        items.insert(FoodItem::Burger.id().to_string(), 2);
        items.insert(FoodItem::IceCream.id().to_string(), 2);
        items.insert(FoodItem::PremiumNutrients.id().to_string(), 1);
        items.insert(FoodItem::SpecialTreat.id().to_string(), 1);
        Self { items }
    }
}

impl Inventory {
    pub fn empty() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    pub fn from_counts(items: BTreeMap<String, u32>) -> Self {
        let mut items = items;
        items.retain(|id, count| !id.trim().is_empty() && *count > 0);
        Self { items }
    }

    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.items
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        if item_id == UNLIMITED_ITEM {
            return u32::MAX;
        }
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 || item_id == UNLIMITED_ITEM {
            return;
        }
        let entry = self.items.entry(item_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Take one unit. Returns false when the item is out of stock.
    pub fn consume(&mut self, item_id: &str) -> bool {
        if item_id == UNLIMITED_ITEM {
            return true;
        }
        match self.items.get_mut(item_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.items.remove(item_id);
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_until_empty() {
        let mut inv = Inventory::empty();
        inv.add("burger", 2);
        assert!(inv.consume("burger"));
        assert!(inv.consume("burger"));
        assert!(!inv.consume("burger"));
        assert!(!inv.counts().contains_key("burger"));
    }

    #[test]
    fn unlimited_item_never_runs_out() {
        let mut inv = Inventory::empty();
        for _ in 0..50 {
            assert!(inv.consume(UNLIMITED_ITEM));
        }
        assert_eq!(inv.quantity(UNLIMITED_ITEM), u32::MAX);
        assert!(inv.counts().is_empty());
    }

    #[test]
    fn from_counts_drops_empty_entries() {
        let mut raw = BTreeMap::new();
        raw.insert("ice_cream".to_string(), 0);
        raw.insert("special_treat".to_string(), 3);
        raw.insert("  ".to_string(), 4);
        let inv = Inventory::from_counts(raw);
        assert_eq!(inv.counts().len(), 1);
        assert_eq!(inv.quantity("special_treat"), 3);
    }
}
