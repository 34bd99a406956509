use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Inventory {
    pub items: BTreeMap<String, u32>,
    pub equipped: BTreeSet<String>,
}

/// An ingredient the user does not hold enough of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub item: String,
    pub have: u32,
    pub need: u32,
}

impl Inventory {
    pub fn quantity(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: &str, quantity: u32) {
        *self.items.entry(item.to_string()).or_insert(0) += quantity;
    }

    /// Removes `quantity` of `item`, dropping the entry (and its equipped flag) at zero.
    pub fn remove(&mut self, item: &str, quantity: u32) -> bool {
        let Some(held) = self.items.get_mut(item) else {
            return false;
        };
        if *held < quantity {
            return false;
        }
        *held -= quantity;
        if *held == 0 {
            self.items.remove(item);
            self.equipped.remove(item);
        }
        true
    }

    pub fn shortfalls(&self, needed: &BTreeMap<String, u32>) -> Vec<Shortfall> {
        needed
            .iter()
            .filter_map(|(item, &need)| {
                let have = self.quantity(item);
                (have < need).then(|| Shortfall {
                    item: item.clone(),
                    have,
                    need,
                })
            })
            .collect()
    }

    pub fn equip(&mut self, item: &str) -> bool {
        if self.quantity(item) == 0 {
            return false;
        }
        self.equipped.insert(item.to_string());
        true
    }

    pub fn unequip(&mut self, item: &str) -> bool {
        self.equipped.remove(item)
    }

    pub fn is_equipped(&self, item: &str) -> bool {
        self.equipped.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_empty_entries_and_equipment() {
        let mut inv = Inventory::default();
        inv.add("anel_ganancia", 1);
        assert!(inv.equip("anel_ganancia"));
        assert!(!inv.remove("anel_ganancia", 2));
        assert!(inv.remove("anel_ganancia", 1));
        assert!(inv.items.is_empty());
        assert!(!inv.is_equipped("anel_ganancia"));
    }

    #[test]
    fn cannot_equip_unowned_item() {
        let mut inv = Inventory::default();
        assert!(!inv.equip("amuleto_exilio"));
        assert!(!inv.unequip("amuleto_exilio"));
    }

    #[test]
    fn shortfalls_lists_only_missing() {
        let mut inv = Inventory::default();
        inv.add("lingote_sombrio", 1);
        inv.add("fragmento_alma", 5);
        let needed = BTreeMap::from([
            ("lingote_sombrio".to_string(), 2),
            ("fragmento_alma".to_string(), 3),
            ("cristal_abissal".to_string(), 1),
        ]);
        let missing = inv.shortfalls(&needed);
        assert_eq!(missing.len(), 2);
        assert_eq!(
            missing[0],
            Shortfall {
                item: "cristal_abissal".into(),
                have: 0,
                need: 1
            }
        );
        assert_eq!(missing[1].item, "lingote_sombrio");
    }
}
