use rand::Rng;

use super::EconomyError;
use crate::store::catalog::{Catalog, ItemDef, LootDrop, Recipe};
use crate::store::inventory::Inventory;
use crate::store::user::UserRecord;

/// Percent of an item's rarity-adjusted value paid back when selling.
const SELL_RATE_PCT: u64 = 70;

#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub item: ItemDef,
    pub quantity: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub item: ItemDef,
    pub quantity: u32,
    pub unit_price: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForgeOutcome {
    Success(ItemDef),
    Failure(ItemDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootboxOpening {
    pub souls: u64,
    pub drop: Option<LootDrop>,
}

fn check_quantity(quantity: u32) -> Result<(), EconomyError> {
    if quantity == 0 {
        return Err(EconomyError::InvalidQuantity);
    }
    Ok(())
}

pub fn buy_price(catalog: &Catalog, item: &ItemDef) -> u64 {
    catalog.price(item)
}

pub fn sell_price(catalog: &Catalog, item: &ItemDef) -> u64 {
    item.value * catalog.rarity_multiplier(item.rarity) * SELL_RATE_PCT / 10_000
}

pub fn buy(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    catalog: &Catalog,
    item_id: &str,
    quantity: u32,
) -> Result<Purchase, EconomyError> {
    check_quantity(quantity)?;
    let item = catalog
        .shop
        .get(item_id)
        .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;

    let total = buy_price(catalog, &item.def) * quantity as u64;
    if !user.spend_souls(total) {
        return Err(EconomyError::InsufficientSouls {
            have: user.souls,
            need: total,
        });
    }
    inventory.add(item_id, quantity);

    Ok(Purchase {
        item: item.def.clone(),
        quantity,
        total,
    })
}

pub fn sell(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    catalog: &Catalog,
    item_id: &str,
    quantity: u32,
) -> Result<Sale, EconomyError> {
    check_quantity(quantity)?;
    let item = catalog
        .find_item(item_id)
        .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;
    if !inventory.remove(item_id, quantity) {
        return Err(EconomyError::NotEnoughItems { quantity });
    }

    let unit_price = sell_price(catalog, item);
    let total = unit_price * quantity as u64;
    user.add_souls(total);

    Ok(Sale {
        item: item.clone(),
        quantity,
        unit_price,
        total,
    })
}

/// Checks and consumes the cost of `recipe`. Nothing is taken when any part is missing.
fn consume_materials(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    recipe: &Recipe,
) -> Result<(), EconomyError> {
    if user.souls < recipe.cost_souls {
        return Err(EconomyError::InsufficientSouls {
            have: user.souls,
            need: recipe.cost_souls,
        });
    }
    let missing = inventory.shortfalls(&recipe.ingredients);
    if !missing.is_empty() {
        return Err(EconomyError::MissingIngredients(missing));
    }

    for (item, quantity) in &recipe.ingredients {
        inventory.remove(item, *quantity);
    }
    user.spend_souls(recipe.cost_souls);
    Ok(())
}

pub fn craft(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    catalog: &Catalog,
    item_id: &str,
) -> Result<ItemDef, EconomyError> {
    let recipe = catalog
        .craft
        .get(item_id)
        .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;
    consume_materials(user, inventory, recipe)?;
    inventory.add(item_id, 1);
    Ok(recipe.def.clone())
}

/// Forges `item_id`. Materials are spent before the roll and lost on failure.
pub fn forge(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    catalog: &Catalog,
    item_id: &str,
    rng: &mut impl Rng,
) -> Result<ForgeOutcome, EconomyError> {
    let recipe = catalog
        .forge
        .get(item_id)
        .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;
    consume_materials(user, inventory, recipe)?;

    if rng.gen::<f64>() > recipe.failure_rate {
        inventory.add(item_id, 1);
        Ok(ForgeOutcome::Success(recipe.def.clone()))
    } else {
        Ok(ForgeOutcome::Failure(recipe.def.clone()))
    }
}

pub fn open_lootbox(
    user: &mut UserRecord,
    inventory: &mut Inventory,
    catalog: &Catalog,
    item_id: &str,
    rng: &mut impl Rng,
) -> Result<LootboxOpening, EconomyError> {
    let item = catalog
        .shop
        .get(item_id)
        .ok_or_else(|| EconomyError::UnknownItem(item_id.to_string()))?;
    let loot = item.loot.as_ref().ok_or(EconomyError::NotALootbox)?;
    if !inventory.remove(item_id, 1) {
        return Err(EconomyError::NotOwned);
    }

    let souls = rng.gen_range(loot.souls_min..=loot.souls_max.max(loot.souls_min));
    user.add_souls(souls);

    let drop = weighted_pick(&loot.drops, rng).cloned();
    if let Some(drop) = &drop {
        inventory.add(&drop.item, drop.quantity);
    }
    Ok(LootboxOpening { souls, drop })
}

fn weighted_pick<'a>(drops: &'a [LootDrop], rng: &mut impl Rng) -> Option<&'a LootDrop> {
    let total: u32 = drops.iter().map(|d| d.weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    drops.iter().find(|drop| {
        if roll < drop.weight {
            true
        } else {
            roll -= drop.weight;
            false
        }
    })
}

pub fn equip(inventory: &mut Inventory, catalog: &Catalog, item_id: &str) -> Result<ItemDef, EconomyError> {
    let passive = catalog.passives.get(item_id).ok_or(EconomyError::NotEquippable)?;
    if !inventory.equip(item_id) {
        return Err(EconomyError::NotOwned);
    }
    Ok(passive.def.clone())
}

pub fn unequip(inventory: &mut Inventory, catalog: &Catalog, item_id: &str) -> Result<Option<ItemDef>, EconomyError> {
    if !inventory.unequip(item_id) {
        return Err(EconomyError::NotEquipped);
    }
    Ok(catalog.find_item(item_id).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::catalog::Rarity;
    use rand::{rngs::StdRng, SeedableRng};

    fn rich() -> UserRecord {
        UserRecord {
            souls: 10_000,
            ..Default::default()
        }
    }

    fn item(rarity: Rarity, value: u64) -> ItemDef {
        ItemDef {
            name: "x".into(),
            emoji: String::new(),
            description: String::new(),
            rarity,
            value,
        }
    }

    #[test]
    fn buy_charges_price_times_quantity() {
        let catalog = Catalog::default();
        let mut user = rich();
        let mut inv = Inventory::default();
        let purchase = buy(&mut user, &mut inv, &catalog, "pocao_vida", 3).unwrap();
        assert_eq!(purchase.total, 300);
        assert_eq!(user.souls, 9_700);
        assert_eq!(inv.quantity("pocao_vida"), 3);

        // Rare items cost 2.5x their base value.
        let purchase = buy(&mut user, &mut inv, &catalog, "elixir_forca", 1).unwrap();
        assert_eq!(purchase.total, 250);
        assert_eq!(user.souls, 9_450);
    }

    #[test]
    fn buy_refuses_when_broke_or_unknown() {
        let catalog = Catalog::default();
        let mut user = UserRecord {
            souls: 10,
            ..Default::default()
        };
        let mut inv = Inventory::default();
        assert_eq!(
            buy(&mut user, &mut inv, &catalog, "fragmento_alma", 1).unwrap_err(),
            EconomyError::InsufficientSouls { have: 10, need: 40 }
        );
        assert_eq!(
            buy(&mut user, &mut inv, &catalog, "nada", 1).unwrap_err(),
            EconomyError::UnknownItem("nada".into())
        );
        assert_eq!(
            buy(&mut user, &mut inv, &catalog, "fragmento_alma", 0).unwrap_err(),
            EconomyError::InvalidQuantity
        );
        assert_eq!(user.souls, 10);
        assert!(inv.items.is_empty());
    }

    #[test]
    fn sell_applies_rarity_and_rate() {
        let catalog = Catalog::default();
        let mut user = UserRecord::default();
        let mut inv = Inventory::default();
        inv.add("cristal_abissal", 2);
        let sale = sell(&mut user, &mut inv, &catalog, "cristal_abissal", 2).unwrap();
        // 100 * 2.5 * 0.7
        assert_eq!(sale.unit_price, 175);
        assert_eq!(user.souls, 350);
        assert_eq!(inv.quantity("cristal_abissal"), 0);

        assert_eq!(
            sell(&mut user, &mut inv, &catalog, "cristal_abissal", 1).unwrap_err(),
            EconomyError::NotEnoughItems { quantity: 1 }
        );
    }

    #[test]
    fn sell_price_is_exact() {
        let mut catalog = Catalog::default();
        catalog.rarity_multipliers.insert(Rarity::Rare, 150);
        // 120 * 1.5 * 0.7 lands on 125.999... in floating point.
        assert_eq!(sell_price(&catalog, &item(Rarity::Rare, 120)), 126);
    }

    #[test]
    fn sell_pays_back_less_than_buy() {
        let catalog = Catalog::default();
        let epic = item(Rarity::Epic, 100);
        assert_eq!(buy_price(&catalog, &epic), 500);
        assert_eq!(sell_price(&catalog, &epic), 350);
        for rarity in Rarity::DESCENDING {
            let def = item(rarity, 37);
            assert!(sell_price(&catalog, &def) < buy_price(&catalog, &def));
        }
    }

    #[test]
    fn sell_price_floors() {
        let catalog = Catalog::default();
        assert_eq!(sell_price(&catalog, &item(Rarity::Common, 25)), 17);
    }

    #[test]
    fn craft_consumes_materials() {
        let catalog = Catalog::default();
        let mut user = rich();
        let mut inv = Inventory::default();
        inv.add("lingote_sombrio", 4);
        let made = craft(&mut user, &mut inv, &catalog, "lamina_bruta").unwrap();
        assert_eq!(made.name, "Lâmina Bruta");
        assert_eq!(inv.quantity("lingote_sombrio"), 1);
        assert_eq!(inv.quantity("lamina_bruta"), 1);
        assert_eq!(user.souls, 9_900);
    }

    #[test]
    fn craft_missing_ingredients_takes_nothing() {
        let catalog = Catalog::default();
        let mut user = rich();
        let mut inv = Inventory::default();
        inv.add("reliquia_antiga", 1);
        let err = craft(&mut user, &mut inv, &catalog, "runa_antiga").unwrap_err();
        assert!(matches!(err, EconomyError::MissingIngredients(ref m) if m.len() == 1));
        assert_eq!(inv.quantity("reliquia_antiga"), 1);
        assert_eq!(user.souls, 10_000);
    }

    #[test]
    fn forge_spends_materials_whatever_the_roll() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut successes = 0;
        for _ in 0..40 {
            let mut user = rich();
            let mut inv = Inventory::default();
            inv.add("lamina_bruta", 1);
            inv.add("runa_antiga", 1);
            match forge(&mut user, &mut inv, &catalog, "punhal_ancilar", &mut rng).unwrap() {
                ForgeOutcome::Success(_) => {
                    successes += 1;
                    assert_eq!(inv.quantity("punhal_ancilar"), 1);
                }
                ForgeOutcome::Failure(_) => assert_eq!(inv.quantity("punhal_ancilar"), 0),
            }
            assert_eq!(user.souls, 4_000);
            assert_eq!(inv.quantity("lamina_bruta"), 0);
            assert_eq!(inv.quantity("runa_antiga"), 0);
        }
        assert!(successes > 0 && successes < 40);
    }

    #[test]
    fn lootbox_grants_souls_and_a_drop() {
        let catalog = Catalog::default();
        let mut user = UserRecord::default();
        let mut inv = Inventory::default();
        inv.add("caixa_comum", 1);
        let opening = open_lootbox(&mut user, &mut inv, &catalog, "caixa_comum", &mut StdRng::seed_from_u64(9)).unwrap();
        assert!((50..=250).contains(&opening.souls));
        assert_eq!(user.souls, opening.souls);
        let drop = opening.drop.unwrap();
        assert_eq!(inv.quantity(&drop.item), drop.quantity);
        assert_eq!(inv.quantity("caixa_comum"), 0);

        assert_eq!(
            open_lootbox(&mut user, &mut inv, &catalog, "caixa_comum", &mut StdRng::seed_from_u64(9)).unwrap_err(),
            EconomyError::NotOwned
        );
        assert_eq!(
            open_lootbox(&mut user, &mut inv, &catalog, "fragmento_alma", &mut StdRng::seed_from_u64(9)).unwrap_err(),
            EconomyError::NotALootbox
        );
    }

    #[test]
    fn equip_only_owned_passives() {
        let catalog = Catalog::default();
        let mut inv = Inventory::default();
        inv.add("lamina_bruta", 1);
        assert_eq!(equip(&mut inv, &catalog, "lamina_bruta").unwrap_err(), EconomyError::NotEquippable);
        assert_eq!(equip(&mut inv, &catalog, "anel_ganancia").unwrap_err(), EconomyError::NotOwned);
        inv.add("anel_ganancia", 1);
        assert!(equip(&mut inv, &catalog, "anel_ganancia").is_ok());
        assert_eq!(catalog.soul_bonus(&inv.equipped), 5);
        assert!(unequip(&mut inv, &catalog, "anel_ganancia").unwrap().is_some());
        assert_eq!(unequip(&mut inv, &catalog, "anel_ganancia").unwrap_err(), EconomyError::NotEquipped);
    }
}
