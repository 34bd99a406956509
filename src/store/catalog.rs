use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Ancestral,
}

impl Rarity {
    /// Display order for inventories, rarest first.
    pub const DESCENDING: [Rarity; 5] = [
        Rarity::Ancestral,
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Common,
    ];

    pub fn color(&self) -> u32 {
        match self {
            Self::Common => 0x4A4A4A,
            Self::Rare => 0x0099FF,
            Self::Epic => 0x9933FF,
            Self::Legendary => 0xFFD700,
            Self::Ancestral => 0xFF4500,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Common => "⚪ COMUM",
            Self::Rare => "🔵 RARO",
            Self::Epic => "🟣 ÉPICO",
            Self::Legendary => "🟡 LENDÁRIO",
            Self::Ancestral => "🔴 ANCESTRAL",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "comum",
            Self::Rare => "raro",
            Self::Epic => "épico",
            Self::Legendary => "lendário",
            Self::Ancestral => "ancestral",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShopCategory {
    Consumable,
    Lootbox,
    Special,
}

impl ShopCategory {
    pub const ALL: [ShopCategory; 3] = [Self::Consumable, Self::Lootbox, Self::Special];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Consumable => "CONSUMÍVEIS",
            Self::Lootbox => "LOOTBOXES",
            Self::Special => "ESPECIAIS",
        }
    }

    pub fn custom_id(&self) -> &'static str {
        match self {
            Self::Consumable => "shop_consumable",
            Self::Lootbox => "shop_lootbox",
            Self::Special => "shop_special",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub name: String,
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    pub value: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LootDrop {
    pub item: String,
    pub weight: u32,
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LootTable {
    pub souls_min: u64,
    pub souls_max: u64,
    pub drops: Vec<LootDrop>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShopItem {
    #[serde(flatten)]
    pub def: ItemDef,
    pub category: ShopCategory,
    #[serde(default)]
    pub loot: Option<LootTable>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Recipe {
    #[serde(flatten)]
    pub def: ItemDef,
    #[serde(default)]
    pub cost_souls: u64,
    pub ingredients: BTreeMap<String, u32>,
    #[serde(default)]
    pub failure_rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Passive {
    #[serde(flatten)]
    pub def: ItemDef,
    /// Percentage added to soul rewards while equipped.
    pub soul_bonus: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Catalog {
    pub shop: BTreeMap<String, ShopItem>,
    #[serde(default)]
    pub materials: BTreeMap<String, ItemDef>,
    #[serde(default)]
    pub craft: BTreeMap<String, Recipe>,
    #[serde(default)]
    pub forge: BTreeMap<String, Recipe>,
    #[serde(default)]
    pub passives: BTreeMap<String, Passive>,
    /// Value multiplier per rarity, in hundredths.
    #[serde(default)]
    pub rarity_multipliers: BTreeMap<Rarity, u64>,
}

impl Catalog {
    /// Looks an item up in every section, recipes first.
    pub fn find_item(&self, id: &str) -> Option<&ItemDef> {
        self.craft
            .get(id)
            .map(|r| &r.def)
            .or_else(|| self.forge.get(id).map(|r| &r.def))
            .or_else(|| self.passives.get(id).map(|p| &p.def))
            .or_else(|| self.shop.get(id).map(|s| &s.def))
            .or_else(|| self.materials.get(id))
    }

    pub fn shop_items(&self, category: ShopCategory) -> Vec<(&String, &ShopItem)> {
        self.shop
            .iter()
            .filter(|(_, item)| item.category == category)
            .collect()
    }

    pub fn rarity_multiplier(&self, rarity: Rarity) -> u64 {
        self.rarity_multipliers.get(&rarity).copied().unwrap_or(100)
    }

    /// Base value scaled by the rarity multiplier.
    pub fn price(&self, item: &ItemDef) -> u64 {
        item.value * self.rarity_multiplier(item.rarity) / 100
    }

    pub fn item_count(&self) -> usize {
        self.shop.len() + self.materials.len() + self.craft.len() + self.forge.len() + self.passives.len()
    }

    /// Sum of the soul bonus percentages of the given equipped items.
    pub fn soul_bonus<'a>(&self, equipped: impl IntoIterator<Item = &'a String>) -> u32 {
        equipped
            .into_iter()
            .filter_map(|id| self.passives.get(id))
            .map(|p| p.soul_bonus)
            .sum()
    }
}

fn def(name: &str, emoji: &str, description: &str, rarity: Rarity, value: u64) -> ItemDef {
    ItemDef {
        name: name.to_string(),
        emoji: emoji.to_string(),
        description: description.to_string(),
        rarity,
        value,
    }
}

fn ingredients(list: &[(&str, u32)]) -> BTreeMap<String, u32> {
    list.iter().map(|(id, qty)| (id.to_string(), *qty)).collect()
}

fn drops(list: &[(&str, u32, u32)]) -> Vec<LootDrop> {
    list.iter()
        .map(|(item, weight, quantity)| LootDrop {
            item: item.to_string(),
            weight: *weight,
            quantity: *quantity,
        })
        .collect()
}

fn shop_item(category: ShopCategory, def: ItemDef) -> ShopItem {
    ShopItem {
        def,
        category,
        loot: None,
    }
}

fn lootbox(def: ItemDef, souls_min: u64, souls_max: u64, table: &[(&str, u32, u32)]) -> ShopItem {
    ShopItem {
        def,
        category: ShopCategory::Lootbox,
        loot: Some(LootTable {
            souls_min,
            souls_max,
            drops: drops(table),
        }),
    }
}

fn recipe(def: ItemDef, cost_souls: u64, list: &[(&str, u32)], failure_rate: f64) -> Recipe {
    Recipe {
        def,
        cost_souls,
        ingredients: ingredients(list),
        failure_rate,
    }
}

fn passive(def: ItemDef, soul_bonus: u32) -> Passive {
    Passive { def, soul_bonus }
}

impl Default for Catalog {
    fn default() -> Self {
        use Rarity::*;
        use ShopCategory::{Consumable, Special};

        let shop = BTreeMap::from([
            ("pocao_vida".to_string(), shop_item(Consumable, def("Poção de Vida", "🧪", "Restaura o vigor depois de uma caçada.", Common, 100))),
            ("pocao_mana".to_string(), shop_item(Consumable, def("Poção de Mana", "💧", "Energia arcana engarrafada.", Common, 120))),
            ("elixir_forca".to_string(), shop_item(Consumable, def("Elixir da Força", "🍷", "Um gole para os braços do minerador.", Rare, 100))),
            ("elixir_sorte".to_string(), shop_item(Consumable, def("Elixir da Sorte", "🍀", "Dizem que atrai achados raros.", Rare, 120))),
            ("pergaminho_sabedoria".to_string(), shop_item(Consumable, def("Pergaminho da Sabedoria", "📜", "Conhecimento dos exilados antigos.", Epic, 80))),
            ("pergaminho_teleporte".to_string(), shop_item(Consumable, def("Pergaminho de Teleporte", "🌀", "Leva de volta à base de apoio.", Rare, 140))),
            ("caixa_comum".to_string(), lootbox(
                def("Caixa Comum", "📦", "Almas e materiais básicos.", Common, 200),
                50,
                250,
                &[("fragmento_alma", 50, 3), ("alma_corrompida", 35, 2), ("pocao_vida", 15, 1)],
            )),
            ("caixa_rara".to_string(), lootbox(
                def("Caixa Rara", "🎁", "Materiais raros e componentes de craft.", Rare, 300),
                200,
                700,
                &[("reliquia_antiga", 40, 1), ("selo_arcano", 30, 1), ("lingote_sombrio", 20, 2), ("essencia_eterna", 10, 1)],
            )),
            ("caixa_ancestral".to_string(), lootbox(
                def("Caixa Ancestral", "🏺", "Chance de itens passivos.", Epic, 600),
                800,
                2500,
                &[("essencia_eterna", 40, 2), ("runa_antiga", 30, 1), ("amuleto_sorte", 15, 1), ("colar_protecao", 15, 1)],
            )),
            ("caixa_vazio".to_string(), lootbox(
                def("Caixa do Vazio", "🕳️", "O que sai do vazio nunca é comum.", Legendary, 600),
                1500,
                5000,
                &[("nucleo_vazio", 40, 1), ("anel_ganancia", 25, 1), ("chapeu_sabedoria", 25, 1), ("orbe_instavel", 10, 1)],
            )),
            ("alma_corrompida".to_string(), shop_item(Special, def("Alma Corrompida", "👻", "Alma presa entre os mundos.", Common, 60))),
            ("fragmento_alma".to_string(), shop_item(Special, def("Fragmento de Alma", "💠", "Material básico de craft.", Common, 40))),
            ("reliquia_antiga".to_string(), shop_item(Special, def("Relíquia Antiga", "🗿", "Resto de uma era esquecida.", Rare, 60))),
            ("selo_arcano".to_string(), shop_item(Special, def("Selo Arcano", "🔏", "Prende energia em objetos.", Rare, 70))),
            ("essencia_eterna".to_string(), shop_item(Special, def("Essência Eterna", "✨", "Nunca se apaga.", Epic, 50))),
        ]);

        let craft = BTreeMap::from([
            ("lingote_sombrio".to_string(), recipe(def("Lingote Sombrio", "🧱", "Metal fundido com fragmentos de alma.", Rare, 60), 50, &[("fragmento_alma", 2)], 0.0)),
            ("po_estelar".to_string(), recipe(def("Pó Estelar", "🌟", "Brilha mesmo no escuro.", Rare, 80), 80, &[("essencia_eterna", 1), ("fragmento_alma", 1)], 0.0)),
            ("cristal_abissal".to_string(), recipe(def("Cristal Abissal", "🔷", "Cristal das profundezas.", Rare, 100), 100, &[("alma_corrompida", 2), ("fragmento_alma", 1)], 0.0)),
            ("cabo_reforcado".to_string(), recipe(def("Cabo Reforçado", "🪵", "Empunhadura para armas pesadas.", Rare, 120), 80, &[("lingote_sombrio", 2), ("fragmento_alma", 1)], 0.0)),
            ("lamina_bruta".to_string(), recipe(def("Lâmina Bruta", "🗡️", "Base para armas forjadas.", Rare, 150), 100, &[("lingote_sombrio", 3)], 0.0)),
            ("runa_antiga".to_string(), recipe(def("Runa Antiga", "🪬", "Inscrição de poder.", Epic, 150), 150, &[("reliquia_antiga", 1), ("selo_arcano", 1)], 0.0)),
            ("sangue_antigo".to_string(), recipe(def("Sangue Antigo", "🩸", "Essência vital condensada.", Epic, 200), 150, &[("alma_corrompida", 2), ("reliquia_antiga", 1)], 0.0)),
            ("nucleo_vazio".to_string(), recipe(def("Núcleo do Vazio", "⚫", "Energia do vazio contida.", Epic, 220), 200, &[("cristal_abissal", 2), ("essencia_eterna", 1)], 0.0)),
            ("orbe_instavel".to_string(), recipe(def("Orbe Instável", "🔮", "Pode explodir a qualquer momento.", Epic, 250), 200, &[("po_estelar", 1), ("cristal_abissal", 1)], 0.0)),
        ]);

        let forge = BTreeMap::from([
            ("totem_vazio".to_string(), recipe(def("Totem do Vazio", "🔷", "Canaliza o vazio.", Legendary, 2500), 5000, &[("nucleo_vazio", 2), ("runa_antiga", 1)], 0.12)),
            ("lamina_sombria".to_string(), recipe(def("Lâmina Sombria", "⚔️", "Corta a própria sombra.", Legendary, 4000), 8000, &[("lamina_bruta", 1), ("cabo_reforcado", 1), ("sangue_antigo", 1)], 0.15)),
            ("punhal_ancilar".to_string(), recipe(def("Punhal Ancilar", "🗡️", "Arma dos guardiões antigos.", Legendary, 3000), 6000, &[("lamina_bruta", 1), ("runa_antiga", 1)], 0.18)),
            ("orbe_cosmica".to_string(), recipe(def("Orbe Cósmica", "💎", "Contém uma galáxia inteira.", Legendary, 3500), 7000, &[("orbe_instavel", 2), ("po_estelar", 1)], 0.20)),
            ("coracao_escuro".to_string(), recipe(def("Coração Escuro", "❤️", "Ainda bate.", Ancestral, 3000), 9000, &[("sangue_antigo", 2), ("nucleo_vazio", 1)], 0.22)),
            ("martelo_aniquilador".to_string(), recipe(def("Martelo Aniquilador", "🔨", "Nada resiste a ele.", Ancestral, 3500), 10000, &[("lingote_sombrio", 3), ("cabo_reforcado", 1), ("nucleo_vazio", 1)], 0.25)),
        ]);

        let passives = BTreeMap::from([
            ("amuleto_sorte".to_string(), passive(def("Amuleto da Sorte", "🔮", "+5% almas enquanto equipado.", Epic, 300), 5)),
            ("anel_ganancia".to_string(), passive(def("Anel da Ganância", "💍", "+5% almas enquanto equipado.", Epic, 300), 5)),
            ("colar_protecao".to_string(), passive(def("Colar da Proteção", "📿", "+5% almas enquanto equipado.", Epic, 300), 5)),
            ("chapeu_sabedoria".to_string(), passive(def("Chapéu da Sabedoria", "🎩", "+5% almas enquanto equipado.", Epic, 300), 5)),
        ]);

        let rarity_multipliers = BTreeMap::from([
            (Common, 100),
            (Rare, 250),
            (Epic, 500),
            (Legendary, 1000),
            (Ancestral, 2000),
        ]);

        Self {
            shop,
            materials: BTreeMap::new(),
            craft,
            forge,
            passives,
            rarity_multipliers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recipes_reference_known_items() {
        let catalog = Catalog::default();
        for recipe in catalog.craft.values().chain(catalog.forge.values()) {
            for id in recipe.ingredients.keys() {
                assert!(catalog.find_item(id).is_some(), "unknown ingredient {id}");
            }
        }
        for item in catalog.shop.values() {
            for drop in item.loot.iter().flat_map(|l| l.drops.iter()) {
                assert!(catalog.find_item(&drop.item).is_some(), "unknown drop {}", drop.item);
            }
        }
    }

    #[test]
    fn default_catalog_sections() {
        let catalog = Catalog::default();
        assert_eq!(catalog.craft.len(), 9);
        assert_eq!(catalog.forge.len(), 6);
        assert_eq!(catalog.passives.len(), 4);
        assert_eq!(catalog.shop_items(ShopCategory::Consumable).len(), 6);
        assert_eq!(catalog.shop_items(ShopCategory::Lootbox).len(), 4);
        assert_eq!(catalog.shop_items(ShopCategory::Special).len(), 5);
        assert_eq!(catalog.item_count(), 34);
    }

    #[test]
    fn rarity_multipliers_and_forge_rates() {
        let catalog = Catalog::default();
        let multipliers: Vec<u64> = Rarity::DESCENDING
            .iter()
            .rev()
            .map(|r| catalog.rarity_multiplier(*r))
            .collect();
        assert_eq!(multipliers, vec![100, 250, 500, 1000, 2000]);

        let mut rates: Vec<f64> = catalog.forge.values().map(|r| r.failure_rate).collect();
        rates.sort_by(f64::total_cmp);
        assert_eq!(rates, vec![0.12, 0.15, 0.18, 0.20, 0.22, 0.25]);
        assert_eq!(catalog.forge["totem_vazio"].cost_souls, 5000);
        assert_eq!(catalog.forge["martelo_aniquilador"].failure_rate, 0.25);
        assert_eq!(catalog.price(&catalog.forge["martelo_aniquilador"].def), 70_000);
    }

    #[test]
    fn soul_bonus_ignores_non_passives() {
        let catalog = Catalog::default();
        let equipped = vec!["anel_ganancia".to_string(), "lamina_bruta".to_string()];
        assert_eq!(catalog.soul_bonus(&equipped), 5);
    }

    #[test]
    fn catalog_survives_json() {
        let catalog = Catalog::default();
        let raw = serde_json::to_string_pretty(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.rarity_multiplier(Rarity::Legendary), 1000);
        assert_eq!(back, catalog);
    }
}
