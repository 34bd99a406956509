use poise::serenity_prelude::{
    ButtonStyle, Color, CreateActionRow, CreateButton, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use poise::CreateReply;
use rand::thread_rng;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{footer, refuse, send_embed};
use crate::economy::shop::{self as market, ForgeOutcome};
use crate::format;
use crate::store::catalog::{Catalog, Rarity, Recipe, ShopCategory};
use crate::{Context, Error};

const ITEMS_PER_PAGE: usize = 5;
const SHOP_TIMEOUT: Duration = Duration::from_secs(300);
const FORGE_SUSPENSE: Duration = Duration::from_secs(2);

fn shop_color() -> Color {
    Color::from_rgb(255, 107, 157)
}

fn shop_page(catalog: &Catalog, souls: u64, category: ShopCategory, page: usize) -> (CreateEmbed, usize) {
    let items = catalog.shop_items(category);
    let pages = items.len().div_ceil(ITEMS_PER_PAGE).max(1);
    let page = page.min(pages - 1);

    let mut embed = CreateEmbed::default()
        .title(format!("🏪 Loja - {}", category.title()))
        .description(format!("Suas almas: **{souls}**\nPágina {}/{pages}", page + 1))
        .color(shop_color());
    for (id, item) in items.iter().skip(page * ITEMS_PER_PAGE).take(ITEMS_PER_PAGE) {
        embed = embed.field(
            format!("{} {}", item.def.emoji, item.def.name),
            format!(
                "ID: `{id}`\n**Custo:** {} almas\n{}",
                market::buy_price(catalog, &item.def),
                item.def.description
            ),
            false,
        );
    }
    (embed.footer(footer("Loja")), page)
}

fn shop_buttons(current: ShopCategory, page: usize, pages_left: bool) -> Vec<CreateActionRow> {
    let categories = ShopCategory::ALL
        .iter()
        .map(|category| {
            CreateButton::new(category.custom_id())
                .label(category.title())
                .style(if *category == current {
                    ButtonStyle::Success
                } else {
                    ButtonStyle::Primary
                })
        })
        .collect();
    let paging = vec![
        CreateButton::new("shop_prev")
            .label("◀️")
            .style(ButtonStyle::Secondary)
            .disabled(page == 0),
        CreateButton::new("shop_next")
            .label("▶️")
            .style(ButtonStyle::Secondary)
            .disabled(!pages_left),
    ];
    vec![CreateActionRow::Buttons(categories), CreateActionRow::Buttons(paging)]
}

/// Acesse a loja e compre itens com almas
#[poise::command(slash_command, prefix_command, rename = "loja")]
pub async fn shop(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let mut category = ShopCategory::Consumable;
    let mut page = 0;

    let (embed, components) = {
        let store = ctx.data().store.read().await;
        let (embed, shown) = shop_page(&store.catalog, store.user(user_id).souls, category, page);
        page = shown;
        let more = store.catalog.shop_items(category).len() > (page + 1) * ITEMS_PER_PAGE;
        (embed, shop_buttons(category, page, more))
    };
    let msg = ctx
        .send(CreateReply::default().embed(embed).components(components))
        .await?;

    while let Some(interaction) = msg
        .message()
        .await?
        .await_component_interaction(&ctx.serenity_context().shard)
        .author_id(user_id)
        .timeout(SHOP_TIMEOUT)
        .await
    {
        match interaction.data.custom_id.as_str() {
            "shop_prev" => page = page.saturating_sub(1),
            "shop_next" => page += 1,
            id => {
                if let Some(picked) = ShopCategory::ALL.iter().find(|c| c.custom_id() == id) {
                    category = *picked;
                    page = 0;
                }
            }
        }

        let (embed, components) = {
            let store = ctx.data().store.read().await;
            let (embed, shown) = shop_page(&store.catalog, store.user(user_id).souls, category, page);
            page = shown;
            let more = store.catalog.shop_items(category).len() > (page + 1) * ITEMS_PER_PAGE;
            (embed, shop_buttons(category, page, more))
        };
        interaction
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(components),
                ),
            )
            .await?;
    }

    msg.edit(ctx, CreateReply::default().components(vec![])).await?;
    Ok(())
}

/// Compre um item da loja
#[poise::command(slash_command, prefix_command, rename = "comprar", ephemeral)]
pub async fn buy(
    ctx: Context<'_>,
    #[description = "ID do item para comprar"] item: String,
    #[description = "Quantidade (padrão: 1)"] quantidade: Option<u32>,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let result = market::buy(
            store.users.entry(user_id).or_default(),
            store.inventories.entry(user_id).or_default(),
            &store.catalog,
            &item,
            quantidade.unwrap_or(1),
        );
        if result.is_ok() {
            store.save()?;
        }
        result.map(|purchase| (purchase, store.user(user_id).souls))
    };
    let (purchase, left) = match result {
        Ok(ok) => ok,
        Err(e) => return refuse(ctx, e).await,
    };

    let embed = CreateEmbed::default()
        .title("✅ Compra realizada!")
        .description(format!(
            "Você comprou **{}x** {} **{}**",
            purchase.quantity, purchase.item.emoji, purchase.item.name
        ))
        .color(Color::from_rgb(46, 204, 113))
        .field("Custo", format!("{} almas", purchase.total), false)
        .footer(footer(&format!("Almas restantes: {left}")));
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}

/// Venda um item para a loja
#[poise::command(slash_command, prefix_command, rename = "vender")]
pub async fn sell(
    ctx: Context<'_>,
    #[description = "ID do item para vender"] item: String,
    #[description = "Quantidade (padrão: 1)"] quantidade: Option<u32>,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let result = market::sell(
            store.users.entry(user_id).or_default(),
            store.inventories.entry(user_id).or_default(),
            &store.catalog,
            &item,
            quantidade.unwrap_or(1),
        );
        if result.is_ok() {
            store.save()?;
        }
        result
    };
    let sale = match result {
        Ok(sale) => sale,
        Err(e) => return refuse(ctx, e).await,
    };

    let embed = CreateEmbed::default()
        .title("💰 Venda realizada!")
        .description(format!(
            "Você vendeu **{}x** {} **{}**",
            sale.quantity, sale.item.emoji, sale.item.name
        ))
        .color(Color::from_rgb(46, 204, 113))
        .field("Valor unitário", format!("{} almas", sale.unit_price), true)
        .field("Total recebido", format!("{} almas", sale.total), true)
        .footer(footer("Loja"));
    send_embed(ctx, embed).await
}

/// Veja seu inventário
#[poise::command(slash_command, prefix_command, rename = "inventario")]
pub async fn inventory(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let store = ctx.data().store.read().await;
    let inventory = store.inventory(user_id);
    let souls = store.user(user_id).souls;

    let mut embed = CreateEmbed::default()
        .title("📦 Seu Inventário")
        .color(Color::from_rgb(155, 89, 182));
    if inventory.items.is_empty() {
        embed = embed.description("Seu inventário está vazio");
    }

    let mut by_rarity: BTreeMap<Rarity, Vec<String>> = BTreeMap::new();
    for (id, quantity) in &inventory.items {
        let (rarity, line) = match store.catalog.find_item(id) {
            Some(def) => (def.rarity, format!("{} **{}** x{quantity}", def.emoji, def.name)),
            None => (Rarity::Common, format!("⭐ **{id}** x{quantity}")),
        };
        let mark = if inventory.is_equipped(id) { " ✅" } else { "" };
        by_rarity.entry(rarity).or_default().push(format!("{line}{mark}"));
    }
    for rarity in Rarity::DESCENDING {
        if let Some(lines) = by_rarity.get(&rarity) {
            embed = embed.field(rarity.label(), lines.join("\n"), false);
        }
    }
    drop(store);

    embed = embed.field("💜 Almas", format!("**{souls}**"), false);
    send_embed(ctx, embed).await
}

/// Equipe um item passivo
#[poise::command(slash_command, prefix_command, rename = "equipar", ephemeral)]
pub async fn equip(
    ctx: Context<'_>,
    #[description = "ID do item para equipar"] item: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let result = market::equip(store.inventories.entry(user_id).or_default(), &store.catalog, &item);
        if result.is_ok() {
            store.save()?;
        }
        result.map(|def| (def, store.soul_bonus(user_id)))
    };
    match result {
        Ok((def, bonus)) => {
            ctx.say(format!(
                "✅ Você equipou {} **{}**! Bônus de almas atual: **+{bonus}%**",
                def.emoji, def.name
            ))
            .await?;
            Ok(())
        }
        Err(e) => refuse(ctx, e).await,
    }
}

/// Remove um item equipado
#[poise::command(slash_command, prefix_command, rename = "desequipar", ephemeral)]
pub async fn unequip(
    ctx: Context<'_>,
    #[description = "ID do item para desequipar"] item: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let result = market::unequip(store.inventories.entry(user_id).or_default(), &store.catalog, &item);
        if result.is_ok() {
            store.save()?;
        }
        result
    };
    match result {
        Ok(def) => {
            let name = def.map(|d| format!("{} **{}**", d.emoji, d.name)).unwrap_or(item);
            ctx.say(format!("✅ Você desequipou {name}.")).await?;
            Ok(())
        }
        Err(e) => refuse(ctx, e).await,
    }
}

fn recipe_list<'a>(
    title: &str,
    usage: &str,
    recipes: impl Iterator<Item = (&'a String, &'a Recipe)>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(title)
        .description(usage)
        .color(Color::from_rgb(255, 149, 0));
    for (id, recipe) in recipes.take(10) {
        let ingredients = recipe
            .ingredients
            .iter()
            .map(|(item, qty)| format!("{qty}x `{item}`"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut value = format!(
            "ID: `{id}`\nRaridade: {}\nCusto: {} almas\nMateriais: {ingredients}",
            recipe.def.rarity.name(),
            recipe.cost_souls
        );
        if recipe.failure_rate > 0.0 {
            value.push_str(&format!("\nFalha: {:.0}%", recipe.failure_rate * 100.0));
        }
        embed = embed.field(format!("{} {}", recipe.def.emoji, recipe.def.name), value, false);
    }
    embed
}

/// Crafta um item usando materiais
#[poise::command(slash_command, prefix_command)]
pub async fn craft(
    ctx: Context<'_>,
    #[description = "ID do item para craftar"] item: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        if !store.catalog.craft.contains_key(&item) {
            let embed = recipe_list(
                "🔨 Craft - Items Disponíveis",
                "Use `/craft item:nome_do_item`",
                store.catalog.craft.iter(),
            );
            drop(guard);
            ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
            return Ok(());
        }
        let result = market::craft(
            store.users.entry(user_id).or_default(),
            store.inventories.entry(user_id).or_default(),
            &store.catalog,
            &item,
        );
        if result.is_ok() {
            store.save()?;
        }
        result
    };
    let made = match result {
        Ok(made) => made,
        Err(e) => return refuse(ctx, e).await,
    };

    let embed = CreateEmbed::default()
        .title(format!("🔨 Crafting: {} {}", made.emoji, made.name))
        .description(format!("Você criou **{} {}**!", made.emoji, made.name))
        .color(made.rarity.color())
        .footer(footer("Sistema de Craft"));
    send_embed(ctx, embed).await
}

/// Forja uma arma poderosa
#[poise::command(slash_command, prefix_command, rename = "forjar")]
pub async fn forge(
    ctx: Context<'_>,
    #[description = "ID da arma para forjar"] item: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let Some(failure_rate) = store.catalog.forge.get(&item).map(|r| r.failure_rate) else {
            let embed = recipe_list(
                "⚒️ Forja - Armas Disponíveis",
                "Use `/forjar item:nome_da_arma`",
                store.catalog.forge.iter(),
            );
            drop(guard);
            ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
            return Ok(());
        };
        let result = market::forge(
            store.users.entry(user_id).or_default(),
            store.inventories.entry(user_id).or_default(),
            &store.catalog,
            &item,
            &mut thread_rng(),
        );
        if result.is_ok() {
            store.save()?;
        }
        result.map(|outcome| (outcome, failure_rate))
    };
    let (outcome, failure_rate) = match result {
        Ok(ok) => ok,
        Err(e) => return refuse(ctx, e).await,
    };

    tokio::time::sleep(FORGE_SUSPENSE).await;

    let failure = format!("{:.0}%", failure_rate * 100.0);
    let embed = match outcome {
        ForgeOutcome::Success(def) => CreateEmbed::default()
            .title("✨ FORJA BEM-SUCEDIDA! ✨")
            .description(format!("Você criou: **{} {}**", def.emoji, def.name))
            .color(Color::from_rgb(255, 215, 0))
            .field("Taxa de Falha", failure, true),
        ForgeOutcome::Failure(def) => CreateEmbed::default()
            .title("💥 FALHA NA FORJA! 💥")
            .description(format!(
                "A forja de **{}** falhou e seus materiais foram perdidos!",
                def.name
            ))
            .color(Color::from_rgb(231, 76, 60))
            .field("Taxa de Falha", failure, false),
    };
    send_embed(ctx, embed.footer(footer("Sistema de Forja"))).await
}

/// Abra uma lootbox do seu inventário
#[poise::command(slash_command, prefix_command, rename = "abrir")]
pub async fn open(
    ctx: Context<'_>,
    #[description = "ID da lootbox"] item: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let result = {
        let mut guard = ctx.data().store.write().await;
        let store = &mut *guard;
        let result = market::open_lootbox(
            store.users.entry(user_id).or_default(),
            store.inventories.entry(user_id).or_default(),
            &store.catalog,
            &item,
            &mut thread_rng(),
        );
        if result.is_ok() {
            store.save()?;
        }
        result.map(|opening| {
            let prize = opening.drop.as_ref().map(|d| {
                let name = store
                    .catalog
                    .find_item(&d.item)
                    .map(|def| format!("{} **{}**", def.emoji, def.name))
                    .unwrap_or_else(|| format!("`{}`", d.item));
                format!("{}x {name}", d.quantity)
            });
            (opening.souls, prize)
        })
    };
    let (souls, prize) = match result {
        Ok(ok) => ok,
        Err(e) => return refuse(ctx, e).await,
    };

    let mut embed = CreateEmbed::default()
        .title("📦 Lootbox Aberta!")
        .description(format!("{} abriu `{item}`!", ctx.author().name))
        .color(Color::from_rgb(155, 89, 182))
        .field("💰 Almas", format!("**{souls}** 🔮"), true);
    if let Some(prize) = prize {
        embed = embed.field("🎁 Item", prize, true);
    }
    send_embed(ctx, embed.footer(footer("Loja"))).await
}

/// Per-section item counts and the forge failure rates.
fn shop_overview(catalog: &Catalog) -> Vec<(String, String)> {
    let sections = [
        ("🔨 Craft", catalog.craft.len()),
        ("⚒️ Forja", catalog.forge.len()),
        ("✨ Passivos", catalog.passives.len()),
    ];
    let mut fields: Vec<(String, String)> = ShopCategory::ALL
        .iter()
        .map(|category| (category.title().to_string(), catalog.shop_items(*category).len()))
        .chain(sections.iter().map(|(name, count)| (name.to_string(), *count)))
        .map(|(name, count)| (name, format!("{count} itens")))
        .collect();

    let mut weapons: Vec<_> = catalog.forge.values().collect();
    weapons.sort_by(|a, b| a.failure_rate.total_cmp(&b.failure_rate));
    let rates = weapons
        .iter()
        .map(|r| {
            format!(
                "{} {}: {} almas, {:.0}% de falha",
                r.def.emoji,
                r.def.name,
                format::thousands(r.cost_souls),
                r.failure_rate * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    if !rates.is_empty() {
        fields.push(("Armas forjáveis".to_string(), rates));
    }
    fields
}

/// One line per rarity with its multiplier, rarest first.
fn rarity_overview(catalog: &Catalog) -> Vec<String> {
    Rarity::DESCENDING
        .iter()
        .map(|rarity| {
            let pct = catalog.rarity_multiplier(*rarity);
            format!("{}: **{}.{:02}x** o valor base", rarity.label(), pct / 100, pct % 100)
        })
        .collect()
}

/// Mostra um resumo da loja e das armas forjáveis
#[poise::command(slash_command, prefix_command, rename = "info-loja")]
pub async fn shop_info(ctx: Context<'_>) -> Result<(), Error> {
    let (fields, total) = {
        let store = ctx.data().store.read().await;
        (shop_overview(&store.catalog), store.catalog.item_count())
    };
    let embed = fields.into_iter().fold(
        CreateEmbed::default()
            .title("🏪 Informações da Loja")
            .description(format!(
                "**{total}** itens no catálogo. A venda devolve 70% do valor ajustado pela raridade."
            ))
            .color(shop_color())
            .footer(footer("Sistema de Loja")),
        |embed, (name, value)| embed.field(name, value, false),
    );
    send_embed(ctx, embed).await
}

/// Mostra os multiplicadores de valor de cada raridade
#[poise::command(slash_command, prefix_command, rename = "info-raridade")]
pub async fn rarity_info(ctx: Context<'_>) -> Result<(), Error> {
    let lines = {
        let store = ctx.data().store.read().await;
        rarity_overview(&store.catalog)
    };
    let embed = CreateEmbed::default()
        .title("💎 Raridades")
        .description(lines.join("\n"))
        .color(Color::new(Rarity::Legendary.color()))
        .footer(footer("Sistema de Loja"));
    send_embed(ctx, embed).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_overview_counts_sections() {
        let fields = shop_overview(&Catalog::default());
        let count = |name: &str| fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone());
        assert_eq!(count("CONSUMÍVEIS").as_deref(), Some("6 itens"));
        assert_eq!(count("LOOTBOXES").as_deref(), Some("4 itens"));
        assert_eq!(count("ESPECIAIS").as_deref(), Some("5 itens"));
        assert_eq!(count("🔨 Craft").as_deref(), Some("9 itens"));
        assert_eq!(count("⚒️ Forja").as_deref(), Some("6 itens"));

        let weapons = count("Armas forjáveis").unwrap();
        let lines: Vec<_> = weapons.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("Totem do Vazio") && lines[0].ends_with("12% de falha"));
        assert!(lines[5].contains("Martelo Aniquilador") && lines[5].contains("10,000 almas"));
    }

    #[test]
    fn rarity_overview_lists_multipliers() {
        let lines = rarity_overview(&Catalog::default());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "🔴 ANCESTRAL: **20.00x** o valor base");
        assert_eq!(lines[3], "🔵 RARO: **2.50x** o valor base");
        assert_eq!(lines[4], "⚪ COMUM: **1.00x** o valor base");
    }
}
