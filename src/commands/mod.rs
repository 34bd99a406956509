pub mod economy;
pub mod misc;
pub mod moderation;
pub mod profile;
pub mod shop;
pub mod voice;

use crate::store::user::UserRecord;
use crate::{Context, Data, Error};
use poise::serenity_prelude::{Color, CreateEmbed, CreateEmbedFooter, UserId};
use poise::CreateReply;

pub const FOOTER: &str = "Aeternum Exilium";

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        economy::daily(),
        economy::mine(),
        economy::hunt(),
        economy::long_hunt(),
        economy::work(),
        economy::balance(),
        economy::top_souls(),
        economy::top_level(),
        economy::missions(),
        economy::claim_mission(),
        shop::shop(),
        shop::buy(),
        shop::sell(),
        shop::inventory(),
        shop::equip(),
        shop::unequip(),
        shop::craft(),
        shop::forge(),
        shop::open(),
        shop::shop_info(),
        shop::rarity_info(),
        profile::profile(),
        profile::set_about(),
        profile::marry(),
        profile::divorce(),
        voice::callstatus(),
        voice::time(),
        voice::top_time(),
        moderation::add_role(),
        moderation::remove_role(),
        moderation::create_role(),
        moderation::delete_role(),
        moderation::mute_voice(),
        moderation::unmute_voice(),
        moderation::jail(),
        moderation::release(),
        moderation::ban(),
        moderation::unban(),
        moderation::history(),
        moderation::panel(),
        misc::help(),
        misc::uptime(),
        misc::message(),
        misc::phrase(),
    ]
}

pub fn footer(system: &str) -> CreateEmbedFooter {
    CreateEmbedFooter::new(format!("{FOOTER} • {system}"))
}

/// Replies with an ephemeral error line.
pub async fn refuse(ctx: Context<'_>, message: impl std::fmt::Display) -> Result<(), Error> {
    ctx.send(
        CreateReply::default()
            .content(format!("❌ {message}"))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn send_embed(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Top ten entries from the store, skipping accounts the cache knows are bots.
pub async fn ranking_lines<K: Ord>(
    ctx: Context<'_>,
    key: impl Fn(&UserRecord) -> K,
    line: impl Fn(&UserRecord) -> String,
) -> Vec<(UserId, String)> {
    let store = ctx.data().store.read().await;
    store
        .ranking(10, key, |id| !ctx.cache().user(id).is_some_and(|u| u.bot))
        .into_iter()
        .map(|(id, user)| (id, line(user)))
        .collect()
}

pub fn ranking_embed(title: &str, color: Color, lines: Vec<(UserId, String)>) -> CreateEmbed {
    let mut embed = CreateEmbed::default().title(title).color(color);
    if lines.is_empty() {
        return embed.description("Ainda não há registros.");
    }
    for (pos, (id, value)) in lines.into_iter().enumerate() {
        embed = embed.field(format!("{}.", pos + 1), format!("<@{id}>\n{value}"), false);
    }
    embed
}
