use chrono::Utc;
use poise::serenity_prelude::{self as serenity, ChannelId, Color, CreateEmbed, CreateMessage, Mentionable, UserId};
use poise::CreateReply;
use rand::{seq::SliceRandom, thread_rng};
use std::time::Duration;
use tracing::{info, warn};

use super::{footer, ranking_embed, ranking_lines, refuse, send_embed};
use crate::economy::rewards::{self, Activity, LongHuntStatus, Reward};
use crate::economy::{leveling, missions};
use crate::format::{self, discord_timestamp, TimestampStyle};
use crate::{Context, Error};

const FOREST_IMAGE: &str = "https://i.pinimg.com/736x/15/29/ab/1529abc5be2e4c2a4392ef693503b7db.jpg";
const HUNT_SUSPENSE: Duration = Duration::from_secs(5);
const MINE_EMOJIS: [&str; 5] = ["⛏️", "🔨", "🔮", "⚒️", "🪨"];

/// Runs `activity` for the author under the store lock.
async fn claim(ctx: Context<'_>, activity: Activity) -> Result<Result<Reward, crate::economy::EconomyError>, Error> {
    let user_id = ctx.author().id;
    let mut store = ctx.data().store.write().await;
    let bonus = store.soul_bonus(user_id);
    let result = rewards::claim(store.user_mut(user_id), activity, Utc::now(), bonus, &mut thread_rng());
    if result.is_ok() {
        store.save_users()?;
    }
    Ok(result)
}

fn reward_fields(mut embed: CreateEmbed, reward: &Reward, streak_unit: Option<&str>) -> CreateEmbed {
    embed = embed
        .field("💰 Almas ganhas", format!("**{}** 🔮", reward.souls), true)
        .field("⭐ XP ganho", format!("**{}** XP", reward.xp), true);
    if let Some(unit) = streak_unit {
        embed = embed.field("🔥 Streak", format!("**{}** {unit}", reward.streak), true);
    }
    if let Some(message) = reward.rare {
        embed = embed.field("🎁 Achado Especial!", message, false);
    }
    if let Some(level) = reward.level_up {
        embed = embed.field("🎉 Level Up!", format!("Você subiu para o nível **{level}**!"), false);
    }
    embed
}

/// Receba sua recompensa diária de almas e XP!
#[poise::command(slash_command, prefix_command)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    let reward = match claim(ctx, Activity::Daily).await? {
        Ok(reward) => reward,
        Err(e) => return refuse(ctx, e).await,
    };

    let embed = CreateEmbed::default()
        .title("🎁 Daily Coletado!")
        .description(format!("**{}** coletou sua recompensa diária!", ctx.author().mention()))
        .color(Color::from_rgb(255, 215, 0))
        .thumbnail(ctx.author().face())
        .footer(footer("Sistema de Economia"));
    send_embed(ctx, reward_fields(embed, &reward, Some("dias consecutivos"))).await
}

/// Mine e ganhe almas! (Cooldown: 5min)
#[poise::command(slash_command, prefix_command)]
pub async fn mine(ctx: Context<'_>) -> Result<(), Error> {
    let reward = match claim(ctx, Activity::Mine).await? {
        Ok(reward) => reward,
        Err(e) => return refuse(ctx, e).await,
    };

    let emoji = MINE_EMOJIS.choose(&mut thread_rng()).copied().unwrap_or("⛏️");
    let embed = CreateEmbed::default()
        .title(format!("{emoji} Mineração Concluída!"))
        .description(format!("**{}** minerou com sucesso!", ctx.author().mention()))
        .color(Color::from_rgb(52, 152, 219))
        .thumbnail(ctx.author().face())
        .footer(footer("Sistema de Mineração"));
    send_embed(ctx, reward_fields(embed, &reward, Some("minerações"))).await
}

/// Caçe almas na floresta escura! (Cooldown: 2min)
#[poise::command(slash_command, prefix_command, rename = "caça")]
pub async fn hunt(ctx: Context<'_>) -> Result<(), Error> {
    let reward = match claim(ctx, Activity::Hunt).await? {
        Ok(reward) => reward,
        Err(e) => return refuse(ctx, e).await,
    };

    let start = CreateEmbed::default()
        .title("🌲 Caçada Iniciada!")
        .description(format!("**{}** entrou na floresta escura em busca de almas...", ctx.author().mention()))
        .color(Color::from_rgb(31, 139, 76))
        .image(FOREST_IMAGE);
    let msg = ctx.send(CreateReply::default().embed(start)).await?;

    tokio::time::sleep(HUNT_SUSPENSE).await;

    let result = CreateEmbed::default()
        .title("🌲 Caçada Concluída!")
        .description(format!("**{}** retornou da floresta escura!", ctx.author().mention()))
        .color(Color::from_rgb(113, 54, 138))
        .thumbnail(ctx.author().face())
        .footer(footer("Sistema de Caça"));
    msg.edit(ctx, CreateReply::default().embed(reward_fields(result, &reward, Some("caçadas"))))
        .await?;
    Ok(())
}

/// Trabalhe por almas! (Cooldown: 1h)
#[poise::command(slash_command, prefix_command, rename = "trabalhar")]
pub async fn work(ctx: Context<'_>) -> Result<(), Error> {
    let reward = match claim(ctx, Activity::Work).await? {
        Ok(reward) => reward,
        Err(e) => return refuse(ctx, e).await,
    };

    let embed = CreateEmbed::default()
        .title("💼 Trabalho Concluído!")
        .description(format!("**{}** trabalhou duro e foi recompensado!", ctx.author().mention()))
        .color(Color::from_rgb(46, 204, 113))
        .thumbnail(ctx.author().face())
        .footer(footer("Sistema de Economia"));
    send_embed(ctx, reward_fields(embed, &reward, Some("turnos"))).await
}

pub fn long_hunt_result(user_id: UserId, reward: &Reward) -> CreateEmbed {
    let embed = CreateEmbed::default()
        .title("🌲 Caça Longa Concluída!")
        .description(format!("<@{user_id}> retornou da floresta escura após 12 horas de caçada!"))
        .color(Color::from_rgb(255, 215, 0))
        .image(FOREST_IMAGE)
        .footer(footer("Sistema de Caça Longa"));
    reward_fields(embed, reward, None)
}

/// Posts a settled long hunt in its channel, falling back to a DM.
pub async fn announce_long_hunt(
    ctx: &serenity::Context,
    user_id: UserId,
    channel_id: Option<ChannelId>,
    reward: &Reward,
) -> Result<(), Error> {
    let message = CreateMessage::new().embed(long_hunt_result(user_id, reward));
    if let Some(channel_id) = channel_id {
        match channel_id.send_message(ctx, message.clone()).await {
            Ok(_) => return Ok(()),
            Err(e) => warn!("Could not post long hunt result in {}: {}", channel_id, e),
        }
    }
    let dm = user_id.create_dm_channel(ctx).await?;
    dm.send_message(ctx, message).await?;
    Ok(())
}

/// Inicie uma caçada longa de 12 horas por almas valiosas!
#[poise::command(slash_command, prefix_command, rename = "caça-longa")]
pub async fn long_hunt(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let status = {
        let mut store = ctx.data().store.write().await;
        let bonus = store.soul_bonus(user_id);
        let status = rewards::long_hunt(
            store.user_mut(user_id),
            Utc::now(),
            Some(ctx.channel_id()),
            bonus,
            &mut thread_rng(),
        );
        if !matches!(status, LongHuntStatus::InProgress { .. }) {
            store.save_users()?;
        }
        status
    };

    match status {
        LongHuntStatus::Started(hunt) => {
            info!("{} started a long hunt ending at {}", user_id, hunt.ends_at);
            let embed = CreateEmbed::default()
                .title("🌲 Caça Longa Iniciada!")
                .description(format!(
                    "**{}** partiu para uma caçada longa na floresta escura!\n\n\
                     ⏰ Esta caçada levará **12 horas** para completar.\n\
                     📬 Você receberá uma notificação quando a caçada terminar!",
                    ctx.author().mention()
                ))
                .color(Color::from_rgb(31, 139, 76))
                .image(FOREST_IMAGE)
                .field(
                    "⏳ Tempo estimado",
                    format!(
                        "Termina em: {}",
                        discord_timestamp(hunt.ends_at.timestamp(), TimestampStyle::Relative)
                    ),
                    false,
                )
                .footer(footer("Sistema de Caça Longa"));
            send_embed(ctx, embed).await
        }
        LongHuntStatus::InProgress { remaining } => {
            let embed = CreateEmbed::default()
                .title("🌲 Caça Longa em Andamento")
                .description(format!(
                    "Você já está em uma caça longa!\nTempo restante: **{}**",
                    format::hms(remaining.num_seconds().max(0) as u64)
                ))
                .color(Color::from_rgb(52, 152, 219))
                .image(FOREST_IMAGE);
            ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
            Ok(())
        }
        LongHuntStatus::Finished(reward) => send_embed(ctx, long_hunt_result(user_id, &reward)).await,
    }
}

/// Veja quantas almas você possui
#[poise::command(slash_command, prefix_command)]
pub async fn balance(
    ctx: Context<'_>,
    #[description = "Membro para ver o saldo (opcional)"] membro: Option<serenity::User>,
) -> Result<(), Error> {
    let target = membro.as_ref().unwrap_or_else(|| ctx.author());
    let user = ctx.data().store.read().await.user(target.id);
    let progress = leveling::progress(user.xp);

    let embed = CreateEmbed::default()
        .title(format!("💰 Carteira de {}", target.name))
        .color(Color::from_rgb(46, 204, 113))
        .field("🔮 Almas", format!("**{}** 🔮", format::thousands(user.souls)), true)
        .field("⭐ Nível", format!("**{}**", progress.level), true)
        .field("📊 XP", format!("**{}** XP", format::thousands(user.xp)), true)
        .field(
            "📈 Progresso para próximo nível",
            format!(
                "**{}/{}** XP ({}%)",
                progress.into_level,
                progress.span,
                progress.percent()
            ),
            false,
        )
        .field(
            "Progresso",
            format!("`{}`", format::progress_bar(progress.into_level, progress.span, 20)),
            false,
        )
        .thumbnail(target.face())
        .footer(footer("Sistema de Economia"));
    send_embed(ctx, embed).await
}

/// Ranking dos mais ricos em almas
#[poise::command(slash_command, prefix_command, rename = "top-souls")]
pub async fn top_souls(ctx: Context<'_>) -> Result<(), Error> {
    let lines = ranking_lines(
        ctx,
        |u| u.souls,
        |u| format!("**{}** 🔮", format::thousands(u.souls)),
    )
    .await;
    send_embed(ctx, ranking_embed("🏆 Top 10 - Mais Ricos em Almas", Color::from_rgb(255, 215, 0), lines)).await
}

/// Ranking dos maiores níveis
#[poise::command(slash_command, prefix_command, rename = "top-level")]
pub async fn top_level(ctx: Context<'_>) -> Result<(), Error> {
    let lines = ranking_lines(
        ctx,
        |u| (u.level, u.xp),
        |u| format!("Nível **{}** | **{}** XP", u.level, format::thousands(u.xp)),
    )
    .await;
    send_embed(ctx, ranking_embed("🏆 Top 10 - Maiores Níveis", Color::from_rgb(155, 89, 182), lines)).await
}

/// Veja suas missões disponíveis
#[poise::command(slash_command, prefix_command, rename = "missoes")]
pub async fn missions(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let user = {
        let mut store = ctx.data().store.write().await;
        if missions::ensure_missions(store.user_mut(user_id), &mut thread_rng()) {
            store.save_users()?;
        }
        store.user(user_id)
    };

    let mut embed = CreateEmbed::default()
        .title("📋 Suas Missões")
        .description(format!("**{}** - Missões disponíveis", ctx.author().mention()))
        .color(Color::from_rgb(52, 152, 219));
    for (idx, mission) in user.missions.iter().enumerate() {
        let status = if mission.is_complete() { "✅" } else { "⏳" };
        embed = embed.field(
            format!("{status} {}. {}", idx + 1, mission.name),
            format!(
                "{}\nProgresso: **{}/{}**\nRecompensa: **{}** 🔮 + **{}** XP",
                mission.description,
                mission.progress.min(mission.objective),
                mission.objective,
                mission.reward_souls,
                mission.reward_xp
            ),
            false,
        );
    }
    embed = embed
        .field(
            "📊 Estatísticas",
            format!("Missões completas: **{}**", user.completed_missions.len()),
            false,
        )
        .thumbnail(ctx.author().face())
        .footer(footer("Sistema de Missões"));
    send_embed(ctx, embed).await
}

/// Reivindique a recompensa de uma missão completa
#[poise::command(slash_command, prefix_command, rename = "claim-missao")]
pub async fn claim_mission(
    ctx: Context<'_>,
    #[description = "Número da missão para reivindicar (1, 2 ou 3)"] numero: usize,
) -> Result<(), Error> {
    let user_id = ctx.author().id;
    let claimed = {
        let mut store = ctx.data().store.write().await;
        let result = missions::claim_mission(store.user_mut(user_id), numero);
        if result.is_ok() {
            store.save_users()?;
        }
        result
    };
    let claimed = match claimed {
        Ok(claimed) => claimed,
        Err(e) => return refuse(ctx, e).await,
    };

    let mut embed = CreateEmbed::default()
        .title("🎉 Missão Reivindicada!")
        .description(format!(
            "Você reivindicou a recompensa da missão **{}**!",
            claimed.mission.name
        ))
        .color(Color::from_rgb(46, 204, 113))
        .field("💰 Almas ganhas", format!("**{}** 🔮", claimed.mission.reward_souls), true)
        .field("⭐ XP ganho", format!("**{}** XP", claimed.mission.reward_xp), true);
    if let Some(level) = claimed.level_up {
        embed = embed.field("🎉 Level Up!", format!("Você subiu para o nível **{level}**!"), false);
    }
    send_embed(ctx, embed).await
}
