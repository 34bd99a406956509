use chrono::Utc;
use poise::serenity_prelude::{self as serenity, Color, CreateEmbed, Mentionable, Timestamp};
use poise::CreateReply;

use super::{footer, ranking_embed, ranking_lines, send_embed};
use crate::format;
use crate::{Context, Error};

/// Mostra seu tempo atual na call.
#[poise::command(slash_command, prefix_command)]
pub async fn callstatus(ctx: Context<'_>) -> Result<(), Error> {
    let user = ctx.author();
    let Some(elapsed) = ctx.data().voice.current(user.id, Utc::now()) else {
        let embed = CreateEmbed::default()
            .title("❌ Não está em call")
            .description("Você precisa estar em uma call de voz para usar este comando.")
            .color(Color::from_rgb(231, 76, 60))
            .thumbnail(user.face())
            .footer(footer("Sistema de Call Status"));
        ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
        return Ok(());
    };

    let embed = CreateEmbed::default()
        .title("🎧 Status da Call")
        .description(format!("**{}** está em call!", user.mention()))
        .color(Color::from_rgb(52, 152, 219))
        .thumbnail(user.face())
        .field("⏱️ Tempo na call:", format!("**{}**", format::hms(elapsed)), false)
        .footer(footer("Sistema de Call Status"))
        .timestamp(Timestamp::now());
    send_embed(ctx, embed).await
}

/// Mostra o tempo em call de um membro (ou o seu)
#[poise::command(prefix_command, rename = "tempo")]
pub async fn time(ctx: Context<'_>, membro: Option<serenity::User>) -> Result<(), Error> {
    let target = membro.as_ref().unwrap_or_else(|| ctx.author());
    match ctx.data().voice.current(target.id, Utc::now()) {
        Some(elapsed) => {
            ctx.say(format!("⏱️ {} está em call há {}", target.name, format::hms(elapsed)))
                .await?
        }
        None => ctx.say(format!("❌ {} não está em call", target.name)).await?,
    };
    Ok(())
}

/// Mostra o ranking de tempo em call.
#[poise::command(slash_command, prefix_command, rename = "top-tempo")]
pub async fn top_time(ctx: Context<'_>) -> Result<(), Error> {
    let lines = ranking_lines(ctx, |u| u.voice_seconds, |u| format::hms(u.voice_seconds)).await;
    send_embed(ctx, ranking_embed("🏆 Top 10 - Tempo em Call", Color::from_rgb(255, 215, 0), lines)).await
}
