use chrono::Utc;
use poise::serenity_prelude::{
    self as serenity, ButtonStyle, Color, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, EditMessage,
    Mentionable, Timestamp,
};
use poise::CreateReply;
use std::time::Duration;
use tracing::info;

use super::{footer, refuse, send_embed};
use crate::format::{self, discord_timestamp, TimestampStyle};
use crate::social::{self, SocialError};
use crate::{Context, Error};

const PROPOSAL_TIMEOUT: Duration = Duration::from_secs(300);
const HEARTS_GIF: &str = "https://i.imgur.com/4M7IWwP.gif";

fn pink() -> Color {
    Color::from_rgb(233, 30, 99)
}

/// Mostra um perfil bonito e completo do usuário.
#[poise::command(slash_command, prefix_command, rename = "perfil", guild_only)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Membro (opcional)"] membro: Option<serenity::User>,
) -> Result<(), Error> {
    let target = membro.as_ref().unwrap_or_else(|| ctx.author());
    let joined_at = match ctx.guild_id() {
        Some(guild_id) => guild_id.member(ctx, target.id).await.ok().and_then(|m| m.joined_at),
        None => None,
    };
    let user = ctx.data().store.read().await.user(target.id);
    let current = ctx.data().voice.current(target.id, Utc::now());

    let partner = user
        .partner
        .map(|id| format!("💍 {}", id.mention()))
        .unwrap_or_else(|| "💔 Solteiro(a)".to_string());
    let about = user
        .about
        .clone()
        .unwrap_or_else(|| "❌ Nenhum Sobre Mim definido ainda.".to_string());
    let in_call = current
        .map(format::hms)
        .unwrap_or_else(|| "❌ Não está em call".to_string());

    let mut embed = CreateEmbed::default()
        .title(format!("👤 Perfil de {}", target.name))
        .color(Color::from_rgb(231, 76, 60))
        .thumbnail(target.face())
        .field(
            "📅 Conta criada em:",
            discord_timestamp(target.created_at().unix_timestamp(), TimestampStyle::ShortDate),
            true,
        )
        .field(
            "📥 Entrou no servidor:",
            joined_at
                .map(|at| discord_timestamp(at.unix_timestamp(), TimestampStyle::ShortDate))
                .unwrap_or_else(|| "Desconhecido".to_string()),
            true,
        )
        .field("📝 Sobre Mim:", about, false)
        .field("❤️ Relacionamento:", partner, false)
        .field("🎧 Tempo atual em call:", in_call, true)
        .field("⏲️ Tempo total acumulado:", format::hms(user.voice_seconds), true)
        .field(
            "🔮 Almas / Nível",
            format!("**{}** 🔮 | Nível **{}**", format::thousands(user.souls), user.level),
            false,
        )
        .footer(footer("Sistema de Perfil"));

    // Banners only come back from a full user fetch.
    if let Ok(full) = ctx.http().get_user(target.id).await {
        if let Some(banner) = full.banner_url() {
            embed = embed.image(banner);
        }
    }
    send_embed(ctx, embed).await
}

/// Define seu Sobre Mim.
#[poise::command(slash_command, prefix_command, rename = "set-sobre", ephemeral)]
pub async fn set_about(
    ctx: Context<'_>,
    #[description = "Texto do Sobre Mim (máx. 100 caracteres)"]
    #[rest]
    texto: String,
) -> Result<(), Error> {
    let result = {
        let mut store = ctx.data().store.write().await;
        let result = social::set_about(&mut store, ctx.author().id, &texto);
        if result.is_ok() {
            store.save()?;
        }
        result
    };
    match result {
        Ok(()) => {
            ctx.say("✅ Sobre Mim atualizado!").await?;
            Ok(())
        }
        Err(e) => refuse(ctx, e).await,
    }
}

fn proposal_buttons(disabled: bool) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new("marry_accept")
            .label("💍 Aceitar")
            .style(ButtonStyle::Success)
            .disabled(disabled),
        CreateButton::new("marry_decline")
            .label("❌ Recusar")
            .style(ButtonStyle::Danger)
            .disabled(disabled),
    ])]
}

/// Peça alguém em casamento!
#[poise::command(slash_command, prefix_command, rename = "casar", guild_only)]
pub async fn marry(
    ctx: Context<'_>,
    #[description = "A pessoa que você quer casar"] pessoa: serenity::User,
) -> Result<(), Error> {
    let proposer = ctx.author().clone();
    if pessoa.bot {
        return refuse(ctx, SocialError::BotProposal).await;
    }
    let check = social::check_proposal(&*ctx.data().store.read().await, proposer.id, pessoa.id);
    if let Err(e) = check {
        return refuse(ctx, e).await;
    }

    let embed = CreateEmbed::default()
        .title("💍 Pedido de Casamento")
        .description(format!(
            "{} está pedindo {} em casamento! 💕\n\n**{}**, você aceita este pedido?",
            proposer.mention(),
            pessoa.mention(),
            pessoa.name
        ))
        .color(pink())
        .thumbnail(proposer.face())
        .image(HEARTS_GIF)
        .footer(footer("Sistema de Casamento • Expira em 5 minutos"))
        .timestamp(Timestamp::now());

    // The proposal goes to the channel so the command itself stays hidden.
    ctx.send(CreateReply::default().content("💌 Pedido enviado!").ephemeral(true))
        .await?;
    let mut msg = ctx
        .channel_id()
        .send_message(
            ctx,
            CreateMessage::new().embed(embed).components(proposal_buttons(false)),
        )
        .await?;

    while let Some(interaction) = msg
        .await_component_interaction(&ctx.serenity_context().shard)
        .timeout(PROPOSAL_TIMEOUT)
        .await
    {
        if interaction.user.id != pessoa.id {
            interaction
                .create_response(
                    ctx.serenity_context(),
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("❌ Apenas a pessoa que recebeu o pedido pode responder!")
                            .ephemeral(true),
                    ),
                )
                .await?;
            continue;
        }

        let embed = if interaction.data.custom_id == "marry_accept" {
            let result = {
                let mut store = ctx.data().store.write().await;
                let result = social::marry(&mut store, proposer.id, pessoa.id);
                if result.is_ok() {
                    store.save()?;
                }
                result
            };
            if let Err(e) = result {
                interaction
                    .create_response(
                        ctx.serenity_context(),
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(format!("❌ {e}"))
                                .ephemeral(true),
                        ),
                    )
                    .await?;
                continue;
            }
            info!("{} and {} got married", proposer.id, pessoa.id);
            CreateEmbed::default()
                .title("💍 Casamento Realizado!")
                .description(format!(
                    "**{}** e **{}** estão agora casados! 💕",
                    proposer.mention(),
                    pessoa.mention()
                ))
                .color(pink())
                .image(HEARTS_GIF)
                .footer(footer("Sistema de Casamento"))
                .timestamp(Timestamp::now())
        } else {
            CreateEmbed::default()
                .title("💔 Pedido Recusado")
                .description(format!(
                    "{} recusou o pedido de casamento de {}.",
                    pessoa.mention(),
                    proposer.mention()
                ))
                .color(Color::from_rgb(231, 76, 60))
                .footer(footer("Sistema de Casamento"))
        };

        interaction
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(proposal_buttons(true)),
                ),
            )
            .await?;
        return Ok(());
    }

    let expired = CreateEmbed::default()
        .title("⏰ Tempo Esgotado")
        .description("O pedido de casamento expirou.")
        .color(Color::from_rgb(230, 126, 34));
    msg.edit(
        ctx,
        EditMessage::new().embed(expired).components(proposal_buttons(true)),
    )
    .await?;
    Ok(())
}

/// Divorcie-se de seu parceiro(a)
#[poise::command(slash_command, prefix_command, rename = "divorciar", ephemeral)]
pub async fn divorce(ctx: Context<'_>) -> Result<(), Error> {
    let result = {
        let mut store = ctx.data().store.write().await;
        let result = social::divorce(&mut store, ctx.author().id);
        if result.is_ok() {
            store.save()?;
        }
        result
    };
    match result {
        Ok(partner) => {
            ctx.say(format!("💔 Você se divorciou de {}.", partner.mention()))
                .await?;
            Ok(())
        }
        Err(e) => refuse(ctx, e).await,
    }
}
