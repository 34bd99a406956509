use chrono::Utc;
use poise::serenity_prelude::{
    self as serenity, ButtonStyle, ChannelId, ChannelType, Color, ComponentInteraction,
    CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditMember,
    EditRole, GuildId, Mentionable, ModalInteractionCollector, Permissions, RoleId, Timestamp, UserId,
};
use poise::{CreateReply, Modal};
use std::time::Duration;
use tracing::{error, info, warn};

use super::{footer, refuse, send_embed};
use crate::format;
use crate::moderation::{
    check_target, parse_duration, parse_role, parse_user_id, RoleRef, Standing,
    MAX_TIMEOUT_SECS, PRISON_CHANNEL,
};
use crate::store::punishment::{PunishmentKind, PunishmentRecord};
use crate::{Context, Data, Error};

const MODAL_TIMEOUT: Duration = Duration::from_secs(600);

/// Appends to the punishment log and mirrors the action to the log channel.
pub async fn record_punishment(ctx: &serenity::Context, data: &Data, record: PunishmentRecord) {
    let embed = punishment_embed(&record);
    {
        let mut store = data.store.write().await;
        store.record_punishment(record);
        if let Err(e) = store.save() {
            error!("Failed to save punishment log: {}", e);
        }
    }
    if let Some(channel) = data.config.log_channel {
        if let Err(e) = channel.send_message(ctx, CreateMessage::new().embed(embed)).await {
            warn!("Failed to post moderation log to {}: {}", channel, e);
        }
    }
}

fn punishment_embed(record: &PunishmentRecord) -> CreateEmbed {
    let color = match record.kind {
        PunishmentKind::Warn => Color::from_rgb(230, 126, 34),
        PunishmentKind::Mute | PunishmentKind::VoiceMute => Color::from_rgb(52, 152, 219),
        PunishmentKind::Kick => Color::from_rgb(241, 196, 15),
        PunishmentKind::Ban | PunishmentKind::Jail => Color::from_rgb(231, 76, 60),
        PunishmentKind::Unban => Color::from_rgb(46, 204, 113),
    };
    let mut embed = CreateEmbed::default()
        .title(record.kind.label())
        .color(color)
        .field("👤 Usuário", record.target.mention().to_string(), true)
        .field("🔧 Moderador", record.moderator.mention().to_string(), true)
        .field("📝 Motivo", record.reason.clone(), false);
    if let Some(secs) = record.duration_secs {
        embed = embed.field("⏳ Duração", format::compact(secs), true);
    }
    embed.footer(footer("Moderação")).timestamp(Timestamp::now())
}

fn reason_or_default(reason: Option<String>, fallback: &str) -> String {
    reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn voice_channel_of(ctx: Context<'_>, user_id: UserId) -> Option<ChannelId> {
    ctx.guild()
        .and_then(|guild| guild.voice_states.get(&user_id).and_then(|state| state.channel_id))
}

/// Schedules `action` after `secs`, logging failures.
fn after<F>(secs: u64, what: &'static str, action: F)
where
    F: std::future::Future<Output = Result<(), serenity::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        if let Err(e) = action.await {
            warn!("Timed {} failed: {}", what, e);
        }
    });
}

fn guild(ctx: Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id().ok_or_else(|| "command only works in a server".into())
}

/// Adiciona um cargo existente; opcionalmente remove após a duração
#[poise::command(
    slash_command,
    prefix_command,
    rename = "addcargo",
    guild_only,
    required_permissions = "MANAGE_ROLES"
)]
pub async fn add_role(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Cargo"] cargo: serenity::Role,
    #[description = "Duração (s/m/h/d)"] duracao: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let secs = match duracao.as_deref().map(parse_duration) {
        Some(None) | Some(Some(0)) => {
            return refuse(ctx, "Duração inválida. Use s/m/h/d (ex: 10m).").await
        }
        Some(Some(secs)) => Some(secs),
        None => None,
    };

    let reason = format!("Adicionado por {}", ctx.author().name);
    if let Err(e) = ctx
        .http()
        .add_member_role(guild_id, membro.user.id, cargo.id, Some(reason.as_str()))
        .await
    {
        warn!("Failed to add role {} to {}: {}", cargo.id, membro.user.id, e);
        return refuse(ctx, "Não tenho permissão para gerenciar cargos neste membro.").await;
    }
    ctx.say(format!("✅ Cargo `{}` adicionado a {}", cargo.name, membro.mention()))
        .await?;

    if let Some(secs) = secs {
        let http = ctx.serenity_context().http.clone();
        let (user_id, role_id) = (membro.user.id, cargo.id);
        after(secs, "role removal", async move {
            http.remove_member_role(guild_id, user_id, role_id, Some("Tempo de role expirado"))
                .await
        });
        ctx.say(format!(
            "⏳ O cargo `{}` será removido de {} em {}.",
            cargo.name,
            membro.mention(),
            format::compact(secs)
        ))
        .await?;
    }
    Ok(())
}

/// Remove um cargo existente do membro
#[poise::command(
    slash_command,
    prefix_command,
    rename = "removercargo",
    guild_only,
    required_permissions = "MANAGE_ROLES"
)]
pub async fn remove_role(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Cargo"] cargo: serenity::Role,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let reason = format!("Removido por {}", ctx.author().name);
    match ctx
        .http()
        .remove_member_role(guild_id, membro.user.id, cargo.id, Some(reason.as_str()))
        .await
    {
        Ok(()) => {
            ctx.say(format!("✅ Cargo `{}` removido de {}", cargo.name, membro.mention()))
                .await?;
            Ok(())
        }
        Err(e) => {
            warn!("Failed to remove role {} from {}: {}", cargo.id, membro.user.id, e);
            refuse(ctx, "Não tenho permissão para gerenciar cargos neste membro.").await
        }
    }
}

async fn resolve_role(ctx: Context<'_>, guild_id: GuildId, text: &str) -> Result<Option<serenity::Role>, Error> {
    let Some(wanted) = parse_role(text) else {
        return Ok(None);
    };
    let roles = guild_id.roles(ctx).await?;
    Ok(match wanted {
        RoleRef::Id(id) => roles.get(&id).cloned(),
        RoleRef::Name(name) => roles.into_values().find(|role| role.name == name),
    })
}

/// Cria um cargo (se não existir) e adiciona ao membro
#[poise::command(
    slash_command,
    prefix_command,
    rename = "criarcargo",
    guild_only,
    required_permissions = "MANAGE_ROLES"
)]
pub async fn create_role(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Nome ou menção do cargo"]
    #[rest]
    cargo: String,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let role = match resolve_role(ctx, guild_id, &cargo).await? {
        Some(role) => role,
        None => {
            let name = cargo.trim();
            if name.is_empty() {
                return refuse(ctx, "Especifique o nome do cargo ou mencione o cargo.").await;
            }
            match guild_id.create_role(ctx, EditRole::new().name(name)).await {
                Ok(role) => {
                    info!("Created role {} in {}", role.name, guild_id);
                    role
                }
                Err(e) => {
                    warn!("Failed to create role {}: {}", name, e);
                    return refuse(ctx, "Não tenho permissão para criar cargos neste servidor.").await;
                }
            }
        }
    };

    let reason = format!("Criado/adicionado por {}", ctx.author().name);
    if let Err(e) = ctx
        .http()
        .add_member_role(guild_id, membro.user.id, role.id, Some(reason.as_str()))
        .await
    {
        warn!("Failed to add role {} to {}: {}", role.id, membro.user.id, e);
        return refuse(ctx, "Não tenho permissão para gerenciar cargos neste membro.").await;
    }
    ctx.say(format!("✅ Cargo `{}` aplicado a {}", role.name, membro.mention()))
        .await?;
    Ok(())
}

/// Remove o cargo do membro; se ficar vazio, deleta o cargo
#[poise::command(
    slash_command,
    prefix_command,
    rename = "deletecargo",
    guild_only,
    required_permissions = "MANAGE_ROLES"
)]
pub async fn delete_role(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Nome ou menção do cargo"]
    #[rest]
    cargo: String,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let Some(role) = resolve_role(ctx, guild_id, &cargo).await? else {
        return refuse(ctx, "Cargo não encontrado neste servidor.").await;
    };

    if membro.roles.contains(&role.id) {
        let reason = format!("Removido por {}", ctx.author().name);
        if let Err(e) = ctx
            .http()
            .remove_member_role(guild_id, membro.user.id, role.id, Some(reason.as_str()))
            .await
        {
            warn!("Failed to remove role {} from {}: {}", role.id, membro.user.id, e);
            return refuse(ctx, "Não tenho permissão para gerenciar cargos neste membro.").await;
        }
        ctx.say(format!("✅ Cargo `{}` removido de {}", role.name, membro.mention()))
            .await?;
    } else {
        ctx.say(format!(
            "⚠️ {} não possuía o cargo `{}`",
            membro.mention(),
            role.name
        ))
        .await?;
    }

    let still_used = role_in_use(ctx, guild_id, role.id, membro.user.id).await?;
    if !still_used {
        match guild_id.delete_role(ctx, role.id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Cargo `{}` estava vazio e foi deletado.", role.name))
                    .await?;
            }
            Err(e) => {
                warn!("Failed to delete role {}: {}", role.id, e);
                ctx.say("⚠️ Removido do membro, mas não tenho permissão para deletar o cargo.")
                    .await?;
            }
        }
    }
    Ok(())
}

/// Whether any member other than `except` still holds the role.
async fn role_in_use(ctx: Context<'_>, guild_id: GuildId, role_id: RoleId, except: UserId) -> Result<bool, Error> {
    let mut cursor = None;
    loop {
        let members = guild_id.members(ctx, Some(1000), cursor).await?;
        if members
            .iter()
            .any(|m| m.user.id != except && m.roles.contains(&role_id))
        {
            return Ok(true);
        }
        match members.last() {
            Some(last) if members.len() == 1000 => cursor = Some(last.user.id),
            _ => return Ok(false),
        }
    }
}

/// Mute em voice (opcionalmente temporário)
#[poise::command(
    slash_command,
    prefix_command,
    rename = "mutecall",
    guild_only,
    required_permissions = "MUTE_MEMBERS"
)]
pub async fn mute_voice(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Duração (s/m/h/d)"] duracao: Option<String>,
    #[description = "Motivo"]
    #[rest]
    motivo: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    if voice_channel_of(ctx, membro.user.id).is_none() {
        return refuse(ctx, "Membro não está em um canal de voz.").await;
    }
    let reason = reason_or_default(motivo, "Sem motivo");
    let secs = duracao.as_deref().and_then(parse_duration).filter(|s| *s > 0);

    if let Err(e) = guild_id
        .edit_member(ctx, membro.user.id, EditMember::new().mute(true).audit_log_reason(&reason))
        .await
    {
        warn!("Failed to voice mute {}: {}", membro.user.id, e);
        return refuse(ctx, "Não tenho permissão para mutar membros em voice.").await;
    }
    ctx.say(format!("🔇 {} foi mutado na call. Motivo: {reason}", membro.mention()))
        .await?;

    if let Some(secs) = secs {
        let http = ctx.serenity_context().http.clone();
        let user_id = membro.user.id;
        after(secs, "voice unmute", async move {
            guild_id
                .edit_member(&http, user_id, EditMember::new().mute(false).audit_log_reason("Tempo de mute expirado"))
                .await
                .map(|_| ())
        });
    }

    let record = PunishmentRecord::new(PunishmentKind::VoiceMute, membro.user.id, ctx.author().id, reason, secs);
    record_punishment(ctx.serenity_context(), ctx.data(), record).await;
    Ok(())
}

/// Desmuta em voice
#[poise::command(
    slash_command,
    prefix_command,
    rename = "unmutecall",
    guild_only,
    required_permissions = "MUTE_MEMBERS"
)]
pub async fn unmute_voice(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    if voice_channel_of(ctx, membro.user.id).is_none() {
        return refuse(ctx, "Membro não está em um canal de voz.").await;
    }
    match guild_id
        .edit_member(ctx, membro.user.id, EditMember::new().mute(false).audit_log_reason("Fim do mute"))
        .await
    {
        Ok(_) => {
            ctx.say(format!("🔊 {} foi desmutado na call.", membro.mention()))
                .await?;
            Ok(())
        }
        Err(e) => {
            warn!("Failed to voice unmute {}: {}", membro.user.id, e);
            refuse(ctx, "Não tenho permissão para desmutar membros em voice.").await
        }
    }
}

async fn prison_channel(ctx: Context<'_>, guild_id: GuildId) -> Result<ChannelId, Error> {
    let channels = guild_id.channels(ctx).await?;
    if let Some(channel) = channels
        .values()
        .find(|c| c.kind == ChannelType::Voice && c.name == PRISON_CHANNEL)
    {
        return Ok(channel.id);
    }
    info!("Creating {} voice channel in {}", PRISON_CHANNEL, guild_id);
    let channel = guild_id
        .create_channel(ctx, CreateChannel::new(PRISON_CHANNEL).kind(ChannelType::Voice))
        .await?;
    Ok(channel.id)
}

/// Move para o canal 'Prisão' e muta/ensurdece
#[poise::command(
    slash_command,
    prefix_command,
    rename = "prender",
    guild_only,
    required_permissions = "MOVE_MEMBERS"
)]
pub async fn jail(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Duração (s/m/h/d)"] duracao: Option<String>,
    #[description = "Motivo"]
    #[rest]
    motivo: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let reason = reason_or_default(motivo, "Sem motivo");
    let secs = duracao.as_deref().and_then(parse_duration).filter(|s| *s > 0);

    let outcome: Result<(), Error> = async {
        let prison = prison_channel(ctx, guild_id).await?;
        let mut edit = EditMember::new().mute(true).deafen(true).audit_log_reason(&reason);
        if voice_channel_of(ctx, membro.user.id).is_some() {
            edit = edit.voice_channel(prison);
        }
        guild_id.edit_member(ctx, membro.user.id, edit).await?;
        Ok(())
    }
    .await;
    if let Err(e) = outcome {
        warn!("Failed to jail {}: {}", membro.user.id, e);
        return refuse(ctx, "Não tenho permissão para mover/mutar membros.").await;
    }
    ctx.say(format!("🔒 {} foi preso. Motivo: {reason}", membro.mention()))
        .await?;

    if let Some(secs) = secs {
        let http = ctx.serenity_context().http.clone();
        let user_id = membro.user.id;
        after(secs, "release", async move {
            guild_id
                .edit_member(
                    &http,
                    user_id,
                    EditMember::new()
                        .mute(false)
                        .deafen(false)
                        .audit_log_reason("Tempo de prisão expirado"),
                )
                .await
                .map(|_| ())
        });
    }

    let record = PunishmentRecord::new(PunishmentKind::Jail, membro.user.id, ctx.author().id, reason, secs);
    record_punishment(ctx.serenity_context(), ctx.data(), record).await;
    Ok(())
}

/// Desmuta e ensurdece o membro, liberando-o
#[poise::command(
    slash_command,
    prefix_command,
    rename = "soltar",
    guild_only,
    required_permissions = "MOVE_MEMBERS"
)]
pub async fn release(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let edit = EditMember::new().mute(false).deafen(false).audit_log_reason("Solto");
    match guild_id.edit_member(ctx, membro.user.id, edit).await {
        Ok(_) => {
            ctx.say(format!("✅ {} foi solto.", membro.mention())).await?;
            Ok(())
        }
        Err(e) => {
            warn!("Failed to release {}: {}", membro.user.id, e);
            refuse(ctx, "Não tenho permissão para desmutar/desensurdecer membros.").await
        }
    }
}

/// Bane permanentemente o membro
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "BAN_MEMBERS"
)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::Member,
    #[description = "Motivo"]
    #[rest]
    motivo: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let reason = reason_or_default(motivo, "Sem motivo");
    if let Err(e) = guild_id.ban_with_reason(ctx, membro.user.id, 0, &reason).await {
        warn!("Failed to ban {}: {}", membro.user.id, e);
        return refuse(ctx, "Não tenho permissão para banir este membro.").await;
    }
    ctx.say(format!("⛔ {} foi banido. Motivo: {reason}", membro.mention()))
        .await?;

    let record = PunishmentRecord::new(PunishmentKind::Ban, membro.user.id, ctx.author().id, reason, None);
    record_punishment(ctx.serenity_context(), ctx.data(), record).await;
    Ok(())
}

/// Remove o ban pelo ID do usuário
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "BAN_MEMBERS"
)]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "ID do usuário"] id: String,
    #[description = "Motivo"]
    #[rest]
    motivo: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild(ctx)?;
    let Some(user_id) = parse_user_id(&id) else {
        return refuse(ctx, "ID de usuário inválido.").await;
    };
    let reason = reason_or_default(motivo, "Sem motivo");
    if let Err(e) = guild_id.unban(ctx, user_id).await {
        warn!("Failed to unban {}: {}", user_id, e);
        return refuse(ctx, "Usuário não encontrado nos bans ou sem permissão para desbanir.").await;
    }
    ctx.say(format!("✅ {} foi desbanido. Motivo: {reason}", user_id.mention()))
        .await?;

    let record = PunishmentRecord::new(PunishmentKind::Unban, user_id, ctx.author().id, reason, None);
    record_punishment(ctx.serenity_context(), ctx.data(), record).await;
    Ok(())
}

/// Histórico de punições de um membro
#[poise::command(
    slash_command,
    prefix_command,
    rename = "punicoes",
    guild_only,
    required_permissions = "MODERATE_MEMBERS",
    ephemeral
)]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Membro"] membro: serenity::User,
) -> Result<(), Error> {
    let lines: Vec<String> = {
        let store = ctx.data().store.read().await;
        store
            .punishments_for(membro.id)
            .iter()
            .rev()
            .take(10)
            .map(|p| {
                let duration = p
                    .duration_secs
                    .map(|s| format!(" ({})", format::compact(s)))
                    .unwrap_or_default();
                format!(
                    "{} {}{duration} por {}\n└ {}",
                    p.kind.label(),
                    format::discord_timestamp(p.at.timestamp(), format::TimestampStyle::ShortDate),
                    p.moderator.mention(),
                    p.reason
                )
            })
            .collect()
    };

    let description = if lines.is_empty() {
        "Nenhuma punição registrada.".to_string()
    } else {
        lines.join("\n")
    };
    let embed = CreateEmbed::default()
        .title(format!("📜 Punições de {}", membro.name))
        .description(description)
        .color(Color::from_rgb(231, 76, 60))
        .footer(footer("Moderação"));
    send_embed(ctx, embed).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    Warn,
    Mute,
    Kick,
    Ban,
}

impl PanelAction {
    const ALL: [PanelAction; 4] = [Self::Warn, Self::Mute, Self::Kick, Self::Ban];

    fn custom_id(&self) -> &'static str {
        match self {
            Self::Warn => "panel_warn",
            Self::Mute => "panel_mute",
            Self::Kick => "panel_kick",
            Self::Ban => "panel_ban",
        }
    }

    fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.custom_id() == id)
    }

    fn permission(&self) -> Permissions {
        match self {
            Self::Warn | Self::Mute => Permissions::MODERATE_MEMBERS,
            Self::Kick => Permissions::KICK_MEMBERS,
            Self::Ban => Permissions::BAN_MEMBERS,
        }
    }

    fn kind(&self) -> PunishmentKind {
        match self {
            Self::Warn => PunishmentKind::Warn,
            Self::Mute => PunishmentKind::Mute,
            Self::Kick => PunishmentKind::Kick,
            Self::Ban => PunishmentKind::Ban,
        }
    }
}

#[derive(Debug, Modal)]
#[name = "Aplicar Advertência"]
struct WarnModal {
    #[name = "ID ou @ do membro"]
    #[placeholder = "123456789012345678"]
    #[max_length = 32]
    member: String,
    #[name = "Motivo"]
    #[paragraph]
    #[max_length = 250]
    reason: String,
}

#[derive(Debug, Modal)]
#[name = "Aplicar Mute"]
struct MuteModal {
    #[name = "ID ou @ do membro"]
    #[placeholder = "123456789012345678"]
    #[max_length = 32]
    member: String,
    #[name = "Duração (ex: 10m, 2h, 1d)"]
    #[placeholder = "10m"]
    #[max_length = 8]
    duration: String,
    #[name = "Motivo"]
    #[paragraph]
    #[max_length = 250]
    reason: String,
}

#[derive(Debug, Modal)]
#[name = "Expulsar Membro"]
struct KickModal {
    #[name = "ID ou @ do membro"]
    #[placeholder = "123456789012345678"]
    #[max_length = 32]
    member: String,
    #[name = "Motivo"]
    #[paragraph]
    #[max_length = 250]
    reason: String,
}

#[derive(Debug, Modal)]
#[name = "Banir Membro"]
struct BanModal {
    #[name = "ID ou @ do membro"]
    #[placeholder = "123456789012345678"]
    #[max_length = 32]
    member: String,
    #[name = "Motivo"]
    #[paragraph]
    #[max_length = 250]
    reason: String,
}

/// Painel de moderação com botões
#[poise::command(
    slash_command,
    prefix_command,
    rename = "painel",
    guild_only,
    default_member_permissions = "MODERATE_MEMBERS"
)]
pub async fn panel(ctx: Context<'_>) -> Result<(), Error> {
    let embed = CreateEmbed::default()
        .title("🔧 Painel de Moderação")
        .description("Escolha uma das ações abaixo:")
        .color(Color::from_rgb(231, 76, 60))
        .field("⚠️ Advertência", "Aplicar advertência em um membro.", false)
        .field("🔇 Mute", "Mutar um membro temporariamente.", false)
        .field("👢 Kick", "Expulsar um membro.", false)
        .field("🔨 Ban", "Banir um membro.", false)
        .footer(footer("Moderação"));
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(PanelAction::Warn.custom_id())
            .label("Advertência")
            .style(ButtonStyle::Danger),
        CreateButton::new(PanelAction::Mute.custom_id())
            .label("Aplicar Mute")
            .style(ButtonStyle::Danger),
        CreateButton::new(PanelAction::Kick.custom_id())
            .label("Kick")
            .style(ButtonStyle::Secondary),
        CreateButton::new(PanelAction::Ban.custom_id())
            .label("Ban")
            .style(ButtonStyle::Secondary),
    ]);
    ctx.send(CreateReply::default().embed(embed).components(vec![buttons]))
        .await?;
    Ok(())
}

/// Fields submitted through any of the panel modals.
struct PanelForm {
    member: String,
    duration: Option<String>,
    reason: String,
}

async fn ask_form(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    action: PanelAction,
) -> Result<Option<(serenity::ModalInteraction, PanelForm)>, Error> {
    let custom_id = format!("{}_{}", action.custom_id(), component.id);
    let modal = match action {
        PanelAction::Warn => WarnModal::create(None, custom_id.clone()),
        PanelAction::Mute => MuteModal::create(None, custom_id.clone()),
        PanelAction::Kick => KickModal::create(None, custom_id.clone()),
        PanelAction::Ban => BanModal::create(None, custom_id.clone()),
    };
    component.create_response(ctx, modal).await?;

    let Some(submit) = ModalInteractionCollector::new(&ctx.shard)
        .filter(move |m| m.data.custom_id == custom_id)
        .timeout(MODAL_TIMEOUT)
        .await
    else {
        return Ok(None);
    };

    let data = submit.data.clone();
    let form = match action {
        PanelAction::Warn => WarnModal::parse(data).map(|m| PanelForm {
            member: m.member,
            duration: None,
            reason: m.reason,
        }),
        PanelAction::Mute => MuteModal::parse(data).map(|m| PanelForm {
            member: m.member,
            duration: Some(m.duration),
            reason: m.reason,
        }),
        PanelAction::Kick => KickModal::parse(data).map(|m| PanelForm {
            member: m.member,
            duration: None,
            reason: m.reason,
        }),
        PanelAction::Ban => BanModal::parse(data).map(|m| PanelForm {
            member: m.member,
            duration: None,
            reason: m.reason,
        }),
    }?;
    Ok(Some((submit, form)))
}

/// Who the panel may act on, read from the guild cache.
fn standing(
    ctx: &serenity::Context,
    guild_id: GuildId,
    moderator: &serenity::Member,
    target: &serenity::Member,
) -> Option<Standing> {
    let guild = ctx.cache.guild(guild_id)?;
    let top = |member: &serenity::Member| {
        guild
            .member_highest_role(member)
            .map(|role| role.position)
            .unwrap_or(0)
    };
    Some(Standing {
        moderator: moderator.user.id,
        moderator_top_role: top(moderator),
        target: target.user.id,
        target_top_role: top(target),
        target_is_bot: target.user.bot,
        owner: guild.owner_id,
    })
}

/// Applies the action and returns the public outcome line, or the error shown to the moderator.
async fn apply_panel_action(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: GuildId,
    moderator: &serenity::Member,
    action: PanelAction,
    form: PanelForm,
) -> Result<String, String> {
    let target_id = parse_user_id(&form.member).ok_or("**ID ou menção inválida!**")?;
    let target = guild_id
        .member(ctx, target_id)
        .await
        .map_err(|_| "**Esse membro não está no servidor!**".to_string())?;
    let standing = standing(ctx, guild_id, moderator, &target).ok_or("Servidor indisponível no cache.")?;
    check_target(&standing).map_err(|e| e.to_string())?;

    let reason = form.reason.trim().to_string();
    let mut duration_secs = None;
    let outcome = match action {
        PanelAction::Warn => format!("⚠️ **{} foi advertido.**\n📄 Motivo: `{reason}`", target.mention()),
        PanelAction::Mute => {
            let raw = form.duration.unwrap_or_default();
            let secs = parse_duration(&raw)
                .filter(|s| (1..=MAX_TIMEOUT_SECS).contains(s))
                .ok_or("**Duração inválida!** Use ex: `10m`, `2h`, `1d` (máx. 28d).")?;
            let until = Timestamp::from_unix_timestamp(Utc::now().timestamp() + secs as i64)
                .map_err(|e| e.to_string())?;
            guild_id
                .edit_member(
                    ctx,
                    target_id,
                    EditMember::new()
                        .disable_communication_until_datetime(until)
                        .audit_log_reason(&reason),
                )
                .await
                .map_err(|e| format!("Erro ao aplicar mute!\n```{e}```"))?;
            duration_secs = Some(secs);
            format!(
                "🔇 **{} foi mutado por `{}`**\n📄 Motivo: `{reason}`",
                target.mention(),
                format::compact(secs)
            )
        }
        PanelAction::Kick => {
            guild_id
                .kick_with_reason(ctx, target_id, &reason)
                .await
                .map_err(|e| format!("Erro ao expulsar!\n```{e}```"))?;
            format!("👢 **{} foi expulso.**\n📄 Motivo: `{reason}`", target.mention())
        }
        PanelAction::Ban => {
            guild_id
                .ban_with_reason(ctx, target_id, 0, &reason)
                .await
                .map_err(|e| format!("Erro ao banir!\n```{e}```"))?;
            format!("🔨 **{} foi banido.**\n📄 Motivo: `{reason}`", target.mention())
        }
    };

    info!("{:?} applied to {} by {}", action, target_id, moderator.user.id);
    let record = PunishmentRecord::new(action.kind(), target_id, moderator.user.id, reason, duration_secs);
    record_punishment(ctx, data, record).await;
    Ok(outcome)
}

/// Routes clicks on the moderation panel buttons. Returns whether the interaction was a panel click.
pub async fn handle_panel_button(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    data: &Data,
) -> Result<bool, Error> {
    let Some(action) = PanelAction::from_custom_id(&component.data.custom_id) else {
        return Ok(false);
    };
    let (Some(guild_id), Some(moderator)) = (component.guild_id, component.member.as_ref()) else {
        return Ok(true);
    };

    let allowed = moderator
        .permissions
        .is_some_and(|p| p.administrator() || p.contains(action.permission()));
    if !allowed {
        component
            .create_response(
                ctx,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("❌ Você não tem permissão para usar esta ação.")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(true);
    }

    let Some((submit, form)) = ask_form(ctx, component, action).await? else {
        return Ok(true);
    };
    match apply_panel_action(ctx, data, guild_id, moderator, action, form).await {
        Ok(outcome) => {
            submit
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(outcome)),
                )
                .await?;
        }
        Err(message) => {
            submit
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format!("❌ {message}"))
                            .ephemeral(true),
                    ),
                )
                .await?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_ids_round_trip() {
        for action in PanelAction::ALL {
            assert_eq!(PanelAction::from_custom_id(action.custom_id()), Some(action));
        }
        assert_eq!(PanelAction::from_custom_id("shop_next"), None);
    }

    #[test]
    fn panel_permissions() {
        assert_eq!(PanelAction::Kick.permission(), Permissions::KICK_MEMBERS);
        assert_eq!(PanelAction::Mute.kind(), PunishmentKind::Mute);
    }
}
