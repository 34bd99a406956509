use chrono::{DateTime, Utc};
use poise::serenity_prelude::UserId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentKind {
    Warn,
    Mute,
    Kick,
    Ban,
    Unban,
    VoiceMute,
    Jail,
}

impl PunishmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Warn => "⚠️ Advertência",
            Self::Mute => "🔇 Mute",
            Self::Kick => "👢 Kick",
            Self::Ban => "🔨 Ban",
            Self::Unban => "✅ Unban",
            Self::VoiceMute => "🔇 Mute em call",
            Self::Jail => "🔒 Prisão",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PunishmentRecord {
    pub kind: PunishmentKind,
    pub target: UserId,
    pub moderator: UserId,
    pub reason: String,
    pub duration_secs: Option<u64>,
    pub at: DateTime<Utc>,
}

impl PunishmentRecord {
    pub fn new(
        kind: PunishmentKind,
        target: UserId,
        moderator: UserId,
        reason: impl Into<String>,
        duration_secs: Option<u64>,
    ) -> Self {
        Self {
            kind,
            target,
            moderator,
            reason: reason.into(),
            duration_secs,
            at: Utc::now(),
        }
    }
}
