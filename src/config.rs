use anyhow::{bail, Context as _};
use poise::serenity_prelude::ChannelId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_PREFIX: &str = "sprt!";
const DEFAULT_DATA_DIR: &str = "data";
const LEGACY_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub data_dir: PathBuf,
    pub prefix: String,
    pub log_channel: Option<ChannelId>,
}

#[derive(Deserialize, Default)]
struct LegacyConfig {
    #[serde(rename = "TOKEN")]
    token: Option<String>,
}

impl Config {
    /// Reads the bot configuration from the environment, after `.env` has been loaded.
    pub fn from_env() -> anyhow::Result<Self> {
        let token = match std::env::var("DISCORD_TOKEN").or_else(|_| std::env::var("TOKEN")) {
            Ok(token) => token,
            Err(_) => token_from_file(Path::new(LEGACY_CONFIG_FILE))?,
        };

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let prefix = std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

        let log_channel = match std::env::var("LOG_CHANNEL_ID") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .map(ChannelId::new)
                    .with_context(|| format!("LOG_CHANNEL_ID is not a channel id: {raw}"))?,
            ),
            Err(_) => {
                warn!("LOG_CHANNEL_ID not set, moderation logs will not be posted");
                None
            }
        };

        info!("Using data directory {}", data_dir.display());

        Ok(Self {
            token,
            data_dir,
            prefix,
            log_channel,
        })
    }
}

fn token_from_file(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        bail!("DISCORD_TOKEN not set and {} not found", path.display());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let legacy: LegacyConfig = serde_json::from_str(&raw).unwrap_or_default();
    match legacy.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("no TOKEN field in {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_token_from_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"TOKEN": "abc.def"}"#).unwrap();
        assert_eq!(token_from_file(&path).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(token_from_file(&path).is_err());

        std::fs::write(&path, r#"{"TOKEN": ""}"#).unwrap();
        assert!(token_from_file(&path).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(token_from_file(&path).is_err());
    }
}
