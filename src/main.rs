mod commands;
mod config;
mod economy;
mod error;
mod events;
mod format;
mod moderation;
mod social;
mod store;
mod tasks;
mod voice;

use chrono::{DateTime, Utc};
use config::Config;
use events::event_handler;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use store::Store;
use tasks::long_hunt::LongHuntTask;
use tasks::status::StatusTask;
use tasks::TaskManager;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice::VoiceTracker;

#[derive(Clone)]
pub struct Data {
    pub store: Arc<RwLock<Store>>,
    pub voice: Arc<VoiceTracker>,
    pub config: Arc<Config>,
    pub started_at: DateTime<Utc>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Arc::new(Config::from_env()?);
    let store = Store::load(&config.data_dir)?;
    info!(
        "Loaded {} users and {} shop items",
        store.users.len(),
        store.catalog.shop.len()
    );

    let data = Data {
        store: Arc::new(RwLock::new(store)),
        voice: Arc::new(VoiceTracker::new()),
        config: config.clone(),
        started_at: Utc::now(),
    };

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let mut task_manager = TaskManager::new();
    task_manager.register_task(StatusTask::new());
    task_manager.register_task(LongHuntTask::new());

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());

                task_manager.run_all(ctx, data.clone()).await;
                Ok(data)
            })
        })
        .build();

    serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?
        .start()
        .await?;

    Ok(())
}
