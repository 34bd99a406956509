use chrono::Utc;
use poise::serenity_prelude::{self as serenity, Interaction};
use tracing::{debug, error, info};

use crate::store::user::MissionKind;
use crate::{voice, Data, Error};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            let is_bot = new.member.as_ref().is_some_and(|m| m.user.bot)
                || ctx.cache.user(new.user_id).is_some_and(|u| u.bot);
            if is_bot {
                return Ok(());
            }

            let was_in_call = old.as_ref().and_then(|state| state.channel_id).is_some();
            let is_in_call = new.channel_id.is_some();
            let now = Utc::now();

            if !was_in_call && is_in_call {
                debug!("{} joined voice", new.user_id);
                data.voice.join(new.user_id, now);
            } else if was_in_call && !is_in_call {
                if let Some(seconds) = data.voice.leave(new.user_id, now) {
                    let mut store = data.store.write().await;
                    voice::credit_session(store.user_mut(new.user_id), seconds);
                    store.save_users()?;
                    debug!("{} left voice after {}s", new.user_id, seconds);
                }
            }
        }
        serenity::FullEvent::Message { new_message } if !new_message.author.bot => {
            let mut store = data.store.write().await;
            let advanced = store
                .users
                .get_mut(&new_message.author.id)
                .is_some_and(|user| user.advance_missions(MissionKind::Messages, 1));
            if advanced {
                store.save_users()?;
            }
        }
        serenity::FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } => {
            // Panel clicks wait on a modal, so they run off the event loop.
            let (ctx, component, data) = (ctx.clone(), component.clone(), data.clone());
            tokio::spawn(async move {
                if let Err(e) =
                    crate::commands::moderation::handle_panel_button(&ctx, &component, &data).await
                {
                    error!("Error handling panel button: {}", e);
                }
            });
        }
        _ => {}
    }
    Ok(())
}
