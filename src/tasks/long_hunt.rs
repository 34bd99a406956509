use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{self as serenity, ChannelId, UserId};
use rand::Rng;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use super::TaskHandler;
use crate::commands::economy::announce_long_hunt;
use crate::economy::rewards::{long_hunt_due, settle_long_hunt, Reward};
use crate::store::Store;
use crate::{Data, Error};

const CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct SettledHunt {
    pub user_id: UserId,
    pub channel_id: Option<ChannelId>,
    pub reward: Reward,
}

/// Pays out every long hunt that has ended by `now`.
pub fn settle_due(store: &mut Store, now: DateTime<Utc>, rng: &mut impl Rng) -> Vec<SettledHunt> {
    let mut due: Vec<UserId> = store
        .users
        .iter()
        .filter(|(_, user)| long_hunt_due(user, now))
        .map(|(id, _)| *id)
        .collect();
    due.sort();

    due.into_iter()
        .filter_map(|user_id| {
            let bonus = store.soul_bonus(user_id);
            let user = store.user_mut(user_id);
            let channel_id = user.long_hunt.as_ref().and_then(|hunt| hunt.channel_id);
            settle_long_hunt(user, bonus, rng).map(|reward| SettledHunt {
                user_id,
                channel_id,
                reward,
            })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct LongHuntTask;

impl LongHuntTask {
    pub fn new() -> Self {
        Self
    }

    async fn check(&self, ctx: &serenity::Context, data: &Data) -> Result<(), Error> {
        let settled = {
            let mut store = data.store.write().await;
            let settled = settle_due(&mut store, Utc::now(), &mut rand::thread_rng());
            if !settled.is_empty() {
                store.save_users()?;
            }
            settled
        };

        for hunt in settled {
            info!("Long hunt finished for {}: {} souls", hunt.user_id, hunt.reward.souls);
            if let Err(e) = announce_long_hunt(ctx, hunt.user_id, hunt.channel_id, &hunt.reward).await {
                warn!("Could not announce long hunt for {}: {}", hunt.user_id, e);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaskHandler for LongHuntTask {
    fn name(&self) -> &'static str {
        "long_hunt"
    }

    async fn run(&mut self, ctx: &serenity::Context, data: Data) -> Result<(), Error> {
        let mut interval = time::interval(CHECK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Err(e) = self.check(ctx, &data).await {
                error!("Failed to settle long hunts: {}", e);
            }
        }
    }
}
