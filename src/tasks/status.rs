use async_trait::async_trait;
use chrono::Utc;
use poise::serenity_prelude::{self as serenity, ActivityData, OnlineStatus};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use super::TaskHandler;
use crate::{format, Data, Error};

const ROTATE_INTERVAL: Duration = Duration::from_secs(10);

const STATUS_MESSAGES: &[&str] = &[
    "Bot in Dev... 🚧",
    "Suporte",
    "Olhando os canais",
    "Monitorando o servidor",
    "Base de apoio Exilium.",
];

/// Status text for the given rotation step, with the call clock when someone is in voice.
pub fn status_line(step: usize, call_seconds: Option<u64>) -> String {
    let base = STATUS_MESSAGES[step % STATUS_MESSAGES.len()];
    match call_seconds {
        Some(secs) => format!("{base} | {} em call", format::clock(secs)),
        None => base.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct StatusTask {
    step: usize,
}

impl StatusTask {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskHandler for StatusTask {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn run(&mut self, ctx: &serenity::Context, data: Data) -> Result<(), Error> {
        let mut interval = time::interval(ROTATE_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let in_call = data.voice.any_session(Utc::now()).map(|(_, secs)| secs);
            let line = status_line(self.step, in_call);
            ctx.set_presence(Some(ActivityData::playing(line)), OnlineStatus::Online);
            self.step = self.step.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_through_messages() {
        assert_eq!(status_line(0, None), "Bot in Dev... 🚧");
        assert_eq!(status_line(1, None), "Suporte");
        assert_eq!(status_line(STATUS_MESSAGES.len(), None), "Bot in Dev... 🚧");
    }

    #[test]
    fn appends_call_clock() {
        assert_eq!(status_line(1, Some(3725)), format!("Suporte | {} em call", format::clock(3725)));
    }
}
