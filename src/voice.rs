use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use poise::serenity_prelude::UserId;
use std::collections::HashMap;

use crate::store::user::{MissionKind, UserRecord};

/// In-memory call sessions. Not persisted; a restart drops open sessions.
#[derive(Debug, Default)]
pub struct VoiceTracker {
    sessions: Mutex<HashMap<UserId, DateTime<Utc>>>,
}

impl VoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, user_id: UserId, at: DateTime<Utc>) {
        self.sessions.lock().insert(user_id, at);
    }

    /// Ends the session and returns its length in seconds, if it was tracked
    /// and lasted longer than zero.
    pub fn leave(&self, user_id: UserId, at: DateTime<Utc>) -> Option<u64> {
        let started = self.sessions.lock().remove(&user_id)?;
        let elapsed = (at - started).num_seconds();
        (elapsed > 0).then_some(elapsed as u64)
    }

    pub fn current(&self, user_id: UserId, now: DateTime<Utc>) -> Option<u64> {
        self.sessions
            .lock()
            .get(&user_id)
            .map(|started| (now - *started).num_seconds().max(0) as u64)
    }

    /// Any open session, used for the rotating status line.
    pub fn any_session(&self, now: DateTime<Utc>) -> Option<(UserId, u64)> {
        self.sessions
            .lock()
            .iter()
            .min_by_key(|(id, _)| **id)
            .map(|(id, started)| (*id, (now - *started).num_seconds().max(0) as u64))
    }
}

/// Adds a finished session to the user's total and to their call missions.
pub fn credit_session(user: &mut UserRecord, seconds: u64) {
    user.voice_seconds += seconds;
    user.advance_missions(MissionKind::Call, seconds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn credit_updates_total_and_call_missions() {
        let mut user = UserRecord {
            voice_seconds: 100,
            ..Default::default()
        };
        user.missions.push(crate::store::user::Mission {
            kind: MissionKind::Call,
            name: "Social".into(),
            description: "Fique 30 minutos em call".into(),
            progress: 1000,
            objective: 1800,
            reward_souls: 60,
            reward_xp: 40,
        });
        credit_session(&mut user, 900);
        assert_eq!(user.voice_seconds, 1000);
        assert!(user.missions[0].is_complete());
    }

    #[test]
    fn leave_reports_elapsed_seconds() {
        let tracker = VoiceTracker::new();
        let user = UserId::new(1);
        let start = Utc::now();
        tracker.join(user, start);
        assert_eq!(tracker.current(user, start + Duration::seconds(30)), Some(30));
        assert_eq!(tracker.leave(user, start + Duration::seconds(90)), Some(90));
        assert_eq!(tracker.current(user, start), None);
    }

    #[test]
    fn untracked_or_instant_sessions_are_ignored() {
        let tracker = VoiceTracker::new();
        let user = UserId::new(2);
        let now = Utc::now();
        assert_eq!(tracker.leave(user, now), None);

        tracker.join(user, now);
        assert_eq!(tracker.leave(user, now), None);
    }

    #[test]
    fn any_session_picks_a_tracked_user() {
        let tracker = VoiceTracker::new();
        let now = Utc::now();
        assert_eq!(tracker.any_session(now), None);
        tracker.join(UserId::new(5), now - Duration::seconds(10));
        assert_eq!(tracker.any_session(now), Some((UserId::new(5), 10)));
    }
}
