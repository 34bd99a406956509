use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, UserId};
use serde::{Deserialize, Serialize};

use crate::economy::leveling;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Daily,
    Mine,
    Messages,
    Call,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Mine => "mine",
            Self::Messages => "messages",
            Self::Call => "call",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Mission {
    pub kind: MissionKind,
    pub name: String,
    pub description: String,
    pub progress: u64,
    pub objective: u64,
    pub reward_souls: u64,
    pub reward_xp: u64,
}

impl Mission {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.objective
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LongHunt {
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub channel_id: Option<ChannelId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserRecord {
    pub about: Option<String>,
    pub partner: Option<UserId>,
    pub voice_seconds: u64,
    pub souls: u64,
    pub xp: u64,
    pub level: u32,
    pub last_daily: Option<DateTime<Utc>>,
    pub daily_streak: u32,
    pub last_mine: Option<DateTime<Utc>>,
    pub mine_streak: u32,
    pub last_hunt: Option<DateTime<Utc>>,
    pub hunt_streak: u32,
    pub last_work: Option<DateTime<Utc>>,
    pub work_streak: u32,
    pub long_hunt: Option<LongHunt>,
    pub missions: Vec<Mission>,
    pub completed_missions: Vec<MissionKind>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            about: None,
            partner: None,
            voice_seconds: 0,
            souls: 0,
            xp: 0,
            level: 1,
            last_daily: None,
            daily_streak: 0,
            last_mine: None,
            mine_streak: 0,
            last_hunt: None,
            hunt_streak: 0,
            last_work: None,
            work_streak: 0,
            long_hunt: None,
            missions: Vec::new(),
            completed_missions: Vec::new(),
        }
    }
}

impl UserRecord {
    /// Adds XP and recomputes the level. Returns the new level when it went up.
    pub fn add_xp(&mut self, amount: u64) -> Option<u32> {
        let old_level = self.level;
        self.xp += amount;
        self.level = leveling::level_for_xp(self.xp);
        (self.level > old_level).then_some(self.level)
    }

    pub fn add_souls(&mut self, amount: u64) {
        self.souls += amount;
    }

    /// Takes `amount` souls if the balance covers it.
    pub fn spend_souls(&mut self, amount: u64) -> bool {
        if self.souls < amount {
            return false;
        }
        self.souls -= amount;
        true
    }

    pub fn advance_missions(&mut self, kind: MissionKind, amount: u64) -> bool {
        let mut changed = false;
        for mission in self.missions.iter_mut().filter(|m| m.kind == kind) {
            mission.progress += amount;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_xp_reports_level_up_only_on_change() {
        let mut user = UserRecord::default();
        assert_eq!(user.add_xp(50), None);
        assert_eq!(user.add_xp(50), Some(2));
        assert_eq!(user.level, 2);
        assert_eq!(user.add_xp(10), None);
    }

    #[test]
    fn spend_souls_refuses_overdraft() {
        let mut user = UserRecord {
            souls: 30,
            ..Default::default()
        };
        assert!(!user.spend_souls(31));
        assert_eq!(user.souls, 30);
        assert!(user.spend_souls(30));
        assert_eq!(user.souls, 0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let user: UserRecord = serde_json::from_str(r#"{"souls": 12}"#).unwrap();
        assert_eq!(user.souls, 12);
        assert_eq!(user.level, 1);
        assert!(user.missions.is_empty());
    }

    #[test]
    fn advance_missions_touches_matching_kind() {
        let mut user = UserRecord::default();
        user.missions.push(Mission {
            kind: MissionKind::Mine,
            name: "Mineração".into(),
            description: "Mine 5 vezes".into(),
            progress: 0,
            objective: 5,
            reward_souls: 50,
            reward_xp: 30,
        });
        assert!(!user.advance_missions(MissionKind::Daily, 1));
        assert!(user.advance_missions(MissionKind::Mine, 2));
        assert_eq!(user.missions[0].progress, 2);
    }
}
