use chrono::{DateTime, Duration, Utc};
use poise::serenity_prelude::ChannelId;
use rand::Rng;
use std::ops::RangeInclusive;

use super::{cooldown, with_bonus, EconomyError};
use crate::store::user::{LongHunt, MissionKind, UserRecord};

/// A rare find, checked in order against one uniform roll.
struct RareTier {
    below: f64,
    souls: RangeInclusive<u64>,
    message: &'static str,
}

struct RewardTable {
    cooldown_secs: i64,
    souls: RangeInclusive<u64>,
    xp: RangeInclusive<u64>,
    streak_step: f64,
    max_multiplier: f64,
    rare: &'static [RareTier],
}

const DAILY: RewardTable = RewardTable {
    cooldown_secs: 24 * 3600,
    souls: 50..=150,
    xp: 20..=50,
    streak_step: 0.1,
    max_multiplier: f64::INFINITY,
    rare: &[],
};

const MINE: RewardTable = RewardTable {
    cooldown_secs: 5 * 60,
    souls: 10..=50,
    xp: 5..=15,
    streak_step: 0.05,
    max_multiplier: 2.0,
    rare: &[
        RareTier {
            below: 0.05,
            souls: 100..=300,
            message: "🔮 **Você encontrou uma gema rara!**",
        },
        RareTier {
            below: 0.15,
            souls: 50..=150,
            message: "✨ **Você encontrou um cristal especial!**",
        },
    ],
};

const HUNT: RewardTable = RewardTable {
    cooldown_secs: 2 * 60,
    souls: 15..=60,
    xp: 8..=20,
    streak_step: 0.06,
    max_multiplier: 2.2,
    rare: &[
        RareTier {
            below: 0.04,
            souls: 120..=350,
            message: "👻 **Você encontrou uma alma rara poderosa!**",
        },
        RareTier {
            below: 0.12,
            souls: 60..=180,
            message: "✨ **Você encontrou uma alma especial!**",
        },
    ],
};

const WORK: RewardTable = RewardTable {
    cooldown_secs: 3600,
    souls: 30..=120,
    xp: 10..=25,
    streak_step: 0.04,
    max_multiplier: 1.8,
    rare: &[],
};

const LONG_HUNT_SECS: i64 = 12 * 3600;
const LONG_HUNT_MULTIPLIER: f64 = 1.5;
const LONG_HUNT_SOULS: RangeInclusive<u64> = 200..=500;
const LONG_HUNT_XP: RangeInclusive<u64> = 100..=250;
const LONG_HUNT_RARE: &[RareTier] = &[
    RareTier {
        below: 0.15,
        souls: 300..=800,
        message: "👻 **Você encontrou uma alma lendária!**",
    },
    RareTier {
        below: 0.35,
        souls: 150..=400,
        message: "✨ **Você encontrou uma alma rara poderosa!**",
    },
];

/// Cooldown-gated activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Daily,
    Mine,
    Hunt,
    Work,
}

impl Activity {
    fn table(&self) -> &'static RewardTable {
        match self {
            Self::Daily => &DAILY,
            Self::Mine => &MINE,
            Self::Hunt => &HUNT,
            Self::Work => &WORK,
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.table().cooldown_secs)
    }

    pub fn mission_kind(&self) -> Option<MissionKind> {
        match self {
            Self::Daily => Some(MissionKind::Daily),
            Self::Mine => Some(MissionKind::Mine),
            Self::Hunt | Self::Work => None,
        }
    }

    fn last(&self, user: &UserRecord) -> Option<DateTime<Utc>> {
        match self {
            Self::Daily => user.last_daily,
            Self::Mine => user.last_mine,
            Self::Hunt => user.last_hunt,
            Self::Work => user.last_work,
        }
    }

    fn streak(&self, user: &UserRecord) -> u32 {
        match self {
            Self::Daily => user.daily_streak,
            Self::Mine => user.mine_streak,
            Self::Hunt => user.hunt_streak,
            Self::Work => user.work_streak,
        }
    }

    fn mark(&self, user: &mut UserRecord, now: DateTime<Utc>, streak: u32) {
        let (last, counter) = match self {
            Self::Daily => (&mut user.last_daily, &mut user.daily_streak),
            Self::Mine => (&mut user.last_mine, &mut user.mine_streak),
            Self::Hunt => (&mut user.last_hunt, &mut user.hunt_streak),
            Self::Work => (&mut user.last_work, &mut user.work_streak),
        };
        *last = Some(now);
        *counter = streak;
    }

    /// Streak after this claim. Only the daily streak breaks, after two
    /// missed cooldowns.
    fn next_streak(&self, user: &UserRecord, now: DateTime<Utc>) -> u32 {
        let previous = match (self, self.last(user)) {
            (Self::Daily, None) => 0,
            (Self::Daily, Some(last)) if now - last >= self.cooldown() * 2 => 0,
            _ => self.streak(user),
        };
        previous + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reward {
    pub souls: u64,
    pub xp: u64,
    pub streak: u32,
    pub rare: Option<&'static str>,
    pub level_up: Option<u32>,
}

/// First tier whose threshold lies above `roll`.
fn rare_tier(roll: f64, tiers: &'static [RareTier]) -> Option<&'static RareTier> {
    tiers.iter().find(|tier| roll < tier.below)
}

fn roll_rare(rng: &mut impl Rng, tiers: &'static [RareTier]) -> Option<(u64, &'static str)> {
    let roll: f64 = rng.gen();
    rare_tier(roll, tiers).map(|tier| (rng.gen_range(tier.souls.clone()), tier.message))
}

/// Runs a cooldown-gated activity for `user`, crediting souls, XP and mission progress.
pub fn claim(
    user: &mut UserRecord,
    activity: Activity,
    now: DateTime<Utc>,
    soul_bonus: u32,
    rng: &mut impl Rng,
) -> Result<Reward, EconomyError> {
    if let Some(remaining) = cooldown::remaining(activity.last(user), now, activity.cooldown()) {
        return Err(EconomyError::OnCooldown { remaining });
    }
    if activity == Activity::Hunt && user.long_hunt.is_some() {
        return Err(EconomyError::LongHuntActive);
    }

    let table = activity.table();
    let streak = activity.next_streak(user, now);
    let multiplier = (1.0 + streak as f64 * table.streak_step).min(table.max_multiplier);

    let mut souls = (rng.gen_range(table.souls.clone()) as f64 * multiplier) as u64;
    let xp = (rng.gen_range(table.xp.clone()) as f64 * multiplier) as u64;
    let rare = roll_rare(rng, table.rare).map(|(bonus, message)| {
        souls += bonus;
        message
    });
    let souls = with_bonus(souls, soul_bonus);

    user.add_souls(souls);
    let level_up = user.add_xp(xp);
    activity.mark(user, now, streak);
    if let Some(kind) = activity.mission_kind() {
        user.advance_missions(kind, 1);
    }

    Ok(Reward {
        souls,
        xp,
        streak,
        rare,
        level_up,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum LongHuntStatus {
    Started(LongHunt),
    InProgress { remaining: Duration },
    Finished(Reward),
}

pub fn long_hunt_duration() -> Duration {
    Duration::seconds(LONG_HUNT_SECS)
}

/// Starts a long hunt, reports the running one, or settles it when it is due.
pub fn long_hunt(
    user: &mut UserRecord,
    now: DateTime<Utc>,
    channel_id: Option<ChannelId>,
    soul_bonus: u32,
    rng: &mut impl Rng,
) -> LongHuntStatus {
    if let Some(hunt) = &user.long_hunt {
        if now < hunt.ends_at {
            return LongHuntStatus::InProgress {
                remaining: hunt.ends_at - now,
            };
        }
        if let Some(reward) = settle_long_hunt(user, soul_bonus, rng) {
            return LongHuntStatus::Finished(reward);
        }
    }

    let hunt = LongHunt {
        started_at: now,
        ends_at: now + long_hunt_duration(),
        channel_id,
    };
    user.long_hunt = Some(hunt.clone());
    LongHuntStatus::Started(hunt)
}

pub fn long_hunt_due(user: &UserRecord, now: DateTime<Utc>) -> bool {
    user.long_hunt.as_ref().is_some_and(|hunt| now >= hunt.ends_at)
}

/// Pays out and clears the user's long hunt, whatever its end time.
pub fn settle_long_hunt(user: &mut UserRecord, soul_bonus: u32, rng: &mut impl Rng) -> Option<Reward> {
    user.long_hunt.take()?;

    let mut souls = (rng.gen_range(LONG_HUNT_SOULS) as f64 * LONG_HUNT_MULTIPLIER) as u64;
    let xp = (rng.gen_range(LONG_HUNT_XP) as f64 * LONG_HUNT_MULTIPLIER) as u64;
    let rare = roll_rare(rng, LONG_HUNT_RARE).map(|(bonus, message)| {
        souls += bonus;
        message
    });
    let souls = with_bonus(souls, soul_bonus);

    user.add_souls(souls);
    let level_up = user.add_xp(xp);
    Some(Reward {
        souls,
        xp,
        streak: 0,
        rare,
        level_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::user::Mission;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn daily_first_claim_starts_streak() {
        let mut user = UserRecord::default();
        let now = Utc::now();
        let reward = claim(&mut user, Activity::Daily, now, 0, &mut rng()).unwrap();
        assert_eq!(reward.streak, 1);
        // base 50..=150 with a 1.1x multiplier
        assert!((55..=165).contains(&reward.souls));
        assert!((22..=55).contains(&reward.xp));
        assert_eq!(user.souls, reward.souls);
        assert_eq!(user.last_daily, Some(now));
    }

    #[test]
    fn daily_refused_inside_cooldown() {
        let now = Utc::now();
        let mut user = UserRecord {
            last_daily: Some(now - Duration::hours(23)),
            daily_streak: 3,
            ..Default::default()
        };
        let err = claim(&mut user, Activity::Daily, now, 0, &mut rng()).unwrap_err();
        assert_eq!(
            err,
            EconomyError::OnCooldown {
                remaining: Duration::hours(1)
            }
        );
        assert_eq!(user.souls, 0);
    }

    #[test]
    fn daily_streak_continues_then_breaks() {
        let now = Utc::now();
        let mut user = UserRecord {
            last_daily: Some(now - Duration::hours(30)),
            daily_streak: 3,
            ..Default::default()
        };
        let reward = claim(&mut user, Activity::Daily, now, 0, &mut rng()).unwrap();
        assert_eq!(reward.streak, 4);

        let mut user = UserRecord {
            last_daily: Some(now - Duration::hours(48)),
            daily_streak: 3,
            ..Default::default()
        };
        let reward = claim(&mut user, Activity::Daily, now, 0, &mut rng()).unwrap();
        assert_eq!(reward.streak, 1);
    }

    #[test]
    fn mine_multiplier_is_capped() {
        let mut user = UserRecord {
            mine_streak: 500,
            ..Default::default()
        };
        let mut rng = rng();
        for _ in 0..50 {
            user.last_mine = None;
            let reward = claim(&mut user, Activity::Mine, Utc::now(), 0, &mut rng).unwrap();
            // 2x of 10..=50 plus at most a 300 rare bonus
            assert!(reward.souls >= 20 && reward.souls <= 400);
            assert!(reward.xp <= 30);
        }
    }

    #[test]
    fn hunt_multiplier_is_capped() {
        let mut user = UserRecord {
            hunt_streak: 500,
            ..Default::default()
        };
        let mut rng = rng();
        for _ in 0..50 {
            user.last_hunt = None;
            user.long_hunt = None;
            let reward = claim(&mut user, Activity::Hunt, Utc::now(), 0, &mut rng).unwrap();
            // 2.2x of 15..=60 plus at most a 350 rare bonus
            assert!(reward.souls >= 33 && reward.souls <= 132 + 350);
            assert!(reward.xp <= 44);
        }
    }

    #[test]
    fn work_multiplier_is_capped_and_skips_missions() {
        let mut user = UserRecord {
            work_streak: 500,
            ..Default::default()
        };
        for kind in [MissionKind::Daily, MissionKind::Mine] {
            user.missions.push(Mission {
                kind,
                name: "Missão".into(),
                description: String::new(),
                progress: 0,
                objective: 5,
                reward_souls: 50,
                reward_xp: 30,
            });
        }
        let mut rng = rng();
        for _ in 0..50 {
            user.last_work = None;
            let reward = claim(&mut user, Activity::Work, Utc::now(), 0, &mut rng).unwrap();
            // 1.8x of 30..=120, no rare finds
            assert!(reward.souls >= 50 && reward.souls <= 216);
            assert!(reward.xp <= 45);
            assert!(reward.rare.is_none());
        }
        assert_eq!(Activity::Work.mission_kind(), None);
        assert!(user.missions.iter().all(|m| m.progress == 0));
    }

    #[test]
    fn rare_tiers_checked_in_order() {
        let souls = |roll| rare_tier(roll, HUNT.rare).map(|tier| tier.souls.clone());
        assert_eq!(souls(0.03), Some(120..=350));
        assert_eq!(souls(0.10), Some(60..=180));
        assert_eq!(souls(0.12), None);
        assert_eq!(souls(0.5), None);

        let souls = |roll| rare_tier(roll, LONG_HUNT_RARE).map(|tier| tier.souls.clone());
        assert_eq!(souls(0.1), Some(300..=800));
        assert_eq!(souls(0.3), Some(150..=400));
        assert_eq!(souls(0.5), None);

        assert!(rare_tier(0.0, WORK.rare).is_none());
    }

    #[test]
    fn mine_advances_mine_missions() {
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
        claim(&mut user, Activity::Mine, Utc::now(), 0, &mut rng()).unwrap();
        assert_eq!(user.missions[0].progress, 1);
    }

    #[test]
    fn hunt_blocked_during_long_hunt() {
        let mut user = UserRecord::default();
        let now = Utc::now();
        long_hunt(&mut user, now, None, 0, &mut rng());
        let err = claim(&mut user, Activity::Hunt, now, 0, &mut rng()).unwrap_err();
        assert_eq!(err, EconomyError::LongHuntActive);
    }

    #[test]
    fn passive_bonus_raises_souls() {
        let now = Utc::now();
        let mut plain = UserRecord::default();
        let mut boosted = UserRecord::default();
        let a = claim(&mut plain, Activity::Work, now, 0, &mut rng()).unwrap();
        let b = claim(&mut boosted, Activity::Work, now, 10, &mut rng()).unwrap();
        assert_eq!(b.souls, with_bonus(a.souls, 10));
    }

    #[test]
    fn long_hunt_lifecycle() {
        let mut user = UserRecord::default();
        let start = Utc::now();
        let channel = Some(ChannelId::new(42));

        let LongHuntStatus::Started(hunt) = long_hunt(&mut user, start, channel, 0, &mut rng()) else {
            panic!("expected a new hunt");
        };
        assert_eq!(hunt.ends_at - hunt.started_at, Duration::hours(12));

        let later = start + Duration::hours(2);
        assert_eq!(
            long_hunt(&mut user, later, channel, 0, &mut rng()),
            LongHuntStatus::InProgress {
                remaining: Duration::hours(10)
            }
        );
        assert!(!long_hunt_due(&user, later));

        let done = start + Duration::hours(12);
        assert!(long_hunt_due(&user, done));
        let LongHuntStatus::Finished(reward) = long_hunt(&mut user, done, channel, 0, &mut rng()) else {
            panic!("expected the hunt to settle");
        };
        assert!(reward.souls >= 300);
        assert!(user.long_hunt.is_none());
        assert!(settle_long_hunt(&mut user, 0, &mut rng()).is_none());
    }
}
