use rand::seq::SliceRandom;
use rand::Rng;

use super::EconomyError;
use crate::store::user::{Mission, MissionKind, UserRecord};

pub const ACTIVE_MISSIONS: usize = 3;

struct Template {
    kind: MissionKind,
    name: &'static str,
    description: &'static str,
    objective: u64,
    reward_souls: u64,
    reward_xp: u64,
}

const TEMPLATES: [Template; 4] = [
    Template {
        kind: MissionKind::Daily,
        name: "Daily Completo",
        description: "Colete seu daily",
        objective: 1,
        reward_souls: 25,
        reward_xp: 15,
    },
    Template {
        kind: MissionKind::Mine,
        name: "Mineração",
        description: "Mine 5 vezes",
        objective: 5,
        reward_souls: 50,
        reward_xp: 30,
    },
    Template {
        kind: MissionKind::Messages,
        name: "Comunicador",
        description: "Envie 20 mensagens",
        objective: 20,
        reward_souls: 40,
        reward_xp: 25,
    },
    Template {
        kind: MissionKind::Call,
        name: "Social",
        description: "Fique 30 minutos em call",
        objective: 1800,
        reward_souls: 60,
        reward_xp: 40,
    },
];

impl Template {
    fn instantiate(&self) -> Mission {
        Mission {
            kind: self.kind,
            name: self.name.to_string(),
            description: self.description.to_string(),
            progress: 0,
            objective: self.objective,
            reward_souls: self.reward_souls,
            reward_xp: self.reward_xp,
        }
    }
}

/// Draws a fresh set of missions when the user has none. Kinds may repeat.
/// Returns whether new missions were created.
pub fn ensure_missions(user: &mut UserRecord, rng: &mut impl Rng) -> bool {
    if !user.missions.is_empty() {
        return false;
    }
    user.missions = (0..ACTIVE_MISSIONS)
        .filter_map(|_| TEMPLATES.choose(rng))
        .map(Template::instantiate)
        .collect();
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedMission {
    pub mission: Mission,
    pub level_up: Option<u32>,
}

/// Claims the 1-based mission `number`, paying its rewards and retiring it.
pub fn claim_mission(user: &mut UserRecord, number: usize) -> Result<ClaimedMission, EconomyError> {
    if !(1..=ACTIVE_MISSIONS).contains(&number) {
        return Err(EconomyError::InvalidMissionNumber { max: ACTIVE_MISSIONS });
    }
    let mission = user.missions.get(number - 1).ok_or(EconomyError::MissionNotFound)?;
    if !mission.is_complete() {
        return Err(EconomyError::MissionIncomplete {
            progress: mission.progress,
            objective: mission.objective,
        });
    }

    let mission = user.missions.remove(number - 1);
    user.add_souls(mission.reward_souls);
    let level_up = user.add_xp(mission.reward_xp);
    user.completed_missions.push(mission.kind);
    Ok(ClaimedMission { mission, level_up })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn draws_three_only_when_empty() {
        let mut user = UserRecord::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ensure_missions(&mut user, &mut rng));
        assert_eq!(user.missions.len(), 3);
        assert!(user.missions.iter().all(|m| m.progress == 0));

        let before = user.missions.clone();
        assert!(!ensure_missions(&mut user, &mut rng));
        assert_eq!(user.missions, before);
    }

    #[test]
    fn claim_validates_number_and_progress() {
        let mut user = UserRecord::default();
        assert_eq!(
            claim_mission(&mut user, 0).unwrap_err(),
            EconomyError::InvalidMissionNumber { max: 3 }
        );
        assert_eq!(claim_mission(&mut user, 1).unwrap_err(), EconomyError::MissionNotFound);

        user.missions.push(TEMPLATES[1].instantiate());
        user.missions[0].progress = 2;
        assert_eq!(
            claim_mission(&mut user, 1).unwrap_err(),
            EconomyError::MissionIncomplete {
                progress: 2,
                objective: 5
            }
        );
    }

    #[test]
    fn claim_pays_and_retires_mission() {
        let mut user = UserRecord::default();
        user.missions.push(TEMPLATES[0].instantiate());
        user.missions.push(TEMPLATES[3].instantiate());
        user.advance_missions(MissionKind::Call, 2000);

        let claimed = claim_mission(&mut user, 2).unwrap();
        assert_eq!(claimed.mission.kind, MissionKind::Call);
        assert_eq!(user.souls, 60);
        assert_eq!(user.xp, 40);
        assert_eq!(user.missions.len(), 1);
        assert_eq!(user.completed_missions, vec![MissionKind::Call]);
    }
}
