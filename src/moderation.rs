use poise::serenity_prelude::{RoleId, UserId};
use thiserror::Error;

pub const PRISON_CHANNEL: &str = "Prisão";

/// Discord refuses timeouts longer than 28 days.
pub const MAX_TIMEOUT_SECS: u64 = 28 * 86_400;

/// Parses `10s`, `5m`, `2h`, `1d` or a bare number of seconds.
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Some(secs);
    }
    let unit = text.chars().last()?;
    let value: u64 = text[..text.len() - unit.len_utf8()].parse().ok()?;
    let scale = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return None,
    };
    value.checked_mul(scale)
}

/// Accepts a raw id or a `<@id>` / `<@!id>` mention.
pub fn parse_user_id(text: &str) -> Option<UserId> {
    let trimmed = text.trim();
    let raw = trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(trimmed);
    raw.parse::<u64>().ok().filter(|id| *id != 0).map(UserId::new)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRef {
    Id(RoleId),
    Name(String),
}

/// A role given as `<@&id>` or by its exact name.
pub fn parse_role(text: &str) -> Option<RoleRef> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mention = trimmed
        .strip_prefix("<@&")
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|id| id.parse::<u64>().ok())
        .filter(|id| *id != 0);
    Some(match mention {
        Some(id) => RoleRef::Id(RoleId::new(id)),
        None => RoleRef::Name(trimmed.to_string()),
    })
}

/// Who is acting on whom, with the position of each one's highest role.
#[derive(Debug, Clone, Copy)]
pub struct Standing {
    pub moderator: UserId,
    pub moderator_top_role: u16,
    pub target: UserId,
    pub target_top_role: u16,
    pub target_is_bot: bool,
    pub owner: UserId,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    #[error("Você não pode aplicar isso em si mesmo!")]
    SelfTarget,
    #[error("Não posso punir o dono do servidor!")]
    Owner,
    #[error("Não é possível punir bots!")]
    Bot,
    #[error("Esse membro tem um cargo igual ou maior que o seu!")]
    HigherRole,
}

/// Checks that the panel may act on the target. The owner may act on anyone but themselves.
pub fn check_target(standing: &Standing) -> Result<(), ProtectionError> {
    if standing.target == standing.moderator {
        return Err(ProtectionError::SelfTarget);
    }
    if standing.target == standing.owner {
        return Err(ProtectionError::Owner);
    }
    if standing.target_is_bot {
        return Err(ProtectionError::Bot);
    }
    if standing.moderator != standing.owner && standing.target_top_role >= standing.moderator_top_role {
        return Err(ProtectionError::HigherRole);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("10s"), Some(10));
        assert_eq!(parse_duration("5m"), Some(300));
        assert_eq!(parse_duration("2H"), Some(7_200));
        assert_eq!(parse_duration("1d"), Some(86_400));
        assert_eq!(parse_duration("90"), Some(90));
        assert_eq!(parse_duration("10x"), None);
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("ém"), None);
    }

    #[test]
    fn user_ids_and_mentions() {
        assert_eq!(parse_user_id("123"), Some(UserId::new(123)));
        assert_eq!(parse_user_id("<@123>"), Some(UserId::new(123)));
        assert_eq!(parse_user_id(" <@!123> "), Some(UserId::new(123)));
        assert_eq!(parse_user_id("abc"), None);
        assert_eq!(parse_user_id("0"), None);
    }

    #[test]
    fn roles_by_mention_or_name() {
        assert_eq!(parse_role("<@&55>"), Some(RoleRef::Id(RoleId::new(55))));
        assert_eq!(parse_role(" Exilados "), Some(RoleRef::Name("Exilados".into())));
        assert_eq!(parse_role("   "), None);
    }

    #[test]
    fn protections() {
        let base = Standing {
            moderator: UserId::new(1),
            moderator_top_role: 10,
            target: UserId::new(2),
            target_top_role: 5,
            target_is_bot: false,
            owner: UserId::new(99),
        };
        assert_eq!(check_target(&base), Ok(()));
        assert_eq!(
            check_target(&Standing { target: UserId::new(1), ..base }),
            Err(ProtectionError::SelfTarget)
        );
        assert_eq!(
            check_target(&Standing { target: UserId::new(99), ..base }),
            Err(ProtectionError::Owner)
        );
        assert_eq!(
            check_target(&Standing { target_is_bot: true, ..base }),
            Err(ProtectionError::Bot)
        );
        assert_eq!(
            check_target(&Standing { target_top_role: 10, ..base }),
            Err(ProtectionError::HigherRole)
        );
        assert_eq!(
            check_target(&Standing {
                moderator: UserId::new(99),
                moderator_top_role: 0,
                ..base
            }),
            Ok(())
        );
    }
}
