use poise::serenity_prelude::UserId;
use thiserror::Error;

use crate::store::Store;

pub const ABOUT_MAX_CHARS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("Você não pode casar consigo mesmo!")]
    SelfProposal,
    #[error("Você não pode casar com um bot!")]
    BotProposal,
    #[error("<@{0}> já está casado(a) com <@{1}>!")]
    AlreadyMarried(UserId, UserId),
    #[error("Você não está casado(a)!")]
    NotMarried,
    #[error("O Sobre Mim pode ter no máximo {ABOUT_MAX_CHARS} caracteres.")]
    AboutTooLong,
}

/// Checks that neither side of a proposal is already taken.
pub fn check_proposal(store: &Store, proposer: UserId, target: UserId) -> Result<(), SocialError> {
    if proposer == target {
        return Err(SocialError::SelfProposal);
    }
    for id in [proposer, target] {
        if let Some(partner) = store.users.get(&id).and_then(|u| u.partner) {
            return Err(SocialError::AlreadyMarried(id, partner));
        }
    }
    Ok(())
}

/// Links both records after re-checking the proposal.
pub fn marry(store: &mut Store, proposer: UserId, target: UserId) -> Result<(), SocialError> {
    check_proposal(store, proposer, target)?;
    store.user_mut(proposer).partner = Some(target);
    store.user_mut(target).partner = Some(proposer);
    Ok(())
}

/// Clears both sides of `user`'s marriage and returns the former partner.
pub fn divorce(store: &mut Store, user: UserId) -> Result<UserId, SocialError> {
    let partner = store
        .users
        .get_mut(&user)
        .and_then(|u| u.partner.take())
        .ok_or(SocialError::NotMarried)?;
    if let Some(other) = store.users.get_mut(&partner) {
        if other.partner == Some(user) {
            other.partner = None;
        }
    }
    Ok(partner)
}

pub fn set_about(store: &mut Store, user: UserId, text: &str) -> Result<(), SocialError> {
    let text = text.trim();
    if text.chars().count() > ABOUT_MAX_CHARS {
        return Err(SocialError::AboutTooLong);
    }
    store.user_mut(user).about = (!text.is_empty()).then(|| text.to_string());
    Ok(())
}
