pub mod cooldown;
pub mod leveling;
pub mod missions;
pub mod rewards;
pub mod shop;

use chrono::Duration;
use thiserror::Error;

use crate::format;
use crate::store::inventory::Shortfall;

/// A refused economy action. The message is shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    #[error("Você precisa esperar **{}** para fazer isso novamente!", format::remaining(.remaining))]
    OnCooldown { remaining: Duration },

    #[error("Você já está em uma caça longa! Use `/caça-longa` para ver o status.")]
    LongHuntActive,

    #[error("Almas insuficientes! Você tem **{have}**, necessário **{need}**.")]
    InsufficientSouls { have: u64, need: u64 },

    #[error("Item não encontrado: `{0}`")]
    UnknownItem(String),

    #[error("Você não tem {quantity}x desse item!")]
    NotEnoughItems { quantity: u32 },

    #[error("Você não tem todos os materiais necessários:\n\n{}", shortfall_lines(.0))]
    MissingIngredients(Vec<Shortfall>),

    #[error("Item não é um equipável válido!")]
    NotEquippable,

    #[error("Você não tem esse item!")]
    NotOwned,

    #[error("Você não tem esse item equipado!")]
    NotEquipped,

    #[error("Esse item não é uma lootbox!")]
    NotALootbox,

    #[error("Quantidade inválida! Use um número maior que 0.")]
    InvalidQuantity,

    #[error("Número inválido! Use um número entre 1 e {max}.")]
    InvalidMissionNumber { max: usize },

    #[error("Missão não encontrada!")]
    MissionNotFound,

    #[error("Esta missão ainda não foi completada! Progresso: **{progress}/{objective}**")]
    MissionIncomplete { progress: u64, objective: u64 },
}

fn shortfall_lines(missing: &[Shortfall]) -> String {
    missing
        .iter()
        .map(|s| format!("{}: você tem {}, precisa de {}", s.item, s.have, s.need))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies a passive soul bonus percentage.
pub fn with_bonus(souls: u64, bonus_percent: u32) -> u64 {
    souls * (100 + bonus_percent as u64) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_render_fields() {
        let err = EconomyError::OnCooldown {
            remaining: Duration::seconds(125),
        };
        assert_eq!(
            err.to_string(),
            "Você precisa esperar **2m 5s** para fazer isso novamente!"
        );

        let err = EconomyError::MissingIngredients(vec![Shortfall {
            item: "cristal_abissal".into(),
            have: 1,
            need: 2,
        }]);
        assert!(err.to_string().ends_with("cristal_abissal: você tem 1, precisa de 2"));
    }

    #[test]
    fn bonus_rounds_down() {
        assert_eq!(with_bonus(99, 0), 99);
        assert_eq!(with_bonus(99, 10), 108);
    }
}
