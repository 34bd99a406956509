use chrono::Utc;
use poise::serenity_prelude::{
    ButtonStyle, Color, CreateActionRow, CreateButton, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, Mentionable,
};
use poise::CreateReply;
use std::time::Duration;
use tracing::warn;

use super::{footer, send_embed};
use crate::format::{self, discord_timestamp, TimestampStyle};
use crate::{Context, Error};

const HELP_TIMEOUT: Duration = Duration::from_secs(300);

struct HelpPage {
    title: &'static str,
    description: &'static str,
    color: (u8, u8, u8),
    entries: &'static [(&'static str, &'static str)],
}

const HELP_PAGES: &[HelpPage] = &[
    HelpPage {
        title: "👤 PERFIL",
        description: "Comandos para gerenciar seu perfil e relacionamentos",
        color: (52, 152, 219),
        entries: &[
            ("/perfil [membro]", "Perfil completo: Sobre Mim, casamento, tempo em call, almas e nível"),
            ("/set-sobre <texto>", "Define seu Sobre Mim (até 100 caracteres)"),
            ("/casar <membro>", "Propõe casamento; o membro tem 5 minutos para aceitar"),
            ("/divorciar", "Divorcia de seu parceiro(a)"),
        ],
    },
    HelpPage {
        title: "💬 MENSAGENS",
        description: "Comandos para criar mensagens personalizadas",
        color: (155, 89, 182),
        entries: &[
            ("/mensagem <título> <texto>", "Cria uma embed personalizada para anúncios ou recados"),
            ("/frase <texto>", "Envia uma frase ou poesia para o servidor sem mostrar o comando"),
        ],
    },
    HelpPage {
        title: "💰 ECONOMIA",
        description: "Sistema de moeda (Almas), XP e missões",
        color: (241, 196, 15),
        entries: &[
            ("/daily", "50-150 almas + XP a cada 24 horas. Mantenha a sequência!"),
            ("/mine", "10-50 almas a cada 5 minutos"),
            ("/caça", "15-60 almas a cada 2 minutos, com chance de item raro"),
            ("/trabalhar", "Salário a cada hora"),
            ("/caça-longa", "Expedição de 12 horas com recompensa maior"),
            ("/balance [membro]", "Mostra almas, nível e XP"),
            ("/missoes e /claim-missao <n>", "Missões diárias com recompensas extras"),
        ],
    },
    HelpPage {
        title: "🛍️ LOJA & INVENTÁRIO",
        description: "Compre, venda e equipe itens",
        color: (46, 204, 113),
        entries: &[
            ("/loja", "Navega pelos itens por categoria"),
            ("/comprar <item> [qtd]", "Compra um item da loja"),
            ("/vender <item> [qtd]", "Vende um item por 70% do valor"),
            ("/inventario", "Mostra seus itens agrupados por raridade"),
            ("/equipar <item> e /desequipar", "Equipa a arma ou passivo que dá bônus de almas"),
            ("/abrir <caixa>", "Abre uma caixa de loot"),
            ("/info-loja e /info-raridade", "Resumo do catálogo e multiplicadores de raridade"),
        ],
    },
    HelpPage {
        title: "⚒️ CRAFT & FORJA",
        description: "Transforme materiais em itens melhores",
        color: (230, 126, 34),
        entries: &[
            ("/craft <item>", "Combina materiais e almas em um novo item"),
            ("/forjar <arma>", "Tenta forjar uma arma; os materiais são perdidos se falhar"),
        ],
    },
    HelpPage {
        title: "🏆 RANKING & CALL",
        description: "Rankings e tempo em call",
        color: (255, 215, 0),
        entries: &[
            ("/top-souls e /top-level", "Os 10 mais ricos e os 10 de maior nível"),
            ("/top-tempo", "Os 10 com mais tempo em call"),
            ("/callstatus", "Seu tempo na call atual"),
            ("/uptime", "Há quanto tempo o bot está online"),
        ],
    },
    HelpPage {
        title: "🛡️ MODERAÇÃO",
        description: "Comandos para a equipe (requer permissões)",
        color: (231, 76, 60),
        entries: &[
            ("addcargo / removercargo <membro> <cargo> [duração]", "Adiciona ou remove um cargo existente"),
            ("criarcargo / deletecargo <membro> <cargo>", "Cria o cargo se preciso; deleta quando ficar vazio"),
            ("mutecall / unmutecall <membro> [duração]", "Mute em voice"),
            ("prender / soltar <membro> [duração]", "Move para a Prisão com mute e ensurdecimento"),
            ("ban <membro> / unban <id>", "Banimento permanente"),
            ("punicoes <membro>", "Histórico de punições"),
            ("painel", "Painel com advertência, mute, kick e ban"),
        ],
    },
];

fn help_embed(index: usize) -> CreateEmbed {
    let page = &HELP_PAGES[index];
    let (r, g, b) = page.color;
    page.entries.iter().fold(
        CreateEmbed::default()
            .title(page.title)
            .description(page.description)
            .color(Color::from_rgb(r, g, b))
            .footer(footer(&format!("Página {}/{}", index + 1, HELP_PAGES.len()))),
        |embed, (name, value)| embed.field(*name, *value, false),
    )
}

fn help_buttons(index: usize) -> Vec<CreateActionRow> {
    let categories: Vec<CreateButton> = HELP_PAGES
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let label = page.title.split_whitespace().next().unwrap_or(page.title);
            CreateButton::new(format!("help_cat_{i}"))
                .label(label)
                .style(if i == index {
                    ButtonStyle::Primary
                } else {
                    ButtonStyle::Secondary
                })
        })
        .collect();

    vec![
        CreateActionRow::Buttons(vec![
            CreateButton::new("help_prev")
                .label("⬅️ Anterior")
                .style(ButtonStyle::Secondary)
                .disabled(index == 0),
            CreateButton::new("help_next")
                .label("Próximo ➡️")
                .style(ButtonStyle::Secondary)
                .disabled(index + 1 == HELP_PAGES.len()),
        ]),
        // Discord caps a row at five buttons.
        CreateActionRow::Buttons(categories[..5.min(categories.len())].to_vec()),
        CreateActionRow::Buttons(categories[5.min(categories.len())..].to_vec()),
    ]
    .into_iter()
    .filter(|row| !matches!(row, CreateActionRow::Buttons(b) if b.is_empty()))
    .collect()
}

fn next_help_page(current: usize, custom_id: &str) -> usize {
    match custom_id {
        "help_prev" => current.saturating_sub(1),
        "help_next" => (current + 1).min(HELP_PAGES.len() - 1),
        id => id
            .strip_prefix("help_cat_")
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|i| *i < HELP_PAGES.len())
            .unwrap_or(current),
    }
}

/// 📚 Veja todos os comandos disponíveis no servidor!
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut index = 0;
    let msg = ctx
        .send(
            CreateReply::default()
                .embed(help_embed(index))
                .components(help_buttons(index)),
        )
        .await?;

    while let Some(interaction) = msg
        .message()
        .await?
        .await_component_interaction(&ctx.serenity_context().shard)
        .author_id(ctx.author().id)
        .timeout(HELP_TIMEOUT)
        .await
    {
        index = next_help_page(index, &interaction.data.custom_id);
        interaction
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(help_embed(index))
                        .components(help_buttons(index)),
                ),
            )
            .await?;
    }

    msg.edit(ctx, CreateReply::default().components(vec![])).await?;
    Ok(())
}

/// Mostra há quanto tempo o bot está online.
#[poise::command(slash_command, prefix_command)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    let started_at = ctx.data().started_at;
    let elapsed = (Utc::now() - started_at).num_seconds().max(0) as u64;
    let embed = CreateEmbed::default()
        .title("⏳ Uptime")
        .color(Color::from_rgb(52, 152, 219))
        .field("Online há", format!("**{}**", format::compact(elapsed)), true)
        .field(
            "Desde",
            discord_timestamp(started_at.timestamp(), TimestampStyle::LongDateTime),
            true,
        )
        .footer(footer("Status"));
    send_embed(ctx, embed).await
}

/// Cria mensagens personalizadas.
#[poise::command(slash_command, prefix_command, rename = "mensagem")]
pub async fn message(
    ctx: Context<'_>,
    #[description = "Título"] titulo: String,
    #[description = "Texto"]
    #[rest]
    texto: String,
) -> Result<(), Error> {
    let embed = CreateEmbed::default()
        .title(titulo)
        .description(texto)
        .color(Color::from_rgb(88, 101, 242));
    send_embed(ctx, embed).await
}

/// Envie uma frase ou poesia para o servidor.
#[poise::command(slash_command, prefix_command, rename = "frase")]
pub async fn phrase(
    ctx: Context<'_>,
    #[description = "Sua frase ou poesia"]
    #[rest]
    frase: String,
) -> Result<(), Error> {
    let embed = CreateEmbed::default()
        .title("📜 Nova frase enviada!")
        .color(Color::from_rgb(88, 101, 242))
        .field("👤 Autor:", ctx.author().mention().to_string(), false)
        .field("✍️ Frase / Poesia:", frase, false);

    let posted = ctx
        .channel_id()
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    if let Err(e) = posted.react(ctx, '💖').await {
        warn!("Failed to react to phrase {}: {}", posted.id, e);
    }

    match ctx {
        poise::Context::Prefix(prefix) => {
            if let Err(e) = prefix.msg.delete(ctx).await {
                warn!("Failed to hide phrase command {}: {}", prefix.msg.id, e);
            }
        }
        poise::Context::Application(_) => {
            ctx.send(CreateReply::default().content("💖 Frase enviada!").ephemeral(true))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_navigation_stays_in_bounds() {
        let last = HELP_PAGES.len() - 1;
        assert_eq!(next_help_page(0, "help_prev"), 0);
        assert_eq!(next_help_page(0, "help_next"), 1);
        assert_eq!(next_help_page(last, "help_next"), last);
        assert_eq!(next_help_page(2, "help_cat_5"), 5);
        assert_eq!(next_help_page(2, "help_cat_99"), 2);
        assert_eq!(next_help_page(2, "shop_next"), 2);
    }

    #[test]
    fn help_buttons_fit_discord_rows() {
        for index in 0..HELP_PAGES.len() {
            for row in help_buttons(index) {
                match row {
                    CreateActionRow::Buttons(buttons) => {
                        assert!(!buttons.is_empty() && buttons.len() <= 5)
                    }
                    _ => panic!("unexpected row"),
                }
            }
        }
    }
}
