// ABOUTME: Discord surface for the swarmdeck panel.
// ABOUTME: Signature verification, interaction types, slash commands, REST client and log mirroring.

pub mod commands;
pub mod error;
pub mod interaction;
pub mod mirror;
pub mod rest;
pub mod verify;

pub use commands::{execute, PanelCommand};
pub use error::{DiscordError, Result};
pub use interaction::{Interaction, InteractionResponse};
pub use mirror::spawn_mirror;
pub use rest::DiscordRest;
pub use verify::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

use swarmdeck_core::Panel;
use tracing::{info, warn};

/// Answer a verified interaction.
pub async fn respond(interaction: &Interaction, panel: &Panel) -> InteractionResponse {
    match (interaction.kind, interaction.data.as_ref()) {
        (interaction::PING, _) => InteractionResponse::pong(),
        (interaction::APPLICATION_COMMAND, Some(data)) => {
            let command = PanelCommand::parse(data);
            info!(
                command = %data.name,
                invoker = interaction.invoker().unwrap_or("unknown"),
                "Discord command received"
            );
            InteractionResponse::message(execute(command, panel).await)
        }
        (kind, _) => {
            warn!(kind, "Unsupported interaction type");
            InteractionResponse::ephemeral("Unsupported interaction")
        }
    }
}
