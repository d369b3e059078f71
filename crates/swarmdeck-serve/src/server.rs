// ABOUTME: Router assembly and server lifecycle.
// ABOUTME: Builds the axum app from a Panel, starts Discord tasks, and serves until Ctrl+C or SIGTERM.

use crate::routes::{commands, control, interactions, stream};
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use swarmdeck_core::config::DiscordConfig;
use swarmdeck_core::{Config, Panel};
use swarmdeck_discord::{commands::definitions, spawn_mirror, DiscordRest, SignatureVerifier};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the HTTP application.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/start", post(control::start))
        .route("/stop", post(control::stop))
        .route("/status", get(control::status))
        .route("/health", get(control::health))
        .route("/logs", get(stream::logs))
        .route("/ws", get(stream::ws))
        .route("/fetch-command", get(commands::fetch))
        .route("/ack-command", post(commands::ack))
        .route("/queue-command", post(commands::queue));

    if state.verifier.is_some() {
        app = app.route("/interactions", post(interactions::interactions));
    }

    if let Some(dir) = static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Run the control panel until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting swarmdeck control panel");
    info!("  Swarm command: {} {}", config.swarm.command, config.swarm.args.join(" "));
    info!("  Restart interval: {:?}", config.swarm.restart_interval());

    let panel = Panel::from_config(&config).context("building panel")?;
    if !panel.workers().has_token() {
        warn!("No API token configured; /start will fail until SWARMDECK_API_TOKEN is set");
    }

    let verifier = config
        .discord
        .public_key
        .as_deref()
        .map(SignatureVerifier::from_hex)
        .transpose()
        .context("parsing Discord public key")?;
    if verifier.is_none() {
        info!("No Discord public key configured; /interactions is disabled");
    }
    start_discord(&config.discord, &panel);

    let state = AppState::new(panel.clone())
        .with_command_secret(config.commands.secret.clone())
        .with_verifier(verifier);
    let app = router(state, config.server.static_dir.as_deref());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    info!("Control panel listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    let outcome = panel.stop(None).await;
    info!(stopped = outcome.stopped, "Server shut down gracefully");

    Ok(())
}

/// Register slash commands and start the channel mirror when credentials allow.
fn start_discord(discord: &DiscordConfig, panel: &Panel) {
    let Some(bot_token) = discord.bot_token.clone() else {
        return;
    };
    let rest = DiscordRest::new(bot_token);

    if let Some(application_id) = discord.application_id.clone() {
        let rest = rest.clone();
        tokio::spawn(async move {
            if let Err(e) = rest.register_commands(&application_id, &definitions()).await {
                warn!(error = %e, "Failed to register Discord slash commands");
            }
        });
    }

    if let Some(channel_id) = discord.channel_id.clone() {
        spawn_mirror(rest, channel_id, panel.feed().subscribe());
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
