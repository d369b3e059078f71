// ABOUTME: Configuration loading for the swarmdeck panel.
// ABOUTME: Optional TOML file with ${VAR} expansion, then environment overrides; every field has a default.

use crate::error::{PanelError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub swarm: SwarmConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served as a fallback for the browser UI.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// How the swarm client is launched.
#[derive(Clone, Deserialize)]
pub struct SwarmConfig {
    /// API credential handed to the swarm client.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Working directory for the client; `~` is expanded.
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default = "default_restart_interval_secs")]
    pub restart_interval_secs: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            command: default_command(),
            args: default_args(),
            working_dir: None,
            restart_interval_secs: default_restart_interval_secs(),
        }
    }
}

impl std::fmt::Debug for SwarmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("command", &self.command)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("restart_interval_secs", &self.restart_interval_secs)
            .finish()
    }
}

fn default_command() -> String {
    "node".to_string()
}

fn default_args() -> Vec<String> {
    vec!["swarm.js".to_string()]
}

fn default_restart_interval_secs() -> u64 {
    3600
}

impl SwarmConfig {
    pub fn restart_interval(&self) -> Duration {
        Duration::from_secs(self.restart_interval_secs.max(1))
    }

    pub fn working_dir_expanded(&self) -> Option<PathBuf> {
        self.working_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }
}

/// Log stream settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsConfig {
    /// Lines replayed to a new subscriber. 0 disables replay.
    #[serde(default)]
    pub backlog: usize,
    /// Replacement rewrite rule table.
    #[serde(default)]
    pub rules: Option<PathBuf>,
}

/// Discord application settings. Each feature switches on only when the
/// values it needs are present.
#[derive(Clone, Default, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 public key for verifying interactions.
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Channel that receives mirrored log lines.
    #[serde(default)]
    pub channel_id: Option<String>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("public_key", &self.public_key)
            .field("application_id", &self.application_id)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Command queue settings.
#[derive(Clone, Default, Deserialize)]
pub struct CommandsConfig {
    /// Shared secret required in `x-command-secret` when set.
    #[serde(default)]
    pub secret: Option<String>,
}

impl std::fmt::Debug for CommandsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandsConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Default location: `~/.config/swarmdeck/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("swarmdeck").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and built-in defaults otherwise. Environment
    /// overrides are applied last in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML file, expanding `${VAR}` references.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PanelError::Configuration(format!("Failed to read config from {:?}: {}", path, e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        // Expand environment variables, warning on undefined vars.
        let contents = shellexpand::env_with_context_no_errors(contents, |var: &str| {
            match std::env::var(var) {
                Ok(val) => Some(val),
                Err(_) => {
                    warn!(
                        variable = %var,
                        "Environment variable not defined, using empty string"
                    );
                    Some(String::new())
                }
            }
        });

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| PanelError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("SWARMDECK_API_TOKEN") {
            self.swarm.api_token = Some(token);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
        if let Some(key) = get("DISCORD_PUBLIC_KEY") {
            self.discord.public_key = Some(key);
        }
        if let Some(id) = get("DISCORD_APPLICATION_ID") {
            self.discord.application_id = Some(id);
        }
        if let Some(token) = get("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = Some(token);
        }
        if let Some(channel) = get("DISCORD_CHANNEL_ID") {
            self.discord.channel_id = Some(channel);
        }
        if let Some(secret) = get("COMMAND_SECRET") {
            self.commands.secret = Some(secret);
        }
        self.normalize();
    }

    /// Treat empty strings (typically from undefined `${VAR}`s) as unset.
    fn normalize(&mut self) {
        for field in [
            &mut self.swarm.api_token,
            &mut self.discord.public_key,
            &mut self.discord.application_id,
            &mut self.discord.bot_token,
            &mut self.discord.channel_id,
            &mut self.commands.secret,
        ] {
            if field.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *field = None;
            }
        }
    }
}
