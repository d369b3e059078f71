// ABOUTME: Entry point for the swarmdeck binary.
// ABOUTME: Parses CLI flags, loads config and .env, sets up logging, then serves or checks a rules file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swarmdeck_core::{Config, RuleSet};

#[derive(Parser)]
#[command(name = "swarmdeck")]
#[command(about = "Control panel for a bot-swarm client", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/swarmdeck/config.toml)
    #[arg(short, long, env = "SWARMDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host, overriding the config file
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Listen port, overriding the config file
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Rewrite rules file replacing the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Log to ~/.config/swarmdeck/swarmdeck/swarmdeck.log instead of stderr
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a rewrite rules file and print what it contains
    CheckRules {
        /// Path to the rules TOML
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.log_file {
        swarmdeck_log::init_file("swarmdeck", "swarmdeck_serve=info,swarmdeck_core=info,info");
    } else {
        swarmdeck_log::init("info");
    }

    match cli.command {
        Some(Command::CheckRules { file }) => check_rules(&file),
        None => {
            let mut config = Config::load(cli.config.as_deref()).context("loading config")?;
            if let Some(host) = cli.host {
                config.server.host = host;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(rules) = cli.rules {
                config.logs.rules = Some(rules);
            }
            swarmdeck_serve::run(config).await
        }
    }
}

fn check_rules(file: &std::path::Path) -> Result<()> {
    let rules = RuleSet::load(file).with_context(|| format!("loading {}", file.display()))?;
    let summary = rules.summary();
    println!("{} compiled OK", file.display());
    println!("  vendor names: {}", summary.vendor_names);
    println!("  always-show:  {}", summary.always_show);
    println!("  junk:         {}", summary.junk);
    println!("  scrub:        {}", summary.scrub);
    println!("  markers:      {}", summary.markers);
    println!("  relabel:      {}", summary.relabel);
    Ok(())
}
