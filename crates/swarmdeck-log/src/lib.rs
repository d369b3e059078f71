// ABOUTME: Shared logging setup for swarmdeck binaries
// ABOUTME: init() logs to stderr, init_file() logs under the config dir for daemonized runs

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build the filter used by every init function.
///
/// `RUST_LOG` wins when set. Otherwise `default` is used, which may be a bare
/// level ("info") or a full directive list ("swarmdeck_serve=debug,warn").
/// An unparseable default falls back to INFO.
pub fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Standard logging to stderr.
pub fn init(default: &str) {
    tracing_subscriber::fmt().with_env_filter(filter(default)).init();
}

/// Path of the log file used by `init_file`:
/// `~/.config/swarmdeck/{app_name}/{app_name}.log`.
pub fn log_file_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join("swarmdeck")
            .join(app_name)
            .join(format!("{app_name}.log"))
    })
}

/// File-based logging. If setup fails, prints a warning to stderr and falls
/// back to stderr logging.
pub fn init_file(app_name: &str, default: &str) {
    if let Err(e) = init_file_inner(app_name, default) {
        eprintln!("Warning: failed to set up file logging: {e}");
        init(default);
    }
}

fn init_file_inner(app_name: &str, default: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = log_file_path(app_name).ok_or("could not determine config directory")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter(default))
        .with_ansi(false)
        .try_init()?;

    Ok(())
}
