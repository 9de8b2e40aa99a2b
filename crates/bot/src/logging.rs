//! Logging to stderr and to a per-session file.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Where this run writes its artifacts. Keep it alive for the whole run;
/// dropping it flushes the file writer.
pub struct Session {
    pub id: String,
    pub dir: PathBuf,
    _guard: WorkerGuard,
}

pub fn setup(session_id: &str, log_root: Option<&Path>) -> Result<Session> {
    let dir = log_root.map_or_else(log_dir, Path::to_path_buf).join(session_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, "bot.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking_file).with_ansi(false))
        .init();

    tracing::info!(session = session_id, "Logging initialized");
    tracing::info!("Log file: {}/bot.log", dir.display());

    Ok(Session {
        id: session_id.to_owned(),
        dir,
        _guard: guard,
    })
}

/// Platform-specific log directory.
///
/// - macOS: `~/Library/Caches/grind-bot/logs`
/// - Linux: `~/.cache/grind-bot/logs` (or `$XDG_CACHE_HOME/grind-bot/logs`)
/// - Windows: `%LOCALAPPDATA%\grind-bot\cache\logs`
/// - Fallback: `/tmp/grind-bot/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "grind-bot")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/grind-bot"))
        .join("logs")
}
