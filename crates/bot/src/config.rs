//! Bot configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use goap_runtime::RuntimeConfig;

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub runtime: RuntimeConfig,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Wall-clock budget for the run.
    pub run_for: Duration,
    pub seed: u64,
    /// Kills before the simulated gear breaks and the bot aborts.
    pub durability: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            session_id: None,
            log_dir: None,
            run_for: Duration::from_secs(30),
            seed: 7,
            durability: 5,
        }
    }
}

impl BotConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOT_SESSION_ID` - Session identifier for logs and summary (default: timestamp)
    /// - `BOT_LOG_DIR` - Log root directory (default: platform cache dir)
    /// - `BOT_RUN_SECS` - Seconds to run before stopping (default: 30)
    /// - `BOT_SEED` - Simulation seed (default: 7)
    /// - `BOT_DURABILITY` - Kills before gear breaks (default: 5)
    /// - `GOAP_*` - Execution loop tunables, see [`RuntimeConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self {
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        };

        config.session_id = env::var("BOT_SESSION_ID").ok().filter(|id| !id.is_empty());
        config.log_dir = env::var("BOT_LOG_DIR").ok().map(PathBuf::from);

        if let Some(secs) = read_env::<u64>("BOT_RUN_SECS") {
            config.run_for = Duration::from_secs(secs.max(1));
        }
        if let Some(seed) = read_env::<u64>("BOT_SEED") {
            config.seed = seed;
        }
        if let Some(durability) = read_env::<u32>("BOT_DURABILITY") {
            config.durability = durability.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
