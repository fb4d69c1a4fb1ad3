use parking_lot::RwLock;
use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use super::{cli::CliConfig, pools::PoolsConfig, types::LogLevel};

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static ROOT_CONFIG: OnceLock<Arc<RwLock<Config>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Config {
    pub config_file_location: PathBuf,
    pub log_level: LogLevel,
    pub pools: &'static PoolsConfig,
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Async because PoolsConfig::init() is async (non-blocking IO).
    pub async fn init() {
        CliConfig::init();
        PoolsConfig::init(&CliConfig::snapshot().config_file_location).await;

        Self::load();
    }

    /// Re-reads the pools file; keeps the previous pools if it is invalid.
    pub async fn reload() {
        PoolsConfig::reload(&CliConfig::snapshot().config_file_location).await;
        Self::load();
    }

    pub fn snapshot() -> Config {
        Self::handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Private -------------------------------------------------------

impl Config {
    fn load() {
        let cli = CliConfig::snapshot();
        let pools = PoolsConfig::handle();

        let log_level = effective_log_level(cli.log_level, pools.log_level());

        let next = Config {
            config_file_location: cli.config_file_location,
            log_level,
            pools,
        };

        if let Some(handle) = ROOT_CONFIG.get() {
            *handle.write() = next;
        } else {
            let _ = ROOT_CONFIG.set(Arc::new(RwLock::new(next)));
        }
    }

    fn handle() -> Arc<RwLock<Config>> {
        ROOT_CONFIG
            .get()
            .expect("Config not initialized; call Config::init().await first")
            .clone()
    }
}

/// CLI wins over the file; the file wins over the default.
fn effective_log_level(cli: Option<LogLevel>, file: Option<LogLevel>) -> LogLevel {
    cli.or(file).unwrap_or_default()
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
