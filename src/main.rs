use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use proxypool::Config;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "proxypool";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() {
    setup().await;
    report();
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() {
    // This has to be the first thing we do, because it initializes the config
    Config::init().await;

    init_tracing();
}

fn init_tracing() {
    let config = Config::snapshot();
    let filter = EnvFilter::try_new(config.log_level.directive())
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// -----------------------------------------------------------------------------
// ----- Report ----------------------------------------------------------------

fn report() {
    let config = Config::snapshot();
    let records = config.pools.records();

    info!(
        "{} loaded {} pools from {}",
        APP_NAME,
        records.len(),
        config.config_file_location.display()
    );

    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in records {
        println!(
            "{:<width$}  {:<14}  {}",
            record.name,
            record.policy.to_string(),
            record.endpoint
        );
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
