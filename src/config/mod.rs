pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod pools;
pub mod types;

pub use config::Config;
pub use pools::{PoolRecord, PoolsConfig, PoolsError};
pub use types::LogLevel;
