use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path, sync::Arc};
use thiserror::Error;
use tokio::fs;
use tracing::error;

use super::types::LogLevel;
use crate::pool::{MAX_CAPACITY, PoolPolicy};

// -----------------------------------------------------------------------------
// ----- Singleton -------------------------------------------------------------

static POOLS: OnceCell<PoolsConfig> = OnceCell::new();

// -----------------------------------------------------------------------------
// ----- PoolsConfig -----------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PoolsConfig {
    inner: Arc<RwLock<PoolsMap>>,
}

// -----------------------------------------------------------------------------
// ----- PoolsConfig: Static ---------------------------------------------------

impl PoolsConfig {
    /// Init: panic on any error. Do not continue with a bad state.
    pub async fn init(path: &Path) {
        let cfg = Self::from_file_async(path)
            .await
            .unwrap_or_else(|e| panic!("failed to load pools config from {:?}: {e}", path));

        POOLS
            .set(cfg)
            .unwrap_or_else(|_| panic!("PoolsConfig::init called twice"));
    }

    /// Reload: on error, DO NOT swap; keep current map and log.
    pub async fn reload(path: &Path) {
        let new_cfg = match Self::from_file_async(path).await {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(
                    "reload failed; keeping previous pools config. path={:?} error={}",
                    path, e
                );
                return;
            }
        };

        let new_map = new_cfg.inner.read().clone();
        let current = Self::handle();

        let mut guard = current.inner.write();
        *guard = new_map;
    }

    pub fn handle() -> &'static PoolsConfig {
        POOLS.get().expect("Pools not initialized")
    }

    /// Records sorted by pool name.
    pub fn snapshot() -> Vec<PoolRecord> {
        Self::handle().records()
    }

    pub fn get_pool(name: &str) -> Option<PoolRecord> {
        Self::handle().get(name)
    }
}

// -----------------------------------------------------------------------------
// ----- PoolsConfig: Public ---------------------------------------------------

impl PoolsConfig {
    pub fn records(&self) -> Vec<PoolRecord> {
        self.inner.read().by_name.values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<PoolRecord> {
        self.inner.read().by_name.get(name).cloned()
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.inner.read().log_level
    }
}

// -----------------------------------------------------------------------------
// ----- PoolsConfig: Private --------------------------------------------------

impl PoolsConfig {
    async fn from_file_async(path: &Path) -> Result<PoolsConfig, PoolsError> {
        let raw = fs::read_to_string(path).await.map_err(|e| PoolsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    pub(crate) fn parse(raw: &str) -> Result<PoolsConfig, PoolsError> {
        let mut doc: PoolsFile = toml::from_str(raw).map_err(|e| PoolsError::Toml { source: e })?;

        if doc.pools.is_empty() {
            return Err(PoolsError::EmptyConfig);
        }

        let mut by_name = BTreeMap::new();
        for entry in doc.pools.drain(..) {
            validate(&entry)?;

            let record = PoolRecord {
                name: entry.name.clone(),
                endpoint: entry.endpoint.clone(),
                policy: resolve_policy(&entry)?,
            };

            if by_name.insert(record.name.clone(), record).is_some() {
                return Err(PoolsError::DuplicatePool { name: entry.name });
            }
        }

        Ok(PoolsConfig {
            inner: Arc::new(RwLock::new(PoolsMap {
                log_level: doc.log_level,
                by_name,
            })),
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: map ---------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct PoolsMap {
    log_level: Option<LogLevel>,
    by_name: BTreeMap<String, PoolRecord>,
}

// -----------------------------------------------------------------------------
// ----- Internal: On-disk format ----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct PoolsFile {
    #[serde(default)]
    log_level: Option<LogLevel>,

    #[serde(default)]
    pools: Vec<PoolFileEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum PolicyKind {
    Unbounded,
    Bounded,
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PoolFileEntry {
    name: String,

    endpoint: String,

    policy: PolicyKind,

    #[serde(default, alias = "limit", alias = "count")]
    size: Option<usize>,
}

// -----------------------------------------------------------------------------
// ----- Internal: In-memory record --------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRecord {
    pub name: String,
    pub endpoint: String,
    pub policy: PoolPolicy,
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn validate(p: &PoolFileEntry) -> Result<(), PoolsError> {
    if p.name.trim().is_empty() {
        return Err(PoolsError::InvalidField("name".into()));
    }
    if p.endpoint.trim().is_empty() {
        return Err(PoolsError::InvalidField(format!("{}.endpoint", p.name)));
    }
    Ok(())
}

fn resolve_policy(p: &PoolFileEntry) -> Result<PoolPolicy, PoolsError> {
    let sized = |size: Option<usize>| match size {
        None => Err(PoolsError::MissingSize {
            name: p.name.clone(),
        }),
        Some(0) => Err(PoolsError::ZeroSize {
            name: p.name.clone(),
        }),
        Some(n) if n > MAX_CAPACITY => Err(PoolsError::SizeTooLarge {
            name: p.name.clone(),
            size: n,
            max: MAX_CAPACITY,
        }),
        Some(n) => Ok(n),
    };

    match p.policy {
        PolicyKind::Unbounded if p.size.is_some() => Err(PoolsError::UnexpectedSize {
            name: p.name.clone(),
        }),
        PolicyKind::Unbounded => Ok(PoolPolicy::Unbounded),
        PolicyKind::Bounded => Ok(PoolPolicy::Bounded {
            limit: sized(p.size)?,
        }),
        PolicyKind::Fixed => Ok(PoolPolicy::Fixed {
            size: sized(p.size)?,
        }),
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PoolsError {
    #[error("pools config is empty")]
    EmptyConfig,

    #[error("duplicate [[pools]] entry for pool '{name}'")]
    DuplicatePool { name: String },

    #[error("invalid or missing field '{0}'")]
    InvalidField(String),

    #[error("pool '{name}' needs a size for its policy")]
    MissingSize { name: String },

    #[error("pool '{name}' has size 0")]
    ZeroSize { name: String },

    #[error("pool '{name}' has size {size}, above the maximum of {max}")]
    SizeTooLarge { name: String, size: usize, max: usize },

    #[error("pool '{name}' is unbounded but has a size")]
    UnexpectedSize { name: String },

    #[error("read error for {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn parses_every_policy() {
        let toml = r#"
            log_level = "debug"

            [[pools]]
            name = "billing"
            endpoint = "tcp://billing.internal:9000"
            policy = "fixed"
            size = 4

            [[pools]]
            name = "search"
            endpoint = "tcp://search.internal:9100"
            policy = "bounded"
            limit = 16

            [[pools]]
            name = "audit"
            endpoint = "tcp://audit.internal:9200"
            policy = "unbounded"
        "#;

        let tmp = write_tmp(toml);
        let pools = PoolsConfig::from_file_async(tmp.path()).await.unwrap();

        assert_eq!(pools.log_level(), Some(LogLevel::Debug));

        let names: Vec<_> = pools.records().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["audit", "billing", "search"]);

        let billing = pools.get("billing").unwrap();
        assert_eq!(billing.policy, PoolPolicy::Fixed { size: 4 });
        assert_eq!(billing.endpoint, "tcp://billing.internal:9000");

        assert_eq!(
            pools.get("search").unwrap().policy,
            PoolPolicy::Bounded { limit: 16 }
        );
        assert_eq!(pools.get("audit").unwrap().policy, PoolPolicy::Unbounded);
    }

    #[test]
    fn sized_policies_need_a_positive_size() {
        let missing = r#"
            [[pools]]
            name = "billing"
            endpoint = "tcp://billing:9000"
            policy = "fixed"
        "#;
        match PoolsConfig::parse(missing).unwrap_err() {
            PoolsError::MissingSize { name } => assert_eq!(name, "billing"),
            other => panic!("expected MissingSize, got {other}"),
        }

        let zero = r#"
            [[pools]]
            name = "billing"
            endpoint = "tcp://billing:9000"
            policy = "bounded"
            size = 0
        "#;
        assert!(matches!(
            PoolsConfig::parse(zero).unwrap_err(),
            PoolsError::ZeroSize { .. }
        ));
    }

    #[test]
    fn size_above_pool_maximum_is_rejected() {
        let huge = format!(
            r#"
            [[pools]]
            name = "search"
            endpoint = "tcp://search:9100"
            policy = "bounded"
            limit = {}
        "#,
            MAX_CAPACITY as u64 + 1
        );
        match PoolsConfig::parse(&huge).unwrap_err() {
            PoolsError::SizeTooLarge { name, size, max } => {
                assert_eq!(name, "search");
                assert_eq!(size, MAX_CAPACITY + 1);
                assert_eq!(max, MAX_CAPACITY);
            }
            other => panic!("expected SizeTooLarge, got {other}"),
        }

        let at_max = huge.replace(
            &(MAX_CAPACITY as u64 + 1).to_string(),
            &MAX_CAPACITY.to_string(),
        );
        assert_eq!(
            PoolsConfig::parse(&at_max).unwrap().get("search").unwrap().policy,
            PoolPolicy::Bounded {
                limit: MAX_CAPACITY
            }
        );
    }

    #[test]
    fn rejects_duplicates_and_unknown_fields() {
        let dup = r#"
            [[pools]]
            name = "a"
            endpoint = "tcp://a:1"
            policy = "unbounded"

            [[pools]]
            name = "a"
            endpoint = "tcp://a:2"
            policy = "unbounded"
        "#;
        assert!(matches!(
            PoolsConfig::parse(dup).unwrap_err(),
            PoolsError::DuplicatePool { .. }
        ));

        let unknown = r#"
            [[pools]]
            name = "a"
            endpoint = "tcp://a:1"
            policy = "unbounded"
            timeout = 30
        "#;
        assert!(matches!(
            PoolsConfig::parse(unknown).unwrap_err(),
            PoolsError::Toml { .. }
        ));

        let sized_unbounded = r#"
            [[pools]]
            name = "a"
            endpoint = "tcp://a:1"
            policy = "unbounded"
            size = 3
        "#;
        assert!(matches!(
            PoolsConfig::parse(sized_unbounded).unwrap_err(),
            PoolsError::UnexpectedSize { .. }
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(
            PoolsConfig::parse("").unwrap_err(),
            PoolsError::EmptyConfig
        ));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
