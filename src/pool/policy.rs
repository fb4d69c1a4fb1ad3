use std::fmt;
use std::sync::Arc;

use super::{BoundedPool, ConnectionPool, Connector, FixedPool, UnboundedPool};
use crate::errors::PoolError;

// -----------------------------------------------------------------------------
// ----- PoolPolicy ------------------------------------------------------------

/// Which pool implementation to put in front of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPolicy {
    Unbounded,
    Bounded { limit: usize },
    Fixed { size: usize },
}

impl PoolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolPolicy::Unbounded => "unbounded",
            PoolPolicy::Bounded { .. } => "bounded",
            PoolPolicy::Fixed { .. } => "fixed",
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        match *self {
            PoolPolicy::Unbounded => None,
            PoolPolicy::Bounded { limit } => Some(limit),
            PoolPolicy::Fixed { size } => Some(size),
        }
    }

    /// Builds the pool. Fixed pools connect eagerly, so this can fail; so can
    /// any capacity above `MAX_CAPACITY`.
    pub async fn build<C>(
        self,
        connector: Arc<dyn Connector<C>>,
    ) -> Result<Arc<dyn ConnectionPool<C>>, PoolError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let pool: Arc<dyn ConnectionPool<C>> = match self {
            PoolPolicy::Unbounded => Arc::new(UnboundedPool::new(connector)),
            PoolPolicy::Bounded { limit } => Arc::new(BoundedPool::new(limit, connector)?),
            PoolPolicy::Fixed { size } => Arc::new(FixedPool::open(size, connector).await?),
        };
        Ok(pool)
    }
}

impl fmt::Display for PoolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capacity() {
            Some(n) => write!(f, "{}({n})", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
