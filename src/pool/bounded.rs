use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use super::{ConnectionPool, Connector, PoolStats, UnboundedPool, check_capacity};
use crate::errors::PoolError;

// -----------------------------------------------------------------------------
// ----- BoundedPool -----------------------------------------------------------

/// An unbounded pool behind a counting permit: at most `limit` connections are
/// outstanding, further acquires wait for a release. There is no timeout.
pub struct BoundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    inner: UnboundedPool<C>,
    permits: Semaphore,
    limit: usize,
}

impl<C> BoundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    /// Fails if `limit` exceeds `MAX_CAPACITY`.
    pub fn new(limit: usize, connector: Arc<dyn Connector<C>>) -> Result<Self, PoolError> {
        check_capacity(connector.endpoint(), limit)?;
        Ok(Self {
            inner: UnboundedPool::new(connector),
            permits: Semaphore::new(limit),
            limit,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl<C> ConnectionPool<C> for BoundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    async fn acquire(&self) -> Result<Arc<C>, PoolError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PoolError::Closed {
                endpoint: self.inner.endpoint().to_string(),
            })?;

        // On error the permit drops here and goes straight back.
        let connection = self.inner.acquire().await?;

        // Handed back explicitly in `release`.
        permit.forget();
        debug!(
            "bounded pool for {}: {} of {} permits left",
            self.inner.endpoint(),
            self.permits.available_permits(),
            self.limit
        );
        Ok(connection)
    }

    fn release(&self, connection: Arc<C>) -> bool {
        if !self.inner.release(connection) {
            return false;
        }
        self.permits.add_permits(1);
        true
    }

    fn close(&self) {
        self.permits.close();
        self.inner.close();
    }

    fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn stats(&self) -> PoolStats {
        let open = self.inner.len();
        PoolStats {
            endpoint: self.inner.endpoint().to_string(),
            policy: "bounded",
            capacity: Some(self.limit),
            open,
            idle: 0,
            outstanding: open,
            available_permits: Some(self.permits.available_permits()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
