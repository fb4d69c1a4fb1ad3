use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::errors::PoolError;
use crate::pool::ConnectionPool;

// -----------------------------------------------------------------------------
// ----- Proxy -----------------------------------------------------------------

/// A contract implementation that forwards every call to a pooled connection.
///
/// Built only through `ProxyType::instantiate`. The connection is taken from
/// the pool on construction and handed back when the proxy is dropped.
pub struct Proxy<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pool: Arc<dyn ConnectionPool<C>>,
    connection: Option<Arc<C>>,
}

impl<C> Proxy<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub(crate) async fn connect(pool: Arc<dyn ConnectionPool<C>>) -> Result<Self, PoolError> {
        let connection = pool.acquire().await?;
        Ok(Self {
            pool,
            connection: Some(connection),
        })
    }

    /// The pooled connection calls are forwarded to.
    pub fn connection(&self) -> &C {
        self.connection
            .as_deref()
            .expect("proxy used after its connection was released")
    }

    pub fn pool(&self) -> &Arc<dyn ConnectionPool<C>> {
        &self.pool
    }

    /// Hands the connection back now instead of at end of scope.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<C> Drop for Proxy<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            let returned = self.pool.release(connection);
            trace!("proxy disposed, connection returned: {returned}");
        }
    }
}

impl<C> fmt::Debug for Proxy<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("contract", &std::any::type_name::<C>())
            .field("pool", &self.pool.stats().endpoint)
            .finish()
    }
}
