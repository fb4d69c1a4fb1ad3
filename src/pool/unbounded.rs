use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, warn};

use super::{ConnectionKey, ConnectionPool, Connector, PoolStats};
use crate::errors::PoolError;

// -----------------------------------------------------------------------------
// ----- UnboundedPool ---------------------------------------------------------

/// Opens a fresh connection for every acquire and closes it on release.
/// Never waits.
pub struct UnboundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    connector: Arc<dyn Connector<C>>,
    connections: RwLock<HashMap<ConnectionKey, Arc<C>>>,
    closed: AtomicBool,
}

// -----------------------------------------------------------------------------
// ----- UnboundedPool: Static -------------------------------------------------

impl<C> UnboundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub fn new(connector: Arc<dyn Connector<C>>) -> Self {
        Self {
            connector,
            connections: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- UnboundedPool: Public -------------------------------------------------

impl<C> UnboundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, connection: &Arc<C>) -> bool {
        self.connections
            .read()
            .contains_key(&ConnectionKey::of(connection))
    }
}

// -----------------------------------------------------------------------------
// ----- UnboundedPool: ConnectionPool -----------------------------------------

#[async_trait]
impl<C> ConnectionPool<C> for UnboundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    async fn acquire(&self) -> Result<Arc<C>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed {
                endpoint: self.endpoint().to_string(),
            });
        }

        let connection =
            self.connector
                .open()
                .await
                .map_err(|source| PoolError::ConnectionEstablishment {
                    endpoint: self.endpoint().to_string(),
                    source,
                })?;

        self.connections
            .write()
            .insert(ConnectionKey::of(&connection), connection.clone());

        debug!("opened connection to {}", self.endpoint());
        Ok(connection)
    }

    fn release(&self, connection: Arc<C>) -> bool {
        let key = ConnectionKey::of(&connection);

        let removed = {
            let guard = self.connections.upgradable_read();
            if !guard.contains_key(&key) {
                None
            } else {
                RwLockUpgradableReadGuard::upgrade(guard).remove(&key)
            }
        };

        let Some(owned) = removed else {
            warn!("ignoring release of unknown connection to {}", self.endpoint());
            return false;
        };

        drop(connection);
        self.connector.close(owned);
        debug!("closed connection to {}", self.endpoint());
        true
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("unbounded pool for {} closed", self.endpoint());
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn stats(&self) -> PoolStats {
        let open = self.len();
        PoolStats {
            endpoint: self.endpoint().to_string(),
            policy: "unbounded",
            capacity: None,
            open,
            idle: 0,
            outstanding: open,
            available_permits: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- UnboundedPool: Drop ---------------------------------------------------

impl<C> Drop for UnboundedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let connections: Vec<_> = self.connections.get_mut().drain().map(|(_, c)| c).collect();
        if !connections.is_empty() {
            debug!(
                "closing {} connections to {} on pool teardown",
                connections.len(),
                self.endpoint()
            );
        }
        for connection in connections {
            self.connector.close(connection);
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::testing::{Channel, CountingConnector};
    use std::sync::atomic::Ordering;

    fn pool() -> (Arc<CountingConnector>, UnboundedPool<Channel>) {
        let connector = Arc::new(CountingConnector::default());
        let pool = UnboundedPool::new(connector.clone() as Arc<dyn Connector<Channel>>);
        (connector, pool)
    }

    #[tokio::test]
    async fn every_acquire_opens_a_new_connection() {
        let (connector, pool) = pool();

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(connector.opened(), 2);
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(&a));
    }

    #[tokio::test]
    async fn release_closes_members_only_once() {
        let (connector, pool) = pool();
        let conn = pool.acquire().await.unwrap();

        assert!(pool.release(conn.clone()));
        assert_eq!(connector.closed(), 1);
        assert!(pool.is_empty());

        assert!(!pool.release(conn));
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn foreign_connection_is_ignored() {
        let (connector, pool) = pool();
        let _own = pool.acquire().await.unwrap();

        assert!(!pool.release(Arc::new(Channel { id: 99 })));
        assert_eq!(pool.len(), 1);
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test]
    async fn open_failure_is_wrapped() {
        let (connector, pool) = pool();
        connector.refuse.store(true, Ordering::SeqCst);

        let err = pool.acquire().await.unwrap_err();
        match err {
            PoolError::ConnectionEstablishment { endpoint, .. } => {
                assert_eq!(endpoint, "test://channel")
            }
            other => panic!("expected ConnectionEstablishment, got {other:?}"),
        }
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn closed_pool_refuses_acquire_but_takes_returns() {
        let (connector, pool) = pool();
        let conn = pool.acquire().await.unwrap();

        pool.close();
        assert!(pool.is_closed());
        assert!(matches!(
            pool.acquire().await,
            Err(PoolError::Closed { .. })
        ));
        assert_eq!(connector.opened(), 1);

        assert!(pool.release(conn));
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn teardown_closes_outstanding_connections() {
        let (connector, pool) = pool();
        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();

        drop(pool);
        assert_eq!(connector.closed(), 2);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
