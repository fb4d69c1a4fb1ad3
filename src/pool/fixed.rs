use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::seq::IteratorRandom;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{ConnectionKey, ConnectionPool, Connector, PoolStats, check_capacity};
use crate::errors::PoolError;

// -----------------------------------------------------------------------------
// ----- FixedPool -------------------------------------------------------------

/// Pre-establishes `size` connections and lends them out one owner at a time.
/// Acquires past `size` wait until a connection comes back.
pub struct FixedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    connector: Arc<dyn Connector<C>>,
    state: Mutex<FixedState<C>>,
    permits: Semaphore,
    size: usize,
}

struct FixedState<C: ?Sized> {
    all: HashMap<ConnectionKey, Arc<C>>,
    available: HashSet<ConnectionKey>,
}

// -----------------------------------------------------------------------------
// ----- FixedPool: Static -----------------------------------------------------

impl<C> FixedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    /// Opens all `size` connections up front. If any of them fails, the ones
    /// already opened are closed and no pool is returned. Sizes above
    /// `MAX_CAPACITY` are rejected before anything is opened.
    pub async fn open(size: usize, connector: Arc<dyn Connector<C>>) -> Result<Self, PoolError> {
        check_capacity(connector.endpoint(), size)?;

        info!(
            "pre-establishing {size} connections to {}",
            connector.endpoint()
        );

        let mut all = HashMap::new();
        while all.len() < size {
            let failure = match connector.open().await {
                Ok(connection) => match all.entry(ConnectionKey::of(&connection)) {
                    Entry::Vacant(slot) => {
                        slot.insert(connection);
                        continue;
                    }
                    Entry::Occupied(_) => PoolError::DuplicateConnection {
                        endpoint: connector.endpoint().to_string(),
                    },
                },
                Err(source) => PoolError::ConnectionEstablishment {
                    endpoint: connector.endpoint().to_string(),
                    source,
                },
            };

            warn!(
                "failed to pre-establish connections to {} after {} of {size}: {failure}",
                connector.endpoint(),
                all.len()
            );
            for (_, connection) in all.drain() {
                connector.close(connection);
            }
            return Err(failure);
        }

        let available = all.keys().copied().collect();
        Ok(Self {
            connector,
            state: Mutex::new(FixedState { all, available }),
            permits: Semaphore::new(size),
            size,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- FixedPool: Public -----------------------------------------------------

impl<C> FixedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle(&self) -> usize {
        self.state.lock().available.len()
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn owns(&self, connection: &Arc<C>) -> bool {
        self.state
            .lock()
            .all
            .contains_key(&ConnectionKey::of(connection))
    }
}

// -----------------------------------------------------------------------------
// ----- FixedPool: ConnectionPool ---------------------------------------------

#[async_trait]
impl<C> ConnectionPool<C> for FixedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    async fn acquire(&self) -> Result<Arc<C>, PoolError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PoolError::Closed {
                endpoint: self.endpoint().to_string(),
            })?;

        let connection = {
            let mut state = self.state.lock();
            let key = state.available.iter().choose(&mut rand::rng()).copied();
            key.and_then(|key| {
                state.available.remove(&key);
                state.all.get(&key).cloned()
            })
        };

        // A permit always has an idle connection behind it; if not, give the
        // permit back rather than lend nothing.
        let Some(connection) = connection else {
            return Err(PoolError::Exhausted {
                endpoint: self.endpoint().to_string(),
            });
        };

        permit.forget();
        debug!(
            "lent connection to {}: {} of {} idle",
            self.endpoint(),
            self.permits.available_permits(),
            self.size
        );
        Ok(connection)
    }

    fn release(&self, connection: Arc<C>) -> bool {
        let key = ConnectionKey::of(&connection);

        let returned = {
            let mut state = self.state.lock();
            state.all.contains_key(&key) && state.available.insert(key)
        };

        if !returned {
            warn!(
                "ignoring release of foreign or idle connection to {}",
                self.endpoint()
            );
            return false;
        }

        self.permits.add_permits(1);
        true
    }

    fn close(&self) {
        self.permits.close();
        debug!("fixed pool for {} closed", self.endpoint());
    }

    fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn stats(&self) -> PoolStats {
        let (open, idle) = {
            let state = self.state.lock();
            (state.all.len(), state.available.len())
        };

        PoolStats {
            endpoint: self.endpoint().to_string(),
            policy: "fixed",
            capacity: Some(self.size),
            open,
            idle,
            outstanding: open - idle,
            available_permits: Some(self.permits.available_permits()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- FixedPool: Drop -------------------------------------------------------

impl<C> Drop for FixedPool<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.available.clear();
        let connections: Vec<_> = state.all.drain().map(|(_, c)| c).collect();

        debug!(
            "closing {} pre-established connections to {}",
            connections.len(),
            self.connector.endpoint()
        );
        for connection in connections {
            self.connector.close(connection);
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
