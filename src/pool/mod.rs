use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::errors::{PoolError, TransportError};

pub mod bounded;
pub mod fixed;
pub mod policy;
pub mod unbounded;

pub use bounded::BoundedPool;
pub use fixed::FixedPool;
pub use policy::PoolPolicy;
pub use unbounded::UnboundedPool;

/// Largest `limit` or `size` a bounded or fixed pool accepts.
pub const MAX_CAPACITY: usize = Semaphore::MAX_PERMITS;

// -----------------------------------------------------------------------------
// ----- ConnectionPool --------------------------------------------------------

/// Hands out connections to one endpoint and takes them back.
#[async_trait]
pub trait ConnectionPool<C>: Send + Sync
where
    C: ?Sized + Send + Sync + 'static,
{
    /// Waits until the policy allows another outstanding connection.
    async fn acquire(&self) -> Result<Arc<C>, PoolError>;

    /// Returns `true` only if `connection` came from this pool and was not
    /// already returned. Foreign and duplicate releases are ignored.
    fn release(&self, connection: Arc<C>) -> bool;

    /// Stops lending. Pending and later acquires fail with
    /// `PoolError::Closed`; outstanding connections can still be released.
    fn close(&self);

    fn is_closed(&self) -> bool;

    fn stats(&self) -> PoolStats;
}

pub(crate) fn check_capacity(endpoint: &str, requested: usize) -> Result<(), PoolError> {
    if requested > MAX_CAPACITY {
        return Err(PoolError::CapacityTooLarge {
            endpoint: endpoint.to_string(),
            requested,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Connector -------------------------------------------------------------

/// Transport seam: opens channels implementing the contract and closes them.
#[async_trait]
pub trait Connector<C>: Send + Sync
where
    C: ?Sized + Send + Sync + 'static,
{
    fn endpoint(&self) -> &str;

    async fn open(&self) -> Result<Arc<C>, TransportError>;

    fn close(&self, connection: Arc<C>) {
        drop(connection);
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionKey ---------------------------------------------------------

/// Pool-side identity of a connection: the address of its shared allocation.
/// Stable for as long as the pool holds its own reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionKey(usize);

impl ConnectionKey {
    pub fn of<C: ?Sized>(connection: &Arc<C>) -> Self {
        Self(Arc::as_ptr(connection).cast::<()>() as usize)
    }
}

// -----------------------------------------------------------------------------
// ----- PoolStats -------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub endpoint: String,
    pub policy: &'static str,
    pub capacity: Option<usize>,
    pub open: usize,
    pub idle: usize,
    pub outstanding: usize,
    pub available_permits: Option<usize>,
}

// -----------------------------------------------------------------------------
// ----- Test Support ----------------------------------------------------------


// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
