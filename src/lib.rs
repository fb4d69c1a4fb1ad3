pub mod config;
pub mod contract;
pub mod errors;
pub mod pool;
pub mod proxy;

pub use config::Config;
pub use contract::{Contract, ContractDescriptor};
pub use errors::{PoolError, TransportError, UnsupportedContractError, UnsupportedReason};
pub use pool::{
    BoundedPool, ConnectionPool, Connector, FixedPool, PoolPolicy, PoolStats, UnboundedPool,
};
pub use proxy::{Proxy, ProxySynthesizer, ProxyType};
