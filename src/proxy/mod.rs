//! Proxy types and the instances built from them.
//!
//! The forwarding code is generated per contract at compile time by
//! `service_contract!`; the synthesizer validates contracts, names and caches
//! the resulting types, and is the only way to construct a `Proxy`.

#[allow(clippy::module_inception)]
pub mod proxy;
pub mod synthesizer;

pub use proxy::Proxy;
pub use synthesizer::{ProxySynthesizer, ProxyType};
