use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::Proxy;
use crate::contract::{Contract, ContractSurface, aggregate};
use crate::errors::{PoolError, UnsupportedContractError};
use crate::pool::ConnectionPool;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static SHARED: Lazy<ProxySynthesizer> = Lazy::new(ProxySynthesizer::new);

// -----------------------------------------------------------------------------
// ----- ProxyType -------------------------------------------------------------

/// The synthesized proxy type for contract `C`. Cheap to clone; every clone
/// handed out by one synthesizer refers to the same type.
pub struct ProxyType<C: ?Sized> {
    info: Arc<ProxyTypeInfo>,
    _contract: PhantomData<fn(&C)>,
}

#[derive(Debug)]
struct ProxyTypeInfo {
    name: String,
    surface: ContractSurface,
}

impl<C: ?Sized> ProxyType<C> {
    fn from_info(info: Arc<ProxyTypeInfo>) -> Self {
        Self {
            info,
            _contract: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn contract(&self) -> &str {
        &self.info.surface.contract
    }

    pub fn surface(&self) -> &ContractSurface {
        &self.info.surface
    }

    pub fn same_type(&self, other: &ProxyType<C>) -> bool {
        Arc::ptr_eq(&self.info, &other.info)
    }
}

impl<C> ProxyType<C>
where
    C: ?Sized + Contract,
{
    /// Constructs a proxy bound to `pool`, acquiring its connection now.
    pub async fn instantiate(&self, pool: Arc<dyn ConnectionPool<C>>) -> Result<Proxy<C>, PoolError> {
        Proxy::connect(pool).await
    }
}

impl<C: ?Sized> Clone for ProxyType<C> {
    fn clone(&self) -> Self {
        Self::from_info(self.info.clone())
    }
}

impl<C: ?Sized> fmt::Debug for ProxyType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyType")
            .field("name", &self.info.name)
            .field("contract", &self.info.surface.contract)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ----- ProxySynthesizer ------------------------------------------------------

/// Builds one proxy type per contract and caches it for its own lifetime.
///
/// Cache lookup, build and insert happen under a single lock, so concurrent
/// callers for the same contract all observe the first build.
#[derive(Debug, Default)]
pub struct ProxySynthesizer {
    state: Mutex<SynthState>,
}

#[derive(Debug, Default)]
struct SynthState {
    cache: HashMap<TypeId, Arc<ProxyTypeInfo>>,
    // Times each short contract name was used, so `a::Echo` and `b::Echo`
    // get distinct type names.
    names: HashMap<String, usize>,
    builds: usize,
}

// -----------------------------------------------------------------------------
// ----- ProxySynthesizer: Static ----------------------------------------------

impl ProxySynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance for registration code. Lives until exit.
    pub fn shared() -> &'static ProxySynthesizer {
        &SHARED
    }
}

// -----------------------------------------------------------------------------
// ----- ProxySynthesizer: Public ----------------------------------------------

impl ProxySynthesizer {
    pub fn synthesize<C>(&self) -> Result<ProxyType<C>, UnsupportedContractError>
    where
        C: ?Sized + Contract,
    {
        let type_id = TypeId::of::<C>();
        let mut state = self.state.lock();

        if let Some(info) = state.cache.get(&type_id) {
            return Ok(ProxyType::from_info(info.clone()));
        }

        let descriptor = C::descriptor();
        let surface = aggregate(&descriptor).inspect_err(|err| {
            warn!("refusing to synthesize proxy: {err}");
        })?;

        let count = state.names.entry(descriptor.name.clone()).or_insert(0);
        let name = format!("{}_Proxy_{}", descriptor.name, *count);
        *count += 1;

        debug!(
            "synthesized {name} for {} ({} methods, {} properties)",
            surface.contract,
            surface.methods.len(),
            surface.properties.len()
        );

        let info = Arc::new(ProxyTypeInfo { name, surface });
        state.cache.insert(type_id, info.clone());
        state.builds += 1;

        Ok(ProxyType::from_info(info))
    }

    pub fn is_cached<C>(&self) -> bool
    where
        C: ?Sized + Contract,
    {
        self.state.lock().cache.contains_key(&TypeId::of::<C>())
    }

    /// Number of proxy types actually built (cache hits excluded).
    pub fn build_count(&self) -> usize {
        self.state.lock().builds
    }

    pub fn cached(&self) -> usize {
        self.state.lock().cache.len()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractDescriptor;
    use crate::errors::UnsupportedReason;

    crate::service_contract! {
        pub trait Clock {
            fn now(&self) -> u64;
        }
    }

    trait Unmarked: Send + Sync {}

    impl Contract for dyn Unmarked {
        fn descriptor() -> ContractDescriptor {
            ContractDescriptor::interface(module_path!(), "Unmarked").with_method("poke", &[], "")
        }
    }

    #[test]
    fn second_call_hits_the_cache() {
        let synth = ProxySynthesizer::new();

        let first = synth.synthesize::<dyn Clock>().unwrap();
        let second = synth.synthesize::<dyn Clock>().unwrap();

        assert!(first.same_type(&second));
        assert_eq!(first.name(), "Clock_Proxy_0");
        assert_eq!(synth.build_count(), 1);
        assert!(synth.is_cached::<dyn Clock>());
    }

    #[test]
    fn rejection_caches_nothing() {
        let synth = ProxySynthesizer::new();

        let err = synth.synthesize::<dyn Unmarked>().unwrap_err();
        assert!(matches!(
            err.reason,
            UnsupportedReason::MissingContractMarker { .. }
        ));
        assert_eq!(synth.cached(), 0);
        assert_eq!(synth.build_count(), 0);
        assert!(!synth.is_cached::<dyn Unmarked>());
    }

    #[test]
    fn separate_synthesizers_do_not_share_state() {
        let a = ProxySynthesizer::new();
        let b = ProxySynthesizer::new();

        let from_a = a.synthesize::<dyn Clock>().unwrap();
        let from_b = b.synthesize::<dyn Clock>().unwrap();

        assert!(!from_a.same_type(&from_b));
        assert_eq!(from_a.name(), from_b.name());
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
