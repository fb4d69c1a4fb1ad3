use thiserror::Error;

// -----------------------------------------------------------------------------
// ----- UnsupportedContractError ----------------------------------------------

/// Raised by the synthesizer when a type cannot be proxied. Carries the
/// contract that was asked for and the first reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{contract} is not a valid or supported service contract: {reason}")]
pub struct UnsupportedContractError {
    pub contract: String,
    pub reason: UnsupportedReason,
}

impl UnsupportedContractError {
    pub fn new(contract: impl Into<String>, reason: UnsupportedReason) -> Self {
        Self {
            contract: contract.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedReason {
    #[error("{interface} is not an interface")]
    NotAnInterface { interface: String },

    #[error("open generic definitions cannot be proxied")]
    OpenGeneric,

    #[error("generic method '{method}' declared on {interface}")]
    GenericMethod { interface: String, method: String },

    #[error("{interface} is not marked as a service contract")]
    MissingContractMarker { interface: String },
}

// -----------------------------------------------------------------------------
// ----- TransportError --------------------------------------------------------

/// Failure reported by a `Connector` while opening a channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection refused: {0}")]
    Refused(String),
}

// -----------------------------------------------------------------------------
// ----- PoolError -------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("could not establish connection to {endpoint}: {source}")]
    ConnectionEstablishment {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("pool for {endpoint} is closed")]
    Closed { endpoint: String },

    #[error("pool for {endpoint} cannot hold {requested} connections (max {max})")]
    CapacityTooLarge {
        endpoint: String,
        requested: usize,
        max: usize,
    },

    #[error("connector for {endpoint} returned the same connection twice")]
    DuplicateConnection { endpoint: String },

    #[error("pool for {endpoint} granted a permit without an idle connection")]
    Exhausted { endpoint: String },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
