#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use proxypool::{Connector, TransportError, service_contract};

// -----------------------------------------------------------------------------
// ----- Contracts -------------------------------------------------------------

service_contract! {
    pub trait Pinger {
        fn ping(&self) -> String;
    }
}

service_contract! {
    pub trait Counter {
        property number: i32 {
            get => number;
            set => set_number;
        }
    }
}

service_contract! {
    /// Test service inheriting both halves above.
    pub trait TestService: Pinger + Counter {
        fn echo(&self, message: String, times: usize) -> String;
        fn add(&self, a: i64, b: i64) -> i64;
        fn id(&self) -> usize;
    }
}

// -----------------------------------------------------------------------------
// ----- StubService -----------------------------------------------------------

/// Connection stand-in that records every call it receives.
#[derive(Debug)]
pub struct StubService {
    id: usize,
    number: AtomicI32,
    calls: Mutex<Vec<String>>,
}

impl StubService {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            number: AtomicI32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl Pinger for StubService {
    fn ping(&self) -> String {
        self.record("ping()".into());
        format!("pong from {}", self.id)
    }
}

impl Counter for StubService {
    fn number(&self) -> i32 {
        self.record("number()".into());
        self.number.load(Ordering::SeqCst)
    }

    fn set_number(&self, value: i32) {
        self.record(format!("set_number({value})"));
        self.number.store(value, Ordering::SeqCst);
    }
}

impl TestService for StubService {
    fn echo(&self, message: String, times: usize) -> String {
        self.record(format!("echo({message:?}, {times})"));
        message.repeat(times)
    }

    fn add(&self, a: i64, b: i64) -> i64 {
        self.record(format!("add({a}, {b})"));
        a + b
    }

    fn id(&self) -> usize {
        self.id
    }
}

// -----------------------------------------------------------------------------
// ----- StubConnector ---------------------------------------------------------

/// Hands out `StubService`s and keeps a handle on each so tests can inspect
/// what the proxies forwarded.
#[derive(Debug, Default)]
pub struct StubConnector {
    opened: AtomicUsize,
    closed: AtomicUsize,
    refuse: AtomicBool,
    services: Mutex<Vec<Arc<StubService>>>,
}

impl StubConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn as_connector(self: &Arc<Self>) -> Arc<dyn Connector<dyn TestService>> {
        self.clone()
    }

    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn service(&self, id: usize) -> Arc<StubService> {
        self.services.lock()[id].clone()
    }
}

#[async_trait]
impl Connector<dyn TestService> for StubConnector {
    fn endpoint(&self) -> &str {
        "stub://test-service"
    }

    async fn open(&self) -> Result<Arc<dyn TestService>, TransportError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Refused("stub refuses".into()));
        }

        let mut services = self.services.lock();
        let service = Arc::new(StubService::new(services.len()));
        services.push(service.clone());
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(service as Arc<dyn TestService>)
    }

    fn close(&self, _connection: Arc<dyn TestService>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
