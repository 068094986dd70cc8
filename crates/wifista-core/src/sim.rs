// ── Simulated platform ──
//
// In-process implementation of every collaborator trait. Notifications are
// queued and delivered by a dispatcher task, one at a time, the way the
// vendor driver delivers them from its own event task. Must be built inside
// a tokio runtime.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::{ClientConfiguration, MAX_PASSPHRASE_LEN, MAX_SSID_LEN, RadioInitConfig};
use crate::driver::{
    DriverResult, EventFilter, EventLoop, NetifHandle, NetifStack, NotificationRegistry,
    NotificationSink, Radio, SubscriptionHandle, WifiMode,
};
use crate::error::DriverError;
use crate::event::{DisconnectReason, EventCategory, IpEvent, IpInfo, Notification, StationEvent};

// ── AttemptOutcome ───────────────────────────────────────────────────

/// What the simulated access point does with one connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Association fails with the given reason.
    Disconnect(DisconnectReason),
    /// Association succeeds and DHCP hands out this lease.
    Associate(IpInfo),
    /// Nothing happens.
    Silent,
}

impl AttemptOutcome {
    pub const DEFAULT_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);

    pub fn disconnect() -> Self {
        Self::Disconnect(DisconnectReason::NO_AP_FOUND)
    }

    pub fn associate() -> Self {
        Self::Associate(IpInfo::with_default_gateway(Self::DEFAULT_IP))
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnect(reason) => match reason.name() {
                Some(name) => write!(f, "disconnect:{name}"),
                None => write!(f, "disconnect:{}", reason.0),
            },
            Self::Associate(info) => write!(f, "got-ip:{}", info.ip),
            Self::Silent => f.write_str("silent"),
        }
    }
}

impl FromStr for AttemptOutcome {
    type Err = String;

    /// `disconnect[:reason]`, `got-ip[:a.b.c.d]` or `silent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, arg) = match s.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (s, None),
        };
        match (head.to_ascii_lowercase().as_str(), arg) {
            ("disconnect", None) => Ok(Self::disconnect()),
            ("disconnect", Some(reason)) => reason.parse().map(Self::Disconnect),
            ("got-ip", None) => Ok(Self::associate()),
            ("got-ip", Some(ip)) => ip
                .parse::<Ipv4Addr>()
                .map(|ip| Self::Associate(IpInfo::with_default_gateway(ip)))
                .map_err(|e| format!("invalid address '{ip}': {e}")),
            ("silent", None) => Ok(Self::Silent),
            _ => Err(format!(
                "unknown attempt outcome '{s}' (expected disconnect[:reason], got-ip[:a.b.c.d] or silent)"
            )),
        }
    }
}

// ── Call log / faults ────────────────────────────────────────────────

/// One collaborator call, as observed by the simulated platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    NetifInit,
    NetifDeinit,
    CreateDefaultStation(NetifHandle),
    DestroyDefaultStation(NetifHandle),
    CreateDefaultLoop,
    DeleteDefaultLoop,
    RadioInit,
    RadioDeinit,
    SetMode(WifiMode),
    SetConfig { ssid: String },
    Start,
    Stop,
    Connect,
    Register(EventFilter),
    Unregister(EventFilter),
}

/// A fallible collaborator call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SimFault {
    NetifInit,
    EventLoopCreate,
    RadioInit,
    RegisterStationEvents,
    RegisterIpEvents,
    SetMode,
    SetConfig,
    RadioStart,
    Connect,
    Stop,
    UnregisterStationEvents,
    UnregisterIpEvents,
    RadioDeinit,
    EventLoopDelete,
    NetifDeinit,
}

impl SimFault {
    fn register(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::Station => Some(Self::RegisterStationEvents),
            EventCategory::Ip => Some(Self::RegisterIpEvents),
            EventCategory::Other => None,
        }
    }

    fn unregister(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::Station => Some(Self::UnregisterStationEvents),
            EventCategory::Ip => Some(Self::UnregisterIpEvents),
            EventCategory::Other => None,
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimPlatformBuilder {
    script: VecDeque<AttemptOutcome>,
    fallback: AttemptOutcome,
    faults: HashMap<SimFault, DriverError>,
    channel: u8,
    latency: Duration,
}

impl Default for SimPlatformBuilder {
    fn default() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: AttemptOutcome::disconnect(),
            faults: HashMap::new(),
            channel: 6,
            latency: Duration::ZERO,
        }
    }
}

impl SimPlatformBuilder {
    /// Append one scripted connect outcome.
    pub fn attempt(mut self, outcome: AttemptOutcome) -> Self {
        self.script.push_back(outcome);
        self
    }

    pub fn attempts(mut self, outcomes: impl IntoIterator<Item = AttemptOutcome>) -> Self {
        self.script.extend(outcomes);
        self
    }

    /// Outcome used once the script runs out.
    pub fn fallback(mut self, outcome: AttemptOutcome) -> Self {
        self.fallback = outcome;
        self
    }

    pub fn fail(mut self, at: SimFault, error: DriverError) -> Self {
        self.faults.insert(at, error);
        self
    }

    /// Channel reported in station-connected notifications.
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Delay before each notification is delivered.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn build(self) -> SimPlatform {
        let registry: Arc<DashMap<u64, Registration>> = Arc::new(DashMap::new());
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(rx, Arc::clone(&registry), self.latency));

        SimPlatform {
            registry,
            queue: tx,
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(self.script),
            fallback: self.fallback,
            faults: self.faults,
            channel: self.channel,
            next_id: AtomicU64::new(1),
            connect_requests: AtomicU32::new(0),
            radio_ready: AtomicBool::new(false),
            started: AtomicBool::new(false),
        }
    }
}

// ── SimPlatform ──────────────────────────────────────────────────────

struct Registration {
    filter: EventFilter,
    sink: Arc<dyn NotificationSink>,
}

pub struct SimPlatform {
    registry: Arc<DashMap<u64, Registration>>,
    queue: mpsc::UnboundedSender<Notification>,
    calls: Mutex<Vec<DriverCall>>,
    script: Mutex<VecDeque<AttemptOutcome>>,
    fallback: AttemptOutcome,
    faults: HashMap<SimFault, DriverError>,
    channel: u8,
    next_id: AtomicU64,
    connect_requests: AtomicU32,
    radio_ready: AtomicBool,
    started: AtomicBool,
}

impl SimPlatform {
    /// Platform whose every connect attempt fails with "no AP found".
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SimPlatformBuilder {
        SimPlatformBuilder::default()
    }

    /// Every collaborator call so far, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn active_registrations(&self) -> usize {
        self.registry.len()
    }

    pub fn connect_requests(&self) -> u32 {
        self.connect_requests.load(Ordering::SeqCst)
    }

    /// Queue an arbitrary notification for delivery.
    pub fn inject(&self, notification: Notification) {
        self.emit(notification);
    }

    fn record(&self, call: DriverCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn check(&self, fault: Option<SimFault>) -> DriverResult {
        match fault.and_then(|f| self.faults.get(&f)) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn emit(&self, notification: Notification) {
        if self.queue.send(notification).is_err() {
            debug!("dispatcher stopped, dropping notification");
        }
    }

    fn next_attempt(&self) -> AttemptOutcome {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimPlatform")
            .field("registrations", &self.registry.len())
            .field("connect_requests", &self.connect_requests())
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    registry: Arc<DashMap<u64, Registration>>,
    latency: Duration,
) {
    while let Some(notification) = rx.recv().await {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        // Collect first: sinks may call back into the platform.
        let sinks: Vec<Arc<dyn NotificationSink>> = registry
            .iter()
            .filter(|entry| entry.filter.matches(&notification))
            .map(|entry| Arc::clone(&entry.sink))
            .collect();
        trace!(%notification, sinks = sinks.len(), "dispatching");
        for sink in sinks {
            sink.on_notification(&notification);
        }
    }
}

// ── Collaborator impls ───────────────────────────────────────────────

impl NetifStack for SimPlatform {
    fn netif_init(&self) -> DriverResult {
        self.record(DriverCall::NetifInit);
        self.check(Some(SimFault::NetifInit))
    }

    fn netif_deinit(&self) -> DriverResult {
        self.record(DriverCall::NetifDeinit);
        self.check(Some(SimFault::NetifDeinit))
    }

    fn create_default_station(&self) -> NetifHandle {
        let handle = NetifHandle::new(1);
        self.record(DriverCall::CreateDefaultStation(handle));
        handle
    }

    fn destroy_default_station(&self, handle: NetifHandle) {
        self.record(DriverCall::DestroyDefaultStation(handle));
    }
}

impl EventLoop for SimPlatform {
    fn create_default_loop(&self) -> DriverResult {
        self.record(DriverCall::CreateDefaultLoop);
        self.check(Some(SimFault::EventLoopCreate))
    }

    fn delete_default_loop(&self) -> DriverResult {
        self.record(DriverCall::DeleteDefaultLoop);
        self.check(Some(SimFault::EventLoopDelete))
    }
}

impl Radio for SimPlatform {
    fn radio_init(&self, _config: &RadioInitConfig) -> DriverResult {
        self.record(DriverCall::RadioInit);
        self.check(Some(SimFault::RadioInit))?;
        self.radio_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn radio_deinit(&self) -> DriverResult {
        self.record(DriverCall::RadioDeinit);
        self.check(Some(SimFault::RadioDeinit))?;
        self.radio_ready.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_mode(&self, mode: WifiMode) -> DriverResult {
        self.record(DriverCall::SetMode(mode));
        self.check(Some(SimFault::SetMode))?;
        if !self.radio_ready.load(Ordering::SeqCst) {
            return Err(DriverError::new(DriverError::NOT_INIT, "radio not initialized"));
        }
        Ok(())
    }

    fn set_config(&self, config: &ClientConfiguration) -> DriverResult {
        self.record(DriverCall::SetConfig {
            ssid: config.ssid.to_string(),
        });
        self.check(Some(SimFault::SetConfig))?;
        if config.ssid.len() > MAX_SSID_LEN {
            return Err(DriverError::invalid_arg(format!(
                "ssid is {} bytes, limit is {MAX_SSID_LEN}",
                config.ssid.len()
            )));
        }
        let passphrase_len = config.passphrase.expose_secret().len();
        if passphrase_len > MAX_PASSPHRASE_LEN {
            return Err(DriverError::invalid_arg(format!(
                "passphrase is {passphrase_len} bytes, limit is {MAX_PASSPHRASE_LEN}"
            )));
        }
        Ok(())
    }

    fn start(&self) -> DriverResult {
        self.record(DriverCall::Start);
        self.check(Some(SimFault::RadioStart))?;
        if !self.radio_ready.load(Ordering::SeqCst) {
            return Err(DriverError::new(DriverError::NOT_INIT, "radio not initialized"));
        }
        self.started.store(true, Ordering::SeqCst);
        self.emit(Notification::Station(StationEvent::Started));
        Ok(())
    }

    fn stop(&self) -> DriverResult {
        self.record(DriverCall::Stop);
        self.check(Some(SimFault::Stop))?;
        if self.started.swap(false, Ordering::SeqCst) {
            self.emit(Notification::Station(StationEvent::Stopped));
        }
        Ok(())
    }

    fn connect(&self) -> DriverResult {
        self.record(DriverCall::Connect);
        self.check(Some(SimFault::Connect))?;
        if !self.started.load(Ordering::SeqCst) {
            return Err(DriverError::invalid_state("station not started"));
        }
        self.connect_requests.fetch_add(1, Ordering::SeqCst);

        match self.next_attempt() {
            AttemptOutcome::Disconnect(reason) => {
                self.emit(Notification::Station(StationEvent::Disconnected { reason }));
            }
            AttemptOutcome::Associate(info) => {
                self.emit(Notification::Station(StationEvent::Connected {
                    channel: self.channel,
                }));
                self.emit(Notification::Ip(IpEvent::GotIp(info)));
            }
            AttemptOutcome::Silent => {}
        }
        Ok(())
    }
}

impl NotificationRegistry for SimPlatform {
    fn register(
        &self,
        filter: EventFilter,
        sink: Arc<dyn NotificationSink>,
    ) -> DriverResult<SubscriptionHandle> {
        self.record(DriverCall::Register(filter));
        self.check(SimFault::register(filter.category))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.registry.insert(id, Registration { filter, sink });
        Ok(SubscriptionHandle::new(id, filter))
    }

    fn unregister(&self, handle: &SubscriptionHandle) -> DriverResult {
        self.record(DriverCall::Unregister(handle.filter()));
        self.check(SimFault::unregister(handle.filter().category))?;
        match self.registry.remove(&handle.id()) {
            Some(_) => Ok(()),
            None => Err(DriverError::invalid_arg(format!(
                "no registration with id {}",
                handle.id()
            ))),
        }
    }
}
