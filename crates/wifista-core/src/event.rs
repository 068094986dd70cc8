// ── Driver notifications ──
//
// Typed form of the `(category, kind, payload)` tuples the radio driver
// delivers to registered sinks. Kinds the station does not act on are still
// modelled so they can be filtered, logged, and ignored.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── EventCategory / EventKind ────────────────────────────────────────

/// Notification source, used when registering a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    /// Station-role lifecycle (start, connect, disconnect, ...).
    Station,
    /// IP-layer lifecycle on the station interface.
    Ip,
    /// Any other subsystem sharing the event loop.
    Other,
}

/// Payload-free notification kind, used in registration filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Started,
    Stopped,
    Connected,
    Disconnected,
    ScanDone,
    AuthModeChanged,
    GotIp,
    LostIp,
    Unknown(i32),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::ScanDone => "scan-done",
            Self::AuthModeChanged => "auth-mode-changed",
            Self::GotIp => "got-ip",
            Self::LostIp => "lost-ip",
            Self::Unknown(id) => return write!(f, "unknown-{id}"),
        };
        f.write_str(name)
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Addressing assigned to the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl IpInfo {
    /// A /24 lease with the gateway at `.1` of the same subnet.
    pub fn with_default_gateway(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        Self {
            ip,
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(a, b, c, 1),
        }
    }
}

impl fmt::Display for IpInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mask {} gw {}", self.ip, self.netmask, self.gateway)
    }
}

/// 802.11 disconnect reason code as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisconnectReason(pub u8);

impl DisconnectReason {
    pub const UNSPECIFIED: Self = Self(1);
    pub const AUTH_EXPIRE: Self = Self(2);
    pub const ASSOC_LEAVE: Self = Self(8);
    pub const FOUR_WAY_HANDSHAKE_TIMEOUT: Self = Self(15);
    pub const BEACON_TIMEOUT: Self = Self(200);
    pub const NO_AP_FOUND: Self = Self(201);
    pub const AUTH_FAIL: Self = Self(202);
    pub const ASSOC_FAIL: Self = Self(203);
    pub const HANDSHAKE_TIMEOUT: Self = Self(204);
    pub const CONNECTION_FAIL: Self = Self(205);

    const NAMED: [(Self, &'static str); 10] = [
        (Self::UNSPECIFIED, "unspecified"),
        (Self::AUTH_EXPIRE, "auth-expire"),
        (Self::ASSOC_LEAVE, "assoc-leave"),
        (Self::FOUR_WAY_HANDSHAKE_TIMEOUT, "4way-handshake-timeout"),
        (Self::BEACON_TIMEOUT, "beacon-timeout"),
        (Self::NO_AP_FOUND, "no-ap-found"),
        (Self::AUTH_FAIL, "auth-fail"),
        (Self::ASSOC_FAIL, "assoc-fail"),
        (Self::HANDSHAKE_TIMEOUT, "handshake-timeout"),
        (Self::CONNECTION_FAIL, "connection-fail"),
    ];

    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(reason, _)| *reason == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "reason {}", self.0),
        }
    }
}

impl FromStr for DisconnectReason {
    type Err = String;

    /// Accepts a known name (`no-ap-found`) or a numeric code (`201`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Ok(Self(code));
        }
        Self::NAMED
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(reason, _)| *reason)
            .ok_or_else(|| format!("unknown disconnect reason '{s}'"))
    }
}

// ── Notification ─────────────────────────────────────────────────────

/// Station-role lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    Started,
    Stopped,
    Connected { channel: u8 },
    Disconnected { reason: DisconnectReason },
    ScanDone { found: u16 },
    AuthModeChanged,
}

/// IP-layer events on the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpEvent {
    GotIp(IpInfo),
    LostIp,
}

/// One asynchronous notification from the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Station(StationEvent),
    Ip(IpEvent),
    /// A notification from a subsystem this crate has no model for.
    Other { base: String, id: i32 },
}

impl Notification {
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Station(_) => EventCategory::Station,
            Self::Ip(_) => EventCategory::Ip,
            Self::Other { .. } => EventCategory::Other,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Station(event) => match event {
                StationEvent::Started => EventKind::Started,
                StationEvent::Stopped => EventKind::Stopped,
                StationEvent::Connected { .. } => EventKind::Connected,
                StationEvent::Disconnected { .. } => EventKind::Disconnected,
                StationEvent::ScanDone { .. } => EventKind::ScanDone,
                StationEvent::AuthModeChanged => EventKind::AuthModeChanged,
            },
            Self::Ip(IpEvent::GotIp(_)) => EventKind::GotIp,
            Self::Ip(IpEvent::LostIp) => EventKind::LostIp,
            Self::Other { id, .. } => EventKind::Unknown(*id),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other { base, id } => write!(f, "{base}/{id}"),
            other => write!(f, "{}/{}", other.category(), other.kind()),
        }
    }
}
