// wifista-core: Wireless station connection controller.
//
// Brings a radio up in station mode, drives association attempts under a
// reconnect budget, and resolves to connected or failed. Platform access goes
// through the collaborator traits in `driver`; `sim` runs everything in process.

pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
mod guard;
pub mod policy;
pub mod session;
pub mod signal;
pub mod sim;
pub mod station;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientOptions, Credentials, RadioInitConfig, Ssid, StationConfig};
pub use error::{DriverError, SetupStage, StationError};
pub use policy::{ReconnectPolicy, UNBOUNDED, should_retry};
pub use session::Outcome;
pub use signal::{Signal, SignalChannel, SignalSet};
pub use station::Station;

// Driver-facing types.
pub use driver::{
    DriverResult, EventFilter, EventLoop, KindFilter, NetifHandle, NetifStack,
    NotificationRegistry, NotificationSink, Platform, Radio, SubscriptionHandle, WifiMode,
};
pub use event::{
    DisconnectReason, EventCategory, EventKind, IpEvent, IpInfo, Notification, StationEvent,
};
pub use sim::{AttemptOutcome, DriverCall, SimFault, SimPlatform};
