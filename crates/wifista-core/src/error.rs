// ── Core error types ──
//
// Every failure a station construction can produce. Collaborator failures
// arrive as `DriverError` status codes and are wrapped with the setup stage
// that produced them; the connection outcome errors come from the wait.

use std::time::Duration;

use strum::Display;
use thiserror::Error;

use crate::signal::SignalSet;

// ── DriverError ──────────────────────────────────────────────────────

/// Non-success status reported by a platform collaborator.
///
/// Codes follow the radio SDK's status numbering so that a real driver
/// binding can pass its return value through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {code:#x})")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    /// Generic failure.
    pub const FAIL: i32 = -1;
    pub const NO_MEM: i32 = 0x101;
    pub const INVALID_ARG: i32 = 0x102;
    pub const INVALID_STATE: i32 = 0x103;
    /// Radio used before `init`.
    pub const NOT_INIT: i32 = 0x3001;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Self::FAIL, message)
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_ARG, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_STATE, message)
    }
}

// ── SetupStage ───────────────────────────────────────────────────────

/// The construction step that reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SetupStage {
    NetifInit,
    EventLoopCreate,
    RadioInit,
    RegisterStationEvents,
    RegisterIpEvents,
    SetMode,
    SetConfig,
    RadioStart,
}

// ── StationError ─────────────────────────────────────────────────────

/// Sole observable failure of [`Station::connect`](crate::Station::connect).
#[derive(Debug, Error)]
pub enum StationError {
    /// A setup step failed; everything acquired before it was released.
    #[error("station setup failed at {stage}: {source}")]
    ResourceInit {
        stage: SetupStage,
        #[source]
        source: DriverError,
    },

    /// The reconnect budget ran out before an address was acquired.
    #[error("failed to connect to SSID '{ssid}' after {attempts} reconnect attempts")]
    ConnectionFailed { ssid: String, attempts: u32 },

    /// The wait ended without a terminal signal. `timed_out_after` is set
    /// when the configured connect timeout elapsed.
    #[error("unexpected connection event (signals: {observed})")]
    UnexpectedEvent {
        observed: SignalSet,
        timed_out_after: Option<Duration>,
    },
}

impl StationError {
    pub(crate) fn resource_init(stage: SetupStage) -> impl FnOnce(DriverError) -> Self {
        move |source| Self::ResourceInit { stage, source }
    }

    /// Whether the wait gave up because the configured timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEvent {
                timed_out_after: Some(_),
                ..
            }
        )
    }
}
