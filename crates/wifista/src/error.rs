//! CLI error types with miette diagnostics.
//!
//! Maps `StationError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use wifista_config::ConfigError;
use wifista_core::{DriverError, StationError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Station ──────────────────────────────────────────────────────

    #[error("Station setup failed at {stage}")]
    #[diagnostic(
        code(wifista::setup_failed),
        help("The platform rejected a setup call. Run with -vv to see each step.")
    )]
    SetupFailed {
        stage: String,
        #[source]
        source: DriverError,
    },

    #[error("Could not connect to '{ssid}' after {attempts} reconnect attempts")]
    #[diagnostic(
        code(wifista::connection_failed),
        help(
            "Check the SSID and passphrase, or raise the budget with --max-reconnect \
             (0 retries forever)."
        )
    )]
    ConnectionFailed { ssid: String, attempts: u32 },

    #[error("No connection outcome after {limit:?}")]
    #[diagnostic(
        code(wifista::timeout),
        help("Increase the limit with --timeout, or pass --timeout 0 to wait forever.")
    )]
    Timeout { limit: Duration },

    #[error("Connection wait ended unexpectedly (signals: {observed})")]
    #[diagnostic(code(wifista::unexpected_event))]
    UnexpectedEvent { observed: String },

    // ── Credentials ──────────────────────────────────────────────────

    #[error("No passphrase configured for profile '{profile}'")]
    #[diagnostic(
        code(wifista::no_credentials),
        help(
            "Store one with: wifista config set-passphrase {profile}\n\
             Or set the WIFISTA_PASSPHRASE environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifista::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wifista::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wifista config set ssid <name> --profile <profile>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No network configured")]
    #[diagnostic(
        code(wifista::no_config),
        help(
            "Pass --ssid, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wifista::config))]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── StationError → CliError mapping ──────────────────────────────────

impl From<StationError> for CliError {
    fn from(err: StationError) -> Self {
        match err {
            StationError::ResourceInit { stage, source } => CliError::SetupFailed {
                stage: stage.to_string(),
                source,
            },

            StationError::ConnectionFailed { ssid, attempts } => {
                CliError::ConnectionFailed { ssid, attempts }
            }

            StationError::UnexpectedEvent {
                timed_out_after: Some(limit),
                ..
            } => CliError::Timeout { limit },

            StationError::UnexpectedEvent { observed, .. } => CliError::UnexpectedEvent {
                observed: observed.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
