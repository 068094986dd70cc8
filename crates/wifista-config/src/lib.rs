//! Shared configuration for the wifista tools.
//!
//! TOML station profiles, passphrase resolution (env + keyring + plaintext),
//! and translation to `wifista_core::StationConfig`. The core crate never
//! reads files; everything disk- or environment-shaped lives here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wifista_core::config::{AuthMode, ScanMethod, SortMethod};
use wifista_core::{ClientOptions, Credentials, StationConfig};

/// Keyring service all wifista secrets are stored under.
pub const KEYRING_SERVICE: &str = "wifista";

/// Environment variable consulted for the passphrase of any profile.
pub const PASSPHRASE_ENV: &str = "WIFISTA_PASSPHRASE";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no passphrase configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named station profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated, sorted profile names for error messages.
    pub fn available_profiles(&self) -> String {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        if names.is_empty() {
            return "(none)".into();
        }
        names.sort_unstable();
        names.join(", ")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Reconnect budget; 0 retries forever.
    #[serde(default)]
    pub max_reconnect_count: u32,

    /// Connection wait limit in seconds; 0 waits forever.
    #[serde(default)]
    pub connect_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            max_reconnect_count: 0,
            connect_timeout: 0,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named network profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Network name.
    pub ssid: String,

    /// Passphrase (plaintext -- prefer keyring or env var).
    pub passphrase: Option<String>,

    /// Environment variable name containing the passphrase.
    pub passphrase_env: Option<String>,

    /// Override the reconnect budget.
    pub max_reconnect_count: Option<u32>,

    /// Override the connection wait limit (seconds, 0 = unbounded).
    pub connect_timeout: Option<u64>,

    pub scan_method: Option<ScanMethod>,
    pub sort_method: Option<SortMethod>,

    /// Weakest auth mode accepted. `open` allows an empty passphrase.
    pub auth_threshold: Option<AuthMode>,

    /// Minimum RSSI in dBm.
    pub rssi_threshold: Option<i8>,

    pub pmf_capable: Option<bool>,
    pub pmf_required: Option<bool>,

    /// Per-request retry count inside the driver.
    pub failure_retry_cnt: Option<u8>,
}

impl Profile {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            ..Self::default()
        }
    }

    /// Driver options with this profile's overrides applied.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        if let Some(scan) = self.scan_method {
            options.scan_method = scan;
        }
        if let Some(sort) = self.sort_method {
            options.sort_method = sort;
        }
        if let Some(auth) = self.auth_threshold {
            options.auth_threshold = auth;
        }
        if let Some(rssi) = self.rssi_threshold {
            options.rssi_threshold = rssi;
        }
        if let Some(capable) = self.pmf_capable {
            options.pmf.capable = capable;
        }
        if let Some(required) = self.pmf_required {
            options.pmf.required = required;
        }
        if let Some(retries) = self.failure_retry_cnt {
            options.failure_retry_cnt = retries;
        }
        options
    }

    fn is_open(&self) -> bool {
        self.auth_threshold == Some(AuthMode::Open)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tech", "hyperbliss", "wifista").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wifista");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `WIFISTA_DEFAULTS__MAX_RECONNECT_COUNT=3`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WIFISTA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Passphrase resolution ───────────────────────────────────────────

/// Keyring user under which a profile's passphrase is stored.
pub fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/passphrase")
}

/// Resolve a profile's passphrase from the credential chain.
///
/// Order: the profile's `passphrase_env` variable, `WIFISTA_PASSPHRASE`,
/// the system keyring, then plaintext in the config. Open networks fall
/// back to an empty passphrase.
pub fn resolve_passphrase(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_passphrase_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_passphrase_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's passphrase_env -> env var lookup
    if let Some(secret) = profile.passphrase_env.as_deref().and_then(&env) {
        debug!(profile = profile_name, "passphrase from profile env var");
        return Ok(SecretString::from(secret));
    }

    // 2. Global env var
    if let Some(secret) = env(PASSPHRASE_ENV) {
        debug!(profile = profile_name, "passphrase from {PASSPHRASE_ENV}");
        return Ok(SecretString::from(secret));
    }

    // 3. System keyring
    if let Some(secret) = keyring(&keyring_user(profile_name)) {
        debug!(profile = profile_name, "passphrase from keyring");
        return Ok(SecretString::from(secret));
    }

    // 4. Plaintext in config
    if let Some(ref secret) = profile.passphrase {
        return Ok(SecretString::from(secret.clone()));
    }

    if profile.is_open() {
        return Ok(SecretString::from(String::new()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── StationConfig translation ───────────────────────────────────────

/// Build a `StationConfig` from a profile and the global defaults.
pub fn profile_to_station_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<StationConfig, ConfigError> {
    let passphrase = resolve_passphrase(profile, profile_name)?;
    build_station_config(profile, defaults, passphrase)
}

fn build_station_config(
    profile: &Profile,
    defaults: &Defaults,
    passphrase: SecretString,
) -> Result<StationConfig, ConfigError> {
    if profile.ssid.is_empty() {
        return Err(ConfigError::Validation {
            field: "ssid".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = StationConfig::new(Credentials {
        ssid: profile.ssid.as_str().into(),
        passphrase,
    })
    .with_max_reconnect_count(
        profile
            .max_reconnect_count
            .unwrap_or(defaults.max_reconnect_count),
    );

    match profile.connect_timeout.unwrap_or(defaults.connect_timeout) {
        0 => {}
        secs => config = config.with_connect_timeout(Duration::from_secs(secs)),
    }
    config.client = profile.client_options();
    Ok(config)
}
