// ── Runtime station configuration ──
//
// Network credentials, driver association options and radio sizing for one
// session. Loading from files lives in `wifista-config`.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

use crate::policy::{ReconnectPolicy, UNBOUNDED};

/// Longest SSID the radio accepts, in bytes.
pub const MAX_SSID_LEN: usize = 32;
/// Longest passphrase the radio accepts, in bytes.
pub const MAX_PASSPHRASE_LEN: usize = 64;

// ── Credentials ──────────────────────────────────────────────────────

/// Network name as raw bytes. Not required to be UTF-8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssid({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Ssid {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Ssid {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for Ssid {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Ssid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifier + secret for one network. Length limits belong to the
/// driver and are enforced when the configuration is applied.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub ssid: Ssid,
    pub passphrase: SecretString,
}

impl Credentials {
    pub fn new(ssid: impl Into<Ssid>, passphrase: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: SecretString::from(passphrase.into()),
        }
    }
}

// ── Client options ───────────────────────────────────────────────────

/// How the driver scans before associating.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScanMethod {
    /// Stop at the first matching access point.
    #[default]
    Fast,
    /// Scan every channel, then pick.
    AllChannel,
}

/// Ordering applied to candidate access points after an all-channel scan.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortMethod {
    Signal,
    #[default]
    Security,
}

/// Weakest authentication mode the station will accept.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AuthMode {
    Open,
    Wep,
    WpaPsk,
    #[default]
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa3Psk,
    Wpa2Wpa3Psk,
}

/// Protected management frame negotiation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmfConfig {
    pub capable: bool,
    pub required: bool,
}

/// Association tuning passed to the driver alongside the credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    pub scan_method: ScanMethod,
    pub sort_method: SortMethod,
    pub auth_threshold: AuthMode,
    /// Minimum RSSI in dBm; 0 disables the filter.
    pub rssi_threshold: i8,
    pub pmf: PmfConfig,
    /// Attempts the driver itself makes per connect request before
    /// reporting a disconnection.
    pub failure_retry_cnt: u8,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            scan_method: ScanMethod::default(),
            sort_method: SortMethod::default(),
            auth_threshold: AuthMode::default(),
            rssi_threshold: 0,
            pmf: PmfConfig::default(),
            failure_retry_cnt: 2,
        }
    }
}

/// Everything the radio receives in a single `set_config` call.
#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    pub ssid: Ssid,
    pub passphrase: SecretString,
    pub options: ClientOptions,
}

// ── Radio init ───────────────────────────────────────────────────────

/// Driver resource sizing, applied once at radio init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioInitConfig {
    pub static_rx_buf_num: u8,
    pub dynamic_rx_buf_num: u8,
    pub dynamic_tx_buf_num: u8,
    pub ampdu_rx_enabled: bool,
    /// Persist driver state in non-volatile storage.
    pub nvs_enabled: bool,
}

impl Default for RadioInitConfig {
    fn default() -> Self {
        Self {
            static_rx_buf_num: 10,
            dynamic_rx_buf_num: 32,
            dynamic_tx_buf_num: 32,
            ampdu_rx_enabled: true,
            nvs_enabled: true,
        }
    }
}

// ── StationConfig ────────────────────────────────────────────────────

/// Configuration for one station session.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub credentials: Credentials,
    /// Reconnect budget; [`UNBOUNDED`] (0) retries forever.
    pub max_reconnect_count: u32,
    /// Upper bound on the connection wait. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    pub client: ClientOptions,
    pub radio: RadioInitConfig,
}

impl StationConfig {
    /// Unbounded retries, no timeout, driver defaults.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            max_reconnect_count: UNBOUNDED,
            connect_timeout: None,
            client: ClientOptions::default(),
            radio: RadioInitConfig::default(),
        }
    }

    pub fn with_max_reconnect_count(mut self, max: u32) -> Self {
        self.max_reconnect_count = max;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.max_reconnect_count)
    }

    pub fn client_configuration(&self) -> ClientConfiguration {
        ClientConfiguration {
            ssid: self.credentials.ssid.clone(),
            passphrase: self.credentials.passphrase.clone(),
            options: self.client,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn defaults_mirror_driver_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.scan_method, ScanMethod::Fast);
        assert_eq!(options.sort_method, SortMethod::Security);
        assert_eq!(options.auth_threshold, AuthMode::Wpa2Psk);
        assert_eq!(options.failure_retry_cnt, 2);
        assert!(!options.pmf.capable && !options.pmf.required);
    }

    #[test]
    fn debug_output_redacts_passphrase() {
        let config = StationConfig::new(Credentials::new("home", "hunter22"));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("home"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn client_configuration_carries_credentials_and_options() {
        let mut config = StationConfig::new(Credentials::new("lab", "s3cret-pass"))
            .with_max_reconnect_count(3)
            .with_connect_timeout(Duration::from_secs(5));
        config.client.scan_method = ScanMethod::AllChannel;

        let client = config.client_configuration();
        assert_eq!(client.ssid.as_bytes(), b"lab");
        assert_eq!(client.passphrase.expose_secret(), "s3cret-pass");
        assert_eq!(client.options.scan_method, ScanMethod::AllChannel);
        assert_eq!(config.policy().max_count(), 3);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn auth_mode_parses_kebab_case() {
        assert_eq!("wpa2-wpa3-psk".parse::<AuthMode>().ok(), Some(AuthMode::Wpa2Wpa3Psk));
        assert_eq!(AuthMode::WpaPsk.to_string(), "wpa-psk");
    }

    #[test]
    fn ssid_display_is_lossy_utf8() {
        let ssid = Ssid::from(vec![b'c', b'a', b'f', 0xff]);
        assert_eq!(ssid.to_string(), "caf\u{fffd}");
        assert_eq!(ssid.len(), 4);
    }
}
