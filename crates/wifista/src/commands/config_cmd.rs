//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use wifista_config::{self as cfgfile, Config, ConfigError, KEYRING_SERVICE, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{active_profile_name, output_format};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn redacted(cfg: Config) -> Config {
    let profiles = cfg
        .profiles
        .into_iter()
        .map(|(name, mut profile)| {
            if profile.passphrase.is_some() {
                profile.passphrase = Some(REDACTED.into());
            }
            (name, profile)
        })
        .collect();
    Config { profiles, ..cfg }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

fn parse_enum<T>(key: &str, value: &str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| CliError::Validation {
        field: key.into(),
        reason: e.to_string(),
    })
}

fn apply(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "ssid" => profile.ssid = value,
        "passphrase" => profile.passphrase = Some(value),
        "passphrase_env" => profile.passphrase_env = Some(value),
        "max_reconnect_count" => {
            profile.max_reconnect_count = Some(parse_value(key, &value, "a number (0 = unbounded)")?);
        }
        "connect_timeout" => {
            profile.connect_timeout = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "scan_method" => profile.scan_method = Some(parse_enum(key, &value)?),
        "sort_method" => profile.sort_method = Some(parse_enum(key, &value)?),
        "auth_threshold" => profile.auth_threshold = Some(parse_enum(key, &value)?),
        "rssi_threshold" => {
            profile.rssi_threshold = Some(parse_value(key, &value, "a number in dBm (-128..=127)")?);
        }
        "pmf_capable" => profile.pmf_capable = Some(parse_value(key, &value, "'true' or 'false'")?),
        "pmf_required" => profile.pmf_required = Some(parse_value(key, &value, "'true' or 'false'")?),
        "failure_retry_cnt" => {
            profile.failure_retry_cnt = Some(parse_value(key, &value, "a number (0-255)")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: ssid, passphrase, passphrase_env, \
                     max_reconnect_count, connect_timeout, scan_method, sort_method, \
                     auth_threshold, rssi_threshold, pmf_capable, pmf_required, failure_retry_cnt"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    ssid: String,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(cfgfile::load_config()?);
            let out = output::render_single(
                &output_format(global, &cfg),
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |_| cfgfile::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&cfgfile::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = cfgfile::load_config_or_default();
            let default = active_profile_name(global, &cfg);
            let mut entries: Vec<ProfileEntry> = cfg
                .profiles
                .iter()
                .map(|(name, profile)| ProfileEntry {
                    name: name.clone(),
                    ssid: profile.ssid.clone(),
                    default: *name == default,
                })
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));

            if entries.is_empty() {
                eprintln!("No profiles configured. Run: wifista config set ssid <name>");
                return Ok(());
            }
            let out = output::render_list(
                &output_format(global, &cfg),
                &entries,
                |e| ProfileRow {
                    name: e.name.clone(),
                    ssid: e.ssid.clone(),
                    default: if e.default { "*" } else { "" },
                },
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = cfgfile::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            cfgfile::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = cfgfile::load_config_or_default();
            let profile_name = active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            apply(profile, &key, value)?;

            let path = cfgfile::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}' ({})", path.display());
            Ok(())
        }

        ConfigCommand::SetPassphrase { name } => {
            let cfg = cfgfile::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let secret = rpassword::prompt_password(format!("Passphrase for '{profile_name}': "))?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "passphrase".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            let entry = keyring::Entry::new(KEYRING_SERVICE, &cfgfile::keyring_user(&profile_name))
                .map_err(ConfigError::Keyring)?;
            entry.set_password(&secret).map_err(ConfigError::Keyring)?;

            eprintln!("✓ Passphrase stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wifista_core::config::{AuthMode, ScanMethod};

    use super::*;

    #[test]
    fn set_accepts_dashed_and_underscored_keys() {
        let mut profile = Profile::default();
        apply(&mut profile, "ssid", "attic".into()).unwrap();
        apply(&mut profile, "scan-method", "all-channel".into()).unwrap();
        apply(&mut profile, "auth_threshold", "wpa3-psk".into()).unwrap();
        apply(&mut profile, "max-reconnect-count", "4".into()).unwrap();

        assert_eq!(profile.ssid, "attic");
        assert_eq!(profile.scan_method, Some(ScanMethod::AllChannel));
        assert_eq!(profile.auth_threshold, Some(AuthMode::Wpa3Psk));
        assert_eq!(profile.max_reconnect_count, Some(4));
    }

    #[test]
    fn set_rejects_bad_values_and_unknown_keys() {
        let mut profile = Profile::default();
        assert!(apply(&mut profile, "rssi_threshold", "-500".into()).is_err());
        assert!(apply(&mut profile, "scan_method", "sideways".into()).is_err());
        let err = apply(&mut profile, "colour", "blue".into()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn show_redacts_plaintext_passphrases() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("home");
        profile.passphrase = Some("hunter22".into());
        cfg.profiles.insert("home".into(), profile);
        cfg.profiles.insert("env".into(), Profile::new("env-only"));

        let cfg = redacted(cfg);
        assert_eq!(cfg.profiles["home"].passphrase.as_deref(), Some(REDACTED));
        assert_eq!(cfg.profiles["env"].passphrase, None);
    }
}
