//! CLI-side configuration glue: profile selection and flag overrides on top
//! of `wifista_config`.

use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;
use wifista_config::{Config, Profile, config_path, profile_to_station_config};
use wifista_core::StationConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, SimulateArgs};
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve the output format: the flag (or `WIFISTA_OUTPUT`), then
/// `[defaults] output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .clone()
        .or_else(|| from_defaults("output", &config.defaults.output))
        .unwrap_or(OutputFormat::Table)
}

/// Resolve the color mode: the flag, then `[defaults] color`, then auto.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    global
        .color
        .clone()
        .or_else(|| from_defaults("color", &config.defaults.color))
        .unwrap_or(ColorMode::Auto)
}

fn from_defaults<T: ValueEnum>(key: &str, value: &str) -> Option<T> {
    let parsed = T::from_str(value, true).ok();
    if parsed.is_none() {
        warn!(key, value, "ignoring unrecognized [defaults] value");
    }
    parsed
}

/// Build the `StationConfig` for a `simulate` run.
///
/// Flags win over the profile, the profile over `[defaults]`. Without a
/// profile, `--ssid` plus a passphrase from the environment or keyring is
/// enough.
pub fn station_config(
    global: &GlobalOpts,
    config: &Config,
    args: &SimulateArgs,
) -> Result<StationConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: config.available_profiles(),
            });
        }
        None => {
            let ssid = args.ssid.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(ssid)
        }
    };

    if let Some(ref ssid) = args.ssid {
        profile.ssid.clone_from(ssid);
    }

    let mut station = profile_to_station_config(&profile, &profile_name, &config.defaults)?;

    if let Some(max) = args.max_reconnect {
        station.max_reconnect_count = max;
    }
    if let Some(secs) = args.timeout {
        station.connect_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    Ok(station)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["wifista"];
        argv.extend_from_slice(args);
        argv.extend(["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn with_defaults(output: &str, color: &str) -> Config {
        let mut cfg = Config::default();
        cfg.defaults.output = output.into();
        cfg.defaults.color = color.into();
        cfg
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let cfg = with_defaults("json-compact", "never");
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::JsonCompact);
        assert_eq!(color_mode(&global(&[]), &cfg), ColorMode::Never);
    }

    #[test]
    fn flags_override_config_defaults() {
        let cfg = with_defaults("json", "never");
        let opts = global(&["-o", "yaml", "--color", "always"]);
        assert_eq!(output_format(&opts, &cfg), OutputFormat::Yaml);
        assert_eq!(color_mode(&opts, &cfg), ColorMode::Always);
    }

    #[test]
    fn unrecognized_defaults_fall_back() {
        let cfg = with_defaults("xml", "sometimes");
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
        assert_eq!(color_mode(&global(&[]), &cfg), ColorMode::Auto);

        let cfg = Config::default();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
        assert_eq!(color_mode(&global(&[]), &cfg), ColorMode::Auto);
    }
}
