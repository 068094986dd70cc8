//! Clap derive structures for the `wifista` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use wifista_core::{AttemptOutcome, SimFault};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifista -- bring a wireless station up and watch it connect
#[derive(Debug, Parser)]
#[command(
    name = "wifista",
    version,
    about = "Drive a wireless station connection from the command line",
    long_about = "Runs the station connection controller: radio bring-up, \
        association under a reconnect budget, and teardown.\n\n\
        The `simulate` command drives an in-process radio whose behaviour \
        is scripted per connect attempt.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Network profile to use
    #[arg(long, short = 'p', env = "WIFISTA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format (falls back to `[defaults] output` in config, then table)
    #[arg(long, short = 'o', env = "WIFISTA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (falls back to `[defaults] color` in config, then auto)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect a station against the simulated radio
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Simulate ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Network name (overrides the profile's SSID)
    #[arg(long)]
    pub ssid: Option<String>,

    /// Reconnect budget; 0 retries forever
    #[arg(long, value_name = "N")]
    pub max_reconnect: Option<u32>,

    /// Give up after this many seconds; 0 waits forever
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Outcome of successive connect attempts:
    /// disconnect[:reason], got-ip[:a.b.c.d] or silent
    #[arg(long = "attempt", value_name = "OUTCOME", default_value = "got-ip")]
    pub attempts: Vec<AttemptOutcome>,

    /// Outcome once the scripted attempts run out
    #[arg(long, value_name = "OUTCOME", default_value = "disconnect")]
    pub fallback: AttemptOutcome,

    /// Make one platform call fail (e.g. radio-start, set-config)
    #[arg(long, value_name = "CALL")]
    pub fail_at: Option<SimFault>,

    /// Delay before each simulated notification, in milliseconds
    #[arg(long, value_name = "MS", default_value = "20")]
    pub latency_ms: u64,

    /// Channel reported on association
    #[arg(long, default_value = "6")]
    pub channel: u8,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration (passphrases redacted)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a value on the active profile
    Set {
        /// Key (ssid, passphrase_env, max_reconnect_count, connect_timeout, ...)
        key: String,
        /// Value
        value: String,
    },

    /// Store a profile's passphrase in the system keyring
    SetPassphrase {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
