//! Clap derive structures for the `echoctl` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// echoctl -- control Echo devices through the Alexa web console API
#[derive(Debug, Parser)]
#[command(
    name = "echoctl",
    version,
    about = "Control Amazon Echo devices from the command line",
    long_about = "Drive Echo playback (play, pause, volume, TuneIn radio, ...) on one or\n\
        more devices, authenticating with the cookie of a logged-in Alexa web\n\
        console session.\n\n\
        Without --device every controllable device of the account is targeted.",
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
    /// Target device by display name (repeatable; default: all devices)
    #[arg(long = "device", short = 'd', value_name = "NAME", global = true)]
    pub devices: Vec<String>,

    /// File holding the session cookie string
    #[arg(
        long,
        short = 'c',
        value_name = "COOKIE_FILE",
        env = "ECHOCTL_COOKIE_FILE",
        global = true
    )]
    pub cookie_file: Option<PathBuf>,

    /// Config profile to use
    #[arg(long, short = 'p', env = "ECHOCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API host (overrides profile)
    #[arg(long, env = "ECHOCTL_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Web console origin the cookie belongs to (overrides profile)
    #[arg(long, env = "ECHOCTL_CONSOLE_URL", global = true)]
    pub console_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "ECHOCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "ECHOCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ECHOCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one line per device (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// On/off switch for shuffle and repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    #[value(alias = "true")]
    On,
    #[value(alias = "false")]
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Self::On
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show each device's playback state and current title
    #[command(alias = "ls")]
    List,

    /// Show each device's full directory record
    Info,

    /// Resume playback
    Play,

    /// Pause playback
    Pause,

    /// Skip to the next item
    Next,

    /// Go back to the previous item
    #[command(alias = "prev")]
    Previous,

    /// Set the volume (0-100)
    #[command(alias = "vol")]
    Volume {
        /// Volume level
        #[arg(default_value_t = 50, allow_negative_numbers = true)]
        level: i64,
    },

    /// Turn shuffle on or off
    Shuffle {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Turn repeat on or off
    Repeat {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Search TuneIn and play the first matching station
    #[command(name = "tunein")]
    TuneIn {
        /// Station name (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration for the active profile
    Show,

    /// Print the config file path
    Path,

    /// Store a session cookie for the active profile
    SetCookie {
        /// Read the cookie from stdin instead of prompting
        #[arg(long)]
        stdin: bool,

        /// Save into the config file instead of the system keyring
        #[arg(long)]
        plaintext: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
