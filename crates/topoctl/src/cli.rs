//! Clap derive structures for the `topoctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use topoctl_core::DeviceKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// topoctl -- route planning and policy editing for SDN/classic networks
#[derive(Debug, Parser)]
#[command(
    name = "topoctl",
    version,
    about = "Plan routes and edit network policies from the command line",
    long_about = "Computes loop-free routes over a topology snapshot, validates policy\n\
        edits, and emits the command lines understood by the execution queue.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "TOPOCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Topology snapshot (JSON)
    #[arg(long, short = 't', global = true)]
    pub topology: Option<PathBuf>,

    /// Policy file, one command line per policy
    #[arg(long, short = 'p', global = true)]
    pub policies: Option<PathBuf>,

    /// Execution queue endpoint; without it command lines go to stdout
    #[arg(long, global = true)]
    pub queue_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TOPOCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Inspect the topology snapshot
    #[command(alias = "topo")]
    Topology(TopologyArgs),

    /// Compute alternates and multi-waypoint routes
    #[command(alias = "r")]
    Routes(RoutesArgs),

    /// List and edit policies
    #[command(alias = "pol")]
    Policy(PolicyArgs),

    /// Create, rename, and delete devices
    #[command(alias = "dev")]
    Device(DeviceArgs),

    /// Show CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOPOLOGY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TopologyArgs {
    #[command(subcommand)]
    pub command: TopologyCommand,
}

#[derive(Debug, Subcommand)]
pub enum TopologyCommand {
    /// List devices and their ports
    #[command(alias = "ls")]
    Devices,

    /// List links
    Links,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// Alternate paths between two devices, shortest first
    Alternates {
        /// Source device
        from: String,
        /// Destination device
        to: String,
    },

    /// Simple routes through an ordered list of waypoints
    #[command(alias = "calc")]
    Calculate {
        /// Devices the route must visit, in order
        #[arg(required = true, num_args = 1..)]
        waypoints: Vec<String>,
    },

    /// Turn a computed route into Route policies for a flow
    Apply {
        /// Flow the Route policies steer
        #[arg(long)]
        flow: String,

        /// Which computed route to apply (1-based)
        #[arg(long, default_value = "1")]
        pick: usize,

        /// Write the updated policy set back to the policy file
        #[arg(long)]
        save: bool,

        /// Devices the route must visit, in order
        #[arg(required = true, num_args = 1..)]
        waypoints: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POLICY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// List policies and the flows, zones, and subnets they define
    #[command(alias = "ls")]
    List,

    /// Validate and emit a new policy
    ///
    /// Example: topoctl policy new flow web '*' 10.0.0.0/8 6 '*' 80
    New {
        /// Policy tokens: <type> <field>...
        #[arg(required = true, num_args = 1..)]
        policy: Vec<String>,

        /// Write the updated policy set back to the policy file
        #[arg(long)]
        save: bool,
    },

    /// Put several devices into one zone
    ///
    /// Example: topoctl policy zone dmz R1 R2 S1
    Zone {
        /// Zone name
        zone: String,

        /// Devices to place in the zone
        #[arg(required = true, num_args = 1..)]
        devices: Vec<String>,

        /// Write the updated policy set back to the policy file
        #[arg(long)]
        save: bool,
    },

    /// Replace an existing policy
    Edit {
        /// Replacement policy tokens
        #[arg(required = true, num_args = 1..)]
        policy: Vec<String>,

        /// Tokens of the policy being replaced
        #[arg(long, required = true, num_args = 1..)]
        old: Vec<String>,

        /// Write the updated policy set back to the policy file
        #[arg(long)]
        save: bool,
    },

    /// Delete an existing policy
    #[command(alias = "rm")]
    Delete {
        /// Policy tokens
        #[arg(required = true, num_args = 1..)]
        policy: Vec<String>,

        /// Write the updated policy set back to the policy file
        #[arg(long)]
        save: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Register a new device
    New {
        /// Device family
        #[arg(long, value_enum)]
        kind: DeviceKindArg,

        /// Device name
        #[arg(long)]
        name: String,

        /// Management address (required for classic devices)
        #[arg(long)]
        ip: Option<String>,
    },

    /// Rename a device
    Edit {
        /// Current device name
        device: String,

        /// New device name
        #[arg(long)]
        name: String,

        /// Also rewrite policies that reference the device and save them
        #[arg(long)]
        save: bool,
    },

    /// Remove a device
    #[command(alias = "rm")]
    Delete {
        /// Device name
        device: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceKindArg {
    /// Managed through a management address
    Classic,
    /// OpenFlow switch behind the SDN controller
    Sdn,
}

impl From<DeviceKindArg> for DeviceKind {
    fn from(arg: DeviceKindArg) -> Self {
        match arg {
            DeviceKindArg::Classic => Self::Classic,
            DeviceKindArg::Sdn => Self::Sdn,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
