//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use topoctl_config::ConfigError;
use topoctl_core::CoreError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Inputs ───────────────────────────────────────────────────────

    #[error("No topology snapshot configured")]
    #[diagnostic(
        code(topoctl::no_topology),
        help(
            "Pass --topology <FILE>, set TOPOCTL_TOPOLOGY, or add\n\
             topology = \"/path/topology.json\" to {config_path}"
        )
    )]
    NoTopology { config_path: String },

    #[error("Could not read {path}")]
    #[diagnostic(code(topoctl::read_failed))]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid topology in {path}: {message}")]
    #[diagnostic(
        code(topoctl::invalid_topology),
        help("Every link must join two existing devices through ports they declare.")
    )]
    InvalidTopology { path: String, message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(topoctl::not_found),
        help("Run: topoctl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No path from {from} to {to}")]
    #[diagnostic(
        code(topoctl::unreachable),
        help("The devices are in disconnected parts of the topology.")
    )]
    Unreachable { from: String, to: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(topoctl::validation))]
    Validation { field: String, reason: String },

    #[error("Malformed command {line:?}: {reason}")]
    #[diagnostic(
        code(topoctl::malformed_command),
        help(
            "Expected <type> <field>..., for example:\n  \
             zone R1 dmz\n  \
             flow web * 10.0.0.0/8 6 * 80"
        )
    )]
    MalformedCommand { line: String, reason: String },

    #[error("{subject} rejected: {report}")]
    #[diagnostic(
        code(topoctl::rejected),
        help("Fix the listed fields and try again.")
    )]
    Rejected { subject: String, report: String },

    // ── Queue ────────────────────────────────────────────────────────

    #[error("Could not reach execution queue at {url}")]
    #[diagnostic(
        code(topoctl::queue_unreachable),
        help("Check queue.url in the config, or omit --queue-url to print lines instead.")
    )]
    QueueUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Execution queue at {url} answered {status}")]
    #[diagnostic(code(topoctl::queue_rejected))]
    QueueRejected { url: String, status: u16, body: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(topoctl::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render {format} output: {message}")]
    #[diagnostic(code(topoctl::render))]
    Render { format: String, message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(topoctl::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::QueueUnreachable { .. } | Self::QueueRejected { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::MalformedCommand { .. } | Self::NoTopology { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnreachablePath { from, to } => Self::Unreachable { from, to },

            CoreError::MalformedWaypointList { count } => Self::Validation {
                field: "waypoints".into(),
                reason: format!("a route needs at least 2 waypoints, got {count}"),
            },

            CoreError::DeviceNotFound { name } => Self::NotFound {
                resource_type: "device".into(),
                identifier: name,
                list_command: "topology devices".into(),
            },

            CoreError::PortNotFound { device, port } => Self::NotFound {
                resource_type: "port".into(),
                identifier: format!("{device}/{port}"),
                list_command: "topology devices".into(),
            },

            CoreError::PolicyNotFound { identifier } => Self::NotFound {
                resource_type: "policy".into(),
                identifier,
                list_command: "policy list".into(),
            },

            CoreError::InvalidTopology { message } => Self::InvalidTopology {
                path: "(snapshot)".into(),
                message,
            },

            CoreError::UnknownPolicyVariant { tag } => Self::MalformedCommand {
                reason: format!("unknown policy type {tag:?}"),
                line: tag,
            },

            CoreError::MalformedCommand { line, reason } => Self::MalformedCommand { line, reason },

            CoreError::NoActiveDraft | CoreError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}
