// ── Core error types ──
//
// Errors raised by topoctl-core. Operator input problems are NOT errors:
// validation returns a `ValidationReport` value so the caller can re-render
// and let the operator fix the draft. Everything here is either a routing
// condition the caller must surface, a malformed wire line, or a broken
// calling contract.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Routing errors ───────────────────────────────────────────────
    #[error("No path from {from} to {to}")]
    UnreachablePath { from: String, to: String },

    #[error("Route needs at least 2 waypoints, got {count}")]
    MalformedWaypointList { count: usize },

    #[error("Device not found: {name}")]
    DeviceNotFound { name: String },

    #[error("Port {port} not found on device {device}")]
    PortNotFound { device: String, port: String },

    // ── Topology errors ──────────────────────────────────────────────
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    // ── Policy / command errors ──────────────────────────────────────
    #[error("Unknown policy variant: {tag:?}")]
    UnknownPolicyVariant { tag: String },

    #[error("Malformed command {line:?}: {reason}")]
    MalformedCommand { line: String, reason: String },

    #[error("Policy not found: {identifier}")]
    PolicyNotFound { identifier: String },

    #[error("No draft is open")]
    NoActiveDraft,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn malformed(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCommand {
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }
}
