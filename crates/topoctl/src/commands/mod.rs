//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod device;
pub mod policy;
pub mod routes;
pub mod topology;

use topoctl_core::session::{DeviceSave, PolicySave};
use topoctl_core::{DeviceMutation, PolicyMutation, SaveOutcome};

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Topology(args) => topology::handle(args, ctx),
        Command::Routes(args) => routes::handle(args, ctx).await,
        Command::Policy(args) => policy::handle(args, ctx).await,
        Command::Device(args) => device::handle(args, ctx).await,
        Command::Config(args) => config_cmd::handle(args, ctx),
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before dispatch".into(),
        )),
    }
}

// ── Save outcome helpers ────────────────────────────────────────────

fn committed_policy(outcome: PolicySave) -> Result<PolicyMutation, CliError> {
    match outcome {
        SaveOutcome::Committed(mutation) => Ok(mutation),
        SaveOutcome::Rejected(report) => Err(CliError::Rejected {
            subject: "policy".into(),
            report: report.to_string(),
        }),
    }
}

fn committed_device(outcome: DeviceSave) -> Result<DeviceMutation, CliError> {
    match outcome {
        SaveOutcome::Committed(mutation) => Ok(mutation),
        SaveOutcome::Rejected(report) => Err(CliError::Rejected {
            subject: "device".into(),
            report: report.to_string(),
        }),
    }
}
