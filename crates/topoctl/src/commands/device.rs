//! Device command handlers.
//!
//! Device changes are emitted as command lines; the topology snapshot is
//! left alone and picks them up on the next reload.

use tracing::info;

use topoctl_core::{Device, DeviceMutation, EditSession, Topology};

use crate::cli::{DeviceArgs, DeviceCommand};
use crate::config::Context;
use crate::error::CliError;

use super::committed_device;

fn lookup<'t>(topology: &'t Topology, name: &str) -> Result<&'t Device, CliError> {
    topology.device(name).ok_or_else(|| CliError::NotFound {
        resource_type: "device".into(),
        identifier: name.to_owned(),
        list_command: "topology devices".into(),
    })
}

pub async fn handle(args: DeviceArgs, ctx: &Context) -> Result<(), CliError> {
    let topology = ctx.topology()?;
    let mut session = EditSession::new();

    let (mutation, save) = match args.command {
        DeviceCommand::New { kind, name, ip } => {
            let draft = session.begin_device_create(kind.into());
            draft.name = name;
            draft.ip_address = ip.unwrap_or_default();
            (committed_device(session.save_device(&topology)?)?, false)
        }

        DeviceCommand::Edit { device, name, save } => {
            let current = lookup(&topology, &device)?;
            session.begin_device_edit(current).name = name;
            (committed_device(session.save_device(&topology)?)?, save)
        }

        DeviceCommand::Delete { device } => {
            let current = lookup(&topology, &device)?;
            let mutation = DeviceMutation::Delete {
                kind: current.kind,
                name: current.name.clone(),
            };
            (mutation, false)
        }
    };

    let pending = match (save, &mutation) {
        (true, DeviceMutation::Rename { .. }) => {
            ctx.policy_file()?;
            Some(ctx.policies()?)
        }
        _ => None,
    };

    ctx.sink()?.emit(&[mutation.to_string()]).await?;

    // Policies follow the rename only once the queue has accepted it.
    if let (Some(mut store), DeviceMutation::Rename { from, to, .. }) = (pending, &mutation) {
        let rewritten = store.rename_device(from, to);
        ctx.save_policies(&store)?;
        info!(from, to, rewritten, "renamed device in policies");
    }
    Ok(())
}
