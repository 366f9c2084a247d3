//! Topology inspection handlers.

use tabled::Tabled;
use topoctl_core::{Device, Link};

use crate::cli::{TopologyArgs, TopologyCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Ports")]
    ports: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            kind: d.kind.to_string(),
            ports: d
                .ports
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{i}:{}", p.interface_name))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Device")]
    device1: String,
    #[tabled(rename = "Port")]
    port1: String,
    #[tabled(rename = "Peer")]
    device2: String,
    #[tabled(rename = "Peer Port")]
    port2: String,
}

impl From<&Link> for LinkRow {
    fn from(l: &Link) -> Self {
        Self {
            device1: l.device1.clone(),
            port1: l.port1.clone(),
            device2: l.device2.clone(),
            port2: l.port2.clone(),
        }
    }
}

pub fn handle(args: TopologyArgs, ctx: &Context) -> Result<(), CliError> {
    let topology = ctx.topology()?;
    let out = match args.command {
        TopologyCommand::Devices => output::render_list(
            ctx.global.output,
            topology.devices(),
            |d| DeviceRow::from(d),
            |d| d.name.clone(),
        )?,
        TopologyCommand::Links => output::render_list(
            ctx.global.output,
            topology.links(),
            |l| LinkRow::from(l),
            |l| format!("{}-{}", l.device1, l.device2),
        )?,
    };
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
