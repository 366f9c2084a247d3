//! Policy command handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use topoctl_core::{EditSession, Policy, PolicyKind, PolicyStore, serialize};

use crate::cli::{PolicyArgs, PolicyCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::committed_policy;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct Entry<'a> {
    id: String,
    #[serde(flatten)]
    policy: &'a Policy,
}

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Policy")]
    line: String,
}

impl From<&Entry<'_>> for PolicyRow {
    fn from(e: &Entry<'_>) -> Self {
        Self {
            kind: e.policy.kind().to_string(),
            device: e.policy.device().unwrap_or("-").to_owned(),
            line: serialize(e.policy),
        }
    }
}

fn summary(store: &PolicyStore, color: bool) -> String {
    let derived = store.derived();
    let join = |items: Vec<String>| {
        if items.is_empty() {
            "-".to_owned()
        } else {
            items.join(", ")
        }
    };
    [
        format!(
            "{}   {}",
            output::label("Flows:", color),
            join(derived.flows.iter().cloned().collect())
        ),
        format!(
            "{}   {}",
            output::label("Zones:", color),
            join(derived.zones.iter().cloned().collect())
        ),
        format!(
            "{} {}",
            output::label("Subnets:", color),
            join(derived.subnets.iter().map(ToString::to_string).collect())
        ),
    ]
    .join("\n")
}

fn parse_tokens(tokens: &[String]) -> Result<Policy, CliError> {
    Ok(tokens.join(" ").parse::<Policy>()?)
}

fn locate(store: &PolicyStore, policy: &Policy) -> Result<topoctl_core::PolicyId, CliError> {
    store.find(policy).ok_or_else(|| CliError::NotFound {
        resource_type: "policy".into(),
        identifier: serialize(policy),
        list_command: "policy list".into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: PolicyArgs, ctx: &Context) -> Result<(), CliError> {
    let mut store = ctx.policies()?;
    let mut session = EditSession::new();

    let (mutations, save) = match args.command {
        PolicyCommand::List => {
            let entries: Vec<Entry<'_>> = store
                .iter()
                .map(|(id, policy)| Entry {
                    id: id.to_string(),
                    policy,
                })
                .collect();
            let mut out = output::render_list(
                ctx.global.output,
                &entries,
                |e| PolicyRow::from(e),
                |e| serialize(e.policy),
            )?;
            if matches!(ctx.global.output, crate::cli::OutputFormat::Table) {
                let color = output::should_color(ctx.global.color);
                out = format!("{out}\n\n{}", summary(&store, color));
            }
            output::print_output(&out, ctx.global.quiet);
            return Ok(());
        }

        PolicyCommand::New { policy, save } => {
            let policy = parse_tokens(&policy)?;
            session
                .begin_policy_create(Some(policy.kind()))
                .fill_from(&policy);
            (vec![committed_policy(session.save_policy(&mut store)?)?], save)
        }

        PolicyCommand::Zone { zone, devices, save } => {
            let mut mutations = Vec::with_capacity(devices.len());
            for (i, device) in devices.iter().enumerate() {
                if devices.get(..i).is_some_and(|seen| seen.contains(device)) {
                    continue;
                }
                let draft = session.begin_policy_create(Some(PolicyKind::Zone));
                draft.device.clone_from(device);
                draft.zone.clone_from(&zone);
                mutations.push(committed_policy(session.save_policy(&mut store)?)?);
            }
            info!(zone, devices = mutations.len(), "zone assigned");
            (mutations, save)
        }

        PolicyCommand::Edit { policy, old, save } => {
            let new = parse_tokens(&policy)?;
            let old = parse_tokens(&old)?;
            let id = locate(&store, &old)?;
            session.begin_policy_edit(id, &store)?.fill_from(&new);
            (vec![committed_policy(session.save_policy(&mut store)?)?], save)
        }

        PolicyCommand::Delete { policy, save } => {
            let policy = parse_tokens(&policy)?;
            let id = locate(&store, &policy)?;
            (vec![store.remove(id)?], save)
        }
    };

    if save {
        ctx.policy_file()?;
    }
    let lines: Vec<String> = mutations.iter().map(ToString::to_string).collect();
    ctx.sink()?.emit(&lines).await?;
    if save {
        ctx.save_policies(&store)?;
    }
    Ok(())
}
