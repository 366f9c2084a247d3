//! Route discovery handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use topoctl_core::{EditSession, RouteCandidate, route_policies};

use crate::cli::{RoutesArgs, RoutesCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::committed_policy;

#[derive(Serialize)]
struct RankedRoute {
    rank: usize,
    route: String,
    hops: u32,
}

impl RankedRoute {
    fn ranked(routes: &[RouteCandidate]) -> Vec<Self> {
        routes
            .iter()
            .enumerate()
            .map(|(i, r)| Self {
                rank: i + 1,
                route: r.to_string(),
                hops: r.distance,
            })
            .collect()
    }
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Hops")]
    hops: u32,
}

impl From<&RankedRoute> for RouteRow {
    fn from(r: &RankedRoute) -> Self {
        Self {
            rank: r.rank,
            route: r.route.clone(),
            hops: r.hops,
        }
    }
}

fn print_routes(ctx: &Context, routes: &[RouteCandidate]) -> Result<(), CliError> {
    let ranked = RankedRoute::ranked(routes);
    let out = output::render_list(
        ctx.global.output,
        &ranked,
        |r| RouteRow::from(r),
        |r| r.route.clone(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

pub async fn handle(args: RoutesArgs, ctx: &Context) -> Result<(), CliError> {
    let topology = ctx.topology()?;
    let planner = ctx.planner()?;

    match args.command {
        RoutesCommand::Alternates { from, to } => {
            let routes = planner.alternates(&topology, &from, &to)?;
            print_routes(ctx, &routes)
        }

        RoutesCommand::Calculate { waypoints } => {
            let routes = planner.compose(&topology, &waypoints)?;
            print_routes(ctx, &routes)
        }

        RoutesCommand::Apply {
            flow,
            pick,
            save,
            waypoints,
        } => {
            let routes = planner.compose(&topology, &waypoints)?;
            let route = pick
                .checked_sub(1)
                .and_then(|i| routes.get(i))
                .ok_or_else(|| CliError::Validation {
                    field: "--pick".into(),
                    reason: format!("choose a route between 1 and {}", routes.len()),
                })?;

            let mut store = ctx.policies()?;
            let mut session = EditSession::new();
            let mut lines = Vec::new();
            for policy in route_policies(&topology, route, &flow)? {
                session
                    .begin_policy_create(Some(policy.kind()))
                    .fill_from(&policy);
                let mutation = committed_policy(session.save_policy(&mut store)?)?;
                lines.push(mutation.to_string());
            }
            info!(route = %route, flow, policies = lines.len(), "route applied");

            if save {
                ctx.policy_file()?;
            }
            ctx.sink()?.emit(&lines).await?;
            if save {
                ctx.save_policies(&store)?;
            }
            Ok(())
        }
    }
}
