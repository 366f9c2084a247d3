// ── Alternate routes between two devices ──
//
// Best path first, then one re-run per link of that path with the link
// pruned. Each pruned run yields at most one new candidate, so the cost is
// O(E) extra searches rather than a full k-shortest-path enumeration.

use tracing::debug;

use super::shortest::search;
use crate::error::CoreError;
use crate::model::{RouteCandidate, Topology};

/// Default number of candidates returned per device pair.
pub const DEFAULT_MAX_ALTERNATES: usize = 3;

/// Up to three distinct paths from `from` to `to`, shortest first.
pub fn alternate_routes(
    topology: &Topology,
    from: &str,
    to: &str,
) -> Result<Vec<RouteCandidate>, CoreError> {
    alternate_routes_limited(topology, from, to, DEFAULT_MAX_ALTERNATES)
}

/// Like [`alternate_routes`] with an explicit cap on the number of candidates.
pub fn alternate_routes_limited(
    topology: &Topology,
    from: &str,
    to: &str,
    limit: usize,
) -> Result<Vec<RouteCandidate>, CoreError> {
    let source = device_position(topology, from)?;
    let target = device_position(topology, to)?;

    let best_search = search(topology, source, None);
    let best = best_search
        .route_to(target)
        .ok_or_else(|| CoreError::UnreachablePath {
            from: from.to_owned(),
            to: to.to_owned(),
        })?;
    let best_links = best_search.link_ids_to(target).unwrap_or_default();

    let mut candidates = Vec::with_capacity(limit);
    if limit == 0 {
        return Ok(candidates);
    }
    candidates.push(best);

    for link in best_links {
        if candidates.len() >= limit {
            break;
        }
        let Some(route) = search(topology, source, Some(link)).route_to(target) else {
            continue;
        };
        if candidates.iter().any(|known| known.same_path(&route)) {
            continue;
        }
        candidates.push(route);
    }

    candidates.sort_by_key(|route| route.distance);
    debug!(
        from,
        to,
        found = candidates.len(),
        "computed alternate routes"
    );
    Ok(candidates)
}

fn device_position(topology: &Topology, name: &str) -> Result<usize, CoreError> {
    topology
        .position(name)
        .ok_or_else(|| CoreError::DeviceNotFound {
            name: name.to_owned(),
        })
}
