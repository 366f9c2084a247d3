// ── Single-source shortest paths ──
//
// Dijkstra over unit-weight links. With every weight equal to 1 this visits
// devices in BFS order, but the explicit min-selection makes the tie-break
// rule visible: among unvisited devices at the same distance, the one that
// comes first in the topology's device list is expanded first.

use tracing::trace;

use crate::error::CoreError;
use crate::model::{LinkId, RouteCandidate, Topology};

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    distance: Option<u32>,
    /// `(previous device position, link used to get here)`.
    predecessor: Option<(usize, LinkId)>,
}

/// Distances and predecessors from one source device to every device.
#[derive(Debug, Clone)]
pub struct ShortestPaths<'t> {
    topology: &'t Topology,
    source: usize,
    entries: Vec<Entry>,
}

/// Compute hop distances from `source` to every device in `topology`.
pub fn shortest_paths<'t>(
    topology: &'t Topology,
    source: &str,
) -> Result<ShortestPaths<'t>, CoreError> {
    let source = topology
        .position(source)
        .ok_or_else(|| CoreError::DeviceNotFound {
            name: source.to_owned(),
        })?;
    Ok(search(topology, source, None))
}

/// Run the search as if link `pruned` were absent from the topology.
pub(crate) fn search(
    topology: &Topology,
    source: usize,
    pruned: Option<LinkId>,
) -> ShortestPaths<'_> {
    let count = topology.devices().len();
    let mut entries = vec![Entry::default(); count];
    let mut visited = vec![false; count];
    if let Some(entry) = entries.get_mut(source) {
        entry.distance = Some(0);
    }

    while let Some((current, distance)) = closest_unvisited(&entries, &visited) {
        visited[current] = true;
        let candidate = distance + 1;
        for &(next, link) in topology.adjacent(current) {
            if Some(link) == pruned {
                continue;
            }
            let entry = &mut entries[next];
            if entry.distance.is_none_or(|known| candidate < known) {
                entry.distance = Some(candidate);
                entry.predecessor = Some((current, link));
            }
        }
    }

    trace!(
        source = topology.name_at(source).unwrap_or_default(),
        reached = visited.iter().filter(|v| **v).count(),
        total = count,
        "shortest path search finished"
    );

    ShortestPaths {
        topology,
        source,
        entries,
    }
}

/// Unvisited device with the smallest finite distance; first position wins ties.
fn closest_unvisited(entries: &[Entry], visited: &[bool]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (pos, entry) in entries.iter().enumerate() {
        if visited.get(pos).copied().unwrap_or(true) {
            continue;
        }
        if let Some(distance) = entry.distance {
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((pos, distance));
            }
        }
    }
    best
}

impl<'t> ShortestPaths<'t> {
    pub fn source(&self) -> &'t str {
        self.topology.name_at(self.source).unwrap_or_default()
    }

    /// Hop count to `device`; `None` when unreachable or unknown.
    pub fn distance(&self, device: &str) -> Option<u32> {
        let pos = self.topology.position(device)?;
        self.entries.get(pos)?.distance
    }

    /// Previous hop on the shortest path to `device`.
    pub fn predecessor(&self, device: &str) -> Option<&'t str> {
        let pos = self.topology.position(device)?;
        let (prev, _) = self.entries.get(pos)?.predecessor?;
        self.topology.name_at(prev)
    }

    /// `(device, distance, predecessor)` for every device, in topology order.
    pub fn iter(&self) -> impl Iterator<Item = (&'t str, Option<u32>, Option<&'t str>)> + '_ {
        let topology = self.topology;
        topology
            .devices()
            .iter()
            .zip(&self.entries)
            .map(move |(device, entry)| {
                let predecessor = entry
                    .predecessor
                    .and_then(|(prev, _)| topology.name_at(prev));
                (device.name.as_str(), entry.distance, predecessor)
            })
    }

    /// Reconstruct the path from the source to `device`.
    pub fn path_to(&self, device: &str) -> Result<RouteCandidate, CoreError> {
        let target = self
            .topology
            .position(device)
            .ok_or_else(|| CoreError::DeviceNotFound {
                name: device.to_owned(),
            })?;
        self.route_to(target).ok_or_else(|| CoreError::UnreachablePath {
            from: self.source().to_owned(),
            to: device.to_owned(),
        })
    }

    pub(crate) fn route_to(&self, target: usize) -> Option<RouteCandidate> {
        let (positions, link_ids) = self.trace(target)?;
        let devices = positions
            .iter()
            .map(|&pos| self.topology.name_at(pos).map(str::to_owned))
            .collect::<Option<Vec<_>>>()?;
        let links = link_ids
            .iter()
            .map(|&id| self.topology.link(id).cloned())
            .collect::<Option<Vec<_>>>()?;
        let distance = self.entries.get(target)?.distance?;
        Some(RouteCandidate {
            devices,
            links,
            distance,
        })
    }

    /// Link ids along the path to `target`, source side first.
    pub(crate) fn link_ids_to(&self, target: usize) -> Option<Vec<LinkId>> {
        self.trace(target).map(|(_, links)| links)
    }

    fn trace(&self, target: usize) -> Option<(Vec<usize>, Vec<LinkId>)> {
        self.entries.get(target)?.distance?;
        let mut positions = vec![target];
        let mut links = Vec::new();
        let mut current = target;
        while current != self.source {
            let (prev, link) = self.entries.get(current)?.predecessor?;
            positions.push(prev);
            links.push(link);
            current = prev;
        }
        positions.reverse();
        links.reverse();
        Some((positions, links))
    }
}
