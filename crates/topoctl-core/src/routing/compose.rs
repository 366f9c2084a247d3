// ── Multi-segment route composition ──
//
// Waypoints W0..Wn give n segments. Each segment contributes its alternate
// routes; whole routes are the cross product, built as a left fold so that
// partial routes which already revisit a device are dropped before they
// multiply. Generation order is lexicographic over per-segment alternates,
// which favours the shorter alternates of earlier segments.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::alternate::{DEFAULT_MAX_ALTERNATES, alternate_routes_limited};
use crate::error::CoreError;
use crate::model::{RouteCandidate, Topology};

/// Default number of whole routes returned by the composer.
pub const DEFAULT_MAX_ROUTES: usize = 3;

/// Hard ceiling on partial routes carried between fold steps.
pub const MAX_PARTIAL_ROUTES: usize = 4096;

/// Caps applied by [`RoutePlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLimits {
    /// Alternates computed per segment.
    pub max_alternates: usize,
    /// Whole routes returned.
    pub max_routes: usize,
}

impl Default for RouteLimits {
    fn default() -> Self {
        Self {
            max_alternates: DEFAULT_MAX_ALTERNATES,
            max_routes: DEFAULT_MAX_ROUTES,
        }
    }
}

/// Route discovery with configurable limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutePlanner {
    limits: RouteLimits,
}

impl RoutePlanner {
    pub fn new(limits: RouteLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> RouteLimits {
        self.limits
    }

    pub fn alternates(
        &self,
        topology: &Topology,
        from: &str,
        to: &str,
    ) -> Result<Vec<RouteCandidate>, CoreError> {
        alternate_routes_limited(topology, from, to, self.limits.max_alternates)
    }

    /// Simple end-to-end routes through `waypoints`, in order.
    pub fn compose<S: AsRef<str>>(
        &self,
        topology: &Topology,
        waypoints: &[S],
    ) -> Result<Vec<RouteCandidate>, CoreError> {
        if waypoints.len() < 2 {
            return Err(CoreError::MalformedWaypointList {
                count: waypoints.len(),
            });
        }

        let segments = waypoints
            .windows(2)
            .map(|pair| match pair {
                [from, to] => self.alternates(topology, from.as_ref(), to.as_ref()),
                _ => Err(CoreError::Internal("segment window of wrong size".into())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut partials: Vec<RouteCandidate> = Vec::new();
        for (step, alternatives) in segments.iter().enumerate() {
            partials = if step == 0 {
                alternatives
                    .iter()
                    .filter(|route| route.is_simple())
                    .take(MAX_PARTIAL_ROUTES)
                    .cloned()
                    .collect()
            } else {
                extend_partials(&partials, alternatives)
            };
            if partials.is_empty() {
                break;
            }
        }

        partials.truncate(self.limits.max_routes);
        debug!(
            waypoints = waypoints.len(),
            segments = segments.len(),
            routes = partials.len(),
            "composed routes"
        );
        Ok(partials)
    }

    /// [`compose`](Self::compose), rendered as `"A-B-C"` strings.
    pub fn calculate<S: AsRef<str>>(
        &self,
        topology: &Topology,
        waypoints: &[S],
    ) -> Result<Vec<String>, CoreError> {
        Ok(self
            .compose(topology, waypoints)?
            .iter()
            .map(ToString::to_string)
            .collect())
    }
}

fn extend_partials(
    partials: &[RouteCandidate],
    alternatives: &[RouteCandidate],
) -> Vec<RouteCandidate> {
    let mut next = Vec::new();
    for partial in partials {
        for alternative in alternatives {
            let joined = partial.join(alternative);
            if !joined.is_simple() {
                continue;
            }
            next.push(joined);
            if next.len() >= MAX_PARTIAL_ROUTES {
                return next;
            }
        }
    }
    next
}

/// Up to three simple routes through `waypoints`, as `"A-B-C"` strings.
pub fn calculate_routes<S: AsRef<str>>(
    topology: &Topology,
    waypoints: &[S],
) -> Result<Vec<String>, CoreError> {
    RoutePlanner::default().calculate(topology, waypoints)
}
