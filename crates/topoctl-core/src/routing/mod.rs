// ── Route discovery ──
//
// Shortest paths, per-pair alternates, and multi-waypoint composition over
// an immutable `Topology`. Everything here is a pure function of its inputs.

pub mod alternate;
pub mod compose;
pub mod expand;
pub mod shortest;

pub use alternate::{DEFAULT_MAX_ALTERNATES, alternate_routes, alternate_routes_limited};
pub use compose::{
    DEFAULT_MAX_ROUTES, MAX_PARTIAL_ROUTES, RouteLimits, RoutePlanner, calculate_routes,
};
pub use expand::route_policies;
pub use shortest::{ShortestPaths, shortest_paths};
