//! Route discovery and policy modelling for SDN/classic network control.
//!
//! Everything in this crate is synchronous and free of I/O. Callers hand in
//! immutable snapshots and get new values back:
//!
//! - **Routing** ([`routing`]): unit-weight shortest paths, up to three
//!   loop-free alternates per device pair, and composition of alternates
//!   across an ordered waypoint list into whole simple routes.
//!
//! - **Model** ([`model`]): the [`Topology`] graph snapshot, the closed
//!   [`Policy`] union, and the form drafts used while an operator edits.
//!
//! - **Validation** ([`policy`]): per-field [`ValidationReport`]s for policy
//!   and device drafts, plus the flows/zones/subnets read-models derived from
//!   a policy set.
//!
//! - **Command protocol** ([`command`]): the line format consumed by the
//!   execution queue, in both directions.
//!
//! - **State** ([`store`], [`session`]): an id-keyed [`PolicyStore`], an
//!   atomically swapped [`TopologyHandle`], and the [`EditSession`] that owns
//!   open drafts.

pub mod command;
pub mod error;
pub mod model;
pub mod policy;
pub mod routing;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{DeviceMutation, PolicyMutation, serialize};
pub use error::CoreError;
pub use policy::{
    DerivedState, DeviceField, PolicyField, ValidationReport, project, validate_device,
    validate_policy,
};
pub use routing::{
    RouteLimits, RoutePlanner, ShortestPaths, alternate_routes, calculate_routes, route_policies,
    shortest_paths,
};
pub use session::{EditSession, SaveOutcome};
pub use store::{PolicyStore, TopologyHandle};

pub use model::{
    AddressMatch, Device, DeviceDraft, DeviceKind, DraftMode, Link, Policy, PolicyDraft, PolicyId,
    PolicyKind, Port, PortMatch, RouteCandidate, Topology, TopologySnapshot,
};
