// ── Domain model ──
//
// Topology snapshots, policies, route candidates, and the edit buffers
// that sit in front of policies and devices.

pub mod draft;
pub mod policy;
pub mod route;
pub mod topology;

// ── Re-exports ──────────────────────────────────────────────────────

pub use draft::{DeviceDraft, DraftMode, INTERFACE_UNSET, PolicyDraft};
pub use policy::{AddressMatch, Policy, PolicyId, PolicyKind, PortMatch, WILDCARD};
pub use route::{ROUTE_SEPARATOR, RouteCandidate};
pub use topology::{Device, DeviceKind, Link, LinkId, Port, Topology, TopologySnapshot};
