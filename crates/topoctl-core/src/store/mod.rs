// ── Mutable state around the pure core ──

pub mod policy_store;
pub mod topology;

pub use policy_store::{PolicyStore, SkippedLine};
pub use topology::TopologyHandle;
