// ── Derived read-models ──

use indexmap::IndexSet;
use ipnet::Ipv4Net;
use serde::Serialize;

use crate::model::Policy;

/// Read-models computed from a policy set. Always rebuilt wholesale by
/// [`project`], never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    /// Network address of every Address policy, distinct, first seen first.
    pub subnets: IndexSet<Ipv4Net>,
    /// Distinct Flow names.
    pub flows: IndexSet<String>,
    /// Distinct zone names across Zone policies.
    pub zones: IndexSet<String>,
}

pub fn project<'a>(policies: impl IntoIterator<Item = &'a Policy>) -> DerivedState {
    let mut state = DerivedState::default();
    for policy in policies {
        match policy {
            Policy::Address { address, .. } => {
                state.subnets.insert(address.trunc());
            }
            Policy::Flow { name, .. } => {
                state.flows.insert(name.clone());
            }
            Policy::Zone { zone, .. } => {
                state.zones.insert(zone.clone());
            }
            Policy::Block { .. } | Policy::Route { .. } | Policy::Disable { .. } => {}
        }
    }
    state
}
