// ── Route → Route policies ──

use crate::error::CoreError;
use crate::model::{Policy, RouteCandidate, Topology};

/// One `Route` policy per hop of `route`, steering `flow` out of the port
/// each device uses for the next link. The destination gets no policy.
pub fn route_policies(
    topology: &Topology,
    route: &RouteCandidate,
    flow: &str,
) -> Result<Vec<Policy>, CoreError> {
    route
        .devices
        .iter()
        .zip(&route.links)
        .map(|(name, link)| {
            let device = topology
                .device(name)
                .ok_or_else(|| CoreError::DeviceNotFound { name: name.clone() })?;
            let port = link.port_on(name).ok_or_else(|| CoreError::PortNotFound {
                device: name.clone(),
                port: format!("{}/{}", link.port1, link.port2),
            })?;
            let index = device
                .port_index(port)
                .ok_or_else(|| CoreError::PortNotFound {
                    device: name.clone(),
                    port: port.to_owned(),
                })?;
            let interface = u32::try_from(index)
                .map_err(|_| CoreError::Internal(format!("port index {index} out of range")))?;
            Ok(Policy::Route {
                device: name.clone(),
                flow: flow.to_owned(),
                interface,
            })
        })
        .collect()
}
