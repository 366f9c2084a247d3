// ── Topology domain types ──
//
// A `Topology` is an immutable snapshot of devices and the links between
// them. It is validated once on construction and never patched afterwards;
// a reload builds a brand new value.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Device family. Determines how configuration reaches the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceKind {
    /// Managed over NETCONF through a management address.
    Classic,
    /// OpenFlow switch discovered by the SDN controller.
    #[serde(rename = "SDN")]
    #[strum(serialize = "SDN")]
    Sdn,
}

/// A named interface on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub interface_name: String,
    #[serde(rename = "hw_addr")]
    pub hardware_address: String,
}

impl Port {
    pub fn new(interface_name: impl Into<String>, hardware_address: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            hardware_address: hardware_address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl Device {
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ports: Vec::new(),
        }
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Position of the named interface in this device's port list.
    pub fn port_index(&self, interface_name: &str) -> Option<usize> {
        self.ports
            .iter()
            .position(|p| p.interface_name == interface_name)
    }
}

/// Undirected link between two device ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub device1: String,
    pub port1: String,
    pub device2: String,
    pub port2: String,
}

impl Link {
    pub fn new(
        device1: impl Into<String>,
        port1: impl Into<String>,
        device2: impl Into<String>,
        port2: impl Into<String>,
    ) -> Self {
        Self {
            device1: device1.into(),
            port1: port1.into(),
            device2: device2.into(),
            port2: port2.into(),
        }
    }

    /// The port this link occupies on `device`, if it is one of the ends.
    pub fn port_on(&self, device: &str) -> Option<&str> {
        if self.device1 == device {
            Some(&self.port1)
        } else if self.device2 == device {
            Some(&self.port2)
        } else {
            None
        }
    }

    /// The device at the opposite end from `device`.
    pub fn other_end(&self, device: &str) -> Option<&str> {
        if self.device1 == device {
            Some(&self.device2)
        } else if self.device2 == device {
            Some(&self.device1)
        } else {
            None
        }
    }
}

/// Position of a link inside its topology's link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Wire shape of a topology snapshot, as delivered by the collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Validated, indexed topology snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TopologySnapshot", into = "TopologySnapshot")]
pub struct Topology {
    devices: Vec<Device>,
    links: Vec<Link>,
    index: HashMap<String, usize>,
    /// Per device (by position): `(neighbour position, link)` in link order.
    adjacency: Vec<Vec<(usize, LinkId)>>,
}

impl Topology {
    /// Build a topology, rejecting duplicate names and dangling link ends.
    pub fn new(devices: Vec<Device>, links: Vec<Link>) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(devices.len());
        for (pos, device) in devices.iter().enumerate() {
            if index.insert(device.name.clone(), pos).is_some() {
                return Err(CoreError::invalid_topology(format!(
                    "duplicate device name {:?}",
                    device.name
                )));
            }
            let mut seen = HashSet::new();
            for port in &device.ports {
                if !seen.insert(port.interface_name.as_str()) {
                    return Err(CoreError::invalid_topology(format!(
                        "duplicate interface {:?} on device {:?}",
                        port.interface_name, device.name
                    )));
                }
            }
        }

        let mut adjacency = vec![Vec::new(); devices.len()];
        for (pos, link) in links.iter().enumerate() {
            let a = endpoint(&devices, &index, &link.device1, &link.port1)?;
            let b = endpoint(&devices, &index, &link.device2, &link.port2)?;
            let id = LinkId(pos);
            if let Some(list) = adjacency.get_mut(a) {
                list.push((b, id));
            }
            if a != b {
                if let Some(list) = adjacency.get_mut(b) {
                    list.push((a, id));
                }
            }
        }

        Ok(Self {
            devices,
            links,
            index,
            adjacency,
        })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        self.index.get(name).and_then(|&pos| self.devices.get(pos))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    /// Names of devices directly linked to `name`, in link order.
    /// A device reachable over parallel links is listed once per link.
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let adjacent = self
            .index
            .get(name)
            .and_then(|&pos| self.adjacency.get(pos))
            .map_or(&[][..], Vec::as_slice);
        adjacent
            .iter()
            .filter_map(move |&(pos, _)| self.devices.get(pos).map(|d| d.name.as_str()))
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn name_at(&self, pos: usize) -> Option<&str> {
        self.devices.get(pos).map(|d| d.name.as_str())
    }

    pub(crate) fn adjacent(&self, pos: usize) -> &[(usize, LinkId)] {
        self.adjacency.get(pos).map_or(&[][..], Vec::as_slice)
    }
}

fn endpoint(
    devices: &[Device],
    index: &HashMap<String, usize>,
    device: &str,
    port: &str,
) -> Result<usize, CoreError> {
    let pos = *index.get(device).ok_or_else(|| {
        CoreError::invalid_topology(format!("link references unknown device {device:?}"))
    })?;
    let has_port = devices
        .get(pos)
        .is_some_and(|d| d.port_index(port).is_some());
    if !has_port {
        return Err(CoreError::invalid_topology(format!(
            "link references unknown port {port:?} on device {device:?}"
        )));
    }
    Ok(pos)
}

impl TryFrom<TopologySnapshot> for Topology {
    type Error = CoreError;

    fn try_from(snapshot: TopologySnapshot) -> Result<Self, Self::Error> {
        Self::new(snapshot.devices, snapshot.links)
    }
}

impl From<Topology> for TopologySnapshot {
    fn from(topology: Topology) -> Self {
        Self {
            devices: topology.devices,
            links: topology.links,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn router(name: &str, ports: &[&str]) -> Device {
        ports.iter().fold(Device::new(name, DeviceKind::Classic), |d, p| {
            d.with_port(Port::new(*p, "00:00:00:00:00:00"))
        })
    }

    #[test]
    fn parses_collector_json() {
        let json = r#"{
            "devices": [
                {"name": "R1", "type": "Classic", "ports": [{"interface_name": "eth0", "hw_addr": "aa:bb:cc:dd:ee:01"}]},
                {"name": "S1", "type": "SDN", "ports": [{"interface_name": "1", "hw_addr": "aa:bb:cc:dd:ee:02"}]}
            ],
            "links": [{"device1": "R1", "port1": "eth0", "device2": "S1", "port2": "1"}]
        }"#;
        let topology: Topology = serde_json::from_str(json).unwrap();
        assert_eq!(topology.devices().len(), 2);
        assert_eq!(topology.device("S1").unwrap().kind, DeviceKind::Sdn);
        assert_eq!(topology.neighbors("R1").collect::<Vec<_>>(), ["S1"]);
        assert_eq!(topology.neighbors("S1").collect::<Vec<_>>(), ["R1"]);
    }

    #[test]
    fn rejects_link_to_unknown_device() {
        let err = Topology::new(
            vec![router("A", &["e0"])],
            vec![Link::new("A", "e0", "B", "e0")],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTopology { .. }));
    }

    #[test]
    fn rejects_link_to_unknown_port() {
        let err = Topology::new(
            vec![router("A", &["e0"]), router("B", &["e0"])],
            vec![Link::new("A", "e0", "B", "e9")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("e9"));
    }

    #[test]
    fn rejects_duplicate_device_names() {
        let err = Topology::new(vec![router("A", &[]), router("A", &[])], vec![]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTopology { .. }));
    }

    #[test]
    fn rejects_duplicate_interfaces() {
        let err = Topology::new(vec![router("A", &["e0", "e0"])], vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate interface"));
    }

    #[test]
    fn unknown_json_topology_fails_to_deserialize() {
        let json = r#"{"devices": [], "links": [{"device1": "X", "port1": "1", "device2": "Y", "port2": "1"}]}"#;
        assert!(serde_json::from_str::<Topology>(json).is_err());
    }

    #[test]
    fn neighbors_of_unknown_device_is_empty() {
        let topology = Topology::new(vec![router("A", &[])], vec![]).unwrap();
        assert_eq!(topology.neighbors("Z").count(), 0);
    }

    #[test]
    fn link_ends() {
        let link = Link::new("A", "e0", "B", "e1");
        assert_eq!(link.port_on("B"), Some("e1"));
        assert_eq!(link.other_end("A"), Some("B"));
        assert_eq!(link.other_end("C"), None);
    }

    #[test]
    fn device_kind_parses_case_insensitively() {
        assert_eq!("sdn".parse::<DeviceKind>().unwrap(), DeviceKind::Sdn);
        assert_eq!("CLASSIC".parse::<DeviceKind>().unwrap(), DeviceKind::Classic);
        assert_eq!(DeviceKind::Sdn.to_string(), "SDN");
    }
}
