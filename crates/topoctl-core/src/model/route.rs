// ── Route candidate ──

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::topology::Link;

/// Separator between device names in a rendered route.
pub const ROUTE_SEPARATOR: char = '-';

/// One path through the topology, source to destination inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub devices: Vec<String>,
    /// Links traversed, `links[i]` joins `devices[i]` and `devices[i + 1]`.
    pub links: Vec<Link>,
    pub distance: u32,
}

impl RouteCandidate {
    /// The zero-length route that starts and ends at `device`.
    pub fn trivial(device: impl Into<String>) -> Self {
        Self {
            devices: vec![device.into()],
            links: Vec::new(),
            distance: 0,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.devices.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.devices.last().map(String::as_str)
    }

    /// True when no device appears twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.devices.len());
        self.devices.iter().all(|d| seen.insert(d.as_str()))
    }

    /// Same ordered device sequence, regardless of which parallel links were used.
    pub fn same_path(&self, other: &Self) -> bool {
        self.devices == other.devices
    }

    /// Append `next`, which must start where `self` ends. The shared
    /// junction device is kept once.
    pub(crate) fn join(&self, next: &Self) -> Self {
        let mut devices = self.devices.clone();
        devices.extend(next.devices.iter().skip(1).cloned());
        let mut links = self.links.clone();
        links.extend(next.links.iter().cloned());
        Self {
            devices,
            links,
            distance: self.distance + next.distance,
        }
    }
}

impl fmt::Display for RouteCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, device) in self.devices.iter().enumerate() {
            if i > 0 {
                write!(f, "{ROUTE_SEPARATOR}")?;
            }
            f.write_str(device)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(devices: &[&str]) -> RouteCandidate {
        let links = devices
            .windows(2)
            .map(|w| Link::new(w[0], "p", w[1], "p"))
            .collect::<Vec<_>>();
        RouteCandidate {
            devices: devices.iter().map(|d| (*d).to_owned()).collect(),
            distance: u32::try_from(links.len()).unwrap_or(u32::MAX),
            links,
        }
    }

    #[test]
    fn renders_dash_separated() {
        assert_eq!(route(&["A", "B", "C"]).to_string(), "A-B-C");
        assert_eq!(RouteCandidate::trivial("A").to_string(), "A");
    }

    #[test]
    fn join_keeps_junction_once() {
        let joined = route(&["A", "B"]).join(&route(&["B", "C", "D"]));
        assert_eq!(joined.devices, ["A", "B", "C", "D"]);
        assert_eq!(joined.links.len(), 3);
        assert_eq!(joined.distance, 3);
    }

    #[test]
    fn detects_revisits() {
        assert!(route(&["A", "B", "C"]).is_simple());
        assert!(!route(&["A", "B", "A"]).is_simple());
    }
}
