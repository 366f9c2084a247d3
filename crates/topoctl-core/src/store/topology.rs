// ── Topology snapshot holder ──
//
// Readers pin an `Arc<Topology>` once per computation and never observe a
// reload halfway through.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::model::Topology;

#[derive(Debug)]
pub struct TopologyHandle {
    current: ArcSwap<Topology>,
}

impl TopologyHandle {
    pub fn new(topology: Topology) -> Self {
        Self {
            current: ArcSwap::from_pointee(topology),
        }
    }

    /// Pin the current snapshot.
    pub fn snapshot(&self) -> Arc<Topology> {
        self.current.load_full()
    }

    /// Atomically install `topology`, returning the snapshot it replaced.
    pub fn replace(&self, topology: Topology) -> Arc<Topology> {
        debug!(
            devices = topology.devices().len(),
            links = topology.links().len(),
            "replacing topology snapshot"
        );
        self.current.swap(Arc::new(topology))
    }
}

impl Default for TopologyHandle {
    fn default() -> Self {
        Self::new(Topology::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Device, DeviceKind};
    use crate::routing::alternate_routes;

    fn single(name: &str) -> Topology {
        Topology::new(vec![Device::new(name, DeviceKind::Classic)], vec![]).unwrap()
    }

    #[test]
    fn pinned_snapshot_survives_replace() {
        let handle = TopologyHandle::new(single("R1"));
        let pinned = handle.snapshot();

        let previous = handle.replace(single("R2"));
        assert!(previous.contains("R1"));
        assert!(pinned.contains("R1"));
        assert!(alternate_routes(&pinned, "R1", "R1").is_ok());

        let fresh = handle.snapshot();
        assert!(fresh.contains("R2"));
        assert!(!fresh.contains("R1"));
    }

    #[test]
    fn snapshots_are_shared_across_threads() {
        let handle = Arc::new(TopologyHandle::new(single("R1")));
        let reader = {
            let handle = Arc::clone(&handle);
            std::thread::spawn(move || handle.snapshot().devices().len())
        };
        handle.replace(single("R2"));
        assert_eq!(reader.join().unwrap(), 1);
    }
}
