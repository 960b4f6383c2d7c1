use std::sync::Mutex;

use tokio::sync::watch;

use crate::conf::{ClusterInfo, ConfError, Host, RingConf};
use crate::types::HostId;

/// Coordinator is where a host learns the ring it is on and where the other hosts are.
pub trait Coordinator: Send + Sync {
    fn current_ring(&self) -> RingConf;

    /// watch_ring returns a receiver that is notified on every new ring.
    fn watch_ring(&self) -> watch::Receiver<RingConf>;

    fn host_address(&self, hid: HostId) -> Option<Host>;
}

/// StaticCoordinator serves the rings of a `ClusterInfo`. A new ring is published with
/// `set_ring`.
pub struct StaticCoordinator {
    cluster: Mutex<ClusterInfo>,
    tx: watch::Sender<RingConf>,
    rx: watch::Receiver<RingConf>,
}

impl StaticCoordinator {
    pub fn new(cluster: ClusterInfo) -> Self {
        let (tx, rx) = watch::channel(cluster.ring.clone());

        StaticCoordinator {
            cluster: Mutex::new(cluster),
            tx,
            rx,
        }
    }

    /// set_ring publishes a new ring. Its ring id must be greater than the current one.
    pub fn set_ring(&self, ring: RingConf) -> Result<(), ConfError> {
        let mut cluster = self.cluster.lock().unwrap();
        cluster.check_ring(&ring)?;

        if ring.ring_id <= cluster.ring.ring_id {
            return Err(ConfError::InvalidRingId(ring.ring_id));
        }

        info!("publish ring"; "ring_id" => ring.ring_id, "hosts" => ?ring.hosts, "master" => ring.master);

        cluster.ring = ring.clone();
        // the coordinator holds a receiver, the channel is never closed
        let _ = self.tx.send(ring);
        Ok(())
    }
}

impl Coordinator for StaticCoordinator {
    fn current_ring(&self) -> RingConf {
        self.cluster.lock().unwrap().ring.clone()
    }

    fn watch_ring(&self) -> watch::Receiver<RingConf> {
        self.rx.clone()
    }

    fn host_address(&self, hid: HostId) -> Option<Host> {
        self.cluster.lock().unwrap().get_host(hid).cloned()
    }
}
