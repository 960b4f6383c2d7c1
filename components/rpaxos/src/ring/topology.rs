use std::sync::{Arc, RwLock};

use crate::conf::RingConf;
use crate::types::*;

/// RingSnapshot is the ring as seen by one host at some moment.
///
/// A protocol step takes one snapshot and routes with it from start to end, even if the ring
/// changes meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSnapshot {
    pub ring_id: RingId,
    pub host_id: HostId,

    /// Whether `host_id` is on the ring.
    pub is_member: bool,
    pub is_master: bool,
    pub master: HostId,

    /// The host this one forwards ring commands to. It is `host_id` on a single-host ring.
    pub next: HostId,
    pub prev: HostId,

    pub hosts: Vec<HostId>,
}

impl RingSnapshot {
    pub fn new(host_id: HostId, conf: &RingConf) -> Self {
        let n = conf.hosts.len();
        let pos = conf.hosts.iter().position(|h| *h == host_id);

        let (next, prev) = match pos {
            Some(i) => (conf.hosts[(i + 1) % n], conf.hosts[(i + n - 1) % n]),
            None => (host_id, host_id),
        };

        RingSnapshot {
            ring_id: conf.ring_id,
            host_id,
            is_member: pos.is_some(),
            is_master: pos.is_some() && conf.master == host_id,
            master: conf.master,
            next,
            prev,
            hosts: conf.hosts.clone(),
        }
    }

    /// next_is_self returns true on a single-host ring.
    pub fn next_is_self(&self) -> bool {
        self.next == self.host_id
    }

    /// others returns every host on the ring but this one.
    pub fn others(&self) -> impl Iterator<Item = HostId> + '_ {
        let me = self.host_id;
        self.hosts.iter().cloned().filter(move |h| *h != me)
    }
}

/// RingChange describes how an update changed the ring for this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingChange {
    pub ring_changed: bool,
    pub became_master: bool,
    pub lost_master: bool,
}

/// RingTopology holds the current ring snapshot of a host.
pub struct RingTopology {
    host_id: HostId,
    current: RwLock<Arc<RingSnapshot>>,
}

impl RingTopology {
    pub fn new(host_id: HostId, conf: &RingConf) -> Self {
        RingTopology {
            host_id,
            current: RwLock::new(Arc::new(RingSnapshot::new(host_id, conf))),
        }
    }

    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    pub fn snapshot(&self) -> Arc<RingSnapshot> {
        self.current.read().unwrap().clone()
    }

    /// update installs a new ring. A ring with an id not greater than the current one is
    /// ignored.
    pub fn update(&self, conf: &RingConf) -> RingChange {
        let mut cur = self.current.write().unwrap();

        if conf.ring_id <= cur.ring_id {
            return RingChange::default();
        }

        let snap = RingSnapshot::new(self.host_id, conf);
        let change = RingChange {
            ring_changed: true,
            became_master: !cur.is_master && snap.is_master,
            lost_master: cur.is_master && !snap.is_master,
        };

        *cur = Arc::new(snap);
        change
    }
}
