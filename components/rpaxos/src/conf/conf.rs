use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfError;
use crate::types::*;

/// Host is where a host listens: `ring_addr` for ring commands from its previous host and
/// `udp_addr` for datagrams.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub struct Host {
    pub ring_addr: SocketAddr,
    pub udp_addr: SocketAddr,
}

/// RingConf is one version of the ring: the hosts in ring order and the master.
/// Every reconfiguration gets a new `ring_id`.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct RingConf {
    pub ring_id: RingId,
    pub hosts: Vec<HostId>,
    pub master: HostId,
}

impl RingConf {
    pub fn contains(&self, hid: HostId) -> bool {
        self.hosts.contains(&hid)
    }
}

/// PaxosConf tunes the protocol. Every field has a default.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct PaxosConf {
    /// Number of instances an acceptor or a learner keeps in memory.
    pub capacity: u64,

    /// Number of instances prepared by one phase-1 batch.
    pub batch_size: u64,

    /// Max number of prepared instances not proposed yet.
    pub prepare_ahead: u64,

    /// Size of the inbox queues and of the value queue.
    pub queue_size: usize,

    /// How long a master waits for a command to go around the ring.
    pub reply_timeout_ms: u64,

    pub wait_shards: usize,

    /// Number of delivered value ids remembered to skip duplicates.
    pub cache_size: usize,

    /// Datagrams larger than this are sent in chunks.
    pub chunk_size: usize,
}

impl Default for PaxosConf {
    fn default() -> Self {
        PaxosConf {
            capacity: 4096,
            batch_size: 64,
            prepare_ahead: 256,
            queue_size: 1024,
            reply_timeout_ms: 1000,
            wait_shards: 16,
            cache_size: 4096,
            chunk_size: 1200,
        }
    }
}

impl PaxosConf {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn check(&self) -> Result<(), ConfError> {
        let params = [
            ("capacity", self.capacity),
            ("batch_size", self.batch_size),
            ("prepare_ahead", self.prepare_ahead),
            ("queue_size", self.queue_size as u64),
            ("reply_timeout_ms", self.reply_timeout_ms),
            ("wait_shards", self.wait_shards as u64),
            ("cache_size", self.cache_size as u64),
            ("chunk_size", self.chunk_size as u64),
        ];

        for (name, v) in params.iter() {
            if *v == 0 {
                return Err(ConfError::InvalidParam(*name, *v));
            }
        }

        if self.batch_size > self.capacity {
            return Err(ConfError::InvalidParam("batch_size", self.batch_size));
        }

        Ok(())
    }
}

/// ClusterInfo is the cluster conf file.
///
/// ```yaml
/// hosts:
///     1: { ring_addr: 127.0.0.1:4441, udp_addr: 127.0.0.1:5551 }
///     2: { ring_addr: 127.0.0.1:4442, udp_addr: 127.0.0.1:5552 }
/// ring:
///     ring_id: 1
///     hosts: [1, 2]
///     master: 1
/// paxos:
///     capacity: 1024
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClusterInfo {
    pub hosts: BTreeMap<HostId, Host>,

    pub ring: RingConf,

    #[serde(default)]
    pub paxos: PaxosConf,
}

impl ClusterInfo {
    /// from_file read cluster conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterInfo, ConfError> {
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<ClusterInfo, ConfError> {
        let cluster: ClusterInfo = serde_yaml::from_str(content)?;

        for hid in cluster.hosts.keys() {
            if *hid >= MAX_HOSTS {
                return Err(ConfError::HostIdTooLarge(*hid));
            }
        }

        cluster.check_ring(&cluster.ring)?;
        cluster.paxos.check()?;

        Ok(cluster)
    }

    pub fn get_host(&self, hid: HostId) -> Option<&Host> {
        self.hosts.get(&hid)
    }

    /// check_ring checks that a ring is made of distinct declared hosts and the master is one
    /// of them.
    pub fn check_ring(&self, ring: &RingConf) -> Result<(), ConfError> {
        if ring.ring_id == INVALID_RING {
            return Err(ConfError::InvalidRingId(ring.ring_id));
        }

        if ring.hosts.is_empty() {
            return Err(ConfError::EmptyRing(ring.ring_id));
        }

        let mut seen = BTreeSet::new();
        for hid in ring.hosts.iter() {
            if *hid >= MAX_HOSTS {
                return Err(ConfError::HostIdTooLarge(*hid));
            }
            if !self.hosts.contains_key(hid) {
                return Err(ConfError::OrphanHost(*hid));
            }
            if !seen.insert(*hid) {
                return Err(ConfError::DupHost(*hid));
            }
        }

        if !ring.contains(ring.master) {
            return Err(ConfError::MasterNotOnRing(ring.master));
        }

        Ok(())
    }
}
