//! Helpers to run rings of hosts in one process. Only meant for test.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use storage::MemEngine;
use tokio::sync::mpsc;

use crate::codec::MsgPackCodec;
use crate::conf::{ClusterInfo, Coordinator, StaticCoordinator};
use crate::executor::*;
use crate::node::Node;
use crate::snapshot::SnapshotStore;
use crate::transport::LocalNet;
use crate::types::*;

/// new_cluster creates a cluster of hosts `1..=n` on loopback addresses from `port_base`. They
/// are all on ring 1 in id order, and host 1 is the master.
/// Timeouts are short and windows small to keep tests fast.
pub fn new_cluster(n: u64, port_base: u16) -> ClusterInfo {
    let mut yaml = String::from("hosts:\n");
    for h in 1..=n {
        yaml.push_str(&format!(
            "    {}:\n        ring_addr: 127.0.0.1:{}\n        udp_addr: 127.0.0.1:{}\n",
            h,
            port_base + 2 * h as u16,
            port_base + 2 * h as u16 + 1,
        ));
    }

    let hosts: Vec<String> = (1..=n).map(|h| h.to_string()).collect();
    yaml.push_str(&format!(
        "ring:
    ring_id: 1
    hosts: [{}]
    master: 1
paxos:
    capacity: 256
    batch_size: 8
    prepare_ahead: 32
    queue_size: 64
    reply_timeout_ms: 200
",
        hosts.join(", ")
    ));

    ClusterInfo::from_str(&yaml).unwrap()
}

/// new_context creates the context of `host_id` with an in-memory snapshot store. Its commands
/// are sent over `net`, but it is not registered on it.
pub fn new_context(host_id: HostId, cluster: &ClusterInfo, net: &LocalNet) -> Arc<RingContext> {
    let codec = Arc::new(MsgPackCodec);
    let snapshot = SnapshotStore::new(Arc::new(MemEngine::new().unwrap()), codec.clone());
    let net = Arc::new(net.clone());

    let ctx = RingContext::new(
        host_id,
        &cluster.ring,
        cluster.paxos.clone(),
        snapshot,
        codec,
        net.clone(),
        net,
    )
    .unwrap();

    Arc::new(ctx)
}

/// register_context makes `net` deliver commands to `host_id` to the context.
pub fn register_context(net: &LocalNet, ctx: &Arc<RingContext>) {
    net.register(ctx.host_id, RingCommandHandler::new(ctx.clone()));
}

/// start_acceptors creates a registered context for every host of `cluster` and runs the
/// acceptor tasks of them until `stop`. No proposer task is started.
pub fn start_acceptors(
    cluster: &ClusterInfo,
    net: &LocalNet,
    stop: &StopSignal,
) -> Vec<Arc<RingContext>> {
    let mut ctxs = vec![];

    for hid in cluster.hosts.keys() {
        let ctx = new_context(*hid, cluster, net);
        register_context(net, &ctx);

        tokio::spawn(Phase1BatchExecutor::acceptor_loop(ctx.clone(), stop.clone()));
        tokio::spawn(Phase1Executor::acceptor_loop(ctx.clone(), stop.clone()));
        tokio::spawn(Phase2Executor::acceptor_loop(ctx.clone(), stop.clone()));

        ctxs.push(ctx);
    }

    ctxs
}

/// wait_for polls `cond` until it holds or `timeout` passes. It returns the last result.
pub async fn wait_for<F: Fn() -> bool>(timeout: Duration, cond: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// LocalRing runs a started node for every host of a cluster, connected by a `LocalNet`.
pub struct LocalRing {
    pub net: LocalNet,
    pub coordinator: Arc<StaticCoordinator>,
    pub nodes: BTreeMap<HostId, Node>,
}

impl LocalRing {
    pub fn start(cluster: ClusterInfo) -> Self {
        let net = LocalNet::new();
        let hids: Vec<HostId> = cluster.hosts.keys().cloned().collect();
        let conf = cluster.paxos.clone();
        let coordinator = Arc::new(StaticCoordinator::new(cluster));

        let mut nodes = BTreeMap::new();
        for hid in hids {
            let sender = Arc::new(net.clone());
            let mut node = Node::new(
                hid,
                coordinator.clone() as Arc<dyn Coordinator>,
                conf.clone(),
                Arc::new(MemEngine::new().unwrap()),
                sender.clone(),
                sender,
            )
            .unwrap();

            net.register(hid, node.handler());
            node.start().unwrap();
            nodes.insert(hid, node);
        }

        LocalRing {
            net,
            coordinator,
            nodes,
        }
    }

    pub fn node(&self, hid: HostId) -> &Node {
        &self.nodes[&hid]
    }

    pub async fn stop(&mut self) {
        for (hid, node) in self.nodes.iter_mut() {
            node.stop();
            node.join().await;
            self.net.unregister(*hid);
        }
    }
}

/// recv_n receives `n` chosen values, or less if they do not arrive within `timeout`.
pub async fn recv_n(
    rx: &mut mpsc::UnboundedReceiver<(InstanceId, Value)>,
    n: usize,
    timeout: Duration,
) -> Vec<(InstanceId, Value)> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut got = vec![];

    while got.len() < n {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(x)) => got.push(x),
            _ => break,
        }
    }
    got
}
