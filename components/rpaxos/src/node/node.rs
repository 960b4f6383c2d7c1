use std::sync::Arc;

use bytes::Bytes;
use storage::Base;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::codec::MsgPackCodec;
use crate::conf::{Coordinator, PaxosConf, RingConf};
use crate::executor::*;
use crate::node::NodeError;
use crate::queue::QueueError;
use crate::snapshot::SnapshotStore;
use crate::transport::{DatagramSender, RingSender};
use crate::types::*;

/// Node is one host of the ring: the acceptor, learner and, while it is the master, the
/// proposer.
///
/// ```ignore
/// let mut node = Node::new(1, coordinator, PaxosConf::default(), engine, ring_tx, udp_tx)?;
/// node.start()?;
/// let mut committed = node.subscribe();
/// node.propose("foo").await?;
/// ```
pub struct Node {
    ctx: Arc<RingContext>,
    coordinator: Arc<dyn Coordinator>,
    stop_tx: watch::Sender<bool>,
    stop: StopSignal,
    handles: Vec<JoinHandle<()>>,
}

impl Node {
    pub fn new(
        host_id: HostId,
        coordinator: Arc<dyn Coordinator>,
        conf: PaxosConf,
        engine: Arc<dyn Base>,
        ring_tx: Arc<dyn RingSender>,
        udp_tx: Arc<dyn DatagramSender>,
    ) -> Result<Self, NodeError> {
        conf.check()?;

        if coordinator.host_address(host_id).is_none() {
            return Err(NodeError::UnknownHost(host_id));
        }

        let codec = Arc::new(MsgPackCodec);
        let snapshot = SnapshotStore::new(engine, codec.clone());
        let ring = coordinator.current_ring();

        let ctx = RingContext::new(host_id, &ring, conf, snapshot, codec, ring_tx, udp_tx)?;
        let (stop_tx, stop) = StopSignal::new();

        Ok(Node {
            ctx: Arc::new(ctx),
            coordinator,
            stop_tx,
            stop,
            handles: vec![],
        })
    }

    pub fn host_id(&self) -> HostId {
        self.ctx.host_id
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// handler returns the entry for commands received from other hosts.
    pub fn handler(&self) -> RingCommandHandler {
        RingCommandHandler::new(self.ctx.clone())
    }

    /// start spawns every task of the node. It must be called within a tokio runtime.
    pub fn start(&mut self) -> Result<(), NodeError> {
        if !self.handles.is_empty() {
            return Err(NodeError::AlreadyStarted);
        }

        let ctx = &self.ctx;
        let st = &self.stop;

        self.handles = vec![
            tokio::spawn(Phase1BatchExecutor::acceptor_loop(ctx.clone(), st.clone())),
            tokio::spawn(Phase1BatchExecutor::proposer_loop(ctx.clone(), st.clone())),
            tokio::spawn(Phase1Executor::acceptor_loop(ctx.clone(), st.clone())),
            tokio::spawn(Phase1Executor::proposer_loop(ctx.clone(), st.clone())),
            tokio::spawn(Phase2Executor::acceptor_loop(ctx.clone(), st.clone())),
            tokio::spawn(Phase2Executor::proposer_loop(ctx.clone(), st.clone())),
            tokio::spawn(RecoveryExecutor::recover_loop(ctx.clone(), st.clone())),
            tokio::spawn(delivery_loop(ctx.clone(), st.clone())),
            tokio::spawn(watch_ring(
                ctx.clone(),
                self.coordinator.watch_ring(),
                st.clone(),
            )),
        ];

        let snap = ctx.topology.snapshot();
        info!("node started"; "host_id" => ctx.host_id, "ring_id" => snap.ring_id, "master" => snap.master);

        if snap.is_master {
            ctx.start_proposing();
        }

        Ok(())
    }

    /// propose queues a value to get chosen and returns its value id.
    ///
    /// A value queued on a host that is not the master waits until the host becomes the master.
    pub async fn propose(&self, payload: impl Into<Bytes>) -> Result<ValueId, QueueError> {
        let v = Value::new(self.ctx.guid.next(), payload);
        let value_id = v.value_id();

        self.ctx.values.push(v, Some(self.ctx.reply_timeout())).await?;
        Ok(value_id)
    }

    /// subscribe returns a receiver of every value chosen from now on, in instance order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<(InstanceId, Value)> {
        self.ctx.subscribe()
    }

    /// stop signals every task to quit. Values not chosen yet are dropped.
    pub fn stop(&self) {
        // the node holds a receiver, send does not fail
        let _ = self.stop_tx.send(true);

        self.ctx.stop_proposing();
        let dropped = self.ctx.values.deactivate();
        info!("node stopped"; "host_id" => self.ctx.host_id, "dropped_values" => dropped.len());
    }

    /// join waits for every task to quit.
    pub async fn join(&mut self) {
        for h in self.handles.drain(..) {
            if let Err(e) = h.await {
                error!("node task"; "err" => %e);
            }
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

/// watch_ring applies every new ring: commands queued for the former ring are dropped, and
/// the proposer role follows the master.
async fn watch_ring(ctx: Arc<RingContext>, mut rx: watch::Receiver<RingConf>, mut stop: StopSignal) {
    loop {
        let ring = rx.borrow().clone();
        let change = ctx.topology.update(&ring);

        if change.ring_changed {
            info!("ring changed";
                  "host_id" => ctx.host_id, "ring_id" => ring.ring_id,
                  "hosts" => ?ring.hosts, "master" => ring.master);
            ctx.reset_inboxes();
        }

        if change.lost_master {
            ctx.stop_proposing();
        }

        if change.became_master {
            ctx.start_proposing();
        }

        tokio::select! {
            _ = stop.stopped() => return,
            r = rx.changed() => {
                if r.is_err() {
                    return;
                }
            }
        }
    }
}
