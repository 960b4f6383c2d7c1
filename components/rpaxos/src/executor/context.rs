use std::cmp::max;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

use crate::acceptor::{InstanceStore, Lookup};
use crate::codec::Codec;
use crate::conf::{PaxosConf, RingConf};
use crate::learner::Learner;
use crate::proposer::ProposerPool;
use crate::queue::{BlockingQueue, WaitPool};
use crate::ring::*;
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::transport::{DatagramSender, RingSender};
use crate::types::*;

/// RingContext is everything a host shares between its protocol tasks.
/// It is built once, before any task starts, and lives as long as the node.
pub struct RingContext {
    pub host_id: HostId,
    pub conf: PaxosConf,

    pub topology: RingTopology,
    pub store: InstanceStore,
    pub pool: ProposerPool,
    pub waits: WaitPool<RingCommand>,
    pub guid: GuidGenerator,

    /// Values waiting to be proposed.
    pub values: BlockingQueue<Value>,

    pub batch_inbox: BlockingQueue<RingCommand>,
    pub phase1_inbox: BlockingQueue<RingCommand>,
    pub phase2_inbox: BlockingQueue<RingCommand>,

    pub learner: Mutex<Learner>,

    /// Held by `deliver` from reading the ready values until they are consumed.
    pub delivering: Mutex<()>,

    /// Notified when the learner may have something to deliver.
    pub learned: Notify,

    pub snapshot: SnapshotStore,

    pub ring_codec: RingCommandCodec,
    pub udp_codec: UdpCommandCodec,

    ring_tx: Arc<dyn RingSender>,
    udp_tx: Arc<dyn DatagramSender>,

    /// The ballot the master prepares new instances with.
    ballot: Mutex<BallotId>,

    /// The first instance not prepared by any batch yet.
    next_batch: Mutex<InstanceId>,

    subscribers: Mutex<Vec<mpsc::UnboundedSender<(InstanceId, Value)>>>,
}

impl RingContext {
    /// new builds the context of `host_id`. The acceptor and the learner start from the last
    /// snapshot.
    pub fn new(
        host_id: HostId,
        ring: &RingConf,
        conf: PaxosConf,
        snapshot: SnapshotStore,
        codec: Arc<dyn Codec>,
        ring_tx: Arc<dyn RingSender>,
        udp_tx: Arc<dyn DatagramSender>,
    ) -> Result<Self, SnapshotError> {
        let birth = snapshot.last_snapshot()?;

        Ok(RingContext {
            host_id,
            topology: RingTopology::new(host_id, ring),
            store: InstanceStore::new(conf.capacity, birth),
            pool: ProposerPool::new(),
            waits: WaitPool::new(conf.wait_shards),
            guid: GuidGenerator::new(host_id),
            values: BlockingQueue::new(conf.queue_size),
            batch_inbox: BlockingQueue::new(conf.queue_size),
            phase1_inbox: BlockingQueue::new(conf.queue_size),
            phase2_inbox: BlockingQueue::new(conf.queue_size),
            learner: Mutex::new(Learner::new(conf.capacity, conf.cache_size, birth)),
            delivering: Mutex::new(()),
            learned: Notify::new(),
            snapshot,
            ring_codec: RingCommandCodec::new(codec.clone()),
            udp_codec: UdpCommandCodec::new(codec),
            ring_tx,
            udp_tx,
            ballot: Mutex::new(first_ballot_id(host_id)),
            next_batch: Mutex::new(birth),
            subscribers: Mutex::new(vec![]),
            conf,
        })
    }

    pub fn reply_timeout(&self) -> Duration {
        self.conf.reply_timeout()
    }

    /// tick is how long an idle task waits before it looks again.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(max(self.conf.reply_timeout_ms / 10, 1))
    }

    /// new_header creates the header of a command this host starts on the ring.
    pub fn new_header(&self, snap: &RingSnapshot) -> Header {
        Header {
            request_id: self.guid.next(),
            ring_id: snap.ring_id,
            dst_host_id: snap.next,
        }
    }

    /// is_own_request returns true if this host started the request.
    pub fn is_own_request(&self, request_id: RequestId) -> bool {
        guid_host(request_id) == self.host_id
    }

    pub fn current_ballot(&self) -> BallotId {
        *self.ballot.lock().unwrap()
    }

    /// raise_ballot makes the master ballot greater than `seen`.
    /// It returns the new master ballot.
    pub fn raise_ballot(&self, seen: BallotId) -> BallotId {
        let mut b = self.ballot.lock().unwrap();
        if seen >= *b {
            *b = next_ballot_id(seen, self.host_id);
        }
        *b
    }

    /// take_batch returns the next range to prepare, or None if it does not fit in the window
    /// of this host.
    pub fn take_batch(&self) -> Option<(InstanceId, InstanceId)> {
        let marks = self.store.watermarks();
        let mut next = self.next_batch.lock().unwrap();

        let start = max(*next, marks.min_not_committed);
        let end = start + self.conf.batch_size;

        if end > marks.last_snapshot.saturating_add(self.store.capacity()) {
            return None;
        }

        *next = end;
        Some((start, end))
    }

    pub fn next_batch(&self) -> InstanceId {
        *self.next_batch.lock().unwrap()
    }

    /// start_proposing turns this host into a working master: preparing restarts from the
    /// first instance not known to be committed here, with a ballot greater than any used
    /// before.
    pub fn start_proposing(&self) {
        let mnc = self.store.watermarks().min_not_committed;
        let delivered = self.learner.lock().unwrap().next_to_deliver();

        {
            let mut next = self.next_batch.lock().unwrap();
            *next = max(mnc, delivered);
        }

        let cur = self.current_ballot();
        let b = self.raise_ballot(cur);

        info!("start proposing"; "host_id" => self.host_id, "from" => self.next_batch(), "ballot" => b);
        self.pool.activate();
    }

    pub fn stop_proposing(&self) {
        info!("stop proposing"; "host_id" => self.host_id);
        self.pool.deactivate();
    }

    /// reset_inboxes drops every queued ring command and wakes up tasks blocked on them.
    pub fn reset_inboxes(&self) {
        for q in [&self.batch_inbox, &self.phase1_inbox, &self.phase2_inbox].iter() {
            let dropped = q.deactivate();
            if !dropped.is_empty() {
                debug!("drop queued ring commands"; "n" => dropped.len());
            }
            q.activate();
        }
    }

    /// send_ring sends `cmd` to the next host of `snap`.
    pub fn send_ring(&self, snap: &RingSnapshot, mut cmd: RingCommand) {
        cmd.header.dst_host_id = snap.next;

        let buf = match self.ring_codec.encode(&cmd) {
            Ok(b) => b,
            Err(e) => {
                error!("encode ring command"; "cmd" => %cmd, "err" => %e);
                return;
            }
        };

        if let Err(e) = self.ring_tx.send(snap.next, buf) {
            warn!("send ring command"; "dst" => snap.next, "cmd" => %cmd, "err" => %e);
        }
    }

    pub fn send_udp(&self, dst: HostId, cmd: &UdpCommand) {
        let buf = match self.udp_codec.encode(cmd) {
            Ok(b) => b,
            Err(e) => {
                error!("encode udp command"; "cmd" => %cmd, "err" => %e);
                return;
            }
        };

        if let Err(e) = self.udp_tx.send_to(dst, buf) {
            warn!("send udp command"; "dst" => dst, "cmd" => %cmd, "err" => %e);
        }
    }

    /// broadcast_udp sends `cmd` to every other host on the ring.
    pub fn broadcast_udp(&self, snap: &RingSnapshot, cmd: &UdpCommand) {
        for hid in snap.others() {
            self.send_udp(hid, cmd);
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<(InstanceId, Value)> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// publish sends a delivered value to every subscriber still listening.
    pub fn publish(&self, iid: InstanceId, value: &Value) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.retain(|tx| tx.send((iid, value.clone())).is_ok());
    }

    /// learn_committed installs a value known to be committed at `iid` into the acceptor and
    /// the learner of this host.
    pub fn learn_committed(&self, iid: InstanceId, value: Value) {
        if let Lookup::Ok(inst) = self.store.lookup(iid) {
            if !inst.learn(value.clone()) {
                error!("learned value conflicts with committed value";
                       "iid" => iid, "learned" => %value, "committed" => ?inst.committed_value());
                return;
            }
            self.store.notify_commit();
        }

        let r = self.learner.lock().unwrap().on_learn(iid, value);
        debug!("learn committed"; "iid" => iid, "result" => ?r);
        self.learned.notify_one();
    }
}
