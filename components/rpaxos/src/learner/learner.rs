use std::cmp::{max, min};
use std::collections::HashSet;

use crate::learner::*;
use crate::snapshot::SnapshotError;
use crate::types::*;

/// Delivery is a committed value ready to be applied, in instance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub instance_id: InstanceId,
    pub value: Value,

    /// The same value has been delivered at an earlier instance.
    pub duplicate: bool,
}

/// Learner turns phase-2 traffic into an ordered stream of committed values.
///
/// - Proposals are buffered in an `InstanceBuffer` until a commit confirms them.
/// - Every commit is recorded by a `CommitTracker`, to find out the gaps that are still unknown.
/// - Confirmed values wait in a `PendingPool` until every instance before them is confirmed.
/// - A `ValueCache` marks values that were already delivered at another instance.
#[derive(Debug)]
pub struct Learner {
    buffer: InstanceBuffer,
    tracker: CommitTracker,
    pending: PendingPool,
    delivered: ValueCache,

    /// One past the highest instance seen committed beyond the window.
    beyond: InstanceId,
}

impl Learner {
    /// new creates a learner that has delivered every instance before `start`.
    pub fn new(capacity: u64, cache_size: usize, start: InstanceId) -> Self {
        Learner {
            buffer: InstanceBuffer::new(capacity, start),
            tracker: CommitTracker::new(start),
            pending: PendingPool::new(capacity, start),
            delivered: ValueCache::new(cache_size),
            beyond: start,
        }
    }

    /// next_to_deliver returns the lowest instance not delivered yet.
    pub fn next_to_deliver(&self) -> InstanceId {
        self.pending.next()
    }

    pub fn tracker(&self) -> &CommitTracker {
        &self.tracker
    }

    /// out_of_window returns the result for an instance outside of the delivery window.
    fn out_of_window(&self, iid: InstanceId) -> Option<BufferResult> {
        if iid < self.pending.next() {
            Some(BufferResult::TooOld)
        } else if iid >= self.pending.end() {
            Some(BufferResult::TooNew)
        } else {
            None
        }
    }

    pub fn on_propose(&mut self, iid: InstanceId, value: Value) -> BufferResult {
        if let Some(r) = self.out_of_window(iid) {
            return r;
        }
        self.buffer.propose(iid, value)
    }

    /// on_beyond_window remembers that something after the window is committed, so that the
    /// whole window is reported missing. Nothing about `iid` itself is recorded.
    fn on_beyond_window(&mut self, iid: InstanceId) -> BufferResult {
        self.beyond = max(self.beyond, iid.saturating_add(1));
        BufferResult::TooNew
    }

    /// on_commit confirms the value of `iid`.
    /// Any result other than `Ok` means the value has to be recovered.
    pub fn on_commit(&mut self, iid: InstanceId, value_id: ValueId) -> BufferResult {
        match self.out_of_window(iid) {
            Some(BufferResult::TooNew) => return self.on_beyond_window(iid),
            Some(r) => return r,
            None => {}
        }

        self.tracker.add_committed_instance(iid);

        let r = self.buffer.commit(iid, value_id);
        if r != BufferResult::Ok {
            return r;
        }

        match self.buffer.committed_value(iid) {
            Some(v) => self.push_pending(iid, v),
            None => BufferResult::Failed,
        }
    }

    /// on_learn installs a value recovered from another host.
    pub fn on_learn(&mut self, iid: InstanceId, value: Value) -> BufferResult {
        match self.out_of_window(iid) {
            Some(BufferResult::TooNew) => return self.on_beyond_window(iid),
            Some(r) => return r,
            None => {}
        }

        self.tracker.add_committed_instance(iid);

        let r = self.buffer.learn(iid, value.clone());
        if r == BufferResult::Failed {
            return r;
        }

        self.push_pending(iid, value)
    }

    fn push_pending(&mut self, iid: InstanceId, value: Value) -> BufferResult {
        match self.pending.push(iid, value) {
            PendingResult::Ok | PendingResult::Duplicate => BufferResult::Ok,
            PendingResult::TooOld => BufferResult::TooOld,
            PendingResult::TooNew => BufferResult::TooNew,
        }
    }

    /// ready returns every value that can be delivered now. Nothing is consumed until
    /// `confirm` is called with it.
    pub fn ready(&self) -> Result<Vec<Delivery>, SnapshotError> {
        let mut seen = HashSet::new();

        let ready = self
            .pending
            .peek_ready()?
            .into_iter()
            .map(|(iid, value)| {
                let vid = value.value_id();
                let duplicate = self.delivered.contains(vid) || !seen.insert(vid);
                Delivery {
                    instance_id: iid,
                    value,
                    duplicate,
                }
            })
            .collect();

        Ok(ready)
    }

    /// confirm consumes a prefix returned by `ready`, once it is persisted.
    /// It returns the number of instances consumed.
    pub fn confirm(&mut self, ready: &[Delivery]) -> usize {
        let mut n = 0;

        for d in ready.iter() {
            if !self.pending.consume(d.instance_id) {
                break;
            }
            self.delivered.insert(d.value.value_id(), d.instance_id);
            n += 1;
        }

        // the buffer must keep every instance that is delivered neither confirmed
        let keep_from = min(self.pending.next(), self.tracker.first_unknown_instance());
        self.buffer.advance_to(keep_from);

        n
    }

    /// missing returns up to `limit` instances that block delivery: they are before a committed
    /// instance but their value is unknown here.
    pub fn missing(&self, limit: usize) -> Vec<InstanceId> {
        let upto = max(self.tracker.after_last_committed(), self.beyond);
        self.pending.missing(upto, limit)
    }
}
