use crate::snapshot::SnapshotError;
use crate::types::*;

/// PendingResult is the outcome of `PendingPool::push`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingResult {
    Ok,

    /// Already delivered.
    TooOld,

    /// Beyond the window: it must be recovered again once the window slides there.
    TooNew,

    /// The instance is already pending.
    Duplicate,
}

/// PendingPool holds committed values that are neither delivered nor snapshotted yet.
///
/// Values are consumed strictly in instance order starting from `next`, so that the snapshot and
/// the subscribers always see a prefix of the log.
#[derive(Debug)]
pub struct PendingPool {
    capacity: u64,
    next: InstanceId,
    slots: Vec<Option<(InstanceId, Value)>>,
}

impl PendingPool {
    pub fn new(capacity: u64, next: InstanceId) -> Self {
        assert!(capacity > 0);

        PendingPool {
            capacity,
            next,
            slots: vec![None; capacity as usize],
        }
    }

    /// next returns the next instance to consume.
    pub fn next(&self) -> InstanceId {
        self.next
    }

    fn idx(&self, iid: InstanceId) -> usize {
        (iid % self.capacity) as usize
    }

    pub fn push(&mut self, iid: InstanceId, value: Value) -> PendingResult {
        if iid < self.next {
            return PendingResult::TooOld;
        }
        if iid >= self.end() {
            return PendingResult::TooNew;
        }

        let idx = self.idx(iid);
        if matches!(&self.slots[idx], Some((x, _)) if *x == iid) {
            return PendingResult::Duplicate;
        }

        self.slots[idx] = Some((iid, value));
        PendingResult::Ok
    }

    pub fn contains(&self, iid: InstanceId) -> bool {
        if iid < self.next || iid >= self.end() {
            return false;
        }
        matches!(&self.slots[self.idx(iid)], Some((x, _)) if *x == iid)
    }

    /// end returns the first instance beyond the window.
    pub fn end(&self) -> InstanceId {
        self.next.saturating_add(self.capacity)
    }

    /// peek_ready returns the consecutive values present from `next` on, without removing them.
    ///
    /// The slot of `next` can only hold `next`: any other instance in it is a defect. It is
    /// returned as an error when nothing before it is ready, so that the ready prefix is still
    /// delivered.
    pub fn peek_ready(&self) -> Result<Vec<(InstanceId, Value)>, SnapshotError> {
        let mut ready = vec![];

        for iid in self.next..self.end() {
            match &self.slots[self.idx(iid)] {
                None => break,
                Some((x, v)) if *x == iid => ready.push((iid, v.clone())),
                Some((x, _)) => {
                    if ready.is_empty() {
                        return Err(SnapshotError::SlotMismatch(iid, *x));
                    }
                    break;
                }
            }
        }

        Ok(ready)
    }

    /// consume removes the value of `iid` if `iid` is `next`, and moves `next` on.
    pub fn consume(&mut self, iid: InstanceId) -> bool {
        if iid != self.next {
            return false;
        }

        let idx = self.idx(iid);
        if !matches!(&self.slots[idx], Some((x, _)) if *x == iid) {
            return false;
        }

        self.slots[idx] = None;
        self.next += 1;
        true
    }

    /// missing returns up to `limit` instances in `[next, upto)` whose value is not here.
    pub fn missing(&self, upto: InstanceId, limit: usize) -> Vec<InstanceId> {
        let end = std::cmp::min(upto, self.end());

        (self.next..end)
            .filter(|iid| !self.contains(*iid))
            .take(limit)
            .collect()
    }
}
