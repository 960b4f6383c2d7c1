use std::collections::BTreeSet;

use crate::types::InstanceId;

/// Tracked is the outcome of `CommitTracker::add_committed_instance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tracked {
    /// The instance was beyond the frontier. The skipped instances are returned: they are not
    /// known to be committed and may need recovery.
    Advanced(Vec<InstanceId>),

    /// The instance was a known gap and is committed now.
    Removed,

    /// The instance was already known to be committed.
    AlreadyCommitted,
}

/// CommitTracker tracks which instances are known to be committed.
///
/// Every instance below `after_last_committed` that is not in `not_committed` is committed;
/// nothing is known about instances from `after_last_committed` on.
#[derive(Debug, Clone)]
pub struct CommitTracker {
    not_committed: BTreeSet<InstanceId>,
    after_last_committed: InstanceId,
}

impl CommitTracker {
    /// new creates a tracker that knows every instance before `start` is committed.
    pub fn new(start: InstanceId) -> Self {
        CommitTracker {
            not_committed: BTreeSet::new(),
            after_last_committed: start,
        }
    }

    pub fn add_committed_instance(&mut self, iid: InstanceId) -> Tracked {
        if iid >= self.after_last_committed {
            let gaps: Vec<InstanceId> = (self.after_last_committed..iid).collect();
            self.not_committed.extend(gaps.iter().cloned());
            self.after_last_committed = iid + 1;
            return Tracked::Advanced(gaps);
        }

        if self.not_committed.remove(&iid) {
            Tracked::Removed
        } else {
            Tracked::AlreadyCommitted
        }
    }

    /// first_unknown_instance returns the lowest instance that is not confirmed committed.
    pub fn first_unknown_instance(&self) -> InstanceId {
        match self.not_committed.iter().next() {
            Some(iid) => *iid,
            None => self.after_last_committed,
        }
    }

    pub fn after_last_committed(&self) -> InstanceId {
        self.after_last_committed
    }

    pub fn is_committed(&self, iid: InstanceId) -> bool {
        iid < self.after_last_committed && !self.not_committed.contains(&iid)
    }

    /// not_committed returns the known gaps in ascending order.
    pub fn not_committed(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.not_committed.iter().cloned()
    }
}
