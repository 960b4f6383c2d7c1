use std::cmp::Ordering;
use std::time::Duration;

use crate::proposer::ActiveHeap;
use crate::queue::QueueError;
use crate::types::*;

/// OpenEntry is an instance prepared with `ballot_id` that has no value assigned yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OpenEntry {
    pub instance_id: InstanceId,
    pub ballot_id: BallotId,
}

/// FailedEntry is an instance whose phase 1 or phase 2 failed. It is to be prepared again with
/// `ballot_hint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FailedEntry {
    pub instance_id: InstanceId,
    pub ballot_hint: BallotId,
}

/// ReservedEntry is an instance prepared with `ballot_id` that must be proposed with `value`:
/// some acceptor has already accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedEntry {
    pub instance_id: InstanceId,
    pub ballot_id: BallotId,
    pub value: Value,
}

impl Ord for ReservedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.instance_id, self.ballot_id, self.value.value_id()).cmp(&(
            other.instance_id,
            other.ballot_id,
            other.value.value_id(),
        ))
    }
}

impl PartialOrd for ReservedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// ProposerPool holds the instances a master works on, lowest instance id first.
///
/// Each of the three queues is activated and deactivated on its own; the pool-level
/// `activate`/`deactivate` just apply to all of them. A new pool is inactive.
#[derive(Default)]
pub struct ProposerPool {
    open: ActiveHeap<OpenEntry>,
    reserved: ActiveHeap<ReservedEntry>,
    failed: ActiveHeap<FailedEntry>,
}

impl ProposerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self) {
        self.open.activate();
        self.reserved.activate();
        self.failed.activate();
    }

    pub fn deactivate(&self) {
        self.open.deactivate();
        self.reserved.deactivate();
        self.failed.deactivate();
    }

    pub fn open(&self) -> &ActiveHeap<OpenEntry> {
        &self.open
    }

    pub fn reserved(&self) -> &ActiveHeap<ReservedEntry> {
        &self.reserved
    }

    pub fn failed(&self) -> &ActiveHeap<FailedEntry> {
        &self.failed
    }

    pub fn push_open(&self, instance_id: InstanceId, ballot_id: BallotId) -> bool {
        self.open.push(OpenEntry {
            instance_id,
            ballot_id,
        })
    }

    pub fn pop_open(&self) -> Option<OpenEntry> {
        self.open.pop()
    }

    pub async fn pop_open_wait(&self, timeout: Duration) -> Result<OpenEntry, QueueError> {
        self.open.pop_wait(timeout).await
    }

    pub fn push_reserved(&self, instance_id: InstanceId, ballot_id: BallotId, value: Value) -> bool {
        self.reserved.push(ReservedEntry {
            instance_id,
            ballot_id,
            value,
        })
    }

    pub fn pop_reserved(&self) -> Option<ReservedEntry> {
        self.reserved.pop()
    }

    pub fn push_failed(&self, instance_id: InstanceId, ballot_hint: BallotId) -> bool {
        self.failed.push(FailedEntry {
            instance_id,
            ballot_hint,
        })
    }

    pub fn pop_failed(&self) -> Option<FailedEntry> {
        self.failed.pop()
    }

    pub async fn pop_failed_wait(&self, timeout: Duration) -> Result<FailedEntry, QueueError> {
        self.failed.pop_wait(timeout).await
    }

    /// prepared returns the number of instances prepared or being prepared again, that are not
    /// proposed yet.
    pub fn prepared(&self) -> usize {
        self.open.len() + self.reserved.len() + self.failed.len()
    }
}
