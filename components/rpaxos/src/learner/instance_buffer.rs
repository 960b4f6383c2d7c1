use crate::types::*;

/// BufferResult is the outcome of an `InstanceBuffer` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferResult {
    Ok,

    /// The instance is below the window.
    TooOld,

    /// The instance is beyond the window.
    TooNew,

    /// The instance disagrees with what the buffer holds, or the value to confirm is missing.
    Failed,
}

#[derive(Debug, Clone)]
struct Slot {
    instance_id: InstanceId,
    value: Value,
    committed: bool,
}

/// InstanceBuffer is a fixed-capacity sliding window of values seen by a learner.
///
/// Values from phase-2 proposals are provisional until a commit of the same value id
/// confirms them. A confirmed value is never replaced.
#[derive(Debug)]
pub struct InstanceBuffer {
    capacity: u64,
    begin: InstanceId,
    slots: Vec<Option<Slot>>,
}

impl InstanceBuffer {
    pub fn new(capacity: u64, begin: InstanceId) -> Self {
        assert!(capacity > 0);

        InstanceBuffer {
            capacity,
            begin,
            slots: vec![None; capacity as usize],
        }
    }

    pub fn begin(&self) -> InstanceId {
        self.begin
    }

    fn check(&self, iid: InstanceId) -> BufferResult {
        if iid < self.begin {
            BufferResult::TooOld
        } else if iid >= self.begin.saturating_add(self.capacity) {
            BufferResult::TooNew
        } else {
            BufferResult::Ok
        }
    }

    fn slot_mut(&mut self, iid: InstanceId) -> &mut Option<Slot> {
        let idx = (iid % self.capacity) as usize;
        let slot = &mut self.slots[idx];

        let stale = matches!(slot, Some(s) if s.instance_id != iid);
        if stale {
            *slot = None;
        }
        slot
    }

    /// propose records a provisional value.
    pub fn propose(&mut self, iid: InstanceId, value: Value) -> BufferResult {
        let r = self.check(iid);
        if r != BufferResult::Ok {
            return r;
        }

        let slot = self.slot_mut(iid);
        match slot {
            Some(s) if s.committed => {
                if s.value.value_id() == value.value_id() {
                    BufferResult::Ok
                } else {
                    BufferResult::Failed
                }
            }
            _ => {
                *slot = Some(Slot {
                    instance_id: iid,
                    value,
                    committed: false,
                });
                BufferResult::Ok
            }
        }
    }

    /// commit confirms the provisional value of `iid` if its id is `value_id`.
    pub fn commit(&mut self, iid: InstanceId, value_id: ValueId) -> BufferResult {
        let r = self.check(iid);
        if r != BufferResult::Ok {
            return r;
        }

        match self.slot_mut(iid) {
            Some(s) if s.value.value_id() == value_id => {
                s.committed = true;
                BufferResult::Ok
            }
            _ => BufferResult::Failed,
        }
    }

    /// learn installs a value known to be committed.
    pub fn learn(&mut self, iid: InstanceId, value: Value) -> BufferResult {
        let r = self.check(iid);
        if r != BufferResult::Ok {
            return r;
        }

        let slot = self.slot_mut(iid);
        if let Some(s) = slot {
            if s.committed {
                return if s.value.value_id() == value.value_id() {
                    BufferResult::Ok
                } else {
                    BufferResult::Failed
                };
            }
        }

        *slot = Some(Slot {
            instance_id: iid,
            value,
            committed: true,
        });
        BufferResult::Ok
    }

    /// committed_value returns the confirmed value of `iid`.
    pub fn committed_value(&self, iid: InstanceId) -> Option<Value> {
        if self.check(iid) != BufferResult::Ok {
            return None;
        }

        match &self.slots[(iid % self.capacity) as usize] {
            Some(s) if s.instance_id == iid && s.committed => Some(s.value.clone()),
            _ => None,
        }
    }

    /// advance_to slides the window forward so that it starts at `begin`.
    /// A window never slides backward.
    pub fn advance_to(&mut self, begin: InstanceId) {
        if begin <= self.begin {
            return;
        }

        if begin - self.begin >= self.capacity {
            for s in self.slots.iter_mut() {
                *s = None;
            }
        } else {
            for iid in self.begin..begin {
                let idx = (iid % self.capacity) as usize;
                if matches!(&self.slots[idx], Some(s) if s.instance_id == iid) {
                    self.slots[idx] = None;
                }
            }
        }

        self.begin = begin;
    }
}
