use std::cmp::{max, min};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::acceptor::AcceptorInstance;
use crate::types::*;

/// Lookup is the result of looking up an instance in an `InstanceStore`.
#[derive(Clone)]
pub enum Lookup {
    Ok(Arc<AcceptorInstance>),

    /// The instance is older than this acceptor.
    Dead,

    /// The instance has been evicted.
    Forgotten,

    /// Serving the instance requires evicting state that is not snapshotted yet.
    Unreachable,

    /// The instance is not permitted yet.
    BehindWall,
}

impl Lookup {
    pub fn is_ok(&self) -> bool {
        match self {
            Lookup::Ok(_) => true,
            _ => false,
        }
    }

    pub fn ok(self) -> Option<Arc<AcceptorInstance>> {
        match self {
            Lookup::Ok(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lookup::Ok(_) => "ok",
            Lookup::Dead => "dead",
            Lookup::Forgotten => "forgotten",
            Lookup::Unreachable => "unreachable",
            Lookup::BehindWall => "behind_wall",
        }
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Watermarks delimit the instance ids an `InstanceStore` serves. They always satisfy:
///
/// - `birth <= begin <= last_snapshot`,
/// - `min_not_committed <= next_to_max_touched <= wall`,
/// - `next_to_max_touched <= begin + capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermarks {
    pub birth: InstanceId,
    pub begin: InstanceId,
    pub last_snapshot: InstanceId,
    pub wall: InstanceId,
    pub min_not_committed: InstanceId,
    pub next_to_max_touched: InstanceId,
}

struct Inner {
    marks: Watermarks,
    slots: Vec<Arc<AcceptorInstance>>,
}

/// InstanceStore is a fixed-capacity sliding window of acceptor instances.
/// Instance `iid` lives in slot `iid % capacity`.
pub struct InstanceStore {
    capacity: u64,
    inner: Mutex<Inner>,
}

impl InstanceStore {
    /// new creates a store for an acceptor born at instance `birth`, e.g. the last snapshot
    /// it recovered from. All watermarks start at `birth`.
    pub fn new(capacity: u64, birth: InstanceId) -> Self {
        assert!(capacity > 0);

        let slots = (0..capacity)
            .map(|_| Arc::new(AcceptorInstance::new(INVALID_INSTANCE)))
            .collect();

        InstanceStore {
            capacity,
            inner: Mutex::new(Inner {
                marks: Watermarks {
                    birth,
                    begin: birth,
                    last_snapshot: birth,
                    wall: birth,
                    min_not_committed: birth,
                    next_to_max_touched: birth,
                },
                slots,
            }),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn watermarks(&self) -> Watermarks {
        self.inner.lock().unwrap().marks
    }

    /// lookup returns the instance `iid`, creating it in its slot if the slot still holds an
    /// older instance. Serving `iid` may move `begin` forward.
    pub fn lookup(&self, iid: InstanceId) -> Lookup {
        let mut inner = self.inner.lock().unwrap();
        let cap = self.capacity;

        let m = inner.marks;
        if iid < m.birth {
            return Lookup::Dead;
        }
        if iid < m.begin {
            return Lookup::Forgotten;
        }
        if iid >= m.wall {
            return Lookup::BehindWall;
        }
        if iid >= m.last_snapshot.saturating_add(cap) {
            return Lookup::Unreachable;
        }

        Self::expand(&mut inner.marks, cap, iid);

        let m = &mut inner.marks;
        m.next_to_max_touched = max(m.next_to_max_touched, iid + 1);

        let idx = (iid % cap) as usize;
        if inner.slots[idx].instance_id() != iid {
            debug_assert!(
                inner.slots[idx].instance_id() == INVALID_INSTANCE
                    || inner.slots[idx].instance_id() < iid
            );
            inner.slots[idx] = Arc::new(AcceptorInstance::new(iid));
        }

        Lookup::Ok(inner.slots[idx].clone())
    }

    /// peek returns the instance `iid` if its slot currently holds it, without touching any
    /// watermark.
    pub fn peek(&self, iid: InstanceId) -> Option<Arc<AcceptorInstance>> {
        let inner = self.inner.lock().unwrap();
        if iid < inner.marks.begin || iid >= inner.marks.next_to_max_touched {
            return None;
        }

        let slot = &inner.slots[(iid % self.capacity) as usize];
        if slot.instance_id() == iid {
            Some(slot.clone())
        } else {
            None
        }
    }

    /// try_expand_to moves `begin` forward so that `iid` fits in the window.
    /// It refuses, returning false, if that would evict instances after `last_snapshot`.
    pub fn try_expand_to(&self, iid: InstanceId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let m = inner.marks;

        if iid < m.begin {
            return true;
        }
        if iid >= m.last_snapshot.saturating_add(self.capacity) {
            return false;
        }

        Self::expand(&mut inner.marks, self.capacity, iid);
        true
    }

    fn expand(m: &mut Watermarks, cap: u64, iid: InstanceId) {
        let need = (iid + 1).saturating_sub(cap);
        if need > m.begin {
            debug_assert!(need <= m.last_snapshot);
            m.begin = need;
        }
        Self::raise_floor(m);
    }

    /// raise_floor moves `min_not_committed` and `next_to_max_touched` over evicted
    /// instances, but never past `wall`.
    fn raise_floor(m: &mut Watermarks) {
        let floor = min(m.begin, m.wall);
        m.min_not_committed = max(m.min_not_committed, floor);
        m.next_to_max_touched = max(m.next_to_max_touched, floor);
    }

    /// notify_commit moves `min_not_committed` over every committed instance.
    /// It returns the new `min_not_committed`.
    pub fn notify_commit(&self) -> InstanceId {
        let mut inner = self.inner.lock().unwrap();

        let mut mnc = inner.marks.min_not_committed;
        while mnc < inner.marks.next_to_max_touched {
            let slot = &inner.slots[(mnc % self.capacity) as usize];
            if slot.instance_id() != mnc || !slot.is_committed() {
                break;
            }
            mnc += 1;
        }

        inner.marks.min_not_committed = mnc;
        mnc
    }

    pub fn move_wall_to(&self, wall: InstanceId) {
        let mut inner = self.inner.lock().unwrap();
        inner.marks.wall = max(inner.marks.wall, wall);
        Self::raise_floor(&mut inner.marks);
    }

    pub fn move_last_snapshot_to(&self, last_snapshot: InstanceId) {
        let mut inner = self.inner.lock().unwrap();
        inner.marks.last_snapshot = max(inner.marks.last_snapshot, last_snapshot);
    }
}
