use std::sync::atomic::{AtomicU64, Ordering};

use super::HostId;

const SEQ_BITS: u32 = 56;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1;

/// GuidGenerator generates ids unique across hosts: the highest 8 bits are the host id and
/// the rest is a per-host sequence starting from 1.
/// A generated id is never 0, which is the invalid request/value id.
#[derive(Debug)]
pub struct GuidGenerator {
    prefix: u64,
    seq: AtomicU64,
}

impl GuidGenerator {
    pub fn new(host_id: HostId) -> Self {
        Self {
            prefix: host_id << SEQ_BITS,
            seq: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> u64 {
        loop {
            let s = self.seq.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & SEQ_MASK;
            let id = self.prefix | s;
            if id != 0 {
                return id;
            }
        }
    }
}

/// guid_host returns the host that generated `id`.
pub fn guid_host(id: u64) -> HostId {
    id >> SEQ_BITS
}

/// noop_guid is the id of the no-op value of a host. A generator hands it out only after 2^56
/// - 1 ids, so it is reserved.
pub fn noop_guid(host_id: HostId) -> u64 {
    (host_id << SEQ_BITS) | SEQ_MASK
}

pub fn is_noop_guid(id: u64) -> bool {
    id & SEQ_MASK == SEQ_MASK
}
