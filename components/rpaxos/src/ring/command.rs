use std::cmp::{max, Ordering};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::acceptor::PromiseReply;
use crate::codec::{Codec, LogicalValue};
use crate::ring::wire::*;
use crate::ring::ProtocolError;
use crate::types::*;

pub const CMD_BATCH: u64 = 1;
pub const CMD_PROMISE: u64 = 2;
pub const CMD_VOTE: u64 = 3;

/// Header routes a ring command: it is only handled by `dst_host_id` on ring `ring_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub request_id: RequestId,
    pub ring_id: RingId,
    pub dst_host_id: HostId,
}

/// BatchFail is an instance of a batch that could not be prepared on some host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFail {
    pub instance_id: InstanceId,
    pub highest_promised: BallotId,
}

/// Batch prepares every instance in `[start, end)` with `ballot_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub start: InstanceId,
    pub end: InstanceId,
    pub ballot_id: BallotId,

    /// Sorted by instance id.
    pub fails: Vec<BatchFail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PromiseStatus {
    Ok = 0,
    Rejected = 1,

    /// Some host has the instance committed.
    Committed = 2,
}

impl PromiseStatus {
    pub fn from_u64(s: u64) -> Option<Self> {
        match s {
            0 => Some(PromiseStatus::Ok),
            1 => Some(PromiseStatus::Rejected),
            2 => Some(PromiseStatus::Committed),
            _ => None,
        }
    }
}

/// PromiseFail carries what the proposer must know if some host did not simply promise:
/// the highest ballot promised and the proposal accepted with the highest ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseFail {
    pub highest_promised: BallotId,
    pub highest_proposed: BallotId,
    pub last_proposal: Option<Value>,
}

/// Promise prepares a single instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promise {
    pub instance_id: InstanceId,
    pub ballot_id: BallotId,
    pub status: PromiseStatus,
    pub fail: Option<PromiseFail>,
}

impl Promise {
    pub fn new(instance_id: InstanceId, ballot_id: BallotId) -> Self {
        Promise {
            instance_id,
            ballot_id,
            status: PromiseStatus::Ok,
            fail: None,
        }
    }

    /// add_reply merges the promise reply of one more host.
    pub fn add_reply(&mut self, r: &PromiseReply) {
        if r.ok && r.last_proposal.is_none() {
            return;
        }

        if !r.ok {
            self.status = max(self.status, PromiseStatus::Rejected);
        }

        let f = self.fail.get_or_insert(PromiseFail {
            highest_promised: INVALID_BALLOT,
            highest_proposed: INVALID_BALLOT,
            last_proposal: None,
        });

        f.highest_promised = max(f.highest_promised, r.highest_promised);

        if r.last_proposal.is_some() && r.highest_proposed > f.highest_proposed {
            f.highest_proposed = r.highest_proposed;
            f.last_proposal = r.last_proposal.clone();
        }
    }

    /// add_committed records that a host has the instance committed, with `value` if the host
    /// still has it. A committed value overrides any accepted proposal.
    pub fn add_committed(&mut self, value: Option<Value>) {
        self.status = PromiseStatus::Committed;

        let f = self.fail.get_or_insert(PromiseFail {
            highest_promised: INVALID_BALLOT,
            highest_proposed: INVALID_BALLOT,
            last_proposal: None,
        });

        if value.is_some() && f.highest_proposed != BallotId::MAX {
            f.highest_proposed = BallotId::MAX;
            f.last_proposal = value;
        }
    }
}

/// Vote is the phase-2 vote of `value_id` at `ballot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    pub instance_id: InstanceId,
    pub ballot_id: BallotId,
    pub value_id: ValueId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Batch(Batch),
    Promise(Promise),
    Vote(Vote),
}

/// RingCommand is a command forwarded hop by hop around the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingCommand {
    pub header: Header,
    pub body: Body,
}

impl RingCommand {
    pub fn cmd_type(&self) -> u64 {
        match self.body {
            Body::Batch(_) => CMD_BATCH,
            Body::Promise(_) => CMD_PROMISE,
            Body::Vote(_) => CMD_VOTE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.body {
            Body::Batch(_) => "batch",
            Body::Promise(_) => "promise",
            Body::Vote(_) => "vote",
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.header.request_id
    }
}

impl fmt::Display for RingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(
            f,
            "{}{{req:{:x}, ring:{}, dst:{}, ",
            self.name(),
            h.request_id,
            h.ring_id,
            h.dst_host_id
        )?;

        match &self.body {
            Body::Batch(b) => write!(
                f,
                "[{}, {}) ballot:{} fails:{}}}",
                b.start,
                b.end,
                b.ballot_id,
                b.fails.len()
            ),
            Body::Promise(p) => write!(
                f,
                "iid:{} ballot:{} status:{:?}}}",
                p.instance_id, p.ballot_id, p.status
            ),
            Body::Vote(v) => write!(
                f,
                "iid:{} ballot:{} value:{:x}}}",
                v.instance_id, v.ballot_id, v.value_id
            ),
        }
    }
}

/// merge_fails merges two fail lists sorted by instance id into one.
/// For an instance in both lists the greater `highest_promised` is kept.
pub fn merge_fails(local: &[BatchFail], received: &[BatchFail]) -> Vec<BatchFail> {
    let mut merged = Vec::with_capacity(local.len() + received.len());
    let (mut i, mut j) = (0, 0);

    while i < local.len() && j < received.len() {
        let (a, b) = (local[i], received[j]);
        match a.instance_id.cmp(&b.instance_id) {
            Ordering::Less => {
                merged.push(a);
                i += 1;
            }
            Ordering::Greater => {
                merged.push(b);
                j += 1;
            }
            Ordering::Equal => {
                merged.push(BatchFail {
                    instance_id: a.instance_id,
                    highest_promised: max(a.highest_promised, b.highest_promised),
                });
                i += 1;
                j += 1;
            }
        }
    }

    merged.extend_from_slice(&local[i..]);
    merged.extend_from_slice(&received[j..]);
    merged
}

/// RingCommandCodec converts ring commands to and from bytes.
///
/// On the wire a command is `[type, [request_id, ring_id, dst_host_id], body]`:
///
/// - batch: `[start, end, ballot, [[iid, highest_promised], ...]]`
/// - promise: `[iid, ballot, status, nil | [highest_promised, highest_proposed, nil | value]]`
/// - vote: `[iid, ballot, value_id]`
///
/// Decoding validates the whole structure: a command is either complete and well formed or
/// rejected.
#[derive(Clone)]
pub struct RingCommandCodec {
    codec: Arc<dyn Codec>,
}

impl RingCommandCodec {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        RingCommandCodec { codec }
    }

    pub fn encode(&self, cmd: &RingCommand) -> Result<Bytes, ProtocolError> {
        let buf = self.codec.encode(&Self::to_logical(cmd))?;
        Ok(Bytes::from(buf))
    }

    pub fn decode(&self, buf: &[u8]) -> Result<RingCommand, ProtocolError> {
        let v = self.codec.decode(buf)?;
        Self::from_logical(&v)
    }

    pub fn to_logical(cmd: &RingCommand) -> LogicalValue {
        let h = &cmd.header;
        let header = lv_list![h.request_id, h.ring_id, h.dst_host_id];

        let body = match &cmd.body {
            Body::Batch(b) => {
                let fails: Vec<LogicalValue> = b
                    .fails
                    .iter()
                    .map(|f| lv_list![f.instance_id, f.highest_promised])
                    .collect();
                lv_list![b.start, b.end, b.ballot_id, fails]
            }
            Body::Promise(p) => {
                let fail = p.fail.as_ref().map(|f| {
                    lv_list![
                        f.highest_promised,
                        f.highest_proposed,
                        f.last_proposal.as_ref().map(value_to_logical)
                    ]
                });
                lv_list![p.instance_id, p.ballot_id, p.status as u64, fail]
            }
            Body::Vote(v) => lv_list![v.instance_id, v.ballot_id, v.value_id],
        };

        lv_list![cmd.cmd_type(), header, body]
    }

    pub fn from_logical(v: &LogicalValue) -> Result<RingCommand, ProtocolError> {
        let l = expect_list(v, 3, "command")?;
        let t = expect_int(&l[0], "type")?;

        let h = expect_list(&l[1], 3, "header")?;
        let header = Header {
            request_id: expect_valid_int(&h[0], "request_id")?,
            ring_id: expect_valid_int(&h[1], "ring_id")?,
            dst_host_id: expect_int(&h[2], "dst_host_id")?,
        };

        let body = match t {
            CMD_BATCH => Body::Batch(Self::batch_from_logical(&l[2])?),
            CMD_PROMISE => Body::Promise(Self::promise_from_logical(&l[2])?),
            CMD_VOTE => Body::Vote(Self::vote_from_logical(&l[2])?),
            _ => return Err(ProtocolError::UnknownType(t)),
        };

        Ok(RingCommand { header, body })
    }

    fn batch_from_logical(v: &LogicalValue) -> Result<Batch, ProtocolError> {
        let l = expect_list(v, 4, "batch")?;

        let start = expect_int(&l[0], "start")?;
        let end = expect_int(&l[1], "end")?;
        let ballot_id = expect_valid_ballot(&l[2], "ballot")?;

        if start > end {
            return Err(malformed("batch", format!("start {} > end {}", start, end)));
        }

        let fl = l[3]
            .as_list()
            .ok_or_else(|| malformed("fails", "expect list"))?;

        let mut fails: Vec<BatchFail> = Vec::with_capacity(fl.len());
        for f in fl.iter() {
            let pair = expect_list(f, 2, "fail")?;
            let fail = BatchFail {
                instance_id: expect_int(&pair[0], "fail_iid")?,
                highest_promised: expect_ballot(&pair[1], "fail_highest_promised")?,
            };

            if fail.instance_id < start || fail.instance_id >= end {
                return Err(malformed(
                    "fails",
                    format!("{} out of [{}, {})", fail.instance_id, start, end),
                ));
            }

            if let Some(last) = fails.last() {
                if last.instance_id >= fail.instance_id {
                    return Err(malformed("fails", "not sorted by instance id"));
                }
            }

            fails.push(fail);
        }

        Ok(Batch {
            start,
            end,
            ballot_id,
            fails,
        })
    }

    fn promise_from_logical(v: &LogicalValue) -> Result<Promise, ProtocolError> {
        let l = expect_list(v, 4, "promise")?;

        let instance_id = expect_int(&l[0], "iid")?;
        let ballot_id = expect_valid_ballot(&l[1], "ballot")?;
        let s = expect_int(&l[2], "status")?;
        let status = PromiseStatus::from_u64(s)
            .ok_or_else(|| malformed("status", format!("unknown status {}", s)))?;

        let fail = if l[3].is_nil() {
            None
        } else {
            let fl = expect_list(&l[3], 3, "promise_fail")?;
            let last_proposal = if fl[2].is_nil() {
                None
            } else {
                Some(value_from_logical(&fl[2])?)
            };

            Some(PromiseFail {
                highest_promised: expect_ballot(&fl[0], "highest_promised")?,
                highest_proposed: expect_int(&fl[1], "highest_proposed")?,
                last_proposal,
            })
        };

        if status != PromiseStatus::Ok && fail.is_none() {
            return Err(malformed("promise", format!("status {:?} without fail", status)));
        }

        Ok(Promise {
            instance_id,
            ballot_id,
            status,
            fail,
        })
    }

    fn vote_from_logical(v: &LogicalValue) -> Result<Vote, ProtocolError> {
        let l = expect_list(v, 3, "vote")?;

        Ok(Vote {
            instance_id: expect_int(&l[0], "iid")?,
            ballot_id: expect_valid_ballot(&l[1], "ballot")?,
            value_id: expect_valid_int(&l[2], "value_id")?,
        })
    }
}
