use std::fmt;
use std::sync::Mutex;

use crate::types::*;

/// PendingVote is a vote that arrived before the proposal it votes for.
/// It is replayed once the matching proposal lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVote {
    pub request_id: RequestId,
    pub ring_id: RingId,
    pub ballot_id: BallotId,
    pub value_id: ValueId,
}

/// PromiseReply is the outcome of a phase-1 promise on one instance.
///
/// On rejection `last_proposal` is always None and `highest_promised` is the ballot that
/// beat the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromiseReply {
    pub ok: bool,
    pub highest_promised: BallotId,
    pub highest_proposed: BallotId,
    pub last_proposal: Option<Value>,
}

#[derive(Debug)]
struct State {
    highest_promised: BallotId,
    highest_proposed: BallotId,
    last_proposal: Value,
    committed: bool,
    pending_vote: Option<PendingVote>,
}

/// AcceptorInstance is the acceptor state of a single instance.
///
/// Every transition takes the lock of this instance only; instances never share a lock.
/// It is shared with `Arc` because several protocol steps on the same instance id may hold
/// it at the same time.
pub struct AcceptorInstance {
    instance_id: InstanceId,
    state: Mutex<State>,
}

impl AcceptorInstance {
    pub fn new(instance_id: InstanceId) -> Self {
        AcceptorInstance {
            instance_id,
            state: Mutex::new(State {
                highest_promised: INVALID_BALLOT,
                highest_proposed: INVALID_BALLOT,
                last_proposal: Value::invalid(),
                committed: false,
                pending_vote: None,
            }),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// promise handles a phase-1 request.
    ///
    /// A ballot not greater than the promised one is rejected without any change.
    /// Otherwise the ballot is promised and the accepted proposal, if any, is returned so that
    /// the proposer re-proposes it.
    pub fn promise(&self, ballot: BallotId) -> PromiseReply {
        let mut st = self.state.lock().unwrap();

        if ballot <= st.highest_promised {
            return PromiseReply {
                ok: false,
                highest_promised: st.highest_promised,
                highest_proposed: st.highest_proposed,
                last_proposal: None,
            };
        }

        st.highest_promised = ballot;

        let last_proposal = if st.highest_proposed != INVALID_BALLOT {
            Some(st.last_proposal.clone())
        } else {
            None
        };

        PromiseReply {
            ok: true,
            highest_promised: ballot,
            highest_proposed: st.highest_proposed,
            last_proposal,
        }
    }

    /// propose records `value` as the accepted proposal of `ballot`.
    ///
    /// It is rejected if a higher ballot has been promised since. A committed instance keeps
    /// its value and only reports whether the proposal agrees with it.
    pub fn propose(&self, ballot: BallotId, value: Value) -> bool {
        let mut st = self.state.lock().unwrap();

        if ballot < st.highest_promised {
            return false;
        }

        if st.committed {
            return st.last_proposal.value_id() == value.value_id();
        }

        if ballot >= st.highest_proposed {
            st.highest_proposed = ballot;
            st.last_proposal = value;
        }

        true
    }

    /// vote succeeds only if `ballot` is still the highest promised one and the proposal
    /// accepted at `ballot` is `value_id`.
    ///
    /// A vote that does not succeed is kept as the pending vote: it usually means the
    /// proposal has not arrived yet.
    pub fn vote(
        &self,
        request_id: RequestId,
        ring_id: RingId,
        ballot: BallotId,
        value_id: ValueId,
    ) -> bool {
        let mut st = self.state.lock().unwrap();

        if Self::votable(&st, ballot, value_id) {
            return true;
        }

        st.pending_vote = Some(PendingVote {
            request_id,
            ring_id,
            ballot_id: ballot,
            value_id,
        });

        false
    }

    /// commit marks the instance committed if the accepted value is `value_id`.
    /// A mismatch means this acceptor never saw the chosen proposal and must recover it.
    pub fn commit(&self, value_id: ValueId) -> bool {
        let mut st = self.state.lock().unwrap();

        if !st.last_proposal.is_valid() || st.last_proposal.value_id() != value_id {
            return false;
        }

        st.committed = true;
        st.pending_vote = None;
        true
    }

    /// learn installs a value known to be committed by other hosts.
    /// It returns false if this instance already committed a different value.
    pub fn learn(&self, value: Value) -> bool {
        let mut st = self.state.lock().unwrap();

        if st.committed {
            return st.last_proposal.value_id() == value.value_id();
        }

        st.last_proposal = value;
        st.committed = true;
        st.pending_vote = None;
        true
    }

    /// pending_vote_ready returns the buffered vote once it can succeed.
    ///
    /// A buffered vote whose ballot is below the promised ballot can never succeed and is
    /// dropped. A vote waiting for a proposal that has not arrived stays buffered.
    pub fn pending_vote_ready(&self) -> Option<PendingVote> {
        let mut st = self.state.lock().unwrap();

        let pv = st.pending_vote?;

        if pv.ballot_id < st.highest_promised {
            st.pending_vote = None;
            return None;
        }

        if Self::votable(&st, pv.ballot_id, pv.value_id) {
            st.pending_vote = None;
            return Some(pv);
        }

        None
    }

    fn votable(st: &State, ballot: BallotId, value_id: ValueId) -> bool {
        ballot >= st.highest_promised
            && ballot == st.highest_proposed
            && st.last_proposal.is_valid()
            && st.last_proposal.value_id() == value_id
    }

    pub fn is_committed(&self) -> bool {
        self.state.lock().unwrap().committed
    }

    pub fn committed_value(&self) -> Option<Value> {
        let st = self.state.lock().unwrap();
        if st.committed {
            Some(st.last_proposal.clone())
        } else {
            None
        }
    }

    pub fn highest_promised(&self) -> BallotId {
        self.state.lock().unwrap().highest_promised
    }

    pub fn highest_proposed(&self) -> BallotId {
        self.state.lock().unwrap().highest_proposed
    }

    pub fn last_proposal(&self) -> Value {
        self.state.lock().unwrap().last_proposal.clone()
    }
}

impl fmt::Debug for AcceptorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.lock().unwrap();
        write!(
            f,
            "AcceptorInstance{{iid:{}, promised:{}, proposed:{}, value:{}, committed:{}, pending:{:?}}}",
            self.instance_id,
            st.highest_promised,
            st.highest_proposed,
            st.last_proposal,
            st.committed,
            st.pending_vote
        )
    }
}
