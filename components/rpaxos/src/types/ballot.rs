use super::{BallotId, HostId, INVALID_BALLOT};

/// Ballots are partitioned by their low 6 bits: the low bits of every ballot a host creates
/// are its host id. Thus two hosts never pick the same ballot, and host ids must be less
/// than `MAX_HOSTS`.
pub const BALLOT_HOST_BITS: u32 = 6;

pub const MAX_HOSTS: u64 = 1 << BALLOT_HOST_BITS;

/// MAX_BALLOT is the greatest ballot accepted from another host. Any host can still raise it:
/// `next_ballot_id(MAX_BALLOT, MAX_HOSTS - 1) == BallotId::MAX`.
pub const MAX_BALLOT: BallotId = BallotId::MAX - MAX_HOSTS;

/// next_ballot_id returns a ballot owned by `host_id` that is strictly greater than `old`.
///
/// The bucket part of `old` (`old - old % 64`) is moved one bucket up and the host id is
/// put into the low bits:
///
/// ```
/// use rpaxos::types::next_ballot_id;
///
/// assert_eq!(64 + 3, next_ballot_id(0, 3));
/// assert_eq!(128 + 3, next_ballot_id(64 + 5, 3));
/// ```
///
/// It saturates at `BallotId::MAX` for an `old` beyond `MAX_BALLOT`.
pub fn next_ballot_id(old: BallotId, host_id: HostId) -> BallotId {
    debug_assert!(host_id < MAX_HOSTS);
    (old - (old % MAX_HOSTS)).saturating_add(MAX_HOSTS + host_id)
}

/// first_ballot_id is the smallest ballot `host_id` ever uses.
pub fn first_ballot_id(host_id: HostId) -> BallotId {
    next_ballot_id(INVALID_BALLOT, host_id)
}

/// ballot_host returns the host that created ballot `b`.
pub fn ballot_host(b: BallotId) -> HostId {
    b % MAX_HOSTS
}
