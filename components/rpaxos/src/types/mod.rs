//! Identifiers, ballots and values shared by every part of the ring protocol.

#[macro_use]
pub mod macros;

mod ballot;
mod guid;
mod value;

pub use ballot::*;
pub use guid::*;
pub use value::*;


#[cfg(test)]
mod test_guid;

#[cfg(test)]
mod test_value;

pub type InstanceId = u64;
pub type BallotId = u64;
pub type RequestId = u64;
pub type ValueId = u64;
pub type HostId = u64;
pub type RingId = u64;

/// Instance ids start from 0, thus the invalid instance id is the max one.
pub const INVALID_INSTANCE: InstanceId = InstanceId::MAX;

/// No ballot is ever 0: the first ballot a host uses is `first_ballot_id(host)`.
pub const INVALID_BALLOT: BallotId = 0;

pub const INVALID_REQUEST: RequestId = 0;

pub const INVALID_VALUE: ValueId = 0;

pub const INVALID_RING: RingId = 0;
