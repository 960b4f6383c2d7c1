//! The ring protocol: every executor has an acceptor role, run by every host, and a proposer
//! role, run by the master only.

mod context;
pub use context::*;

mod stop;
pub use stop::*;

mod phase1_batch;
pub use phase1_batch::*;

mod phase1;
pub use phase1::*;

mod phase2;
pub use phase2::*;

mod recovery;
pub use recovery::*;

mod delivery;
pub use delivery::*;

mod handler;
pub use handler::*;


#[cfg(test)]
mod test_phase1;
