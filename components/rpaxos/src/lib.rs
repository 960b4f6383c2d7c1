//! Ring Paxos: hosts on a ring agree on a sequence of values. Ring commands travel hop by hop
//! from the master around the ring; proposals and commits go from the master to every host by
//! datagram.

#[macro_use]
extern crate quick_error;

extern crate slog;

#[macro_use]
extern crate slog_scope;

#[macro_use]
pub mod types;

#[macro_use]
pub mod codec;

pub mod acceptor;
pub mod conf;
pub mod executor;
pub mod learner;
pub mod node;
pub mod proposer;
pub mod queue;
pub mod ring;
pub mod snapshot;
pub mod testutil;
pub mod transport;

pub use node::{Node, NodeError};
