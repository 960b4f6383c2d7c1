//! Commands that travel around the ring or between two hosts, and the ring they travel on.

mod errors;
pub use errors::*;

mod wire;
pub use wire::*;

mod command;
pub use command::*;

mod udp;
pub use udp::*;

mod topology;
pub use topology::*;
