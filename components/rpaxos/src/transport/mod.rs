//! Links between hosts: an ordered stream to the next host on the ring and datagrams to any
//! host.

use bytes::Bytes;

use crate::types::HostId;

mod errors;
pub use errors::*;

mod chunk;
pub use chunk::*;

mod local;
pub use local::*;

mod tcp;
pub use tcp::*;

mod udp;
pub use udp::*;

#[cfg(test)]
mod test_chunk;


/// RingSender sends encoded ring commands to a host, in order.
///
/// `send` does not wait for the delivery: a command lost with a broken link is recovered by
/// the protocol timeouts.
pub trait RingSender: Send + Sync {
    fn send(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError>;
}

/// DatagramSender sends an encoded datagram command to a host. It may be lost.
pub trait DatagramSender: Send + Sync {
    fn send_to(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError>;
}
