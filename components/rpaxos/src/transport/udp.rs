use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;

use crate::conf::Coordinator;
use crate::executor::{RingCommandHandler, StopSignal};
use crate::transport::{Chunker, DatagramSender, Reassembler, TransportError};
use crate::types::HostId;

const MAX_DATAGRAM: usize = 65536;

/// UdpSender sends datagram commands in chunks over a shared socket.
/// It never waits: a chunk the socket can not take now is lost.
pub struct UdpSender {
    socket: Arc<UdpSocket>,
    coordinator: Arc<dyn Coordinator>,
    chunker: Chunker,
}

impl UdpSender {
    pub fn new(socket: Arc<UdpSocket>, coordinator: Arc<dyn Coordinator>, chunk_size: usize) -> Self {
        UdpSender {
            socket,
            coordinator,
            chunker: Chunker::new(chunk_size),
        }
    }
}

impl DatagramSender for UdpSender {
    fn send_to(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError> {
        let host = self
            .coordinator
            .host_address(dst)
            .ok_or(TransportError::UnknownHost(dst))?;

        for c in self.chunker.split(&buf)? {
            self.socket.try_send_to(&c, host.udp_addr)?;
        }
        Ok(())
    }
}

/// serve_udp reassembles datagrams received on `socket` and hands them to `handler`, until
/// `stop`.
pub async fn serve_udp(
    socket: Arc<UdpSocket>,
    handler: RingCommandHandler,
    max_pending: usize,
    mut stop: StopSignal,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut chunks: Reassembler<SocketAddr> = Reassembler::new(max_pending);

    loop {
        let (n, peer) = tokio::select! {
            _ = stop.stopped() => return,
            r = socket.recv_from(&mut buf) => match r {
                Ok(x) => x,
                Err(e) => {
                    error!("receive datagram"; "err" => %e);
                    continue;
                }
            },
        };

        let msg = match chunks.push(peer, &buf[..n]) {
            Ok(Some(m)) => m,
            Ok(None) => continue,
            Err(e) => {
                warn!("drop datagram chunk"; "peer" => %peer, "err" => %e);
                continue;
            }
        };

        if let Err(e) = handler.handle_datagram(&msg) {
            warn!("drop datagram"; "peer" => %peer, "err" => %e);
        }
    }
}
