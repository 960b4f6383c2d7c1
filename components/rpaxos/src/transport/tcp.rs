use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::conf::Coordinator;
use crate::executor::{RingCommandHandler, StopSignal};
use crate::transport::{RingSender, TransportError};
use crate::types::HostId;

const RECONNECT_INTERVAL: Duration = Duration::from_millis(200);

/// TcpRingSender keeps an outbound TCP link to every host it sends to.
///
/// A link is a task that owns the connection and writes length-delimited frames in the order
/// they are sent. A broken connection is dialed again; frames written to it may be lost.
pub struct TcpRingSender {
    coordinator: Arc<dyn Coordinator>,
    links: Mutex<HashMap<HostId, mpsc::UnboundedSender<Bytes>>>,
    stop: StopSignal,
}

impl TcpRingSender {
    pub fn new(coordinator: Arc<dyn Coordinator>, stop: StopSignal) -> Self {
        TcpRingSender {
            coordinator,
            links: Mutex::new(HashMap::new()),
            stop,
        }
    }

    /// close drops every link. A link task quits once its queued frames are written.
    pub fn close(&self) {
        self.links.lock().unwrap().clear();
    }

    fn link(&self, dst: HostId) -> Result<mpsc::UnboundedSender<Bytes>, TransportError> {
        let mut links = self.links.lock().unwrap();

        if let Some(tx) = links.get(&dst) {
            if !tx.is_closed() {
                return Ok(tx.clone());
            }
        }

        let host = self
            .coordinator
            .host_address(dst)
            .ok_or(TransportError::UnknownHost(dst))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(link_loop(dst, host.ring_addr, rx, self.stop.clone()));

        links.insert(dst, tx.clone());
        Ok(tx)
    }
}

impl RingSender for TcpRingSender {
    fn send(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError> {
        self.link(dst)?
            .send(buf)
            .map_err(|_| TransportError::LinkClosed(dst))
    }
}

async fn link_loop(
    dst: HostId,
    addr: SocketAddr,
    mut rx: mpsc::UnboundedReceiver<Bytes>,
    mut stop: StopSignal,
) {
    loop {
        let r = tokio::select! {
            _ = stop.stopped() => return,
            r = TcpStream::connect(addr) => r,
        };

        let stream = match r {
            Ok(s) => s,
            Err(e) => {
                warn!("connect ring link"; "dst" => dst, "addr" => %addr, "err" => %e);
                tokio::select! {
                    _ = stop.stopped() => return,
                    _ = tokio::time::sleep(RECONNECT_INTERVAL) => {}
                }
                continue;
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("set nodelay"; "dst" => dst, "err" => %e);
        }

        info!("ring link connected"; "dst" => dst, "addr" => %addr);
        let mut framed = FramedWrite::new(stream, LengthDelimitedCodec::new());

        loop {
            let buf = tokio::select! {
                _ = stop.stopped() => return,
                b = rx.recv() => match b {
                    Some(b) => b,
                    None => return,
                },
            };

            if let Err(e) = framed.send(buf).await {
                error!("write ring link"; "dst" => dst, "err" => %e);
                break;
            }
        }
    }
}

/// serve_ring accepts ring links and hands every frame to `handler`, until `stop`.
/// A link that sends a malformed frame is closed.
pub async fn serve_ring(listener: TcpListener, handler: RingCommandHandler, mut stop: StopSignal) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = stop.stopped() => return,
            r = listener.accept() => match r {
                Ok(x) => x,
                Err(e) => {
                    error!("accept ring link"; "err" => %e);
                    continue;
                }
            },
        };

        info!("ring link accepted"; "peer" => %peer);

        let handler = handler.clone();
        let mut stop = stop.clone();

        tokio::spawn(async move {
            let mut reader = FramedRead::new(stream, LengthDelimitedCodec::new());

            loop {
                let frame = tokio::select! {
                    _ = stop.stopped() => return,
                    f = reader.next() => f,
                };

                let frame = match frame {
                    Some(Ok(f)) => f,
                    Some(Err(e)) => {
                        warn!("read ring link"; "peer" => %peer, "err" => %e);
                        return;
                    }
                    None => {
                        info!("ring link closed"; "peer" => %peer);
                        return;
                    }
                };

                if let Err(e) = handler.handle_ring(&frame).await {
                    warn!("close ring link on malformed command"; "peer" => %peer, "err" => %e);
                    return;
                }
            }
        });
    }
}
