use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::executor::RingCommandHandler;
use crate::transport::{DatagramSender, RingSender, TransportError};
use crate::types::HostId;

struct Link {
    ring: mpsc::UnboundedSender<Bytes>,
    datagram: mpsc::UnboundedSender<Bytes>,
}

#[derive(Default)]
struct Inner {
    links: HashMap<HostId, Link>,

    /// Number of datagrams to a host to drop before delivering again.
    drops: HashMap<HostId, usize>,
}

/// LocalNet connects hosts running in one process.
///
/// Every registered host has an ordered ring link and a datagram link, each served by its own
/// task. Ring commands to a host are delivered in order. Datagrams can be dropped on purpose.
#[derive(Clone, Default)]
pub struct LocalNet {
    inner: Arc<Mutex<Inner>>,
}

impl LocalNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// register starts delivering to `host`, replacing a former registration.
    /// It must be called within a tokio runtime.
    pub fn register(&self, host: HostId, handler: RingCommandHandler) {
        let (ring_tx, mut ring_rx) = mpsc::unbounded_channel::<Bytes>();
        let (dgram_tx, mut dgram_rx) = mpsc::unbounded_channel::<Bytes>();

        let h = handler.clone();
        tokio::spawn(async move {
            while let Some(buf) = ring_rx.recv().await {
                if let Err(e) = h.handle_ring(&buf).await {
                    warn!("local ring command"; "host" => host, "err" => %e);
                }
            }
        });

        tokio::spawn(async move {
            while let Some(buf) = dgram_rx.recv().await {
                if let Err(e) = handler.handle_datagram(&buf) {
                    warn!("local datagram"; "host" => host, "err" => %e);
                }
            }
        });

        self.inner.lock().unwrap().links.insert(
            host,
            Link {
                ring: ring_tx,
                datagram: dgram_tx,
            },
        );
    }

    /// unregister disconnects `host`: everything sent to it from now on fails.
    pub fn unregister(&self, host: HostId) {
        self.inner.lock().unwrap().links.remove(&host);
    }

    /// drop_datagrams makes the next `n` datagrams to `host` get lost.
    pub fn drop_datagrams(&self, host: HostId, n: usize) {
        self.inner.lock().unwrap().drops.insert(host, n);
    }
}

impl RingSender for LocalNet {
    fn send(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError> {
        let inner = self.inner.lock().unwrap();
        let link = inner
            .links
            .get(&dst)
            .ok_or(TransportError::UnknownHost(dst))?;

        link.ring
            .send(buf)
            .map_err(|_| TransportError::LinkClosed(dst))
    }
}

impl DatagramSender for LocalNet {
    fn send_to(&self, dst: HostId, buf: Bytes) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(n) = inner.drops.get_mut(&dst) {
            if *n > 0 {
                *n -= 1;
                debug!("drop datagram on purpose"; "dst" => dst);
                return Ok(());
            }
        }

        let link = inner
            .links
            .get(&dst)
            .ok_or(TransportError::UnknownHost(dst))?;

        link.datagram
            .send(buf)
            .map_err(|_| TransportError::LinkClosed(dst))
    }
}
