use std::sync::Arc;

use rpaxos::conf::{ClusterInfo, Coordinator, StaticCoordinator};
use rpaxos::executor::StopSignal;
use rpaxos::transport::{serve_ring, serve_udp, TcpRingSender, UdpSender};
use rpaxos::types::HostId;
use rpaxos::Node;
use storage::Base;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ServerError;

/// Server runs one host of a ring over the network: it listens for ring links on `ring_addr`
/// and for datagrams on `udp_addr` of the host.
pub struct Server {
    host_id: HostId,
    node: Node,
    coordinator: Arc<StaticCoordinator>,
    ring_tx: Arc<TcpRingSender>,
    listener: Option<TcpListener>,
    socket: Arc<UdpSocket>,
    max_pending: usize,
    stop_tx: watch::Sender<bool>,
    stop: StopSignal,
    handles: Vec<JoinHandle<()>>,
}

impl Server {
    /// bind creates the node of `host_id` and binds both of its addresses. Nothing is served
    /// until `start`.
    pub async fn bind(
        cluster: ClusterInfo,
        host_id: HostId,
        engine: Arc<dyn Base>,
    ) -> Result<Server, ServerError> {
        let host = cluster
            .get_host(host_id)
            .cloned()
            .ok_or_else(|| ServerError::InvalidArg(format!("host {} not in cluster", host_id)))?;

        let conf = cluster.paxos.clone();
        let coordinator = Arc::new(StaticCoordinator::new(cluster));
        let (stop_tx, stop) = StopSignal::new();

        let listener = TcpListener::bind(host.ring_addr).await?;
        let socket = Arc::new(UdpSocket::bind(host.udp_addr).await?);

        let ring_tx = Arc::new(TcpRingSender::new(
            coordinator.clone() as Arc<dyn Coordinator>,
            stop.clone(),
        ));
        let udp_tx = Arc::new(UdpSender::new(
            socket.clone(),
            coordinator.clone() as Arc<dyn Coordinator>,
            conf.chunk_size,
        ));

        let max_pending = conf.queue_size;
        let node = Node::new(
            host_id,
            coordinator.clone() as Arc<dyn Coordinator>,
            conf,
            engine,
            ring_tx.clone(),
            udp_tx,
        )?;

        info!("server bound"; "host_id" => host_id, "ring_addr" => %host.ring_addr, "udp_addr" => %host.udp_addr);

        Ok(Server {
            host_id,
            node,
            coordinator,
            ring_tx,
            listener: Some(listener),
            socket,
            max_pending,
            stop_tx,
            stop,
            handles: vec![],
        })
    }

    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// coordinator is where a new ring is published to this server.
    pub fn coordinator(&self) -> &Arc<StaticCoordinator> {
        &self.coordinator
    }

    /// start serves both addresses and starts the node.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let listener = self.listener.take().ok_or(ServerError::AlreadyStarted)?;

        let handler = self.node.handler();
        self.handles.push(tokio::spawn(serve_ring(
            listener,
            handler.clone(),
            self.stop.clone(),
        )));
        self.handles.push(tokio::spawn(serve_udp(
            self.socket.clone(),
            handler,
            self.max_pending,
            self.stop.clone(),
        )));

        self.node.start()?;

        info!("server started"; "host_id" => self.host_id);
        Ok(())
    }

    /// stop signals the node and both listeners to quit.
    pub fn stop(&self) -> Result<(), ServerError> {
        if self.handles.is_empty() {
            return Err(ServerError::NotStarted);
        }

        let _ = self.stop_tx.send(true);
        self.ring_tx.close();
        self.node.stop();
        Ok(())
    }

    /// join waits for every task of the server to quit.
    pub async fn join(&mut self) -> Result<(), ServerError> {
        if self.handles.is_empty() {
            return Err(ServerError::NotStarted);
        }

        let host_id = self.host_id;
        for h in std::mem::take(&mut self.handles) {
            if let Err(e) = h.await {
                error!("server task"; "host_id" => host_id, "err" => %e);
            }
        }
        self.node.join().await;

        info!("server stopped"; "host_id" => self.host_id);
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}
