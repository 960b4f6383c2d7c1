#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;

use rpax::Server;
use rpaxos::conf::ClusterInfo;
use rpaxos::testutil;
use rpaxos::types::HostId;
use storage::MemEngine;

/// InProcCluster runs a server for every host of a cluster in this process, on loopback
/// addresses.
pub struct InProcCluster {
    pub cluster: ClusterInfo,
    pub servers: BTreeMap<HostId, Server>,
}

impl InProcCluster {
    /// start binds and starts `n` servers on a random port range.
    pub async fn start(n: u64) -> Self {
        Self::start_with(n, |_| {}).await
    }

    /// start_with lets `f` tune the cluster before the servers are started.
    pub async fn start_with<F: FnOnce(&mut ClusterInfo)>(n: u64, f: F) -> Self {
        let port_base: u16 = rand::thread_rng().gen_range(20000..40000);
        let mut cluster = testutil::new_cluster(n, port_base);
        f(&mut cluster);

        let mut servers = BTreeMap::new();
        for hid in cluster.hosts.keys() {
            let engine = Arc::new(MemEngine::new().unwrap());
            let mut server = Server::bind(cluster.clone(), *hid, engine).await.unwrap();
            server.start().unwrap();
            servers.insert(*hid, server);
        }

        InProcCluster { cluster, servers }
    }

    pub fn server(&self, hid: HostId) -> &Server {
        &self.servers[&hid]
    }

    pub async fn stop(&mut self) {
        for server in self.servers.values_mut() {
            server.stop().unwrap();
            server.join().await.unwrap();
        }
    }
}
