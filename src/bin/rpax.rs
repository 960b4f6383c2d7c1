use std::path::Path;
use std::sync::Arc;

use clap::{Arg, Command};

use rpax::setup::init_logger;
use rpax::{Server, ServerError};
use rpaxos::conf::ClusterInfo;
use rpaxos::types::HostId;
use storage::MemEngine;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let matches = Command::new("rpax")
        .version("0.1.0")
        .author("openacid")
        .about("ring paxos replication")
        .arg(
            Arg::new("cluster")
                .long("cluster")
                .takes_value(true)
                .required(true)
                .help("cluster config in yaml"),
        )
        .arg(
            Arg::new("id")
                .long("id")
                .takes_value(true)
                .required(true)
                .help("host id of this server. It must be one key of the cluster hosts"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .takes_value(true)
                .help("log file path, rpax.log in the working directory by default"),
        )
        .get_matches();

    let _guard = init_logger(matches.value_of("log").map(Path::new))?;

    // both are required, clap has rejected the command line otherwise
    let conf_path = matches.value_of("cluster").unwrap_or_default();
    let id = matches.value_of("id").unwrap_or_default();

    let host_id: HostId = id
        .parse()
        .map_err(|_| ServerError::InvalidArg(format!("host id: {}", id)))?;

    let cluster = ClusterInfo::from_file(conf_path)?;
    let engine = Arc::new(MemEngine::new()?);

    let mut server = Server::bind(cluster, host_id, engine).await?;
    server.start()?;

    tokio::signal::ctrl_c().await?;

    server.stop()?;
    server.join().await
}
