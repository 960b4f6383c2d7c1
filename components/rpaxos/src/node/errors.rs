use crate::conf::ConfError;
use crate::snapshot::SnapshotError;
use crate::types::HostId;

quick_error! {
    /// NodeError is why a node can not be built.
    #[derive(Debug)]
    pub enum NodeError {
        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
            display("conf: {}", e)
        }

        Snapshot(e: SnapshotError) {
            from(e: SnapshotError) -> (e)
            display("snapshot: {}", e)
        }

        UnknownHost(hid: HostId) {
            display("host {} is not declared in the cluster", hid)
        }

        AlreadyStarted {
            display("node already started")
        }
    }
}
