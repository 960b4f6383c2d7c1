use rpaxos::conf::ConfError;
use rpaxos::NodeError;
use storage::StorageError;

quick_error! {
    /// Errors occur when running a server
    #[derive(Debug)]
    pub enum ServerError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
        }

        Conf(e: ConfError) {
            from(e: ConfError) -> (e)
            display("conf error: {}", e)
        }

        Storage(e: StorageError) {
            from(e: StorageError) -> (e)
            display("storage error: {}", e)
        }

        Node(e: NodeError) {
            from(e: NodeError) -> (e)
            display("node error: {}", e)
        }

        InvalidArg(msg: String) {
            display("invalid argument: {}", msg)
        }

        NotStarted {
            display("server not started")
        }

        AlreadyStarted {
            display("server already started")
        }
    }
}
