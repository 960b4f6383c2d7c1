use crate::types::HostId;

quick_error! {
    /// TransportError is a failure of the link to another host.
    #[derive(Debug)]
    pub enum TransportError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
        }

        UnknownHost(hid: HostId) {
            display("no address for host {}", hid)
        }

        LinkClosed(hid: HostId) {
            display("link to host {} is closed", hid)
        }

        BadChunk(reason: String) {
            display("bad datagram chunk: {}", reason)
        }
    }
}
