use std::net::AddrParseError;

use crate::types::{HostId, RingId};

quick_error! {
    /// ConfError is a fatal configuration error: the subsystem it belongs to does not start.
    #[derive(Debug)]
    pub enum ConfError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
            display("io error: {}", e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
            display("bad yaml: {}", e)
        }

        BadAddr(e: AddrParseError) {
            from(e: AddrParseError) -> (e)
            display("bad address: {}", e)
        }

        EmptyRing(ring_id: RingId) {
            display("ring {} has no host", ring_id)
        }

        InvalidRingId(ring_id: RingId) {
            display("invalid ring id: {}", ring_id)
        }

        OrphanHost(hid: HostId) {
            display("host {} on the ring is not declared", hid)
        }

        DupHost(hid: HostId) {
            display("host {} is on the ring more than once", hid)
        }

        HostIdTooLarge(hid: HostId) {
            display("host id {} must be less than 64", hid)
        }

        MasterNotOnRing(hid: HostId) {
            display("master {} is not on the ring", hid)
        }

        UnknownHost(hid: HostId) {
            display("unknown host: {}", hid)
        }

        InvalidParam(name: &'static str, v: u64) {
            display("invalid {}: {}", name, v)
        }
    }
}

impl PartialEq<ConfError> for ConfError {
    fn eq(&self, other: &ConfError) -> bool {
        match (self, other) {
            (Self::IOError(a), Self::IOError(b)) => a.kind() == b.kind(),
            (Self::BadYaml(_), Self::BadYaml(_)) => true,
            (Self::BadAddr(a), Self::BadAddr(b)) => a == b,
            (Self::EmptyRing(a), Self::EmptyRing(b)) => a == b,
            (Self::InvalidRingId(a), Self::InvalidRingId(b)) => a == b,
            (Self::OrphanHost(a), Self::OrphanHost(b)) => a == b,
            (Self::DupHost(a), Self::DupHost(b)) => a == b,
            (Self::HostIdTooLarge(a), Self::HostIdTooLarge(b)) => a == b,
            (Self::MasterNotOnRing(a), Self::MasterNotOnRing(b)) => a == b,
            (Self::UnknownHost(a), Self::UnknownHost(b)) => a == b,
            (Self::InvalidParam(a, x), Self::InvalidParam(b, y)) => a == b && x == y,
            _ => false,
        }
    }
}
