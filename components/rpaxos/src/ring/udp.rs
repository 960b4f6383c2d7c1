use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::{Codec, LogicalValue};
use crate::ring::wire::*;
use crate::ring::ProtocolError;
use crate::types::*;

pub const UDP_PROPOSE: u64 = 1;
pub const UDP_COMMIT: u64 = 2;
pub const UDP_RECOVER: u64 = 3;
pub const UDP_RECOVERED: u64 = 4;

/// UdpCommand is sent from one host directly to another, out of the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UdpCommand {
    /// `[type, request_id, iid, ballot, value]`
    Propose {
        request_id: RequestId,
        instance_id: InstanceId,
        ballot_id: BallotId,
        value: Value,
    },

    /// `[type, iid, value_id]`
    Commit {
        instance_id: InstanceId,
        value_id: ValueId,
    },

    /// `[type, request_id, iid]`: ask for the committed value of an instance.
    Recover {
        request_id: RequestId,
        instance_id: InstanceId,
    },

    /// `[type, request_id, iid, value]`
    Recovered {
        request_id: RequestId,
        instance_id: InstanceId,
        value: Value,
    },
}

impl UdpCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UdpCommand::Propose { .. } => "propose",
            UdpCommand::Commit { .. } => "commit",
            UdpCommand::Recover { .. } => "recover",
            UdpCommand::Recovered { .. } => "recovered",
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        match self {
            UdpCommand::Propose { instance_id, .. }
            | UdpCommand::Commit { instance_id, .. }
            | UdpCommand::Recover { instance_id, .. }
            | UdpCommand::Recovered { instance_id, .. } => *instance_id,
        }
    }
}

impl fmt::Display for UdpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UdpCommand::Propose {
                request_id,
                instance_id,
                ballot_id,
                value,
            } => write!(
                f,
                "propose{{req:{:x}, iid:{}, ballot:{}, value:{}}}",
                request_id, instance_id, ballot_id, value
            ),
            UdpCommand::Commit {
                instance_id,
                value_id,
            } => write!(f, "commit{{iid:{}, value:{:x}}}", instance_id, value_id),
            UdpCommand::Recover {
                request_id,
                instance_id,
            } => write!(f, "recover{{req:{:x}, iid:{}}}", request_id, instance_id),
            UdpCommand::Recovered {
                request_id,
                instance_id,
                value,
            } => write!(
                f,
                "recovered{{req:{:x}, iid:{}, value:{}}}",
                request_id, instance_id, value
            ),
        }
    }
}

/// UdpCommandCodec converts point-to-point commands to and from bytes.
#[derive(Clone)]
pub struct UdpCommandCodec {
    codec: Arc<dyn Codec>,
}

impl UdpCommandCodec {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        UdpCommandCodec { codec }
    }

    pub fn encode(&self, cmd: &UdpCommand) -> Result<Bytes, ProtocolError> {
        let buf = self.codec.encode(&Self::to_logical(cmd))?;
        Ok(Bytes::from(buf))
    }

    pub fn decode(&self, buf: &[u8]) -> Result<UdpCommand, ProtocolError> {
        let v = self.codec.decode(buf)?;
        Self::from_logical(&v)
    }

    pub fn to_logical(cmd: &UdpCommand) -> LogicalValue {
        match cmd {
            UdpCommand::Propose {
                request_id,
                instance_id,
                ballot_id,
                value,
            } => lv_list![
                UDP_PROPOSE,
                *request_id,
                *instance_id,
                *ballot_id,
                value_to_logical(value)
            ],
            UdpCommand::Commit {
                instance_id,
                value_id,
            } => lv_list![UDP_COMMIT, *instance_id, *value_id],
            UdpCommand::Recover {
                request_id,
                instance_id,
            } => lv_list![UDP_RECOVER, *request_id, *instance_id],
            UdpCommand::Recovered {
                request_id,
                instance_id,
                value,
            } => lv_list![
                UDP_RECOVERED,
                *request_id,
                *instance_id,
                value_to_logical(value)
            ],
        }
    }

    pub fn from_logical(v: &LogicalValue) -> Result<UdpCommand, ProtocolError> {
        let l = v
            .as_list()
            .ok_or_else(|| malformed("udp_command", "expect list"))?;
        let t = match l.first() {
            Some(t) => expect_int(t, "type")?,
            None => return Err(malformed("udp_command", "empty")),
        };

        let cmd = match t {
            UDP_PROPOSE => {
                let l = expect_list(v, 5, "propose")?;
                UdpCommand::Propose {
                    request_id: expect_valid_int(&l[1], "request_id")?,
                    instance_id: expect_int(&l[2], "iid")?,
                    ballot_id: expect_valid_ballot(&l[3], "ballot")?,
                    value: value_from_logical(&l[4])?,
                }
            }
            UDP_COMMIT => {
                let l = expect_list(v, 3, "commit")?;
                UdpCommand::Commit {
                    instance_id: expect_int(&l[1], "iid")?,
                    value_id: expect_valid_int(&l[2], "value_id")?,
                }
            }
            UDP_RECOVER => {
                let l = expect_list(v, 3, "recover")?;
                UdpCommand::Recover {
                    request_id: expect_valid_int(&l[1], "request_id")?,
                    instance_id: expect_int(&l[2], "iid")?,
                }
            }
            UDP_RECOVERED => {
                let l = expect_list(v, 4, "recovered")?;
                UdpCommand::Recovered {
                    request_id: expect_valid_int(&l[1], "request_id")?,
                    instance_id: expect_int(&l[2], "iid")?,
                    value: value_from_logical(&l[3])?,
                }
            }
            _ => return Err(ProtocolError::UnknownType(t)),
        };

        Ok(cmd)
    }
}
