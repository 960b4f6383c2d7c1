use crate::codec::{Codec, CodecError, LogicalValue};

/// MsgPackCodec encodes with MessagePack: ints are uints, bytes are bins and lists are
/// arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn encode(&self, v: &LogicalValue) -> Result<Vec<u8>, CodecError> {
        Ok(rmp_serde::to_vec(v)?)
    }

    fn decode(&self, buf: &[u8]) -> Result<LogicalValue, CodecError> {
        Ok(rmp_serde::from_slice(buf)?)
    }
}
