//! A self-describing value tree and the codec that puts it on the wire.

mod errors;
pub use errors::*;

#[macro_use]
mod logical;
pub use logical::*;

mod msgpack;
pub use msgpack::*;


/// Codec serializes a `LogicalValue` into bytes and back.
pub trait Codec: Send + Sync {
    fn encode(&self, v: &LogicalValue) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, buf: &[u8]) -> Result<LogicalValue, CodecError>;
}
