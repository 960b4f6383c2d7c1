use crate::codec::CodecError;

quick_error! {
    /// ProtocolError is a message that can not be decoded or is not well formed.
    /// Such a message is dropped as a whole.
    #[derive(Debug, PartialEq, Eq)]
    pub enum ProtocolError {
        Codec(e: CodecError) {
            from(e: CodecError) -> (e)
            display("codec: {}", e)
        }

        UnknownType(t: u64) {
            display("unknown command type: {}", t)
        }

        Malformed(field: &'static str, reason: String) {
            display("malformed {}: {}", field, reason)
        }
    }
}
