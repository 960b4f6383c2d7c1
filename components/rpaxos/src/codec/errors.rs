quick_error! {
    #[derive(Debug, PartialEq, Eq)]
    pub enum CodecError {
        Encode(msg: String) {
            display("encode error: {}", msg)
        }

        Decode(msg: String) {
            display("decode error: {}", msg)
        }
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        CodecError::Encode(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        CodecError::Decode(e.to_string())
    }
}
