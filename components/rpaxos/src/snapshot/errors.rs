use storage::StorageError;

use crate::codec::CodecError;
use crate::ring::ProtocolError;
use crate::types::InstanceId;

quick_error! {
    #[derive(Debug, PartialEq, Eq)]
    pub enum SnapshotError {
        Storage(e: StorageError) {
            from(e: StorageError) -> (e)
            display("storage: {}", e)
        }

        Codec(e: CodecError) {
            from(e: CodecError) -> (e)
            display("codec: {}", e)
        }

        BadValue(e: ProtocolError) {
            from(e: ProtocolError) -> (e)
            display("bad stored value: {}", e)
        }

        /// Instances must be snapshotted in order without gaps.
        OutOfOrder(expected: InstanceId, got: InstanceId) {
            display("expect instance {} to snapshot, got {}", expected, got)
        }

        /// A slot holds another instance than the one it is read for.
        SlotMismatch(expected: InstanceId, found: InstanceId) {
            display("slot of instance {} holds instance {}", expected, found)
        }
    }
}
