use std::sync::Arc;

use storage::{Base, DBColumnFamily, StatusEngine, WriteEntry};

use crate::codec::Codec;
use crate::ring::{value_from_logical, value_to_logical};
use crate::snapshot::SnapshotError;
use crate::types::*;

pub const LAST_SNAPSHOT: &str = "last_snapshot";

pub fn make_value_key(iid: InstanceId) -> Vec<u8> {
    format!("/value/{:016x}", iid).into_bytes()
}

/// SnapshotStore persists committed values in instance order.
///
/// The status `last_snapshot` is the instance after the last one persisted: every instance
/// before it is in the store.
pub struct SnapshotStore {
    engine: Arc<dyn Base>,
    codec: Arc<dyn Codec>,
}

impl SnapshotStore {
    pub fn new(engine: Arc<dyn Base>, codec: Arc<dyn Codec>) -> Self {
        SnapshotStore { engine, codec }
    }

    pub fn last_snapshot(&self) -> Result<InstanceId, SnapshotError> {
        let v = self.engine.get_status(LAST_SNAPSHOT)?;
        Ok(v.unwrap_or(0))
    }

    /// persist writes values of consecutive instances starting at `last_snapshot` and moves
    /// `last_snapshot` past them, atomically.
    /// It returns the new `last_snapshot`.
    pub fn persist(&self, values: &[(InstanceId, Value)]) -> Result<InstanceId, SnapshotError> {
        let mut next = self.last_snapshot()?;

        let mut entries = Vec::with_capacity(values.len() + 1);
        for (iid, v) in values.iter() {
            if *iid != next {
                return Err(SnapshotError::OutOfOrder(next, *iid));
            }

            let buf = self.codec.encode(&value_to_logical(v))?;
            entries.push(WriteEntry::Set(
                DBColumnFamily::Value,
                make_value_key(*iid),
                buf,
            ));
            next += 1;
        }

        entries.push(self.engine.status_entry(LAST_SNAPSHOT, next));
        self.engine.write_batch(&entries)?;

        Ok(next)
    }

    pub fn get(&self, iid: InstanceId) -> Result<Option<Value>, SnapshotError> {
        let buf = self.engine.get(DBColumnFamily::Value, &make_value_key(iid))?;

        let buf = match buf {
            Some(b) => b,
            None => return Ok(None),
        };

        let lv = self.codec.decode(&buf)?;
        Ok(Some(value_from_logical(&lv)?))
    }
}
