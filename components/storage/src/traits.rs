use crate::StorageError;

/// DBColumnFamily defines several `table`:
/// Value stores committed values keyed by instance id.
/// Status stores watermarks, such as the last snapshotted instance id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DBColumnFamily {
    Value,
    Status,
}

impl From<&DBColumnFamily> for &str {
    fn from(cf: &DBColumnFamily) -> Self {
        match cf {
            DBColumnFamily::Value => return "value",
            DBColumnFamily::Status => return "status",
        }
    }
}

impl From<DBColumnFamily> for &str {
    fn from(cf: DBColumnFamily) -> Self {
        (&cf).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEntry {
    Nil,
    Set(DBColumnFamily, Vec<u8>, Vec<u8>),
    Delete(DBColumnFamily, Vec<u8>),
}

/// Base offer basic key-value access
pub trait Base: Send + Sync {
    /// set a new key-value
    fn set(&self, cf: DBColumnFamily, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// get an existing value with key
    fn get(&self, cf: DBColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// delete a key
    fn delete(&self, cf: DBColumnFamily, key: &[u8]) -> Result<(), StorageError>;

    /// write_batch applies all entries atomically: readers never observe a part of it.
    fn write_batch(&self, entrys: &Vec<WriteEntry>) -> Result<(), StorageError>;
}

pub fn make_status_key(name: &str) -> Vec<u8> {
    format!("/status/{}", name).into_bytes()
}

/// StatusEngine stores named u64 watermarks in the Status column family.
/// A status is only written along with the records it describes, see `status_entry`.
pub trait StatusEngine: Base {
    fn get_status(&self, name: &str) -> Result<Option<u64>, StorageError> {
        let val = self.get(DBColumnFamily::Status, &make_status_key(name))?;

        let val = match val {
            Some(v) => v,
            None => return Ok(None),
        };

        if val.len() != 8 {
            return Err(StorageError::BadStatus(name.into(), val.len()));
        }

        let mut buf = [0u8; 8];
        buf.copy_from_slice(&val);
        Ok(Some(u64::from_be_bytes(buf)))
    }

    /// status_entry builds a WriteEntry that sets a status, so that a status update can be
    /// written in the same batch with other records.
    fn status_entry(&self, name: &str, v: u64) -> WriteEntry {
        WriteEntry::Set(
            DBColumnFamily::Status,
            make_status_key(name),
            v.to_be_bytes().to_vec(),
        )
    }
}

impl<T: ?Sized> StatusEngine for T where T: Base {}
