use std::fmt;

use bytes::Bytes;

use super::{is_noop_guid, noop_guid, HostId, ValueId, INVALID_VALUE};

/// Value is what a proposer tries to get chosen for an instance.
/// It is immutable once built; cloning it only bumps the payload's reference count.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Value {
    value_id: ValueId,
    payload: Bytes,
}

impl Value {
    pub fn new(value_id: ValueId, payload: impl Into<Bytes>) -> Self {
        Value {
            value_id,
            payload: payload.into(),
        }
    }

    /// invalid returns the empty value an instance holds before any proposal is accepted.
    pub fn invalid() -> Self {
        Value {
            value_id: INVALID_VALUE,
            payload: Bytes::new(),
        }
    }

    /// noop returns the value a master fills an instance with when no client value is
    /// coming. It is never delivered.
    pub fn noop(host_id: HostId) -> Self {
        Value {
            value_id: noop_guid(host_id),
            payload: Bytes::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        is_noop_guid(self.value_id)
    }

    pub fn value_id(&self) -> ValueId {
        self.value_id
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn is_valid(&self) -> bool {
        self.value_id != INVALID_VALUE
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::invalid()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value{{id:{:x}, len:{}}}", self.value_id, self.payload.len())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.value_id)
    }
}

impl From<(ValueId, &str)> for Value {
    fn from(t: (ValueId, &str)) -> Value {
        Value::new(t.0, Bytes::copy_from_slice(t.1.as_bytes()))
    }
}

impl From<(ValueId, Vec<u8>)> for Value {
    fn from(t: (ValueId, Vec<u8>)) -> Value {
        Value::new(t.0, t.1)
    }
}
