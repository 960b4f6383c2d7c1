use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

mod memdb;

/// MemEngine is an in-memory engine: every column family is a BTreeMap so that next/prev
/// iterate in key order.
pub struct MemEngine {
    pub _db: Mutex<HashMap<&'static str, BTreeMap<Vec<u8>, Vec<u8>>>>,
}
