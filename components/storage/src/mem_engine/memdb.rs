use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::{Base, DBColumnFamily, MemEngine, StorageError, WriteEntry};

type ColumnFamilies = HashMap<&'static str, BTreeMap<Vec<u8>, Vec<u8>>>;

impl MemEngine {
    pub fn new() -> Result<MemEngine, StorageError> {
        let db = HashMap::new();
        Ok(MemEngine {
            _db: Mutex::new(db),
        })
    }
}

fn apply(cfs: &mut ColumnFamilies, en: &WriteEntry) {
    match en {
        WriteEntry::Nil => {}
        WriteEntry::Set(cf, k, v) => {
            let bt = cfs.entry((*cf).into()).or_insert(BTreeMap::new());
            bt.insert(k.clone(), v.clone());
        }
        WriteEntry::Delete(cf, k) => {
            let bt = cfs.entry((*cf).into()).or_insert(BTreeMap::new());
            bt.remove(k);
        }
    }
}

impl Base for MemEngine {
    // lock().unwrap(): a poisoned lock means another thread panicked while writing.

    fn set(&self, cf: DBColumnFamily, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let mut cfs = self._db.lock().unwrap();
        apply(&mut cfs, &WriteEntry::Set(cf, key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn get(&self, cf: DBColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let cfs = self._db.lock().unwrap();
        let name: &str = cf.into();
        Ok(cfs.get(name).and_then(|bt| bt.get(key)).map(|x| x.clone()))
    }

    fn delete(&self, cf: DBColumnFamily, key: &[u8]) -> Result<(), StorageError> {
        let mut cfs = self._db.lock().unwrap();
        apply(&mut cfs, &WriteEntry::Delete(cf, key.to_vec()));
        Ok(())
    }

    fn write_batch(&self, entrys: &Vec<WriteEntry>) -> Result<(), StorageError> {
        let mut cfs = self._db.lock().unwrap();
        for en in entrys {
            apply(&mut cfs, en);
        }

        Ok(())
    }
}
