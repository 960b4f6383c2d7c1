use crate::Base;
use crate::DBColumnFamily;
use crate::StatusEngine;
use crate::StorageError;
use crate::WriteEntry;

use pretty_assertions::assert_eq;

pub fn test_base_trait(eng: &dyn Base) {
    let none = eng
        .get(DBColumnFamily::Value, &"init".as_bytes().to_vec())
        .unwrap();
    assert_eq!(none, None);

    let r = eng.delete(DBColumnFamily::Value, &"init".as_bytes().to_vec());
    assert!(r.is_ok());

    let kvs = vec![
        ("k0".as_bytes().to_vec(), "v0".as_bytes().to_vec()),
        ("k1".as_bytes().to_vec(), "v1".as_bytes().to_vec()),
        ("k2".as_bytes().to_vec(), "v2".as_bytes().to_vec()),
        ("k3".as_bytes().to_vec(), "v3".as_bytes().to_vec()),
    ];

    for (k, v) in kvs.iter() {
        eng.set(DBColumnFamily::Status, k, v).unwrap();
    }

    let r = eng.get(DBColumnFamily::Value, &kvs[0].0).unwrap();
    assert_eq!(None, r);
    let r = eng.get(DBColumnFamily::Status, &kvs[0].0).unwrap();
    assert_eq!(r, Some(kvs[0].1.clone()));

    let r = eng.get(DBColumnFamily::Status, &kvs[3].0).unwrap();
    assert_eq!(r, Some(kvs[3].1.clone()));

    eng.delete(DBColumnFamily::Status, &kvs[0].0).unwrap();
    let r = eng.get(DBColumnFamily::Status, &kvs[0].0).unwrap();
    assert!(r.is_none());

    let k1 = "k1".as_bytes().to_vec();
    let k2 = "k2".as_bytes().to_vec();
    let v1 = "v1".as_bytes().to_vec();
    let v2 = "v2".as_bytes().to_vec();

    let cmds = vec![
        WriteEntry::Set(DBColumnFamily::Value, k1.clone(), v1.clone()),
        WriteEntry::Set(DBColumnFamily::Status, k2.clone(), v2.clone()),
    ];

    eng.write_batch(&cmds).unwrap();
    assert_eq!(
        v1.clone(),
        eng.get(DBColumnFamily::Value, &k1).unwrap().unwrap()
    );
    assert_eq!(
        v2.clone(),
        eng.get(DBColumnFamily::Status, &k2).unwrap().unwrap()
    );

    let cmds = vec![
        WriteEntry::Set(DBColumnFamily::Value, k1.clone(), v1.clone()),
        WriteEntry::Delete(DBColumnFamily::Value, k1.clone()),
    ];

    eng.write_batch(&cmds).unwrap();
    assert_eq!(None, eng.get(DBColumnFamily::Value, &k1).unwrap());
}

pub fn test_status_trait(eng: &dyn Base) {
    assert_eq!(None, eng.get_status("last_snapshot").unwrap());

    eng.set(DBColumnFamily::Status, b"/status/last_snapshot", &10u64.to_be_bytes())
        .unwrap();
    assert_eq!(Some(10), eng.get_status("last_snapshot").unwrap());

    let ent = eng.status_entry("last_snapshot", 12);
    eng.write_batch(&vec![ent]).unwrap();
    assert_eq!(Some(12), eng.get_status("last_snapshot").unwrap());

    eng.set(DBColumnFamily::Status, b"/status/broken", b"abc")
        .unwrap();
    assert_eq!(
        Err(StorageError::BadStatus("broken".into(), 3)),
        eng.get_status("broken")
    );
}
