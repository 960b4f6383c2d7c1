use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use super::*;

#[test]
fn test_guid_prefix() {
    let g = GuidGenerator::new(3);
    let a = g.next();
    let b = g.next();

    assert_eq!(3, a >> 56);
    assert_eq!(3, guid_host(b));
    assert_eq!(1, a & 0xff);
    assert_eq!(a + 1, b);
}

#[test]
fn test_guid_never_invalid() {
    let g = GuidGenerator::new(0);
    assert_ne!(INVALID_REQUEST, g.next());
    assert_ne!(INVALID_VALUE, g.next());
}

#[test]
fn test_guid_concurrent_unique() {
    let g = Arc::new(GuidGenerator::new(1));

    let mut hs = vec![];
    for _ in 0..4 {
        let g = g.clone();
        hs.push(thread::spawn(move || {
            (0..1000).map(|_| g.next()).collect::<Vec<_>>()
        }));
    }

    let mut all = HashSet::new();
    for h in hs {
        for id in h.join().unwrap() {
            assert!(all.insert(id));
        }
    }
    assert_eq!(4000, all.len());
}
