use bytes::Bytes;
use pretty_assertions::assert_eq;

use crate::transport::*;

fn data(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_chunker_split() {
    let c = Chunker::new(4);
    assert_eq!(4, c.chunk_size());

    let cases: Vec<(usize, Vec<usize>)> = vec![
        (0, vec![0]),
        (1, vec![1]),
        (4, vec![4]),
        (5, vec![4, 1]),
        (12, vec![4, 4, 4]),
    ];

    for (n, want) in cases.iter() {
        let chunks = c.split(&data(*n)).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(|x| x.len() - CHUNK_HEADER_SIZE).collect();
        assert_eq!(want, &sizes, "split {} bytes", n);
    }

    // every message has its own id
    let a = c.split(b"abc").unwrap();
    let b = c.split(b"abc").unwrap();
    assert_ne!(&a[0][..8], &b[0][..8]);
}

#[test]
fn test_reassembler_out_of_order() {
    let c = Chunker::new(3);
    let msg = data(10);
    let mut chunks = c.split(&msg).unwrap();
    assert_eq!(4, chunks.len());

    chunks.reverse();

    let mut r: Reassembler<u64> = Reassembler::new(8);
    assert_eq!(None, r.push(1, &chunks[0]).unwrap());
    // a duplicate is ignored
    assert_eq!(None, r.push(1, &chunks[0]).unwrap());
    assert_eq!(None, r.push(1, &chunks[1]).unwrap());
    assert_eq!(None, r.push(1, &chunks[2]).unwrap());
    assert_eq!(1, r.pending());

    let got = r.push(1, &chunks[3]).unwrap();
    assert_eq!(Some(Bytes::from(msg)), got);
    assert_eq!(0, r.pending());
}

#[test]
fn test_reassembler_single_chunk() {
    let c = Chunker::new(16);
    let chunks = c.split(b"hello").unwrap();

    let mut r: Reassembler<u64> = Reassembler::new(1);
    assert_eq!(Some(Bytes::from("hello")), r.push(1, &chunks[0]).unwrap());
    assert_eq!(0, r.pending());

    let chunks = c.split(b"").unwrap();
    assert_eq!(Some(Bytes::new()), r.push(1, &chunks[0]).unwrap());
}

#[test]
fn test_reassembler_senders() {
    // two senders may use the same message id
    let c1 = Chunker::new(2);
    let c2 = Chunker::new(2);

    let a = c1.split(b"aaaa").unwrap();
    let b = c2.split(b"bbbb").unwrap();
    assert_eq!(&a[0][..8], &b[0][..8]);

    let mut r: Reassembler<&str> = Reassembler::new(8);
    assert_eq!(None, r.push("x", &a[0]).unwrap());
    assert_eq!(None, r.push("y", &b[0]).unwrap());
    assert_eq!(2, r.pending());

    assert_eq!(Some(Bytes::from("bbbb")), r.push("y", &b[1]).unwrap());
    assert_eq!(Some(Bytes::from("aaaa")), r.push("x", &a[1]).unwrap());
}

#[test]
fn test_reassembler_evict_oldest() {
    let c = Chunker::new(1);
    let msgs: Vec<Vec<Bytes>> = (0..3).map(|_| c.split(b"ab").unwrap()).collect();

    let mut r: Reassembler<u64> = Reassembler::new(2);
    for m in msgs.iter() {
        assert_eq!(None, r.push(1, &m[0]).unwrap());
    }
    assert_eq!(2, r.pending());

    // the first one was evicted: its second chunk starts it over
    assert_eq!(None, r.push(1, &msgs[0][1]).unwrap());

    assert_eq!(Some(Bytes::from("ab")), r.push(1, &msgs[2][1]).unwrap());
}

#[test]
fn test_reassembler_bad_chunk() {
    let mut r: Reassembler<u64> = Reassembler::new(2);

    // too short
    assert!(r.push(1, &[0u8; 5]).is_err());

    // index out of count
    let mut c = vec![0u8; CHUNK_HEADER_SIZE];
    c[8..10].copy_from_slice(&3u16.to_be_bytes());
    c[10..12].copy_from_slice(&3u16.to_be_bytes());
    assert!(r.push(1, &c).is_err());

    // zero count
    let c = vec![0u8; CHUNK_HEADER_SIZE];
    assert!(r.push(1, &c).is_err());

    // count changes within one message
    let mut c = vec![0u8; CHUNK_HEADER_SIZE + 1];
    c[10..12].copy_from_slice(&2u16.to_be_bytes());
    assert_eq!(None, r.push(1, &c).unwrap());
    assert_eq!(1, r.pending());

    c[8..10].copy_from_slice(&1u16.to_be_bytes());
    c[10..12].copy_from_slice(&3u16.to_be_bytes());
    assert!(r.push(1, &c).is_err());
    assert_eq!(0, r.pending());
}
