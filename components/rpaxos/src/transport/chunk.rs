use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::transport::TransportError;

/// A chunk is `[msg_id u64, index u16, count u16, data]`, integers in big endian.
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Chunker splits a datagram into chunks no larger than the chunk size plus the header.
pub struct Chunker {
    chunk_size: usize,
    next_id: AtomicU64,
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0);

        Chunker {
            chunk_size,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn split(&self, buf: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        let n = std::cmp::max((buf.len() + self.chunk_size - 1) / self.chunk_size, 1);
        if n > u16::MAX as usize {
            return Err(TransportError::BadChunk(format!(
                "{} bytes do not fit in {} chunks",
                buf.len(),
                u16::MAX
            )));
        }

        let msg_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut chunks = Vec::with_capacity(n);

        for i in 0..n {
            let data = &buf[std::cmp::min(i * self.chunk_size, buf.len())
                ..std::cmp::min((i + 1) * self.chunk_size, buf.len())];

            let mut c = BytesMut::with_capacity(CHUNK_HEADER_SIZE + data.len());
            c.put_u64(msg_id);
            c.put_u16(i as u16);
            c.put_u16(n as u16);
            c.put_slice(data);
            chunks.push(c.freeze());
        }

        Ok(chunks)
    }
}

#[derive(Debug)]
struct Partial {
    parts: Vec<Option<Bytes>>,
    received: usize,
}

/// Reassembler rebuilds datagrams from chunks received from several senders.
///
/// At most `max_pending` messages are incomplete at a time: the oldest one is dropped to make
/// room for a new one.
#[derive(Debug)]
pub struct Reassembler<K> {
    max_pending: usize,
    pending: HashMap<(K, u64), Partial>,
    order: VecDeque<(K, u64)>,
}

impl<K: Hash + Eq + Clone> Reassembler<K> {
    pub fn new(max_pending: usize) -> Self {
        assert!(max_pending > 0);

        Reassembler {
            max_pending,
            pending: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// pending returns the number of incomplete messages.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// push adds a chunk from `from`. It returns the message once every chunk of it arrived.
    pub fn push(&mut self, from: K, chunk: &[u8]) -> Result<Option<Bytes>, TransportError> {
        if chunk.len() < CHUNK_HEADER_SIZE {
            return Err(TransportError::BadChunk(format!(
                "chunk of {} bytes has no header",
                chunk.len()
            )));
        }

        let mut h = &chunk[..CHUNK_HEADER_SIZE];
        let msg_id = h.get_u64();
        let index = h.get_u16() as usize;
        let count = h.get_u16() as usize;
        let data = &chunk[CHUNK_HEADER_SIZE..];

        if index >= count {
            return Err(TransportError::BadChunk(format!(
                "index {} out of count {}",
                index, count
            )));
        }

        if count == 1 {
            return Ok(Some(Bytes::copy_from_slice(data)));
        }

        let key = (from, msg_id);

        if !self.pending.contains_key(&key) {
            self.make_room();
            self.pending.insert(
                key.clone(),
                Partial {
                    parts: vec![None; count],
                    received: 0,
                },
            );
            self.order.push_back(key.clone());
        }

        let p = match self.pending.get_mut(&key) {
            Some(p) => p,
            None => return Ok(None),
        };

        let expected = p.parts.len();
        if expected != count {
            self.pending.remove(&key);
            return Err(TransportError::BadChunk(format!(
                "message {} has chunk counts {} and {}",
                msg_id, expected, count
            )));
        }

        if p.parts[index].is_none() {
            p.parts[index] = Some(Bytes::copy_from_slice(data));
            p.received += 1;
        }

        if p.received < count {
            return Ok(None);
        }

        let p = match self.pending.remove(&key) {
            Some(p) => p,
            None => return Ok(None),
        };

        let mut msg = BytesMut::new();
        for part in p.parts.into_iter().flatten() {
            msg.put_slice(&part);
        }
        Ok(Some(msg.freeze()))
    }

    fn make_room(&mut self) {
        while self.pending.len() >= self.max_pending {
            match self.order.pop_front() {
                Some(k) => {
                    if self.pending.remove(&k).is_some() {
                        debug!("evict incomplete datagram"; "msg_id" => k.1);
                    }
                }
                None => break,
            }
        }

        // completed messages leave their key behind
        if self.order.len() > 2 * self.max_pending {
            let pending = &self.pending;
            self.order.retain(|k| pending.contains_key(k));
        }
    }
}
