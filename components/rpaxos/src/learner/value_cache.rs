use std::collections::HashMap;

use crate::types::{InstanceId, ValueId};

const NIL: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Entry {
    value_id: ValueId,
    instance_id: InstanceId,
    prev: usize,
    next: usize,
}

/// ValueCache remembers the instance a value id was delivered at, for the most recent
/// `capacity` values.
///
/// A value may be chosen at more than one instance: a value proposed again after a phase-2
/// timeout may have been chosen the first time too. The cache tells the learner to skip it.
///
/// It is an LRU: entries live in an arena and are linked by index, most recently used first.
#[derive(Debug)]
pub struct ValueCache {
    capacity: usize,
    index: HashMap<ValueId, usize>,
    entries: Vec<Entry>,
    head: usize,
    tail: usize,
}

impl ValueCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);

        ValueCache {
            capacity,
            index: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, value_id: ValueId) -> bool {
        self.index.contains_key(&value_id)
    }

    /// get returns the instance of `value_id` and marks it as most recently used.
    pub fn get(&mut self, value_id: ValueId) -> Option<InstanceId> {
        let i = *self.index.get(&value_id)?;
        self.unlink(i);
        self.push_front(i);
        Some(self.entries[i].instance_id)
    }

    /// insert records `value_id` at `iid`.
    /// If `value_id` is already cached it returns the instance recorded earlier and keeps it.
    pub fn insert(&mut self, value_id: ValueId, iid: InstanceId) -> Option<InstanceId> {
        if let Some(prev) = self.get(value_id) {
            return Some(prev);
        }

        let i = if self.entries.len() < self.capacity {
            self.entries.push(Entry {
                value_id,
                instance_id: iid,
                prev: NIL,
                next: NIL,
            });
            self.entries.len() - 1
        } else {
            let i = self.tail;
            self.unlink(i);
            self.index.remove(&self.entries[i].value_id);

            let e = &mut self.entries[i];
            e.value_id = value_id;
            e.instance_id = iid;
            i
        };

        self.push_front(i);
        self.index.insert(value_id, i);
        None
    }

    fn unlink(&mut self, i: usize) {
        let (prev, next) = (self.entries[i].prev, self.entries[i].next);

        if prev == NIL {
            self.head = next;
        } else {
            self.entries[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.entries[next].prev = prev;
        }

        self.entries[i].prev = NIL;
        self.entries[i].next = NIL;
    }

    fn push_front(&mut self, i: usize) {
        self.entries[i].prev = NIL;
        self.entries[i].next = self.head;

        if self.head != NIL {
            self.entries[self.head].prev = i;
        }
        self.head = i;

        if self.tail == NIL {
            self.tail = i;
        }
    }
}
