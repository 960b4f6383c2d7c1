use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::queue::QueueError;

struct State<T> {
    heap: BinaryHeap<Reverse<T>>,
    active: bool,
}

/// ActiveHeap is a min-heap that can be switched off.
///
/// While inactive, `push` drops the item and `pop` returns nothing, but items pushed before
/// deactivation are kept for when the heap is activated again.
pub struct ActiveHeap<T: Ord> {
    state: Mutex<State<T>>,
    not_empty: Notify,
}

impl<T: Ord> ActiveHeap<T> {
    /// new creates an inactive heap.
    pub fn new() -> Self {
        ActiveHeap {
            state: Mutex::new(State {
                heap: BinaryHeap::new(),
                active: false,
            }),
            not_empty: Notify::new(),
        }
    }

    /// push returns false if the heap is inactive and the item is dropped.
    pub fn push(&self, item: T) -> bool {
        let mut st = self.state.lock().unwrap();
        if !st.active {
            return false;
        }

        st.heap.push(Reverse(item));
        drop(st);

        self.not_empty.notify_one();
        true
    }

    /// pop returns the smallest item, or None if the heap is empty or inactive.
    pub fn pop(&self) -> Option<T> {
        let mut st = self.state.lock().unwrap();
        if !st.active {
            return None;
        }
        st.heap.pop().map(|Reverse(x)| x)
    }

    /// pop_wait waits at most `timeout` for an item.
    pub async fn pop_wait(&self, timeout: Duration) -> Result<T, QueueError> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.state.lock().unwrap();
                if !st.active {
                    return Err(QueueError::Inactive);
                }
                if let Some(Reverse(x)) = st.heap.pop() {
                    return Ok(x);
                }
            }

            tokio::time::timeout_at(deadline, notified)
                .await
                .map_err(|_| QueueError::Timeout)?;
        }
    }

    pub fn activate(&self) {
        self.state.lock().unwrap().active = true;
    }

    /// deactivate wakes up every waiting `pop_wait`.
    pub fn deactivate(&self) {
        self.state.lock().unwrap().active = false;
        self.not_empty.notify_waiters();
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ord> Default for ActiveHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
