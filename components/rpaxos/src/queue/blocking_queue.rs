use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::queue::QueueError;

struct State<T> {
    items: VecDeque<T>,
    active: bool,
}

/// BlockingQueue is a bounded FIFO queue shared by tasks.
///
/// A push on a full queue or a pop on an empty queue waits, optionally with a timeout.
/// Deactivating the queue wakes every waiting task with `QueueError::Inactive`; until it is
/// activated again every push and pop returns `Inactive` immediately.
pub struct BlockingQueue<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_empty: Notify,
    not_full: Notify,
}

impl<T> BlockingQueue<T> {
    /// new creates an active queue.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);

        BlockingQueue {
            capacity,
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                active: true,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    /// try_push pushes without waiting.
    pub fn try_push(&self, item: T) -> Result<(), QueueError> {
        let mut st = self.state.lock().unwrap();
        if !st.active {
            return Err(QueueError::Inactive);
        }
        if st.items.len() >= self.capacity {
            return Err(QueueError::Full);
        }

        st.items.push_back(item);
        drop(st);

        self.not_empty.notify_one();
        Ok(())
    }

    /// push waits for room, at most `timeout` if it is not None.
    /// The item is dropped if it is not pushed.
    pub async fn push(&self, item: T, timeout: Option<Duration>) -> Result<(), QueueError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut item = Some(item);

        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.state.lock().unwrap();
                if !st.active {
                    return Err(QueueError::Inactive);
                }

                if st.items.len() < self.capacity {
                    if let Some(x) = item.take() {
                        st.items.push_back(x);
                    }
                    drop(st);

                    self.not_empty.notify_one();
                    return Ok(());
                }
            }

            wait_until(notified, deadline).await?;
        }
    }

    /// try_pop pops without waiting. It returns None if the queue is empty or inactive.
    pub fn try_pop(&self) -> Option<T> {
        let mut st = self.state.lock().unwrap();
        if !st.active {
            return None;
        }

        let x = st.items.pop_front();
        drop(st);

        if x.is_some() {
            self.not_full.notify_one();
        }
        x
    }

    /// pop waits for an item, at most `timeout` if it is not None.
    pub async fn pop(&self, timeout: Option<Duration>) -> Result<T, QueueError> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.state.lock().unwrap();
                if !st.active {
                    return Err(QueueError::Inactive);
                }

                if let Some(x) = st.items.pop_front() {
                    drop(st);

                    self.not_full.notify_one();
                    return Ok(x);
                }
            }

            wait_until(notified, deadline).await?;
        }
    }

    /// deactivate drains the queue and wakes up all waiting tasks.
    /// It returns the drained items.
    pub fn deactivate(&self) -> Vec<T> {
        let drained = {
            let mut st = self.state.lock().unwrap();
            st.active = false;
            st.items.drain(..).collect()
        };

        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();

        drained
    }

    pub fn activate(&self) {
        let mut st = self.state.lock().unwrap();
        st.active = true;
    }
}

/// wait_until waits for a notification until `deadline`.
pub(crate) async fn wait_until(
    notified: Pin<&mut Notified<'_>>,
    deadline: Option<Instant>,
) -> Result<(), QueueError> {
    match deadline {
        None => {
            notified.await;
            Ok(())
        }
        Some(d) => tokio::time::timeout_at(d, notified)
            .await
            .map_err(|_| QueueError::Timeout),
    }
}
