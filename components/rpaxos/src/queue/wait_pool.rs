use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::types::RequestId;

type Shard<R> = Mutex<HashMap<RequestId, (u64, oneshot::Sender<R>)>>;

/// WaitPool correlates a request id with the task waiting for its reply.
///
/// Slots are sharded by request id into independently locked buckets.
pub struct WaitPool<R> {
    shards: Vec<Shard<R>>,
    tokens: AtomicU64,
}

/// Waiter is the waiting side of a registered request.
/// Dropping it unregisters the request: a late reply is then handed back to the sender.
pub struct Waiter<'a, R> {
    pool: &'a WaitPool<R>,
    request_id: RequestId,
    token: u64,
    rx: Option<oneshot::Receiver<R>>,
}

impl<R> WaitPool<R> {
    pub fn new(n_shards: usize) -> Self {
        assert!(n_shards > 0);

        WaitPool {
            shards: (0..n_shards).map(|_| Mutex::new(HashMap::new())).collect(),
            tokens: AtomicU64::new(1),
        }
    }

    fn shard(&self, request_id: RequestId) -> &Shard<R> {
        let h = request_id ^ (request_id >> 29) ^ (request_id >> 56);
        &self.shards[(h % self.shards.len() as u64) as usize]
    }

    /// register makes `request_id` wait for a reply.
    /// Registering an id twice replaces the former waiter, whose wait then returns None.
    pub fn register(&self, request_id: RequestId) -> Waiter<'_, R> {
        let (tx, rx) = oneshot::channel();
        let token = self.tokens.fetch_add(1, Ordering::Relaxed);

        self.shard(request_id)
            .lock()
            .unwrap()
            .insert(request_id, (token, tx));

        Waiter {
            pool: self,
            request_id,
            token,
            rx: Some(rx),
        }
    }

    /// send delivers `reply` to the task waiting for `request_id`.
    /// If no task waits for it, the reply is given back.
    pub fn send(&self, request_id: RequestId, reply: R) -> Result<(), R> {
        let slot = self.shard(request_id).lock().unwrap().remove(&request_id);

        match slot {
            Some((_, tx)) => tx.send(reply),
            None => Err(reply),
        }
    }

    pub fn is_waiting(&self, request_id: RequestId) -> bool {
        self.shard(request_id)
            .lock()
            .unwrap()
            .contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().unwrap().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a, R> Waiter<'a, R> {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// wait returns the reply, or None if it does not arrive within `timeout`.
    pub async fn wait(mut self, timeout: Duration) -> Option<R> {
        let rx = self.rx.take()?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(r)) => Some(r),
            _ => None,
        }
    }
}

impl<'a, R> Drop for Waiter<'a, R> {
    fn drop(&mut self) {
        let mut shard = self.pool.shard(self.request_id).lock().unwrap();

        // the slot may have been replaced by a newer registration of the same id
        let ours = matches!(shard.get(&self.request_id), Some((t, _)) if *t == self.token);
        if ours {
            shard.remove(&self.request_id);
        }
    }
}
