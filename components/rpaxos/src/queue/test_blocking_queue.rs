use std::sync::Arc;
use std::time::Duration;

use crate::queue::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_fifo() {
    let q = BlockingQueue::new(3);

    q.push(1, None).await.unwrap();
    q.push(2, None).await.unwrap();
    assert!(q.try_push(3).is_ok());
    assert_eq!(Err(QueueError::Full), q.try_push(4));
    assert_eq!(3, q.len());

    assert_eq!(Ok(1), q.pop(None).await);
    assert_eq!(Some(2), q.try_pop());
    assert_eq!(Ok(3), q.pop(Some(Duration::from_millis(10))).await);
    assert_eq!(None, q.try_pop());
    assert!(q.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_timeout() {
    let q = BlockingQueue::<u64>::new(1);

    let r = q.pop(Some(Duration::from_millis(20))).await;
    assert_eq!(Err(QueueError::Timeout), r);

    q.push(1, None).await.unwrap();
    let r = q.push(2, Some(Duration::from_millis(20))).await;
    assert_eq!(Err(QueueError::Timeout), r);
    assert_eq!(1, q.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_wakeup_pop() {
    let q = Arc::new(BlockingQueue::new(2));

    let q2 = q.clone();
    let h = tokio::spawn(async move { q2.pop(Some(Duration::from_secs(5))).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    q.push(7u64, None).await.unwrap();

    assert_eq!(Ok(7), h.await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_wakeup_push() {
    let q = Arc::new(BlockingQueue::new(1));
    q.push(1u64, None).await.unwrap();

    let q2 = q.clone();
    let h = tokio::spawn(async move { q2.push(2, Some(Duration::from_secs(5))).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(Some(1), q.try_pop());

    assert_eq!(Ok(()), h.await.unwrap());
    assert_eq!(Some(2), q.try_pop());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_deactivate() {
    let q = Arc::new(BlockingQueue::new(4));

    let q2 = q.clone();
    let waiting = tokio::spawn(async move { q2.pop(None).await });

    tokio::time::sleep(Duration::from_millis(20)).await;

    let drained = q.deactivate();
    assert!(drained.is_empty());
    assert_eq!(Err(QueueError::Inactive), waiting.await.unwrap());

    assert!(!q.is_active());
    assert_eq!(Err(QueueError::Inactive), q.try_push(1u64));
    assert_eq!(Err(QueueError::Inactive), q.push(1, None).await);
    assert_eq!(Err(QueueError::Inactive), q.pop(None).await);

    q.activate();
    q.try_push(1).unwrap();
    q.try_push(2).unwrap();

    let drained = q.deactivate();
    assert_eq!(vec![1, 2], drained);
    assert_eq!(0, q.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queue_many_producers() {
    let q = Arc::new(BlockingQueue::new(8));
    let n_producers = 4u64;
    let per_producer = 200u64;

    let mut hs = vec![];
    for p in 0..n_producers {
        let q = q.clone();
        hs.push(tokio::spawn(async move {
            for i in 0..per_producer {
                q.push(p * 1000 + i, None).await.unwrap();
            }
        }));
    }

    let mut got = vec![];
    while (got.len() as u64) < n_producers * per_producer {
        got.push(q.pop(Some(Duration::from_secs(5))).await.unwrap());
    }

    for h in hs {
        h.await.unwrap();
    }

    // per-producer order is kept
    for p in 0..n_producers {
        let mine: Vec<u64> = got.iter().cloned().filter(|x| x / 1000 == p).collect();
        let want: Vec<u64> = (0..per_producer).map(|i| p * 1000 + i).collect();
        assert_eq!(want, mine);
    }
}
