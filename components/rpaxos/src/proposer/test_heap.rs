use std::sync::Arc;
use std::time::Duration;

use crate::proposer::*;
use crate::queue::QueueError;

#[test]
fn test_heap_min_first() {
    let h = ActiveHeap::new();
    h.activate();

    for x in [5u64, 1, 9, 3, 7].iter() {
        assert!(h.push(*x));
    }
    assert_eq!(5, h.len());

    let got: Vec<u64> = std::iter::from_fn(|| h.pop()).collect();
    assert_eq!(vec![1, 3, 5, 7, 9], got);
    assert!(h.is_empty());
}

#[test]
fn test_heap_inactive() {
    let h = ActiveHeap::new();
    assert!(!h.is_active());

    assert!(!h.push(1u64));
    assert_eq!(None, h.pop());
    assert_eq!(0, h.len());

    h.activate();
    h.push(2);
    h.push(1);

    h.deactivate();
    assert!(!h.push(3));
    assert_eq!(None, h.pop());

    // queued items survive deactivation
    h.activate();
    assert_eq!(Some(1), h.pop());
    assert_eq!(Some(2), h.pop());
    assert_eq!(None, h.pop());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_heap_pop_wait() {
    let h = Arc::new(ActiveHeap::new());
    h.activate();

    assert_eq!(
        Err(QueueError::Timeout),
        h.pop_wait(Duration::from_millis(10)).await
    );

    let h2 = h.clone();
    let j = tokio::spawn(async move { h2.pop_wait(Duration::from_secs(5)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    h.push(42u64);
    assert_eq!(Ok(42), j.await.unwrap());

    let h2 = h.clone();
    let j = tokio::spawn(async move { h2.pop_wait(Duration::from_secs(5)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    h.deactivate();
    assert_eq!(Err(QueueError::Inactive), j.await.unwrap());
}
