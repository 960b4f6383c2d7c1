use std::sync::Arc;
use std::time::Duration;

use crate::queue::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wait_pool_send() {
    let pool = Arc::new(WaitPool::<String>::new(4));

    let w = pool.register(5);
    assert!(pool.is_waiting(5));

    let p2 = pool.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        p2.send(5, "done".to_string()).unwrap();
    });

    assert_eq!(Some("done".to_string()), w.wait(Duration::from_secs(5)).await);
    assert!(!pool.is_waiting(5));
    assert!(pool.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wait_pool_timeout() {
    let pool = WaitPool::<u64>::new(4);

    let w = pool.register(9);
    assert_eq!(None, w.wait(Duration::from_millis(20)).await);

    // the slot is released after a timeout
    assert!(!pool.is_waiting(9));
    assert_eq!(Err(3), pool.send(9, 3));
}

#[test]
fn test_wait_pool_no_waiter() {
    let pool = WaitPool::<u64>::new(2);
    assert_eq!(Err(1), pool.send(100, 1));

    {
        let _w = pool.register(100);
        assert_eq!(1, pool.len());
    }
    assert_eq!(0, pool.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wait_pool_reregister() {
    let pool = WaitPool::<u64>::new(1);

    let old = pool.register(1);
    let new = pool.register(1);

    // dropping the replaced waiter does not unregister the new one
    assert_eq!(None, old.wait(Duration::from_millis(10)).await);
    assert!(pool.is_waiting(1));

    pool.send(1, 11).unwrap();
    assert_eq!(Some(11), new.wait(Duration::from_millis(10)).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wait_pool_concurrent() {
    let pool = Arc::new(WaitPool::<u64>::new(16));

    let mut hs = vec![];
    for rid in 1..=100u64 {
        let pool = pool.clone();
        hs.push(tokio::spawn(async move {
            let w = pool.register(rid);
            w.wait(Duration::from_secs(5)).await
        }));
    }

    while pool.len() < 100 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    for rid in 1..=100u64 {
        pool.send(rid, rid * 2).unwrap();
    }

    for (i, h) in hs.into_iter().enumerate() {
        assert_eq!(Some((i as u64 + 1) * 2), h.await.unwrap());
    }
}
