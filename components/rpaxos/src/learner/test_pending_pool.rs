use crate::learner::*;
use crate::types::*;

#[test]
fn test_pending_pool_order() {
    let mut p = PendingPool::new(4, 10);

    assert_eq!(PendingResult::TooOld, p.push(9, value!(1, "a")));
    assert_eq!(PendingResult::TooNew, p.push(14, value!(1, "a")));

    assert_eq!(PendingResult::Ok, p.push(12, value!(12, "c")));
    assert_eq!(PendingResult::Duplicate, p.push(12, value!(12, "c")));
    assert!(p.contains(12));
    assert!(!p.contains(10));

    // 10 is not there yet
    assert_eq!(0, p.peek_ready().unwrap().len());
    assert!(!p.consume(12));
    assert_eq!(vec![10, 11], p.missing(13, 10));
    assert_eq!(vec![10], p.missing(13, 1));

    p.push(10, value!(10, "a"));
    p.push(11, value!(11, "b"));

    let got: Vec<_> = p
        .peek_ready()
        .unwrap()
        .into_iter()
        .map(|(iid, v)| (iid, v.value_id()))
        .collect();
    assert_eq!(vec![(10, 10), (11, 11), (12, 12)], got);

    // peeking consumes nothing
    assert_eq!(10, p.next());
    assert_eq!(3, p.peek_ready().unwrap().len());

    for (iid, _) in got.iter() {
        assert!(p.consume(*iid));
    }
    assert_eq!(13, p.next());
    assert!(!p.consume(12));

    // the window slid
    assert_eq!(PendingResult::Ok, p.push(16, value!(16, "x")));
    assert_eq!(vec![13, 14, 15], p.missing(100, 10));
}
