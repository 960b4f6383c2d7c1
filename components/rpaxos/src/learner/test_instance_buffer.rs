use crate::learner::*;
use crate::types::*;

#[test]
fn test_instance_buffer_window() {
    let mut b = InstanceBuffer::new(4, 10);

    assert_eq!(BufferResult::TooOld, b.propose(9, value!(1, "a")));
    assert_eq!(BufferResult::TooNew, b.propose(14, value!(1, "a")));
    assert_eq!(BufferResult::Ok, b.propose(13, value!(1, "a")));

    assert_eq!(BufferResult::TooOld, b.commit(9, 1));
    assert_eq!(BufferResult::TooNew, b.commit(14, 1));

    b.advance_to(12);
    assert_eq!(12, b.begin());
    assert_eq!(BufferResult::TooOld, b.propose(11, value!(1, "a")));
    assert_eq!(BufferResult::Ok, b.propose(15, value!(2, "b")));

    // never slides backward
    b.advance_to(3);
    assert_eq!(12, b.begin());
}

#[test]
fn test_instance_buffer_commit() {
    let mut b = InstanceBuffer::new(4, 0);

    // nothing to confirm
    assert_eq!(BufferResult::Failed, b.commit(1, 5));

    assert_eq!(BufferResult::Ok, b.propose(1, value!(5, "x")));
    assert_eq!(None, b.committed_value(1));

    // a later proposal replaces a provisional value
    assert_eq!(BufferResult::Ok, b.propose(1, value!(6, "y")));
    assert_eq!(BufferResult::Failed, b.commit(1, 5));
    assert_eq!(BufferResult::Ok, b.commit(1, 6));
    assert_eq!(Some(value!(6, "y")), b.committed_value(1));

    // a confirmed value is never replaced
    assert_eq!(BufferResult::Failed, b.propose(1, value!(7, "z")));
    assert_eq!(BufferResult::Ok, b.propose(1, value!(6, "y")));
    assert_eq!(BufferResult::Failed, b.learn(1, value!(7, "z")));
    assert_eq!(Some(value!(6, "y")), b.committed_value(1));
}

#[test]
fn test_instance_buffer_reuse_slot() {
    let mut b = InstanceBuffer::new(2, 0);

    b.propose(0, value!(1, "a"));
    b.commit(0, 1);

    b.advance_to(2);
    assert_eq!(None, b.committed_value(0));

    // slot of 0 is reused by 2 and the stale content is not visible
    assert_eq!(BufferResult::Failed, b.commit(2, 1));
    assert_eq!(BufferResult::Ok, b.learn(2, value!(3, "c")));
    assert_eq!(Some(value!(3, "c")), b.committed_value(2));

    b.advance_to(100);
    assert_eq!(None, b.committed_value(2));
    assert_eq!(BufferResult::Ok, b.propose(101, value!(4, "d")));
}
