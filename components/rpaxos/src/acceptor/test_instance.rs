use crate::acceptor::*;
use crate::types::*;

use pretty_assertions::assert_eq;

#[test]
fn test_promise() {
    let inst = AcceptorInstance::new(1);

    let r = inst.promise(5);
    assert_eq!(
        PromiseReply {
            ok: true,
            highest_promised: 5,
            highest_proposed: INVALID_BALLOT,
            last_proposal: None,
        },
        r
    );

    // stale or equal ballot: rejected without change.
    for b in [3, 5].iter() {
        let r = inst.promise(*b);
        assert_eq!(false, r.ok, "ballot={}", b);
        assert_eq!(5, r.highest_promised);
        assert_eq!(5, inst.highest_promised());
    }

    let v = value!(7, "foo");
    assert!(inst.propose(5, v.clone()));

    let r = inst.promise(6);
    assert_eq!(
        PromiseReply {
            ok: true,
            highest_promised: 6,
            highest_proposed: 5,
            last_proposal: Some(v),
        },
        r
    );
}

#[test]
fn test_promise_never_succeeds_with_decreasing_ballot() {
    let inst = AcceptorInstance::new(0);
    let mut last_ok = 0;

    for b in [10, 3, 11, 11, 9, 20, 19].iter() {
        let r = inst.promise(*b);
        if r.ok {
            assert!(*b > last_ok);
            last_ok = *b;
        }
    }
    assert_eq!(20, last_ok);
}

#[test]
fn test_propose() {
    let inst = AcceptorInstance::new(1);
    let v1 = value!(1, "a");
    let v2 = value!(2, "b");

    inst.promise(10);

    // lower than promised
    assert_eq!(false, inst.propose(9, v1.clone()));
    assert_eq!(INVALID_BALLOT, inst.highest_proposed());

    assert!(inst.propose(10, v1.clone()));
    assert_eq!(10, inst.highest_proposed());
    assert_eq!(v1, inst.last_proposal());

    // a higher ballot proposal without promise is accepted and replaces the old one.
    assert!(inst.propose(12, v2.clone()));
    assert_eq!(12, inst.highest_proposed());
    assert_eq!(v2, inst.last_proposal());
}

#[test]
fn test_vote() {
    let inst = AcceptorInstance::new(1);
    let v = value!(3, "x");

    inst.promise(5);
    assert!(inst.propose(5, v.clone()));

    assert!(inst.vote(1, 1, 5, 3));

    // wrong value
    assert_eq!(false, inst.vote(1, 1, 5, 4));
    // wrong ballot
    assert_eq!(false, inst.vote(1, 1, 6, 3));

    // a higher promise disables votes of the older ballot
    inst.promise(7);
    assert_eq!(false, inst.vote(2, 1, 5, 3));
}

#[test]
fn test_vote_before_propose() {
    let inst = AcceptorInstance::new(1);
    let v = value!(9, "x");

    assert_eq!(false, inst.vote(1, 1, 5, v.value_id()));

    // not ready before the proposal arrives
    assert_eq!(None, inst.pending_vote_ready());

    assert!(inst.propose(5, v.clone()));

    let pv = inst.pending_vote_ready().unwrap();
    assert_eq!(
        PendingVote {
            request_id: 1,
            ring_id: 1,
            ballot_id: 5,
            value_id: 9,
        },
        pv
    );

    // drained
    assert_eq!(None, inst.pending_vote_ready());

    assert!(inst.vote(pv.request_id, pv.ring_id, pv.ballot_id, pv.value_id));
}

#[test]
fn test_pending_vote_stale() {
    let inst = AcceptorInstance::new(1);

    assert_eq!(false, inst.vote(1, 1, 5, 9));
    inst.promise(6);

    assert_eq!(None, inst.pending_vote_ready());

    // dropped: a proposal at the old ballot does not bring it back.
    assert_eq!(false, inst.propose(5, value!(9, "x")));
    assert_eq!(None, inst.pending_vote_ready());
}

#[test]
fn test_commit() {
    let inst = AcceptorInstance::new(1);
    let v = value!(3, "x");

    assert_eq!(false, inst.commit(3));
    assert_eq!(None, inst.committed_value());

    inst.promise(5);
    inst.propose(5, v.clone());

    assert_eq!(false, inst.commit(4));
    assert_eq!(false, inst.is_committed());

    assert!(inst.commit(3));
    assert!(inst.commit(3));
    assert_eq!(Some(v.clone()), inst.committed_value());

    // committed value never changes.
    inst.promise(100);
    assert_eq!(false, inst.propose(100, value!(4, "y")));
    assert_eq!(Some(v), inst.committed_value());
}

#[test]
fn test_learn() {
    let inst = AcceptorInstance::new(1);
    inst.promise(5);
    inst.propose(5, value!(3, "x"));

    assert!(inst.learn(value!(4, "y")));
    assert_eq!(Some(value!(4, "y")), inst.committed_value());

    assert!(inst.learn(value!(4, "y")));
    assert_eq!(false, inst.learn(value!(3, "x")));
}
