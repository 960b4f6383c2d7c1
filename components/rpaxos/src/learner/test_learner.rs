use pretty_assertions::assert_eq;

use crate::learner::*;
use crate::types::*;

fn delivered(l: &mut Learner) -> Vec<(InstanceId, ValueId, bool)> {
    let ready = l.ready().unwrap();
    assert_eq!(ready.len(), l.confirm(&ready));

    ready
        .into_iter()
        .map(|d| (d.instance_id, d.value.value_id(), d.duplicate))
        .collect()
}

#[test]
fn test_learner_in_order() {
    let mut l = Learner::new(16, 16, 0);

    l.on_propose(0, value!(100, "a"));
    l.on_propose(1, value!(101, "b"));
    l.on_propose(2, value!(102, "c"));

    assert_eq!(BufferResult::Ok, l.on_commit(1, 101));
    assert_eq!(BufferResult::Ok, l.on_commit(2, 102));

    // 0 is not committed yet
    assert_eq!(Vec::<(u64, u64, bool)>::new(), delivered(&mut l));
    assert_eq!(vec![0], l.missing(10));

    assert_eq!(BufferResult::Ok, l.on_commit(0, 100));
    assert_eq!(
        vec![(0, 100, false), (1, 101, false), (2, 102, false)],
        delivered(&mut l)
    );
    assert_eq!(3, l.next_to_deliver());
    assert_eq!(Vec::<InstanceId>::new(), l.missing(10));

    assert_eq!(BufferResult::TooOld, l.on_commit(1, 101));
}

#[test]
fn test_learner_commit_without_value() {
    let mut l = Learner::new(16, 16, 5);

    // commit arrives but the proposal was lost
    assert_eq!(BufferResult::Failed, l.on_commit(6, 200));
    assert_eq!(vec![5, 6], l.missing(10));

    // a commit of another value than the provisional one
    l.on_propose(5, value!(300, "x"));
    assert_eq!(BufferResult::Failed, l.on_commit(5, 301));

    assert_eq!(BufferResult::Ok, l.on_learn(5, value!(301, "y")));
    assert_eq!(BufferResult::Ok, l.on_learn(6, value!(200, "z")));

    assert_eq!(vec![(5, 301, false), (6, 200, false)], delivered(&mut l));
}

#[test]
fn test_learner_duplicate_value() {
    let mut l = Learner::new(16, 16, 0);

    l.on_learn(0, value!(7, "a"));
    l.on_learn(1, value!(8, "b"));
    // value 7 was proposed again after a phase-2 timeout and chosen again
    l.on_learn(2, value!(7, "a"));

    assert_eq!(
        vec![(0, 7, false), (1, 8, false), (2, 7, true)],
        delivered(&mut l)
    );
}

#[test]
fn test_learner_too_new() {
    let mut l = Learner::new(4, 16, 0);

    assert_eq!(BufferResult::TooNew, l.on_learn(4, value!(4, "x")));
    assert_eq!(vec![0, 1, 2, 3], l.missing(10));

    for iid in 0..4 {
        l.on_learn(iid, value!(iid + 100, "v"));
    }
    assert_eq!(4, delivered(&mut l).len());

    // 4 is in the window now but has to be recovered again
    assert_eq!(vec![4], l.missing(10));
    assert!(!l.tracker().is_committed(4));
    assert_eq!(BufferResult::Ok, l.on_learn(4, value!(4, "x")));
    assert_eq!(vec![(4, 4, false)], delivered(&mut l));
}

#[test]
fn test_learner_commit_far_beyond_window() {
    let mut l = Learner::new(4, 16, 0);

    assert_eq!(BufferResult::TooNew, l.on_commit(3_000_000, 1));
    assert_eq!(BufferResult::TooNew, l.on_learn(u64::MAX, value!(2, "x")));

    // nothing is tracked for instances out of the window
    assert_eq!(0, l.tracker().after_last_committed());
    assert_eq!(0, l.tracker().not_committed().count());

    // recovery is bounded by the window
    assert_eq!(vec![0, 1, 2, 3], l.missing(100));
}

#[test]
fn test_learner_ready_until_confirmed() {
    let mut l = Learner::new(16, 16, 0);

    l.on_learn(0, value!(7, "a"));
    l.on_learn(1, value!(7, "a"));

    // the persist of this batch fails: nothing is consumed
    let ready = l.ready().unwrap();
    assert_eq!(2, ready.len());
    assert!(!ready[0].duplicate);
    assert!(ready[1].duplicate);
    assert_eq!(0, l.next_to_deliver());

    l.on_learn(2, value!(8, "b"));
    assert_eq!(3, l.ready().unwrap().len());

    // a stale batch is not consumed twice
    assert_eq!(2, l.confirm(&ready));
    assert_eq!(0, l.confirm(&ready));
    assert_eq!(2, l.next_to_deliver());

    assert_eq!(vec![(2, 8, false)], delivered(&mut l));
}
