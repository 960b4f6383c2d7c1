use std::sync::Arc;

use pretty_assertions::assert_eq;
use storage::MemEngine;

use crate::codec::MsgPackCodec;
use crate::executor::*;
use crate::proposer::*;
use crate::ring::*;
use crate::snapshot::SnapshotStore;
use crate::testutil::*;
use crate::transport::LocalNet;
use crate::types::*;

fn accept(ctx: &RingContext, iid: InstanceId, ballot: BallotId) -> Promise {
    let mut p = Promise::new(iid, ballot);
    Phase1Executor::accept(ctx, &mut p);
    p
}

#[test]
fn test_promise_accept() {
    let ctx = new_context(2, &new_cluster(3, 20100), &LocalNet::new());

    // fresh
    let p = accept(&ctx, 3, 65);
    assert_eq!(PromiseStatus::Ok, p.status);
    assert_eq!(None, p.fail);
    assert_eq!(65, ctx.store.lookup(3).ok().unwrap().highest_promised());

    // accepted a proposal
    let inst = ctx.store.lookup(3).ok().unwrap();
    assert!(inst.propose(65, value!(9, "foo")));

    let p = accept(&ctx, 3, 129);
    assert_eq!(PromiseStatus::Ok, p.status);
    let f = p.fail.unwrap();
    assert_eq!(65, f.highest_proposed);
    assert_eq!(Some(value!(9, "foo")), f.last_proposal);

    // rejected
    let p = accept(&ctx, 3, 100);
    assert_eq!(PromiseStatus::Rejected, p.status);
    assert_eq!(129, p.fail.unwrap().highest_promised);

    // committed
    assert!(inst.commit(9));
    let p = accept(&ctx, 3, 1000);
    assert_eq!(PromiseStatus::Committed, p.status);
    assert_eq!(Some(value!(9, "foo")), p.fail.unwrap().last_proposal);
}

#[test]
fn test_promise_accept_unreachable() {
    let ctx = new_context(2, &new_cluster(3, 20100), &LocalNet::new());

    let p = accept(&ctx, 10_000, 65);
    assert_eq!(PromiseStatus::Rejected, p.status);
    assert_eq!(65, p.fail.unwrap().highest_promised);
}

#[test]
fn test_promise_accept_from_snapshot() {
    let cluster = new_cluster(3, 20100);
    let codec = Arc::new(MsgPackCodec);
    let engine = Arc::new(MemEngine::new().unwrap());

    let snapshot = SnapshotStore::new(engine.clone(), codec.clone());
    snapshot
        .persist(&[(0, value!(1, "a")), (1, value!(2, "b"))])
        .unwrap();

    let net = Arc::new(LocalNet::new());
    let ctx = RingContext::new(
        2,
        &cluster.ring,
        cluster.paxos.clone(),
        SnapshotStore::new(engine, codec.clone()),
        codec,
        net.clone(),
        net,
    )
    .unwrap();

    assert_eq!(2, ctx.store.watermarks().birth);
    assert_eq!(2, ctx.learner.lock().unwrap().next_to_deliver());

    let p = accept(&ctx, 1, 65);
    assert_eq!(PromiseStatus::Committed, p.status);
    assert_eq!(Some(value!(2, "b")), p.fail.unwrap().last_proposal);
}

#[test]
fn test_promise_complete() {
    let ctx = new_context(1, &new_cluster(3, 20100), &LocalNet::new());
    ctx.pool.activate();

    // ok
    Phase1Executor::complete(&ctx, &Promise::new(0, 65));
    assert_eq!(
        Some(OpenEntry {
            instance_id: 0,
            ballot_id: 65
        }),
        ctx.pool.pop_open()
    );

    // ok with a proposal to propose again
    let mut p = Promise::new(1, 129);
    p.add_reply(&crate::acceptor::PromiseReply {
        ok: true,
        highest_promised: 129,
        highest_proposed: 65,
        last_proposal: Some(value!(5, "x")),
    });
    Phase1Executor::complete(&ctx, &p);
    let r = ctx.pool.pop_reserved().unwrap();
    assert_eq!((1, 129, value!(5, "x")), (r.instance_id, r.ballot_id, r.value));

    // rejected
    let mut p = Promise::new(2, 129);
    p.add_reply(&crate::acceptor::PromiseReply {
        ok: false,
        highest_promised: 300,
        highest_proposed: INVALID_BALLOT,
        last_proposal: None,
    });
    Phase1Executor::complete(&ctx, &p);
    assert_eq!(
        Some(FailedEntry {
            instance_id: 2,
            ballot_hint: next_ballot_id(300, 1),
        }),
        ctx.pool.pop_failed()
    );
    assert!(ctx.current_ballot() > 300);

    // committed: learned, nothing to propose
    let mut p = Promise::new(3, 129);
    p.add_committed(Some(value!(6, "y")));
    ctx.store.move_wall_to(4);
    Phase1Executor::complete(&ctx, &p);

    assert_eq!(0, ctx.pool.prepared());
    assert_eq!(
        Some(value!(6, "y")),
        ctx.store.lookup(3).ok().unwrap().committed_value()
    );
    assert!(ctx.learner.lock().unwrap().tracker().is_committed(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_prepare_single_host() {
    let ctx = new_context(1, &new_cluster(1, 20100), &LocalNet::new());
    ctx.start_proposing();

    let b = ctx.current_ballot();
    Phase1Executor::prepare(
        &ctx,
        FailedEntry {
            instance_id: 0,
            ballot_hint: b + 64,
        },
    )
    .await;

    assert_eq!(
        Some(OpenEntry {
            instance_id: 0,
            ballot_id: b + 64
        }),
        ctx.pool.pop_open()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_prepare_around_the_ring() {
    let cluster = new_cluster(3, 20100);
    let net = LocalNet::new();
    let (_stop_tx, stop) = StopSignal::new();

    let ctxs: Vec<_> = (1..=3).map(|h| new_context(h, &cluster, &net)).collect();
    for c in ctxs.iter() {
        register_context(&net, c);
        tokio::spawn(Phase1Executor::acceptor_loop(c.clone(), stop.clone()));
    }

    // host 3 accepted a proposal of a former master
    ctxs[2].store.move_wall_to(6);
    let inst = ctxs[2].store.lookup(5).ok().unwrap();
    inst.promise(66);
    assert!(inst.propose(66, value!(77, "old")));

    let master = &ctxs[0];
    master.start_proposing();

    Phase1Executor::prepare(
        master,
        FailedEntry {
            instance_id: 5,
            ballot_hint: 129,
        },
    )
    .await;

    let r = master.pool.pop_reserved().unwrap();
    assert_eq!(5, r.instance_id);
    assert_eq!(129, r.ballot_id);
    assert_eq!(value!(77, "old"), r.value);

    for c in ctxs.iter() {
        assert_eq!(129, c.store.lookup(5).ok().unwrap().highest_promised());
    }
}
