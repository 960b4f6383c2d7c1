use std::cmp::max;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::acceptor::{Lookup, PromiseReply};
use crate::executor::{RingContext, StopSignal};
use crate::proposer::FailedEntry;
use crate::queue::QueueError;
use crate::ring::*;
use crate::types::*;

/// Phase1Executor prepares a single instance around the ring. It is used for instances that
/// failed to be prepared by a batch or failed in phase 2.
pub struct Phase1Executor;

impl Phase1Executor {
    /// accept runs the acceptor step of a promise on this host and merges the outcome into it.
    pub fn accept(ctx: &RingContext, p: &mut Promise) {
        let iid = p.instance_id;
        ctx.store.move_wall_to(iid + 1);

        match ctx.store.lookup(iid) {
            Lookup::Ok(inst) => match inst.committed_value() {
                Some(v) => p.add_committed(Some(v)),
                None => p.add_reply(&inst.promise(p.ballot_id)),
            },
            Lookup::Dead | Lookup::Forgotten => {
                // evicted instances are snapshotted
                let v = match ctx.snapshot.get(iid) {
                    Ok(v) => v,
                    Err(e) => {
                        error!("read snapshot"; "iid" => iid, "err" => %e);
                        None
                    }
                };
                p.add_committed(v);
            }
            other => {
                debug!("promise instance not available"; "iid" => iid, "lookup" => other.name());
                p.add_reply(&PromiseReply {
                    ok: false,
                    highest_promised: p.ballot_id,
                    highest_proposed: INVALID_BALLOT,
                    last_proposal: None,
                });
            }
        }
    }

    /// complete decides what to do with an instance whose promise went around the ring.
    pub fn complete(ctx: &RingContext, p: &Promise) {
        let iid = p.instance_id;
        let fail = p.fail.as_ref();

        match p.status {
            PromiseStatus::Committed => match fail.and_then(|f| f.last_proposal.clone()) {
                Some(v) => {
                    info!("instance already committed"; "iid" => iid, "value" => %v);
                    let value_id = v.value_id();
                    ctx.learn_committed(iid, v);

                    let snap = ctx.topology.snapshot();
                    ctx.broadcast_udp(
                        &snap,
                        &UdpCommand::Commit {
                            instance_id: iid,
                            value_id,
                        },
                    );
                }
                None => {
                    warn!("instance committed but its value is lost"; "iid" => iid);
                }
            },
            PromiseStatus::Rejected => {
                let hp = fail.map(|f| f.highest_promised).unwrap_or(p.ballot_id);
                ctx.raise_ballot(hp);
                ctx.pool
                    .push_failed(iid, next_ballot_id(max(hp, p.ballot_id), ctx.host_id));
            }
            PromiseStatus::Ok => match fail.and_then(|f| f.last_proposal.clone()) {
                Some(v) => {
                    ctx.pool.push_reserved(iid, p.ballot_id, v);
                }
                None => {
                    ctx.pool.push_open(iid, p.ballot_id);
                }
            },
        }
    }

    /// prepare runs a promise of `f` around the ring and completes it.
    pub async fn prepare(ctx: &RingContext, f: FailedEntry) {
        let snap = ctx.topology.snapshot();
        if !snap.is_master {
            return;
        }

        let ballot = max(f.ballot_hint, ctx.current_ballot());
        let header = ctx.new_header(&snap);

        let mut p = Promise::new(f.instance_id, ballot);
        Self::accept(ctx, &mut p);

        let p = if snap.next_is_self() {
            Some(p)
        } else {
            let waiter = ctx.waits.register(header.request_id);
            ctx.send_ring(
                &snap,
                RingCommand {
                    header,
                    body: Body::Promise(p),
                },
            );

            match waiter.wait(ctx.reply_timeout()).await {
                Some(RingCommand {
                    body: Body::Promise(p),
                    ..
                }) => Some(p),
                _ => None,
            }
        };

        match p {
            Some(p) => Self::complete(ctx, &p),
            None => {
                warn!("promise timeout"; "iid" => f.instance_id, "ballot" => ballot);
                ctx.pool
                    .push_failed(f.instance_id, next_ballot_id(ballot, ctx.host_id));
            }
        }
    }

    pub async fn proposer_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        let inflight = Arc::new(Semaphore::new(ctx.conf.batch_size as usize));

        loop {
            let permit = tokio::select! {
                _ = stop.stopped() => return,
                p = inflight.clone().acquire_owned() => p,
            };
            let permit = match permit {
                Ok(p) => p,
                Err(_) => return,
            };

            let r = tokio::select! {
                _ = stop.stopped() => return,
                r = ctx.pool.pop_failed_wait(ctx.tick()) => r,
            };

            match r {
                Ok(f) => {
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        Self::prepare(&ctx, f).await;
                        drop(permit);
                    });
                }
                Err(QueueError::Inactive) => {
                    tokio::select! {
                        _ = stop.stopped() => return,
                        _ = tokio::time::sleep(ctx.tick()) => {}
                    }
                }
                Err(_) => {}
            }
        }
    }

    /// handle runs the acceptor step on a promise from the previous host and forwards it.
    pub fn handle(ctx: &RingContext, mut cmd: RingCommand) {
        let snap = ctx.topology.snapshot();

        if let Body::Promise(p) = &mut cmd.body {
            Self::accept(ctx, p);
            ctx.send_ring(&snap, cmd);
        }
    }

    pub async fn acceptor_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        loop {
            let r = tokio::select! {
                _ = stop.stopped() => return,
                r = ctx.phase1_inbox.pop(None) => r,
            };

            match r {
                Ok(cmd) => Self::handle(&ctx, cmd),
                Err(QueueError::Inactive) => tokio::task::yield_now().await,
                Err(e) => debug!("phase1 inbox"; "err" => %e),
            }
        }
    }
}
