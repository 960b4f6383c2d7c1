use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::acceptor::Lookup;
use crate::executor::{RingContext, StopSignal};
use crate::queue::QueueError;
use crate::ring::*;
use crate::types::*;

/// Phase2Executor gets values chosen.
///
/// The master sends the proposal to every host by datagram and starts a vote around the ring.
/// A host forwards the vote once it has accepted the matching proposal. When the vote is back
/// at the master every host has voted: the value is chosen and the master sends a commit to
/// every host.
pub struct Phase2Executor;

impl Phase2Executor {
    /// propose runs phase 2 of `value` at instance `iid` with `ballot`.
    /// It returns true if the value is chosen.
    pub async fn propose(ctx: &RingContext, iid: InstanceId, ballot: BallotId, value: Value) -> bool {
        let snap = ctx.topology.snapshot();
        if !snap.is_master {
            return false;
        }

        let inst = match ctx.store.lookup(iid) {
            Lookup::Ok(inst) => inst,
            other => {
                warn!("propose instance not available"; "iid" => iid, "lookup" => other.name());
                return false;
            }
        };

        if !inst.propose(ballot, value.clone()) {
            debug!("local propose rejected"; "iid" => iid, "ballot" => ballot);
            return false;
        }

        let header = ctx.new_header(&snap);
        let value_id = value.value_id();

        ctx.learner.lock().unwrap().on_propose(iid, value.clone());
        ctx.broadcast_udp(
            &snap,
            &UdpCommand::Propose {
                request_id: header.request_id,
                instance_id: iid,
                ballot_id: ballot,
                value,
            },
        );

        if !inst.vote(header.request_id, snap.ring_id, ballot, value_id) {
            debug!("local vote rejected"; "iid" => iid, "ballot" => ballot);
            return false;
        }

        if !snap.next_is_self() {
            let waiter = ctx.waits.register(header.request_id);
            ctx.send_ring(
                &snap,
                RingCommand {
                    header,
                    body: Body::Vote(Vote {
                        instance_id: iid,
                        ballot_id: ballot,
                        value_id,
                    }),
                },
            );

            if waiter.wait(ctx.reply_timeout()).await.is_none() {
                warn!("vote timeout"; "iid" => iid, "ballot" => ballot);
                return false;
            }
        }

        Self::commit(ctx, iid, value_id);
        ctx.broadcast_udp(
            &snap,
            &UdpCommand::Commit {
                instance_id: iid,
                value_id,
            },
        );

        true
    }

    /// propose_next proposes one value: a reserved one first, otherwise a queued value at the
    /// lowest open instance.
    async fn propose_next(ctx: &Arc<RingContext>, inflight: &Arc<Semaphore>) -> Result<(), QueueError> {
        let permit = match inflight.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => return Err(QueueError::Inactive),
        };

        if let Some(r) = ctx.pool.pop_reserved() {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                if !Self::propose(&ctx, r.instance_id, r.ballot_id, r.value).await {
                    ctx.pool
                        .push_failed(r.instance_id, next_ballot_id(r.ballot_id, ctx.host_id));
                }
                drop(permit);
            });
            return Ok(());
        }

        let open = ctx.pool.pop_open_wait(ctx.tick()).await?;

        let value = match ctx.values.pop(Some(ctx.tick())).await {
            Ok(v) => v,
            Err(e) => {
                if Self::blocks_delivery(ctx, open.instance_id) {
                    Value::noop(ctx.host_id)
                } else {
                    ctx.pool.push_open(open.instance_id, open.ballot_id);
                    return Err(e);
                }
            }
        };

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let (iid, ballot) = (open.instance_id, open.ballot_id);

            if !Self::propose(&ctx, iid, ballot, value.clone()).await {
                ctx.pool.push_failed(iid, next_ballot_id(ballot, ctx.host_id));

                if value.is_noop() {
                    return;
                }

                // the value may be chosen anyway: the learner skips a second delivery
                if let Err(e) = ctx.values.push(value, Some(ctx.reply_timeout())).await {
                    warn!("drop value to propose again"; "iid" => iid, "err" => %e);
                }
            }
            drop(permit);
        });

        Ok(())
    }

    /// blocks_delivery returns true if an instance after `iid` is committed: `iid` has to be
    /// chosen, with a no-op if no value is coming.
    fn blocks_delivery(ctx: &RingContext, iid: InstanceId) -> bool {
        ctx.learner.lock().unwrap().tracker().after_last_committed() > iid
    }

    pub async fn proposer_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        let inflight = Arc::new(Semaphore::new(ctx.conf.batch_size as usize));

        loop {
            let r = tokio::select! {
                _ = stop.stopped() => return,
                r = Self::propose_next(&ctx, &inflight) => r,
            };

            if let Err(QueueError::Inactive) = r {
                tokio::select! {
                    _ = stop.stopped() => return,
                    _ = tokio::time::sleep(ctx.tick()) => {}
                }
            }
        }
    }

    /// commit marks `iid` committed on this host.
    pub fn commit(ctx: &RingContext, iid: InstanceId, value_id: ValueId) {
        match ctx.store.lookup(iid) {
            Lookup::Ok(inst) => {
                if inst.commit(value_id) {
                    ctx.store.notify_commit();
                } else {
                    debug!("commit of a value not accepted here"; "iid" => iid, "value_id" => value_id);
                }
            }
            other => {
                debug!("commit instance not available"; "iid" => iid, "lookup" => other.name());
            }
        }

        let r = ctx.learner.lock().unwrap().on_commit(iid, value_id);
        debug!("commit"; "iid" => iid, "value_id" => value_id, "learner" => ?r);
        ctx.learned.notify_one();
    }

    /// on_propose is the acceptor step of a proposal from the master. A vote that arrived
    /// first is forwarded now.
    pub fn on_propose(ctx: &RingContext, iid: InstanceId, ballot: BallotId, value: Value) {
        let inst = match ctx.store.lookup(iid) {
            Lookup::Ok(inst) => inst,
            other => {
                debug!("proposal instance not available"; "iid" => iid, "lookup" => other.name());
                return;
            }
        };

        if !inst.propose(ballot, value.clone()) {
            debug!("proposal rejected"; "iid" => iid, "ballot" => ballot);
            return;
        }

        ctx.learner.lock().unwrap().on_propose(iid, value);

        if let Some(pv) = inst.pending_vote_ready() {
            let snap = ctx.topology.snapshot();
            if pv.ring_id != snap.ring_id {
                debug!("drop pending vote of another ring"; "iid" => iid, "ring_id" => pv.ring_id);
                return;
            }

            ctx.send_ring(
                &snap,
                RingCommand {
                    header: Header {
                        request_id: pv.request_id,
                        ring_id: pv.ring_id,
                        dst_host_id: snap.next,
                    },
                    body: Body::Vote(Vote {
                        instance_id: iid,
                        ballot_id: pv.ballot_id,
                        value_id: pv.value_id,
                    }),
                },
            );
        }
    }

    /// handle runs the acceptor step on a vote from the previous host. A vote that can not
    /// succeed yet stays pending on the instance.
    pub fn handle(ctx: &RingContext, cmd: RingCommand) {
        let snap = ctx.topology.snapshot();

        let v = match &cmd.body {
            Body::Vote(v) => *v,
            _ => return,
        };

        let inst = match ctx.store.lookup(v.instance_id) {
            Lookup::Ok(inst) => inst,
            other => {
                debug!("vote instance not available"; "iid" => v.instance_id, "lookup" => other.name());
                return;
            }
        };

        let h = &cmd.header;
        if inst.vote(h.request_id, h.ring_id, v.ballot_id, v.value_id) {
            ctx.send_ring(&snap, cmd);
        } else {
            debug!("vote pending"; "iid" => v.instance_id, "ballot" => v.ballot_id);
        }
    }

    pub async fn acceptor_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        loop {
            let r = tokio::select! {
                _ = stop.stopped() => return,
                r = ctx.phase2_inbox.pop(None) => r,
            };

            match r {
                Ok(cmd) => Self::handle(&ctx, cmd),
                Err(QueueError::Inactive) => tokio::task::yield_now().await,
                Err(e) => debug!("phase2 inbox"; "err" => %e),
            }
        }
    }
}
