use std::cmp::max;
use std::sync::Arc;

use crate::acceptor::Lookup;
use crate::executor::{RingContext, StopSignal};
use crate::queue::QueueError;
use crate::ring::*;
use crate::types::*;

/// Phase1BatchExecutor prepares ranges of instances with a single command around the ring.
///
/// Every host promises the ballot for every instance of the range and adds the instances it
/// could not simply promise to the fail list. Back at the master, instances without a fail are
/// ready to be proposed; the others are prepared again one by one.
pub struct Phase1BatchExecutor;

impl Phase1BatchExecutor {
    /// accept runs the acceptor step of a batch on this host and merges its fails into the
    /// batch.
    pub fn accept(ctx: &RingContext, batch: &mut Batch) {
        ctx.store.move_wall_to(batch.end);

        let b = batch.ballot_id;
        let mut local = vec![];

        for iid in batch.start..batch.end {
            let inst = match ctx.store.lookup(iid) {
                Lookup::Ok(inst) => inst,
                other => {
                    debug!("batch instance not available"; "iid" => iid, "lookup" => other.name());
                    local.push(BatchFail {
                        instance_id: iid,
                        highest_promised: b,
                    });
                    continue;
                }
            };

            if inst.is_committed() {
                local.push(BatchFail {
                    instance_id: iid,
                    highest_promised: b,
                });
                continue;
            }

            let r = inst.promise(b);
            if !r.ok || r.last_proposal.is_some() {
                local.push(BatchFail {
                    instance_id: iid,
                    highest_promised: max(r.highest_promised, b),
                });
            }
        }

        batch.fails = merge_fails(&local, &batch.fails);
    }

    /// complete dispatches the instances of a batch that went around the ring.
    pub fn complete(ctx: &RingContext, batch: &Batch) {
        let mut fails = batch.fails.iter().peekable();
        let mut max_promised = INVALID_BALLOT;

        for iid in batch.start..batch.end {
            match fails.peek() {
                Some(f) if f.instance_id == iid => {
                    max_promised = max(max_promised, f.highest_promised);
                    let hint = next_ballot_id(max(f.highest_promised, batch.ballot_id), ctx.host_id);
                    ctx.pool.push_failed(iid, hint);
                    fails.next();
                }
                _ => {
                    ctx.pool.push_open(iid, batch.ballot_id);
                }
            }
        }

        if max_promised > batch.ballot_id {
            ctx.raise_ballot(max_promised);
        }

        debug!("batch complete";
               "start" => batch.start, "end" => batch.end, "ballot" => batch.ballot_id,
               "fails" => batch.fails.len());
    }

    /// propose_one prepares the next range. It returns false if there is nothing to do now.
    pub async fn propose_one(ctx: &RingContext) -> bool {
        let snap = ctx.topology.snapshot();
        if !snap.is_master {
            return false;
        }

        if ctx.pool.prepared() as u64 >= ctx.conf.prepare_ahead {
            return false;
        }

        let (start, end) = match ctx.take_batch() {
            Some(r) => r,
            None => return false,
        };

        let ballot = ctx.current_ballot();
        let header = ctx.new_header(&snap);

        let mut batch = Batch {
            start,
            end,
            ballot_id: ballot,
            fails: vec![],
        };
        Self::accept(ctx, &mut batch);

        let batch = if snap.next_is_self() {
            Some(batch)
        } else {
            let waiter = ctx.waits.register(header.request_id);
            ctx.send_ring(
                &snap,
                RingCommand {
                    header,
                    body: Body::Batch(batch),
                },
            );

            match waiter.wait(ctx.reply_timeout()).await {
                Some(RingCommand {
                    body: Body::Batch(b),
                    ..
                }) => Some(b),
                _ => None,
            }
        };

        match batch {
            Some(b) => Self::complete(ctx, &b),
            None => {
                warn!("batch timeout"; "start" => start, "end" => end, "ballot" => ballot);
                let hint = next_ballot_id(ballot, ctx.host_id);
                for iid in start..end {
                    ctx.pool.push_failed(iid, hint);
                }
            }
        }

        true
    }

    pub async fn proposer_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        loop {
            let busy = tokio::select! {
                _ = stop.stopped() => return,
                busy = Self::propose_one(&ctx) => busy,
            };

            if !busy {
                tokio::select! {
                    _ = stop.stopped() => return,
                    _ = tokio::time::sleep(ctx.tick()) => {}
                }
            }
        }
    }

    /// handle runs the acceptor step on a batch from the previous host and forwards it.
    /// A batch larger than `batch_size` is not built by any master and is dropped.
    pub fn handle(ctx: &RingContext, mut cmd: RingCommand) {
        let snap = ctx.topology.snapshot();

        if let Body::Batch(b) = &mut cmd.body {
            if b.end - b.start > ctx.conf.batch_size {
                warn!("drop oversized batch";
                      "start" => b.start, "end" => b.end, "batch_size" => ctx.conf.batch_size);
                return;
            }

            Self::accept(ctx, b);
            ctx.send_ring(&snap, cmd);
        }
    }

    pub async fn acceptor_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        loop {
            let r = tokio::select! {
                _ = stop.stopped() => return,
                r = ctx.batch_inbox.pop(None) => r,
            };

            match r {
                Ok(cmd) => Self::handle(&ctx, cmd),
                Err(QueueError::Inactive) => tokio::task::yield_now().await,
                Err(e) => debug!("batch inbox"; "err" => %e),
            }
        }
    }
}
