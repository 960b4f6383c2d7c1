use std::sync::Arc;

use crate::executor::{Phase2Executor, RingContext, StopSignal};
use crate::ring::*;
use crate::types::*;

/// RecoveryExecutor fetches committed values this host missed: a lost datagram, or a commit
/// of a proposal this host never accepted.
pub struct RecoveryExecutor;

impl RecoveryExecutor {
    /// recover sends a RECOVER for every instance that blocks delivery.
    /// It returns the number of requests sent.
    pub fn recover(ctx: &RingContext) -> usize {
        let snap = ctx.topology.snapshot();
        if snap.next_is_self() {
            return 0;
        }

        let missing = ctx.learner.lock().unwrap().missing(ctx.conf.batch_size as usize);

        // the master knows every committed value; the master itself asks its next host
        let dst = if snap.is_master { snap.next } else { snap.master };

        for iid in missing.iter() {
            debug!("recover"; "iid" => iid, "dst" => dst);
            ctx.send_udp(
                dst,
                &UdpCommand::Recover {
                    request_id: ctx.guid.next(),
                    instance_id: *iid,
                },
            );
        }

        missing.len()
    }

    /// recover_loop looks for missing values every reply timeout, as long as delivery does not
    /// move on.
    pub async fn recover_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
        let mut last = INVALID_INSTANCE;

        loop {
            tokio::select! {
                _ = stop.stopped() => return,
                _ = tokio::time::sleep(ctx.reply_timeout()) => {}
            }

            let next = ctx.learner.lock().unwrap().next_to_deliver();
            if next != last {
                last = next;
                continue;
            }

            let n = Self::recover(&ctx);
            if n > 0 {
                info!("delivery stalled, recovering"; "next_to_deliver" => next, "n" => n);
            }
        }
    }

    /// on_recover answers with the committed value of the instance, if this host has it.
    pub fn on_recover(ctx: &RingContext, request_id: RequestId, iid: InstanceId) {
        let committed = ctx.store.peek(iid).and_then(|inst| inst.committed_value());

        let value = match committed {
            Some(v) => Some(v),
            None => match ctx.snapshot.get(iid) {
                Ok(v) => v,
                Err(e) => {
                    error!("read snapshot"; "iid" => iid, "err" => %e);
                    None
                }
            },
        };

        let value = match value {
            Some(v) => v,
            None => {
                debug!("can not recover, value unknown"; "iid" => iid);
                return;
            }
        };

        ctx.send_udp(
            guid_host(request_id),
            &UdpCommand::Recovered {
                request_id,
                instance_id: iid,
                value,
            },
        );
    }

    pub fn on_recovered(ctx: &RingContext, iid: InstanceId, value: Value) {
        debug!("recovered"; "iid" => iid, "value" => %value);
        ctx.learn_committed(iid, value);
    }

    /// handle dispatches a datagram command.
    pub fn handle(ctx: &RingContext, cmd: UdpCommand) {
        match cmd {
            UdpCommand::Propose {
                instance_id,
                ballot_id,
                value,
                ..
            } => Phase2Executor::on_propose(ctx, instance_id, ballot_id, value),
            UdpCommand::Commit {
                instance_id,
                value_id,
            } => Phase2Executor::commit(ctx, instance_id, value_id),
            UdpCommand::Recover {
                request_id,
                instance_id,
            } => Self::on_recover(ctx, request_id, instance_id),
            UdpCommand::Recovered {
                instance_id, value, ..
            } => Self::on_recovered(ctx, instance_id, value),
        }
    }
}
