use std::sync::Arc;

use crate::executor::{RingContext, StopSignal};
use crate::snapshot::SnapshotError;

/// deliver hands every value ready on the learner to the subscribers, in instance order.
///
/// Delivered values are persisted first: an acceptor may forget an instance only once it is in
/// the snapshot. The learner consumes them only after the write succeeded, a failed write leaves
/// them ready for the next try. A no-op, or a value delivered before at another instance, is
/// persisted but not published.
/// It returns the number of instances delivered.
pub fn deliver(ctx: &RingContext) -> Result<usize, SnapshotError> {
    let _delivering = ctx.delivering.lock().unwrap();

    let ready = ctx.learner.lock().unwrap().ready()?;
    if ready.is_empty() {
        return Ok(0);
    }

    let batch: Vec<_> = ready
        .iter()
        .map(|d| (d.instance_id, d.value.clone()))
        .collect();

    let last_snapshot = ctx.snapshot.persist(&batch)?;
    ctx.learner.lock().unwrap().confirm(&ready);
    ctx.store.move_last_snapshot_to(last_snapshot);

    for d in ready.iter() {
        if d.value.is_noop() {
            continue;
        }

        if d.duplicate {
            debug!("skip duplicate value"; "iid" => d.instance_id, "value" => %d.value);
            continue;
        }
        ctx.publish(d.instance_id, &d.value);
    }

    Ok(ready.len())
}

/// delivery_loop delivers whenever the learner is notified, or every tick.
pub async fn delivery_loop(ctx: Arc<RingContext>, mut stop: StopSignal) {
    loop {
        tokio::select! {
            _ = stop.stopped() => return,
            _ = ctx.learned.notified() => {}
            _ = tokio::time::sleep(ctx.tick()) => {}
        }

        if let Err(e) = deliver(&ctx) {
            error!("deliver"; "err" => %e);
        }
    }
}
