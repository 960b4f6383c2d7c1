use std::sync::Arc;

use crate::executor::{RecoveryExecutor, RingContext};
use crate::queue::BlockingQueue;
use crate::ring::*;

/// RingCommandHandler is the entry of every command received by a host.
///
/// A ring command is dropped if it belongs to another ring or is not addressed to this host. A
/// command that completed its circuit is handed to the task waiting for it; any other one is
/// queued for the acceptor task of its phase.
#[derive(Clone)]
pub struct RingCommandHandler {
    ctx: Arc<RingContext>,
}

impl RingCommandHandler {
    pub fn new(ctx: Arc<RingContext>) -> Self {
        RingCommandHandler { ctx }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// handle_ring decodes and handles a frame from the previous host.
    /// A malformed frame is an error: the link it came from can not be trusted any more.
    pub async fn handle_ring(&self, buf: &[u8]) -> Result<(), ProtocolError> {
        let cmd = self.ctx.ring_codec.decode(buf)?;
        self.handle_command(cmd).await;
        Ok(())
    }

    pub async fn handle_command(&self, cmd: RingCommand) {
        let ctx = &self.ctx;
        let snap = ctx.topology.snapshot();
        let h = cmd.header;

        if h.ring_id != snap.ring_id {
            debug!("drop command of another ring"; "cmd" => %cmd, "ring_id" => snap.ring_id);
            return;
        }

        if h.dst_host_id != ctx.host_id {
            debug!("drop command for another host"; "cmd" => %cmd, "host_id" => ctx.host_id);
            return;
        }

        if ctx.is_own_request(h.request_id) {
            if let Err(cmd) = ctx.waits.send(h.request_id, cmd) {
                debug!("drop expired reply"; "cmd" => %cmd);
            }
            return;
        }

        let inbox: &BlockingQueue<RingCommand> = match cmd.body {
            Body::Batch(_) => &ctx.batch_inbox,
            Body::Promise(_) => &ctx.phase1_inbox,
            Body::Vote(_) => &ctx.phase2_inbox,
        };

        let name = cmd.name();
        if let Err(e) = inbox.push(cmd, Some(ctx.reply_timeout())).await {
            warn!("drop ring command"; "type" => name, "request_id" => h.request_id, "err" => %e);
        }
    }

    /// handle_datagram decodes and handles a datagram command. Datagrams are handled at once:
    /// none of them waits.
    pub fn handle_datagram(&self, buf: &[u8]) -> Result<(), ProtocolError> {
        let cmd = self.ctx.udp_codec.decode(buf)?;
        RecoveryExecutor::handle(&self.ctx, cmd);
        Ok(())
    }
}
