use tokio::sync::watch;

/// StopSignal is shared by every task of a node; `stopped` completes once the node stops.
#[derive(Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// new returns the sender that stops the node, and the signal.
    pub fn new() -> (watch::Sender<bool>, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (tx, StopSignal { rx })
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn stopped(&mut self) {
        while !*self.rx.borrow() {
            // a dropped sender stops the node as well
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
