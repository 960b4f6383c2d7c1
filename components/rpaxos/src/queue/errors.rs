quick_error! {
    /// QueueError is why a push or pop on a queue did not happen.
    /// None of them is fatal: the caller backs off or gives up the item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum QueueError {
        /// The queue is deactivated.
        Inactive {
            display("queue is inactive")
        }

        /// Nothing happened before the deadline.
        Timeout {
            display("queue operation timed out")
        }

        /// The queue is full and the caller does not wait.
        Full {
            display("queue is full")
        }
    }
}
