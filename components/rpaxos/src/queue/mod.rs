mod blocking_queue;
pub use blocking_queue::*;

mod wait_pool;
pub use wait_pool::*;

mod errors;
pub use errors::*;

#[cfg(test)]
mod test_blocking_queue;

#[cfg(test)]
mod test_wait_pool;
