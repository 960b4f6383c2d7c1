//! Learner side of the ring: it collects provisional values and commits, finds out which
//! instances must be recovered and delivers committed values in instance order.

mod commit_tracker;
pub use commit_tracker::*;

mod instance_buffer;
pub use instance_buffer::*;

mod pending_pool;
pub use pending_pool::*;

mod value_cache;
pub use value_cache::*;

mod learner;
pub use learner::*;


#[cfg(test)]
mod test_instance_buffer;

#[cfg(test)]
mod test_pending_pool;


#[cfg(test)]
mod test_learner;
