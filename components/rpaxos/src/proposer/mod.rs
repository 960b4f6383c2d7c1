mod heap;
pub use heap::*;

mod pool;
pub use pool::*;

#[cfg(test)]
mod test_heap;
