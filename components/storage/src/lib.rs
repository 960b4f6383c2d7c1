#[macro_use]
extern crate quick_error;

mod errors;
pub use errors::*;

mod traits;
pub use traits::*;

mod mem_engine;
pub use mem_engine::*;

#[cfg(test)]
mod test_engine;
