mod instance;
pub use instance::*;

mod store;
pub use store::*;

#[cfg(test)]
mod test_instance;
