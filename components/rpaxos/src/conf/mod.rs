mod conf;
mod coordinator;
mod errors;

pub use self::conf::*;
pub use coordinator::*;
pub use errors::*;

#[cfg(test)]
mod test_conf;
