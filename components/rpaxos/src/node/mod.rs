mod errors;
mod node;

pub use self::errors::*;
pub use self::node::*;
