mod errors;
pub use errors::*;

mod store;
pub use store::*;
