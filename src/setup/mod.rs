mod log_format;
mod setup;

pub use self::log_format::*;
pub use self::setup::*;
