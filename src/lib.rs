#[macro_use]
extern crate quick_error;

extern crate slog;

#[macro_use]
extern crate slog_scope;

mod errors;
pub use errors::*;

pub mod setup;

mod server;
pub use server::*;
