use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use slog::Drain;
use slog_scope::GlobalLoggerGuard;

use super::log_format::LineFormat;

pub const DEFAULT_LOG_FILE: &str = "rpax.log";

/// init_logger installs the global logger, writing to `path` or to `rpax.log` in the working
/// directory.
/// Logging stops when the returned guard is dropped.
pub fn init_logger(path: Option<&Path>) -> io::Result<GlobalLoggerGuard> {
    let log_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let mut p = env::current_dir().unwrap_or_else(|_| PathBuf::new());
            p.push(DEFAULT_LOG_FILE);
            p
        }
    };

    let file = open_log_file(&log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = LineFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let logger = slog::Logger::root(drain, slog::o!("pid" => std::process::id()));
    let guard = slog_scope::set_global_logger(logger);

    info!("logger ready"; "path" => %log_path.display());
    Ok(guard)
}

/// Opens log file with append mode. Creates it and its directory if they do not exist.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent)?
        }
    }
    OpenOptions::new().append(true).create(true).open(path)
}
