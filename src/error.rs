use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    path::PathBuf,
    sync::Mutex,
};

use colored::Colorize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MlogError>;

/// Everything that can go wrong inside the logging core.
///
/// Nothing here ever crosses the C bridge as a panic: the bridge converts
/// errors into its documented return values, and operations with no return
/// channel report through the error callback instead.
#[derive(Debug, Error)]
pub enum MlogError {
    /// Rejected before any resource was touched.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An integer level outside `[0, 5]` reached the core.
    #[error("invalid log level int val: {0}")]
    InvalidLevel(i32),

    /// The log file's directory could not be created.
    #[error("failed to create log directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Rotation failed; the record was still written to the active file.
    #[error("log rotation failed: {0}")]
    Rotation(std::io::Error),

    #[error("failed to install log facade: {0}")]
    Facade(#[from] log::SetLoggerError),
}

/// Invoked as `(message, operation)` whenever an internal operation fails.
pub type ErrorCallback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Diagnostic channel for internal failures.
///
/// Reports go to the registered callback when there is one, to stderr
/// otherwise. A panicking callback is caught and its report is redirected
/// to stderr, so a misbehaving host hook cannot destabilize the core.
#[derive(Default)]
pub struct ErrorReporter {
    callback: Mutex<Option<ErrorCallback>>,
}

impl ErrorReporter {
    pub fn set(&self, callback: Option<ErrorCallback>) {
        *self.callback.lock().unwrap() = callback;
    }

    pub fn report(&self, operation: &str, message: &str) {
        let guard = self.callback.lock().unwrap();
        if let Some(callback) = guard.as_ref()
            && catch_unwind(AssertUnwindSafe(|| callback(message, operation))).is_ok()
        {
            return;
        }
        eprintln!("{} {message}", format!("[mlog error in {operation}]").red());
    }
}
