use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    config::{LoggerConfig, MLOG_CONFIG},
    error::{ErrorCallback, ErrorReporter, Result},
    level::Level,
    rotation::RotatingFileSink,
    utils::{ensure_parent_dir, format_exception, format_record},
    worker::{Job, WorkerPool, shared_pool},
};

enum Backend {
    Sync,
    Async { pool: Arc<WorkerPool> },
}

/// One initialized logging session: the sink, the dispatch backend and the
/// current filter. Owned exclusively by the manager between `initialize`
/// and `terminate`.
struct ActiveLogger {
    sink: Arc<Mutex<RotatingFileSink>>,
    backend: Backend,
    min_level: Level,
}

impl ActiveLogger {
    /// Records at `Error` and above force a flush, so the lines that
    /// matter most survive a crashing host.
    fn write(&self, level: Level, line: String, reporter: &Arc<ErrorReporter>) -> Result<()> {
        let flush_now = level >= Level::Error;
        match &self.backend {
            Backend::Sync => {
                let mut sink = self.sink.lock().unwrap();
                sink.write(&line)?;
                if flush_now {
                    sink.flush()?;
                }
                Ok(())
            }
            Backend::Async { pool } => {
                pool.dispatch(Job::Record {
                    sink: Arc::clone(&self.sink),
                    line,
                    flush_now,
                    reporter: Arc::clone(reporter),
                });
                Ok(())
            }
        }
    }

    fn flush(&self) -> Result<()> {
        if let Backend::Async { pool } = &self.backend {
            pool.wait_idle();
        }
        self.sink.lock().unwrap().flush()
    }
}

/// The logging core.
///
/// Exactly one of two states: Uninitialized (`inner` is `None`) or
/// Initialized. One mutex serializes every state access; in async mode the
/// physical write happens on a worker thread without that lock held.
/// Logging operations on an Uninitialized manager are silent no-ops so
/// hosts may log opportunistically without checking state first.
pub struct LoggerManager {
    inner: Mutex<Option<ActiveLogger>>,
    reporter: Arc<ErrorReporter>,
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
            reporter: Arc::new(ErrorReporter::default()),
        }
    }

    /// Validates the config, tears down any current session, and builds the
    /// new one. On failure nothing is left half-built: the manager is
    /// Uninitialized, the error is reported through the error channel and
    /// returned.
    pub fn initialize(&self, config: LoggerConfig) -> Result<()> {
        config.validate()?;

        let mut deferred = Vec::new();
        let result = self.initialize_locked(&config, &mut deferred);
        for (operation, message) in deferred {
            self.reporter.report(operation, &message);
        }
        if let Err(e) = &result {
            self.reporter.report("initialize", &e.to_string());
        }
        result
    }

    fn initialize_locked(
        &self,
        config: &LoggerConfig,
        deferred: &mut Vec<(&'static str, String)>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        // Reinitialize path: flush and release the current session under
        // the same lock `log` takes, so no in-flight call can write into a
        // half-torn-down sink. A flush failure must not block the rebuild.
        if let Some(active) = inner.take()
            && let Err(e) = active.flush()
        {
            deferred.push(("terminate::flush", e.to_string()));
        }

        ensure_parent_dir(&config.log_path)?;
        let sink = RotatingFileSink::new(
            config.log_path.clone(),
            config.max_file_size,
            config.max_files,
        )?;
        let backend = if config.async_mode {
            let pool = shared_pool(config.thread_pool_size, MLOG_CONFIG.QUEUE_CAPACITY);
            Backend::Async { pool }
        } else {
            Backend::Sync
        };
        *inner = Some(ActiveLogger {
            sink: Arc::new(Mutex::new(sink)),
            backend,
            min_level: config.min_level,
        });
        Ok(())
    }

    /// `initialize` with the documented defaults for a path.
    pub fn initialize_default<P: Into<PathBuf>>(&self, log_path: P) -> Result<()> {
        self.initialize(LoggerConfig::new(log_path))
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().unwrap().is_some()
    }

    /// Flushes pending records and releases the sink and pool handle.
    /// Idempotent; a flush failure never prevents the release.
    pub fn terminate(&self) {
        let mut deferred = None;
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(active) = inner.take()
                && let Err(e) = active.flush()
            {
                deferred = Some(e.to_string());
            }
        }
        if let Some(message) = deferred {
            self.reporter.report("terminate::flush", &message);
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        if message.is_empty() {
            return;
        }
        let result = {
            let inner = self.inner.lock().unwrap();
            let Some(active) = inner.as_ref() else {
                return;
            };
            if level < active.min_level {
                return;
            }
            let line = format_record(level, message);
            active.write(level, line, &self.reporter)
        };
        if let Err(e) = result {
            self.reporter.report("log", &e.to_string());
        }
    }

    /// Formats an exception triple and emits it at `Error` severity. Every
    /// field is independently optional.
    pub fn log_exception(
        &self,
        exception_type: Option<&str>,
        message: Option<&str>,
        stack_trace: Option<&str>,
    ) {
        let result = {
            let inner = self.inner.lock().unwrap();
            let Some(active) = inner.as_ref() else {
                return;
            };
            if Level::Error < active.min_level {
                return;
            }
            let block = format_exception(exception_type, message, stack_trace);
            let line = format_record(Level::Error, &block);
            active.write(Level::Error, line, &self.reporter)
        };
        if let Err(e) = result {
            self.reporter.report("logException", &e.to_string());
        }
    }

    /// Pushes every buffered record to disk before returning, in either
    /// mode. In async mode this drains the worker queue first.
    pub fn flush(&self) {
        let result = {
            let inner = self.inner.lock().unwrap();
            let Some(active) = inner.as_ref() else {
                return;
            };
            active.flush()
        };
        if let Err(e) = result {
            self.reporter.report("flush", &e.to_string());
        }
    }

    /// Returns `Level::Info` while Uninitialized so callers can query at
    /// any time.
    pub fn get_log_level(&self) -> Level {
        self.inner
            .lock()
            .unwrap()
            .as_ref()
            .map(|active| active.min_level)
            .unwrap_or(Level::Info)
    }

    /// Changes the filter without reinitializing. No-op while
    /// Uninitialized.
    pub fn set_log_level(&self, level: Level) {
        if let Some(active) = self.inner.lock().unwrap().as_mut() {
            active.min_level = level;
        }
    }

    /// Registers (or clears, with `None`) the diagnostic callback. Works
    /// in any state.
    pub fn set_error_callback(&self, callback: Option<ErrorCallback>) {
        self.reporter.set(callback);
    }

    /// The error channel itself, public so the boundary layer can route
    /// contract violations (such as out-of-range integer levels) through
    /// the same diagnostics path.
    pub fn report_error(&self, operation: &str, message: &str) {
        self.reporter.report(operation, message);
    }
}

impl Drop for LoggerManager {
    fn drop(&mut self) {
        self.terminate();
    }
}
