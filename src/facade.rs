use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record};

use crate::{error::Result, level::Level, manager::LoggerManager};

/// Routes the standard `log` macros into a manager instance.
pub struct LogFacade {
    manager: Arc<LoggerManager>,
}

impl LogFacade {
    pub fn new(manager: Arc<LoggerManager>) -> Self {
        Self { manager }
    }
}

impl Log for LogFacade {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Level::from(metadata.level()) >= self.manager.get_log_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.manager
            .log(Level::from(record.level()), &record.args().to_string());
    }

    fn flush(&self) {
        self.manager.flush();
    }
}

/// Installs a facade over `manager` as the process-global logger.
///
/// Can only succeed once per process (`log` allows a single global
/// logger); the manager's own filter decides what reaches the file, so the
/// global max level is left wide open.
pub fn install_facade(manager: Arc<LoggerManager>) -> Result<()> {
    log::set_boxed_logger(Box::new(LogFacade::new(manager)))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
