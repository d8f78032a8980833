use std::{path::PathBuf, sync::LazyLock};

use derive_from_env::FromEnv;

use crate::{
    error::MlogError,
    level::Level,
};

/// One initialization of the logging core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Path of the active log file. Rotated backups live next to it as
    /// `path.1`, `path.2`, ...
    pub log_path: PathBuf,
    /// Size threshold in bytes that triggers rotation. 0 disables rotation
    /// entirely and the active file grows without bound.
    pub max_file_size: u64,
    /// Total number of files kept on disk, active file included. Must be
    /// at least 1 even when rotation is disabled.
    pub max_files: u32,
    /// Route writes through the worker pool instead of the calling thread.
    pub async_mode: bool,
    /// Worker threads in the pool. Only consulted in async mode, but must
    /// always be at least 1.
    pub thread_pool_size: usize,
    /// Records below this level are discarded before reaching the sink.
    pub min_level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::new(),
            max_file_size: 10 * 1024 * 1024,
            max_files: 5,
            async_mode: true,
            thread_pool_size: 1,
            min_level: Level::Info,
        }
    }
}

impl LoggerConfig {
    /// Default configuration for a path: 10 MiB rotation threshold, 5
    /// retained files, async mode, one worker, `Info` minimum.
    pub fn new<P: Into<PathBuf>>(log_path: P) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(MlogError::InvalidConfig("log_path must not be empty".into()));
        }
        if self.max_files < 1 {
            return Err(MlogError::InvalidConfig("max_files must be at least 1".into()));
        }
        if self.thread_pool_size < 1 {
            return Err(MlogError::InvalidConfig(
                "thread_pool_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(FromEnv)]
#[from_env(prefix = "MLOG")]
#[allow(non_snake_case)]
pub struct MlogEnvConfig {
    /// Idle workers flush their sink this often (milliseconds).
    #[from_env(default = "100")]
    pub FLUSH_INTERVAL_MS: u64,
    /// Capacity of the async queue; producers block once it fills up.
    #[from_env(default = "8192")]
    pub QUEUE_CAPACITY: usize,
}

pub static MLOG_CONFIG: LazyLock<MlogEnvConfig> =
    LazyLock::new(|| MlogEnvConfig::from_env().unwrap());
