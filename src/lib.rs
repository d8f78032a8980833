//! # mlog
//! Embeddable logging core: rotating log files, sync or async dispatch,
//! and a non-panicking error-reporting channel, built to sit behind a C
//! bridge inside a host application.
//!
//! ## Usage
//! ```rust
//! use mlog::{Level, LoggerConfig, LoggerManager};
//!
//! let manager = LoggerManager::new();
//! manager.initialize(LoggerConfig {
//!     async_mode: false,
//!     ..LoggerConfig::new("/tmp/mlog_doc/app.log")
//! }).unwrap();
//!
//! manager.log(Level::Info, "Hello, world!");
//! manager.flush();
//! assert!(std::fs::read_to_string("/tmp/mlog_doc/app.log").unwrap().contains("Hello, world!"));
//! ```
//!
//! ## Asynchronous logging
//! Async mode hands writes to a shared worker pool; the queue blocks
//! producers when full rather than dropping records.
//! ```rust
//! use mlog::{Level, LoggerConfig, LoggerManager};
//!
//! let manager = LoggerManager::new();
//! manager.initialize(LoggerConfig {
//!     async_mode: true,
//!     thread_pool_size: 2,
//!     ..LoggerConfig::new("/tmp/mlog_doc/async.log")
//! }).unwrap();
//!
//! manager.log(Level::Warn, "handed to the pool");
//! manager.flush(); // drains the queue before returning
//! manager.terminate();
//! ```
//!
//! ## Routing the `log` macros
//! A [`LogFacade`] can forward the standard facade into a manager:
//! ```rust,no_run
//! use std::sync::Arc;
//! use mlog::{LoggerManager, install_facade};
//!
//! let manager = Arc::new(LoggerManager::new());
//! manager.initialize_default("/tmp/mlog_doc/facade.log").unwrap();
//! install_facade(Arc::clone(&manager)).unwrap();
//! log::info!("Hello, world!");
//! ```

mod config;
mod error;
mod facade;
mod level;
mod manager;
mod rotation;
mod utils;
mod worker;

pub use config::{LoggerConfig, MLOG_CONFIG, MlogEnvConfig};
pub use error::{ErrorCallback, ErrorReporter, MlogError, Result};
pub use facade::{LogFacade, install_facade};
pub use level::Level;
pub use manager::LoggerManager;
pub use rotation::RotatingFileSink;
pub use utils::{ensure_parent_dir, format_exception, format_record};
pub use worker::{Job, WorkerPool, shared_pool};
