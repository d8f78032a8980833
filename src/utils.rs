use std::{fs, path::Path};

use chrono::Utc;

use crate::{
    error::{MlogError, Result},
    level::Level,
};

/// Creates the directory chain a log file will live in.
///
/// A bare filename has no parent and needs nothing created. An existing
/// parent that is not a directory is an error.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() {
        if dir.is_dir() {
            return Ok(());
        }
        return Err(MlogError::Directory {
            path: dir.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "parent exists and is not a directory",
            ),
        });
    }
    fs::create_dir_all(dir).map_err(|source| MlogError::Directory {
        path: dir.to_path_buf(),
        source,
    })
}

pub fn format_record(level: Level, message: &str) -> String {
    let time = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f");
    format!("[{time} {level}] {message}")
}

/// Renders an exception triple into one text block. Every field is
/// independently optional; the fixed tag is always present.
pub fn format_exception(
    exception_type: Option<&str>,
    message: Option<&str>,
    stack_trace: Option<&str>,
) -> String {
    let mut result = String::from("[EXCEPTION] ");
    if let Some(ty) = exception_type
        && !ty.is_empty()
    {
        result.push_str(ty);
        result.push_str(": ");
    }
    if let Some(msg) = message {
        result.push_str(msg);
    }
    if let Some(stack) = stack_trace
        && !stack.is_empty()
    {
        result.push('\n');
        result.push_str(stack);
    }
    result
}
