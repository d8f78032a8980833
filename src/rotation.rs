use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::{MlogError, Result};

/// A size-bounded rotating file writer.
///
/// Appends UTF-8 lines to the active file at `path`. When a write would
/// push the active file over `max_size` bytes, the file is rolled into a
/// ring of numbered backups: `path` becomes `path.1`, `path.1` becomes
/// `path.2`, and so on, keeping at most `max_files` files on disk in
/// total. A `max_size` of 0 disables rotation entirely.
pub struct RotatingFileSink {
    path: PathBuf,
    max_size: u64,
    max_files: u32,
    file: BufWriter<File>,
    current_size: u64,
}

impl RotatingFileSink {
    pub fn new(path: PathBuf, max_size: u64, max_files: u32) -> Result<Self> {
        let file = open_append(&path)?;
        let current_size = file.get_ref().metadata()?.len();
        Ok(Self {
            path,
            max_size,
            max_files,
            file,
            current_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line, rotating first when the write would cross the
    /// size threshold. A failed rotation does not lose the record: it is
    /// written to the still-open active file and the rotation error is
    /// returned for the caller to report.
    pub fn write(&mut self, line: &str) -> Result<()> {
        let incoming = line.len() as u64 + 1;
        let rotation_error = if self.should_rotate(incoming) {
            self.rotate().err()
        } else {
            None
        };
        writeln!(self.file, "{line}")?;
        self.current_size += incoming;
        match rotation_error {
            Some(e) => Err(MlogError::Rotation(e)),
            None => Ok(()),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        self.max_size > 0
            && self.current_size > 0
            && self.current_size + incoming > self.max_size
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        self.file.flush()?;
        if self.max_files > 1 {
            let oldest = backup_path(&self.path, self.max_files - 1);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for i in (1..self.max_files - 1).rev() {
                let from = backup_path(&self.path, i);
                if from.exists() {
                    fs::rename(&from, backup_path(&self.path, i + 1))?;
                }
            }
            fs::rename(&self.path, backup_path(&self.path, 1))?;
        }
        // with a single retained file the active file is truncated in place
        self.file = open_truncate(&self.path)?;
        self.current_size = 0;
        Ok(())
    }
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> std::io::Result<BufWriter<File>> {
    let file = File::options().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

fn open_truncate(path: &Path) -> std::io::Result<BufWriter<File>> {
    let file = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}
