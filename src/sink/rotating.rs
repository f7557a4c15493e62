//! Size-bounded rotating file sink.
//!
//! The active file is `<dir>/<file_name>`; backups are `<file_name>.1` (newest)
//! through `<file_name>.<backup_count>` (oldest). Before a write that would push
//! the active file past `max_bytes`, the backups are shifted up one slot, the
//! oldest is discarded and a fresh active file is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::LogConfig;
use crate::sink::{LogRecord, LogSink, SinkError};

/// Rotation settings for a [`RotatingFileSink`].
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// Directory holding the file set. Must already exist.
    pub dir: PathBuf,
    /// Name of the active file.
    pub file_name: String,
    /// Rotation threshold in bytes. 0 disables rotation.
    pub max_bytes: u64,
    /// Number of rotated files to retain.
    pub backup_count: usize,
    /// Call `sync_data` after every record.
    pub sync: bool,
}

impl RotationPolicy {
    /// Path of the file currently being written.
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Path of backup slot `n` (1 is the newest).
    pub fn backup_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", self.file_name, n))
    }
}

impl From<&LogConfig> for RotationPolicy {
    fn from(config: &LogConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            file_name: config.file_name.clone(),
            max_bytes: config.max_bytes,
            backup_count: config.backup_count,
            sync: config.sync,
        }
    }
}

struct ActiveFile {
    file: File,
    size: u64,
}

/// Append-only JSON-lines sink with size based rotation.
///
/// A single mutex covers the whole check/rotate/write/flush sequence, so
/// concurrent callers never interleave bytes and a record always lands in
/// exactly one file.
pub struct RotatingFileSink {
    policy: RotationPolicy,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink {
    /// Open (or create) the active file. The directory is not created.
    pub fn open(policy: RotationPolicy) -> Result<Self, SinkError> {
        let path = policy.active_path();
        let file = open_append(&path)?;
        let size = file
            .metadata()
            .map_err(|e| SinkError::io(&path, e))?
            .len();

        tracing::info!(
            path = %path.display(),
            size,
            max_bytes = policy.max_bytes,
            backup_count = policy.backup_count,
            "Log sink opened"
        );

        Ok(Self {
            policy,
            active: Mutex::new(ActiveFile { file, size }),
        })
    }

    fn should_rotate(&self, active: &ActiveFile, incoming: u64) -> bool {
        self.policy.max_bytes > 0
            && active.size > 0
            && active.size + incoming > self.policy.max_bytes
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<(), SinkError> {
        let active_path = self.policy.active_path();
        active
            .file
            .flush()
            .map_err(|e| SinkError::io(&active_path, e))?;

        if self.policy.backup_count == 0 {
            active
                .file
                .set_len(0)
                .map_err(|e| SinkError::io(&active_path, e))?;
            active.size = 0;
            tracing::debug!(path = %active_path.display(), "Log file truncated");
            return Ok(());
        }

        let oldest = self.policy.backup_path(self.policy.backup_count);
        remove_if_exists(&oldest)?;

        for slot in (1..self.policy.backup_count).rev() {
            let from = self.policy.backup_path(slot);
            let to = self.policy.backup_path(slot + 1);
            rename_if_exists(&from, &to)?;
        }

        // The active file may have been removed externally; start a new one.
        let first = self.policy.backup_path(1);
        rename_if_exists(&active_path, &first)?;

        active.file = open_append(&active_path)?;
        active.size = 0;

        tracing::debug!(
            from = %active_path.display(),
            to = %first.display(),
            "Log file rotated"
        );
        Ok(())
    }

    /// Make sure the handle still refers to the file at the active path.
    ///
    /// The directory or file may have been removed, replaced or made
    /// read-only since the last write. The handle is reopened in that case,
    /// which fails when the directory is gone or unwritable, instead of
    /// writing into an unlinked inode.
    fn ensure_current(&self, active: &mut ActiveFile) -> Result<(), SinkError> {
        let path = self.policy.active_path();

        let on_disk = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return self.reopen(active, &path, "missing");
            }
            Err(e) => return Err(SinkError::io(&path, e)),
        };

        let held = active.file.metadata().map_err(|e| SinkError::io(&path, e))?;
        if !same_file(&held, &on_disk) {
            return self.reopen(active, &path, "replaced");
        }
        if on_disk.permissions().readonly() {
            return self.reopen(active, &path, "read-only");
        }

        active.size = on_disk.len();
        Ok(())
    }

    fn reopen(&self, active: &mut ActiveFile, path: &Path, reason: &str) -> Result<(), SinkError> {
        tracing::warn!(path = %path.display(), reason, "Reopening log file");
        let file = open_append(path)?;
        let size = file.metadata().map_err(|e| SinkError::io(path, e))?.len();
        *active = ActiveFile { file, size };
        Ok(())
    }
}

impl LogSink for RotatingFileSink {
    fn append(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = record.to_line()?;
        let incoming = line.len() as u64;

        let mut active = self.active.lock().map_err(|_| SinkError::Poisoned)?;

        self.ensure_current(&mut active)?;

        if self.should_rotate(&active, incoming) {
            self.rotate(&mut active)?;
        }

        let path = self.policy.active_path();
        let size = active.size;
        write_record(&mut active.file, size, &line).map_err(|e| SinkError::io(&path, e))?;
        active.size += incoming;

        active.file.flush().map_err(|e| SinkError::io(&path, e))?;
        if self.policy.sync {
            active
                .file
                .sync_data()
                .map_err(|e| SinkError::io(&path, e))?;
        }

        Ok(())
    }
}

/// A file that can be cut back to a record boundary.
trait RecordFile: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl RecordFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Append one whole line at `size`, or leave the file at `size` on failure.
fn write_record<F: RecordFile>(file: &mut F, size: u64, line: &[u8]) -> io::Result<()> {
    if let Err(e) = file.write_all(line) {
        if let Err(rollback) = file.truncate_to(size) {
            tracing::error!(error = %rollback, "Failed to drop partial record");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.len() == b.len() && a.modified().ok() == b.modified().ok()
}

fn open_append(path: &Path) -> Result<File, SinkError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SinkError::io(path, e))
}

fn remove_if_exists(path: &Path) -> Result<(), SinkError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SinkError::io(path, e)),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> Result<(), SinkError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SinkError::io(from, e)),
    }
}
