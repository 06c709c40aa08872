//! Size-rotated file sink
//!
//! Frames are appended to the active file and a running byte count is kept.
//! As soon as a write pushes the count past the configured threshold the
//! sink rotates, before it accepts the next frame:
//!
//! ```text
//! app.log.rotating  created empty
//! app.log.(n-1)     removed
//! app.log.i      -> app.log.(i+1)   for i = n-2 .. 0
//! app.log        -> app.log.0
//! app.log.rotating -> app.log
//! ```
//!
//! `app.log.0` is therefore always the most recently closed file. With
//! `max_backup_files = 0` the active file is truncated in place instead.

use crate::core::{LoggerError, LoggerMetrics, MetricEvent, Result, Sink};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// When and how a [`FileSink`] rotates
///
/// # Examples
///
/// ```
/// use rust_log_engine::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_compression(true);
/// assert_eq!(policy.max_backup_files, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the active file holds more than this many bytes
    pub max_file_size: u64,
    /// Number of backups kept
    pub max_backup_files: usize,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MB
            max_backup_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// File sink with size-based rotation
///
/// # Examples
///
/// ```no_run
/// use rust_log_engine::sinks::{FileSink, RotationPolicy};
/// use rust_log_engine::Sink;
///
/// let policy = RotationPolicy::new().with_max_size(1024 * 1024).with_max_backups(3);
/// let mut sink = FileSink::open("/var/log/app.log", policy).unwrap();
/// sink.write_frame(b"[1736332245] [INFO] started\n").unwrap();
/// ```
pub struct FileSink {
    path: PathBuf,
    policy: RotationPolicy,
    file: File,
    current_size: u64,
    metrics: Option<Arc<LoggerMetrics>>,
    /// Set after a failed rotation has been reported; cleared on success
    rotation_failure_reported: bool,
}

impl FileSink {
    /// Open (or create) the active log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns error if the parent directory or the file cannot be created
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        format!("Failed to create directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = open_append(&path).map_err(|e| {
            LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

        let current_size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok(Self {
            path,
            policy,
            file,
            current_size,
            metrics: None,
            rotation_failure_reported: false,
        })
    }

    /// Report rotations and rotation failures to `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Bytes written to the active file since it was opened or rotated
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of backup slot `index`
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("app.log"));
        name.push(format!(".{}", index));
        self.path.with_file_name(name)
    }

    /// Where the replacement active file is prepared during rotation
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".rotating");
        PathBuf::from(name)
    }

    fn record(&self, event: MetricEvent) {
        if let Some(ref metrics) = self.metrics {
            metrics.record(event);
        }
    }

    /// Close the active file into the backup chain and start a fresh one.
    ///
    /// On error the sink keeps its current handle, so writing continues
    /// into whichever file that handle refers to.
    pub fn rotate(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to flush before rotation: {}", e),
            )
        })?;

        if self.policy.max_backup_files == 0 {
            self.file.set_len(0).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to truncate log file: {}", e),
                )
            })?;
            self.current_size = 0;
            return Ok(());
        }

        // The handle no longer refers to `path` (moved or deleted from outside,
        // or an earlier rotation could not be rolled back). Start a fresh
        // active file and leave the backup chain alone, since the handle may
        // point into it.
        if !self.path.exists() {
            self.file = open_append(&self.path).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to recreate missing log file: {}", e),
                )
            })?;
            self.current_size = 0;
            return Ok(());
        }

        // Created before anything is moved, so running out of descriptors or
        // disk space fails the rotation with every file still in place.
        let staging = self.staging_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&staging)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        if let Err(e) = self.shift_backups() {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        let newest_backup = self.backup_path(0);
        if let Err(e) = fs::rename(&self.path, &newest_backup) {
            let _ = fs::remove_file(&staging);
            return Err(LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to rotate current log file: {}", e),
            ));
        }

        if let Err(e) = fs::rename(&staging, &self.path) {
            // Put the active file back so the handle refers to `path` again.
            // If that fails too, `path` is missing and the next rotation
            // recreates it without touching the backups.
            let restored = fs::rename(&newest_backup, &self.path);
            let _ = fs::remove_file(&staging);
            return Err(LoggerError::file_rotation(
                self.path.display().to_string(),
                format!(
                    "Failed to install new log file: {}{}",
                    e,
                    if restored.is_err() { " (active file left in backup slot 0)" } else { "" }
                ),
            ));
        }

        // The previous handle is dropped (and closed) only now that its
        // replacement exists.
        self.file = file;
        self.current_size = 0;

        if self.policy.compress {
            if let Err(e) = compress_file(&newest_backup) {
                eprintln!(
                    "[LOGGER WARNING] Failed to compress rotated log {}: {}. Keeping it uncompressed.",
                    newest_backup.display(),
                    e
                );
            }
        }

        Ok(())
    }

    /// Move every backup one slot up, discarding the oldest
    fn shift_backups(&self) -> Result<()> {
        let max = self.policy.max_backup_files;

        let oldest = self.backup_path(max - 1);
        remove_if_exists(&oldest)?;
        remove_if_exists(&gz_path(&oldest))?;

        for i in (0..max - 1).rev() {
            let from = self.backup_path(i);
            let to = self.backup_path(i + 1);
            rename_if_exists(&from, &to)?;
            rename_if_exists(&gz_path(&from), &gz_path(&to))?;
        }

        Ok(())
    }

    fn rotate_or_report(&mut self) {
        match self.rotate() {
            Ok(()) => {
                self.rotation_failure_reported = false;
                self.record(MetricEvent::Rotated);
            }
            Err(e) => {
                self.record(MetricEvent::RotationFailed);
                if !self.rotation_failure_reported {
                    eprintln!(
                        "[LOGGER ERROR] Log rotation failed: {}. Continuing with current file.",
                        e
                    );
                    self.rotation_failure_reported = true;
                }
                // Retry after another full threshold rather than on every write
                self.current_size = 0;
            }
        }
    }
}

impl Sink for FileSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.file.write_all(frame).map_err(|e| {
            LoggerError::file_sink(
                self.path.display().to_string(),
                format!("Failed to write frame: {}", e),
            )
        })?;
        self.current_size += frame.len() as u64;

        if self.current_size > self.policy.max_file_size {
            self.rotate_or_report();
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| {
            LoggerError::file_sink(
                self.path.display().to_string(),
                format!("Failed to flush: {}", e),
            )
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LoggerError::file_rotation(
            path.display().to_string(),
            format!("Failed to remove oldest backup: {}", e),
        )),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to shift backup to '{}': {}", to.display(), e),
        )),
    }
}

/// Gzip `path` into `path.gz`, streaming through a temporary file. The
/// original is removed only after the compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let gz = gz_path(path);
    let mut tmp_name = gz.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&tmp).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", tmp.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let finished = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| writer.flush());
    if let Err(e) = finished {
        let _ = fs::remove_file(&tmp);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&tmp, &gz).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn frame(i: usize) -> Vec<u8> {
        format!("[0] [INFO] frame {:04}\n", i).into_bytes()
    }

    #[test]
    fn test_policy_builder() {
        let policy = RotationPolicy::new()
            .with_max_size(1024)
            .with_max_backups(3)
            .with_compression(true);

        assert_eq!(policy.max_file_size, 1024);
        assert_eq!(policy.max_backup_files, 3);
        assert!(policy.compress);
    }

    #[test]
    fn test_open_reports_existing_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("existing.log");
        fs::write(&path, b"0123456789").unwrap();

        let sink = FileSink::open(&path, RotationPolicy::default()).unwrap();
        assert_eq!(sink.current_size(), 10);
        assert_eq!(sink.path(), path);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");

        let mut sink = FileSink::open(&path, RotationPolicy::default()).unwrap();
        sink.write_frame(b"hello\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn test_backup_path_naming() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = FileSink::open(&path, RotationPolicy::default()).unwrap();

        assert_eq!(sink.backup_path(0), dir.path().join("app.log.0"));
        assert_eq!(sink.backup_path(4), dir.path().join("app.log.4"));
    }

    #[test]
    fn test_rotates_after_crossing_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rotation.log");
        let frame_len = frame(0).len() as u64;

        let policy = RotationPolicy::new()
            .with_max_size(frame_len * 2)
            .with_max_backups(2);
        let metrics = Arc::new(LoggerMetrics::new());
        let mut sink = FileSink::open(&path, policy)
            .unwrap()
            .with_metrics(Arc::clone(&metrics));

        sink.write_frame(&frame(0)).unwrap();
        sink.write_frame(&frame(1)).unwrap();
        assert_eq!(metrics.rotations(), 0);

        sink.write_frame(&frame(2)).unwrap();
        assert_eq!(metrics.rotations(), 1);
        assert_eq!(sink.current_size(), 0);

        let backup = fs::read(dir.path().join("rotation.log.0")).unwrap();
        assert_eq!(backup, [frame(0), frame(1), frame(2)].concat());
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_backups_are_capped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.log");

        let policy = RotationPolicy::new().with_max_size(10).with_max_backups(2);
        let mut sink = FileSink::open(&path, policy).unwrap();

        for i in 0..20 {
            sink.write_frame(&frame(i)).unwrap();
        }

        // Every frame exceeds the threshold on its own
        assert_eq!(fs::read(dir.path().join("multi.log.0")).unwrap(), frame(19));
        assert_eq!(fs::read(dir.path().join("multi.log.1")).unwrap(), frame(18));
        assert!(!dir.path().join("multi.log.2").exists());

        let log_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().unwrap().starts_with("multi.log"))
            .count();
        assert_eq!(log_files, 3);
    }

    #[test]
    fn test_zero_backups_truncates_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncate.log");

        let policy = RotationPolicy::new().with_max_size(30).with_max_backups(0);
        let mut sink = FileSink::open(&path, policy).unwrap();

        sink.write_frame(&frame(0)).unwrap();
        sink.write_frame(&frame(1)).unwrap();
        sink.write_frame(&frame(2)).unwrap();

        assert!(!dir.path().join("truncate.log.0").exists());
        assert_eq!(fs::read(&path).unwrap(), frame(2));
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gz.log");

        let policy = RotationPolicy::new()
            .with_max_size(10)
            .with_max_backups(2)
            .with_compression(true);
        let mut sink = FileSink::open(&path, policy).unwrap();

        sink.write_frame(&frame(0)).unwrap();
        sink.write_frame(&frame(1)).unwrap();
        sink.write_frame(&frame(2)).unwrap();

        assert!(!dir.path().join("gz.log.0").exists());
        assert!(!dir.path().join("gz.log.2.gz").exists());

        let compressed = fs::read(dir.path().join("gz.log.0.gz")).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(&compressed[..]);
        let mut content = Vec::new();
        decoder.read_to_end(&mut content).unwrap();
        assert_eq!(content, frame(2));

        assert!(dir.path().join("gz.log.1.gz").exists());
    }

    #[test]
    fn test_rotation_failure_keeps_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stuck.log");

        // A directory in the only backup slot cannot be removed as a file
        let blocker = dir.path().join("stuck.log.0");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        let policy = RotationPolicy::new().with_max_size(10).with_max_backups(1);
        let metrics = Arc::new(LoggerMetrics::new());
        let mut sink = FileSink::open(&path, policy)
            .unwrap()
            .with_metrics(Arc::clone(&metrics));

        for i in 0..3 {
            sink.write_frame(&frame(i)).unwrap();
        }

        assert_eq!(metrics.rotation_failures(), 3);
        assert_eq!(metrics.rotations(), 0);
        assert_eq!(
            fs::read(&path).unwrap(),
            [frame(0), frame(1), frame(2)].concat()
        );
    }

    #[test]
    fn test_failed_open_moves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocked.log");

        // A directory where the replacement file goes makes its open fail
        let staging = dir.path().join("blocked.log.rotating");
        fs::create_dir(&staging).unwrap();

        let policy = RotationPolicy::new().with_max_size(10).with_max_backups(1);
        let metrics = Arc::new(LoggerMetrics::new());
        let mut sink = FileSink::open(&path, policy)
            .unwrap()
            .with_metrics(Arc::clone(&metrics));

        for i in 0..3 {
            sink.write_frame(&frame(i)).unwrap();
        }

        assert_eq!(metrics.rotation_failures(), 3);
        assert!(!dir.path().join("blocked.log.0").exists());
        assert_eq!(
            fs::read(&path).unwrap(),
            [frame(0), frame(1), frame(2)].concat()
        );

        // Once the slot clears, every frame written so far is rotated out intact
        fs::remove_dir(&staging).unwrap();
        sink.write_frame(&frame(3)).unwrap();

        assert_eq!(metrics.rotations(), 1);
        assert_eq!(
            fs::read(dir.path().join("blocked.log.0")).unwrap(),
            [frame(0), frame(1), frame(2), frame(3)].concat()
        );
        assert_eq!(fs::read(&path).unwrap().len(), 0);
        assert!(!staging.exists());
    }

    #[test]
    fn test_missing_active_file_is_recreated_without_shifting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("moved.log");
        let moved = dir.path().join("elsewhere.log");

        let policy = RotationPolicy::new().with_max_size(10).with_max_backups(2);
        let mut sink = FileSink::open(&path, policy).unwrap();

        sink.write_frame(&frame(0)).unwrap();
        assert_eq!(fs::read(dir.path().join("moved.log.0")).unwrap(), frame(0));

        // The handle now refers to a file outside the backup chain
        fs::rename(&path, &moved).unwrap();
        sink.write_frame(&frame(1)).unwrap();

        assert_eq!(fs::read(&moved).unwrap(), frame(1));
        assert_eq!(fs::read(&path).unwrap().len(), 0);
        assert_eq!(fs::read(dir.path().join("moved.log.0")).unwrap(), frame(0));
        assert!(!dir.path().join("moved.log.1").exists());

        sink.write_frame(&frame(2)).unwrap();
        assert_eq!(fs::read(dir.path().join("moved.log.0")).unwrap(), frame(2));
        assert_eq!(fs::read(dir.path().join("moved.log.1")).unwrap(), frame(0));
    }
}
