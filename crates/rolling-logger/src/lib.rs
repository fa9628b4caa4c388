//! Rolling Logger
//!
//! File logger that rotates by size and keeps the most recent lines in
//! memory. `init_logger` installs it as the global `tracing` subscriber,
//! which also picks up records emitted through the `log` facade.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Rotate once the active file would grow past this many bytes
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept next to the active one
pub const DEFAULT_MAX_FILES: usize = 3;
/// Lines kept in memory for `recent_lines`
pub const DEFAULT_RING_CAPACITY: usize = 500;

static LOGGER: OnceLock<Arc<RollingFile>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to open log directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Logger not initialized")]
    NotInitialized,
}

/// Settings for `init_logger_with`
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub log_dir: PathBuf,
    pub app_name: String,
    pub max_bytes: u64,
    pub max_files: usize,
    pub ring_capacity: usize,
}

impl LoggerOptions {
    pub fn new(log_dir: impl Into<PathBuf>, app_name: &str) -> Self {
        Self {
            log_dir: log_dir.into(),
            app_name: app_name.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            ring_capacity: DEFAULT_RING_CAPACITY,
        }
    }
}

/// Initialize logging into `<log_dir>/<app_name>.log` with default limits
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(LoggerOptions::new(log_dir, app_name))
}

pub fn init_logger_with(options: LoggerOptions) -> Result<(), LoggerError> {
    let rolling = RollingFile::open(&options).map_err(|source| LoggerError::Io {
        path: options.log_dir.clone(),
        source,
    })?;
    let rolling = Arc::new(rolling);
    LOGGER
        .set(rolling.clone())
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(SharedWriter(rolling))
        .with_filter(env_filter);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime)
        .with_writer(io::stderr)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|l| l.recent()).unwrap_or_default()
}

/// Path of the active log file, if initialized
pub fn log_file_path() -> Option<PathBuf> {
    LOGGER.get().map(|l| l.active_path())
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Size-rotated log file plus an in-memory ring of recent lines
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    ring_capacity: usize,
    state: Mutex<FileState>,
    ring: Mutex<VecDeque<String>>,
}

struct FileState {
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(options: &LoggerOptions) -> io::Result<Self> {
        fs::create_dir_all(&options.log_dir)?;
        let path = rotated_path(&options.log_dir, &options.app_name, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: options.log_dir.clone(),
            app_name: options.app_name.clone(),
            max_bytes: options.max_bytes,
            max_files: options.max_files,
            ring_capacity: options.ring_capacity,
            state: Mutex::new(FileState { file, written }),
            ring: Mutex::new(VecDeque::with_capacity(options.ring_capacity)),
        })
    }

    pub fn active_path(&self) -> PathBuf {
        rotated_path(&self.dir, &self.app_name, 0)
    }

    pub fn recent(&self) -> Vec<String> {
        match self.ring.lock() {
            Ok(ring) => ring.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    /// Append one formatted record
    pub fn write_record(&self, buf: &[u8]) -> io::Result<()> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            let len = buf.len() as u64;
            if state.written > 0 && state.written + len > self.max_bytes {
                state.file = self.rotate()?;
                state.written = 0;
            }
            state.file.write_all(buf)?;
            state.written += len;
        }
        self.remember(buf);
        Ok(())
    }

    fn remember(&self, buf: &[u8]) {
        if self.ring_capacity == 0 {
            return;
        }
        let text = String::from_utf8_lossy(buf);
        let mut ring = match self.ring.lock() {
            Ok(ring) => ring,
            Err(poisoned) => poisoned.into_inner(),
        };
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if ring.len() == self.ring_capacity {
                ring.pop_front();
            }
            ring.push_back(line.trim_end().to_string());
        }
    }

    /// app.log -> app.1.log -> app.2.log ...; the oldest falls off
    fn rotate(&self) -> io::Result<File> {
        let active = self.active_path();
        if self.max_files == 0 {
            return OpenOptions::new().create(true).write(true).truncate(true).open(&active);
        }
        let oldest = rotated_path(&self.dir, &self.app_name, self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = rotated_path(&self.dir, &self.app_name, index);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.dir, &self.app_name, index + 1))?;
            }
        }
        fs::rename(&active, rotated_path(&self.dir, &self.app_name, 1))?;
        OpenOptions::new().create(true).append(true).open(&active)
    }
}

fn rotated_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.log", app_name))
    } else {
        dir.join(format!("{}.{}.log", app_name, index))
    }
}

/// `MakeWriter` handle shared by the fmt layer
#[derive(Clone)]
pub struct SharedWriter(Arc<RollingFile>);

impl SharedWriter {
    pub fn new(rolling: Arc<RollingFile>) -> Self {
        Self(rolling)
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .0
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &Path, max_bytes: u64, max_files: usize, ring_capacity: usize) -> LoggerOptions {
        LoggerOptions {
            log_dir: dir.to_path_buf(),
            app_name: "Test".to_string(),
            max_bytes,
            max_files,
            ring_capacity,
        }
    }

    #[test]
    fn test_writes_to_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::open(&options(dir.path(), 1024, 2, 10)).unwrap();
        rolling.write_record(b"hello\n").unwrap();

        let content = fs::read_to_string(dir.path().join("Test.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_rotates_when_full_and_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::open(&options(dir.path(), 10, 2, 10)).unwrap();
        for line in ["aaaaaaaa\n", "bbbbbbbb\n", "cccccccc\n", "dddddddd\n"] {
            rolling.write_record(line.as_bytes()).unwrap();
        }

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("Test.log"), "dddddddd\n");
        assert_eq!(read("Test.1.log"), "cccccccc\n");
        assert_eq!(read("Test.2.log"), "bbbbbbbb\n");
        assert!(!dir.path().join("Test.3.log").exists());
    }

    #[test]
    fn test_ring_keeps_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::open(&options(dir.path(), 1024, 1, 2)).unwrap();
        rolling.write_record(b"one\n").unwrap();
        rolling.write_record(b"two\nthree\n").unwrap();

        assert_eq!(rolling.recent(), vec!["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        {
            let rolling = RollingFile::open(&options(dir.path(), 1024, 1, 0)).unwrap();
            rolling.write_record(b"first\n").unwrap();
        }
        let rolling = RollingFile::open(&options(dir.path(), 1024, 1, 0)).unwrap();
        rolling.write_record(b"second\n").unwrap();

        let content = fs::read_to_string(rolling.active_path()).unwrap();
        assert_eq!(content, "first\nsecond\n");
        assert!(rolling.recent().is_empty());
    }

    #[test]
    fn test_helpers_require_init() {
        // The global logger is never installed in this test binary
        assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
        assert!(recent_lines().is_empty());
    }
}
