//! Rolling Logger
//!
//! File logger with a circular buffer of recent lines.
//!
//! - The log file is rotated once at startup when it grew past `MAX_FILE_BYTES`
//! - Every formatted line is also kept in memory (last `BUFFER_LINES` lines)
//! - `log` records are bridged into the tracing subscriber

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Size above which the log file is rotated at startup
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Number of rotated files kept next to the live one (`.1` is the newest)
pub const MAX_BACKUPS: usize = 3;
/// Lines kept in the in-memory ring buffer
pub const BUFFER_LINES: usize = 500;

static SINK: OnceLock<Arc<Mutex<Sink>>> = OnceLock::new();

// ========================
// Ring Buffer
// ========================

/// Bounded line buffer, oldest lines are dropped first
#[derive(Debug)]
pub struct RingBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

// ========================
// File Sink
// ========================

struct Sink {
    file: File,
    buffer: RingBuffer,
    /// Bytes of an unterminated line waiting for its '\n'
    pending: String,
}

impl Sink {
    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)?;
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            self.buffer.push(line.trim_end().to_string());
        }
        Ok(())
    }
}

/// Writer handed to the tracing subscriber for each event
struct SinkWriter {
    sink: Arc<Mutex<Sink>>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        sink.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        sink.file.flush()
    }
}

/// Local wall-clock timestamps, millisecond precision
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ========================
// Rotation
// ========================

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Rotate `path` to `path.1` (shifting older backups) when it is larger than `max_bytes`.
///
/// Returns true when a rotation happened.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, max_backups: usize) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max_bytes || max_backups == 0 {
        return Ok(false);
    }

    let oldest = backup_path(path, max_backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..max_backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    Ok(true)
}

// ========================
// Public API
// ========================

/// Initialize the global logger at INFO level.
///
/// Writes to `<log_dir>/<app_name>.log`.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with_level(log_dir, app_name, Level::INFO)
}

/// Initialize the global logger with an explicit maximum level.
pub fn init_logger_with_level(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    level: Level,
) -> Result<(), String> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create log dir: {}", e))?;

    let path = log_dir.join(format!("{}.log", app_name));
    rotate_if_needed(&path, MAX_FILE_BYTES, MAX_BACKUPS)
        .map_err(|e| format!("Failed to rotate log file: {}", e))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    let sink = Arc::new(Mutex::new(Sink {
        file,
        buffer: RingBuffer::new(BUFFER_LINES),
        pending: String::new(),
    }));
    SINK.set(sink.clone())
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_target(true)
        .with_writer(move || SinkWriter { sink: sink.clone() })
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))
}

/// Lines currently held in the ring buffer, oldest first
pub fn recent_lines() -> Vec<String> {
    SINK.get()
        .and_then(|sink| sink.lock().ok().map(|s| s.buffer.lines()))
        .unwrap_or_default()
}

pub fn info(msg: &str) -> Result<(), String> {
    if SINK.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    log::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    if SINK.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    log::error!("{}", msg);
    Ok(())
}
