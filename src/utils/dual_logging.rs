use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::AppPaths;
use crate::utils::logging::{LogEntry, LogRingBuffer};

/// Global dual logger instance
static DUAL_LOGGER: OnceLock<DualLogger> = OnceLock::new();

/// Logger that writes to both the ring buffer and a log file
pub struct DualLogger {
    ring_buffer: LogRingBuffer,
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl DualLogger {
    pub fn new(ring_buffer: LogRingBuffer) -> Self {
        Self::in_dir(&AppPaths::log_dir_or_temp(), ring_buffer)
    }

    /// Open a timestamped log file in `log_dir`
    pub fn in_dir(log_dir: &Path, ring_buffer: LogRingBuffer) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("salve_{}.log", timestamp));

        #[cfg(unix)]
        {
            let latest_path = log_dir.join("latest.log");
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        // Logging is best effort; without a file we still fill the ring buffer
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            ring_buffer,
            log_file: Mutex::new(log_file),
            log_path,
        }
    }

    /// Record an entry in the ring buffer and append it to the file
    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = writeln!(file, "{}", entry.format_for_display());
                let _ = file.flush();
            }
        }

        if std::env::var("SALVE_DEBUG").is_ok() {
            eprintln!("{}", entry.format_for_display());
        }

        self.ring_buffer.push(entry);
    }

    pub fn ring_buffer(&self) -> &LogRingBuffer {
        &self.ring_buffer
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}

/// Initialize the global dual logger
pub fn init_dual_logger(ring_buffer: LogRingBuffer) -> &'static DualLogger {
    DUAL_LOGGER.get_or_init(|| DualLogger::new(ring_buffer))
}

/// Get the global dual logger
pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get()
}
