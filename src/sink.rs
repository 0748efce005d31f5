//! Shared append-only run log.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only log file shared by the node and all workers.
///
/// All writers go through [`LogSink::append`], which serializes access
/// behind a mutex so concurrent workers never interleave partial lines.
/// Workers never touch the underlying file handle directly.
pub struct LogSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl LogSink {
    /// Open the log (truncating any previous run) and write the banner
    /// line. Failure here is startup-fatal for the node.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "- sqlstress v{} ({})",
            env!("CARGO_PKG_VERSION"),
            chrono::Utc::now().to_rfc3339()
        )?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Write errors are swallowed: the sink is an
    /// audit trail and must not take down a worker mid-run.
    pub fn append(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{line}") {
                tracing::warn!("log sink write failed: {e}");
            }
        }
    }

    /// Flush buffered output. Called once at teardown.
    pub fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writer.flush() {
                tracing::warn!("log sink flush failed: {e}");
            }
        }
    }
}
