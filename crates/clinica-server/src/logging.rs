//! Tracing setup: JSON lines on stdout plus a size-rotated plain log file.
//!
//! File writes happen on a dedicated thread behind a non-blocking
//! channel, so request tasks never block on disk. The file also receives
//! the `audit` target and doubles as the secondary append-only record of
//! audited actions.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::settings::LoggingSettings;

/// Append-only file that rolls over to `<path>.1 .. <path>.N` once it
/// would grow past `max_bytes`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = Self::append_to(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    fn append_to(path: &Path) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn backup(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backup_count == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
        } else {
            for index in (1..self.backup_count).rev() {
                let from = self.backup(index);
                if from.exists() {
                    fs::rename(&from, self.backup(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup(1))?;
            self.file = Self::append_to(&self.path)?;
        }

        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Default filter when `RUST_LOG` is unset.
fn default_directives(level: &str) -> String {
    format!("clinica={level},audit=info")
}

/// Rotating log file moved onto a background writer thread.
///
/// Records still queued are flushed when the guard drops.
pub fn file_writer(settings: &LoggingSettings) -> io::Result<(NonBlocking, WorkerGuard)> {
    let file = RotatingFile::open(&settings.file, settings.max_bytes, settings.backup_count)?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. Call once, before anything logs, and
/// hold the returned guard until shutdown.
pub fn init(settings: &LoggingSettings) -> io::Result<WorkerGuard> {
    let (writer, guard) = file_writer(settings)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer),
        )
        .try_init()
        .map_err(io::Error::other)?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_over_and_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app.log");
        let mut log = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["aaaaaaaa\n", "bbbbbbbb\n", "cccccccc\n", "dddddddd\n"] {
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "dddddddd\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("logs/app.log.1")).unwrap(),
            "cccccccc\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("logs/app.log.2")).unwrap(),
            "bbbbbbbb\n"
        );
        assert!(!dir.path().join("logs/app.log.3").exists());
    }

    #[test]
    fn reopening_continues_the_size_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "0123456789").unwrap();

        let mut log = RotatingFile::open(&path, 12, 1).unwrap();
        log.write_all(b"xyz").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "xyz");
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.1")).unwrap(),
            "0123456789"
        );
    }

    #[test]
    fn zero_backups_truncates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut log = RotatingFile::open(&path, 4, 0).unwrap();

        log.write_all(b"abcd").unwrap();
        log.write_all(b"ef").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ef");
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn background_writer_flushes_on_guard_drop() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoggingSettings {
            file: dir.path().join("app.log").to_string_lossy().into_owned(),
            max_bytes: 1024,
            backup_count: 1,
            level: "info".into(),
        };

        let (mut writer, guard) = file_writer(&settings).unwrap();
        writer.write_all(b"primeira\n").unwrap();
        writer.write_all(b"segunda\n").unwrap();
        drop(guard);

        assert_eq!(
            fs::read_to_string(dir.path().join("app.log")).unwrap(),
            "primeira\nsegunda\n"
        );
    }

    #[test]
    fn default_filter_includes_audit_target() {
        assert_eq!(default_directives("debug"), "clinica=debug,audit=info");
    }
}
