//! Logging setup
//!
//! JSON logs to stdout, plus an optional JSON log file rotated by size.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Rotate once the active file would exceed this size (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Files kept including the active one
pub const DEFAULT_MAX_FILES: usize = 5;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_tracing(log_level: &str, log_file: Option<&Path>) -> io::Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer().json().with_filter(filter());
    let subscriber = tracing_subscriber::registry().with(console_layer);

    match log_file {
        Some(path) => {
            let writer = SizeBasedRollingWriter::with_defaults(path)?;
            let file_layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            subscriber.with(file_layer).init();
            eprintln!(
                "Logging to file: {} ({}MB rotation, {} files)",
                path.display(),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024),
                DEFAULT_MAX_FILES
            );
        }
        None => subscriber.init(),
    }

    Ok(())
}

/// Log file writer that rotates `app.log` to `app.log.1`, `app.log.2`, ...
#[derive(Debug, Clone)]
pub struct SizeBasedRollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

#[derive(Debug)]
struct RollingFile {
    base_path: PathBuf,
    file: Option<File>,
    written: u64,
    max_size: u64,
    max_files: usize,
}

impl SizeBasedRollingWriter {
    pub fn new(path: impl AsRef<Path>, max_size: u64, max_files: usize) -> io::Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        if base_path.file_name().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "log file path must name a file",
            ));
        }
        if let Some(parent) = base_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let written = fs::metadata(&base_path).map(|m| m.len()).unwrap_or(0);
        let file = open_append(&base_path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(RollingFile {
                base_path,
                file: Some(file),
                written,
                max_size,
                max_files: max_files.max(1),
            })),
        })
    }

    pub fn with_defaults(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(path, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILES)
    }

    fn lock(&self) -> MutexGuard<'_, RollingFile> {
        // a panic mid-write leaves the file usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl RollingFile {
    fn numbered(&self, index: usize) -> PathBuf {
        let mut name = self.base_path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;

        let oldest = self.max_files - 1;
        if oldest == 0 {
            fs::remove_file(&self.base_path).ok();
        } else {
            fs::remove_file(self.numbered(oldest)).ok();
            for index in (1..oldest).rev() {
                let from = self.numbered(index);
                if from.exists() {
                    fs::rename(&from, self.numbered(index + 1))?;
                }
            }
            if self.base_path.exists() {
                fs::rename(&self.base_path, self.numbered(1))?;
            }
        }

        self.file = Some(open_append(&self.base_path)?);
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeBasedRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.lock();

        if inner.written > 0 && inner.written + buf.len() as u64 > inner.max_size {
            inner.rotate()?;
        }

        let file = inner
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file not open"))?;
        let n = file.write(buf)?;
        inner.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> fmt::MakeWriter<'a> for SizeBasedRollingWriter {
    type Writer = SizeBasedRollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
