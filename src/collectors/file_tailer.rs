use crate::error::CollectorError;
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, SeekFrom};

/// Create `path` as an empty file if it does not exist yet
///
/// Existing files are never opened for writing, so their contents are left
/// untouched. New files get mode 0644 on unix.
///
/// # Returns
///
/// `Ok(true)` if the file was created, `Ok(false)` if it already existed
///
/// # Errors
///
/// Returns `CollectorError::IoError` if the file is missing and cannot be created
/// (for example because its parent directory does not exist).
pub async fn ensure_log_file_exists(path: &Path) -> Result<bool, CollectorError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o644);

    match options.open(path).await {
        Ok(_) => {
            info!("Created empty log file {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Log file {} already exists", path.display());
            Ok(false)
        }
        Err(e) => Err(CollectorError::IoError(e)),
    }
}

/// Follows a growing text file from its end, one line at a time
///
/// The tailer seeks to end-of-file when opened, so content written before
/// that point is never returned. Bytes of a line whose terminator has not
/// been written yet are held back until the `\n` arrives.
///
/// The file handle is closed when the tailer is dropped.
pub struct FileTailer {
    /// Path of the tailed file, kept for diagnostics
    path: PathBuf,
    /// Buffered reader over the open file
    reader: BufReader<File>,
    /// Bytes of the line currently being assembled
    pending: Vec<u8>,
    /// Byte offset just past the last complete line returned
    position: u64,
    /// Pause between reads that found no complete line
    poll_interval: Duration,
}

impl FileTailer {
    /// Open `path` for tailing, creating it first if needed
    ///
    /// # Arguments
    ///
    /// * `path` - File to follow
    /// * `poll_interval` - How long `next_line` sleeps when no complete line is available
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::OpenFailed` if the file cannot be opened after
    /// the ensure-exists step or the path names a directory, and
    /// `CollectorError::IoError` if seeking fails.
    pub async fn open(
        path: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Result<Self, CollectorError> {
        let path = path.into();

        // A failed create is not fatal by itself; the open below decides.
        if let Err(e) = ensure_log_file_exists(&path).await {
            warn!("Could not create log file {}: {}", path.display(), e);
        }

        let mut file = File::open(&path)
            .await
            .map_err(|source| CollectorError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        let metadata = file
            .metadata()
            .await
            .map_err(|source| CollectorError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        if metadata.is_dir() {
            return Err(CollectorError::OpenFailed {
                path,
                source: std::io::Error::new(ErrorKind::InvalidInput, "path is a directory"),
            });
        }

        let position = file.seek(SeekFrom::End(0)).await?;

        info!(
            "Tailing {} from byte offset {}",
            path.display(),
            position
        );

        Ok(Self {
            path,
            reader: BufReader::new(file),
            pending: Vec::new(),
            position,
            poll_interval,
        })
    }

    /// Try to read the next complete line without waiting for new data
    ///
    /// # Returns
    ///
    /// `Some(line)` with trailing whitespace removed if a `\n`-terminated line
    /// is available, `None` if the file currently ends mid-line or at the
    /// last consumed line.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub async fn try_read_line(&mut self) -> Result<Option<String>, CollectorError> {
        self.reader.read_until(b'\n', &mut self.pending).await?;

        if self.pending.last() != Some(&b'\n') {
            if !self.pending.is_empty() {
                debug!(
                    "Holding {} bytes of an unterminated line in {}",
                    self.pending.len(),
                    self.path.display()
                );
            }
            return Ok(None);
        }

        self.position += self.pending.len() as u64;
        let line = String::from_utf8_lossy(&self.pending)
            .trim_end()
            .to_string();
        self.pending.clear();

        Ok(Some(line))
    }

    /// Wait until the next complete line is available and return it
    ///
    /// Polls `try_read_line`, sleeping the poll interval whenever no complete
    /// line is available. Cancellation safe: dropping the future never loses
    /// bytes that were already read, so it can race a timer in `tokio::select!`.
    pub async fn next_line(&mut self) -> Result<String, CollectorError> {
        loop {
            if let Some(line) = self.try_read_line().await? {
                return Ok(line);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Byte offset just past the last complete line returned
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Path of the tailed file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
