//! File-based startup lock.
//!
//! Multiple process instances can share one deploy directory; this lock makes
//! sure only one of them initializes the static assets at a time. The lock is
//! an exclusively created file, removed on drop.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PipelineError, PipelineResult};

/// Exclusive lock held for the duration of startup initialization.
#[derive(Debug)]
pub struct StartupLock {
    path: PathBuf,
}

impl StartupLock {
    /// Acquire the lock, polling until `timeout` elapses.
    pub fn acquire(path: impl AsRef<Path>, timeout: Duration) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let deadline = Instant::now() + timeout;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let _ = write!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(PipelineError::internal(format!(
                            "timed out acquiring startup lock {}",
                            path.display()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => return Err(PipelineError::Io(e)),
            }
        }
    }
}

impl Drop for StartupLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
