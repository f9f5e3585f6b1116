use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, TrackerError};

/// Looks at the files the queue writes on behalf of a job.
pub trait JobObserver {
    /// Make pending writes visible before sizes are checked
    fn flush(&self) -> Result<()>;

    /// Length of the file at `path`, or `None` if it does not exist yet
    fn file_len(&self, path: &Path) -> Result<Option<u64>>;

    /// Read the whole file, decoding it lossily
    fn read(&self, path: &Path) -> Result<String>;

    /// Delete a file that has been read
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Observes job files on the local (or shared) filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsObserver;

impl JobObserver for FsObserver {
    fn flush(&self) -> Result<()> {
        nix::unistd::sync();
        Ok(())
    }

    fn file_len(&self, path: &Path) -> Result<Option<u64>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TrackerError::io(path, e)),
        }
    }

    fn read(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| TrackerError::io(path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| TrackerError::io(path, e))
    }
}
