//! Advisory lock serialising read-migrate-write cycles on one data file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{Error, Result};

/// Held exclusive lock. Dropping it releases the lock as well.
#[derive(Debug)]
pub struct DataLock {
    file: File,
    path: PathBuf,
}

impl DataLock {
    /// Take the lock at `path` without blocking. The holder's pid is written
    /// into the lock file so a refused caller can say who has it.
    pub fn acquire(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(Error::Locked(describe_holder(path)));
        }

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        debug!(path = %path.display(), "acquired data lock");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) -> Result<()> {
        FileExt::unlock(&self.file)?;
        debug!(path = %self.path.display(), "released data lock");
        Ok(())
    }
}

fn describe_holder(path: &Path) -> String {
    let holder = fs::read_to_string(path).unwrap_or_default();
    match holder.trim() {
        "" => path.display().to_string(),
        pid => format!("{} (held by pid {pid})", path.display()),
    }
}
