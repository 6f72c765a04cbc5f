use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::lock::DataLock;

/// A JSON data file on disk.
pub struct DataStore {
    path: PathBuf,
}

impl DataStore {
    /// Open an existing data file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Take the exclusive advisory lock guarding read-migrate-write cycles.
    pub fn lock(&self) -> Result<DataLock> {
        DataLock::acquire(&self.lock_path())
    }

    pub fn read(&self) -> Result<Value> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Replace the file contents through a staging file and rename.
    ///
    /// With `backup_tag`, the current file is first moved to a timestamped
    /// `.bak` sibling; if the swap then fails the original is moved back.
    /// Returns the backup path when one was kept.
    pub fn replace(&self, value: &Value, backup_tag: Option<&str>) -> Result<Option<PathBuf>> {
        let staging = self.sibling(&format!(".{}.staging", Uuid::new_v4()));
        let json = serde_json::to_string_pretty(value)?;
        if let Err(err) = fs::write(&staging, json) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        let Some(tag) = backup_tag else {
            if let Err(err) = fs::rename(&staging, &self.path) {
                let _ = fs::remove_file(&staging);
                return Err(err.into());
            }
            debug!(path = %self.path.display(), "replaced data file");
            return Ok(None);
        };

        let backup = self.sibling(&format!(
            ".{tag}.{}.bak",
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        ));
        if let Err(err) = fs::rename(&self.path, &backup) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&staging, &self.path) {
            let rollback_err = fs::rename(&backup, &self.path).err();
            let _ = fs::remove_file(&staging);

            if let Some(rollback_err) = rollback_err {
                return Err(Error::Swap(format!(
                    "swap failed and rollback failed; original left at {}: swap error: {}; rollback error: {}",
                    backup.display(),
                    err,
                    rollback_err
                )));
            }

            return Err(err.into());
        }

        info!(
            path = %self.path.display(),
            backup = %backup.display(),
            "replaced data file"
        );
        Ok(Some(backup))
    }
}
