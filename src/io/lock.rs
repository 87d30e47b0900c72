//! Lock file management for single-instance enforcement.
//!
//! Two daemons driving the same light would fire every event twice, so `run`
//! takes an exclusive advisory lock on `$XDG_RUNTIME_DIR/dawnlight.lock` and
//! writes its PID into it. The kernel drops the lock when the process exits,
//! so a lock file left behind by a crash never blocks a new instance.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;
use crate::common::utils::private_path;

/// A held instance lock. Released and removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Default lock file location.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Acquire the instance lock at the default location.
pub fn acquire_lock() -> Result<InstanceLock> {
    acquire_lock_at(&lock_path())
}

/// Acquire an exclusive lock on `path`, writing our PID into it.
///
/// Fails with the holder's PID when another process has the lock.
pub fn acquire_lock_at(path: &Path) -> Result<InstanceLock> {
    // Open without truncating so a running holder's PID stays readable
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", private_path(path)))?;

    if file.try_lock_exclusive().is_err() {
        let holder = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| content.trim().lines().next()?.parse::<u32>().ok());
        match holder {
            Some(pid) => anyhow::bail!("dawnlight is already running (PID: {pid})"),
            None => anyhow::bail!(
                "dawnlight is already running (lock held on {})",
                private_path(path)
            ),
        }
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(&file, "{}", std::process::id())?;
    file.flush()?;

    Ok(InstanceLock {
        file,
        path: path.to_path_buf(),
    })
}
