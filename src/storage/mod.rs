//! # Storage Module - Save File Persistence
//!
//! Persists one creature (plus its environment) as a versioned JSON snapshot.
//!
//! ```text
//! data/
//! ├── bonsai.json            ← current snapshot
//! ├── bonsai.json.sha256     ← SHA-256 of the exact snapshot bytes
//! ├── bonsai.json.bak        ← the snapshot that was current before the last save
//! └── bonsai.json.bak.sha256
//! ```
//!
//! ## Write path
//!
//! 1. Refuse the save if the previous one was less than the minimum interval ago.
//! 2. Serialize and check the bytes parse back to the same snapshot.
//! 3. Copy the current file to the backup slot if it still verifies.
//! 4. Write a temp file under an exclusive lock, verify its digest, rename it over
//!    the target and fsync the directory.
//!
//! ## Read path
//!
//! Primary, then backup, then a fresh start. Each candidate must match its
//! checksum sidecar, parse, and pass [`validate_snapshot`]. Failures are logged
//! and the next candidate is tried; the caller learns which source won through
//! [`LoadOutcome::source`].
//!
//! All operations are blocking. Async callers should run them on
//! `tokio::task::spawn_blocking`.

use fs2::FileExt;
use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::sim::errors::SimError;
use crate::validation::validate_snapshot;

pub mod autosave;
pub mod snapshot;

pub use snapshot::{EnvironmentSnapshot, SaveSnapshot, SAVE_VERSION};

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Fresh,
}

/// Result of [`SaveStore::load`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub snapshot: Option<SaveSnapshot>,
    /// Why earlier candidates were rejected, in the order they were tried.
    pub problems: Vec<String>,
}

/// Details about a completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub path: PathBuf,
    pub checksum: String,
    pub bytes: usize,
    pub backed_up: bool,
}

pub struct SaveStore {
    path: PathBuf,
    min_interval: Duration,
    last_save: Option<Instant>,
}

impl SaveStore {
    /// Open a store for `data_dir/file_name`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(
        data_dir: P,
        file_name: &str,
        min_interval: Duration,
    ) -> Result<Self, SimError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)?;
        let file_name = file_name.trim();
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(SimError::Validation(format!(
                "invalid save file name '{}'",
                file_name
            )));
        }
        Ok(Self {
            path: dir.join(file_name),
            min_interval,
            last_save: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, ".bak")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Time until the next save is allowed, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        let last = self.last_save?;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Write `snapshot` atomically, keeping the previous file as a backup.
    pub fn save(&mut self, snapshot: &SaveSnapshot) -> Result<SaveReceipt, SimError> {
        if let Some(wait) = self.retry_after() {
            debug!("save refused, {} ms until next slot", wait.as_millis());
            return Err(SimError::RateLimited {
                retry_after_ms: wait.as_millis().max(1) as u64,
            });
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let parsed: SaveSnapshot = serde_json::from_str(&json)?;
        if parsed != *snapshot {
            return Err(SimError::Integrity(
                "snapshot does not survive a serialization round trip".to_string(),
            ));
        }

        let backed_up = self.rotate_backup();
        let checksum = calculate_checksum(json.as_bytes());
        write_file_locked(&self.path, json.as_bytes(), &checksum)?;
        write_file_locked(
            &checksum_path(&self.path),
            checksum.as_bytes(),
            &calculate_checksum(checksum.as_bytes()),
        )?;

        self.last_save = Some(Instant::now());
        info!(
            "Saved '{}' to {} ({} bytes)",
            crate::logutil::escape_log(&snapshot.name),
            self.path.display(),
            json.len()
        );
        Ok(SaveReceipt {
            path: self.path.clone(),
            checksum,
            bytes: json.len(),
            backed_up,
        })
    }

    /// Load the newest valid snapshot, falling back to the backup and then to nothing.
    pub fn load(&self) -> LoadOutcome {
        let mut problems = Vec::new();

        if !self.path.exists() && !self.backup_path().exists() {
            debug!("no save file at {}", self.path.display());
            return LoadOutcome {
                source: LoadSource::Fresh,
                snapshot: None,
                problems,
            };
        }

        for (source, path) in [
            (LoadSource::Primary, self.path.clone()),
            (LoadSource::Backup, self.backup_path()),
        ] {
            match read_verified(&path) {
                Ok(snapshot) => {
                    if source == LoadSource::Backup {
                        warn!("Loaded backup snapshot from {}", path.display());
                    }
                    return LoadOutcome {
                        source,
                        snapshot: Some(snapshot),
                        problems,
                    };
                }
                Err(err) => {
                    warn!("Rejected snapshot {}: {}", path.display(), err);
                    problems.push(format!("{}: {}", path.display(), err));
                }
            }
        }

        error!("No usable save found; starting fresh");
        LoadOutcome {
            source: LoadSource::Fresh,
            snapshot: None,
            problems,
        }
    }

    /// Copy the current file into the backup slot when it still verifies.
    fn rotate_backup(&self) -> bool {
        if !self.path.exists() {
            return false;
        }
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {} for backup: {}", self.path.display(), e);
                return false;
            }
        };
        let checksum = calculate_checksum(&bytes);
        match fs::read_to_string(checksum_path(&self.path)) {
            Ok(expected) if expected.trim() == checksum => {}
            _ => {
                warn!(
                    "Current save {} fails verification; keeping previous backup",
                    self.path.display()
                );
                return false;
            }
        }
        let backup = self.backup_path();
        let result = write_file_locked(&backup, &bytes, &checksum).and_then(|_| {
            write_file_locked(
                &checksum_path(&backup),
                checksum.as_bytes(),
                &calculate_checksum(checksum.as_bytes()),
            )
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Backup rotation failed: {}", e);
                false
            }
        }
    }
}

/// SHA-256 hex digest of `bytes`.
pub fn calculate_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn checksum_path(path: &Path) -> PathBuf {
    sibling(path, ".sha256")
}

fn read_verified(path: &Path) -> Result<SaveSnapshot, SimError> {
    let bytes = fs::read(path)?;
    let expected = fs::read_to_string(checksum_path(path))
        .map_err(|e| SimError::Integrity(format!("missing checksum: {}", e)))?;
    let actual = calculate_checksum(&bytes);
    if expected.trim() != actual {
        return Err(SimError::Integrity(format!(
            "checksum mismatch (expected {}, got {})",
            expected.trim(),
            actual
        )));
    }
    let snapshot: SaveSnapshot = serde_json::from_slice(&bytes)
        .map_err(|e| SimError::Integrity(format!("unreadable snapshot: {}", e)))?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Atomically replace `path` with `content` while holding an exclusive lock.
fn write_file_locked(path: &Path, content: &[u8], checksum: &str) -> Result<(), SimError> {
    // Lock the destination for the duration of the swap
    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("save.json");
    let mut counter = 0u32;
    let (tmp_path, tmp) = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(tmp) => break (candidate, tmp),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(SimError::Io(e)),
        }
    };

    if let Err(e) = replace_with_temp(tmp, &tmp_path, path, content, checksum) {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(e);
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    drop(lock_file);
    Ok(())
}

fn replace_with_temp(
    mut tmp: File,
    tmp_path: &Path,
    path: &Path,
    content: &[u8],
    checksum: &str,
) -> Result<(), SimError> {
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.sync_all()?;
    drop(tmp);

    // Read the temp file back before it replaces anything
    let written = fs::read(tmp_path)?;
    if calculate_checksum(&written) != checksum {
        return Err(SimError::Integrity(format!(
            "temp file for {} did not verify",
            path.display()
        )));
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn checksum_is_lowercase_hex_sha256() {
        assert_eq!(
            calculate_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sibling_paths_append_suffixes() {
        let store = SaveStore::new(TempDir::new().unwrap().path(), "bonsai.json", Duration::ZERO)
            .unwrap();
        assert!(store.backup_path().ends_with("bonsai.json.bak"));
        assert!(checksum_path(store.path()).ends_with("bonsai.json.sha256"));
    }

    #[test]
    fn rejects_path_like_file_names() {
        let dir = TempDir::new().unwrap();
        assert!(SaveStore::new(dir.path(), "../escape.json", Duration::ZERO).is_err());
        assert!(SaveStore::new(dir.path(), "  ", Duration::ZERO).is_err());
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        let body = b"{\"a\":1}";
        write_file_locked(&path, body, &calculate_checksum(body)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), body);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_write_cleans_up_its_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        fs::write(&path, b"old").unwrap();
        let err = write_file_locked(&path, b"new", &calculate_checksum(b"other")).unwrap_err();
        assert!(matches!(err, SimError::Integrity(_)));
        assert_eq!(fs::read(&path).unwrap(), b"old");
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x.json".to_string()]);
    }
}
