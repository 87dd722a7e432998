use crate::error::{HomewardError, Result};
use crate::io;
use crate::paths;
use crate::progress::ProgressRecord;
use chrono::Utc;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

/// File-backed store of per-user progress records under `.homeward/users/`.
///
/// Records are created implicitly: reading an unknown user yields a fresh
/// zeroed record, and the first write materializes the file. All mutation
/// goes through [`ProfileStore::update`], which re-reads the persisted state
/// before applying the change so two interleaved callers cannot silently
/// drop each other's completions.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !paths::homeward_dir(&self.root).is_dir() {
            return Err(HomewardError::NotInitialized);
        }
        Ok(())
    }

    pub fn read(&self, user_id: &str) -> Result<ProgressRecord> {
        paths::validate_user_id(user_id)?;
        self.ensure_initialized()?;

        let path = paths::user_record_path(&self.root, user_id);
        if !path.exists() {
            return Ok(ProgressRecord::new(user_id));
        }
        let data = std::fs::read_to_string(&path)?;
        let record: ProgressRecord = serde_yaml::from_str(&data)?;
        Ok(record)
    }

    pub fn write(&self, record: &ProgressRecord) -> Result<()> {
        paths::validate_user_id(&record.user_id)?;
        self.ensure_initialized()?;

        let path = paths::user_record_path(&self.root, &record.user_id);
        let data = serde_yaml::to_string(record)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Read-modify-write: load the latest persisted record, apply `f`, stamp
    /// `updated_at`, persist, and return the updated record. One write per
    /// call; a failed write propagates and leaves the previous file intact.
    pub fn update<F>(&self, user_id: &str, f: F) -> Result<ProgressRecord>
    where
        F: FnOnce(&mut ProgressRecord) -> Result<()>,
    {
        let mut record = self.read(user_id)?;
        f(&mut record)?;
        record.updated_at = Utc::now();
        self.write(&record)?;
        Ok(record)
    }

    pub fn delete(&self, user_id: &str) -> Result<()> {
        paths::validate_user_id(user_id)?;
        let path = paths::user_record_path(&self.root, user_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Known user ids, sorted. Users who have never been written to do not
    /// appear here even if they have been read.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = paths::users_dir(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut users = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(user_id) = name.strip_suffix(".yaml") {
                users.push(user_id.to_string());
            }
        }
        users.sort();
        Ok(users)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
