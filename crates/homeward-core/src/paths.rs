use crate::error::{HomewardError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HOMEWARD_DIR: &str = ".homeward";
pub const USERS_DIR: &str = ".homeward/users";

pub const CONFIG_FILE: &str = ".homeward/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn homeward_dir(root: &Path) -> PathBuf {
    root.join(HOMEWARD_DIR)
}

pub fn users_dir(root: &Path) -> PathBuf {
    root.join(USERS_DIR)
}

pub fn user_record_path(root: &Path, user_id: &str) -> PathBuf {
    users_dir(root).join(format!("{user_id}.yaml"))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// User id validation
// ---------------------------------------------------------------------------

static USER_ID_RE: OnceLock<Regex> = OnceLock::new();

fn user_id_re() -> &'static Regex {
    USER_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// User ids name files on disk, so they are restricted to the same shape as
/// URL slugs: lowercase alphanumeric with interior hyphens, at most 64 chars.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || user_id.len() > 64 || !user_id_re().is_match(user_id) {
        return Err(HomewardError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
