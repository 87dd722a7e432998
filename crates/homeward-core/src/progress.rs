use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// StageProgress
// ---------------------------------------------------------------------------

/// Per-stage completion state.
///
/// `completed_tasks` is kept sorted and de-duplicated on every insert.
/// `is_verified`, once true, is never cleared except by a whole-record reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    #[serde(default)]
    pub completed_tasks: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl StageProgress {
    pub fn has_completed(&self, task_id: &str) -> bool {
        self.completed_tasks.iter().any(|t| t == task_id)
    }

    /// Record a task as completed. Idempotent. Returns true if the task was
    /// newly added.
    pub fn complete(&mut self, task_id: &str) -> bool {
        if self.has_completed(task_id) {
            return false;
        }
        self.completed_tasks.push(task_id.to_string());
        self.completed_tasks.sort();
        true
    }
}

// ---------------------------------------------------------------------------
// ProgressRecord
// ---------------------------------------------------------------------------

/// One user's persisted journey state.
///
/// `current_stage` is the administrative ceiling: the highest stage the user
/// may act within, independent of task completion. The BTreeMap keeps the
/// serialized form stable across writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub user_id: String,
    pub current_stage: u32,
    #[serde(default)]
    pub stage_progress: BTreeMap<u32, StageProgress>,
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl ProgressRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            version: 1,
            user_id: user_id.into(),
            current_stage: 0,
            stage_progress: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn stage(&self, stage_id: u32) -> Option<&StageProgress> {
        self.stage_progress.get(&stage_id)
    }

    pub fn is_stage_verified(&self, stage_id: u32) -> bool {
        self.stage(stage_id).map(|p| p.is_verified).unwrap_or(false)
    }

    /// Zero the record back to its initial state. Irreversible.
    pub fn reset(&mut self) {
        self.current_stage = 0;
        self.stage_progress.clear();
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
