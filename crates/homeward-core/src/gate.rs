use crate::error::{HomewardError, Result};
use crate::progress::ProgressRecord;
use crate::roadmap::Roadmap;
use crate::store::ProfileStore;
use crate::types::{FeatureKey, StageStatus};

// ---------------------------------------------------------------------------
// StageGate
// ---------------------------------------------------------------------------

/// The stage-gate state machine.
///
/// Per stage, per user:
///
/// ```text
/// locked --[previous stage verified AND stage_id <= ceiling]--> active
/// active --[all required tasks completed]--> completed (ceiling auto-advances)
/// completed --[reset only]--> locked (whole-record reset)
/// ```
///
/// The roadmap is borrowed and must already be validated; observers are pure
/// functions of a record plus that table, so they can be unit-tested without
/// touching a store.
pub struct StageGate<'a> {
    roadmap: &'a Roadmap,
}

impl<'a> StageGate<'a> {
    pub fn new(roadmap: &'a Roadmap) -> Self {
        Self { roadmap }
    }

    pub fn roadmap(&self) -> &Roadmap {
        self.roadmap
    }

    // ---------------------------------------------------------------------------
    // Pure observers
    // ---------------------------------------------------------------------------

    /// Whether `stage_id` may be viewed or acted within.
    ///
    /// Stage 0 is always unlocked. The `current_stage` ceiling is checked
    /// first and short-circuits; below the ceiling, a stage unlocks iff the
    /// previous stage is verified (a missing entry counts as unverified).
    pub fn is_stage_unlocked(&self, record: &ProgressRecord, stage_id: u32) -> bool {
        if stage_id == 0 {
            return true;
        }
        if stage_id > record.current_stage {
            return false;
        }
        if self.roadmap.stage(stage_id).is_none() {
            return false;
        }
        record.is_stage_verified(stage_id - 1)
    }

    pub fn stage_status(&self, record: &ProgressRecord, stage_id: u32) -> StageStatus {
        if !self.is_stage_unlocked(record, stage_id) {
            return StageStatus::Locked;
        }
        if record.is_stage_verified(stage_id) {
            return StageStatus::Completed;
        }
        StageStatus::Active
    }

    pub fn is_feature_unlocked(&self, record: &ProgressRecord, feature: FeatureKey) -> bool {
        self.is_stage_unlocked(record, feature.required_stage())
    }

    // ---------------------------------------------------------------------------
    // Mutating operations
    // ---------------------------------------------------------------------------

    /// Mark `task_id` complete for `user_id` in `stage_id`.
    ///
    /// The stage must exist in the roadmap and the task must be declared in
    /// that stage; both violations are caller bugs, not transient faults.
    /// Completion is idempotent. When the last required task lands,
    /// `is_verified` flips true and the ceiling rises to `stage_id + 1` in
    /// the same write; the `max` keeps a late first verification from
    /// pulling an already-higher ceiling back down.
    pub fn verify_task(
        &self,
        store: &ProfileStore,
        user_id: &str,
        stage_id: u32,
        task_id: &str,
    ) -> Result<ProgressRecord> {
        let stage = self
            .roadmap
            .stage(stage_id)
            .ok_or(HomewardError::InvalidStage(stage_id))?;
        if stage.task(task_id).is_none() {
            return Err(HomewardError::UnknownTask {
                stage: stage_id,
                task: task_id.to_string(),
            });
        }

        store.update(user_id, |record| {
            let entry = record.stage_progress.entry(stage_id).or_default();
            entry.complete(task_id);

            let was_verified = entry.is_verified;
            let all_done = stage.task_ids().all(|id| entry.has_completed(id));
            entry.is_verified = was_verified || all_done;

            if !was_verified && entry.is_verified {
                record.current_stage = record.current_stage.max(stage_id + 1);
                tracing::info!(
                    user = %record.user_id,
                    stage = stage_id,
                    ceiling = record.current_stage,
                    "stage verified"
                );
            } else {
                tracing::debug!(
                    user = %record.user_id,
                    stage = stage_id,
                    task = %task_id,
                    "task completed"
                );
            }
            Ok(())
        })
    }

    /// Move the `current_stage` ceiling to `target_stage_id`.
    ///
    /// By default the jump is validated: the target must be a roadmap stage,
    /// at most one past the current ceiling, and the stage before it must be
    /// verified. `force` skips the ordering checks (an administrative
    /// escape hatch) but still requires the target to exist.
    pub fn advance_stage(
        &self,
        store: &ProfileStore,
        user_id: &str,
        target_stage_id: u32,
        force: bool,
    ) -> Result<ProgressRecord> {
        if self.roadmap.stage(target_stage_id).is_none() {
            return Err(HomewardError::InvalidStage(target_stage_id));
        }

        store.update(user_id, |record| {
            if !force {
                if target_stage_id > record.current_stage + 1 {
                    return Err(HomewardError::InvalidAdvance {
                        from: record.current_stage,
                        to: target_stage_id,
                        reason: "stages advance one at a time".to_string(),
                    });
                }
                if target_stage_id > 0 && !record.is_stage_verified(target_stage_id - 1) {
                    return Err(HomewardError::InvalidAdvance {
                        from: record.current_stage,
                        to: target_stage_id,
                        reason: format!("stage {} is not verified", target_stage_id - 1),
                    });
                }
            }
            record.current_stage = target_stage_id;
            tracing::info!(
                user = %record.user_id,
                ceiling = target_stage_id,
                force,
                "stage advanced"
            );
            Ok(())
        })
    }

    /// Overwrite the user's record with its initial state. Unconditional and
    /// irreversible; confirmation belongs to the calling surface.
    pub fn reset_progress(&self, store: &ProfileStore, user_id: &str) -> Result<ProgressRecord> {
        store.update(user_id, |record| {
            record.reset();
            tracing::info!(user = %record.user_id, "progress reset");
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_store(dir: &TempDir) -> ProfileStore {
        std::fs::create_dir_all(dir.path().join(".homeward/users")).unwrap();
        ProfileStore::new(dir.path())
    }

    fn complete_stage(
        gate: &StageGate<'_>,
        store: &ProfileStore,
        user: &str,
        stage_id: u32,
    ) -> ProgressRecord {
        let task_ids: Vec<String> = gate
            .roadmap()
            .stage(stage_id)
            .unwrap()
            .task_ids()
            .map(str::to_string)
            .collect();
        let mut record = None;
        for task_id in &task_ids {
            record = Some(gate.verify_task(store, user, stage_id, task_id).unwrap());
        }
        record.unwrap()
    }

    // ---------------------------------------------------------------------------
    // Pure observers
    // ---------------------------------------------------------------------------

    #[test]
    fn stage_zero_always_unlocked() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);
        let record = ProgressRecord::new("maria");
        assert!(gate.is_stage_unlocked(&record, 0));
    }

    #[test]
    fn ceiling_blocks_regardless_of_tasks() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let mut record = ProgressRecord::new("maria");
        // Stage 0 fully verified, but ceiling still at 0
        record.stage_progress.entry(0).or_default().is_verified = true;
        assert!(!gate.is_stage_unlocked(&record, 1));
    }

    #[test]
    fn sequential_unlock() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let mut record = ProgressRecord::new("maria");
        record.stage_progress.entry(0).or_default().is_verified = true;
        record.current_stage = 1;
        assert!(gate.is_stage_unlocked(&record, 1));
        assert!(!gate.is_stage_unlocked(&record, 2));
    }

    #[test]
    fn missing_previous_entry_means_locked() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let mut record = ProgressRecord::new("maria");
        record.current_stage = 2;
        // No stage_progress at all: stage 1's predecessor is unverified
        assert!(!gate.is_stage_unlocked(&record, 1));
    }

    #[test]
    fn stage_outside_roadmap_is_locked() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let mut record = ProgressRecord::new("maria");
        record.current_stage = 99;
        record.stage_progress.entry(5).or_default().is_verified = true;
        assert!(!gate.is_stage_unlocked(&record, 6));
    }

    #[test]
    fn status_derivation_consistency() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let mut record = ProgressRecord::new("maria");
        record.stage_progress.entry(0).or_default().is_verified = true;
        record.current_stage = 1;

        for stage_id in 0..roadmap.len() as u32 {
            let status = gate.stage_status(&record, stage_id);
            let unlocked = gate.is_stage_unlocked(&record, stage_id);
            let verified = record.is_stage_verified(stage_id);
            match status {
                StageStatus::Locked => assert!(!unlocked),
                StageStatus::Completed => assert!(unlocked && verified),
                StageStatus::Active => assert!(unlocked && !verified),
            }
        }
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Completed);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Active);
        assert_eq!(gate.stage_status(&record, 2), StageStatus::Locked);
    }

    #[test]
    fn feature_gating_follows_stages() {
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let record = ProgressRecord::new("maria");
        assert!(gate.is_feature_unlocked(&record, FeatureKey::Assistant));
        assert!(!gate.is_feature_unlocked(&record, FeatureKey::Vault));

        let mut record = ProgressRecord::new("maria");
        record.stage_progress.entry(0).or_default().is_verified = true;
        record.current_stage = 1;
        assert!(gate.is_feature_unlocked(&record, FeatureKey::Vault));
        assert!(!gate.is_feature_unlocked(&record, FeatureKey::Partners));
    }

    // ---------------------------------------------------------------------------
    // verify_task
    // ---------------------------------------------------------------------------

    #[test]
    fn verify_task_records_completion() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let record = gate
            .verify_task(&store, "maria", 0, "complete-profile")
            .unwrap();
        let progress = record.stage(0).unwrap();
        assert_eq!(progress.completed_tasks, vec!["complete-profile"]);
        assert!(!progress.is_verified);
        assert_eq!(record.current_stage, 0);
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Active);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Locked);
    }

    #[test]
    fn verify_task_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        gate.verify_task(&store, "maria", 0, "complete-profile")
            .unwrap();
        let record = gate
            .verify_task(&store, "maria", 0, "complete-profile")
            .unwrap();
        assert_eq!(
            record.stage(0).unwrap().completed_tasks,
            vec!["complete-profile"]
        );
    }

    #[test]
    fn completing_all_tasks_verifies_and_advances() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        gate.verify_task(&store, "maria", 0, "complete-profile")
            .unwrap();
        let record = gate
            .verify_task(&store, "maria", 0, "set-budget-range")
            .unwrap();

        assert!(record.stage(0).unwrap().is_verified);
        assert_eq!(record.current_stage, 1);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Active);
    }

    #[test]
    fn reverifying_does_not_readvance() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        complete_stage(&gate, &store, "maria", 0);
        complete_stage(&gate, &store, "maria", 1);

        // Ceiling is now 2; re-running a stage-0 task must not move it
        let record = gate
            .verify_task(&store, "maria", 0, "complete-profile")
            .unwrap();
        assert_eq!(record.current_stage, 2);
        assert!(record.stage(0).unwrap().is_verified);
    }

    #[test]
    fn verification_is_monotonic() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        complete_stage(&gate, &store, "maria", 0);
        for _ in 0..3 {
            let record = gate
                .verify_task(&store, "maria", 0, "set-budget-range")
                .unwrap();
            assert!(record.stage(0).unwrap().is_verified);
        }
    }

    #[test]
    fn unknown_stage_rejected() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        assert!(matches!(
            gate.verify_task(&store, "maria", 42, "complete-profile"),
            Err(HomewardError::InvalidStage(42))
        ));
    }

    #[test]
    fn undeclared_task_rejected_and_not_stored() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        assert!(matches!(
            gate.verify_task(&store, "maria", 0, "made-up-task"),
            Err(HomewardError::UnknownTask { .. })
        ));
        let record = store.read("maria").unwrap();
        assert!(record.stage(0).is_none());
    }

    #[test]
    fn walk_the_whole_roadmap() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        for stage_id in 0..roadmap.len() as u32 {
            let record = complete_stage(&gate, &store, "maria", stage_id);
            assert!(record.stage(stage_id).unwrap().is_verified);
            assert_eq!(record.current_stage, stage_id + 1);
        }
        let record = store.read("maria").unwrap();
        for stage_id in 0..roadmap.len() as u32 {
            assert_eq!(gate.stage_status(&record, stage_id), StageStatus::Completed);
        }
        for feature in FeatureKey::all() {
            assert!(gate.is_feature_unlocked(&record, *feature));
        }
    }

    // ---------------------------------------------------------------------------
    // advance_stage
    // ---------------------------------------------------------------------------

    #[test]
    fn advance_requires_verified_predecessor() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        assert!(matches!(
            gate.advance_stage(&store, "maria", 1, false),
            Err(HomewardError::InvalidAdvance { .. })
        ));

        complete_stage(&gate, &store, "maria", 0);
        // Already auto-advanced to 1; an explicit advance to 1 is a no-op jump
        let record = gate.advance_stage(&store, "maria", 1, false).unwrap();
        assert_eq!(record.current_stage, 1);
    }

    #[test]
    fn advance_rejects_skipping() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        complete_stage(&gate, &store, "maria", 0);
        assert!(matches!(
            gate.advance_stage(&store, "maria", 3, false),
            Err(HomewardError::InvalidAdvance { .. })
        ));
    }

    #[test]
    fn forced_advance_skips_checks() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        let record = gate.advance_stage(&store, "maria", 4, true).unwrap();
        assert_eq!(record.current_stage, 4);
        // Ceiling alone does not unlock: stage 3 is still unverified
        assert!(!gate.is_stage_unlocked(&record, 4));
    }

    #[test]
    fn advance_to_unknown_stage_rejected_even_forced() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        assert!(matches!(
            gate.advance_stage(&store, "maria", 42, true),
            Err(HomewardError::InvalidStage(42))
        ));
    }

    // ---------------------------------------------------------------------------
    // reset_progress
    // ---------------------------------------------------------------------------

    #[test]
    fn reset_returns_to_initial_state() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        complete_stage(&gate, &store, "maria", 0);
        complete_stage(&gate, &store, "maria", 1);

        let record = gate.reset_progress(&store, "maria").unwrap();
        assert_eq!(record.current_stage, 0);
        assert!(record.stage_progress.is_empty());
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Locked);
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Active);

        let loaded = store.read("maria").unwrap();
        assert_eq!(loaded.current_stage, 0);
    }

    // ---------------------------------------------------------------------------
    // Spec walkthrough from the product scenario
    // ---------------------------------------------------------------------------

    #[test]
    fn onboarding_walkthrough() {
        let dir = TempDir::new().unwrap();
        let store = init_store(&dir);
        let roadmap = Roadmap::builtin();
        let gate = StageGate::new(&roadmap);

        // Fresh user: stage 0 active, stage 1 locked
        let record = store.read("casa-verde").unwrap();
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Active);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Locked);

        // First task: still active, ceiling unchanged
        let record = gate
            .verify_task(&store, "casa-verde", 0, "complete-profile")
            .unwrap();
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Active);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Locked);

        // Second task: stage 0 completed, stage 1 opens up
        let record = gate
            .verify_task(&store, "casa-verde", 0, "set-budget-range")
            .unwrap();
        assert_eq!(gate.stage_status(&record, 0), StageStatus::Completed);
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Active);
        assert_eq!(record.current_stage, 1);

        // Reset reverts everything
        let record = gate.reset_progress(&store, "casa-verde").unwrap();
        assert_eq!(record.current_stage, 0);
        assert!(record.stage_progress.is_empty());
        assert_eq!(gate.stage_status(&record, 1), StageStatus::Locked);
    }
}
