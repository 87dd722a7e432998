use crate::error::{HomewardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// TaskDef
// ---------------------------------------------------------------------------

/// A prerequisite action within a stage.
///
/// `action` is advisory metadata for the calling surface (how to present the
/// task); the gate only ever looks at `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub action: String,
}

impl TaskDef {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            action: action.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StageDef
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub id: u32,
    pub name: String,
    pub required_tasks: Vec<TaskDef>,
}

impl StageDef {
    pub fn task(&self, task_id: &str) -> Option<&TaskDef> {
        self.required_tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.required_tasks.iter().map(|t| t.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Roadmap
// ---------------------------------------------------------------------------

/// The ordered stage table. Loaded (or built in) once at startup, validated,
/// and passed by reference into the gate. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub stages: Vec<StageDef>,
}

impl Roadmap {
    /// The compiled-in default roadmap for the home-building journey.
    pub fn builtin() -> Self {
        let stages = vec![
            StageDef {
                id: 0,
                name: "Onboarding".to_string(),
                required_tasks: vec![
                    TaskDef::new(
                        "complete-profile",
                        "Complete your household profile",
                        "form",
                    ),
                    TaskDef::new("set-budget-range", "Set your target budget range", "form"),
                ],
            },
            StageDef {
                id: 1,
                name: "Design".to_string(),
                required_tasks: vec![
                    TaskDef::new("select-architect", "Select an architect", "marketplace"),
                    TaskDef::new("approve-floor-plan", "Approve the floor plan", "review"),
                    TaskDef::new("choose-finishes", "Choose interior finishes", "form"),
                ],
            },
            StageDef {
                id: 2,
                name: "Budget".to_string(),
                required_tasks: vec![
                    TaskDef::new("approve-budget", "Approve the itemized budget", "review"),
                    TaskDef::new("sign-build-contract", "Sign the build contract", "signature"),
                ],
            },
            StageDef {
                id: 3,
                name: "Permitting".to_string(),
                required_tasks: vec![
                    TaskDef::new(
                        "submit-permit-application",
                        "Submit the permit application",
                        "upload",
                    ),
                    TaskDef::new(
                        "schedule-site-inspection",
                        "Schedule the site inspection",
                        "schedule",
                    ),
                ],
            },
            StageDef {
                id: 4,
                name: "Construction".to_string(),
                required_tasks: vec![
                    TaskDef::new(
                        "approve-foundation",
                        "Approve the foundation milestone",
                        "review",
                    ),
                    TaskDef::new("approve-framing", "Approve the framing milestone", "review"),
                    TaskDef::new(
                        "final-walkthrough",
                        "Complete the final walkthrough",
                        "schedule",
                    ),
                ],
            },
            StageDef {
                id: 5,
                name: "Handover".to_string(),
                required_tasks: vec![
                    TaskDef::new(
                        "sign-closing-documents",
                        "Sign the closing documents",
                        "signature",
                    ),
                    TaskDef::new("confirm-move-in", "Confirm your move-in date", "form"),
                ],
            },
        ];
        Self { stages }
    }

    pub fn stage(&self, stage_id: u32) -> Option<&StageDef> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn last_stage_id(&self) -> Option<u32> {
        self.stages.last().map(|s| s.id)
    }

    /// Structural invariants: ids are dense `0..N` in declaration order
    /// (stage 0 always exists), task ids are non-empty and unique within
    /// their stage.
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(HomewardError::InvalidRoadmap(
                "roadmap has no stages".to_string(),
            ));
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.id != i as u32 {
                return Err(HomewardError::InvalidRoadmap(format!(
                    "stage ids must be dense starting at 0: position {i} has id {}",
                    stage.id
                )));
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for task in &stage.required_tasks {
                if task.id.is_empty() {
                    return Err(HomewardError::InvalidRoadmap(format!(
                        "stage {} has a task with an empty id",
                        stage.id
                    )));
                }
                if !seen.insert(task.id.as_str()) {
                    return Err(HomewardError::InvalidRoadmap(format!(
                        "stage {} declares task '{}' more than once",
                        stage.id, task.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Roadmap {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
