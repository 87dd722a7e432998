use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// Derived status of a single stage for a single user.
///
/// Transitions are driven by `verify_task` / `advance_stage` on the gate;
/// this type only names the observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Locked,
    Active,
    Completed,
}

impl StageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Locked => "locked",
            StageStatus::Active => "active",
            StageStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageStatus {
    type Err = crate::error::HomewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(StageStatus::Locked),
            "active" => Ok(StageStatus::Active),
            "completed" => Ok(StageStatus::Completed),
            _ => Err(crate::error::HomewardError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureKey
// ---------------------------------------------------------------------------

/// Product surfaces gated on stage thresholds.
///
/// The mapping is static: a feature is available once its required stage is
/// unlocked for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Assistant,
    Vault,
    Budget,
    Partners,
    Messaging,
}

impl FeatureKey {
    pub fn all() -> &'static [FeatureKey] {
        &[
            FeatureKey::Assistant,
            FeatureKey::Vault,
            FeatureKey::Budget,
            FeatureKey::Partners,
            FeatureKey::Messaging,
        ]
    }

    /// The stage that must be unlocked before this feature is available.
    pub fn required_stage(self) -> u32 {
        match self {
            FeatureKey::Assistant => 0,
            FeatureKey::Vault => 1,
            FeatureKey::Budget => 2,
            FeatureKey::Partners => 3,
            FeatureKey::Messaging => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Assistant => "assistant",
            FeatureKey::Vault => "vault",
            FeatureKey::Budget => "budget",
            FeatureKey::Partners => "partners",
            FeatureKey::Messaging => "messaging",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureKey {
    type Err = crate::error::HomewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assistant" => Ok(FeatureKey::Assistant),
            "vault" => Ok(FeatureKey::Vault),
            "budget" => Ok(FeatureKey::Budget),
            "partners" => Ok(FeatureKey::Partners),
            "messaging" => Ok(FeatureKey::Messaging),
            _ => Err(crate::error::HomewardError::UnknownFeature(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
