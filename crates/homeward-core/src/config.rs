use crate::error::Result;
use crate::io;
use crate::paths;
use crate::roadmap::Roadmap;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// The on-disk configuration. The roadmap defaults to the compiled-in table
/// so a bare `init` works without editing anything; projects that need a
/// custom journey override it in `.homeward/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub roadmap: Roadmap,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            roadmap: Roadmap::builtin(),
        }
    }

    /// Load and re-validate. A config that deserializes but breaks the
    /// roadmap invariants is rejected here, before any gate sees it.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.roadmap.validate()?;
        Ok(config)
    }

    /// Load the config if present, otherwise fall back to defaults named
    /// after the root directory.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        if paths::config_path(root).exists() {
            return Self::load(root);
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        Ok(Self::new(name))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
