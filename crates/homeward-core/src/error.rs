use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomewardError {
    #[error("not initialized: run 'homeward init'")]
    NotInitialized,

    #[error("unknown stage: {0}")]
    InvalidStage(u32),

    #[error("task '{task}' is not declared in stage {stage}")]
    UnknownTask { stage: u32, task: String },

    #[error("cannot advance from stage {from} to {to}: {reason}")]
    InvalidAdvance { from: u32, to: u32, reason: String },

    #[error("invalid user id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidUserId(String),

    #[error("invalid roadmap: {0}")]
    InvalidRoadmap(String),

    #[error("invalid stage status: {0}")]
    InvalidStatus(String),

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HomewardError>;
