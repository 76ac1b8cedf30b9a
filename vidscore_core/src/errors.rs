use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("No frames parsed from {0}")]
    NoFrames(String),

    #[error("Frame index {found} at record {position} breaks the contiguous run (expected {expected})")]
    NonContiguousFrames {
        expected: usize,
        found: usize,
        position: usize,
    },

    #[error("Frame record {frame} is missing required attribute '{attribute}'")]
    MissingAttribute { attribute: String, frame: usize },

    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Invalid runner options: {0}")]
    InvalidOptions(String),

    #[error("{method} is not part of the {runner} execution strategy")]
    ContractViolation {
        runner: String,
        method: &'static str,
    },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ExternalTool(String),

    #[error("Feature sequences disagree: {0}")]
    FeatureMismatch(String),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Allow converting other errors for general failures at the exec boundary
    #[error(transparent)]
    General(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
