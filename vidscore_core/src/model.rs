//! Regression model interface and artifact metadata
//!
//! The solver itself is an external collaborator; the core sees a model only
//! through [`ScoreModel::predict`] plus the structured metadata riding along
//! with the artifact: an optional feature-selection spec, an optional score
//! transform, and optional clip bounds. Metadata is loaded once per run and
//! never mutated; a missing entry is a valid no-op, a missing or unreadable
//! artifact is a fatal load error surfaced before any prediction.

use crate::errors::{Result, ScoreError};
use crate::feature::FeatureSpec;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Post-regression polynomial remap `p0 + p1*y + p2*y^2`, with optional
/// monotonic rectification against the untransformed input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default)]
    pub p0: Option<f64>,
    #[serde(default)]
    pub p1: Option<f64>,
    #[serde(default)]
    pub p2: Option<f64>,
    /// Transformed output must not exceed the input.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub out_lte_in: bool,
    /// Transformed output must not fall below the input.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub out_gte_in: bool,
}

// Older artifacts carry rectification flags as the strings "true"/"false".
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Text(s) => s == "true",
    })
}

/// Inclusive clip bounds `[lower, upper]`, stored as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec(pub f64, pub f64);

impl ClipSpec {
    pub fn lower(&self) -> f64 {
        self.0
    }

    pub fn upper(&self) -> f64 {
        self.1
    }
}

/// Structured optional metadata attached to a model artifact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub feature_dict: Option<FeatureSpec>,
    #[serde(default)]
    pub score_transform: Option<TransformSpec>,
    #[serde(default)]
    pub score_clip: Option<ClipSpec>,
}

impl ModelMetadata {
    /// Load the metadata portion of a JSON model artifact. Unknown keys
    /// (kernel parameters, training provenance) are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScoreError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ScoreError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("invalid model artifact: {}", e),
        })
    }
}

/// A trained artifact mapping per-frame feature vectors to scalar quality
/// predictions.
pub trait ScoreModel: Send + Sync {
    /// One prediction per input row. A failed prediction is fatal for the
    /// run; implementations must not return a shortened sequence.
    fn predict(&self, xs: &[Vec<f64>]) -> Result<Vec<f64>>;

    fn metadata(&self) -> &ModelMetadata;
}

/// Loads a model artifact from a file path.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn ScoreModel>>;
}

/// Directory model artifacts are resolved against. Overridable through the
/// `VIDSCORE_MODEL_DIR` environment variable.
pub fn default_model_dir() -> PathBuf {
    std::env::var_os("VIDSCORE_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("model"))
}

pub fn model_path(file_name: &str) -> PathBuf {
    default_model_dir().join(file_name)
}
