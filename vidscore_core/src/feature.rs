//! Feature provider interface
//!
//! Per-frame feature computation happens in an external collaborator; the
//! core consumes it through [`FeatureProvider`]. A provider must be
//! synchronously invocable and idempotent per asset. Runners always request
//! non-parallel execution — concurrency across assets belongs to the outer
//! orchestration layer.

use crate::asset::Asset;
use crate::errors::{Result, ScoreError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Version of the fused-feature extractor the model-driven runner versions
/// are pinned against. Bump together with the runner versions when the
/// extractor's numeric output changes.
pub const FUSED_FEATURE_VERSION: &str = "0.2.4b";

/// Extractor type whose atom features feed the fusion runners.
pub const FUSED_FEATURE_EXTRACTOR: &str = "VMAF_feature";

/// Which atom features to request from one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSelection {
    /// Every atom feature the extractor computes.
    All,
    /// A fixed ordered subset.
    Named(Vec<String>),
}

impl Serialize for FeatureSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FeatureSelection::All => serializer.serialize_str("all"),
            FeatureSelection::Named(names) => names.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FeatureSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            List(Vec<String>),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) if s == "all" => Ok(FeatureSelection::All),
            Raw::Text(s) => Err(D::Error::custom(format!(
                "feature selection must be \"all\" or a list, got \"{}\"",
                s
            ))),
            Raw::List(v) => Ok(FeatureSelection::Named(v)),
        }
    }
}

/// Extractor type -> atom feature selection, in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeatureSpec(pub BTreeMap<String, FeatureSelection>);

impl FeatureSpec {
    pub fn single(extractor: &str, feature: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            extractor.to_string(),
            FeatureSelection::Named(vec![feature.to_string()]),
        );
        Self(map)
    }

    pub fn all_of(extractor: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(extractor.to_string(), FeatureSelection::All);
        Self(map)
    }

    pub fn named(extractor: &str, features: &[&str]) -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            extractor.to_string(),
            FeatureSelection::Named(features.iter().map(|f| f.to_string()).collect()),
        );
        Self(map)
    }
}

/// Field name for one extractor's atom feature sequence.
pub fn feature_key(extractor: &str, feature: &str) -> String {
    format!("{}_{}_scores", extractor, feature)
}

/// Per-frame feature sequences for one asset. All sequences share one
/// length; validated at construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureResult {
    scores: BTreeMap<String, Vec<f64>>,
    frame_count: usize,
}

impl FeatureResult {
    pub fn new(scores: BTreeMap<String, Vec<f64>>) -> Result<Self> {
        let mut lengths = scores.values().map(Vec::len);
        let frame_count = lengths.next().ok_or_else(|| {
            ScoreError::FeatureMismatch("feature result contains no sequences".to_string())
        })?;
        if frame_count == 0 {
            return Err(ScoreError::NoFrames("feature provider".to_string()));
        }
        for (key, seq) in &scores {
            if seq.len() != frame_count {
                return Err(ScoreError::FeatureMismatch(format!(
                    "'{}' has {} frames, expected {}",
                    key,
                    seq.len(),
                    frame_count
                )));
            }
        }
        Ok(Self {
            scores,
            frame_count,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.scores.get(key).map(Vec::as_slice)
    }

    /// Like [`get`](Self::get) but surfaces a missing key as an error.
    pub fn require(&self, key: &str) -> Result<&[f64]> {
        self.get(key).ok_or_else(|| {
            ScoreError::FeatureMismatch(format!("feature result has no '{}' sequence", key))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.scores.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<f64>> {
        self.scores
    }

    /// Build the per-frame feature matrix a model predicts on, column order
    /// fixed by the spec. `All` selections take every matching sequence in
    /// key order.
    pub fn matrix(&self, spec: &FeatureSpec) -> Result<Vec<Vec<f64>>> {
        let mut columns: Vec<&[f64]> = Vec::new();
        for (extractor, selection) in &spec.0 {
            match selection {
                FeatureSelection::Named(names) => {
                    for name in names {
                        columns.push(self.require(&feature_key(extractor, name))?);
                    }
                }
                FeatureSelection::All => {
                    let prefix = format!("{}_", extractor);
                    for (key, seq) in &self.scores {
                        if key.starts_with(&prefix) && key.ends_with("_scores") {
                            columns.push(seq);
                        }
                    }
                }
            }
        }
        if columns.is_empty() {
            return Err(ScoreError::FeatureMismatch(
                "feature spec selected no sequences".to_string(),
            ));
        }
        let rows = (0..self.frame_count)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        Ok(rows)
    }
}

/// External per-frame feature computation, consumed synchronously.
pub trait FeatureProvider: Send + Sync {
    /// Compute (or fetch cached) feature sequences for the asset. Runners
    /// pass `parallelize = false`; parallelism across assets lives above.
    fn extract(
        &self,
        asset: &Asset,
        spec: &FeatureSpec,
        parallelize: bool,
    ) -> Result<FeatureResult>;
}
