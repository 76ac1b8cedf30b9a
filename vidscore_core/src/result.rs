//! Quality result container
//!
//! A [`QualityResult`] is produced exactly once per (asset, runner identity)
//! pair and is immutable after creation. It always carries the per-frame
//! quality score sequence under the runner's scores key, and may retain raw
//! sub-feature sequences under per-feature keys.

use crate::asset::Asset;
use crate::identity::RunnerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single result entry: a per-frame score sequence, or an identity string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Scores(Vec<f64>),
    Text(String),
}

impl ResultValue {
    pub fn as_scores(&self) -> Option<&[f64]> {
        match self {
            ResultValue::Scores(v) => Some(v),
            ResultValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResult {
    asset_id: String,
    runner: RunnerId,
    entries: BTreeMap<String, ResultValue>,
}

impl QualityResult {
    pub fn new(asset: &Asset, runner: RunnerId, entries: BTreeMap<String, ResultValue>) -> Self {
        Self {
            asset_id: asset.id().to_string(),
            runner,
            entries,
        }
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn runner(&self) -> &RunnerId {
        &self.runner
    }

    /// Key an external store may memoize this result under.
    pub fn result_key(&self) -> String {
        self.runner.result_key(&self.asset_id)
    }

    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// The per-frame quality score sequence this runner was built to emit.
    pub fn scores(&self) -> Option<&[f64]> {
        self.entries
            .get(&self.runner.scores_key())
            .and_then(ResultValue::as_scores)
    }

    /// Mean of the per-frame scores; the value callers report as
    /// `{type}_score`.
    pub fn mean_score(&self) -> Option<f64> {
        let scores = self.scores()?;
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::PixelFormat;

    fn asset() -> Asset {
        Asset::new("r.yuv", "d.yuv", 320, 240, PixelFormat::Yuv420p).unwrap()
    }

    #[test]
    fn test_scores_lookup_and_mean() {
        let runner = RunnerId::new("PSNR", "1.0");
        let mut entries = BTreeMap::new();
        entries.insert(
            runner.scores_key(),
            ResultValue::Scores(vec![30.0, 32.0, 34.0]),
        );
        let result = QualityResult::new(&asset(), runner, entries);

        assert_eq!(result.scores(), Some(&[30.0, 32.0, 34.0][..]));
        assert_eq!(result.mean_score(), Some(32.0));
        assert_eq!(result.result_key(), "PSNR_V1.0_r_vs_d_320x240");
    }

    #[test]
    fn test_missing_scores_entry() {
        let runner = RunnerId::new("PSNR", "1.0");
        let result = QualityResult::new(&asset(), runner, BTreeMap::new());
        assert!(result.scores().is_none());
        assert!(result.mean_score().is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let runner = RunnerId::new("SSIM", "1.0");
        let mut entries = BTreeMap::new();
        entries.insert(runner.scores_key(), ResultValue::Scores(vec![0.98, 0.97]));
        entries.insert(
            "SSIM_feature_ssim_c_scores".to_string(),
            ResultValue::Scores(vec![0.99, 0.99]),
        );
        entries.insert(
            "results_id".to_string(),
            ResultValue::Text("SSIM_V1.0".to_string()),
        );
        let result = QualityResult::new(&asset(), runner, entries);

        let json = serde_json::to_string(&result).unwrap();
        let back: QualityResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scores(), result.scores());
        assert_eq!(back.result_key(), result.result_key());
        assert_eq!(
            back.get("results_id"),
            Some(&ResultValue::Text("SSIM_V1.0".to_string()))
        );
        assert!(back.get("results_id").unwrap().as_scores().is_none());
    }
}
