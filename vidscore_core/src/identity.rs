//! Runner identity and result-key derivation
//!
//! Every runner reports a (type, version) pair that uniquely determines its
//! numeric behavior, including the default model artifact and every
//! post-correction constant baked into that version. The pair derives the
//! executor id used to name cached results, the score field names, and the
//! per-sub-feature field names. Change the version whenever the numbers
//! change, or an external memoization layer will serve stale scores.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunnerId {
    type_name: String,
    version: String,
}

impl RunnerId {
    pub fn new(type_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            version: version.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Cache-stable id: `{type}_V{version}`.
    pub fn executor_id(&self) -> String {
        format!("{}_V{}", self.type_name, self.version)
    }

    /// Field name for the aggregate (per-run) quality score.
    pub fn score_key(&self) -> String {
        format!("{}_score", self.type_name)
    }

    /// Field name for the per-frame quality score sequence.
    pub fn scores_key(&self) -> String {
        format!("{}_scores", self.type_name)
    }

    /// Field name for a retained sub-feature sequence.
    pub fn feature_scores_key(&self, feature: &str) -> String {
        format!("{}_{}_scores", self.type_name, feature)
    }

    /// Key an external result store may memoize under; stable and
    /// collision-free per (asset, identity) pair.
    pub fn result_key(&self, asset_id: &str) -> String {
        format!("{}_{}", self.executor_id(), asset_id)
    }
}

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executor_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation() {
        let id = RunnerId::new("PSNR", "1.0");
        assert_eq!(id.executor_id(), "PSNR_V1.0");
        assert_eq!(id.score_key(), "PSNR_score");
        assert_eq!(id.scores_key(), "PSNR_scores");
        assert_eq!(id.feature_scores_key("psnr"), "PSNR_psnr_scores");
        assert_eq!(id.result_key("clip_1920x1080"), "PSNR_V1.0_clip_1920x1080");
    }

    #[test]
    fn test_identity_stability() {
        // Two instances with the same (type, version) must key identically.
        let a = RunnerId::new("VMAF", "F0.2.4b-0.6.1");
        let b = RunnerId::new("VMAF", "F0.2.4b-0.6.1");
        assert_eq!(a, b);
        assert_eq!(a.result_key("x"), b.result_key("x"));
    }

    #[test]
    fn test_version_changes_key() {
        let a = RunnerId::new("VMAF", "F0.2.4b-0.6.1");
        let b = RunnerId::new("VMAF", "F0.2.4b-0.6.1-phone");
        assert_ne!(a.result_key("x"), b.result_key("x"));
    }
}
