//! Raw-feature passthrough runners
//!
//! One parametrized variant covers the whole family of "this one feature is
//! the quality score" runners: request a single named feature from the
//! provider and republish its sequence unchanged under the runner's score
//! key. No regression, no post-processing. The carry flavor (ssim, ms_ssim,
//! strred) additionally retains the extractor's remaining atom features in
//! the result, minus the republished source sequence.
//!
//! Trivial as they are, these runners satisfy the same identity and
//! result-shape contract as every other variant - downstream consumers
//! treat all variants uniformly.

use crate::asset::Asset;
use crate::errors::Result;
use crate::feature::{
    feature_key, FeatureProvider, FeatureSpec, FUSED_FEATURE_EXTRACTOR, FUSED_FEATURE_VERSION,
};
use crate::identity::RunnerId;
use crate::result::{QualityResult, ResultValue};
use crate::runner::{Execution, QualityRunner};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct PassthroughRunner {
    id: RunnerId,
    spec: FeatureSpec,
    source_key: String,
    carry_features: bool,
    provider: Arc<dyn FeatureProvider>,
}

impl PassthroughRunner {
    /// Republish one atom feature of `extractor` as the quality score.
    pub fn new(
        provider: Arc<dyn FeatureProvider>,
        type_name: &str,
        version: &str,
        extractor: &str,
        feature: &str,
    ) -> Self {
        Self {
            id: RunnerId::new(type_name, version),
            spec: FeatureSpec::single(extractor, feature),
            source_key: feature_key(extractor, feature),
            carry_features: false,
            provider,
        }
    }

    /// Like [`new`](Self::new), but requests the extractor's full atom set
    /// and retains every sequence except the republished source.
    pub fn with_carry(
        provider: Arc<dyn FeatureProvider>,
        type_name: &str,
        version: &str,
        extractor: &str,
        feature: &str,
    ) -> Self {
        Self {
            id: RunnerId::new(type_name, version),
            spec: FeatureSpec::all_of(extractor),
            source_key: feature_key(extractor, feature),
            carry_features: true,
            provider,
        }
    }

    fn fused_single(provider: Arc<dyn FeatureProvider>, type_name: &str, feature: &str) -> Self {
        Self::new(
            provider,
            type_name,
            &format!("F{}-0", FUSED_FEATURE_VERSION),
            FUSED_FEATURE_EXTRACTOR,
            feature,
        )
    }

    pub fn adm2(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "ADM2", "adm2")
    }

    pub fn motion(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "MOTION", "motion")
    }

    pub fn vif_scale0(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "VIF_SCALE0", "vif_scale0")
    }

    pub fn vif_scale1(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "VIF_SCALE1", "vif_scale1")
    }

    pub fn vif_scale2(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "VIF_SCALE2", "vif_scale2")
    }

    pub fn vif_scale3(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::fused_single(provider, "VIF_SCALE3", "vif_scale3")
    }

    pub fn ssim(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::with_carry(provider, "SSIM", "1.0", "SSIM_feature", "ssim")
    }

    pub fn ms_ssim(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::with_carry(provider, "MS_SSIM", "1.0", "MS_SSIM_feature", "ms_ssim")
    }

    pub fn strred(provider: Arc<dyn FeatureProvider>) -> Self {
        Self::with_carry(provider, "STRRED", "F1.0-1.1", "STRRED_feature", "strred")
    }
}

impl QualityRunner for PassthroughRunner {
    fn id(&self) -> RunnerId {
        self.id.clone()
    }

    fn execution(&self) -> Execution {
        Execution::FeatureModel
    }

    fn run_feature_model(&self, asset: &Asset) -> Result<QualityResult> {
        let features = self.provider.extract(asset, &self.spec, false)?;
        let scores = features.require(&self.source_key)?.to_vec();

        let mut entries: BTreeMap<String, ResultValue> = if self.carry_features {
            features
                .into_inner()
                .into_iter()
                .filter(|(key, _)| key != &self.source_key)
                .map(|(k, v)| (k, ResultValue::Scores(v)))
                .collect()
        } else {
            BTreeMap::new()
        };
        entries.insert(self.id.scores_key(), ResultValue::Scores(scores));
        Ok(QualityResult::new(asset, self.id.clone(), entries))
    }
}
