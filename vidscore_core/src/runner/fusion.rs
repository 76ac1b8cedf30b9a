//! Model-driven score fusion runners
//!
//! Three variants share the feature-assembly + regression strategy:
//!
//! - [`LegacyVmafRunner`]: fixed 4-feature SVR pipeline with per-feature
//!   rescaling and the motion-dependent post-correction.
//! - [`VmafRunner`]: feature spec and post-processing driven by the loaded
//!   model's metadata; transform off by default, clip on by default.
//! - [`VmafPhoneRunner`]: identical to [`VmafRunner`] except the transform
//!   is unconditionally on, and an explicit transform option is rejected at
//!   construction.
//!
//! All three merge the raw feature sequences into the result alongside the
//! fused score, so downstream consumers can audit the inputs of each frame.

use crate::asset::Asset;
use crate::config::RunnerOptions;
use crate::errors::Result;
use crate::feature::{
    feature_key, FeatureProvider, FeatureSpec, FUSED_FEATURE_EXTRACTOR, FUSED_FEATURE_VERSION,
};
use crate::identity::RunnerId;
use crate::model::{model_path, ModelLoader};
use crate::postprocess;
use crate::result::{QualityResult, ResultValue};
use crate::runner::{Execution, QualityRunner};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Rescale bounds per legacy feature, in the fixed column order the SVR
/// artifact was trained against. Part of the legacy version's numeric
/// identity.
const LEGACY_RESCALE: [(&str, (f64, f64)); 4] = [
    ("vif", (0.0, 1.0)),
    ("adm", (0.4, 1.0)),
    ("ansnr", (10.0, 50.0)),
    ("motion", (0.0, 20.0)),
];

const LEGACY_MODEL_FILE: &str = "vmaf_v8a.json";

const DEFAULT_MODEL_FILE: &str = "vmaf_v0.6.1.json";

/// Feature spec assumed when an older model artifact carries none.
fn default_feature_spec() -> FeatureSpec {
    FeatureSpec::named(FUSED_FEATURE_EXTRACTOR, &["vif", "adm", "motion", "ansnr"])
}

/// Shared tail of the model-driven variants: load the model, assemble the
/// matrix its feature spec asks for, predict, post-process, merge features.
fn run_model_fusion(
    id: &RunnerId,
    provider: &dyn FeatureProvider,
    loader: &dyn ModelLoader,
    artifact: &Path,
    enable_transform: bool,
    disable_clip: bool,
    asset: &Asset,
) -> Result<QualityResult> {
    // load first: a broken artifact must surface before any extraction work
    let model = loader.load(artifact)?;
    let spec = model
        .metadata()
        .feature_dict
        .clone()
        .unwrap_or_else(default_feature_spec);
    debug!(runner = %id, artifact = %artifact.display(), "Model loaded");

    let features = provider.extract(asset, &spec, false)?;
    let xs = features.matrix(&spec)?;
    let ys = postprocess::predict_with_model(model.as_ref(), &xs, enable_transform, disable_clip)?;

    let mut entries: BTreeMap<String, ResultValue> = features
        .into_inner()
        .into_iter()
        .map(|(k, v)| (k, ResultValue::Scores(v)))
        .collect();
    entries.insert(id.scores_key(), ResultValue::Scores(ys));
    Ok(QualityResult::new(asset, id.clone(), entries))
}

/// Fixed 4-feature SVR fusion with motion post-correction.
pub struct LegacyVmafRunner {
    provider: Arc<dyn FeatureProvider>,
    loader: Arc<dyn ModelLoader>,
}

impl LegacyVmafRunner {
    pub fn new(provider: Arc<dyn FeatureProvider>, loader: Arc<dyn ModelLoader>) -> Self {
        Self { provider, loader }
    }
}

impl QualityRunner for LegacyVmafRunner {
    fn id(&self) -> RunnerId {
        RunnerId::new("VMAF_legacy", format!("F{}-1.1", FUSED_FEATURE_VERSION))
    }

    fn execution(&self) -> Execution {
        Execution::FeatureModel
    }

    fn run_feature_model(&self, asset: &Asset) -> Result<QualityResult> {
        let id = self.id();
        let model = self.loader.load(&model_path(LEGACY_MODEL_FILE))?;

        let spec = FeatureSpec::all_of(FUSED_FEATURE_EXTRACTOR);
        let features = self.provider.extract(asset, &spec, false)?;

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(LEGACY_RESCALE.len());
        for (feature, bounds) in LEGACY_RESCALE {
            let raw = features.require(&feature_key(FUSED_FEATURE_EXTRACTOR, feature))?;
            columns.push(postprocess::rescale(raw, bounds));
        }

        let xs: Vec<Vec<f64>> = (0..features.frame_count())
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        let predicted = model.predict(&xs)?;

        // correction keys off the raw motion level, not the rescaled column
        let motion = features
            .require(&feature_key(FUSED_FEATURE_EXTRACTOR, "motion"))?
            .to_vec();
        let scores: Vec<f64> = predicted
            .iter()
            .zip(&motion)
            .map(|(&score, &m)| postprocess::motion_correction(m, score))
            .collect();

        let mut entries: BTreeMap<String, ResultValue> = features
            .into_inner()
            .into_iter()
            .map(|(k, v)| (k, ResultValue::Scores(v)))
            .collect();
        entries.insert(id.scores_key(), ResultValue::Scores(scores));
        Ok(QualityResult::new(asset, id, entries))
    }
}

/// Model-driven fusion: the artifact's metadata decides feature selection,
/// transform, and clip.
pub struct VmafRunner {
    provider: Arc<dyn FeatureProvider>,
    loader: Arc<dyn ModelLoader>,
    options: RunnerOptions,
}

impl VmafRunner {
    pub fn new(
        provider: Arc<dyn FeatureProvider>,
        loader: Arc<dyn ModelLoader>,
        options: RunnerOptions,
    ) -> Result<Self> {
        options.validate_for_fusion("VMAF")?;
        Ok(Self {
            provider,
            loader,
            options,
        })
    }

    fn artifact(&self) -> PathBuf {
        self.options
            .model_filepath
            .clone()
            .unwrap_or_else(|| model_path(DEFAULT_MODEL_FILE))
    }
}

impl QualityRunner for VmafRunner {
    fn id(&self) -> RunnerId {
        RunnerId::new("VMAF", format!("F{}-0.6.1", FUSED_FEATURE_VERSION))
    }

    fn execution(&self) -> Execution {
        Execution::FeatureModel
    }

    fn run_feature_model(&self, asset: &Asset) -> Result<QualityResult> {
        run_model_fusion(
            &self.id(),
            self.provider.as_ref(),
            self.loader.as_ref(),
            &self.artifact(),
            self.options.transform_enabled(),
            self.options.disable_clip_score,
            asset,
        )
    }
}

/// [`VmafRunner`] with the score transform forced on; its identity encodes
/// that behavior, so an explicit transform option is ambiguous and rejected.
pub struct VmafPhoneRunner {
    provider: Arc<dyn FeatureProvider>,
    loader: Arc<dyn ModelLoader>,
    options: RunnerOptions,
}

impl VmafPhoneRunner {
    pub fn new(
        provider: Arc<dyn FeatureProvider>,
        loader: Arc<dyn ModelLoader>,
        options: RunnerOptions,
    ) -> Result<Self> {
        options.validate_for_phone("VMAF_Phone")?;
        Ok(Self {
            provider,
            loader,
            options,
        })
    }

    fn artifact(&self) -> PathBuf {
        self.options
            .model_filepath
            .clone()
            .unwrap_or_else(|| model_path(DEFAULT_MODEL_FILE))
    }
}

impl std::fmt::Debug for VmafPhoneRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VmafPhoneRunner")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl QualityRunner for VmafPhoneRunner {
    fn id(&self) -> RunnerId {
        RunnerId::new(
            "VMAF_Phone",
            format!("F{}-0.6.1-phone", FUSED_FEATURE_VERSION),
        )
    }

    fn execution(&self) -> Execution {
        Execution::FeatureModel
    }

    fn run_feature_model(&self, asset: &Asset) -> Result<QualityResult> {
        run_model_fusion(
            &self.id(),
            self.provider.as_ref(),
            self.loader.as_ref(),
            &self.artifact(),
            true, // transform is unconditional for the phone version
            self.options.disable_clip_score,
            asset,
        )
    }
}
