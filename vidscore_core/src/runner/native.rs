//! Combined native-output runner
//!
//! Feature extraction, regression, and post-processing all run inside an
//! external native scorer; the core's job shrinks to invoking it with the
//! asset geometry, model path, and option flags, then parsing the
//! structured per-frame log it writes. A sub-feature missing from some or
//! all frames is tolerated; a missing final score or zero frames is fatal.

use crate::asset::Asset;
use crate::config::RunnerOptions;
use crate::errors::Result;
use crate::exec;
use crate::feature::FUSED_FEATURE_VERSION;
use crate::identity::RunnerId;
use crate::log_parse;
use crate::model::model_path;
use crate::result::{QualityResult, ResultValue};
use crate::runner::{Execution, QualityRunner};
use std::collections::BTreeMap;
use std::path::PathBuf;

const TYPE: &str = "VMAFOSSEXEC";

const DEFAULT_MODEL_FILE: &str = "vmaf_v0.6.1.json";

/// Sub-feature attributes the native scorer may attach to each frame
/// record. Anything else in a record is ignored.
const FEATURES: [&str; 15] = [
    "adm2",
    "adm_scale0",
    "adm_scale1",
    "adm_scale2",
    "adm_scale3",
    "motion",
    "vif_scale0",
    "vif_scale1",
    "vif_scale2",
    "vif_scale3",
    "vif",
    "psnr",
    "ssim",
    "ms_ssim",
    "motion2",
];

/// Final-score attribute every frame record must carry.
const SCORE_ATTR: &str = "vmaf";

pub struct NativeVmafRunner {
    workdir: PathBuf,
    options: RunnerOptions,
    exe: Option<PathBuf>,
}

impl NativeVmafRunner {
    pub fn new(workdir: impl Into<PathBuf>, options: RunnerOptions) -> Self {
        Self {
            workdir: workdir.into(),
            options,
            exe: None,
        }
    }

    /// Use a specific scorer executable instead of resolving the default on
    /// PATH.
    pub fn with_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.exe = Some(exe.into());
        self
    }

    pub fn log_path(&self, asset: &Asset) -> PathBuf {
        self.workdir
            .join(format!("{}_{}.json", self.id().executor_id(), asset.id()))
    }

    fn artifact(&self) -> PathBuf {
        self.options
            .model_filepath
            .clone()
            .unwrap_or_else(|| model_path(DEFAULT_MODEL_FILE))
    }
}

impl QualityRunner for NativeVmafRunner {
    fn id(&self) -> RunnerId {
        RunnerId::new(TYPE, format!("F{}-0.6.1", FUSED_FEATURE_VERSION))
    }

    fn execution(&self) -> Execution {
        Execution::DirectLog
    }

    fn generate_log(&self, asset: &Asset) -> Result<()> {
        exec::call_native_scorer(
            asset,
            &self.artifact(),
            &self.log_path(asset),
            &self.options,
            self.exe.as_deref(),
        )
    }

    fn extract_scores(&self, asset: &Asset) -> Result<QualityResult> {
        let records = log_parse::parse_frame_records_log(
            &self.log_path(asset),
            SCORE_ATTR,
            &FEATURES,
        )?;

        let id = self.id();
        let mut entries = BTreeMap::new();
        entries.insert(id.scores_key(), ResultValue::Scores(records.scores));
        for (feature, scores) in records.feature_scores {
            entries.insert(
                id.feature_scores_key(&feature),
                ResultValue::Scores(scores),
            );
        }
        Ok(QualityResult::new(asset, id, entries))
    }
}
