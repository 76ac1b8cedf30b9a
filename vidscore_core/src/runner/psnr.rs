//! Direct log-based scoring via the external psnr tool
//!
//! The tool writes one `"psnr: <idx> <value>"` line per frame; extraction
//! demands a strict 0-based contiguous index run and at least one frame.

use crate::asset::Asset;
use crate::errors::Result;
use crate::exec;
use crate::identity::RunnerId;
use crate::log_parse;
use crate::result::{QualityResult, ResultValue};
use crate::runner::{Execution, QualityRunner};
use std::collections::BTreeMap;
use std::path::PathBuf;

const TYPE: &str = "PSNR";
const VERSION: &str = "1.0";

pub struct PsnrRunner {
    workdir: PathBuf,
    exe: Option<PathBuf>,
}

impl PsnrRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            exe: None,
        }
    }

    /// Use a specific executable instead of resolving `psnr` on PATH.
    pub fn with_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.exe = Some(exe.into());
        self
    }

    pub fn log_path(&self, asset: &Asset) -> PathBuf {
        self.workdir
            .join(format!("{}_{}.log", self.id().executor_id(), asset.id()))
    }
}

impl QualityRunner for PsnrRunner {
    fn id(&self) -> RunnerId {
        RunnerId::new(TYPE, VERSION)
    }

    fn execution(&self) -> Execution {
        Execution::DirectLog
    }

    fn generate_log(&self, asset: &Asset) -> Result<()> {
        exec::call_psnr(asset, &self.log_path(asset), self.exe.as_deref())
    }

    fn extract_scores(&self, asset: &Asset) -> Result<QualityResult> {
        let scores = log_parse::parse_indexed_log(&self.log_path(asset), "psnr")?;
        let id = self.id();
        let mut entries = BTreeMap::new();
        entries.insert(id.scores_key(), ResultValue::Scores(scores));
        Ok(QualityResult::new(asset, id, entries))
    }
}
