//! Quality runner contract and dispatch
//!
//! A runner turns one asset into one [`QualityResult`] through exactly one
//! of two execution strategies, fixed at construction:
//!
//! - **DirectLog**: invoke an external program that writes a log artifact,
//!   then parse the artifact (`generate_log` + `extract_scores`).
//! - **FeatureModel**: request feature sequences from a provider, run a
//!   regression model, post-process (`run_feature_model`).
//!
//! The strategies are mutually exclusive per variant. Calling a method that
//! belongs to the other strategy is a misuse of the abstraction and fails
//! with a contract-violation error, not a data error.
//!
//! Runners hold no shared mutable state and are safe to invoke concurrently
//! for different (asset, identity) pairs; for the same pair, the identity's
//! result key is the handle an external memoization layer dedupes on.

mod fusion;
mod native;
mod passthrough;
mod psnr;

pub use fusion::{LegacyVmafRunner, VmafPhoneRunner, VmafRunner};
pub use native::NativeVmafRunner;
pub use passthrough::PassthroughRunner;
pub use psnr::PsnrRunner;

use crate::asset::Asset;
use crate::errors::{Result, ScoreError};
use crate::identity::RunnerId;
use crate::result::QualityResult;
use tracing::info;

/// Which execution strategy a variant declared at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    DirectLog,
    FeatureModel,
}

pub trait QualityRunner: Send + Sync {
    /// The (type, version) pair uniquely keying this variant's numeric
    /// behavior, including its default model artifact and correction
    /// constants.
    fn id(&self) -> RunnerId;

    fn execution(&self) -> Execution;

    /// DirectLog only: run the external program, writing the log artifact.
    fn generate_log(&self, _asset: &Asset) -> Result<()> {
        Err(self.contract_violation("generate_log"))
    }

    /// DirectLog only: read the log artifact into a result. Fails on an
    /// empty or malformed artifact.
    fn extract_scores(&self, _asset: &Asset) -> Result<QualityResult> {
        Err(self.contract_violation("extract_scores"))
    }

    /// FeatureModel only: assemble features, predict, post-process.
    fn run_feature_model(&self, _asset: &Asset) -> Result<QualityResult> {
        Err(self.contract_violation("run_feature_model"))
    }

    fn contract_violation(&self, method: &'static str) -> ScoreError {
        ScoreError::ContractViolation {
            runner: self.id().executor_id(),
            method,
        }
    }
}

/// Run one asset through one runner, dispatching on its declared strategy.
pub fn run(runner: &dyn QualityRunner, asset: &Asset) -> Result<QualityResult> {
    let id = runner.id();
    info!(runner = %id, asset = asset.id(), "Scoring asset");
    let result = match runner.execution() {
        Execution::DirectLog => {
            runner.generate_log(asset)?;
            runner.extract_scores(asset)
        }
        Execution::FeatureModel => runner.run_feature_model(asset),
    }?;
    info!(
        runner = %id,
        asset = asset.id(),
        frames = result.scores().map(<[f64]>::len).unwrap_or(0),
        "Scoring complete"
    );
    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct DirectOnly;

    impl QualityRunner for DirectOnly {
        fn id(&self) -> RunnerId {
            RunnerId::new("DIRECT", "0.1")
        }

        fn execution(&self) -> Execution {
            Execution::DirectLog
        }

        fn generate_log(&self, _asset: &Asset) -> Result<()> {
            Ok(())
        }

        fn extract_scores(&self, asset: &Asset) -> Result<QualityResult> {
            let id = self.id();
            let mut entries = BTreeMap::new();
            entries.insert(
                id.scores_key(),
                crate::result::ResultValue::Scores(vec![1.0]),
            );
            Ok(QualityResult::new(asset, id, entries))
        }
    }

    #[test]
    fn test_dispatch_direct_log() {
        let asset = testutil::asset();
        let result = run(&DirectOnly, &asset).unwrap();
        assert_eq!(result.scores(), Some(&[1.0][..]));
    }

    #[test]
    fn test_wrong_strategy_method_is_contract_violation() {
        let asset = testutil::asset();
        let err = DirectOnly.run_feature_model(&asset).unwrap_err();
        match err {
            ScoreError::ContractViolation { runner, method } => {
                assert_eq!(runner, "DIRECT_V0.1");
                assert_eq!(method, "run_feature_model");
            }
            other => panic!("expected contract violation, got {:?}", other),
        }
    }
}
