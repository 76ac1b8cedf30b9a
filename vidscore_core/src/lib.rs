//! Per-frame quality score fusion core
//!
//! This crate turns per-frame perceptual features of a reference/distorted
//! video pair into one scalar quality score per frame, through one of
//! several interchangeable runner variants:
//! - Direct external-tool scoring with log extraction (psnr, native scorer)
//! - Feature assembly + regression model fusion (legacy SVR and
//!   model-metadata-driven flavors, plus the phone variant)
//! - Raw-feature passthrough
//!
//! Feature computation, solver internals, video decoding, and result
//! persistence are external collaborators; the core consumes them through
//! the `FeatureProvider`, `ScoreModel`/`ModelLoader`, and asset interfaces,
//! and keys everything it produces by a versioned runner identity so an
//! outer store can cache and compare results safely.

pub mod asset;
pub mod config;
pub mod errors;
pub mod exec;
pub mod feature;
pub mod identity;
pub mod log_parse;
pub mod logging;
pub mod model;
pub mod postprocess;
pub mod result;
pub mod runner;

pub use asset::{Asset, PixelFormat};
pub use config::RunnerOptions;
pub use errors::{Result, ScoreError};
pub use feature::{FeatureProvider, FeatureResult, FeatureSelection, FeatureSpec};
pub use identity::RunnerId;
pub use model::{ClipSpec, ModelLoader, ModelMetadata, ScoreModel, TransformSpec};
pub use result::{QualityResult, ResultValue};
pub use runner::{
    run, Execution, LegacyVmafRunner, NativeVmafRunner, PassthroughRunner, PsnrRunner,
    QualityRunner, VmafPhoneRunner, VmafRunner,
};
