//! Runner options - the recognized configuration surface
//!
//! Every option a caller may pass into a run, enumerated with its default.
//! Validation happens eagerly, per runner, before any feature extraction or
//! external invocation: an unsupported combination must fail loudly up
//! front, never silently degrade halfway through a run.
//!
//! ## Recognized options
//! - `model_filepath`: override the runner version's default model artifact
//! - `disable_clip_score`: skip the model-declared clip bounds
//! - `enable_transform_score`: apply the model-declared score transform
//!   (kept as an `Option` so "explicitly supplied" stays observable; the
//!   phone variant rejects an explicit value)
//! - `phone_model`: forwarded to the native scorer executable only
//! - `disable_avx`: forwarded to the native scorer executable only

use crate::errors::{Result, ScoreError};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunnerOptions {
    pub model_filepath: Option<PathBuf>,
    pub disable_clip_score: bool,
    pub enable_transform_score: Option<bool>,
    pub phone_model: bool,
    pub disable_avx: bool,
}

impl RunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_filepath = Some(path.into());
        self
    }

    pub fn with_disable_clip_score(mut self, disable: bool) -> Self {
        self.disable_clip_score = disable;
        self
    }

    pub fn with_enable_transform_score(mut self, enable: bool) -> Self {
        self.enable_transform_score = Some(enable);
        self
    }

    pub fn with_phone_model(mut self, phone: bool) -> Self {
        self.phone_model = phone;
        self
    }

    pub fn with_disable_avx(mut self, disable: bool) -> Self {
        self.disable_avx = disable;
        self
    }

    pub(crate) fn transform_enabled(&self) -> bool {
        self.enable_transform_score.unwrap_or(false)
    }

    /// Options a model-driven fusion runner supports. `phone_model` belongs
    /// to the phone variant, `disable_avx` to the native-executable variant.
    pub(crate) fn validate_for_fusion(&self, runner: &str) -> Result<()> {
        if self.phone_model {
            return Err(ScoreError::InvalidOptions(format!(
                "❌ {} does not accept phone_model\n\
                 💡 The phone behavior is a separate runner version; construct the phone \
                 variant instead of flagging this one",
                runner
            )));
        }
        self.reject_avx(runner)
    }

    /// The phone variant's identity already encodes the transform, so an
    /// explicit override is ambiguous and disallowed.
    pub(crate) fn validate_for_phone(&self, runner: &str) -> Result<()> {
        if self.enable_transform_score.is_some() {
            return Err(ScoreError::InvalidOptions(format!(
                "❌ Cannot specify enable_transform_score option in {}\n\
                 💡 The transform is unconditionally on for this runner version; drop the flag",
                runner
            )));
        }
        if self.phone_model {
            return Err(ScoreError::InvalidOptions(format!(
                "❌ {} does not accept phone_model; the variant itself is the phone model",
                runner
            )));
        }
        self.reject_avx(runner)
    }

    fn reject_avx(&self, runner: &str) -> Result<()> {
        if self.disable_avx {
            return Err(ScoreError::InvalidOptions(format!(
                "❌ {} does not accept disable_avx\n\
                 💡 disable_avx only applies to the native scorer executable",
                runner
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunnerOptions::new();
        assert!(options.model_filepath.is_none());
        assert!(!options.disable_clip_score);
        assert!(options.enable_transform_score.is_none());
        assert!(!options.transform_enabled());
        assert!(!options.phone_model);
        assert!(!options.disable_avx);
    }

    #[test]
    fn test_fusion_validation_table() {
        // (options, expected_ok)
        let cases: Vec<(RunnerOptions, bool)> = vec![
            (RunnerOptions::new(), true),
            (RunnerOptions::new().with_disable_clip_score(true), true),
            (RunnerOptions::new().with_enable_transform_score(true), true),
            (RunnerOptions::new().with_enable_transform_score(false), true),
            (RunnerOptions::new().with_model_filepath("/m.json"), true),
            (RunnerOptions::new().with_phone_model(true), false),
            (RunnerOptions::new().with_disable_avx(true), false),
        ];
        for (options, expected_ok) in cases {
            assert_eq!(
                options.validate_for_fusion("VMAF").is_ok(),
                expected_ok,
                "fusion validation of {:?}",
                options
            );
        }
    }

    #[test]
    fn test_phone_rejects_explicit_transform() {
        // explicitly supplied, regardless of the value
        for value in [true, false] {
            let err = RunnerOptions::new()
                .with_enable_transform_score(value)
                .validate_for_phone("VMAF_Phone")
                .unwrap_err();
            assert!(matches!(err, ScoreError::InvalidOptions(_)));
            assert!(err.to_string().contains("enable_transform_score"));
        }
    }

    #[test]
    fn test_phone_accepts_remaining_options() {
        assert!(RunnerOptions::new()
            .with_model_filepath("/m.json")
            .with_disable_clip_score(true)
            .validate_for_phone("VMAF_Phone")
            .is_ok());
    }

    #[test]
    fn test_avx_only_for_native() {
        let options = RunnerOptions::new().with_disable_avx(true);
        assert!(options.validate_for_fusion("VMAF").is_err());
        assert!(options.validate_for_phone("VMAF_Phone").is_err());
    }
}
