//! External scorer invocation
//!
//! Command-line plumbing for the two executables the direct-log runners
//! shell out to: the per-frame psnr tool and the combined native scorer.
//! Commands run to completion synchronously; a non-zero exit or a missing
//! tool is surfaced as an error with captured stderr, never as an empty
//! result. Cancellation/timeouts belong to whoever wraps the invocation.

use crate::asset::Asset;
use crate::config::RunnerOptions;
use crate::errors::{Result, ScoreError};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Resolve a tool on PATH, or fail with installation guidance.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| {
        ScoreError::ToolNotFound(format!(
            "{} not found. 💡 Ensure it is installed and in PATH",
            name
        ))
    })
}

fn run_captured(exe: &Path, args: &[String]) -> Result<String> {
    debug!(tool = %exe.display(), args = ?args, "Invoking external scorer");

    let output = Command::new(exe).args(args).output().map_err(|e| {
        ScoreError::ExternalTool(format!("failed to spawn {}: {}", exe.display(), e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScoreError::ExternalTool(format!(
            "{} exited with {:?}: {}",
            exe.display(),
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run the per-frame psnr tool and write its stdout to `log_path`.
pub fn call_psnr(asset: &Asset, log_path: &Path, exe: Option<&Path>) -> Result<()> {
    let exe = match exe {
        Some(path) => path.to_path_buf(),
        None => require_tool("psnr")?,
    };

    let args = vec![
        asset.pix_fmt().as_arg().to_string(),
        asset.ref_path().display().to_string(),
        asset.dis_path().display().to_string(),
        asset.width().to_string(),
        asset.height().to_string(),
    ];

    let stdout = run_captured(&exe, &args)?;
    std::fs::write(log_path, stdout)?;
    Ok(())
}

/// Run the combined native scorer: feature extraction, regression, and
/// post-processing all happen inside the executable; it writes a structured
/// JSON log to `log_path`.
pub fn call_native_scorer(
    asset: &Asset,
    model_path: &Path,
    log_path: &Path,
    options: &RunnerOptions,
    exe: Option<&Path>,
) -> Result<()> {
    let exe = match exe {
        Some(path) => path.to_path_buf(),
        None => require_tool("vmafossexec")?,
    };

    let mut args = vec![
        asset.pix_fmt().as_arg().to_string(),
        asset.width().to_string(),
        asset.height().to_string(),
        asset.ref_path().display().to_string(),
        asset.dis_path().display().to_string(),
        model_path.display().to_string(),
        "--log".to_string(),
        log_path.display().to_string(),
        "--log-fmt".to_string(),
        "json".to_string(),
    ];
    if options.disable_clip_score {
        args.push("--disable-clip".to_string());
    }
    if options.transform_enabled() {
        args.push("--enable-transform".to_string());
    }
    if options.phone_model {
        args.push("--phone-model".to_string());
    }
    if options.disable_avx {
        args.push("--disable-avx".to_string());
    }

    run_captured(&exe, &args)?;

    if !log_path.exists() {
        return Err(ScoreError::ExternalTool(format!(
            "native scorer exited cleanly but wrote no log at {}",
            log_path.display()
        )));
    }
    Ok(())
}
