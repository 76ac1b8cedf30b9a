//! Scorer log parsers
//!
//! Two formats come back from external scorers:
//!
//! - a plain-text per-line format `"<label>: <frame-index> <value>"` whose
//!   indices must form a strict 0-based contiguous run, and
//! - a structured JSON log with one record per frame, each carrying a
//!   required final-score attribute plus optional named sub-feature
//!   attributes.
//!
//! Zero parsed frames is always fatal: it means the external invocation
//! failed, not that the clip was legitimately empty.

use crate::errors::{Result, ScoreError};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Parse `"<label>: <idx> <value>"` lines. Non-matching lines are skipped;
/// matching lines must carry a contiguous 0-based index run.
pub fn parse_indexed_scores(content: &str, label: &str) -> Result<Vec<f64>> {
    let pattern = format!(r"^{}: ([0-9]+) ([0-9.-]+)", regex::escape(label));
    let re = Regex::new(&pattern).expect("static score-line pattern");

    let mut scores = Vec::new();
    for line in content.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let idx: usize = caps[1].parse().map_err(|_| {
            ScoreError::ExternalTool(format!("unparseable frame index in line: {}", line))
        })?;
        if idx != scores.len() {
            return Err(ScoreError::NonContiguousFrames {
                expected: scores.len(),
                found: idx,
                position: scores.len(),
            });
        }
        let value: f64 = caps[2].parse().map_err(|_| {
            ScoreError::ExternalTool(format!("unparseable score in line: {}", line))
        })?;
        scores.push(value);
    }

    if scores.is_empty() {
        return Err(ScoreError::NoFrames(format!("'{}' log", label)));
    }
    Ok(scores)
}

/// [`parse_indexed_scores`] over a log file on disk.
pub fn parse_indexed_log(path: &Path, label: &str) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)?;
    parse_indexed_scores(&content, label).map_err(|e| match e {
        ScoreError::NoFrames(_) => ScoreError::NoFrames(path.display().to_string()),
        other => other,
    })
}

/// Per-frame sequences recovered from a structured scorer log.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecords {
    /// Final quality score, one per frame.
    pub scores: Vec<f64>,
    /// Sub-feature sequences; a feature missing from some frames yields a
    /// shorter sequence, a feature missing everywhere yields no entry.
    pub feature_scores: BTreeMap<String, Vec<f64>>,
}

#[derive(Deserialize)]
struct StructuredLog {
    frames: Vec<StructuredFrame>,
}

#[derive(Deserialize)]
struct StructuredFrame {
    #[serde(default, rename = "frameNum")]
    #[allow(dead_code)]
    frame_num: u64,
    metrics: BTreeMap<String, f64>,
}

/// Parse a structured JSON log: one record per frame, `score_attr` required
/// on every record, sub-feature attributes optional per record.
pub fn parse_frame_records(
    content: &str,
    score_attr: &str,
    features: &[&str],
) -> Result<FrameRecords> {
    let log: StructuredLog = serde_json::from_str(content)
        .map_err(|e| ScoreError::ExternalTool(format!("invalid structured log: {}", e)))?;

    if log.frames.is_empty() {
        return Err(ScoreError::NoFrames("structured log".to_string()));
    }

    let mut scores = Vec::with_capacity(log.frames.len());
    let mut feature_scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for (i, frame) in log.frames.iter().enumerate() {
        let score = frame
            .metrics
            .get(score_attr)
            .ok_or_else(|| ScoreError::MissingAttribute {
                attribute: score_attr.to_string(),
                frame: i,
            })?;
        scores.push(*score);

        for feature in features {
            // some sub-features may be missing on some or all frames
            if let Some(value) = frame.metrics.get(*feature) {
                feature_scores
                    .entry(feature.to_string())
                    .or_default()
                    .push(*value);
            }
        }
    }

    Ok(FrameRecords {
        scores,
        feature_scores,
    })
}

/// [`parse_frame_records`] over a log file on disk.
pub fn parse_frame_records_log(
    path: &Path,
    score_attr: &str,
    features: &[&str],
) -> Result<FrameRecords> {
    let content = std::fs::read_to_string(path)?;
    parse_frame_records(&content, score_attr, features).map_err(|e| match e {
        ScoreError::NoFrames(_) => ScoreError::NoFrames(path.display().to_string()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_scores_happy_path() {
        let log = "psnr: 0 30.1\npsnr: 1 31.4\n";
        assert_eq!(parse_indexed_scores(log, "psnr").unwrap(), vec![30.1, 31.4]);
    }

    #[test]
    fn test_indexed_scores_skips_foreign_lines() {
        let log = "starting up\npsnr: 0 30.1\nsome progress noise\npsnr: 1 -12.5\n";
        assert_eq!(
            parse_indexed_scores(log, "psnr").unwrap(),
            vec![30.1, -12.5]
        );
    }

    #[test]
    fn test_indexed_scores_gap_is_fatal() {
        let log = "psnr: 0 30.1\npsnr: 2 31.4\n";
        let err = parse_indexed_scores(log, "psnr").unwrap_err();
        assert!(matches!(
            err,
            ScoreError::NonContiguousFrames {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_indexed_scores_repeat_is_fatal() {
        let log = "psnr: 0 30.1\npsnr: 0 30.1\n";
        assert!(matches!(
            parse_indexed_scores(log, "psnr").unwrap_err(),
            ScoreError::NonContiguousFrames { .. }
        ));
    }

    #[test]
    fn test_indexed_scores_nonzero_start_is_fatal() {
        let log = "psnr: 1 30.1\n";
        assert!(matches!(
            parse_indexed_scores(log, "psnr").unwrap_err(),
            ScoreError::NonContiguousFrames { .. }
        ));
    }

    #[test]
    fn test_indexed_scores_empty_is_fatal() {
        assert!(matches!(
            parse_indexed_scores("no matching lines here\n", "psnr").unwrap_err(),
            ScoreError::NoFrames(_)
        ));
    }

    #[test]
    fn test_indexed_scores_label_is_escaped() {
        // a label containing regex metacharacters must match literally
        let log = "ms.ssim: 0 0.98\n";
        assert_eq!(parse_indexed_scores(log, "ms.ssim").unwrap(), vec![0.98]);
        assert!(parse_indexed_scores("msXssim: 0 0.98\n", "ms.ssim").is_err());
    }

    const STRUCTURED: &str = r#"{
        "frames": [
            {"frameNum": 0, "metrics": {"vmaf": 91.2, "adm2": 0.97, "motion": 3.1}},
            {"frameNum": 1, "metrics": {"vmaf": 88.7, "adm2": 0.95, "motion": 4.0}},
            {"frameNum": 2, "metrics": {"vmaf": 90.0, "motion": 2.2}}
        ]
    }"#;

    #[test]
    fn test_frame_records_scores_and_partial_features() {
        let records =
            parse_frame_records(STRUCTURED, "vmaf", &["adm2", "motion", "ssim"]).unwrap();
        assert_eq!(records.scores, vec![91.2, 88.7, 90.0]);
        // adm2 missing on frame 2: sequence is shorter
        assert_eq!(records.feature_scores["adm2"], vec![0.97, 0.95]);
        assert_eq!(records.feature_scores["motion"], vec![3.1, 4.0, 2.2]);
        // ssim missing everywhere: no entry at all
        assert!(!records.feature_scores.contains_key("ssim"));
    }

    #[test]
    fn test_frame_records_missing_score_is_fatal() {
        let log = r#"{"frames": [{"frameNum": 0, "metrics": {"adm2": 0.97}}]}"#;
        let err = parse_frame_records(log, "vmaf", &["adm2"]).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::MissingAttribute { ref attribute, frame: 0 } if attribute == "vmaf"
        ));
    }

    #[test]
    fn test_frame_records_zero_frames_is_fatal() {
        let log = r#"{"frames": []}"#;
        assert!(matches!(
            parse_frame_records(log, "vmaf", &[]).unwrap_err(),
            ScoreError::NoFrames(_)
        ));
    }

    #[test]
    fn test_frame_records_garbage_is_fatal() {
        assert!(parse_frame_records("<xml/>", "vmaf", &[]).is_err());
    }
}
