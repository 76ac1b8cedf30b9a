//! Asset description for a reference/distorted video pair
//!
//! An [`Asset`] names the two raw video streams a runner scores against each
//! other, together with the dimensions and pixel format the scorers read the
//! streams at. Assets are immutable for the duration of a run; the asset id
//! feeds the result cache key.

use crate::errors::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw YUV pixel formats the scorers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Yuv420p,
    Yuv422p,
    Yuv444p,
    Yuv420p10le,
    Yuv422p10le,
    Yuv444p10le,
    Yuv420p12le,
    Yuv422p12le,
    Yuv444p12le,
}

impl PixelFormat {
    /// Command-line token the external scorers expect.
    pub fn as_arg(&self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
            PixelFormat::Yuv420p10le => "yuv420p10le",
            PixelFormat::Yuv422p10le => "yuv422p10le",
            PixelFormat::Yuv444p10le => "yuv444p10le",
            PixelFormat::Yuv420p12le => "yuv420p12le",
            PixelFormat::Yuv422p12le => "yuv422p12le",
            PixelFormat::Yuv444p12le => "yuv444p12le",
        }
    }

    pub fn bit_depth(&self) -> u8 {
        if self.as_arg().contains("12le") {
            return 12;
        }
        if self.as_arg().contains("10le") {
            return 10;
        }
        8
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "yuv420p" => Some(PixelFormat::Yuv420p),
            "yuv422p" => Some(PixelFormat::Yuv422p),
            "yuv444p" => Some(PixelFormat::Yuv444p),
            "yuv420p10le" => Some(PixelFormat::Yuv420p10le),
            "yuv422p10le" => Some(PixelFormat::Yuv422p10le),
            "yuv444p10le" => Some(PixelFormat::Yuv444p10le),
            "yuv420p12le" => Some(PixelFormat::Yuv420p12le),
            "yuv422p12le" => Some(PixelFormat::Yuv422p12le),
            "yuv444p12le" => Some(PixelFormat::Yuv444p12le),
            _ => None,
        }
    }
}

/// A reference/distorted pair plus the geometry the pair is scored at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    ref_path: PathBuf,
    dis_path: PathBuf,
    width: u32,
    height: u32,
    pix_fmt: PixelFormat,
    id: String,
}

impl Asset {
    pub fn new(
        ref_path: impl Into<PathBuf>,
        dis_path: impl Into<PathBuf>,
        width: u32,
        height: u32,
        pix_fmt: PixelFormat,
    ) -> Result<Self> {
        let ref_path = ref_path.into();
        let dis_path = dis_path.into();
        if width == 0 || height == 0 {
            return Err(ScoreError::InvalidAsset(format!(
                "dimensions must be nonzero, got {}x{}",
                width, height
            )));
        }
        let id = format!(
            "{}_vs_{}_{}x{}",
            file_stem(&ref_path),
            file_stem(&dis_path),
            width,
            height
        );
        Ok(Self {
            ref_path,
            dis_path,
            width,
            height,
            pix_fmt,
            id,
        })
    }

    /// Replace the derived id with a caller-chosen one (e.g. a dataset key).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn ref_path(&self) -> &Path {
        &self.ref_path
    }

    pub fn dis_path(&self) -> &Path {
        &self.dis_path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pix_fmt(&self) -> PixelFormat {
        self.pix_fmt
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
