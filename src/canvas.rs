//! Inner canvas removal: sample, detect, mask.

use image::Rgb;
use tracing::debug;

use crate::buffer::{PixelBuffer, Region};
use crate::color::{center_region, dominant_color};
use crate::detection::{seed_region, EdgeStrategy};
use crate::error::{Error, Result};
use crate::masking::apply_transparency;

/// Options controlling canvas detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasOptions {
    /// Edge length every input image must have; other sizes are skipped.
    pub expected_resolution: u32,
    /// Edge length of the central square used for sampling and seeding.
    pub center_region_size: u32,
    /// Maximum per-channel difference still counted as canvas color.
    pub tolerance: u8,
    /// How the canvas boundary is searched for.
    pub strategy: EdgeStrategy,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            expected_resolution: 1024,
            center_region_size: 768,
            tolerance: 50,
            strategy: EdgeStrategy::Diagonal,
        }
    }
}

impl CanvasOptions {
    /// Check that the central square fits inside the expected resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either size is zero or the central
    /// square is larger than the image.
    pub fn validate(&self) -> Result<()> {
        if self.expected_resolution == 0 || self.center_region_size == 0 {
            return Err(Error::InvalidConfig(
                "resolution and center region size must be positive".to_string(),
            ));
        }
        if self.center_region_size > self.expected_resolution {
            return Err(Error::InvalidConfig(format!(
                "center region {} exceeds resolution {}",
                self.center_region_size, self.expected_resolution
            )));
        }
        Ok(())
    }
}

/// What canvas detection found in one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasDetection {
    /// Mean color of the central sampling square.
    pub dominant: Rgb<u8>,
    /// Detected canvas rectangle.
    pub region: Region,
}

/// Locate the canvas without modifying the image.
///
/// # Errors
///
/// Returns [`Error::ResolutionMismatch`] if the image is not
/// `expected_resolution` pixels square, or [`Error::OutOfBounds`] if the
/// central square does not fit.
pub fn detect_canvas(buffer: &PixelBuffer, opts: &CanvasOptions) -> Result<CanvasDetection> {
    let (width, height) = buffer.dimensions();
    if width != opts.expected_resolution || height != opts.expected_resolution {
        return Err(Error::ResolutionMismatch {
            width,
            height,
            expected: opts.expected_resolution,
        });
    }

    let sample = center_region(width, height, opts.center_region_size)?;
    let dominant = dominant_color(buffer, sample)?;
    debug!(color = ?dominant.0, "dominant color");

    let seed = seed_region(width, height, opts.center_region_size)?;
    let region = opts
        .strategy
        .detect(buffer, dominant, seed, opts.tolerance)?;
    debug!(%region, strategy = ?opts.strategy, "canvas edges detected");

    Ok(CanvasDetection { dominant, region })
}

/// Locate the canvas and make it fully transparent.
///
/// # Errors
///
/// Same as [`detect_canvas`]; the buffer is untouched on error.
pub fn remove_canvas(buffer: &mut PixelBuffer, opts: &CanvasOptions) -> Result<CanvasDetection> {
    let detection = detect_canvas(buffer, opts)?;
    apply_transparency(buffer, detection.region);
    Ok(detection)
}
