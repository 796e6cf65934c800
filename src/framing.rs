//! Picture framing recipes.
//!
//! Two ways of putting a border around a picture:
//!
//! - [`compose_in_frame`] fits the picture into the transparent opening of a
//!   decorative frame image and overlays the frame on top.
//! - [`paint_border`] grows the canvas and draws concentric one-pixel
//!   outlines whose brown shade drifts randomly from ring to ring.
//!
//! Both return an RGB image ready for JPEG encoding.

use image::buffer::ConvertBuffer;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Pictures whose longer side is at most this get the narrow border.
const NARROW_BORDER_MAX_SIDE: u32 = 512;
const NARROW_BORDER: u32 = 10;
const WIDE_BORDER: u32 = 20;

/// Relative odds of perturbing R, G or B on each ring.
const CHANNEL_WEIGHTS: [u32; 3] = [6, 2, 2];

/// Where a picture goes inside a frame image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opening {
    /// Column of the first transparent pixel.
    pub x: u32,
    /// Row of the first transparent pixel in that column.
    pub y: u32,
    /// Width the picture is scaled to, assuming a symmetric frame.
    pub width: u32,
}

/// Find the transparent opening of a frame.
///
/// Columns are scanned left to right, each top to bottom; the first fully
/// transparent pixel marks the opening's top-left corner.
///
/// # Errors
///
/// Returns [`Error::NoOpening`] if no pixel is transparent or the opening
/// would have no width.
pub fn find_opening(frame: &PixelBuffer) -> Result<Opening> {
    let image = frame.as_image();
    let (width, height) = image.dimensions();
    for x in 0..width {
        for y in 0..height {
            if image.get_pixel(x, y)[3] == 0 {
                let opening_width = width.saturating_sub(2 * x);
                if opening_width == 0 {
                    return Err(Error::NoOpening);
                }
                return Ok(Opening {
                    x,
                    y,
                    width: opening_width,
                });
            }
        }
    }
    Err(Error::NoOpening)
}

/// `target * numerator / denominator`, truncated, never zero.
fn scale_dimension(target: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(target) * u64::from(numerator) / u64::from(denominator.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Options for [`compose_in_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    /// Width of the final image; height follows the frame's aspect ratio.
    pub output_width: u32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { output_width: 768 }
    }
}

/// Fit `picture` into the opening of `frame` and resize the result.
///
/// The picture is scaled with Lanczos3 to the opening width (keeping its
/// aspect ratio), placed at the opening's corner, and the frame is
/// alpha-composited over it. Areas covered by neither end up black.
///
/// # Errors
///
/// Returns [`Error::NoOpening`] if the frame has no transparent area.
pub fn compose_in_frame(
    picture: &PixelBuffer,
    frame: &PixelBuffer,
    opts: &FrameOptions,
) -> Result<RgbImage> {
    let opening = find_opening(frame)?;
    let (pic_w, pic_h) = picture.dimensions();
    let fitted_h = scale_dimension(opening.width, pic_h, pic_w);
    let fitted = imageops::resize(
        picture.as_image(),
        opening.width,
        fitted_h,
        FilterType::Lanczos3,
    );

    let (frame_w, frame_h) = frame.dimensions();
    let mut combined = RgbaImage::new(frame_w, frame_h);
    imageops::overlay(
        &mut combined,
        &fitted,
        i64::from(opening.x),
        i64::from(opening.y),
    );
    imageops::overlay(&mut combined, frame.as_image(), 0, 0);

    let out_h = scale_dimension(opts.output_width, frame_h, frame_w);
    let resized = imageops::resize(&combined, opts.output_width, out_h, FilterType::Lanczos3);
    Ok(resized.convert())
}

/// Options for [`paint_border`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderOptions {
    /// Border thickness in pixels; `None` picks 10 or 20 from the picture size.
    pub width: Option<u32>,
    /// Color the random walk starts from.
    pub seed_color: Rgb<u8>,
    /// Lower bound per channel.
    pub min_color: Rgb<u8>,
    /// Upper bound per channel.
    pub max_color: Rgb<u8>,
    /// Largest change applied to a channel between rings.
    pub jitter: u8,
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self {
            width: None,
            seed_color: Rgb([101, 67, 33]),
            min_color: Rgb([60, 30, 0]),
            max_color: Rgb([150, 100, 60]),
            jitter: 20,
        }
    }
}

impl BorderOptions {
    /// Check that the color bounds are ordered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any channel of `min_color` exceeds
    /// the same channel of `max_color`.
    pub fn validate(&self) -> Result<()> {
        let ordered = self
            .min_color
            .0
            .iter()
            .zip(self.max_color.0)
            .all(|(lo, hi)| *lo <= hi);
        if ordered {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "border color bounds {:?} and {:?} are not ordered",
                self.min_color.0, self.max_color.0
            )))
        }
    }

    /// Border thickness for a `width x height` picture.
    #[must_use]
    pub fn border_width_for(&self, width: u32, height: u32) -> u32 {
        self.width.unwrap_or(if width.max(height) <= NARROW_BORDER_MAX_SIDE {
            NARROW_BORDER
        } else {
            WIDE_BORDER
        })
    }
}

/// Perturb one channel of `current`, chosen by `channels`, within the bounds.
fn next_shade<R: Rng + ?Sized>(
    rng: &mut R,
    channels: &WeightedIndex<u32>,
    current: Rgb<u8>,
    opts: &BorderOptions,
) -> Rgb<u8> {
    let c = channels.sample(rng);
    let value = i32::from(current[c]);
    let jitter = i32::from(opts.jitter);
    let drawn = rng.gen_range(value - jitter..=value + jitter);
    let bounded = drawn
        .min(i32::from(opts.max_color[c]))
        .max(i32::from(opts.min_color[c]));

    let mut next = current;
    next[c] = u8::try_from(bounded).unwrap_or(current[c]);
    next
}

/// Surround `picture` with a randomized brown border.
///
/// The output is `2 * border` pixels larger on each axis with the picture
/// copied unchanged at `(border, border)`. Ring `i` is the one-pixel outline
/// inset by `i` from the edge.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if the color bounds are not ordered or
/// the bordered image would be too large to address.
pub fn paint_border<R: Rng + ?Sized>(
    picture: &PixelBuffer,
    opts: &BorderOptions,
    rng: &mut R,
) -> Result<RgbImage> {
    opts.validate()?;
    let channels =
        WeightedIndex::new(CHANNEL_WEIGHTS).map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let (width, height) = picture.dimensions();
    let border = opts.border_width_for(width, height);
    let grown = |side: u32| {
        border
            .checked_mul(2)
            .and_then(|both| side.checked_add(both))
            .filter(|&total| i32::try_from(total).is_ok())
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "border of {border}px is too wide for a {width}x{height} picture"
                ))
            })
    };
    let (out_w, out_h) = (grown(width)?, grown(height)?);

    let mut canvas = RgbaImage::new(out_w, out_h);
    imageops::replace(
        &mut canvas,
        picture.as_image(),
        i64::from(border),
        i64::from(border),
    );

    let mut shade = opts.seed_color;
    for (inset, at) in (0..border).zip(0_i32..) {
        shade = next_shade(rng, &channels, shade, opts);
        let ring = Rect::at(at, at).of_size(out_w - 2 * inset, out_h - 2 * inset);
        draw_hollow_rect_mut(&mut canvas, ring, Rgba([shade[0], shade[1], shade[2], 255]));
    }

    Ok(canvas.convert())
}
