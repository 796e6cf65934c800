//! Canvas edge detection.
//!
//! Starting from a seed rectangle centered on the image, the detector searches
//! outward for the first pixels whose color no longer matches the sampled
//! dominant canvas color. Two strategies are available:
//!
//! 1. **Diagonal**: one ray from each of the seed's top-left and bottom-right
//!    corners toward the matching image corner. Cheap, but assumes the canvas
//!    corners lie on the diagonal through the seed.
//! 2. **Axis-cross**: four independent line scans (up, down, left, right).
//!    A whole row or column across the seed span must match for the search to
//!    continue, so a single stray pixel stops it.
//!
//! Either way the result is clamped to the image and never inverted: a search
//! that would produce an inverted rectangle falls back to the seed.

use std::ops::RangeInclusive;

use image::{Rgb, Rgba};
use tracing::debug;

use crate::buffer::{PixelBuffer, Region};
use crate::color::is_similar;
use crate::error::{Error, Result};

/// How the canvas boundary is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EdgeStrategy {
    /// Walk diagonal rays outward from the seed's corners.
    #[default]
    Diagonal,
    /// Scan rows and columns outward from the seed's edges.
    AxisCross,
}

impl EdgeStrategy {
    /// Find the canvas rectangle in `buffer`.
    ///
    /// `dominant` is the reference canvas color and `seed` the rectangle the
    /// search starts from (see [`seed_region`]). Edges that never meet a
    /// mismatching pixel before the image border stay on the seed boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the seed lies entirely outside the
    /// image.
    pub fn detect(
        self,
        buffer: &PixelBuffer,
        dominant: Rgb<u8>,
        seed: Region,
        tolerance: u8,
    ) -> Result<Region> {
        let (width, height) = buffer.dimensions();
        let seed = seed.clamp_to(width, height).ok_or(Error::OutOfBounds {
            x: seed.left(),
            y: seed.top(),
            width,
            height,
        })?;

        let (top_left, bottom_right) = match self {
            Self::Diagonal => diagonal_scan(buffer, dominant, seed, tolerance)?,
            Self::AxisCross => axis_cross_scan(buffer, dominant, seed, tolerance)?,
        };

        let top_left = (top_left.0.min(width - 1), top_left.1.min(height - 1));
        let bottom_right = (bottom_right.0.min(width - 1), bottom_right.1.min(height - 1));

        Ok(Region::new(top_left, bottom_right).unwrap_or_else(|_| {
            debug!(?top_left, ?bottom_right, "inverted detection, keeping seed");
            seed
        }))
    }
}

/// The seed rectangle the edge search starts from.
///
/// Centered on `(width / 2, height / 2)` and extending `size / 2` pixels in
/// every direction, clamped to the image. With an even `size` this is one
/// pixel wider than the matching [`center_region`](crate::color::center_region).
///
/// # Errors
///
/// Returns [`Error::OutOfBounds`] for an empty image.
pub fn seed_region(width: u32, height: u32, size: u32) -> Result<Region> {
    if width == 0 || height == 0 {
        return Err(Error::OutOfBounds {
            x: 0,
            y: 0,
            width,
            height,
        });
    }
    let (cx, cy) = (width / 2, height / 2);
    let half = size / 2;
    Region::new(
        (cx.saturating_sub(half), cy.saturating_sub(half)),
        ((cx + half).min(width - 1), (cy + half).min(height - 1)),
    )
}

/// First coordinate along `path` whose pixel does not match `dominant`.
fn first_mismatch<I>(
    buffer: &PixelBuffer,
    dominant: Rgb<u8>,
    tolerance: u8,
    path: I,
) -> Result<Option<(u32, u32, Rgba<u8>)>>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    for (x, y) in path {
        let px = buffer.get(x, y)?;
        if !is_similar(&px, &dominant, tolerance) {
            return Ok(Some((x, y, px)));
        }
    }
    Ok(None)
}

type Corners = ((u32, u32), (u32, u32));

fn diagonal_scan(
    buffer: &PixelBuffer,
    dominant: Rgb<u8>,
    seed: Region,
    tolerance: u8,
) -> Result<Corners> {
    let (width, height) = buffer.dimensions();

    let (left, top) = seed.top_left();
    let up_left = (0..=left.min(top)).map(|k| (left - k, top - k));
    let top_left = match first_mismatch(buffer, dominant, tolerance, up_left)? {
        Some((x, y, px)) => {
            debug!(x, y, color = ?px.0, "top-left mismatch");
            (x + 1, y + 1)
        }
        None => seed.top_left(),
    };

    let (right, bottom) = seed.bottom_right();
    let steps = (width - 1 - right).min(height - 1 - bottom);
    let down_right = (0..=steps).map(|k| (right + k, bottom + k));
    let bottom_right = match first_mismatch(buffer, dominant, tolerance, down_right)? {
        Some((x, y, px)) => {
            debug!(x, y, color = ?px.0, "bottom-right mismatch");
            (x.saturating_sub(1), y.saturating_sub(1))
        }
        None => seed.bottom_right(),
    };

    Ok((top_left, bottom_right))
}

/// Orientation of the lines an axis scan steps through.
#[derive(Debug, Clone, Copy)]
enum Line {
    Row,
    Column,
}

/// First line in `lines` holding any pixel within `span` that does not match.
fn first_mismatching_line<I>(
    buffer: &PixelBuffer,
    dominant: Rgb<u8>,
    tolerance: u8,
    orientation: Line,
    lines: I,
    span: RangeInclusive<u32>,
) -> Result<Option<u32>>
where
    I: IntoIterator<Item = u32>,
{
    for line in lines {
        let hit = match orientation {
            Line::Row => {
                first_mismatch(buffer, dominant, tolerance, span.clone().map(|x| (x, line)))?
            }
            Line::Column => {
                first_mismatch(buffer, dominant, tolerance, span.clone().map(|y| (line, y)))?
            }
        };
        if let Some((x, y, px)) = hit {
            debug!(x, y, color = ?px.0, ?orientation, "edge mismatch");
            return Ok(Some(line));
        }
    }
    Ok(None)
}

fn axis_cross_scan(
    buffer: &PixelBuffer,
    dominant: Rgb<u8>,
    seed: Region,
    tolerance: u8,
) -> Result<Corners> {
    let (width, height) = buffer.dimensions();
    let columns = seed.left()..=seed.right();
    let rows = seed.top()..=seed.bottom();

    let up = (0..=seed.top()).rev();
    let top = first_mismatching_line(buffer, dominant, tolerance, Line::Row, up, columns.clone())?
        .map_or(seed.top(), |y| y + 1);
    let down = seed.bottom()..height;
    let bottom = first_mismatching_line(buffer, dominant, tolerance, Line::Row, down, columns)?
        .map_or(seed.bottom(), |y| y.saturating_sub(1));
    let leftward = (0..=seed.left()).rev();
    let left =
        first_mismatching_line(buffer, dominant, tolerance, Line::Column, leftward, rows.clone())?
            .map_or(seed.left(), |x| x + 1);
    let rightward = seed.right()..width;
    let right = first_mismatching_line(buffer, dominant, tolerance, Line::Column, rightward, rows)?
        .map_or(seed.right(), |x| x.saturating_sub(1));

    Ok(((left, top), (right, bottom)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn square_on_black(size: u32, from: u32, to: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::filled(size, size, BLACK);
        for y in from..=to {
            for x in from..=to {
                buf.set(x, y, GRAY).unwrap();
            }
        }
        buf
    }

    #[test]
    fn seed_region_matches_centered_square() {
        let seed = seed_region(1024, 1024, 768).unwrap();
        assert_eq!(seed.top_left(), (128, 128));
        assert_eq!(seed.bottom_right(), (896, 896));
    }

    #[test]
    fn seed_region_is_clamped_to_image() {
        let seed = seed_region(100, 60, 200).unwrap();
        assert_eq!(seed.top_left(), (0, 0));
        assert_eq!(seed.bottom_right(), (99, 59));
        assert!(seed_region(0, 10, 4).is_err());
    }

    #[test]
    fn diagonal_finds_square_corners() {
        let buf = square_on_black(200, 20, 180);
        let seed = seed_region(200, 200, 120).unwrap();
        let region = EdgeStrategy::Diagonal
            .detect(&buf, Rgb([128, 128, 128]), seed, 10)
            .unwrap();
        assert_eq!(region.top_left(), (20, 20));
        assert_eq!(region.bottom_right(), (180, 180));
    }

    #[test]
    fn axis_cross_finds_square_edges() {
        let buf = square_on_black(200, 20, 180);
        let seed = seed_region(200, 200, 120).unwrap();
        let region = EdgeStrategy::AxisCross
            .detect(&buf, Rgb([128, 128, 128]), seed, 10)
            .unwrap();
        assert_eq!(region.top_left(), (20, 20));
        assert_eq!(region.bottom_right(), (180, 180));
    }

    #[test]
    fn uniform_image_falls_back_to_seed() {
        let buf = PixelBuffer::filled(64, 64, GRAY);
        let seed = seed_region(64, 64, 32).unwrap();
        for strategy in [EdgeStrategy::Diagonal, EdgeStrategy::AxisCross] {
            let region = strategy
                .detect(&buf, Rgb([128, 128, 128]), seed, 0)
                .unwrap();
            assert_eq!(region, seed, "{strategy:?}");
        }
    }

    #[test]
    fn axis_cross_stops_at_stray_pixel_on_scanned_row() {
        let mut buf = square_on_black(200, 20, 180);
        buf.set(100, 30, Rgba([255, 0, 0, 255])).unwrap();
        let seed = seed_region(200, 200, 120).unwrap();
        let region = EdgeStrategy::AxisCross
            .detect(&buf, Rgb([128, 128, 128]), seed, 10)
            .unwrap();
        assert_eq!(region.top_left(), (20, 31));
        assert_eq!(region.bottom_right(), (180, 180));
    }

    #[test]
    fn inverted_detection_returns_seed() {
        let buf = PixelBuffer::filled(9, 9, BLACK);
        let seed = seed_region(9, 9, 0).unwrap();
        for strategy in [EdgeStrategy::Diagonal, EdgeStrategy::AxisCross] {
            let region = strategy
                .detect(&buf, Rgb([255, 255, 255]), seed, 0)
                .unwrap();
            assert_eq!(region, seed, "{strategy:?}");
        }
    }

    #[test]
    fn detection_is_always_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let size = rng.gen_range(8..48);
            let mut buf = PixelBuffer::filled(size, size, GRAY);
            for _ in 0..rng.gen_range(0..40) {
                let (x, y) = (rng.gen_range(0..size), rng.gen_range(0..size));
                buf.set(x, y, Rgba([rng.gen(), rng.gen(), rng.gen(), 255]))
                    .unwrap();
            }
            let seed = seed_region(size, size, rng.gen_range(0..=size)).unwrap();
            let tolerance = rng.gen();
            for strategy in [EdgeStrategy::Diagonal, EdgeStrategy::AxisCross] {
                let region = strategy
                    .detect(&buf, Rgb([128, 128, 128]), seed, tolerance)
                    .unwrap();
                assert!(region.left() <= region.right());
                assert!(region.top() <= region.bottom());
                assert!(region.fits_within(size, size));
            }
        }
    }
}
