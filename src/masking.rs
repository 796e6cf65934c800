//! Clearing a detected region to full transparency.

use image::Rgba;
use tracing::debug;

use crate::buffer::{PixelBuffer, Region};

/// The value written to every masked pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Set every pixel inside `region` (inclusive, clamped to the image) to
/// [`TRANSPARENT`].
///
/// Applying the same region twice leaves the buffer unchanged the second time.
/// A region entirely outside the image is a no-op.
pub fn apply_transparency(buffer: &mut PixelBuffer, region: Region) -> &mut PixelBuffer {
    if let Some(masked) = buffer.fill_clamped(region, TRANSPARENT) {
        debug!(region = %masked, "masked");
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_inclusive_region_only() {
        let mut buf = PixelBuffer::filled(10, 10, Rgba([200, 100, 50, 255]));
        let region = Region::new((2, 3), (5, 6)).unwrap();
        apply_transparency(&mut buf, region);

        for y in 0..10 {
            for x in 0..10 {
                let px = buf.get(x, y).unwrap();
                if region.contains(x, y) {
                    assert_eq!(px, TRANSPARENT, "({x}, {y}) should be cleared");
                } else {
                    assert_eq!(px, Rgba([200, 100, 50, 255]), "({x}, {y}) untouched");
                }
            }
        }
    }

    #[test]
    fn masking_is_idempotent() {
        let mut once = PixelBuffer::filled(16, 16, Rgba([1, 2, 3, 255]));
        once.set(4, 4, Rgba([9, 8, 7, 100])).unwrap();
        let region = Region::new((3, 3), (12, 9)).unwrap();

        apply_transparency(&mut once, region);
        let mut twice = once.clone();
        apply_transparency(&mut twice, region);
        assert_eq!(once, twice);
    }

    #[test]
    fn region_past_the_edge_is_clamped() {
        let mut buf = PixelBuffer::filled(4, 4, Rgba([255, 255, 255, 255]));
        let region = Region::new((2, 2), (50, 50)).unwrap();
        apply_transparency(&mut buf, region);
        assert_eq!(buf.get(3, 3).unwrap(), TRANSPARENT);
        assert_eq!(buf.get(1, 1).unwrap(), Rgba([255, 255, 255, 255]));

        let outside = Region::new((10, 10), (12, 12)).unwrap();
        let before = buf.clone();
        apply_transparency(&mut buf, outside);
        assert_eq!(buf, before);
    }
}
