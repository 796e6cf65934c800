//! Dominant color sampling and tolerance-based color matching.

use image::{Pixel, Rgb};

use crate::buffer::{PixelBuffer, Region};
use crate::error::{Error, Result};

/// Number of leading channels compared and averaged. Alpha is never used.
const COLOR_CHANNELS: usize = 3;

/// The `size x size` square centered in a `width x height` image.
///
/// The top-left corner is `((width - size) / 2, (height - size) / 2)`.
///
/// # Errors
///
/// Returns [`Error::OutOfBounds`] if `size` exceeds either dimension and
/// [`Error::InvalidRegion`] if `size` is zero.
pub fn center_region(width: u32, height: u32, size: u32) -> Result<Region> {
    if size > width || size > height {
        return Err(Error::OutOfBounds {
            x: size,
            y: size,
            width,
            height,
        });
    }
    Region::from_origin_size((width - size) / 2, (height - size) / 2, size, size)
}

/// Mean R, G and B over every pixel of `region`, truncated toward zero.
///
/// # Errors
///
/// Returns [`Error::OutOfBounds`] if the region is not fully inside the image.
pub fn dominant_color(buffer: &PixelBuffer, region: Region) -> Result<Rgb<u8>> {
    let mut sums = [0u64; COLOR_CHANNELS];
    let mut count = 0u64;
    for px in buffer.region_pixels(region)? {
        for (sum, &value) in sums.iter_mut().zip(px.channels()) {
            *sum += u64::from(value);
        }
        count += 1;
    }

    // A region always holds at least one pixel, so `count` is non-zero.
    let mean = |sum: u64| -> u8 { u8::try_from(sum / count).unwrap_or(u8::MAX) };
    Ok(Rgb([mean(sums[0]), mean(sums[1]), mean(sums[2])]))
}

/// Whether two colors match within `tolerance` on every one of R, G and B.
///
/// Each channel is compared on its own; there is no combined distance. Any
/// alpha channel is ignored, so an RGBA pixel can be compared directly with
/// an RGB reference color.
#[must_use]
pub fn is_similar<P, Q>(a: &P, b: &Q, tolerance: u8) -> bool
where
    P: Pixel<Subpixel = u8>,
    Q: Pixel<Subpixel = u8>,
{
    a.channels()
        .iter()
        .zip(b.channels())
        .take(COLOR_CHANNELS)
        .all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn center_region_is_centered() {
        let r = center_region(1024, 1024, 768).unwrap();
        assert_eq!(r.top_left(), (128, 128));
        assert_eq!(r.bottom_right(), (895, 895));
        assert_eq!(r.width(), 768);

        let odd = center_region(11, 7, 3).unwrap();
        assert_eq!(odd.top_left(), (4, 2));
    }

    #[test]
    fn center_region_rejects_oversized_square() {
        assert!(matches!(
            center_region(512, 512, 768),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(center_region(512, 512, 0).is_err());
    }

    #[test]
    fn dominant_color_of_uniform_region_is_exact() {
        let buf = PixelBuffer::filled(32, 32, Rgba([17, 201, 90, 255]));
        let region = center_region(32, 32, 16).unwrap();
        assert_eq!(dominant_color(&buf, region).unwrap(), Rgb([17, 201, 90]));
    }

    #[test]
    fn dominant_color_truncates_and_ignores_alpha() {
        let mut buf = PixelBuffer::filled(2, 1, Rgba([10, 0, 255, 0]));
        buf.set(1, 0, Rgba([11, 3, 254, 255])).unwrap();
        let region = Region::new((0, 0), (1, 0)).unwrap();
        // (10 + 11) / 2 = 10.5, (0 + 3) / 2 = 1.5, (255 + 254) / 2 = 254.5
        assert_eq!(dominant_color(&buf, region).unwrap(), Rgb([10, 1, 254]));
    }

    #[test]
    fn dominant_color_rejects_region_outside_image() {
        let buf = PixelBuffer::filled(4, 4, Rgba([0, 0, 0, 255]));
        let region = Region::new((2, 2), (4, 4)).unwrap();
        assert!(dominant_color(&buf, region).is_err());
    }

    #[test]
    fn is_similar_is_reflexive_at_zero_tolerance() {
        for c in [Rgb([0, 0, 0]), Rgb([255, 255, 255]), Rgb([12, 200, 99])] {
            assert!(is_similar(&c, &c, 0));
        }
    }

    #[test]
    fn is_similar_is_symmetric() {
        let colors = [
            Rgb([0u8, 0, 0]),
            Rgb([128, 128, 128]),
            Rgb([140, 120, 128]),
            Rgb([255, 0, 255]),
        ];
        for a in &colors {
            for b in &colors {
                for t in [0, 5, 10, 12, 50, 255] {
                    assert_eq!(is_similar(a, b, t), is_similar(b, a, t));
                }
            }
        }
    }

    #[test]
    fn is_similar_checks_each_channel_on_its_own() {
        let base = Rgb([100, 100, 100]);
        // Every channel off by exactly the tolerance still matches.
        assert!(is_similar(&base, &Rgb([110, 90, 110]), 10));
        // One channel over the tolerance is enough to fail.
        assert!(!is_similar(&base, &Rgb([100, 100, 111]), 10));
    }

    #[test]
    fn is_similar_ignores_alpha() {
        let opaque = Rgba([50, 60, 70, 255]);
        let clear = Rgba([50, 60, 70, 0]);
        assert!(is_similar(&opaque, &clear, 0));
        assert!(is_similar(&opaque, &Rgb([50, 60, 70]), 0));
    }
}
