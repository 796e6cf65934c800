//! Bounds-checked RGBA pixel buffer and rectangular regions.
//!
//! Every algorithm in this crate reads and writes pixels through
//! [`PixelBuffer`], which reports [`Error::OutOfBounds`] instead of panicking
//! when a coordinate falls outside the image.

use std::fs::File;
use std::path::Path;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageResult, RgbImage, Rgba, RgbaImage};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// An axis-aligned rectangle with inclusive corner coordinates.
///
/// A region always has `left <= right` and `top <= bottom`; it may shrink to a
/// single pixel but can never be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Region {
    /// Build a region from its inclusive top-left and bottom-right corners.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the corners are inverted on either axis.
    pub fn new(top_left: (u32, u32), bottom_right: (u32, u32)) -> Result<Self> {
        let (left, top) = top_left;
        let (right, bottom) = bottom_right;
        if left > right || top > bottom {
            return Err(Error::InvalidRegion {
                left,
                top,
                right,
                bottom,
            });
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Build a region from an origin and a non-zero size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if either dimension is zero.
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidRegion {
                left: x,
                top: y,
                right: x,
                bottom: y,
            });
        }
        Self::new((x, y), (x + width - 1, y + height - 1))
    }

    /// Leftmost column.
    #[must_use]
    pub fn left(&self) -> u32 {
        self.left
    }

    /// Topmost row.
    #[must_use]
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Rightmost column (inclusive).
    #[must_use]
    pub fn right(&self) -> u32 {
        self.right
    }

    /// Bottom row (inclusive).
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    /// `(left, top)`.
    #[must_use]
    pub fn top_left(&self) -> (u32, u32) {
        (self.left, self.top)
    }

    /// `(right, bottom)`.
    #[must_use]
    pub fn bottom_right(&self) -> (u32, u32) {
        (self.right, self.bottom)
    }

    /// Number of columns covered.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Number of rows covered.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Whether `(x, y)` lies inside the region.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }

    /// Whether the whole region lies inside a `width x height` image.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right < width && self.bottom < height
    }

    /// Shrink the region so it lies inside a `width x height` image.
    ///
    /// Returns `None` if the image is empty or the region lies entirely
    /// outside it.
    #[must_use]
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || self.left >= width || self.top >= height {
            return None;
        }
        Some(Self {
            left: self.left,
            top: self.top,
            right: self.right.min(width - 1),
            bottom: self.bottom.min(height - 1),
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Encoding used when writing an image to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG, alpha preserved.
    Png,
    /// Baseline JPEG at the given quality (1-100). Alpha is discarded.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
}

impl OutputFormat {
    /// File extension used for numbered output names.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// An in-memory RGBA raster with bounds-checked pixel access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Decode an image file into an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file cannot be read or is not a
    /// supported image format.
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            image: image.to_rgba8(),
        })
    }

    /// Wrap an existing RGBA image.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// A `width x height` buffer where every pixel is `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
        }
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The region covering the whole image, or `None` for an empty image.
    #[must_use]
    pub fn bounds(&self) -> Option<Region> {
        Region::from_origin_size(0, 0, self.width(), self.height()).ok()
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the buffer and return the underlying image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn check(&self, x: u32, y: u32) -> Result<()> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    fn check_region(&self, region: Region) -> Result<()> {
        self.check(region.left(), region.top())?;
        self.check(region.right(), region.bottom())
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the coordinate is outside the image.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        self.check(x, y)?;
        Ok(*self.image.get_pixel(x, y))
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the coordinate is outside the image.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba<u8>) -> Result<()> {
        self.check(x, y)?;
        self.image.put_pixel(x, y, color);
        Ok(())
    }

    /// Copy the pixels of `region` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the region exceeds the image.
    pub fn crop(&self, region: Region) -> Result<Self> {
        self.check_region(region)?;
        let view = image::imageops::crop_imm(
            &self.image,
            region.left(),
            region.top(),
            region.width(),
            region.height(),
        );
        Ok(Self {
            image: view.to_image(),
        })
    }

    /// Iterate the pixels of `region` in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the region exceeds the image.
    pub fn region_pixels(&self, region: Region) -> Result<impl Iterator<Item = &Rgba<u8>> + '_> {
        self.check_region(region)?;
        Ok((region.top()..=region.bottom()).flat_map(move |y| {
            (region.left()..=region.right()).map(move |x| self.image.get_pixel(x, y))
        }))
    }

    /// Paint every pixel of `region`, clamped to the image, with `color`.
    ///
    /// Returns the clamped region, or `None` if it lies entirely outside.
    pub(crate) fn fill_clamped(&mut self, region: Region, color: Rgba<u8>) -> Option<Region> {
        let region = region.clamp_to(self.width(), self.height())?;
        for y in region.top()..=region.bottom() {
            for x in region.left()..=region.right() {
                self.image.put_pixel(x, y, color);
            }
        }
        Some(region)
    }

    /// Encode the buffer and write it to `path`.
    ///
    /// The image is written to a temporary file next to `path` and renamed
    /// into place, so an interrupted run never leaves a truncated output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if encoding fails or [`Error::Io`] if the file
    /// cannot be created or renamed.
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        write_atomically(path, |file| match format {
            OutputFormat::Png => self.image.write_to(file, ImageFormat::Png),
            OutputFormat::Jpeg { quality } => {
                let rgb: RgbImage = self.image.convert();
                JpegEncoder::new_with_quality(file, quality).encode_image(&rgb)
            }
        })
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::from_image(image)
    }
}

/// Save an RGB image with the given encoding, atomically.
///
/// # Errors
///
/// Returns [`Error::Encode`] if encoding fails or [`Error::Io`] if writing fails.
pub fn save_image(img: &RgbImage, path: &Path, format: OutputFormat) -> Result<()> {
    write_atomically(path, |file| match format {
        OutputFormat::Png => img.write_to(file, ImageFormat::Png),
        OutputFormat::Jpeg { quality } => {
            JpegEncoder::new_with_quality(file, quality).encode_image(img)
        }
    })
}

fn write_atomically<F>(path: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut File) -> ImageResult<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    encode(tmp.as_file_mut()).map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_rejects_inverted_corners() {
        assert!(Region::new((5, 5), (4, 10)).is_err());
        assert!(Region::new((5, 5), (10, 4)).is_err());
        let single = Region::new((3, 3), (3, 3)).unwrap();
        assert_eq!(single.width(), 1);
        assert_eq!(single.height(), 1);
    }

    #[test]
    fn region_clamps_to_image() {
        let r = Region::new((10, 10), (200, 50)).unwrap();
        let clamped = r.clamp_to(100, 100).unwrap();
        assert_eq!(clamped.bottom_right(), (99, 50));
        assert!(Region::new((150, 0), (160, 5)).unwrap().clamp_to(100, 100).is_none());
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut buf = PixelBuffer::filled(4, 3, Rgba([1, 2, 3, 255]));
        assert_eq!(buf.get(3, 2).unwrap(), Rgba([1, 2, 3, 255]));
        assert!(matches!(buf.get(4, 0), Err(Error::OutOfBounds { x: 4, .. })));
        assert!(buf.set(0, 3, Rgba([0, 0, 0, 0])).is_err());

        buf.set(1, 1, Rgba([9, 9, 9, 9])).unwrap();
        assert_eq!(buf.get(1, 1).unwrap(), Rgba([9, 9, 9, 9]));
    }

    #[test]
    fn crop_copies_region_pixels() {
        let mut buf = PixelBuffer::filled(10, 10, Rgba([0, 0, 0, 255]));
        buf.set(4, 5, Rgba([255, 0, 0, 255])).unwrap();

        let region = Region::new((3, 4), (6, 8)).unwrap();
        let cropped = buf.crop(region).unwrap();
        assert_eq!(cropped.dimensions(), (4, 5));
        assert_eq!(cropped.get(1, 1).unwrap(), Rgba([255, 0, 0, 255]));

        let too_big = Region::new((5, 5), (10, 9)).unwrap();
        assert!(buf.crop(too_big).is_err());
    }

    #[test]
    fn region_pixels_visits_every_pixel_once() {
        let buf = PixelBuffer::filled(8, 8, Rgba([7, 7, 7, 255]));
        let region = Region::new((2, 1), (4, 5)).unwrap();
        assert_eq!(buf.region_pixels(region).unwrap().count(), 15);
    }

    #[test]
    fn fill_clamped_stops_at_image_edge() {
        let mut buf = PixelBuffer::filled(5, 4, Rgba([1, 1, 1, 255]));
        let painted = buf
            .fill_clamped(Region::new((3, 2), (40, 40)).unwrap(), Rgba([9, 9, 9, 9]))
            .unwrap();
        assert_eq!(painted, Region::new((3, 2), (4, 3)).unwrap());
        assert_eq!(buf.get(4, 3).unwrap(), Rgba([9, 9, 9, 9]));
        assert_eq!(buf.get(2, 2).unwrap(), Rgba([1, 1, 1, 255]));

        let outside = Region::new((5, 0), (6, 1)).unwrap();
        assert!(buf.fill_clamped(outside, Rgba([0, 0, 0, 0])).is_none());
    }

    #[test]
    fn save_png_round_trips_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut buf = PixelBuffer::filled(6, 6, Rgba([10, 20, 30, 255]));
        buf.set(2, 2, Rgba([0, 0, 0, 0])).unwrap();
        buf.save(&path, OutputFormat::Png).unwrap();

        let loaded = PixelBuffer::load(&path).unwrap();
        assert_eq!(loaded, buf);
        // Only the final file remains, no temporaries.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_reports_decode_error_for_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            PixelBuffer::load(&path),
            Err(Error::Decode { .. })
        ));
    }
}
