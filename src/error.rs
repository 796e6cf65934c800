//! Error types for the canvas-framer crate.

use std::path::PathBuf;

/// Errors that can occur while framing pictures or removing canvases.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be read or is not a supported image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the file that failed to decode.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// The image does not have the configured square resolution.
    #[error("image size is {width}x{height}, not {expected}x{expected}")]
    ResolutionMismatch {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Expected edge length in pixels.
        expected: u32,
    },

    /// A pixel coordinate or region falls outside the image.
    #[error("({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        /// Offending x coordinate.
        x: u32,
        /// Offending y coordinate.
        y: u32,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A region was built with its corners in the wrong order.
    #[error("inverted region ({left}, {top})-({right}, {bottom})")]
    InvalidRegion {
        /// Left edge.
        left: u32,
        /// Top edge.
        top: u32,
        /// Right edge.
        right: u32,
        /// Bottom edge.
        bottom: u32,
    },

    /// Encoding or writing the output image failed.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },

    /// The frame image has no fully transparent pixel to fit a picture into.
    #[error("frame has no transparent opening")]
    NoOpening,

    /// The frames directory contains no usable frame image.
    #[error("no frame images found in {}", .0.display())]
    NoFrames(PathBuf),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (resize, convert).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
