//! Batch picture framing and inner-canvas removal.
//!
//! Three file-to-file workflows share one bounds-checked pixel buffer:
//!
//! - **Canvas removal**: sample the dominant color at the center of a
//!   fixed-size frame image, search outward for where that color stops, and
//!   make the enclosed canvas transparent.
//! - **Frame compositing**: fit a picture into the transparent opening of a
//!   decorative frame.
//! - **Border painting**: surround a picture with a randomized brown border.
//!
//! # Quick Start
//!
//! ```no_run
//! use canvas_framer::{remove_canvas, CanvasOptions, OutputFormat, PixelBuffer};
//!
//! let mut frame = PixelBuffer::load("frame.png".as_ref()).expect("failed to load");
//! let found = remove_canvas(&mut frame, &CanvasOptions::default()).expect("wrong size");
//! println!("canvas at {}", found.region);
//! frame.save("frame_clear.png".as_ref(), OutputFormat::Png).unwrap();
//! ```
//!
//! # Edge strategies
//!
//! [`EdgeStrategy::Diagonal`] walks rays from the seed's corners;
//! [`EdgeStrategy::AxisCross`] scans whole rows and columns, so any stray
//! pixel on a scanned line ends the search.
//!
//! ```no_run
//! use canvas_framer::{detect_canvas, CanvasOptions, EdgeStrategy, PixelBuffer};
//!
//! let frame = PixelBuffer::load("frame.png".as_ref()).unwrap();
//! let opts = CanvasOptions {
//!     strategy: EdgeStrategy::AxisCross,
//!     tolerance: 20,
//!     ..CanvasOptions::default()
//! };
//! let found = detect_canvas(&frame, &opts).unwrap();
//! println!("dominant {:?}, canvas {}", found.dominant, found.region);
//! ```

#![deny(missing_docs)]

pub mod batch;
pub mod buffer;
mod canvas;
pub mod color;
pub mod detection;
pub mod error;
pub mod framing;
pub mod masking;

pub use batch::{BatchConfig, BatchRunner, ProcessResult, Workflow};
pub use buffer::{OutputFormat, PixelBuffer, Region};
pub use canvas::{detect_canvas, remove_canvas, CanvasDetection, CanvasOptions};
pub use detection::EdgeStrategy;
pub use error::{Error, Result};
