//! Directory batch processing with sequentially numbered outputs.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::buffer::{save_image, OutputFormat, PixelBuffer, Region};
use crate::canvas::{remove_canvas, CanvasOptions};
use crate::error::{Error, Result};
use crate::framing::{compose_in_frame, paint_border, BorderOptions, FrameOptions};

/// Default JPEG quality for framed outputs.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Which transform a batch applies to each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workflow {
    /// Detect the inner canvas of fixed-size PNG frames and make it transparent.
    RemoveCanvas(CanvasOptions),
    /// Place each picture into a randomly chosen frame from `frames_dir`.
    Frame {
        /// Directory of frame images with a transparent opening.
        frames_dir: PathBuf,
        /// Compositing options.
        options: FrameOptions,
        /// JPEG quality of the output.
        quality: u8,
    },
    /// Surround each picture with a randomized brown border.
    Border {
        /// Border options.
        options: BorderOptions,
        /// JPEG quality of the output.
        quality: u8,
    },
}

impl Workflow {
    /// Whether `path` is an input this workflow processes.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            Self::RemoveCanvas(_) => has_extension(path, &["png"]),
            Self::Frame { .. } | Self::Border { .. } => is_supported_image(path),
        }
    }

    /// Encoding of the files this workflow writes.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        match self {
            Self::RemoveCanvas(_) => OutputFormat::Png,
            Self::Frame { quality, .. } | Self::Border { quality, .. } => {
                OutputFormat::Jpeg { quality: *quality }
            }
        }
    }

    /// Whether an input that produced no output still uses up a number.
    ///
    /// Canvas removal numbers outputs by input position, so skipped files
    /// leave gaps; the framing workflows number only written files.
    #[must_use]
    pub fn numbers_every_input(&self) -> bool {
        matches!(self, Self::RemoveCanvas(_))
    }

    /// Output file prefix used when none is configured.
    #[must_use]
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Self::RemoveCanvas(_) => "GenericFrame",
            Self::Frame { .. } => "UnusedEdtitiesFramed",
            Self::Border { .. } => "RetroGames",
        }
    }

    /// First output number used when none is configured.
    #[must_use]
    pub fn default_start_counter(&self) -> u32 {
        match self {
            Self::RemoveCanvas(_) | Self::Frame { .. } => 1,
            Self::Border { .. } => 1000,
        }
    }

    /// Check every option of the workflow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::RemoveCanvas(opts) => opts.validate(),
            Self::Frame {
                options, quality, ..
            } => {
                if options.output_width == 0 {
                    return Err(Error::InvalidConfig(
                        "output width must be positive".to_string(),
                    ));
                }
                validate_quality(*quality)
            }
            Self::Border { options, quality } => {
                options.validate()?;
                validate_quality(*quality)
            }
        }
    }
}

fn validate_quality(quality: u8) -> Result<()> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "JPEG quality {quality} is outside 1-100"
        )))
    }
}

/// Where a batch reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory scanned for inputs (not recursive).
    pub input_dir: PathBuf,
    /// Directory receiving numbered outputs; created if missing.
    pub output_dir: PathBuf,
    /// Output names are `{prefix}_{NNN}.{ext}`.
    pub prefix: String,
    /// Number given to the first output.
    pub start_counter: u32,
    /// Seed for frame selection and border shading; random when `None`.
    pub seed: Option<u64>,
}

impl BatchConfig {
    /// A config using the workflow's default prefix and starting number.
    #[must_use]
    pub fn for_workflow(workflow: &Workflow, input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            prefix: workflow.default_prefix().to_string(),
            start_counter: workflow.default_start_counter(),
            seed: None,
        }
    }
}

/// Result of processing a single input file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Path written, if any.
    pub output: Option<PathBuf>,
    /// Whether processing succeeded (skips count as success).
    pub success: bool,
    /// Whether the file was skipped (wrong resolution).
    pub skipped: bool,
    /// Detected canvas, for canvas removal.
    pub region: Option<Region>,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output: None,
            success: false,
            skipped: false,
            region: None,
            message: String::new(),
        }
    }
}

/// Runs one workflow over every accepted file of a directory.
///
/// Files are visited in name order. A failing file is reported in its
/// [`ProcessResult`] and never stops the batch.
pub struct BatchRunner {
    config: BatchConfig,
    workflow: Workflow,
    rng: StdRng,
    counter: u32,
}

impl BatchRunner {
    /// Create a runner; the output counter starts at `config.start_counter`.
    #[must_use]
    pub fn new(config: BatchConfig, workflow: Workflow) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let counter = config.start_counter;
        Self {
            config,
            workflow,
            rng,
            counter,
        }
    }

    /// The number the next output will get.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Process every accepted file in the input directory.
    ///
    /// # Errors
    ///
    /// Fails for the whole run only when the configuration is invalid, a
    /// directory cannot be read, the output directory cannot be created, or
    /// the frame workflow finds no frames.
    pub fn run(&mut self) -> Result<Vec<ProcessResult>> {
        self.workflow.validate()?;

        let inputs = list_images(&self.config.input_dir, |p| self.workflow.accepts(p))?;
        let frames = match &self.workflow {
            Workflow::Frame { frames_dir, .. } => {
                let frames = list_images(frames_dir, is_supported_image)?;
                if frames.is_empty() {
                    return Err(Error::NoFrames(frames_dir.clone()));
                }
                frames
            }
            _ => Vec::new(),
        };

        std::fs::create_dir_all(&self.config.output_dir)?;
        info!(
            inputs = inputs.len(),
            output = %self.config.output_dir.display(),
            "starting batch"
        );

        let mut results = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let output = self.config.output_dir.join(output_file_name(
                &self.config.prefix,
                self.counter,
                self.workflow.output_format().extension(),
            ));
            let result = self.process_file(input, &output, &frames);
            log_outcome(&result);
            if result.output.is_some() || self.workflow.numbers_every_input() {
                self.counter += 1;
            }
            results.push(result);
        }
        Ok(results)
    }

    /// Process one file into `output`.
    ///
    /// `frames` is the pool the frame workflow picks from; other workflows
    /// ignore it.
    #[must_use]
    pub fn process_file(&mut self, input: &Path, output: &Path, frames: &[PathBuf]) -> ProcessResult {
        let mut result = ProcessResult::new(input);
        debug!(input = %input.display(), "processing");

        let outcome = match &self.workflow {
            Workflow::RemoveCanvas(opts) => canvas_file(input, output, opts).map(|region| {
                result.region = Some(region);
                format!("canvas {region}")
            }),
            Workflow::Frame {
                options, quality, ..
            } => frame_file(input, output, frames, options, *quality, &mut self.rng),
            Workflow::Border { options, quality } => {
                border_file(input, output, options, *quality, &mut self.rng)
            }
        };

        match outcome {
            Ok(message) => {
                result.success = true;
                result.output = Some(output.to_path_buf());
                result.message = message;
            }
            Err(e @ Error::ResolutionMismatch { .. }) => {
                result.success = true;
                result.skipped = true;
                result.message = e.to_string();
            }
            Err(e) => {
                result.message = e.to_string();
            }
        }
        result
    }
}

fn log_outcome(result: &ProcessResult) {
    let file = display_name(&result.path);
    if result.skipped {
        info!(file = %file, reason = %result.message, "skipped");
    } else if let Some(output) = result.output.as_deref() {
        info!(file = %file, output = %display_name(output), detail = %result.message, "processed");
    } else {
        warn!(file = %file, error = %result.message, "failed");
    }
}

fn canvas_file(input: &Path, output: &Path, opts: &CanvasOptions) -> Result<Region> {
    let mut buffer = PixelBuffer::load(input)?;
    let found = remove_canvas(&mut buffer, opts)?;
    debug!(color = ?found.dominant.0, region = %found.region, "canvas removed");
    buffer.save(output, OutputFormat::Png)?;
    Ok(found.region)
}

fn frame_file(
    input: &Path,
    output: &Path,
    frames: &[PathBuf],
    options: &FrameOptions,
    quality: u8,
    rng: &mut StdRng,
) -> Result<String> {
    let picture = PixelBuffer::load(input)?;
    let frame_path = frames
        .choose(rng)
        .ok_or_else(|| Error::NoFrames(PathBuf::new()))?;
    let frame = PixelBuffer::load(frame_path)?;
    let framed = compose_in_frame(&picture, &frame, options)?;
    save_image(&framed, output, OutputFormat::Jpeg { quality })?;
    Ok(format!("frame: {}", display_name(frame_path)))
}

fn border_file(
    input: &Path,
    output: &Path,
    options: &BorderOptions,
    quality: u8,
    rng: &mut StdRng,
) -> Result<String> {
    let picture = PixelBuffer::load(input)?;
    let (w, h) = picture.dimensions();
    let framed = paint_border(&picture, options, rng)?;
    save_image(&framed, output, OutputFormat::Jpeg { quality })?;
    Ok(format!(
        "{}px border, {w}x{h}",
        options.border_width_for(w, h)
    ))
}

/// Accepted regular files of `dir`, sorted by path.
fn list_images<F>(dir: &Path, accept: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| accept(p))
        .collect();
    paths.sort();
    Ok(paths)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| ext.eq_ignore_ascii_case(x)))
}

/// Check if a file has a supported picture extension (PNG or JPEG).
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    has_extension(path, &["png", "jpg", "jpeg"])
}

/// `{prefix}_{counter:03}.{extension}`.
#[must_use]
pub fn output_file_name(prefix: &str, counter: u32, extension: &str) -> String {
    format!("{prefix}_{counter:03}.{extension}")
}

/// File name of `path` for log output, falling back to the full path.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
