use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canvas_framer::batch::{display_name, DEFAULT_JPEG_QUALITY};
use canvas_framer::framing::{BorderOptions, FrameOptions};
use canvas_framer::{BatchConfig, BatchRunner, CanvasOptions, EdgeStrategy, ProcessResult, Workflow};

#[derive(Parser)]
#[command(
    name = "canvas-framer",
    about = "Frame pictures and remove inner canvases from frame images",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Make the uniformly colored inner canvas of PNG frames transparent
    RemoveCanvas {
        #[command(flatten)]
        io: IoArgs,

        /// Required width and height of every input image
        #[arg(long, default_value_t = 1024)]
        resolution: u32,

        /// Edge length of the central sampling square
        #[arg(long, default_value_t = 768)]
        center_size: u32,

        /// Maximum per-channel difference counted as canvas color
        #[arg(short, long, default_value_t = 50)]
        tolerance: u8,

        /// Edge search strategy
        #[arg(long, value_enum, default_value_t = EdgeStrategy::Diagonal)]
        strategy: EdgeStrategy,
    },
    /// Place each picture into a random frame with a transparent opening
    Frame {
        #[command(flatten)]
        io: IoArgs,

        /// Directory of frame images
        #[arg(long, default_value = "Frames")]
        frames: PathBuf,

        /// Width of the final image
        #[arg(long, default_value_t = 768)]
        width: u32,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        quality: u8,
    },
    /// Surround each picture with a randomized brown border
    Border {
        #[command(flatten)]
        io: IoArgs,

        /// Border width in pixels (default: 10 for pictures up to 512px, else 20)
        #[arg(long)]
        border: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        quality: u8,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input directory
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long, default_value = "Output")]
    output: PathBuf,

    /// Output file name prefix (default depends on the command)
    #[arg(long)]
    prefix: Option<String>,

    /// Number of the first output file (default depends on the command)
    #[arg(long)]
    start: Option<u32>,

    /// Seed for random frame and color choices
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing(verbose: bool, quiet: bool) {
    // Per-file outcomes are printed below, so library info events stay off
    // unless asked for.
    let default = if verbose {
        "canvas_framer=debug"
    } else if quiet {
        "canvas_framer=error"
    } else {
        "canvas_framer=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let (io, workflow) = match cli.command {
        Command::RemoveCanvas {
            io,
            resolution,
            center_size,
            tolerance,
            strategy,
        } => (
            io,
            Workflow::RemoveCanvas(CanvasOptions {
                expected_resolution: resolution,
                center_region_size: center_size,
                tolerance,
                strategy,
            }),
        ),
        Command::Frame {
            io,
            frames,
            width,
            quality,
        } => (
            io,
            Workflow::Frame {
                frames_dir: frames,
                options: FrameOptions {
                    output_width: width,
                },
                quality,
            },
        ),
        Command::Border {
            io,
            border,
            quality,
        } => (
            io,
            Workflow::Border {
                options: BorderOptions {
                    width: border,
                    ..BorderOptions::default()
                },
                quality,
            },
        ),
    };

    if !io.input.is_dir() {
        eprintln!(
            "Error: Input directory does not exist: {}",
            io.input.display()
        );
        process::exit(1);
    }

    let mut config = BatchConfig::for_workflow(&workflow, io.input, io.output);
    if let Some(prefix) = io.prefix {
        config.prefix = prefix;
    }
    if let Some(start) = io.start {
        config.start_counter = start;
    }
    config.seed = io.seed;

    if !cli.quiet {
        eprintln!(
            "************** canvas-framer v{} **************",
            env!("CARGO_PKG_VERSION")
        );
    }
    let started = Instant::now();

    let mut runner = BatchRunner::new(config, workflow);
    let results = match runner.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, cli.verbose, cli.quiet);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
        eprintln!(
            "Total execution time: {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
    }
}

fn print_result(result: &ProcessResult, verbose: bool, quiet: bool) {
    if quiet && result.success {
        return;
    }

    let filename = display_name(&result.path);

    if result.skipped {
        eprintln!("[SKIP] {filename}: {}", result.message);
    } else if let Some(output) = result.output.as_deref().filter(|_| result.success) {
        eprintln!("[OK] {filename} --> {}", display_name(output));
        if verbose && !result.message.is_empty() {
            eprintln!("  -> {}", result.message);
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}
