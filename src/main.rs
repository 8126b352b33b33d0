use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod analyze;
mod audio;
mod config;
mod report;

use config::AppConfig;
use report::Reporter;

#[derive(Parser)]
#[command(name = "voxfront")]
#[command(about = "VoxFront: 16kHz speech front-end with AGC and VAD", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List input devices
    List,
    /// Process live microphone input
    Run {
        #[arg(short, long)]
        input: Option<String>,
        /// Print every message as a JSON line
        #[arg(long)]
        json: bool,
        /// Also record the normalized stream to a WAV file
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
    /// Process a mono 16kHz WAV file
    Analyze {
        path: PathBuf,
        /// Write the normalized stream to a WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Samples per simulated host block
        #[arg(short, long)]
        block_size: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load();

    match cli.command {
        Commands::List => {
            println!("Input Devices:");
            for name in audio::input_device_names()? {
                println!("  - {}", name);
            }
        }
        Commands::Run {
            input,
            json,
            record,
        } => {
            let input = config.resolve_input(input.as_deref());
            run_live(&input, json || config.json_output, record)?;
            config.last_input = input;
            config.save();
        }
        Commands::Analyze {
            path,
            output,
            block_size,
            json,
        } => {
            let block_size = block_size.unwrap_or(config.block_size);
            let mut reporter = Reporter::new(std::io::stdout().lock(), json || config.json_output);
            if let Some(output) = output.as_deref() {
                reporter.record_to(output)?;
            }
            let summary = analyze::analyze_file(&path, block_size, &mut reporter)?;
            reporter.finish()?;

            // Summary goes to stderr so JSON output stays machine-readable
            eprintln!(
                "{} frames, {} transitions, noise floor {:.6}, {} trailing samples discarded",
                summary.frames, summary.transitions, summary.noise_floor, summary.discarded
            );
        }
    }

    Ok(())
}

fn run_live(input: &str, json: bool, record: Option<PathBuf>) -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded(256);
    let engine = audio::CaptureEngine::start(input, tx)?;

    let mut reporter = Reporter::new(std::io::stdout().lock(), json);
    if let Some(path) = record.as_deref() {
        reporter.record_to(path)?;
    }
    eprintln!("VoxFront active on '{}'. Press Ctrl+C to stop.", input);

    // Graceful shutdown handling
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })?;

    let mut last_level_log = Instant::now();
    while running.load(Ordering::Relaxed) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(message) => reporter.handle(&message)?,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }

        if last_level_log.elapsed() >= Duration::from_secs(1) {
            debug!(
                "Input RMS {:.5}, gain {:.2}",
                f32::from_bits(engine.volume_level.load(Ordering::Relaxed)),
                f32::from_bits(engine.gain_level.load(Ordering::Relaxed))
            );
            last_level_log = Instant::now();
        }
    }

    drop(engine);
    for message in rx.try_iter() {
        reporter.handle(&message)?;
    }
    let frames = reporter.pcm_frames();
    let transitions = reporter.transitions();
    reporter.finish()?;
    eprintln!(
        "\nVoxFront stopped after {} frames, {} transitions.",
        frames, transitions
    );
    Ok(())
}
