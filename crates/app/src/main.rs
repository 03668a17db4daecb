use std::f32::consts::TAU;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wavescope_core::{
    AudioContext, FrameScheduler, Oscilloscope, RecordingSurface, ScopeConfig, SourceHandle,
    WaveScopeError,
};

const SURFACE_WIDTH: f32 = 640.0;
const SURFACE_HEIGHT: f32 = 360.0;
const REFRESH_RATE: u32 = 60;

fn main() -> wavescope_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            frames,
            frequency,
            fft_size,
        } => run_demo(frames, frequency, fft_size),
        Commands::Export {
            output,
            frames,
            frequency,
            fft_size,
        } => run_export(&output, frames, frequency, fft_size),
    }
}

fn run_demo(frames: u32, frequency: f32, fft_size: usize) -> wavescope_core::Result<()> {
    tracing::info!(frames, frequency, fft_size, "starting scope demo");

    let (mut scope, source) = drive_scope(frames, frequency, fft_size)?;
    scope.disconnect(&source)?;
    scope.stop();

    tracing::info!(
        commands = scope.surface().commands().len(),
        running = scope.is_running(),
        "demo finished"
    );
    Ok(())
}

fn run_export(
    output: &PathBuf,
    frames: u32,
    frequency: f32,
    fft_size: usize,
) -> wavescope_core::Result<()> {
    if frames == 0 {
        return Err(WaveScopeError::msg("export requires at least one frame"));
    }
    tracing::info!(?output, frames, frequency, fft_size, "rendering for export");

    let (mut scope, _source) = drive_scope(frames, frequency, fft_size)?;
    scope.stop();

    let json = scope.surface().to_json()?;
    std::fs::write(output, &json)?;
    tracing::info!(bytes = json.len(), ?output, "draw command log written");
    Ok(())
}

/// Builds a scope over a recording surface, feeds it a stereo sine and runs
/// the cooperative render loop for `frames` granted refreshes.
fn drive_scope(
    frames: u32,
    frequency: f32,
    fft_size: usize,
) -> wavescope_core::Result<(Oscilloscope<RecordingSurface>, SourceHandle)> {
    let ctx = AudioContext::default();
    let config = ScopeConfig {
        fft_size,
        ..ScopeConfig::default()
    };
    let surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    let mut scope = Oscilloscope::new(surface, &ctx, config)?;

    let source = ctx.create_source(2);
    scope.connect(&source);

    let block_frames = (ctx.sample_rate() / REFRESH_RATE) as usize;
    let mut synth = SineSource::new(frequency, ctx.sample_rate());
    let mut scheduler = HostScheduler::default();

    scope.start(&mut scheduler);
    let mut rendered = 0;
    while rendered < frames {
        let block = synth.next_block(block_frames);
        scope.push_block(&source, block);
        if scheduler.take() {
            scope.frame(&mut scheduler);
            rendered += 1;
        }
    }

    tracing::debug!(rendered, "render loop drained");
    Ok((scope, source))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Pending-flag frame scheduler: the demo loop grants at most one frame per
/// synthesized block, standing in for a display refresh callback.
#[derive(Default)]
struct HostScheduler {
    pending: bool,
}

impl HostScheduler {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for HostScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
    }
}

/// Stereo sine producer feeding the scope one refresh worth of audio at a
/// time.
struct SineSource {
    frequency: f32,
    sample_rate: f32,
    phase: f32,
    block: Vec<f32>,
}

impl SineSource {
    fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            sample_rate: sample_rate.max(1) as f32,
            phase: 0.0,
            block: Vec::new(),
        }
    }

    fn next_block(&mut self, frames: usize) -> &[f32] {
        self.block.clear();
        self.block.reserve(frames * 2);
        for _ in 0..frames {
            let value = (self.phase * TAU).sin();
            self.phase = (self.phase + self.frequency / self.sample_rate).fract();
            self.block.push(value);
            self.block.push(value);
        }
        &self.block
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless demo driver for the WaveScope widget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the scope over a synthesized sine wave and report statistics.
    Demo {
        /// Number of display frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: u32,
        /// Sine frequency in Hz.
        #[arg(long, default_value_t = 440.0)]
        frequency: f32,
        /// Snapshot size forwarded to the analyser.
        #[arg(long, default_value_t = 4096)]
        fft_size: usize,
    },
    /// Render frames headlessly and write the draw-command log as JSON.
    Export {
        /// Output path for the recorded draw commands.
        output: PathBuf,
        /// Number of display frames to simulate before exporting.
        #[arg(short, long, default_value_t = 1)]
        frames: u32,
        /// Sine frequency in Hz.
        #[arg(long, default_value_t = 440.0)]
        frequency: f32,
        /// Snapshot size forwarded to the analyser.
        #[arg(long, default_value_t = 4096)]
        fft_size: usize,
    },
}
