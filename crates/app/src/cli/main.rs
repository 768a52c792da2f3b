//! Contour CLI Application

use anyhow::Context;
use clap::{Parser, Subcommand};
use contour_core::domain::audio::{ChannelCount, SampleRate, StreamConfig};
use contour_core::domain::config::{EqConfig, PresetManager};
use contour_core::domain::filter::MonoChain;
use contour_core::domain::response::{response_frequencies, sample_response_db};
use contour_infra::audio::{EqBridge, EqEngine, EqStream, PresetWatcher};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "contour")]
#[command(about = "A 3-band real-time parametric equalizer", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the equalizer live between the input and output devices
    Run {
        /// Preset file to load at startup
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Reload the preset file whenever it changes on disk
        #[arg(long)]
        watch: bool,
    },

    /// Print the frequency response of a parameter set
    Response {
        /// Preset file to evaluate (defaults otherwise)
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Number of points on the logarithmic frequency axis
        #[arg(long, default_value_t = 64)]
        points: usize,

        /// Emit machine-readable JSON instead of a curve
        #[arg(long)]
        json: bool,
    },

    /// List presets in a directory
    Presets {
        /// Directory holding .toml preset files
        dir: PathBuf,
    },
}

#[derive(Serialize)]
struct ResponseExport {
    sample_rate_hz: u32,
    frequencies_hz: Vec<f64>,
    magnitudes_db: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Command::Run { preset, watch } => run(preset, watch),
        Command::Response {
            preset,
            points,
            json,
        } => response(preset, points, json),
        Command::Presets { dir } => presets(dir),
    }
}

fn load_config(preset: Option<&PathBuf>) -> anyhow::Result<EqConfig> {
    match preset {
        Some(path) => EqConfig::load_from_file(path)
            .with_context(|| format!("loading preset {}", path.display())),
        None => Ok(EqConfig::default()),
    }
}

fn run(preset: Option<PathBuf>, watch: bool) -> anyhow::Result<()> {
    let config = load_config(preset.as_ref())?;
    let sample_rate = SampleRate::from_hz(config.app.sample_rate);

    let (bridge, updates) = EqBridge::with_params(config.eq, sample_rate.hz() as f32)
        .context("preset parameters rejected")?;
    let engine = EqEngine::new(sample_rate, ChannelCount::Stereo.count() as usize, updates);

    let stream_config = StreamConfig {
        sample_rate,
        channels: ChannelCount::Stereo,
        buffer_size: config.app.buffer_size,
    };
    let _stream = EqStream::duplex(
        config.app.input_device.as_deref(),
        config.app.output_device.as_deref(),
        &stream_config,
        engine,
    )
    .context("starting audio stream")?;

    let watcher = match (&preset, watch) {
        (Some(path), true) => Some(PresetWatcher::watch(path).context("watching preset file")?),
        _ => None,
    };

    tracing::info!("Equalizer running, press Ctrl-C to stop");

    // Control loop at roughly UI refresh rate: consume the dirty flag,
    // pick up preset file changes.
    loop {
        if let Some(watcher) = &watcher {
            if let Some(changed) = watcher.try_change() {
                match EqConfig::load_from_file(&changed) {
                    Ok(reloaded) => {
                        if let Err(e) = bridge.set_params(reloaded.eq) {
                            tracing::warn!("Reloaded preset rejected: {}", e);
                        } else {
                            tracing::info!(path = %changed.display(), "Preset reloaded");
                        }
                    }
                    Err(e) => tracing::warn!("Failed to reload preset: {}", e),
                }
            }
        }

        if let Err(e) = bridge.tick() {
            tracing::warn!("Coefficient design failed: {}", e);
        }

        std::thread::sleep(Duration::from_millis(16));
    }
}

fn response(preset: Option<PathBuf>, points: usize, json: bool) -> anyhow::Result<()> {
    let config = load_config(preset.as_ref())?;
    let sample_rate_hz = config.app.sample_rate as f64;

    let mut chain = MonoChain::new();
    contour_core::domain::update::update_chains(
        &config.eq,
        config.app.sample_rate as f32,
        [&mut chain],
    )
    .context("designing coefficients")?;

    let frequencies = response_frequencies(points);
    let magnitudes = sample_response_db(&chain, sample_rate_hz, points);

    if json {
        let export = ResponseExport {
            sample_rate_hz: config.app.sample_rate,
            frequencies_hz: frequencies,
            magnitudes_db: magnitudes,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    // Text curve: one row per point, bar scaled over +/- 27 dB like the
    // usual response display range.
    const RANGE_DB: f64 = 27.0;
    const WIDTH: usize = 41;
    for (freq, db) in frequencies.iter().zip(magnitudes.iter()) {
        let clamped = db.clamp(-RANGE_DB, RANGE_DB);
        let column = ((clamped + RANGE_DB) / (2.0 * RANGE_DB) * (WIDTH - 1) as f64).round() as usize;
        let mut bar = vec![' '; WIDTH];
        bar[WIDTH / 2] = '|';
        bar[column] = '*';
        let bar: String = bar.into_iter().collect();
        println!("{:>8.1} Hz {} {:+6.2} dB", freq, bar, db);
    }

    Ok(())
}

fn presets(dir: PathBuf) -> anyhow::Result<()> {
    let manager = PresetManager::new(dir);
    let names = manager.list_presets().context("listing presets")?;

    if names.is_empty() {
        println!("No presets found");
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }
    Ok(())
}
