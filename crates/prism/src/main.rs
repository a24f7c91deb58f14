//! Prism - audio-reactive shape projection editor
//!
//! Headless runner: loads settings, drives the frame loop at a fixed cadence,
//! replays recorded input through the editor and dumps the composed output.

#![warn(missing_docs)]

mod actions;
mod config;
mod logging_setup;
mod microphone;
mod replay;

use actions::Session;
use anyhow::{Context, Result};
use clap::Parser;
use logging_setup::Verbosity;
use microphone::PcmFileMicrophone;
use prism_control::KeyBindings;
use prism_core::settings::AudioMode;
use prism_core::{AudioFeed, Editor, NoticeLevel, Overlay, RenderFrame, SimulatedAudio};
use replay::Replay;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "Audio-reactive shape projection editor")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 300)]
    frames: u64,

    /// Frame rate of the loop
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Sleep between frames to hold the frame rate in real time
    #[arg(long)]
    realtime: bool,

    /// JSON list of input events to replay
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Key bindings file (JSON); defaults are used when absent
    #[arg(long)]
    bindings: Option<PathBuf>,

    /// Seed for the simulated audio feed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final frame and overlay as JSON ("-" for stdout)
    #[arg(short, long)]
    dump: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Serialize)]
struct FrameDump<'a> {
    frame: &'a RenderFrame,
    filter: String,
    overlay: Overlay,
    history_len: usize,
    scenes: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;
    let verbosity = Verbosity {
        verbose: args.verbose,
        quiet: args.quiet,
    };
    let _log_guard = logging_setup::init(&settings.log, verbosity)?;

    info!("Starting Prism v{}", env!("CARGO_PKG_VERSION"));

    let bindings = match &args.bindings {
        Some(path) => KeyBindings::load_from_file(path)
            .with_context(|| format!("Failed to load key bindings: {:?}", path))?,
        None => KeyBindings::new(),
    };
    let mut session = Session::new(Editor::new(&settings)).with_bindings(bindings);

    let mut audio = match args.seed {
        Some(seed) => AudioFeed::new(Box::new(SimulatedAudio::with_seed(
            settings.audio.poll_interval_ms,
            seed,
        ))),
        None => AudioFeed::from_settings(&settings.audio),
    };
    let mut live_audio = false;
    if settings.audio.mode == AudioMode::Analyzer {
        match &settings.audio.input {
            Some(path) => {
                let mut input = PcmFileMicrophone::new(path);
                live_audio = session
                    .editor
                    .connect_microphone(&mut audio, &mut input, &settings.audio);
            }
            None => warn!("Analyzer mode needs audio.input; using simulated levels"),
        }
    }
    info!("Audio source: {}", audio.source_name());

    let mut replay = match &args.replay {
        Some(path) => Replay::load(path)?,
        None => Replay::default(),
    };

    let fps = if args.fps > 0.0 { args.fps } else { 60.0 };
    let frame_ms = 1000.0 / fps;
    // Live input arrives in real time, so the frames have to as well
    let realtime = args.realtime || live_audio;
    let started = Instant::now();
    let mut last_frame = None;

    for frame_index in 0..args.frames {
        let time_ms = frame_index as f64 * frame_ms;

        for event in replay.due(time_ms) {
            session.handle(event);
        }

        let audio_frame = audio.tick(time_ms);
        let frame = session.editor.render(time_ms, audio_frame);
        debug!(
            "Frame {} at {:.1}ms: {} ops, levels {:?}",
            frame_index,
            time_ms,
            frame.ops.len(),
            frame.levels
        );

        for notice in session.editor.drain_notices() {
            match notice.level {
                NoticeLevel::Info => info!("{}", notice.message),
                NoticeLevel::Warning => warn!("{}", notice.message),
                NoticeLevel::Error => error!("{}", notice.message),
            }
        }
        last_frame = Some(frame);

        if realtime {
            let target = Duration::from_secs_f64((frame_index + 1) as f64 * frame_ms / 1000.0);
            if let Some(remaining) = target.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    if replay.remaining() > 0 {
        warn!("{} replay events were past the last frame", replay.remaining());
    }
    info!(
        "Ran {} frames: {} layers, {} history entries",
        args.frames,
        session.editor.state().layers.len(),
        session.editor.history().len()
    );

    if let (Some(path), Some(frame)) = (&args.dump, &last_frame) {
        let dump = FrameDump {
            frame,
            filter: frame.filter(),
            overlay: session.interaction.overlay(&session.editor),
            history_len: session.editor.history().len(),
            scenes: session.editor.scenes().len(),
        };
        let json = serde_json::to_string_pretty(&dump)?;
        if path.as_os_str() == "-" {
            println!("{}", json);
        } else {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write frame dump: {:?}", path))?;
            info!("Frame dump written to {:?}", path);
        }
    }

    Ok(())
}
