//! Audio level sources and the feed that polls them

use super::analyzer::{SpectrumAnalyzer, SpectrumAnalyzerConfig};
use super::{AudioFrame, AudioLevels, BandSplit};
use crate::media::DeviceError;
use crate::settings::{AudioMode, AudioSettings};
use crossbeam_channel::Receiver;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Number of bins in the simulated spectrum
const SIMULATED_BINS: usize = 64;
/// Number of samples in the simulated waveform
const SIMULATED_SAMPLES: usize = 256;

/// Capability interface for anything that yields audio frames
pub trait AudioLevelSource: Send {
    /// Human-readable name for logs and UI
    fn name(&self) -> &str;

    /// Advance to `time_ms`; returns a frame when new data is available
    fn poll(&mut self, time_ms: f64) -> Option<AudioFrame>;
}

/// Capability interface for microphone acquisition.
///
/// On success the device delivers sample blocks over the returned channel.
pub trait MicrophoneSource {
    /// Request access and start capture at `sample_rate`
    fn open(&mut self, sample_rate: u32) -> std::result::Result<Receiver<Vec<f32>>, DeviceError>;
}

/// Random levels on a fixed polling interval
pub struct SimulatedAudio {
    interval_ms: f64,
    last_update: Option<f64>,
    rng: StdRng,
    current: AudioFrame,
}

impl SimulatedAudio {
    /// Create a simulator that refreshes every `interval_ms`
    pub fn new(interval_ms: u64) -> Self {
        Self::with_rng(interval_ms, StdRng::seed_from_u64(rand::rng().random()))
    }

    /// Deterministic simulator for reproducible runs
    pub fn with_seed(interval_ms: u64, seed: u64) -> Self {
        Self::with_rng(interval_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(interval_ms: u64, rng: StdRng) -> Self {
        let levels = AudioLevels::new(50.0, 30.0, 70.0);
        let mut sim = Self {
            interval_ms: interval_ms.max(1) as f64,
            last_update: None,
            rng,
            current: AudioFrame::from_levels(levels),
        };
        sim.current = sim.synthesize(levels, 0.0);
        sim
    }

    /// Build spectrum and waveform buffers that agree with `levels`
    fn synthesize(&mut self, levels: AudioLevels, time_ms: f64) -> AudioFrame {
        let split = BandSplit::default();
        let [bass, mids, _] = split.ranges(SIMULATED_BINS);
        let spectrum = (0..SIMULATED_BINS)
            .map(|i| {
                let level = if bass.contains(&i) {
                    levels.bass
                } else if mids.contains(&i) {
                    levels.mids
                } else {
                    levels.highs
                };
                let jitter: f32 = self.rng.random_range(0.9..1.1);
                (level / 100.0 * jitter).clamp(0.0, 1.0)
            })
            .collect();

        let amplitude = levels.bass / 100.0;
        let phase = (time_ms * 0.001) as f32;
        let waveform = (0..SIMULATED_SAMPLES)
            .map(|i| {
                let t = i as f32 / SIMULATED_SAMPLES as f32;
                amplitude * (std::f32::consts::TAU * 4.0 * t + phase).sin()
            })
            .collect();

        AudioFrame {
            levels,
            spectrum,
            waveform,
        }
    }
}

impl AudioLevelSource for SimulatedAudio {
    fn name(&self) -> &str {
        "simulated"
    }

    fn poll(&mut self, time_ms: f64) -> Option<AudioFrame> {
        let due = match self.last_update {
            None => true,
            Some(last) => time_ms - last >= self.interval_ms,
        };
        if !due {
            return None;
        }
        self.last_update = Some(time_ms);
        let levels = AudioLevels::new(
            self.rng.random_range(0.0..100.0),
            self.rng.random_range(0.0..100.0),
            self.rng.random_range(0.0..100.0),
        );
        self.current = self.synthesize(levels, time_ms);
        Some(self.current.clone())
    }
}

/// Live analysis of sample blocks arriving over a channel
pub struct AnalyzerSource {
    analyzer: SpectrumAnalyzer,
    samples: Receiver<Vec<f32>>,
    name: String,
}

impl AnalyzerSource {
    /// Analyze blocks from `samples`
    pub fn new(samples: Receiver<Vec<f32>>, config: SpectrumAnalyzerConfig) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(config),
            samples,
            name: "microphone".to_string(),
        }
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl AudioLevelSource for AnalyzerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self, time_ms: f64) -> Option<AudioFrame> {
        let mut updated = false;
        while let Ok(block) = self.samples.try_recv() {
            self.analyzer.process_samples(&block, time_ms * 0.001);
            updated = true;
        }
        if !updated {
            return None;
        }
        let latest = self.analyzer.latest();
        Some(AudioFrame {
            levels: latest.levels,
            spectrum: latest.spectrum.clone(),
            waveform: latest.waveform.clone(),
        })
    }
}

/// A source that always reports the same frame
#[derive(Debug, Clone, Default)]
pub struct FixedAudio {
    frame: AudioFrame,
}

impl FixedAudio {
    /// Fixed band levels, no spectrum or waveform
    pub fn new(levels: AudioLevels) -> Self {
        Self {
            frame: AudioFrame::from_levels(levels),
        }
    }

    /// Fixed full frame
    pub fn from_frame(frame: AudioFrame) -> Self {
        Self { frame }
    }
}

impl AudioLevelSource for FixedAudio {
    fn name(&self) -> &str {
        "fixed"
    }

    fn poll(&mut self, _time_ms: f64) -> Option<AudioFrame> {
        Some(self.frame.clone())
    }
}

/// Holds the active source and the most recent frame
pub struct AudioFeed {
    source: Box<dyn AudioLevelSource>,
    frame: AudioFrame,
}

impl AudioFeed {
    /// Feed backed by `source`
    pub fn new(source: Box<dyn AudioLevelSource>) -> Self {
        Self {
            source,
            frame: AudioFrame::default(),
        }
    }

    /// Simulated feed per settings. Analyzer mode also starts simulated
    /// until a microphone is connected.
    pub fn from_settings(settings: &AudioSettings) -> Self {
        if settings.mode == AudioMode::Analyzer {
            debug!("Audio analyzer mode: simulated until an input connects");
        }
        Self::new(Box::new(SimulatedAudio::new(settings.poll_interval_ms)))
    }

    /// Poll the source; the previous frame is kept when nothing new arrived
    pub fn tick(&mut self, time_ms: f64) -> &AudioFrame {
        if let Some(frame) = self.source.poll(time_ms) {
            self.frame = frame;
        }
        &self.frame
    }

    /// Most recent frame
    pub fn frame(&self) -> &AudioFrame {
        &self.frame
    }

    /// Most recent band levels
    pub fn levels(&self) -> AudioLevels {
        self.frame.levels
    }

    /// Name of the active source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Swap the active source
    pub fn set_source(&mut self, source: Box<dyn AudioLevelSource>) {
        info!("Audio source: {} -> {}", self.source.name(), source.name());
        self.source = source;
    }

    /// Open a microphone and switch to live analysis.
    ///
    /// On failure the current source stays active.
    pub fn connect_microphone(
        &mut self,
        microphone: &mut dyn MicrophoneSource,
        settings: &AudioSettings,
    ) -> std::result::Result<(), DeviceError> {
        let samples = microphone.open(settings.sample_rate).map_err(|e| {
            warn!("Microphone unavailable: {}", e);
            e
        })?;
        self.set_source(Box::new(AnalyzerSource::new(samples, settings.analyzer_config())));
        Ok(())
    }
}
