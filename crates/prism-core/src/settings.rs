//! Runtime settings
//!
//! Every field has a serde default, so partial settings files load.

use crate::audio::{BandSplit, SpectrumAnalyzerConfig};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Output canvas
    pub canvas: CanvasSettings,
    /// Maximum number of history entries; unbounded when absent
    pub history_limit: Option<usize>,
    /// Audio feed
    pub audio: AudioSettings,
    /// Strobe visual
    pub strobe: StrobeSettings,
    /// Logging
    pub log: LogConfig,
}

/// Canvas size in canvas units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasSettings {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Where audio levels come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Random levels on a polling interval
    #[default]
    Simulated,
    /// Spectrum analysis of a microphone, or of `input` when set
    Analyzer,
}

/// Audio feed settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    /// Source selection
    pub mode: AudioMode,
    /// Raw mono f32 little-endian PCM played into the analyzer
    pub input: Option<PathBuf>,
    /// Simulated refresh interval
    pub poll_interval_ms: u64,
    /// Microphone sample rate
    pub sample_rate: u32,
    /// FFT size (power of 2)
    pub fft_size: usize,
    /// Magnitude smoothing, 0-1
    pub smoothing: f32,
    /// Decibels mapped to 0
    pub min_decibels: f32,
    /// Decibels mapped to 1
    pub max_decibels: f32,
    /// End of the bass band as a fraction of the spectrum
    pub bass_split: f32,
    /// End of the mids band as a fraction of the spectrum
    pub mids_split: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        let analyzer = SpectrumAnalyzerConfig::default();
        let split = BandSplit::default();
        Self {
            mode: AudioMode::default(),
            input: None,
            poll_interval_ms: 200,
            sample_rate: analyzer.sample_rate,
            fft_size: analyzer.fft_size,
            smoothing: analyzer.smoothing,
            min_decibels: analyzer.min_decibels,
            max_decibels: analyzer.max_decibels,
            bass_split: split.bass,
            mids_split: split.mids,
        }
    }
}

impl AudioSettings {
    /// Analyzer configuration derived from these settings
    pub fn analyzer_config(&self) -> SpectrumAnalyzerConfig {
        SpectrumAnalyzerConfig {
            sample_rate: self.sample_rate,
            fft_size: self.fft_size,
            smoothing: self.smoothing,
            min_decibels: self.min_decibels,
            max_decibels: self.max_decibels,
            split: BandSplit {
                bass: self.bass_split,
                mids: self.mids_split,
            },
            ..Default::default()
        }
    }
}

/// Strobe visual settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrobeSettings {
    /// Bass level (0-100) above which the strobe fires
    pub threshold: f32,
    /// Cross-fade duration between on and off
    pub fade_ms: f64,
}

impl Default for StrobeSettings {
    fn default() -> Self {
        Self {
            threshold: 65.0,
            fade_ms: 40.0,
        }
    }
}
