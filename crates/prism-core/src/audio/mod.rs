//! Audio analysis feed
//!
//! The core never owns an audio device. It consumes [`AudioFrame`]s from an
//! [`AudioLevelSource`]: a simulated generator, or a spectrum analyzer fed by
//! microphone samples over a channel.

pub mod analyzer;
pub mod source;

pub use analyzer::{SpectrumAnalyzer, SpectrumAnalyzerConfig, SpectrumFrame};
pub use source::{
    AnalyzerSource, AudioFeed, AudioLevelSource, FixedAudio, MicrophoneSource, SimulatedAudio,
};

use serde::{Deserialize, Serialize};

/// Band energies, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioLevels {
    /// Low band
    pub bass: f32,
    /// Middle band
    pub mids: f32,
    /// High band
    pub highs: f32,
}

impl AudioLevels {
    /// Create from raw levels, clamped to 0-100
    pub fn new(bass: f32, mids: f32, highs: f32) -> Self {
        Self {
            bass: bass.clamp(0.0, 100.0),
            mids: mids.clamp(0.0, 100.0),
            highs: highs.clamp(0.0, 100.0),
        }
    }
}

/// Where the spectrum is cut into bass/mids/highs, as fractions of the bin
/// count. Bass is `[0, bass)`, mids `[bass, mids)`, highs the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSplit {
    /// End of the bass band
    pub bass: f32,
    /// End of the mids band
    pub mids: f32,
}

impl Default for BandSplit {
    fn default() -> Self {
        Self {
            bass: 0.1,
            mids: 0.5,
        }
    }
}

impl BandSplit {
    /// Bin ranges for a spectrum of `len` bins. Every band gets at least
    /// one bin when `len >= 3`.
    pub fn ranges(&self, len: usize) -> [std::ops::Range<usize>; 3] {
        if len < 3 {
            return [0..len, len..len, len..len];
        }
        let bass_end = ((len as f32 * self.bass.clamp(0.0, 1.0)) as usize).clamp(1, len - 2);
        let mids_end =
            ((len as f32 * self.mids.clamp(0.0, 1.0)) as usize).clamp(bass_end + 1, len - 1);
        [0..bass_end, bass_end..mids_end, mids_end..len]
    }
}

/// Average a normalized (0-1) spectrum into three 0-100 levels
pub fn levels_from_spectrum(spectrum: &[f32], split: &BandSplit) -> AudioLevels {
    let [bass, mids, highs] = split.ranges(spectrum.len());
    let average = |range: std::ops::Range<usize>| -> f32 {
        if range.is_empty() {
            return 0.0;
        }
        let count = range.len() as f32;
        spectrum[range].iter().sum::<f32>() / count * 100.0
    };
    AudioLevels::new(average(bass), average(mids), average(highs))
}

/// Everything the frame loop needs from audio
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioFrame {
    /// Band summary
    pub levels: AudioLevels,
    /// Normalized magnitude spectrum (0-1 per bin)
    pub spectrum: Vec<f32>,
    /// Time-domain samples (-1..1)
    pub waveform: Vec<f32>,
}

impl AudioFrame {
    /// Frame carrying only band levels
    pub fn from_levels(levels: AudioLevels) -> Self {
        Self {
            levels,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_clamp() {
        let levels = AudioLevels::new(-5.0, 50.0, 150.0);
        assert_eq!(levels, AudioLevels { bass: 0.0, mids: 50.0, highs: 100.0 });
    }

    #[test]
    fn test_band_ranges_are_contiguous() {
        let [bass, mids, highs] = BandSplit::default().ranges(100);
        assert_eq!(bass, 0..10);
        assert_eq!(mids, 10..50);
        assert_eq!(highs, 50..100);

        let [bass, mids, highs] = BandSplit::default().ranges(3);
        assert_eq!((bass.len(), mids.len(), highs.len()), (1, 1, 1));
    }

    #[test]
    fn test_levels_from_spectrum() {
        let mut spectrum = vec![0.0; 100];
        spectrum[..10].fill(0.8);
        spectrum[50..].fill(0.25);
        let levels = levels_from_spectrum(&spectrum, &BandSplit::default());
        assert!((levels.bass - 80.0).abs() < 1e-3);
        assert_eq!(levels.mids, 0.0);
        assert!((levels.highs - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_spectrum_is_silent() {
        assert_eq!(levels_from_spectrum(&[], &BandSplit::default()), AudioLevels::default());
    }
}
