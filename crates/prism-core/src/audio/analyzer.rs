//! Spectrum Analyzer - FFT-based band analysis
//!
//! Buffers incoming samples in a ring, runs a Hann-windowed FFT every hop and
//! maps smoothed magnitudes onto a decibel window, producing a 0-1 spectrum
//! plus the three band levels.

use super::{levels_from_spectrum, AudioLevels, BandSplit};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

/// One analysis result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumFrame {
    /// Timestamp of this analysis (seconds)
    pub timestamp: f64,
    /// Normalized magnitude spectrum (half of FFT size, 0-1)
    pub spectrum: Vec<f32>,
    /// Latest time-domain samples
    pub waveform: Vec<f32>,
    /// Band summary of `spectrum`
    pub levels: AudioLevels,
}

/// Configuration for [`SpectrumAnalyzer`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumAnalyzerConfig {
    /// Sample rate of the incoming signal
    pub sample_rate: u32,
    /// FFT size (power of 2)
    pub fft_size: usize,
    /// Overlap ratio (0.0 - 1.0, typically 0.5)
    pub overlap: f32,
    /// Smoothing factor for magnitudes
    pub smoothing: f32,
    /// Magnitude mapped to 0.0
    pub min_decibels: f32,
    /// Magnitude mapped to 1.0
    pub max_decibels: f32,
    /// Band boundaries
    pub split: BandSplit,
}

impl Default for SpectrumAnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            fft_size: 2048,
            overlap: 0.5,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            split: BandSplit::default(),
        }
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    let denom = size.saturating_sub(1).max(1) as f32;
    (0..size)
        .map(|i| {
            let t = i as f32 / denom;
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
        })
        .collect()
}

/// Spectrum analyzer with proper buffering
pub struct SpectrumAnalyzer {
    /// FFT instance
    fft: Arc<dyn Fft<f32>>,

    /// Configuration
    config: SpectrumAnalyzerConfig,

    /// Input sample buffer (ring buffer for FFT)
    input_buffer: Vec<f32>,

    /// Write position in ring buffer
    buffer_write_pos: usize,

    /// Samples since last FFT
    samples_since_fft: usize,

    /// Hop size (samples between FFT frames)
    hop_size: usize,

    /// FFT complex buffer
    fft_buffer: Vec<Complex<f32>>,

    /// FFT scratch buffer
    scratch_buffer: Vec<Complex<f32>>,

    /// Hann window coefficients
    window: Vec<f32>,

    /// Smoothed linear magnitudes (positive frequencies only)
    smoothed_magnitudes: Vec<f32>,

    /// Decibel-normalized spectrum
    spectrum: Vec<f32>,

    /// Waveform buffer
    waveform_buffer: Vec<f32>,

    /// Latest analysis result
    latest: SpectrumFrame,

    total_samples: u64,
    fft_count: u64,
}

impl SpectrumAnalyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: SpectrumAnalyzerConfig) -> Self {
        let fft_size = config.fft_size.max(2);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let half_size = fft_size / 2;
        let hop_size = (((1.0 - config.overlap) * fft_size as f32) as usize).max(1);

        debug!(
            "SpectrumAnalyzer created: sample_rate={}, fft_size={}, hop_size={}",
            config.sample_rate, fft_size, hop_size
        );

        Self {
            fft,
            config: SpectrumAnalyzerConfig { fft_size, ..config },
            input_buffer: vec![0.0; fft_size],
            buffer_write_pos: 0,
            samples_since_fft: 0,
            hop_size,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            window: hann_window(fft_size),
            smoothed_magnitudes: vec![0.0; half_size],
            spectrum: vec![0.0; half_size],
            waveform_buffer: Vec::with_capacity(fft_size),
            latest: SpectrumFrame::default(),
            total_samples: 0,
            fft_count: 0,
        }
    }

    /// Process incoming audio samples
    pub fn process_samples(&mut self, samples: &[f32], timestamp: f64) {
        if samples.is_empty() {
            return;
        }

        // NaN/Inf would poison the smoothed buffers for good
        let samples: Vec<f32> = samples
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 })
            .collect();

        self.total_samples += samples.len() as u64;

        self.waveform_buffer.clear();
        self.waveform_buffer
            .extend_from_slice(&samples[..samples.len().min(self.config.fft_size)]);

        for &sample in &samples {
            self.input_buffer[self.buffer_write_pos] = sample;
            self.buffer_write_pos = (self.buffer_write_pos + 1) % self.config.fft_size;
            self.samples_since_fft += 1;

            // First FFT once the ring has filled
            if self.samples_since_fft >= self.hop_size
                && self.total_samples >= self.config.fft_size as u64
            {
                self.perform_fft();
                self.samples_since_fft = 0;
            }
        }

        self.latest = SpectrumFrame {
            timestamp,
            spectrum: self.spectrum.clone(),
            waveform: self.waveform_buffer.clone(),
            levels: levels_from_spectrum(&self.spectrum, &self.config.split),
        };
    }

    /// Perform FFT on current buffer
    fn perform_fft(&mut self) {
        self.fft_count += 1;

        // The write position is where we'll write NEXT, so data starts there
        for i in 0..self.config.fft_size {
            let src_idx = (self.buffer_write_pos + i) % self.config.fft_size;
            let windowed = self.input_buffer[src_idx] * self.window[i];
            self.fft_buffer[i] = Complex::new(windowed, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let norm_factor = 1.0 / self.config.fft_size as f32;
        let smoothing = self.config.smoothing.clamp(0.0, 1.0);
        let db_range = (self.config.max_decibels - self.config.min_decibels).max(f32::EPSILON);

        for i in 0..self.smoothed_magnitudes.len() {
            let magnitude = self.fft_buffer[i].norm() * norm_factor;
            self.smoothed_magnitudes[i] =
                self.smoothed_magnitudes[i] * smoothing + magnitude * (1.0 - smoothing);

            let db = 20.0 * self.smoothed_magnitudes[i].max(1e-12).log10();
            self.spectrum[i] = ((db - self.config.min_decibels) / db_range).clamp(0.0, 1.0);
        }

        if self.fft_count % 100 == 0 {
            let head = &self.spectrum[..self.spectrum.len().min(4)];
            trace!("FFT #{}: first bins={:?}", self.fft_count, head);
        }
    }

    /// Get the latest analysis result
    pub fn latest(&self) -> &SpectrumFrame {
        &self.latest
    }

    /// Current configuration
    pub fn config(&self) -> &SpectrumAnalyzerConfig {
        &self.config
    }
}
