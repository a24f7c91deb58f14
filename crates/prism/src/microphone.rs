//! PCM file playback as a microphone

use crossbeam_channel::{bounded, Receiver};
use prism_core::{DeviceError, MicrophoneSource};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Blocks delivered per second of audio
const BLOCKS_PER_SECOND: u32 = 100;

/// Plays raw mono f32 little-endian samples in real time, one block every
/// 10 ms, as if captured from a device
pub struct PcmFileMicrophone {
    path: PathBuf,
}

impl PcmFileMicrophone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn decode(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl MicrophoneSource for PcmFileMicrophone {
    fn open(&mut self, sample_rate: u32) -> Result<Receiver<Vec<f32>>, DeviceError> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| DeviceError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let samples = decode(&bytes);
        if samples.is_empty() {
            return Err(DeviceError::Unavailable(format!(
                "{}: no samples",
                self.path.display()
            )));
        }

        let block = (sample_rate / BLOCKS_PER_SECOND).max(1) as usize;
        let pace = Duration::from_secs(1) / BLOCKS_PER_SECOND;
        info!(
            "Playing {} samples from {:?} at {} Hz",
            samples.len(),
            self.path,
            sample_rate
        );

        let (tx, rx) = bounded(BLOCKS_PER_SECOND as usize);
        thread::Builder::new()
            .name("pcm-input".to_string())
            .spawn(move || {
                for chunk in samples.chunks(block) {
                    if tx.send(chunk.to_vec()).is_err() {
                        break;
                    }
                    thread::sleep(pace);
                }
                debug!("PCM input finished");
            })
            .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blocks_follow_sample_rate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..1000 {
            file.write_all(&(i as f32 * 0.001).to_le_bytes()).unwrap();
        }
        let mut mic = PcmFileMicrophone::new(file.path());
        let rx = mic.open(44100).unwrap();
        let first = rx.recv().unwrap();
        assert_eq!(first.len(), 441);
        assert_eq!(first[1], 0.001);
    }

    #[test]
    fn test_analyzer_mode_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..4096 {
            let s = (i as f32 * 0.05).sin() * 0.5;
            file.write_all(&s.to_le_bytes()).unwrap();
        }
        let settings = prism_core::settings::AudioSettings {
            fft_size: 512,
            ..Default::default()
        };
        let mut editor = prism_core::Editor::default();
        let mut feed = prism_core::AudioFeed::from_settings(&settings);
        let mut mic = PcmFileMicrophone::new(file.path());
        assert!(editor.connect_microphone(&mut feed, &mut mic, &settings));
        assert_eq!(feed.source_name(), "microphone");

        let mut spectrum = 0;
        for _ in 0..200 {
            spectrum = feed.tick(0.0).spectrum.len();
            if spectrum == 256 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(spectrum, 256);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut mic = PcmFileMicrophone::new(dir.path().join("absent.pcm"));
        assert!(matches!(mic.open(44100), Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn test_empty_file_is_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut mic = PcmFileMicrophone::new(file.path());
        assert!(mic.open(44100).is_err());
    }
}
