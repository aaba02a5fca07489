//! Audio capture and WAV helpers
//!
//! Capture shells out to a sox-compatible recorder that writes raw signed
//! 16-bit mono PCM to stdout. A short ambient-noise recording sets an
//! energy floor; clips that never rise above it are treated as silence.

use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Sample rate requested from the recorder
pub const SAMPLE_RATE: u32 = 16000;

/// Upper bound on a single phrase when no limit is configured
pub const MAX_PHRASE: Duration = Duration::from_secs(15);

/// Headroom applied to the measured ambient level
const NOISE_MARGIN: f32 = 1.5;

/// Extra time a recorder gets past its own phrase limit
const OVERRUN_GRACE: Duration = Duration::from_secs(2);

/// Mono 16-bit PCM audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Decode little-endian raw PCM bytes
    pub fn from_raw_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Read a WAV file, mixing down to mono
    pub fn from_wav_file(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_wav_reader(reader)
    }

    /// Decode WAV bytes, mixing down to mono
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .context("Failed to parse WAV data")?;
        Self::from_wav_reader(reader)
    }

    fn from_wav_reader<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<i16> = match spec.sample_format {
            hound::SampleFormat::Int if spec.bits_per_sample <= 16 => reader
                .samples::<i16>()
                .collect::<std::result::Result<Vec<i16>, hound::Error>>()
                .context("Failed to read WAV samples")?,
            hound::SampleFormat::Int => {
                let shift = spec.bits_per_sample.saturating_sub(16);
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<std::result::Result<Vec<i16>, hound::Error>>()
                    .context("Failed to read WAV samples")?
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<std::result::Result<Vec<i16>, hound::Error>>()
                .context("Failed to read WAV samples")?,
        };

        let samples = interleaved
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect();

        Ok(Self::new(samples, spec.sample_rate))
    }

    /// Encode as an in-memory WAV file
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .context("Failed to create WAV writer")?;

        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }

        writer.finalize()?;
        Ok(cursor.into_inner())
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Root-mean-square level, scaled to 0.0..=1.0
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self
            .samples
            .iter()
            .map(|&s| {
                let v = s as f32 / i16::MAX as f32;
                v * v
            })
            .sum();
        (sum_sq / self.samples.len() as f32).sqrt()
    }
}

/// Microphone backed by an external recorder program
#[derive(Debug, Clone)]
pub struct CommandMicrophone {
    program: String,
    /// Placed before the recording options (e.g. `-d` for plain `sox`)
    args: Vec<String>,
    sample_rate: u32,
    /// Clips at or below this level are silence
    energy_floor: f32,
}

impl CommandMicrophone {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            sample_rate: SAMPLE_RATE,
            energy_floor: 0.0,
        }
    }

    pub fn from_config(config: &crate::config::SpeechConfig) -> Self {
        Self::new(&config.recorder_program).with_args(config.recorder_args.clone())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn energy_floor(&self) -> f32 {
        self.energy_floor
    }

    fn command(&self, max: Duration, stop_on_silence: bool) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(self.record_args(max, stop_on_silence))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }

    /// Measure ambient noise for `duration` and raise the energy floor to it
    pub async fn calibrate(&mut self, duration: Duration) -> Result<f32> {
        debug!("Calibrating microphone for {:.1}s", duration.as_secs_f32());
        let output = self
            .command(duration, false)
            .output()
            .await
            .with_context(|| format!("Failed to run recorder '{}'", self.program))?;

        let ambient = AudioClip::from_raw_bytes(&output.stdout, self.sample_rate);
        self.energy_floor = ambient.rms() * NOISE_MARGIN;
        info!("Microphone calibrated (energy floor {:.4})", self.energy_floor);
        Ok(self.energy_floor)
    }

    /// Record one phrase, waiting at most `max` in total
    pub async fn capture(&self, max: Duration) -> Result<Option<AudioClip>> {
        let output = self
            .command(max, true)
            .output()
            .await
            .with_context(|| format!("Failed to run recorder '{}'", self.program))?;

        Ok(self.gate(AudioClip::from_raw_bytes(&output.stdout, self.sample_rate)))
    }

    /// Record one phrase that starts within `window`.
    ///
    /// The recorder holds back output until it hears speech, so the window
    /// only bounds the first bytes. A phrase that starts in time is read to
    /// the end, up to `limit`. A recorder still silent when the window
    /// closes is killed.
    pub async fn capture_within(&self, window: Duration, limit: Duration) -> Result<Option<AudioClip>> {
        let mut child = self
            .command(limit, true)
            .spawn()
            .with_context(|| format!("Failed to spawn recorder '{}'", self.program))?;
        let mut stdout = child.stdout.take().context("Recorder has no stdout")?;

        let mut bytes = vec![0u8; 4096];
        let first = match tokio::time::timeout(window, stdout.read(&mut bytes)).await {
            Ok(read) => read.context("Failed to read from recorder")?,
            Err(_) => {
                debug!("No phrase within {:.1}s", window.as_secs_f32());
                return Ok(None);
            }
        };
        bytes.truncate(first);

        if first > 0 {
            debug!("Phrase started, recording up to {:.1}s", limit.as_secs_f32());
            match tokio::time::timeout(limit + OVERRUN_GRACE, stdout.read_to_end(&mut bytes)).await {
                Ok(read) => {
                    read.context("Failed to read from recorder")?;
                }
                Err(_) => {
                    warn!("Recorder ran past the phrase limit, stopping it");
                    if let Err(e) = child.start_kill() {
                        debug!("Failed to stop recorder: {}", e);
                    }
                }
            }
        }

        if let Err(e) = child.wait().await {
            debug!("Failed to reap recorder: {}", e);
        }
        Ok(self.gate(AudioClip::from_raw_bytes(&bytes, self.sample_rate)))
    }

    fn gate(&self, clip: AudioClip) -> Option<AudioClip> {
        let level = clip.rms();
        if clip.is_empty() || level <= self.energy_floor {
            debug!("Discarding silent clip (level {:.4})", level);
            return None;
        }
        debug!("Captured {:.1}s of audio", clip.duration().as_secs_f32());
        Some(clip)
    }

    /// sox arguments: raw mono PCM to stdout, at most `max` long, optionally
    /// waiting for speech and stopping after a second of silence
    fn record_args(&self, max: Duration, stop_on_silence: bool) -> Vec<String> {
        let mut args: Vec<String> = [
            "-q", "-t", "raw", "-e", "signed-integer", "-b", "16", "-c", "1", "-r",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(self.sample_rate.to_string());
        args.push("-".to_string());
        args.extend(["trim".to_string(), "0".to_string(), format!("{:.1}", max.as_secs_f32())]);
        if stop_on_silence {
            args.extend(
                ["silence", "1", "0.1", "1%", "1", "1.0", "1%"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
        args
    }
}
