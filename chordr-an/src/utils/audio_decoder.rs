//! Audio decoding utilities
//!
//! Decodes audio files to f32 PCM using symphonia (MP3, FLAC, WAV, AAC,
//! OGG, etc.). Channels are kept separate so the transcript preprocessor
//! can run mid/side vocal emphasis on stereo sources.

use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Decoded audio with per-channel PCM data
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Per-channel samples (f32, range [-1.0, 1.0]), all equal length
    pub channels: Vec<Vec<f32>>,
    /// Source sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of sample frames
    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Duration in seconds at the source sample rate
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Downmix to a single channel by averaging
    pub fn mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => {
                let frames = self.frames();
                let mut mono = Vec::with_capacity(frames);
                for i in 0..frames {
                    let sum: f32 = self.channels.iter().map(|c| c[i]).sum();
                    mono.push(sum / n as f32);
                }
                mono
            }
        }
    }
}

/// Decode an audio file to per-channel f32 PCM samples.
///
/// # Errors
/// * File I/O errors
/// * Unsupported format
/// * Corrupt audio data
pub fn decode_audio_file(file_path: &Path) -> Result<DecodedAudio> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open audio file: {}", file_path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("Failed to probe audio file: {}", file_path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate unknown")?;
    let channel_count = track
        .codec_params
        .channels
        .context("Channels unknown")?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", file_path.display()))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(anyhow::anyhow!("Error reading packet: {}", e));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .with_context(|| format!("Failed to decode packet in: {}", file_path.display()))?;

        append_buffer(&decoded, &mut channels);
    }

    tracing::debug!(
        path = %file_path.display(),
        frames = channels.first().map(|c| c.len()).unwrap_or(0),
        sample_rate,
        channels = channel_count,
        "Audio decoding complete"
    );

    Ok(DecodedAudio {
        channels,
        sample_rate,
    })
}

/// Append one decoded buffer to the per-channel sample vectors,
/// converting the sample format to f32.
fn append_buffer(decoded: &AudioBufferRef, channels: &mut [Vec<f32>]) {
    fn append<S>(buf: &symphonia::core::audio::AudioBuffer<S>, channels: &mut [Vec<f32>])
    where
        S: Sample,
        f32: FromSample<S>,
    {
        let available = buf.spec().channels.count().min(channels.len());
        for (ch, sink) in channels.iter_mut().enumerate().take(available) {
            sink.extend(buf.chan(ch).iter().map(|&s| f32::from_sample(s)));
        }
    }

    match decoded {
        AudioBufferRef::U8(buf) => append(buf, channels),
        AudioBufferRef::U16(buf) => append(buf, channels),
        AudioBufferRef::U24(buf) => append(buf, channels),
        AudioBufferRef::U32(buf) => append(buf, channels),
        AudioBufferRef::S8(buf) => append(buf, channels),
        AudioBufferRef::S16(buf) => append(buf, channels),
        AudioBufferRef::S24(buf) => append(buf, channels),
        AudioBufferRef::S32(buf) => append(buf, channels),
        AudioBufferRef::F32(buf) => append(buf, channels),
        AudioBufferRef::F64(buf) => append(buf, channels),
    }
}
