//! Audio pre-conditioning for speech recognition
//!
//! The chain emphasizes centrally-panned vocal content and restricts the
//! signal to the speech-relevant band before handing it to the
//! transcriber. Each stage falls back to the previous stage's output on
//! failure; a preprocessing hiccup never aborts the lyric pipeline.

use crate::extractors::ConditionedAudio;
use crate::utils::{resample_mono, DecodedAudio};

/// Pre-conditioning parameters
#[derive(Debug, Clone, Copy)]
pub struct TranscriptPreprocessor {
    /// Sample rate required by the transcription collaborator
    pub target_rate: u32,
    /// High-pass cutoff suppressing rhythm/bass content
    pub highpass_hz: f32,
    /// Low-pass cutoff suppressing high-frequency noise
    pub lowpass_hz: f32,
    /// Gentle gain boost applied before resampling, in dB
    pub gain_db: f32,
    /// Mid (center) channel boost factor for stereo sources
    pub mid_boost: f32,
    /// Side channel attenuation factor for stereo sources
    pub side_attenuation: f32,
}

impl Default for TranscriptPreprocessor {
    fn default() -> Self {
        Self {
            target_rate: 16_000,
            highpass_hz: 80.0,
            lowpass_hz: 8_000.0,
            gain_db: 3.0,
            mid_boost: 1.5,
            side_attenuation: 0.3,
        }
    }
}

impl TranscriptPreprocessor {
    /// Run the full conditioning chain:
    /// downmix → mid/side vocal emphasis → normalize → band-pass →
    /// gain → resample → re-normalize.
    pub fn condition(&self, audio: &DecodedAudio) -> ConditionedAudio {
        let mut samples = audio.mono();

        // Stereo sources: vocals are usually panned center, so boost the
        // mid channel and attenuate the sides
        if audio.channels.len() == 2 {
            match vocal_emphasis(
                &audio.channels[0],
                &audio.channels[1],
                self.mid_boost,
                self.side_attenuation,
            ) {
                Some(enhanced) => samples = enhanced,
                None => {
                    tracing::warn!("Vocal emphasis failed, using plain downmix");
                }
            }
        }

        samples = normalize(samples);

        match band_pass(&samples, audio.sample_rate, self.highpass_hz, self.lowpass_hz) {
            Some(filtered) => samples = filtered,
            None => {
                tracing::warn!(
                    sample_rate = audio.sample_rate,
                    "Band-pass filter skipped, keeping unfiltered signal"
                );
            }
        }

        let gain = 10f32.powf(self.gain_db / 20.0);
        for s in samples.iter_mut() {
            *s *= gain;
        }

        let mut sample_rate = audio.sample_rate;
        match resample_mono(&samples, sample_rate, self.target_rate) {
            Ok(resampled) => {
                samples = resampled;
                sample_rate = self.target_rate;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Resampling failed, keeping source rate");
            }
        }

        samples = normalize(samples);

        ConditionedAudio {
            samples,
            sample_rate,
        }
    }
}

/// Derive the mid/side vocal-emphasis signal from a stereo pair.
///
/// mid = (L+R)/2 carries centrally-panned vocals; side = (L-R)/2 carries
/// panned instrumentation. Returns `None` on mismatched channel lengths.
fn vocal_emphasis(left: &[f32], right: &[f32], mid_boost: f32, side_atten: f32) -> Option<Vec<f32>> {
    if left.len() != right.len() || left.is_empty() {
        return None;
    }
    let mut out = Vec::with_capacity(left.len());
    for (&l, &r) in left.iter().zip(right.iter()) {
        let mid = (l + r) * 0.5;
        let side = (l - r) * 0.5;
        out.push(mid * mid_boost - side * side_atten);
    }
    Some(out)
}

/// Peak-normalize to full scale; silent or degenerate input is returned
/// unchanged.
fn normalize(samples: Vec<f32>) -> Vec<f32> {
    let peak = samples.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()));
    if !peak.is_finite() || peak <= 0.0 {
        return samples;
    }
    samples.iter().map(|&s| s / peak).collect()
}

/// First-order band-pass: one-pole high-pass then one-pole low-pass.
///
/// Returns `None` when the sample rate cannot support the cutoffs.
fn band_pass(samples: &[f32], sample_rate: u32, highpass_hz: f32, lowpass_hz: f32) -> Option<Vec<f32>> {
    if sample_rate == 0 || samples.is_empty() {
        return None;
    }
    let nyquist = sample_rate as f32 / 2.0;
    if highpass_hz >= nyquist || lowpass_hz <= highpass_hz {
        return None;
    }

    let dt = 1.0 / sample_rate as f32;

    // High-pass: y[n] = a * (y[n-1] + x[n] - x[n-1])
    let rc_hp = 1.0 / (2.0 * std::f32::consts::PI * highpass_hz);
    let a = rc_hp / (rc_hp + dt);
    let mut hp = Vec::with_capacity(samples.len());
    let mut prev_x = samples[0];
    let mut prev_y = samples[0];
    hp.push(samples[0]);
    for &x in &samples[1..] {
        let y = a * (prev_y + x - prev_x);
        hp.push(y);
        prev_x = x;
        prev_y = y;
    }

    // Low-pass: y[n] = y[n-1] + b * (x[n] - y[n-1])
    let lowpass_hz = lowpass_hz.min(nyquist * 0.99);
    let rc_lp = 1.0 / (2.0 * std::f32::consts::PI * lowpass_hz);
    let b = dt / (rc_lp + dt);
    let mut out = Vec::with_capacity(hp.len());
    let mut y = hp[0];
    out.push(y);
    for &x in &hp[1..] {
        y += b * (x - y);
        out.push(y);
    }

    Some(out)
}
