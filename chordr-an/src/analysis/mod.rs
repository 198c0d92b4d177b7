//! Template-based harmonic analysis
//!
//! Turns a chroma sequence and a tempo estimate into a chord progression,
//! an estimated key, and a global confidence score. The raw chroma and
//! tempo come from the external feature extractor; this module only does
//! the template matching, key-profile correlation, and smoothing on top.

pub mod key;
pub mod progression;
pub mod stats;
pub mod templates;

use std::collections::HashSet;

use crate::models::ChordAnalysis;
use templates::TemplateBank;

/// Tuning knobs for the chord engine
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Length of one analysis segment in seconds
    pub segment_seconds: f64,
    /// Minimum duration before a chord change is believed
    pub min_chord_duration: f64,
    /// Correlation below this is "no chord"
    pub correlation_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 2.0,
            min_chord_duration: 1.0,
            correlation_threshold: 0.6,
        }
    }
}

/// Chord/key detection engine.
///
/// The template bank is built once at construction and immutable
/// thereafter; `analyze` is pure and never fails. Degenerate input
/// degrades per-candidate, not per-run.
pub struct ChordEngine {
    bank: TemplateBank,
    config: EngineConfig,
}

impl ChordEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            bank: TemplateBank::new(),
            config,
        }
    }

    /// Analyze a chroma sequence at the given analysis rate.
    ///
    /// `tempo` is the external extractor's estimate; NaN/Inf falls back
    /// to 120.0 BPM.
    pub fn analyze(
        &self,
        frames: &[[f32; 12]],
        tempo: f32,
        sample_rate: u32,
        hop_length: usize,
    ) -> ChordAnalysis {
        let key = key::estimate_key(frames);

        let raw = progression::detect_progression(
            frames,
            sample_rate,
            hop_length,
            self.config.segment_seconds,
            &self.bank,
            self.config.correlation_threshold,
        );
        let smoothed = progression::smooth(&raw, self.config.min_chord_duration);

        let tempo = if tempo.is_finite() && tempo > 0.0 {
            tempo as f64
        } else {
            120.0
        };

        let unique_chords: HashSet<&str> =
            smoothed.iter().map(|s| s.chord.as_str()).collect();

        tracing::debug!(
            chords = smoothed.len(),
            key = %key,
            tempo = format!("{:.1}", tempo),
            "Chord detection complete"
        );

        ChordAnalysis {
            total_chords: smoothed.len(),
            unique_chords: unique_chords.len(),
            confidence: stats::clarity_confidence(frames),
            progression: smoothed,
            key,
            tempo,
            error: None,
        }
    }
}

impl Default for ChordEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
