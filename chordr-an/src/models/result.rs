//! Analysis result document
//!
//! The result document is the job's terminal artifact: written once per
//! successful or failed run, immutable afterwards, readable by any
//! downstream delivery layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Basic audio metadata captured after decoding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Decoded duration in seconds
    pub duration_seconds: f64,
    /// Sample rate the analysis ran at, in Hz
    pub sample_rate: u32,
}

/// One entry of the smoothed chord progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordSegment {
    /// Segment start time in seconds from the beginning of the file
    pub time_seconds: f64,
    /// Chord label: root note name, `m` suffix for minor, `N` for no chord
    pub chord: String,
    /// Winning template correlation, clamped to non-negative finite values
    pub confidence: f64,
}

/// Chord/key analysis block of the result document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordAnalysis {
    /// Smoothed chord progression, ordered by time
    pub progression: Vec<ChordSegment>,
    /// Estimated key, e.g. "C major", or "Unknown"
    pub key: String,
    /// Tempo estimate in BPM (120.0 fallback on degenerate input)
    pub tempo: f64,
    /// Global chroma-clarity confidence, 0.0 to 1.0
    pub confidence: f64,
    /// Number of entries in the smoothed progression
    pub total_chords: usize,
    /// Number of distinct chord labels in the progression
    pub unique_chords: usize,
    /// Error message when analysis ran degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChordAnalysis {
    /// Degraded analysis: unknown key, empty progression, default tempo
    pub fn degraded(error: String) -> Self {
        Self {
            progression: Vec::new(),
            key: "Unknown".to_string(),
            tempo: 120.0,
            confidence: 0.0,
            total_chords: 0,
            unique_chords: 0,
            error: Some(error),
        }
    }
}

/// One word of a transcript segment with timing and confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

/// One contiguous span of recognized speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
    pub confidence: f64,
    /// Word-level timing when the transcriber produced it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

/// Lyrics block of the result document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsAnalysis {
    /// Full transcript text
    pub text: String,
    /// Detected language code, or "unknown"
    pub language: String,
    /// Confidence-filtered transcript segments
    pub segments: Vec<TranscriptSegment>,
    /// Duration-weighted mean of surviving segment confidences
    pub confidence: f64,
    /// Word count of the transcript text
    pub word_count: usize,
    /// End timestamp of the last surviving segment
    pub duration_seconds: f64,
    /// `[MM:SS - MM:SS] text` lines for display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_lyrics: Option<String>,
    /// Error message when transcription ran degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LyricsAnalysis {
    /// Degraded lyrics block: empty transcript with an error message
    pub fn degraded(error: String) -> Self {
        Self {
            text: String::new(),
            language: "unknown".to_string(),
            segments: Vec::new(),
            confidence: 0.0,
            word_count: 0,
            duration_seconds: 0.0,
            formatted_lyrics: None,
            error: Some(error),
        }
    }
}

/// Complete analysis result for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_id: Uuid,

    /// Decoded audio metadata (absent when the file never decoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AudioMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chords: Option<ChordAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<LyricsAnalysis>,

    pub status: RunStatus,

    /// Classified error message for failed runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub processing_started: DateTime<Utc>,
    pub processing_completed: DateTime<Utc>,

    /// Wall-clock run duration in seconds
    pub processing_time: f64,
}
