//! External analysis collaborators
//!
//! The low-level feature extractor (chroma + tempo) and the speech
//! transcriber are black-box services behind these traits: given an audio
//! buffer they return numeric feature vectors or timed transcription
//! segments. Their internals live outside this service; the stubs here
//! report the backend as unavailable so a run fails with a classified
//! "missing external dependency" message instead of a panic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collaborator failure modes
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The backing library or model is not installed/loaded
    #[error("{0}")]
    Unavailable(String),

    /// The backend ran but produced no usable output
    #[error("{0}")]
    Backend(String),
}

/// Chroma matrix plus tempo estimate returned by the feature extractor
#[derive(Debug, Clone)]
pub struct ChromaFeatures {
    /// One 12-bin pitch-class energy vector per analysis frame,
    /// components non-negative
    pub frames: Vec<[f32; 12]>,
    /// Tempo estimate in BPM (may be NaN on degenerate input)
    pub tempo: f32,
    /// Beat positions in seconds
    pub beats: Vec<f32>,
}

/// Short-time spectral decomposition into chroma, plus beat tracking.
///
/// Implementations must tolerate silence and return well-formed
/// (possibly all-zero) chroma on degenerate input rather than erroring.
pub trait FeatureExtractor: Send + Sync {
    fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<ChromaFeatures, CollaboratorError>;
}

/// One word of a raw transcription segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub probability: f64,
}

/// One raw transcription segment as produced by the transcriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<RawWord>>,
}

/// Raw transcriber output before confidence filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTranscription {
    pub text: String,
    pub language: String,
    pub segments: Vec<RawSegment>,
}

/// Pre-conditioned waveform handed to the transcriber
#[derive(Debug, Clone)]
pub struct ConditionedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Speech-to-text collaborator producing timed, per-word
/// confidence-scored segments.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        audio: &ConditionedAudio,
        language: Option<&str>,
    ) -> Result<RawTranscription, CollaboratorError>;
}

/// Placeholder feature extractor for deployments without a DSP backend
pub struct UnavailableFeatureExtractor;

impl FeatureExtractor for UnavailableFeatureExtractor {
    fn extract(
        &self,
        _samples: &[f32],
        _sample_rate: u32,
        _hop_length: usize,
    ) -> Result<ChromaFeatures, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "Chroma feature backend not installed".to_string(),
        ))
    }
}

/// Placeholder transcriber for deployments without a speech model
pub struct UnavailableTranscriber;

impl Transcriber for UnavailableTranscriber {
    fn transcribe(
        &self,
        _audio: &ConditionedAudio,
        _language: Option<&str>,
    ) -> Result<RawTranscription, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "Transcription model not loaded".to_string(),
        ))
    }
}
