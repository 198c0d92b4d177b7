//! Lyric transcription pipeline
//!
//! Conditions the decoded audio for speech recognition, runs the
//! transcriber collaborator, then filters the raw output down to a
//! confidence-vetted lyrics block.

pub mod postprocess;
pub mod preprocess;

use std::sync::Arc;

use crate::extractors::{CollaboratorError, Transcriber};
use crate::models::LyricsAnalysis;
use crate::utils::DecodedAudio;

pub use postprocess::PostprocessConfig;
pub use preprocess::TranscriptPreprocessor;

/// End-to-end lyric extraction: pre-condition, transcribe, filter.
pub struct LyricExtractor {
    transcriber: Arc<dyn Transcriber>,
    preprocessor: TranscriptPreprocessor,
    postprocess: PostprocessConfig,
}

impl LyricExtractor {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            transcriber,
            preprocessor: TranscriptPreprocessor::default(),
            postprocess: PostprocessConfig::default(),
        }
    }

    pub fn with_config(
        transcriber: Arc<dyn Transcriber>,
        preprocessor: TranscriptPreprocessor,
        postprocess: PostprocessConfig,
    ) -> Self {
        Self {
            transcriber,
            preprocessor,
            postprocess,
        }
    }

    /// Extract lyrics from decoded audio.
    ///
    /// Transcriber failures propagate so the caller can record the run as
    /// failed; filtering that removes everything is a valid (empty)
    /// result, not an error.
    pub fn extract(
        &self,
        audio: &DecodedAudio,
        language: Option<&str>,
    ) -> Result<LyricsAnalysis, CollaboratorError> {
        let conditioned = self.preprocessor.condition(audio);

        tracing::debug!(
            frames = conditioned.samples.len(),
            sample_rate = conditioned.sample_rate,
            "Audio conditioned for transcription"
        );

        let raw = self.transcriber.transcribe(&conditioned, language)?;

        let segments = postprocess::filter_segments(&raw.segments, &self.postprocess);
        let text: String = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = postprocess::aggregate_confidence(&segments);
        let duration_seconds = postprocess::total_duration(&segments);
        let formatted_lyrics = postprocess::format_timestamped(&segments);
        let word_count = text.split_whitespace().count();

        tracing::info!(
            raw_segments = raw.segments.len(),
            kept_segments = segments.len(),
            word_count,
            language = %raw.language,
            "Transcript filtered"
        );

        Ok(LyricsAnalysis {
            text,
            language: raw.language,
            segments,
            confidence,
            word_count,
            duration_seconds,
            formatted_lyrics,
            error: None,
        })
    }
}
