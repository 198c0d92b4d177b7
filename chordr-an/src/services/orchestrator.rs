//! Analysis orchestrator
//!
//! Drives one uploaded file through the full pipeline: decode, validate,
//! chord analysis, lyric transcription, result persistence, and the final
//! status transition. A run never returns an error to its caller; every
//! failure is captured in the result document and the job record.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use chordr_common::events::{ChordrEvent, EventBus};

use crate::analysis::ChordEngine;
use crate::extractors::{CollaboratorError, FeatureExtractor};
use crate::models::{
    AnalysisResult, AudioMetadata, ChordAnalysis, JobStatus, LyricsAnalysis, RunStatus,
};
use crate::services::JobStore;
use crate::transcript::LyricExtractor;
use crate::utils::{decode_audio_file, resample_mono};

/// Orchestrator tuning
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Sample rate the chroma analysis runs at, in Hz
    pub analysis_sample_rate: u32,
    /// Analysis hop length in samples
    pub hop_length: usize,
    /// Files shorter than this are rejected at validation
    pub min_duration_seconds: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22_050,
            hop_length: 512,
            min_duration_seconds: 1.0,
        }
    }
}

/// Everything a run produced, before assembly into the result document
struct RunOutcome {
    metadata: Option<AudioMetadata>,
    chords: Option<ChordAnalysis>,
    lyrics: Option<LyricsAnalysis>,
    error: Option<String>,
}

impl RunOutcome {
    fn failed(error: String) -> Self {
        Self {
            metadata: None,
            chords: None,
            lyrics: None,
            error: Some(error),
        }
    }
}

/// Owns the analysis pipeline for one service instance.
pub struct AnalysisOrchestrator {
    store: Arc<JobStore>,
    features: Arc<dyn FeatureExtractor>,
    engine: ChordEngine,
    lyrics: LyricExtractor,
    events: EventBus,
    config: OrchestratorConfig,
    output_dir: PathBuf,
}

impl AnalysisOrchestrator {
    pub fn new(
        store: Arc<JobStore>,
        features: Arc<dyn FeatureExtractor>,
        engine: ChordEngine,
        lyrics: LyricExtractor,
        events: EventBus,
        config: OrchestratorConfig,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            features,
            engine,
            lyrics,
            events,
            config,
            output_dir,
        }
    }

    /// Path of the result document for a job
    pub fn result_path(&self, job_id: Uuid) -> PathBuf {
        self.output_dir.join(format!("{job_id}_results.json"))
    }

    /// Run the full pipeline for one job.
    ///
    /// The caller is responsible for the `Uploaded → Processing`
    /// transition before submission; a job in any other state (or an
    /// unknown id) logs and returns without touching the record. All
    /// downstream failures end in a `Failed` transition with the
    /// classified error recorded on both the job and the result
    /// document; the job never stays `Processing` after this returns.
    pub async fn run(self: Arc<Self>, job_id: Uuid) {
        let job = match self.store.get(job_id).await {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Cannot start analysis run");
                return;
            }
        };
        if job.status != JobStatus::Processing {
            tracing::error!(
                job_id = %job_id,
                status = %job.status,
                "Analysis run requires a processing job"
            );
            return;
        }

        tracing::info!(job_id = %job_id, file = %job.original_name, "Analysis run started");

        let started = Utc::now();

        let this = Arc::clone(&self);
        let source = job.source_path.clone();
        let outcome = match tokio::task::spawn_blocking(move || this.analyze_file(&source)).await {
            Ok(outcome) => outcome,
            Err(e) => RunOutcome::failed(format!("Analysis task aborted: {e}")),
        };

        let completed = Utc::now();
        let processing_time = (completed - started).num_milliseconds() as f64 / 1000.0;

        let status = if outcome.error.is_none() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        let result = AnalysisResult {
            job_id,
            metadata: outcome.metadata,
            chords: outcome.chords,
            lyrics: outcome.lyrics,
            status,
            error: outcome.error.clone(),
            processing_started: started,
            processing_completed: completed,
            processing_time,
        };

        self.persist_result(&result);

        let (new_status, event) = match status {
            RunStatus::Completed => (
                JobStatus::Completed,
                ChordrEvent::JobCompleted {
                    job_id,
                    processing_time_seconds: processing_time,
                    timestamp: completed,
                },
            ),
            RunStatus::Failed => (
                JobStatus::Failed,
                ChordrEvent::JobFailed {
                    job_id,
                    error: outcome.error.clone().unwrap_or_default(),
                    timestamp: completed,
                },
            ),
        };

        if let Err(e) = self
            .store
            .transition(job_id, new_status, outcome.error.clone())
            .await
        {
            tracing::error!(job_id = %job_id, error = %e, "Terminal transition failed");
            return;
        }
        self.events.emit_lossy(event);

        match status {
            RunStatus::Completed => {
                tracing::info!(
                    job_id = %job_id,
                    processing_time = format!("{processing_time:.2}s"),
                    "Analysis run completed"
                );
            }
            RunStatus::Failed => {
                tracing::warn!(
                    job_id = %job_id,
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Analysis run failed"
                );
            }
        }
    }

    /// CPU-bound section of the run: decode, validate, analyze.
    ///
    /// The chord and lyric branches degrade independently; a failure in
    /// either records an error on its own block and marks the run failed,
    /// but never prevents the other branch from producing output.
    fn analyze_file(&self, path: &Path) -> RunOutcome {
        let decoded = match decode_audio_file(path) {
            Ok(decoded) => decoded,
            Err(e) => return RunOutcome::failed(classify_load_error(&e)),
        };

        if decoded.frames() == 0 {
            return RunOutcome::failed(
                "Validation failed: audio file contains no samples".to_string(),
            );
        }
        let duration = decoded.duration_seconds();
        if duration < self.config.min_duration_seconds {
            return RunOutcome::failed(format!(
                "Validation failed: audio too short ({:.2}s, minimum {:.1}s)",
                duration, self.config.min_duration_seconds
            ));
        }

        let metadata = AudioMetadata {
            duration_seconds: duration,
            sample_rate: self.config.analysis_sample_rate,
        };

        let mut error: Option<String> = None;

        let mono = decoded.mono();
        let chords = match resample_mono(
            &mono,
            decoded.sample_rate,
            self.config.analysis_sample_rate,
        )
        .map_err(|e| CollaboratorError::Backend(e.to_string()))
        .and_then(|samples| {
            self.features.extract(
                &samples,
                self.config.analysis_sample_rate,
                self.config.hop_length,
            )
        }) {
            Ok(features) => self.engine.analyze(
                &features.frames,
                features.tempo,
                self.config.analysis_sample_rate,
                self.config.hop_length,
            ),
            Err(e) => {
                let message = format!("Chord analysis failed: {e}");
                error.get_or_insert_with(|| message.clone());
                ChordAnalysis::degraded(message)
            }
        };

        let lyrics = match self.lyrics.extract(&decoded, None) {
            Ok(lyrics) => lyrics,
            Err(e) => {
                let message = format!("Lyric extraction failed: {e}");
                error.get_or_insert_with(|| message.clone());
                LyricsAnalysis::degraded(message)
            }
        };

        RunOutcome {
            metadata: Some(metadata),
            chords: Some(chords),
            lyrics: Some(lyrics),
            error,
        }
    }

    /// Write the result document. Persistence failures are logged; the
    /// in-memory outcome still drives the job's terminal status.
    fn persist_result(&self, result: &AnalysisResult) {
        let path = self.result_path(result.job_id);
        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.output_dir)?;
            let content = serde_json::to_vec_pretty(result)?;
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, content)?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        };
        if let Err(e) = write() {
            tracing::error!(
                job_id = %result.job_id,
                path = %path.display(),
                error = %e,
                "Failed to persist result document"
            );
        }
    }
}

/// Map a decode failure to a user-facing classification.
fn classify_load_error(err: &anyhow::Error) -> String {
    let detail = format!("{err:#}");
    if detail.contains("Failed to open audio file") {
        format!("Audio file missing or unreadable: {detail}")
    } else if detail.contains("Failed to probe")
        || detail.contains("No audio track")
        || detail.contains("Failed to create decoder")
        || detail.contains("Failed to decode")
    {
        format!("Corrupt or unsupported audio file: {detail}")
    } else {
        format!("Audio loading failed: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failures_classified_as_unreadable() {
        let err = anyhow::anyhow!("Failed to open audio file: /x/y.mp3");
        assert!(classify_load_error(&err).starts_with("Audio file missing or unreadable"));
    }

    #[test]
    fn probe_failures_classified_as_corrupt() {
        let err = anyhow::anyhow!("Failed to probe audio file: /x/y.mp3");
        assert!(classify_load_error(&err).starts_with("Corrupt or unsupported audio file"));
    }

    #[test]
    fn unknown_failures_keep_generic_prefix() {
        let err = anyhow::anyhow!("something odd");
        assert!(classify_load_error(&err).starts_with("Audio loading failed"));
    }
}
