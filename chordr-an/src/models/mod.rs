//! Data models for the analysis service

pub mod job;
pub mod result;

pub use job::{Job, JobStatus};
pub use result::{
    AnalysisResult, AudioMetadata, ChordAnalysis, ChordSegment, LyricsAnalysis, RunStatus,
    TranscriptSegment, WordTiming,
};
