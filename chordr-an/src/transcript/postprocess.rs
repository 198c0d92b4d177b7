//! Transcript confidence filtering and formatting
//!
//! Raw transcriber output carries per-word probabilities; low-confidence
//! segments and words are hallucination-prone and get dropped here before
//! the lyrics block is assembled.

use crate::extractors::{RawSegment, RawWord};
use crate::models::{TranscriptSegment, WordTiming};

/// Filtering thresholds for raw transcription output
#[derive(Debug, Clone, Copy)]
pub struct PostprocessConfig {
    /// Segments at or below this confidence are dropped
    pub min_segment_confidence: f64,
    /// Words at or below this confidence are dropped
    pub min_word_confidence: f64,
    /// Confidence assigned to segments without word-level probabilities
    pub default_segment_confidence: f64,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            min_segment_confidence: 0.2,
            min_word_confidence: 0.1,
            default_segment_confidence: 0.7,
        }
    }
}

/// Confidence of one raw segment: mean word probability, or the default
/// when the transcriber produced no word-level data.
pub fn segment_confidence(segment: &RawSegment, config: &PostprocessConfig) -> f64 {
    match segment.words.as_deref() {
        Some(words) if !words.is_empty() => {
            words.iter().map(|w| w.probability).sum::<f64>() / words.len() as f64
        }
        _ => config.default_segment_confidence,
    }
}

/// Apply segment- and word-level confidence filtering.
///
/// A segment survives when its confidence is strictly above the segment
/// threshold. Within a surviving segment, words survive when strictly
/// above the word threshold and not pure whitespace; a segment that had
/// word data but loses every word is dropped entirely.
pub fn filter_segments(raw: &[RawSegment], config: &PostprocessConfig) -> Vec<TranscriptSegment> {
    let mut kept = Vec::new();

    for segment in raw {
        let confidence = segment_confidence(segment, config);
        if confidence <= config.min_segment_confidence {
            continue;
        }

        let words = match segment.words.as_deref() {
            Some(raw_words) => {
                let filtered: Vec<WordTiming> = raw_words
                    .iter()
                    .filter(|w| w.probability > config.min_word_confidence)
                    .filter(|w| !w.word.trim().is_empty())
                    .map(word_timing)
                    .collect();
                if filtered.is_empty() {
                    // All words rejected: the segment text is untrustworthy
                    continue;
                }
                Some(filtered)
            }
            None => None,
        };

        // Timestamps are rounded for display; confidences are stored
        // unrounded so a value just above a threshold stays above it
        kept.push(TranscriptSegment {
            start_seconds: round2(segment.start),
            end_seconds: round2(segment.end),
            text: segment.text.trim().to_string(),
            confidence,
            words,
        });
    }

    kept
}

/// Duration-weighted mean confidence over surviving segments.
///
/// Zero-length segments contribute nothing; returns 0.0 when no segment
/// survives or all have zero duration.
pub fn aggregate_confidence(segments: &[TranscriptSegment]) -> f64 {
    let total_duration: f64 = segments
        .iter()
        .map(|s| (s.end_seconds - s.start_seconds).max(0.0))
        .sum();
    if total_duration <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = segments
        .iter()
        .map(|s| s.confidence * (s.end_seconds - s.start_seconds).max(0.0))
        .sum();
    weighted / total_duration
}

/// Transcript duration: end timestamp of the last surviving segment
pub fn total_duration(segments: &[TranscriptSegment]) -> f64 {
    segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
}

/// Render `[MM:SS - MM:SS] text` lines for display; `None` when nothing
/// survived filtering.
pub fn format_timestamped(segments: &[TranscriptSegment]) -> Option<String> {
    if segments.is_empty() {
        return None;
    }
    let lines: Vec<String> = segments
        .iter()
        .map(|s| {
            format!(
                "[{} - {}] {}",
                format_timestamp(s.start_seconds),
                format_timestamp(s.end_seconds),
                s.text
            )
        })
        .collect();
    Some(lines.join("\n"))
}

fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn word_timing(word: &RawWord) -> WordTiming {
    WordTiming {
        word: word.word.trim().to_string(),
        start_seconds: round2(word.start),
        end_seconds: round2(word.end),
        confidence: word.probability,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64, probability: f64) -> RawWord {
        RawWord {
            word: text.to_string(),
            start,
            end,
            probability,
        }
    }

    fn segment(start: f64, end: f64, text: &str, words: Option<Vec<RawWord>>) -> RawSegment {
        RawSegment {
            start,
            end,
            text: text.to_string(),
            words,
        }
    }

    #[test]
    fn wordless_segment_gets_default_confidence() {
        let config = PostprocessConfig::default();
        let seg = segment(0.0, 2.0, "hello there", None);
        assert!((segment_confidence(&seg, &config) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_mean_word_probability() {
        let config = PostprocessConfig::default();
        let seg = segment(
            0.0,
            2.0,
            "two words",
            Some(vec![word("two", 0.0, 1.0, 0.8), word("words", 1.0, 2.0, 0.4)]),
        );
        assert!((segment_confidence(&seg, &config) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_segment_dropped() {
        let config = PostprocessConfig::default();
        let raw = vec![
            segment(0.0, 2.0, "noise", Some(vec![word("noise", 0.0, 2.0, 0.1)])),
            segment(2.0, 4.0, "real lyrics", Some(vec![word("real", 2.0, 3.0, 0.9), word("lyrics", 3.0, 4.0, 0.9)])),
        ];
        let kept = filter_segments(&raw, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "real lyrics");
    }

    #[test]
    fn threshold_is_strict() {
        let config = PostprocessConfig::default();
        // Exactly at the segment threshold: dropped, not kept
        let raw = vec![segment(0.0, 2.0, "edge", Some(vec![word("edge", 0.0, 2.0, 0.2)]))];
        assert!(filter_segments(&raw, &config).is_empty());
    }

    #[test]
    fn low_confidence_words_dropped_within_segment() {
        let config = PostprocessConfig::default();
        let raw = vec![segment(
            0.0,
            3.0,
            "keep drop keep",
            Some(vec![
                word("keep", 0.0, 1.0, 0.9),
                word("drop", 1.0, 2.0, 0.05),
                word("keep", 2.0, 3.0, 0.9),
            ]),
        )];
        let kept = filter_segments(&raw, &config);
        let words = kept[0].words.as_ref().unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| w.word == "keep"));
    }

    #[test]
    fn whitespace_words_dropped() {
        let config = PostprocessConfig::default();
        let raw = vec![segment(
            0.0,
            2.0,
            "hm",
            Some(vec![word("  ", 0.0, 1.0, 0.9), word("hm", 1.0, 2.0, 0.9)]),
        )];
        let kept = filter_segments(&raw, &config);
        assert_eq!(kept[0].words.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn segment_losing_all_words_is_dropped() {
        let config = PostprocessConfig::default();
        // Segment confidence passes (0.7 avg clears 0.2) but every word
        // fails the word threshold or is whitespace
        let raw = vec![segment(
            0.0,
            2.0,
            "ghost",
            Some(vec![word(" ", 0.0, 1.0, 0.9), word("ghost", 1.0, 2.0, 0.05)]),
        )];
        assert!(filter_segments(&raw, &config).is_empty());
    }

    #[test]
    fn emitted_confidences_stay_above_thresholds() {
        let config = PostprocessConfig::default();
        // Raw confidences just above each threshold must not be rounded
        // back down onto it in the output
        let raw = vec![segment(
            0.0,
            2.0,
            "edge case",
            Some(vec![
                word("edge", 0.0, 1.0, 0.304),
                word("case", 1.0, 2.0, 0.104),
            ]),
        )];
        let kept = filter_segments(&raw, &config);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].confidence > config.min_segment_confidence);
        assert!((kept[0].confidence - 0.204).abs() < 1e-9);
        let words = kept[0].words.as_ref().unwrap();
        assert_eq!(words.len(), 2);
        for w in words {
            assert!(w.confidence > config.min_word_confidence);
        }
        assert!((words[1].confidence - 0.104).abs() < 1e-9);
    }

    #[test]
    fn aggregate_is_duration_weighted() {
        let segments = vec![
            TranscriptSegment {
                start_seconds: 0.0,
                end_seconds: 3.0,
                text: "long".to_string(),
                confidence: 0.9,
                words: None,
            },
            TranscriptSegment {
                start_seconds: 3.0,
                end_seconds: 4.0,
                text: "short".to_string(),
                confidence: 0.5,
                words: None,
            },
        ];
        // (0.9*3 + 0.5*1) / 4 = 0.8
        assert!((aggregate_confidence(&segments) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate_confidence(&[]), 0.0);
    }

    #[test]
    fn duration_is_last_segment_end() {
        let segments = vec![TranscriptSegment {
            start_seconds: 10.0,
            end_seconds: 42.5,
            text: "x".to_string(),
            confidence: 0.7,
            words: None,
        }];
        assert!((total_duration(&segments) - 42.5).abs() < 1e-9);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn timestamped_formatting() {
        let segments = vec![
            TranscriptSegment {
                start_seconds: 0.0,
                end_seconds: 4.5,
                text: "first line".to_string(),
                confidence: 0.8,
                words: None,
            },
            TranscriptSegment {
                start_seconds: 65.0,
                end_seconds: 70.0,
                text: "second line".to_string(),
                confidence: 0.8,
                words: None,
            },
        ];
        let formatted = format_timestamped(&segments).unwrap();
        assert_eq!(formatted, "[00:00 - 00:04] first line\n[01:05 - 01:10] second line");
        assert!(format_timestamped(&[]).is_none());
    }
}
