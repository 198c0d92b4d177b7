//! Chord progression detection and temporal smoothing

use super::stats::{normalize_chroma, pearson};
use super::templates::TemplateBank;
use crate::models::ChordSegment;

/// Label used when no template clears the correlation threshold
pub const NO_CHORD: &str = "N";

/// Match one chroma vector against the full template bank.
///
/// Returns the winning label and its correlation. All-zero or NaN chroma,
/// or no template clearing `threshold`, yields ("N", 0.0). Degenerate
/// per-candidate correlations are excluded from consideration.
pub fn match_template(
    chroma: &[f64; 12],
    bank: &TemplateBank,
    threshold: f64,
) -> (String, f64) {
    let Some(normalized) = normalize_chroma(chroma) else {
        return (NO_CHORD.to_string(), 0.0);
    };

    let mut best_correlation = -1.0_f64;
    let mut best_label = NO_CHORD.to_string();

    for template in bank.templates() {
        if let Some(r) = pearson(&normalized, &template.mask) {
            if r > best_correlation {
                best_correlation = r;
                best_label = template.label();
            }
        }
    }

    if best_correlation < threshold {
        return (NO_CHORD.to_string(), 0.0);
    }

    // Clamp to non-negative finite; the winner cleared the threshold so
    // this only guards the exported value
    let confidence = if best_correlation.is_finite() {
        best_correlation.max(0.0)
    } else {
        0.0
    };

    (best_label, confidence)
}

/// Partition the chroma sequence into fixed-length segments and match
/// each against the template bank.
pub fn detect_progression(
    frames: &[[f32; 12]],
    sample_rate: u32,
    hop_length: usize,
    segment_seconds: f64,
    bank: &TemplateBank,
    threshold: f64,
) -> Vec<ChordSegment> {
    let mut progression = Vec::new();
    if frames.is_empty() || sample_rate == 0 || hop_length == 0 {
        return progression;
    }

    let segment_frames =
        ((segment_seconds * sample_rate as f64 / hop_length as f64) as usize).max(1);

    for (chunk_idx, chunk) in frames.chunks(segment_frames).enumerate() {
        let mut mean = [0.0_f64; 12];
        for frame in chunk {
            for (acc, &v) in mean.iter_mut().zip(frame.iter()) {
                *acc += v as f64;
            }
        }
        for acc in mean.iter_mut() {
            *acc /= chunk.len() as f64;
        }

        let (chord, confidence) = match_template(&mean, bank, threshold);

        let start_frame = chunk_idx * segment_frames;
        let time_seconds = start_frame as f64 * hop_length as f64 / sample_rate as f64;

        progression.push(ChordSegment {
            time_seconds: if time_seconds.is_finite() {
                time_seconds
            } else {
                0.0
            },
            chord,
            confidence,
        });
    }

    progression
}

/// Collapse spurious rapid chord flicker.
///
/// Drops any segment that repeats the preceding retained label, or that
/// changes label less than `min_duration` seconds after the preceding
/// retained segment. The final segment is always retained. Idempotent.
pub fn smooth(progression: &[ChordSegment], min_duration: f64) -> Vec<ChordSegment> {
    if progression.len() <= 1 {
        return progression.to_vec();
    }

    let mut smoothed: Vec<ChordSegment> = vec![progression[0].clone()];

    for (i, segment) in progression.iter().enumerate().skip(1) {
        let last = smoothed.last().unwrap();
        let gap = segment.time_seconds - last.time_seconds;
        let changed = segment.chord != last.chord;

        if (changed && gap >= min_duration) || i == progression.len() - 1 {
            smoothed.push(segment.clone());
        }
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(time: f64, chord: &str) -> ChordSegment {
        ChordSegment {
            time_seconds: time,
            chord: chord.to_string(),
            confidence: 0.8,
        }
    }

    #[test]
    fn zero_chroma_matches_no_chord() {
        let bank = TemplateBank::new();
        let (label, conf) = match_template(&[0.0; 12], &bank, 0.6);
        assert_eq!(label, NO_CHORD);
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn nan_chroma_matches_no_chord() {
        let bank = TemplateBank::new();
        let mut chroma = [0.5; 12];
        chroma[2] = f64::NAN;
        let (label, conf) = match_template(&chroma, &bank, 0.6);
        assert_eq!(label, NO_CHORD);
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn exact_masks_match_their_template() {
        // Feeding each template's own mask must recover its label with
        // correlation comfortably above the threshold
        let bank = TemplateBank::new();
        for template in bank.templates() {
            let (label, conf) = match_template(&template.mask, &bank, 0.6);
            assert_eq!(label, template.label());
            assert!(conf >= 0.6, "{}: {}", template.label(), conf);
        }
    }

    #[test]
    fn weak_match_labelled_no_chord() {
        let bank = TemplateBank::new();
        // Near-uniform chroma with a slight tilt: correlates weakly with
        // every triad mask
        let mut chroma = [1.0_f64; 12];
        chroma[0] = 1.05;
        let (label, conf) = match_template(&chroma, &bank, 0.6);
        assert_eq!(label, NO_CHORD);
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn progression_segment_times() {
        // 2-second segments at 22050 Hz / hop 512 => 86 frames per segment
        let mut frame = [0.0_f32; 12];
        frame[0] = 1.0;
        frame[4] = 1.0;
        frame[7] = 1.0;
        let frames = vec![frame; 200];

        let bank = TemplateBank::new();
        let progression = detect_progression(&frames, 22050, 512, 2.0, &bank, 0.6);
        assert_eq!(progression.len(), 3); // 86 + 86 + 28 frames
        assert_eq!(progression[0].time_seconds, 0.0);
        assert!((progression[1].time_seconds - 86.0 * 512.0 / 22050.0).abs() < 1e-9);
        for segment in &progression {
            assert_eq!(segment.chord, "C");
        }
    }

    #[test]
    fn smoothing_drops_repeats_and_flicker() {
        let raw = vec![
            seg(0.0, "C"),
            seg(0.4, "G"),  // flicker: changes after 0.4s < 1.0s
            seg(2.0, "C"),  // repeat of retained "C"
            seg(4.0, "F"),  // legitimate change
            seg(6.0, "F"),  // final segment, always retained
        ];
        let smoothed = smooth(&raw, 1.0);
        let labels: Vec<&str> = smoothed.iter().map(|s| s.chord.as_str()).collect();
        assert_eq!(labels, vec!["C", "F", "F"]);
    }

    #[test]
    fn smoothing_is_idempotent() {
        let raw = vec![
            seg(0.0, "C"),
            seg(0.5, "D"),
            seg(2.0, "G"),
            seg(2.3, "A"),
            seg(4.0, "Em"),
        ];
        let once = smooth(&raw, 1.0);
        let twice = smooth(&once, 1.0);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.chord, b.chord);
            assert_eq!(a.time_seconds, b.time_seconds);
        }
    }

    #[test]
    fn single_segment_unchanged() {
        let raw = vec![seg(0.0, "C")];
        let smoothed = smooth(&raw, 1.0);
        assert_eq!(smoothed.len(), 1);
        assert_eq!(smoothed[0].chord, "C");
    }

    #[test]
    fn last_segment_always_retained() {
        let raw = vec![seg(0.0, "C"), seg(0.1, "G")];
        let smoothed = smooth(&raw, 1.0);
        assert_eq!(smoothed.last().unwrap().chord, "G");

        let raw = vec![seg(0.0, "C"), seg(2.0, "G"), seg(2.1, "C")];
        let smoothed = smooth(&raw, 1.0);
        assert_eq!(smoothed.last().unwrap().chord, "C");
    }

    #[test]
    fn empty_progression_stays_empty() {
        assert!(smooth(&[], 1.0).is_empty());
    }
}
