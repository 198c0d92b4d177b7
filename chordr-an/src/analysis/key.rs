//! Key estimation via Krumhansl-Schmuckler profile correlation

use super::stats::{mean_chroma, normalize_chroma, pearson};
use super::templates::NOTE_NAMES;

/// Krumhansl-Schmuckler major key profile (perceptual pitch-class weights)
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor key profile
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Estimate the musical key from a chroma sequence.
///
/// Averages the chroma over time, normalizes, and correlates against the
/// 12 cyclic rotations of the major profile followed by the 12 minor
/// rotations. The rotation/mode with the highest finite correlation wins;
/// ties go to the first candidate evaluated (majors before minors).
/// All-zero or NaN chroma yields "Unknown".
pub fn estimate_key(frames: &[[f32; 12]]) -> String {
    let mean = mean_chroma(frames);
    let Some(normalized) = normalize_chroma(&mean) else {
        return "Unknown".to_string();
    };

    let mut best_correlation = -1.0_f64;
    let mut best_key = "C major".to_string();

    for (profile, mode) in [(&MAJOR_PROFILE, "major"), (&MINOR_PROFILE, "minor")] {
        for root in 0..12 {
            let rotated = rotate(profile, root);
            // Non-finite or degenerate correlations never win
            if let Some(r) = pearson(&normalized, &rotated) {
                if r > best_correlation {
                    best_correlation = r;
                    best_key = format!("{} {}", NOTE_NAMES[root], mode);
                }
            }
        }
    }

    best_key
}

/// Cyclic right-rotation: output[i] = profile[(i - shift) mod 12]
fn rotate(profile: &[f64; 12], shift: usize) -> [f64; 12] {
    let mut out = [0.0_f64; 12];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = profile[(i + 12 - shift) % 12];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_from(chroma: [f32; 12], count: usize) -> Vec<[f32; 12]> {
        vec![chroma; count]
    }

    #[test]
    fn silence_is_unknown() {
        assert_eq!(estimate_key(&frames_from([0.0; 12], 20)), "Unknown");
    }

    #[test]
    fn nan_chroma_is_unknown() {
        let mut chroma = [0.5_f32; 12];
        chroma[5] = f32::NAN;
        assert_eq!(estimate_key(&frames_from(chroma, 5)), "Unknown");
    }

    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(estimate_key(&[]), "Unknown");
    }

    #[test]
    fn major_profile_recovers_its_own_key() {
        // Feed the C-rotated major profile back in; C major must win
        let mut chroma = [0.0_f32; 12];
        for (i, &w) in MAJOR_PROFILE.iter().enumerate() {
            chroma[i] = w as f32;
        }
        assert_eq!(estimate_key(&frames_from(chroma, 10)), "C major");
    }

    #[test]
    fn rotated_major_profile_recovers_shifted_key() {
        // Shift the major profile up 7 semitones: G major
        let mut chroma = [0.0_f32; 12];
        for i in 0..12 {
            chroma[i] = MAJOR_PROFILE[(i + 12 - 7) % 12] as f32;
        }
        assert_eq!(estimate_key(&frames_from(chroma, 10)), "G major");
    }

    #[test]
    fn minor_profile_recovers_minor_key() {
        let mut chroma = [0.0_f32; 12];
        for i in 0..12 {
            chroma[i] = MINOR_PROFILE[(i + 12 - 9) % 12] as f32;
        }
        assert_eq!(estimate_key(&frames_from(chroma, 10)), "A minor");
    }
}
