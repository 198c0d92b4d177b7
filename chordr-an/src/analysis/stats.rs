//! Correlation and confidence primitives for harmonic analysis

/// Pearson correlation between two equal-length vectors.
///
/// Returns `None` when either vector is degenerate (zero variance) or the
/// computation is not finite; callers exclude such candidates from
/// consideration rather than aborting the analysis.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let a = &a[..n];
    let b = &b[..n];
    let n_f = n as f64;

    let mean_a = a.iter().sum::<f64>() / n_f;
    let mean_b = b.iter().sum::<f64>() / n_f;

    let mut cov = 0.0_f64;
    let mut var_a = 0.0_f64;
    let mut var_b = 0.0_f64;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < 1e-10 {
        return None;
    }
    let r = cov / denom;
    if r.is_finite() {
        Some(r)
    } else {
        None
    }
}

/// Global chroma-clarity confidence.
///
/// Mean over frames of (peak bin − mean bin), scaled and capped at 1.0.
/// A global quality signal, not per-chord confidence.
pub fn clarity_confidence(frames: &[[f32; 12]]) -> f64 {
    if frames.is_empty() {
        return 0.5;
    }

    let mut total = 0.0_f64;
    for frame in frames {
        let peak = frame.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as f64;
        let mean = frame.iter().map(|&v| v as f64).sum::<f64>() / 12.0;
        total += peak - mean;
    }

    let clarity = total / frames.len() as f64;
    let confidence = (clarity * 2.0).min(1.0);
    if confidence.is_finite() {
        confidence.max(0.0)
    } else {
        0.5
    }
}

/// Mean chroma vector over all frames
pub fn mean_chroma(frames: &[[f32; 12]]) -> [f64; 12] {
    let mut mean = [0.0_f64; 12];
    if frames.is_empty() {
        return mean;
    }
    for frame in frames {
        for (acc, &v) in mean.iter_mut().zip(frame.iter()) {
            *acc += v as f64;
        }
    }
    for acc in mean.iter_mut() {
        *acc /= frames.len() as f64;
    }
    mean
}

/// Normalize a chroma vector to sum to 1.
///
/// Returns `None` for all-zero or non-finite input.
pub fn normalize_chroma(chroma: &[f64; 12]) -> Option<[f64; 12]> {
    if chroma.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let sum: f64 = chroma.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    let mut out = [0.0_f64; 12];
    for (o, &v) in out.iter_mut().zip(chroma.iter()) {
        *o = v / (sum + 1e-8);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_perfect_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let r = pearson(&a, &b).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_inverse_correlation() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        let r = pearson(&a, &b).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_degenerate_excluded() {
        let flat = [1.0; 12];
        let ramp: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert!(pearson(&flat, &ramp).is_none());
    }

    #[test]
    fn pearson_nan_excluded() {
        let a = [f64::NAN, 1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        assert!(pearson(&a, &b).is_none());
    }

    #[test]
    fn normalize_rejects_zero_and_nan() {
        assert!(normalize_chroma(&[0.0; 12]).is_none());
        let mut bad = [1.0; 12];
        bad[3] = f64::NAN;
        assert!(normalize_chroma(&bad).is_none());
    }

    #[test]
    fn normalize_sums_to_one() {
        let mut chroma = [0.0; 12];
        chroma[0] = 2.0;
        chroma[4] = 2.0;
        chroma[7] = 4.0;
        let norm = normalize_chroma(&chroma).unwrap();
        let sum: f64 = norm.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clarity_capped_at_one() {
        // A single sharp peak per frame produces high clarity
        let mut frame = [0.0_f32; 12];
        frame[0] = 1.0;
        let frames = vec![frame; 10];
        let c = clarity_confidence(&frames);
        assert!(c > 0.0 && c <= 1.0);
    }

    #[test]
    fn clarity_of_silence_is_zero() {
        let frames = vec![[0.0_f32; 12]; 10];
        assert_eq!(clarity_confidence(&frames), 0.0);
    }
}
