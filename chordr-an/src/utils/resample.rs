//! Mono resampling via rubato sinc interpolation

use anyhow::{Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Resample a mono signal to `target_rate`.
///
/// Uses sinc interpolation with a BlackmanHarris2 window, 256-tap filter
/// and 0.95 cutoff to prevent aliasing. Single-pass: the chunk size is
/// the input length.
pub fn resample_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 || target_rate == 0 {
        anyhow::bail!("Invalid sample rate: {} -> {}", source_rate, target_rate);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let resample_ratio = target_rate as f64 / source_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(
        resample_ratio,
        4.0, // max ratio headroom (44.1k -> 16k and 8k -> 22.05k both fit)
        params,
        samples.len(),
        1,
    )
    .context("Failed to create rubato resampler")?;

    let input = vec![samples.to_vec()];
    let mut output = resampler
        .process(&input, None)
        .context("Rubato resampling failed")?;

    let resampled = output.pop().unwrap_or_default();

    tracing::debug!(
        input_frames = samples.len(),
        output_frames = resampled.len(),
        source_rate,
        target_rate,
        "Resampling complete"
    );

    Ok(resampled)
}
