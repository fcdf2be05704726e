use rayon::prelude::*;

use crate::error::{AppError, AppResult};
use crate::track::Sample;

/// Signal processing switches for one run
#[derive(Debug, Clone, Copy)]
pub struct SignalOptions {
    pub normalize: bool,
    /// Moving-average window in rows; `None` disables smoothing
    pub smooth_window: Option<usize>,
}

fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Median of the finite values, `None` when there are none
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    sort_values(&mut v);
    let n = v.len();
    Some(if n % 2 == 0 {
        (v[n / 2 - 1] + v[n / 2]) / 2.0
    } else {
        v[n / 2]
    })
}

/// Divide every value by the median of all values of all samples
pub fn median_normalize(samples: &[Sample]) -> AppResult<(Vec<Sample>, f64)> {
    let all: Vec<f64> = samples
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|p| p.value))
        .collect();
    let scaling = median(&all)
        .ok_or_else(|| AppError::Validation("no values available for median normalization".into()))?;
    if scaling == 0.0 || !scaling.is_finite() {
        return Err(AppError::Validation(format!(
            "cannot normalize by a median of {}",
            scaling
        )));
    }

    let normalized = samples
        .iter()
        .map(|s| s.with_values(s.points.iter().map(|p| p.value.map(|v| v / scaling)).collect()))
        .collect();
    Ok((normalized, scaling))
}

/// Centered moving average over `window` rows, truncated at both ends.
/// Missing values are skipped inside a window; a missing point stays missing.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let left = window / 2;
    let right = window.saturating_sub(1) - left;

    (0..n)
        .map(|i| {
            values[i]?;
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(n - 1);
            let (sum, count) = values[lo..=hi]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            Some(sum / count as f64)
        })
        .collect()
}

/// Smooth one sample along its positions. Output points are sorted by position.
pub fn smooth_sample(sample: &Sample, window: usize) -> Sample {
    let mut sorted = sample.clone();
    sorted.points.sort_by_key(|p| p.position);
    let values: Vec<Option<f64>> = sorted.points.iter().map(|p| p.value).collect();
    sorted.with_values(moving_average(&values, window))
}

pub fn smooth(samples: &[Sample], window: usize) -> AppResult<Vec<Sample>> {
    if window == 0 {
        return Err(AppError::Configuration("smoothing window size must be at least 1".into()));
    }
    Ok(samples.par_iter().map(|s| smooth_sample(s, window)).collect())
}

/// Normalization first, then smoothing on the normalized values.
/// Returns the processed samples and the normalization factor if one was applied.
pub fn process(samples: &[Sample], options: &SignalOptions) -> AppResult<(Vec<Sample>, Option<f64>)> {
    let (mut current, factor) = if options.normalize {
        let (normalized, factor) = median_normalize(samples)?;
        (normalized, Some(factor))
    } else {
        (samples.to_vec(), None)
    };
    if let Some(window) = options.smooth_window {
        current = smooth(&current, window)?;
    }
    Ok((current, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Point, SeqType};
    use assert_approx_eq::assert_approx_eq;

    fn sample(id: &str, points: &[(i64, Option<f64>)]) -> Sample {
        Sample {
            id: id.to_string(),
            seq_type: SeqType::Reference,
            points: points.iter().map(|&(p, v)| Point::new(p, v)).collect(),
        }
    }

    fn values(s: &Sample) -> Vec<Option<f64>> {
        s.points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn normalization_uses_one_global_median() {
        let a = sample("a", &[(1, Some(1.0)), (2, Some(2.0)), (3, None)]);
        let b = sample("b", &[(1, Some(4.0)), (2, Some(8.0))]);
        let (out, factor) = median_normalize(&[a, b]).unwrap();
        assert_approx_eq!(factor, 3.0);
        assert_eq!(values(&out[0])[2], None);
        assert_approx_eq!(values(&out[0])[1].unwrap(), 2.0 / 3.0);
        assert_approx_eq!(values(&out[1])[1].unwrap(), 8.0 / 3.0);
    }

    #[test]
    fn normalization_rejects_zero_median() {
        let a = sample("a", &[(1, Some(0.0)), (2, Some(0.0)), (3, Some(1.0))]);
        assert!(matches!(median_normalize(&[a]), Err(AppError::Validation(_))));
        let empty = sample("e", &[(1, None)]);
        assert!(matches!(median_normalize(&[empty]), Err(AppError::Validation(_))));
    }

    #[test]
    fn moving_average_truncates_at_edges() {
        let v = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let out = moving_average(&v, 3);
        assert_eq!(out, vec![Some(1.5), Some(2.0), Some(3.0), Some(4.0), Some(4.5)]);
    }

    #[test]
    fn moving_average_even_window_leans_left() {
        let v = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        // window 4 covers i-2..=i+1
        let out = moving_average(&v, 4);
        assert_eq!(out, vec![Some(1.5), Some(2.0), Some(2.5), Some(3.0)]);
    }

    #[test]
    fn moving_average_skips_missing_values() {
        let v = vec![Some(1.0), None, Some(3.0)];
        let out = moving_average(&v, 3);
        assert_eq!(out, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn smoothing_sorts_by_position_and_window_one_is_identity() {
        let s = sample("s", &[(3, Some(3.0)), (1, Some(1.0)), (2, Some(2.0))]);
        let out = smooth_sample(&s, 1);
        let positions: Vec<i64> = out.points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(values(&out), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert!(matches!(smooth(&[s], 0), Err(AppError::Configuration(_))));
    }

    #[test]
    fn normalization_runs_before_smoothing() {
        let s = sample("s", &[(1, Some(2.0)), (2, Some(4.0)), (3, Some(6.0))]);
        let options = SignalOptions {
            normalize: true,
            smooth_window: Some(3),
        };
        let (out, factor) = process(&[s], &options).unwrap();
        assert_eq!(factor, Some(4.0));
        let v = values(&out[0]);
        assert_approx_eq!(v[0].unwrap(), 0.75);
        assert_approx_eq!(v[1].unwrap(), 1.0);
        assert_approx_eq!(v[2].unwrap(), 1.25);
    }
}
