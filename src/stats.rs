use statrs::distribution::{ContinuousCDF, StudentsT};

/// Fit of y on x plus correlation of the same pairs
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionStats {
    pub label: String,
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub pearson: f64,
    pub spearman: f64,
    /// Two-sided p-value for slope == 1
    pub p_value: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson's r; NaN when either side has no variance or fewer than two pairs
pub fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// 1-based ranks, ties get their average rank
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

pub fn spearman_rho(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    pearson_r(&average_ranks(x), &average_ranks(y))
}

/// Ordinary least squares of y on x with a slope == 1 t-test
pub fn regress(label: &str, x: &[f64], y: &[f64]) -> RegressionStats {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    let mut stats = RegressionStats {
        label: label.to_string(),
        n,
        slope: f64::NAN,
        intercept: f64::NAN,
        r_squared: f64::NAN,
        pearson: pearson_r(x, y),
        spearman: spearman_rho(x, y),
        p_value: f64::NAN,
    };
    if n < 2 {
        return stats;
    }

    let mx = mean(x);
    let my = mean(y);
    let sxx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
    if sxx == 0.0 {
        return stats;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let syy: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let rss: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (b - (intercept + slope * a)).powi(2))
        .sum();

    stats.slope = slope;
    stats.intercept = intercept;
    stats.r_squared = if syy == 0.0 { f64::NAN } else { 1.0 - rss / syy };

    let df = n as f64 - 2.0;
    if df > 0.0 {
        let se = (rss / df / sxx).sqrt();
        stats.p_value = slope_p_value((slope - 1.0).abs(), se, df);
    }
    stats
}

fn slope_p_value(diff: f64, se: f64, df: f64) -> f64 {
    if !diff.is_finite() || !se.is_finite() {
        return f64::NAN;
    }
    if se == 0.0 {
        return if diff < 1e-12 { 1.0 } else { 0.0 };
    }
    // statrs panics on a non-finite argument
    let t = diff / se;
    if !t.is_finite() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t)),
        Err(_) => f64::NAN,
    }
}
