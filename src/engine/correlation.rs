use crate::models::observation::{Metric, Observation};
use crate::models::result::{CorrelationField, CorrelationMatrix};

use super::metrics::MetricView;

fn field_value(obs: &Observation, field: CorrelationField, view: &MetricView) -> Option<f64> {
    match field {
        CorrelationField::Notional => Some(obs.notional),
        CorrelationField::Volume => Some(obs.volume),
        CorrelationField::Executions => Some(obs.executions as f64),
        CorrelationField::ReferenceGap => view.value(obs, Metric::ReferenceGap),
        CorrelationField::TimingDifferential => view.value(obs, Metric::TimingDifferential),
    }
}

/// Spread below this share of the mean's magnitude is treated as rounding
/// noise on a constant series.
const RELATIVE_SPREAD_EPSILON: f64 = 1e-9;

fn is_constant(sum_sq_dev: f64, n: f64, mean: f64) -> bool {
    sum_sq_dev <= 0.0 || (sum_sq_dev / n).sqrt() <= RELATIVE_SPREAD_EPSILON * mean.abs()
}

/// Pearson coefficient over paired samples, computed on centred sums.
/// Returns 0 for fewer than two pairs or when either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let len = xs.len().min(ys.len());
    if len < 2 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..len], &ys[..len]);
    let n = len as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if is_constant(sxx, n, mean_x) || is_constant(syy, n, mean_y) {
        return 0.0;
    }
    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (sxy / denominator).clamp(-1.0, 1.0)
}

/// Correlation of two fields over the rows where both are available.
pub fn correlation(
    observations: &[Observation],
    a: CorrelationField,
    b: CorrelationField,
    view: &MetricView,
) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = observations
        .iter()
        .filter_map(|o| Some((field_value(o, a, view)?, field_value(o, b, view)?)))
        .unzip();
    pearson(&xs, &ys)
}

/// Symmetric matrix over [`CorrelationField::MATRIX`] with a unit diagonal.
pub fn correlation_matrix(observations: &[Observation], view: &MetricView) -> CorrelationMatrix {
    let fields = CorrelationField::MATRIX.to_vec();
    let k = fields.len();
    let mut values = vec![vec![0.0; k]; k];
    for i in 0..k {
        values[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = correlation(observations, fields[i], fields[j], view);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { fields, values }
}
