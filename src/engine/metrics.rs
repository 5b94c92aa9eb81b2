use statrs::statistics::{Data, OrderStatistics};
use tracing::warn;

use crate::models::config::{MetricVariant, PercentileBounds, WinsorBounds};
use crate::models::observation::{BpsMetrics, GapDirection, Metric, Observation};

const BPS_PER_UNIT: f64 = 10_000.0;

/// Move from `from` to `to` in basis points of `from`.
/// Unavailable when either price is missing or `from` is zero.
fn bps_change(from: Option<f64>, to: Option<f64>) -> Option<f64> {
    let from = from?;
    let to = to?;
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    Some((to - from) / from * BPS_PER_UNIT)
}

/// Prior close → overnight VWAP.
pub fn reference_gap(prior_close: Option<f64>, vwap: Option<f64>) -> Option<f64> {
    bps_change(prior_close, vwap)
}

/// Overnight VWAP → next open. Positive when the open printed above the
/// execution price. Never negated.
pub fn timing_differential(vwap: Option<f64>, next_open: Option<f64>) -> Option<f64> {
    bps_change(vwap, next_open)
}

/// Prior close → next open.
pub fn total_gap(prior_close: Option<f64>, next_open: Option<f64>) -> Option<f64> {
    bps_change(prior_close, next_open)
}

pub fn vs_open(vwap: Option<f64>, next_open: Option<f64>) -> Option<f64> {
    bps_change(vwap, next_open)
}

pub fn vs_close(vwap: Option<f64>, next_close: Option<f64>) -> Option<f64> {
    bps_change(vwap, next_close)
}

/// True iff the VWAP lies between prior close and next open (inclusive) in
/// the direction of the overnight move. A flat move counts as up.
pub fn directional_consistency(
    prior_close: Option<f64>,
    vwap: Option<f64>,
    next_open: Option<f64>,
) -> bool {
    match (prior_close, vwap, next_open) {
        (Some(prior), Some(vwap), Some(open)) => {
            if open >= prior {
                prior <= vwap && vwap <= open
            } else {
                open <= vwap && vwap <= prior
            }
        }
        _ => false,
    }
}

/// Sign of the total gap; the producer flag decides only when the gap is unavailable.
pub fn gap_direction(total_gap: Option<f64>, producer_flag_up: bool) -> GapDirection {
    match total_gap {
        Some(gap) if gap >= 0.0 => GapDirection::Up,
        Some(_) => GapDirection::Down,
        None if producer_flag_up => GapDirection::Up,
        None => GapDirection::Down,
    }
}

impl BpsMetrics {
    /// Derive every metric from one price tuple. Pure: the same prices always
    /// give the same metrics.
    pub fn from_prices(
        prior_close: Option<f64>,
        vwap: Option<f64>,
        next_open: Option<f64>,
        next_close: Option<f64>,
    ) -> Self {
        BpsMetrics {
            reference_gap: reference_gap(prior_close, vwap),
            timing_differential: timing_differential(vwap, next_open),
            total_gap: total_gap(prior_close, next_open),
            vs_open: vs_open(vwap, next_open),
            vs_close: vs_close(vwap, next_close),
        }
    }
}

/// Clamp into the bounds when there are any.
pub fn winsorize(value: f64, bounds: Option<PercentileBounds>) -> f64 {
    match bounds {
        Some(b) => b.clamp(value),
        None => value,
    }
}

/// Percentile bounds of each winsorizable metric over the full dataset.
pub fn compute_bounds(observations: &[Observation], lower: usize, upper: usize) -> WinsorBounds {
    let collect = |metric: Metric| -> Option<PercentileBounds> {
        let values: Vec<f64> = observations
            .iter()
            .filter_map(|o| metric.raw(o))
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            warn!("No {:?} values available, leaving the metric unclamped", metric);
            return None;
        }
        let mut data = Data::new(values);
        Some(PercentileBounds {
            p1: data.percentile(lower),
            p99: data.percentile(upper),
        })
    };

    WinsorBounds {
        reference_gap: collect(Metric::ReferenceGap),
        timing_differential: collect(Metric::TimingDifferential),
        total_gap: collect(Metric::TotalGap),
    }
}

/// Reads metrics under the session's active variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricView {
    pub variant: MetricVariant,
    pub bounds: WinsorBounds,
}

impl MetricView {
    pub fn new(variant: MetricVariant, bounds: WinsorBounds) -> Self {
        Self { variant, bounds }
    }

    /// A view that always returns raw values.
    pub fn raw() -> Self {
        Self::new(MetricVariant::Raw, WinsorBounds::default())
    }

    fn bounds_for(&self, metric: Metric) -> Option<PercentileBounds> {
        match metric {
            Metric::ReferenceGap => self.bounds.reference_gap,
            Metric::TimingDifferential => self.bounds.timing_differential,
            Metric::TotalGap => self.bounds.total_gap,
            Metric::VsOpen | Metric::VsClose => None,
        }
    }

    pub fn value(&self, obs: &Observation, metric: Metric) -> Option<f64> {
        let raw = metric.raw(obs)?;
        match self.variant {
            MetricVariant::Raw => Some(raw),
            MetricVariant::Winsorized => Some(winsorize(raw, self.bounds_for(metric))),
        }
    }

    pub fn reference_gap(&self, obs: &Observation) -> Option<f64> {
        self.value(obs, Metric::ReferenceGap)
    }

    pub fn timing_differential(&self, obs: &Observation) -> Option<f64> {
        self.value(obs, Metric::TimingDifferential)
    }
}
