use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::models::config::QuadrantMode;
use crate::models::observation::{Metric, Observation, Quadrant};
use crate::models::query::{SortField, SortState};
use crate::models::result::{DailyPoint, HistogramBin, QuadrantSummary, SummaryStats};

use super::aggregator::summarize_group;
use super::metrics::MetricView;
use super::quadrant::{classify_observation, Thresholds};
use super::sorter::sort_observations;

/// Observations at or above this notional count as block trades.
pub const BLOCK_NOTIONAL: f64 = 1_000_000.0;

pub fn summary_stats(
    observations: &[Observation],
    trading_days: usize,
    view: &MetricView,
) -> SummaryStats {
    let reference = summarize_group("all", observations, Metric::ReferenceGap, view);
    let timing = summarize_group("all", observations, Metric::TimingDifferential, view);

    let blocks: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.notional >= BLOCK_NOTIONAL)
        .collect();
    let block_notional: f64 = blocks.iter().map(|o| o.notional).sum();

    let unique_symbols = observations
        .iter()
        .map(|o| o.symbol.as_str())
        .collect::<HashSet<_>>()
        .len();

    SummaryStats {
        observations: reference.observations,
        unique_symbols,
        total_notional: reference.total_notional,
        total_volume: reference.total_volume,
        total_executions: reference.total_executions,
        daily_average_notional: if trading_days > 0 {
            reference.total_notional / trading_days as f64
        } else {
            0.0
        },
        mean_reference_gap: reference.simple_average,
        mean_timing_differential: timing.simple_average,
        consistency_rate: reference.consistency_rate,
        block_notional_share: if reference.total_notional > 0.0 {
            block_notional / reference.total_notional * 100.0
        } else {
            0.0
        },
        block_count: blocks.len(),
        average_block_size: if blocks.is_empty() {
            0.0
        } else {
            block_notional / blocks.len() as f64
        },
    }
}

/// Trailing mean over `window` points, unavailable until the window is full.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// One point per calendar date, zero-filled where no observation matched.
pub fn daily_series(
    observations: &[Observation],
    calendar: &[NaiveDate],
    view: &MetricView,
    window: usize,
) -> Vec<DailyPoint> {
    let mut by_date: HashMap<NaiveDate, Vec<Observation>> = HashMap::new();
    for obs in observations {
        by_date.entry(obs.trade_date).or_default().push(obs.clone());
    }

    let mut points: Vec<DailyPoint> = calendar
        .iter()
        .map(|date| {
            let rows = by_date.get(date).map(Vec::as_slice).unwrap_or(&[]);
            let rec = summarize_group("", rows, Metric::TimingDifferential, view);
            DailyPoint {
                date: *date,
                observations: rec.observations,
                total_notional: rec.total_notional,
                total_volume: rec.total_volume,
                mean_timing_differential: rec.simple_average,
                consistency_rate: rec.consistency_rate,
                notional_moving_average: None,
                timing_moving_average: None,
            }
        })
        .collect();

    let notional: Vec<f64> = points.iter().map(|p| p.total_notional).collect();
    let timing: Vec<f64> = points.iter().map(|p| p.mean_timing_differential).collect();
    let notional_ma = moving_average(&notional, window);
    let timing_ma = moving_average(&timing, window);
    for (i, point) in points.iter_mut().enumerate() {
        point.notional_moving_average = notional_ma[i];
        point.timing_moving_average = timing_ma[i];
    }
    points
}

/// Timing differential distribution; bins keyed by lower edge, ascending.
pub fn histogram(observations: &[Observation], view: &MetricView, bin_width: f64) -> Vec<HistogramBin> {
    if bin_width.is_nan() || bin_width <= 0.0 {
        return Vec::new();
    }
    let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
    for value in observations.iter().filter_map(|o| view.timing_differential(o)) {
        *bins.entry((value / bin_width).floor() as i64).or_insert(0) += 1;
    }
    bins.into_iter()
        .map(|(k, count)| HistogramBin {
            lower: k as f64 * bin_width,
            count,
        })
        .collect()
}

/// Per-quadrant breakdown. The neutral row is only produced in threshold mode.
pub fn quadrant_summary(
    observations: &[Observation],
    view: &MetricView,
    mode: QuadrantMode,
    thresholds: Thresholds,
) -> Vec<QuadrantSummary> {
    let mut groups: HashMap<Quadrant, Vec<Observation>> = HashMap::new();
    for obs in observations {
        if let Some(q) = classify_observation(obs, view, mode, thresholds) {
            groups.entry(q).or_default().push(obs.clone());
        }
    }

    Quadrant::ALL
        .into_iter()
        .filter(|q| *q != Quadrant::Neutral || mode == QuadrantMode::Threshold)
        .map(|q| {
            let rows = groups.get(&q).map(Vec::as_slice).unwrap_or(&[]);
            let gap = summarize_group(q.name(), rows, Metric::ReferenceGap, view);
            let timing = summarize_group(q.name(), rows, Metric::TimingDifferential, view);
            QuadrantSummary {
                quadrant: q,
                name: q.name().to_string(),
                observations: gap.observations,
                total_notional: gap.total_notional,
                mean_reference_gap: gap.simple_average,
                mean_timing_differential: timing.simple_average,
                consistency_rate: gap.consistency_rate,
            }
        })
        .collect()
}

/// Largest |timing differential| first; rows without the metric are skipped.
pub fn top_movers(observations: &[Observation], limit: usize) -> Vec<Observation> {
    let mut movers: Vec<Observation> = observations
        .iter()
        .filter(|o| o.metrics.timing_differential.is_some())
        .cloned()
        .collect();
    sort_observations(&mut movers, SortState::new(SortField::AbsTimingDifferential));
    movers.truncate(limit);
    movers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{date, observation, with_metrics};

    fn assert_approx(actual: f64, expected: f64, epsilon: f64, msg: &str) {
        assert!(
            (actual - expected).abs() < epsilon,
            "{}: expected {}, got {}",
            msg,
            expected,
            actual
        );
    }

    #[test]
    fn test_summary_stats() {
        let obs = vec![
            with_metrics("A", 2_000_000.0, 10.0, -4.0),
            with_metrics("A", 500_000.0, 20.0, 6.0),
            with_metrics("B", 1_500_000.0, 30.0, 1.0),
        ];
        let s = summary_stats(&obs, 2, &MetricView::raw());
        assert_eq!(s.observations, 3);
        assert_eq!(s.unique_symbols, 2);
        assert_approx(s.total_notional, 4_000_000.0, 1e-6, "total");
        assert_approx(s.daily_average_notional, 2_000_000.0, 1e-6, "daily avg");
        assert_approx(s.mean_reference_gap, 20.0, 1e-9, "mean gap");
        assert_approx(s.mean_timing_differential, 1.0, 1e-9, "mean timing");
        assert_eq!(s.block_count, 2);
        assert_approx(s.block_notional_share, 87.5, 1e-9, "block share");
        assert_approx(s.average_block_size, 1_750_000.0, 1e-6, "block size");
    }

    #[test]
    fn test_summary_of_empty_set() {
        let s = summary_stats(&[], 0, &MetricView::raw());
        assert_eq!(s.observations, 0);
        assert_eq!(s.daily_average_notional, 0.0);
        assert_eq!(s.block_notional_share, 0.0);
        assert_eq!(s.consistency_rate, 0.0);
    }

    #[test]
    fn test_moving_average() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5);
        assert_eq!(&ma[..4], &[None, None, None, None]);
        assert_approx(ma[4].unwrap(), 3.0, 1e-12, "first full window");
        assert_approx(ma[5].unwrap(), 4.0, 1e-12, "second full window");
        assert!(moving_average(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }

    #[test]
    fn test_daily_series_zero_fills() {
        let calendar = vec![date("2025-12-01"), date("2025-12-02"), date("2025-12-03")];
        let obs = vec![
            observation("A", "2025-12-01", 1e6, Some(100.0), Some(100.5), Some(101.0)),
            observation("B", "2025-12-03", 3e6, Some(100.0), Some(100.5), Some(100.0)),
        ];
        let series = daily_series(&obs, &calendar, &MetricView::raw(), 2);
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].observations, 0);
        assert_eq!(series[1].total_notional, 0.0);
        assert_eq!(series[1].consistency_rate, 0.0);
        assert_eq!(series[0].notional_moving_average, None);
        assert_approx(series[1].notional_moving_average.unwrap(), 500_000.0, 1e-6, "ma day 2");
        assert_approx(series[2].notional_moving_average.unwrap(), 1_500_000.0, 1e-6, "ma day 3");
        assert_approx(series[0].consistency_rate, 100.0, 1e-9, "day 1 consistent");
    }

    #[test]
    fn test_histogram_bins() {
        let obs = vec![
            with_metrics("A", 1.0, 0.0, -12.0),
            with_metrics("B", 1.0, 0.0, -0.5),
            with_metrics("C", 1.0, 0.0, 0.0),
            with_metrics("D", 1.0, 0.0, 9.99),
            with_metrics("E", 1.0, 0.0, 10.0),
        ];
        let bins = histogram(&obs, &MetricView::raw(), 10.0);
        let pairs: Vec<(f64, usize)> = bins.iter().map(|b| (b.lower, b.count)).collect();
        assert_eq!(pairs, vec![(-20.0, 1), (-10.0, 1), (0.0, 2), (10.0, 1)]);
    }

    #[test]
    fn test_quadrant_summary() {
        let obs = vec![
            with_metrics("A", 1e6, 20.0, 8.0),
            with_metrics("B", 2e6, 15.0, 6.0),
            with_metrics("C", 1e6, -20.0, -8.0),
            with_metrics("D", 1e6, 2.0, 1.0),
        ];
        let t = Thresholds::default();
        let zero = quadrant_summary(&obs, &MetricView::raw(), QuadrantMode::Zero, t);
        assert_eq!(zero.len(), 4);
        assert_eq!(zero[0].observations, 3);
        assert_eq!(zero[2].observations, 1);
        assert_eq!(zero.iter().map(|q| q.observations).sum::<usize>(), 4);

        let banded = quadrant_summary(&obs, &MetricView::raw(), QuadrantMode::Threshold, t);
        assert_eq!(banded.len(), 5);
        assert_eq!(banded[0].observations, 2);
        assert_approx(banded[0].mean_reference_gap, 17.5, 1e-9, "Q1 gap");
        assert_eq!(banded[4].quadrant, Quadrant::Neutral);
        assert_eq!(banded[4].observations, 1);
        assert_eq!(banded[1].observations, 0);
        assert_eq!(banded[1].mean_timing_differential, 0.0);
    }

    #[test]
    fn test_top_movers() {
        let mut none = with_metrics("N", 1e6, 0.0, 0.0);
        none.metrics.timing_differential = None;
        let obs = vec![
            with_metrics("A", 1e6, 0.0, 3.0),
            with_metrics("B", 1e6, 0.0, -40.0),
            none,
            with_metrics("C", 1e6, 0.0, 12.0),
        ];
        let top: Vec<String> = top_movers(&obs, 2).into_iter().map(|o| o.symbol).collect();
        assert_eq!(top, vec!["B", "C"]);
        assert_eq!(top_movers(&obs, 10).len(), 3);
    }
}
