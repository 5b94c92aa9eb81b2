use crate::models::config::{DashboardConfig, QuadrantMode};
use crate::models::observation::{Observation, Quadrant};

use super::metrics::MetricView;

/// Band widths used in threshold mode, in bps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub reference_gap: f64,
    pub timing: f64,
}

impl Thresholds {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            reference_gap: config.reference_gap_threshold,
            timing: config.timing_threshold,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

/// Which side of the axis a value falls on. `None` is inside the band.
fn side(value: f64, band: f64) -> Option<bool> {
    if value >= band {
        Some(true)
    } else if value <= -band {
        Some(false)
    } else {
        None
    }
}

/// Pure classification of a (reference gap, timing differential) pair.
///
/// Zero mode is total: zero counts as positive on both axes. Threshold mode
/// requires each axis to clear its band, otherwise the pair is `Neutral`.
pub fn classify(reference_gap: f64, timing: f64, mode: QuadrantMode, t: Thresholds) -> Quadrant {
    let (gap_up, timing_up) = match mode {
        QuadrantMode::Zero => (reference_gap >= 0.0, timing >= 0.0),
        QuadrantMode::Threshold => {
            match (side(reference_gap, t.reference_gap), side(timing, t.timing)) {
                (Some(g), Some(td)) => (g, td),
                _ => return Quadrant::Neutral,
            }
        }
    };
    match (gap_up, timing_up) {
        (true, true) => Quadrant::Q1,
        (false, true) => Quadrant::Q2,
        (false, false) => Quadrant::Q3,
        (true, false) => Quadrant::Q4,
    }
}

/// Classify under the active metric variant. `None` when either metric is
/// unavailable for the observation.
pub fn classify_observation(
    obs: &Observation,
    view: &MetricView,
    mode: QuadrantMode,
    t: Thresholds,
) -> Option<Quadrant> {
    let gap = view.reference_gap(obs)?;
    let timing = view.timing_differential(obs)?;
    Some(classify(gap, timing, mode, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{observation, with_metrics};
    use crate::models::config::{MetricVariant, PercentileBounds, WinsorBounds};

    #[test]
    fn test_zero_mode_signs() {
        let t = Thresholds::default();
        assert_eq!(classify(12.0, 3.0, QuadrantMode::Zero, t), Quadrant::Q1);
        assert_eq!(classify(-12.0, 3.0, QuadrantMode::Zero, t), Quadrant::Q2);
        assert_eq!(classify(-12.0, -3.0, QuadrantMode::Zero, t), Quadrant::Q3);
        assert_eq!(classify(12.0, -3.0, QuadrantMode::Zero, t), Quadrant::Q4);
        // zero is non-negative
        assert_eq!(classify(0.0, 0.0, QuadrantMode::Zero, t), Quadrant::Q1);
        assert_eq!(classify(0.0, -0.1, QuadrantMode::Zero, t), Quadrant::Q4);
    }

    #[test]
    fn test_zero_mode_is_total() {
        let t = Thresholds::default();
        for gap in [-500.0, -10.0, -0.01, 0.0, 0.01, 9.9, 700.0] {
            for timing in [-80.0, -5.0, 0.0, 4.9, 60.0] {
                assert_ne!(classify(gap, timing, QuadrantMode::Zero, t), Quadrant::Neutral);
            }
        }
    }

    #[test]
    fn test_threshold_mode_bands() {
        let t = Thresholds::default();
        let m = QuadrantMode::Threshold;
        assert_eq!(classify(10.0, 5.0, m, t), Quadrant::Q1);
        assert_eq!(classify(-10.0, 5.0, m, t), Quadrant::Q2);
        assert_eq!(classify(-10.0, -5.0, m, t), Quadrant::Q3);
        assert_eq!(classify(10.0, -5.0, m, t), Quadrant::Q4);
        assert_eq!(classify(9.99, 50.0, m, t), Quadrant::Neutral);
        assert_eq!(classify(-50.0, 4.0, m, t), Quadrant::Neutral);
        assert_eq!(classify(0.0, 0.0, m, t), Quadrant::Neutral);
    }

    #[test]
    fn test_unavailable_metrics_are_unclassified() {
        let obs = observation("AAA", "2025-12-01", 1e6, Some(100.0), Some(101.0), None);
        let view = MetricView::raw();
        assert_eq!(
            classify_observation(&obs, &view, QuadrantMode::Zero, Thresholds::default()),
            None
        );
    }

    #[test]
    fn test_variant_switch_reclassifies() {
        // raw reference gap 40 bps, clamped to 8 in the winsorized view
        let obs = with_metrics("AAA", 1e6, 40.0, 20.0);
        let bounds = WinsorBounds {
            reference_gap: Some(PercentileBounds { p1: -8.0, p99: 8.0 }),
            ..WinsorBounds::default()
        };
        let t = Thresholds::default();
        let raw = MetricView::new(MetricVariant::Raw, bounds);
        let wins = MetricView::new(MetricVariant::Winsorized, bounds);
        assert_eq!(
            classify_observation(&obs, &raw, QuadrantMode::Threshold, t),
            Some(Quadrant::Q1)
        );
        assert_eq!(
            classify_observation(&obs, &wins, QuadrantMode::Threshold, t),
            Some(Quadrant::Neutral)
        );
    }
}
