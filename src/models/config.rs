use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Which flavour of the basis-point metrics feeds charts and classification.
/// Raw values stay authoritative for tables and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricVariant {
    #[default]
    Winsorized,
    Raw,
}

/// How observations are assigned to quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadrantMode {
    /// Sign of each axis decides; every observation lands in Q1-Q4.
    #[default]
    Zero,
    /// Both axes must clear their threshold, otherwise the observation is neutral.
    Threshold,
}

/// Clamp interval for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBounds {
    pub p1: f64,
    pub p99: f64,
}

impl PercentileBounds {
    /// Both bounds finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.p1.is_finite() && self.p99.is_finite() && self.p1 <= self.p99
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.p1).min(self.p99)
    }
}

/// Dataset-wide winsorization bounds, one interval per winsorizable metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinsorBounds {
    #[serde(default)]
    pub reference_gap: Option<PercentileBounds>,
    #[serde(default)]
    pub timing_differential: Option<PercentileBounds>,
    #[serde(default)]
    pub total_gap: Option<PercentileBounds>,
}

/// Tunables for the dashboard core. Loaded from JSON or taken from `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Rows per explorer page.
    pub page_size: usize,
    /// Minimum |reference gap| in threshold quadrant mode (bps).
    pub reference_gap_threshold: f64,
    /// Minimum |timing differential| in threshold quadrant mode (bps).
    pub timing_threshold: f64,
    /// Lower percentile used when bounds must be computed at load.
    pub lower_percentile: usize,
    /// Upper percentile used when bounds must be computed at load.
    pub upper_percentile: usize,
    /// Trailing window for daily moving averages.
    pub moving_average_window: usize,
    /// Histogram bin width (bps).
    pub histogram_bin_width: f64,
    /// Rows returned by the top-movers query.
    pub top_movers_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            reference_gap_threshold: 10.0,
            timing_threshold: 5.0,
            lower_percentile: 1,
            upper_percentile: 99,
            moving_average_window: 5,
            histogram_bin_width: 10.0,
            top_movers_limit: 100,
        }
    }
}

impl DashboardConfig {
    /// Read a config file; missing keys fall back to the defaults.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidConfig(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 {
            return Err(AppError::InvalidConfig("page size must be positive".into()));
        }
        if self.moving_average_window == 0 {
            return Err(AppError::InvalidConfig(
                "moving average window must be positive".into(),
            ));
        }
        if self.histogram_bin_width.is_nan() || self.histogram_bin_width <= 0.0 {
            return Err(AppError::InvalidConfig(
                "histogram bin width must be positive".into(),
            ));
        }
        if self.reference_gap_threshold < 0.0 || self.timing_threshold < 0.0 {
            return Err(AppError::InvalidConfig(
                "quadrant thresholds must be non-negative".into(),
            ));
        }
        if self.lower_percentile >= self.upper_percentile || self.upper_percentile > 100 {
            return Err(AppError::InvalidConfig(format!(
                "invalid percentile range {}..{}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DashboardConfig = serde_json::from_str(r#"{"pageSize": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.timing_threshold, 5.0);
        assert_eq!(config.moving_average_window, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DashboardConfig::default();
        config.page_size = 0;
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        let mut config = DashboardConfig::default();
        config.lower_percentile = 99;
        config.upper_percentile = 1;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.histogram_bin_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{"topMoversLimit": 10}"#).unwrap();
        let config = DashboardConfig::from_path(&path).unwrap();
        assert_eq!(config.top_movers_limit, 10);

        let missing = dir.path().join("missing.json");
        assert!(DashboardConfig::from_path(&missing).is_err());
    }

    #[test]
    fn test_percentile_bounds_validity() {
        assert!(PercentileBounds { p1: -5.0, p99: 5.0 }.is_valid());
        assert!(PercentileBounds { p1: 3.0, p99: 3.0 }.is_valid());
        assert!(!PercentileBounds { p1: 50.0, p99: -50.0 }.is_valid());
        assert!(!PercentileBounds { p1: f64::NAN, p99: 5.0 }.is_valid());
        assert!(!PercentileBounds { p1: -5.0, p99: f64::INFINITY }.is_valid());
    }

    #[test]
    fn test_percentile_clamp() {
        let b = PercentileBounds { p1: -50.0, p99: 80.0 };
        assert_eq!(b.clamp(-120.0), -50.0);
        assert_eq!(b.clamp(100.0), 80.0);
        assert_eq!(b.clamp(12.5), 12.5);
    }
}
