use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::engine::decoder;
use crate::engine::metrics::compute_bounds;
use crate::errors::AppError;
use crate::models::config::{DashboardConfig, PercentileBounds, WinsorBounds};
use crate::models::observation::Observation;
use crate::models::payload::{Meta, RawPayload};

/// The decoded, immutable snapshot every query reads from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub meta: Meta,
    /// Trading calendar from the lookup table, ascending.
    pub calendar: Vec<NaiveDate>,
    pub observations: Vec<Observation>,
    /// Effective winsorization bounds (payload first, computed otherwise).
    pub bounds: WinsorBounds,
    pub generated: Option<NaiveDateTime>,
}

impl Dataset {
    pub fn from_payload(payload: RawPayload, config: &DashboardConfig) -> Result<Self, AppError> {
        let observations = decoder::decode(&payload)?;
        let mut calendar = decoder::parse_calendar(&payload.lookup.dates)?;
        calendar.sort();
        calendar.dedup();

        let bounds = resolve_bounds(payload.meta.winsorization, &observations, config);
        let generated = payload.meta.generated.as_deref().and_then(parse_generated);

        info!(
            "Dataset ready: {} observations, {} trading days, generated {:?}",
            observations.len(),
            calendar.len(),
            generated
        );

        Ok(Dataset {
            meta: payload.meta,
            calendar,
            observations,
            bounds,
            generated,
        })
    }

    /// Parse and decode a JSON document. Malformed JSON is a load failure,
    /// structural row problems are decode errors.
    pub fn from_json_str(text: &str, config: &DashboardConfig) -> Result<Self, AppError> {
        let payload: RawPayload = serde_json::from_str(text)
            .map_err(|e| AppError::LoadFailure(format!("Invalid dataset JSON: {}", e)))?;
        Self::from_payload(payload, config)
    }

    /// Trading-day count for daily averages: the producer's figure when
    /// present, the calendar length otherwise.
    pub fn trading_days(&self) -> usize {
        if self.meta.trading_days > 0 {
            self.meta.trading_days
        } else {
            self.calendar.len()
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Keep a supplied interval only when it is usable.
fn checked(name: &str, bounds: Option<PercentileBounds>) -> Option<PercentileBounds> {
    match bounds {
        Some(b) if !b.is_valid() => {
            warn!(
                "Discarding malformed {} winsorization bounds [{}, {}]",
                name, b.p1, b.p99
            );
            None
        }
        other => other,
    }
}

/// Valid payload bounds win per metric; gaps are filled from the decoded data.
fn resolve_bounds(
    supplied: Option<WinsorBounds>,
    observations: &[Observation],
    config: &DashboardConfig,
) -> WinsorBounds {
    let supplied = supplied.unwrap_or_default();
    let supplied = WinsorBounds {
        reference_gap: checked("reference gap", supplied.reference_gap),
        timing_differential: checked("timing differential", supplied.timing_differential),
        total_gap: checked("total gap", supplied.total_gap),
    };
    if supplied.reference_gap.is_some()
        && supplied.timing_differential.is_some()
        && supplied.total_gap.is_some()
    {
        return supplied;
    }

    warn!("Winsorization bounds missing from payload, computing from data");
    let computed = compute_bounds(
        observations,
        config.lower_percentile,
        config.upper_percentile,
    );
    WinsorBounds {
        reference_gap: supplied.reference_gap.or(computed.reference_gap),
        timing_differential: supplied.timing_differential.or(computed.timing_differential),
        total_gap: supplied.total_gap.or(computed.total_gap),
    }
}

fn parse_generated(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    warn!("Unrecognised generation timestamp: {}", raw);
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::DecodeError;

    pub(crate) const SAMPLE: &str = r#"{
        "schemaVersion": 2,
        "meta": {
            "dateRange": ["2025-12-01", "2025-12-03"],
            "tradingDays": 3,
            "generated": "2025-12-04T06:30:00Z"
        },
        "lookup": {
            "symbols": ["ABC", "TQQQ", "XYZ"],
            "companies": ["Acme \"Corp\" Inc", "ProShares UltraPro QQQ", "Xyz Holdings"],
            "dates": ["2025-12-01", "2025-12-02", "2025-12-03"],
            "sectors": ["Technology", "Unknown"],
            "etfCategories": ["Leveraged Equity"]
        },
        "data": [
            [0, 0, 0, 0, 0, 100000, 2000, 5, 100, 102, 101, 103, 1, 0, null, 12.5],
            [0, 0, 1, 0, 0, 200000, 4000, 8, 101, 101.5, 102, null, 1, 0, null, 12.5],
            [0, 0, 2, 0, 0, 300000, 6000, 9, 102, 101, 100, 99, 0, 0, null, 12.5],
            [1, 1, 0, 1, 2, 5000000, 90000, 120, 80, 80.4, 80.8, 81, 1, 0, 3, null],
            [2, 2, 2, 0, 1, 50000, 1000, 2, null, 20, 20.1, null, 1, 1, null, null]
        ]
    }"#;

    #[test]
    fn test_from_json_str() {
        let ds = Dataset::from_json_str(SAMPLE, &DashboardConfig::default()).unwrap();
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.calendar.len(), 3);
        assert_eq!(ds.trading_days(), 3);
        assert!(ds.generated.is_some());
        assert_eq!(ds.observations[3].sector, "Leveraged Equity");
        assert_eq!(ds.observations[0].company_name, "Acme \"Corp\" Inc");
        // no bounds in the payload: computed from the data
        assert!(ds.bounds.reference_gap.is_some());
        assert!(ds.bounds.timing_differential.is_some());
    }

    #[test]
    fn test_payload_bounds_take_precedence() {
        let mut payload: RawPayload = serde_json::from_str(SAMPLE).unwrap();
        let supplied = PercentileBounds { p1: -1.0, p99: 1.0 };
        payload.meta.winsorization = Some(WinsorBounds {
            reference_gap: Some(supplied),
            timing_differential: None,
            total_gap: None,
        });
        let ds = Dataset::from_payload(payload, &DashboardConfig::default()).unwrap();
        assert_eq!(ds.bounds.reference_gap, Some(supplied));
        assert!(ds.bounds.timing_differential.is_some());
    }

    #[test]
    fn test_inverted_bounds_are_replaced_by_computed_ones() {
        let mut payload: RawPayload = serde_json::from_str(SAMPLE).unwrap();
        let inverted = PercentileBounds { p1: 50.0, p99: -50.0 };
        payload.meta.winsorization = Some(WinsorBounds {
            reference_gap: Some(inverted),
            timing_differential: Some(PercentileBounds { p1: f64::NAN, p99: 10.0 }),
            total_gap: Some(PercentileBounds { p1: -400.0, p99: 400.0 }),
        });
        let ds = Dataset::from_payload(payload, &DashboardConfig::default()).unwrap();

        let rg = ds.bounds.reference_gap.unwrap();
        assert_ne!(rg, inverted);
        assert!(rg.is_valid());
        assert!(ds.bounds.timing_differential.unwrap().is_valid());
        assert_eq!(
            ds.bounds.total_gap,
            Some(PercentileBounds { p1: -400.0, p99: 400.0 })
        );

        // winsorized values still spread out instead of collapsing to one bound
        let clamped: Vec<f64> = ds
            .observations
            .iter()
            .filter_map(|o| o.metrics.reference_gap)
            .map(|v| rg.clamp(v))
            .collect();
        assert!(clamped.iter().any(|v| *v != clamped[0]));
    }

    #[test]
    fn test_malformed_json_is_load_failure() {
        let err = Dataset::from_json_str("{ not json", &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::LoadFailure(_)));
    }

    #[test]
    fn test_structural_error_is_decode_error() {
        let broken = SAMPLE.replace("[2, 2, 2, 0, 1, 50000", "[7, 2, 2, 0, 1, 50000");
        let err = Dataset::from_json_str(&broken, &DashboardConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Decode(DecodeError::IndexOutOfRange { row: 4, .. })
        ));
    }

    #[test]
    fn test_trading_days_falls_back_to_calendar() {
        let mut ds = Dataset::from_json_str(SAMPLE, &DashboardConfig::default()).unwrap();
        ds.meta.trading_days = 0;
        assert_eq!(ds.trading_days(), 3);
    }

    #[test]
    fn test_parse_generated_formats() {
        assert!(parse_generated("2025-12-04T06:30:00Z").is_some());
        assert!(parse_generated("2025-12-04 06:30:00").is_some());
        assert!(parse_generated("2025-12-04").is_some());
        assert!(parse_generated("yesterday").is_none());
    }
}
