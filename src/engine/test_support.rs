use chrono::NaiveDate;

use crate::models::observation::{AssetType, BpsMetrics, Observation};

use super::metrics::{directional_consistency, gap_direction};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A stock observation whose metrics are derived from the given prices.
pub fn observation(
    symbol: &str,
    trade_date: &str,
    notional: f64,
    prior_close: Option<f64>,
    vwap: Option<f64>,
    next_open: Option<f64>,
) -> Observation {
    let metrics = BpsMetrics::from_prices(prior_close, vwap, next_open, None);
    Observation {
        symbol: symbol.to_string(),
        company_name: format!("{} Corp", symbol),
        asset_type: AssetType::Stock,
        sector: "Technology".to_string(),
        etf_category: None,
        leverage_multiple: None,
        trade_date: date(trade_date),
        notional,
        volume: notional / 50.0,
        executions: 10,
        prior_close,
        vwap,
        next_open,
        next_close: None,
        metrics,
        directional_consistency: directional_consistency(prior_close, vwap, next_open),
        gap_direction: gap_direction(metrics.total_gap, true),
        is_outlier: false,
        market_cap: None,
    }
}

/// An observation with fixed reference gap / timing differential, independent of prices.
pub fn with_metrics(symbol: &str, notional: f64, reference_gap: f64, timing: f64) -> Observation {
    let mut obs = observation(symbol, "2025-12-01", notional, None, None, None);
    obs.metrics.reference_gap = Some(reference_gap);
    obs.metrics.timing_differential = Some(timing);
    obs
}

pub fn etf(symbol: &str, notional: f64, leverage: Option<&str>, category: &str) -> Observation {
    let mut obs = observation(symbol, "2025-12-01", notional, Some(50.0), Some(50.2), Some(50.4));
    obs.asset_type = AssetType::Etf;
    obs.sector = category.to_string();
    obs.etf_category = Some(category.to_string());
    obs.leverage_multiple = leverage.map(str::to_string);
    obs
}
