use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::observation::{Observation, Quadrant};

/// Summary of one group of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub key: String,
    pub observations: usize,
    pub total_notional: f64,
    pub total_volume: f64,
    pub total_executions: u64,
    /// Distinct trade dates in the group.
    pub trading_days: usize,
    /// Σ(metric·notional) / Σ(notional) over rows where the metric is available.
    pub weighted_average: f64,
    /// Plain mean of the metric over rows where it is available.
    pub simple_average: f64,
    /// Share of directionally consistent rows, in percent.
    pub consistency_rate: f64,
    pub average_size: f64,
}

/// One page of a sorted result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed page actually returned after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-indexed position of the first row on this page (0 when empty).
    pub first_row: usize,
    /// 1-indexed position of the last row on this page (0 when empty).
    pub last_row: usize,
}

/// Numeric fields available to the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrelationField {
    Notional,
    Volume,
    ReferenceGap,
    TimingDifferential,
    Executions,
}

impl CorrelationField {
    pub const MATRIX: [CorrelationField; 5] = [
        CorrelationField::Notional,
        CorrelationField::Volume,
        CorrelationField::ReferenceGap,
        CorrelationField::TimingDifferential,
        CorrelationField::Executions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationField::Notional => "Notional",
            CorrelationField::Volume => "Volume",
            CorrelationField::ReferenceGap => "Ref Gap",
            CorrelationField::TimingDifferential => "Timing Diff",
            CorrelationField::Executions => "Executions",
        }
    }
}

/// Symmetric Pearson matrix; `values[i][j]` pairs `fields[i]` with `fields[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    pub fields: Vec<CorrelationField>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: CorrelationField, b: CorrelationField) -> Option<f64> {
        let i = self.fields.iter().position(|f| *f == a)?;
        let j = self.fields.iter().position(|f| *f == b)?;
        Some(self.values[i][j])
    }
}

/// Headline numbers for the summary view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub observations: usize,
    pub unique_symbols: usize,
    pub total_notional: f64,
    pub total_volume: f64,
    pub total_executions: u64,
    pub daily_average_notional: f64,
    pub mean_reference_gap: f64,
    pub mean_timing_differential: f64,
    pub consistency_rate: f64,
    /// Percent of notional coming from observations of at least $1M.
    pub block_notional_share: f64,
    pub block_count: usize,
    pub average_block_size: f64,
}

/// One trading date of the daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub observations: usize,
    pub total_notional: f64,
    pub total_volume: f64,
    pub mean_timing_differential: f64,
    pub consistency_rate: f64,
    /// Trailing moving averages; `None` until the window is full.
    pub notional_moving_average: Option<f64>,
    pub timing_moving_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower edge, in bps.
    pub lower: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantSummary {
    pub quadrant: Quadrant,
    pub name: String,
    pub observations: usize,
    pub total_notional: f64,
    pub mean_reference_gap: f64,
    pub mean_timing_differential: f64,
    pub consistency_rate: f64,
}

/// Everything the position popup shows for one (symbol, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDetail {
    pub observation: Observation,
    pub quadrant: Option<Quadrant>,
    pub quadrant_name: Option<String>,
    /// Values under the active metric variant.
    pub reference_gap: Option<f64>,
    pub timing_differential: Option<f64>,
}
