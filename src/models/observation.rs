use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument class of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    Stock,
    #[serde(rename = "ETF")]
    Etf,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "Stock",
            AssetType::Etf => "ETF",
        }
    }
}

/// Direction of the overnight move from prior close to next open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GapDirection {
    Up,
    Down,
}

impl GapDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapDirection::Up => "UP",
            GapDirection::Down => "DOWN",
        }
    }
}

/// Basis-point metrics derived from an observation's prices.
/// `None` means a required price was missing or a denominator was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpsMetrics {
    pub reference_gap: Option<f64>,
    pub timing_differential: Option<f64>,
    pub total_gap: Option<f64>,
    pub vs_open: Option<f64>,
    pub vs_close: Option<f64>,
}

/// One symbol's overnight trading activity on one trade date.
///
/// Built once by the decoder and never mutated afterwards; every query hands
/// out fresh copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub symbol: String,
    pub company_name: String,
    pub asset_type: AssetType,
    /// `"ETF"` or an ETF category for ETF rows, a GICS-style sector otherwise.
    pub sector: String,
    pub etf_category: Option<String>,
    /// Tag such as `"2x"` or `"-3x"`; `None` for stocks.
    pub leverage_multiple: Option<String>,
    pub trade_date: NaiveDate,
    pub notional: f64,
    pub volume: f64,
    pub executions: u64,
    pub prior_close: Option<f64>,
    pub vwap: Option<f64>,
    pub next_open: Option<f64>,
    pub next_close: Option<f64>,
    #[serde(flatten)]
    pub metrics: BpsMetrics,
    pub directional_consistency: bool,
    pub gap_direction: GapDirection,
    pub is_outlier: bool,
    /// Billions of dollars.
    pub market_cap: Option<f64>,
}

impl Observation {
    pub fn is_etf(&self) -> bool {
        self.asset_type == AssetType::Etf
    }
}

/// A derived basis-point metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    ReferenceGap,
    TimingDifferential,
    TotalGap,
    VsOpen,
    VsClose,
}

impl Metric {
    /// Raw (unclamped) value for an observation.
    pub fn raw(&self, obs: &Observation) -> Option<f64> {
        match self {
            Metric::ReferenceGap => obs.metrics.reference_gap,
            Metric::TimingDifferential => obs.metrics.timing_differential,
            Metric::TotalGap => obs.metrics.total_gap,
            Metric::VsOpen => obs.metrics.vs_open,
            Metric::VsClose => obs.metrics.vs_close,
        }
    }

    /// Column label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ReferenceGap => "Reference Gap (bps)",
            Metric::TimingDifferential => "Timing Differential (bps)",
            Metric::TotalGap => "Total Gap (bps)",
            Metric::VsOpen => "VS Next Open (bps)",
            Metric::VsClose => "VS Next Close (bps)",
        }
    }
}

/// Position of an observation on the reference-gap × timing-differential
/// plane. `Neutral` only occurs in threshold mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    Q1,
    Q2,
    Q3,
    Q4,
    Neutral,
}

impl Quadrant {
    pub const ALL: [Quadrant; 5] = [
        Quadrant::Q1,
        Quadrant::Q2,
        Quadrant::Q3,
        Quadrant::Q4,
        Quadrant::Neutral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "Momentum",
            Quadrant::Q2 => "Mean Reversion",
            Quadrant::Q3 => "Protection",
            Quadrant::Q4 => "Top Tick",
            Quadrant::Neutral => "Neutral Zone",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "Positive gap, positive timing (aligned winners)",
            Quadrant::Q2 => "Negative gap, positive timing (contrarian capture)",
            Quadrant::Q3 => "Negative gap, negative timing (aligned losers)",
            Quadrant::Q4 => "Positive gap, negative timing (leaked differential)",
            Quadrant::Neutral => "Inside the threshold band on at least one axis",
        }
    }
}
