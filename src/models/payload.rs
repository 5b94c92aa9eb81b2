use serde::{Deserialize, Serialize};

use super::config::WinsorBounds;

/// Row schema version this crate decodes. Bumped whenever the column order
/// or the sector encoding changes.
pub const SCHEMA_VERSION: u32 = 2;

/// Placeholder the producer uses for symbols without a sector.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Sector assigned to ETF rows that carry no ETF category.
pub const ETF_SECTOR: &str = "ETF";

/// Ordered column names of one encoded row.
pub const ROW_SCHEMA: [&str; 16] = [
    "symbol",
    "company",
    "date",
    "assetType",
    "sector",
    "notional",
    "volume",
    "executions",
    "priorClose",
    "vwap",
    "nextOpen",
    "nextClose",
    "gapUp",
    "outlier",
    "leverage",
    "marketCap",
];

pub const COL_SYMBOL: usize = 0;
pub const COL_COMPANY: usize = 1;
pub const COL_DATE: usize = 2;
pub const COL_ASSET_TYPE: usize = 3;
pub const COL_SECTOR: usize = 4;
pub const COL_NOTIONAL: usize = 5;
pub const COL_VOLUME: usize = 6;
pub const COL_EXECUTIONS: usize = 7;
pub const COL_PRIOR_CLOSE: usize = 8;
pub const COL_VWAP: usize = 9;
pub const COL_NEXT_OPEN: usize = 10;
pub const COL_NEXT_CLOSE: usize = 11;
pub const COL_GAP_UP: usize = 12;
pub const COL_OUTLIER: usize = 13;
pub const COL_LEVERAGE: usize = 14;
pub const COL_MARKET_CAP: usize = 15;

/// The JSON document produced by the offline pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    pub schema_version: u32,
    pub meta: Meta,
    pub lookup: Lookup,
    /// Index-encoded rows, see [`ROW_SCHEMA`].
    pub data: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub date_range: Option<(String, String)>,
    #[serde(default)]
    pub trading_days: usize,
    #[serde(default)]
    pub generated: Option<String>,
    /// Precomputed 1st/99th percentile bounds. Computed at load when absent.
    #[serde(default)]
    pub winsorization: Option<WinsorBounds>,
}

/// Dimension tables referenced by row indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    pub symbols: Vec<String>,
    pub companies: Vec<String>,
    /// The trading calendar, ascending ISO dates.
    pub dates: Vec<String>,
    pub sectors: Vec<String>,
    #[serde(default)]
    pub etf_categories: Vec<String>,
}
