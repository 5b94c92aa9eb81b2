use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::observation::{Metric, Observation};
use crate::models::result::AggregateRecord;

use super::metrics::MetricView;

/// Leverage tags in display order; anything else sorts after these.
pub const LEVERAGE_ORDER: [&str; 6] = ["-3x", "-2x", "-1x", "1x", "2x", "3x"];

/// Notional size buckets, largest first. Together they partition `[0, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeTier {
    TenMillionPlus,
    FiveMillionPlus,
    OneMillionPlus,
    FiveHundredKPlus,
    HundredKPlus,
    Small,
}

impl SizeTier {
    pub const ALL: [SizeTier; 6] = [
        SizeTier::TenMillionPlus,
        SizeTier::FiveMillionPlus,
        SizeTier::OneMillionPlus,
        SizeTier::FiveHundredKPlus,
        SizeTier::HundredKPlus,
        SizeTier::Small,
    ];

    /// Inclusive lower bound in dollars.
    pub fn lower_bound(&self) -> f64 {
        match self {
            SizeTier::TenMillionPlus => 10_000_000.0,
            SizeTier::FiveMillionPlus => 5_000_000.0,
            SizeTier::OneMillionPlus => 1_000_000.0,
            SizeTier::FiveHundredKPlus => 500_000.0,
            SizeTier::HundredKPlus => 100_000.0,
            SizeTier::Small => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeTier::TenMillionPlus => "≥ $10M",
            SizeTier::FiveMillionPlus => "≥ $5M",
            SizeTier::OneMillionPlus => "≥ $1M",
            SizeTier::FiveHundredKPlus => "≥ $500K",
            SizeTier::HundredKPlus => "≥ $100K",
            SizeTier::Small => "< $100K",
        }
    }

    /// `lower_bound <= notional < previous tier's lower_bound`
    pub fn of(notional: f64) -> SizeTier {
        let mut upper = f64::INFINITY;
        for tier in SizeTier::ALL {
            if notional >= tier.lower_bound() && notional < upper {
                return tier;
            }
            upper = tier.lower_bound();
        }
        SizeTier::Small
    }

    fn from_label(label: &str) -> Option<SizeTier> {
        SizeTier::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Dimension an aggregate is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKey {
    TradeDate,
    Sector,
    AssetType,
    Symbol,
    /// ETF rows only.
    LeverageTier,
    SizeTier,
    /// ETF rows with a category only.
    EtfCategory,
}

impl GroupKey {
    /// Group label for an observation, or `None` when the key does not apply.
    pub fn key_of(&self, obs: &Observation) -> Option<String> {
        match self {
            GroupKey::TradeDate => Some(obs.trade_date.format("%Y-%m-%d").to_string()),
            GroupKey::Sector => Some(obs.sector.clone()),
            GroupKey::AssetType => Some(obs.asset_type.as_str().to_string()),
            GroupKey::Symbol => Some(obs.symbol.clone()),
            GroupKey::LeverageTier if obs.is_etf() => Some(
                obs.leverage_multiple
                    .clone()
                    .unwrap_or_else(|| "1x".to_string()),
            ),
            GroupKey::LeverageTier => None,
            GroupKey::SizeTier => Some(SizeTier::of(obs.notional).label().to_string()),
            GroupKey::EtfCategory if obs.is_etf() => obs.etf_category.clone(),
            GroupKey::EtfCategory => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::TradeDate => "Date",
            GroupKey::Sector => "Sector",
            GroupKey::AssetType => "Asset Type",
            GroupKey::Symbol => "Symbol",
            GroupKey::LeverageTier => "Leverage",
            GroupKey::SizeTier => "Size Tier",
            GroupKey::EtfCategory => "ETF Category",
        }
    }
}

#[derive(Default)]
struct Accumulator {
    observations: usize,
    total_notional: f64,
    total_volume: f64,
    total_executions: u64,
    dates: HashSet<NaiveDate>,
    consistent: usize,
    // Only rows where the metric is available contribute below.
    metric_count: usize,
    metric_sum: f64,
    metric_weighted_sum: f64,
    metric_notional: f64,
}

impl Accumulator {
    fn push(&mut self, obs: &Observation, value: Option<f64>) {
        self.observations += 1;
        self.total_notional += obs.notional;
        self.total_volume += obs.volume;
        self.total_executions += obs.executions;
        self.dates.insert(obs.trade_date);
        if obs.directional_consistency {
            self.consistent += 1;
        }
        if let Some(v) = value {
            self.metric_count += 1;
            self.metric_sum += v;
            self.metric_weighted_sum += v * obs.notional;
            self.metric_notional += obs.notional;
        }
    }

    fn finish(self, key: String) -> AggregateRecord {
        let weighted_average = if self.metric_notional > 0.0 {
            self.metric_weighted_sum / self.metric_notional
        } else {
            0.0
        };
        let simple_average = if self.metric_count > 0 {
            self.metric_sum / self.metric_count as f64
        } else {
            0.0
        };
        let (consistency_rate, average_size) = if self.observations > 0 {
            let n = self.observations as f64;
            (self.consistent as f64 / n * 100.0, self.total_notional / n)
        } else {
            (0.0, 0.0)
        };
        AggregateRecord {
            key,
            observations: self.observations,
            total_notional: self.total_notional,
            total_volume: self.total_volume,
            total_executions: self.total_executions,
            trading_days: self.dates.len(),
            weighted_average,
            simple_average,
            consistency_rate,
            average_size,
        }
    }
}

/// Group `observations` by `key` and summarise `metric` per group.
///
/// Returns an unordered mapping; callers pick the ordering. Observations the
/// key does not apply to are left out.
pub fn aggregate(
    observations: &[Observation],
    key: GroupKey,
    metric: Metric,
    view: &MetricView,
) -> HashMap<String, AggregateRecord> {
    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    for obs in observations {
        if let Some(k) = key.key_of(obs) {
            groups
                .entry(k)
                .or_default()
                .push(obs, view.value(obs, metric));
        }
    }
    groups
        .into_iter()
        .map(|(k, acc)| (k.clone(), acc.finish(k)))
        .collect()
}

/// Summarise a whole set as a single group.
pub fn summarize_group(
    key: &str,
    observations: &[Observation],
    metric: Metric,
    view: &MetricView,
) -> AggregateRecord {
    let mut acc = Accumulator::default();
    for obs in observations {
        acc.push(obs, view.value(obs, metric));
    }
    acc.finish(key.to_string())
}

/// Natural ordering of groups for a key: dates ascending, leverage and size
/// tiers in display order, everything else by total notional descending.
pub fn ordered(records: HashMap<String, AggregateRecord>, key: GroupKey) -> Vec<AggregateRecord> {
    let mut records: Vec<AggregateRecord> = records.into_values().collect();
    match key {
        GroupKey::TradeDate => records.sort_by(|a, b| a.key.cmp(&b.key)),
        GroupKey::LeverageTier => records.sort_by_key(|r| {
            let rank = LEVERAGE_ORDER
                .iter()
                .position(|l| *l == r.key)
                .unwrap_or(LEVERAGE_ORDER.len());
            (rank, r.key.clone())
        }),
        GroupKey::SizeTier => records.sort_by_key(|r| SizeTier::from_label(&r.key)),
        _ => records.sort_by(|a, b| {
            b.total_notional
                .total_cmp(&a.total_notional)
                .then_with(|| a.key.cmp(&b.key))
        }),
    }
    records
}
