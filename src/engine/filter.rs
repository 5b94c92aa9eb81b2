use std::collections::BTreeSet;

use crate::models::observation::Observation;
use crate::models::payload::UNKNOWN_SECTOR;
use crate::models::query::FilterSet;

impl FilterSet {
    /// All predicates ANDed together.
    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(asset_type) = self.asset_type {
            if obs.asset_type != asset_type {
                return false;
            }
        }
        if let Some(sector) = &self.sector {
            if &obs.sector != sector {
                return false;
            }
        }
        if let Some(category) = &self.etf_category {
            if obs.etf_category.as_ref() != Some(category) {
                return false;
            }
        }
        if obs.notional < self.min_notional {
            return false;
        }
        if !self.symbol.is_empty()
            && !obs
                .symbol
                .to_lowercase()
                .contains(&self.symbol.to_lowercase())
        {
            return false;
        }
        if self.date_from.is_some_and(|from| obs.trade_date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| obs.trade_date > to) {
            return false;
        }
        if let Some(direction) = self.gap_direction {
            if obs.gap_direction != direction {
                return false;
            }
        }
        true
    }

    /// Fresh filtered copy in input order. The base set is left untouched.
    pub fn apply(&self, observations: &[Observation]) -> Vec<Observation> {
        observations
            .iter()
            .filter(|o| self.matches(o))
            .cloned()
            .collect()
    }

    pub fn is_reset(&self) -> bool {
        *self == FilterSet::default()
    }
}

/// Distinct sectors for the sector picker, sorted, without the placeholder.
pub fn sector_options(observations: &[Observation]) -> Vec<String> {
    observations
        .iter()
        .map(|o| o.sector.as_str())
        .filter(|s| *s != UNKNOWN_SECTOR)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct ETF categories, sorted.
pub fn etf_category_options(observations: &[Observation]) -> Vec<String> {
    observations
        .iter()
        .filter_map(|o| o.etf_category.as_deref())
        .filter(|c| *c != UNKNOWN_SECTOR)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
