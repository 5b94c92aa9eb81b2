use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::{MetricVariant, QuadrantMode};
use super::observation::{AssetType, GapDirection};

/// Predicate filters combined with AND. `Default` is the reset state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// `None` means all asset types.
    pub asset_type: Option<AssetType>,
    /// Exact sector match; `None` means all sectors.
    pub sector: Option<String>,
    /// Exact ETF category match; `None` means all categories.
    pub etf_category: Option<String>,
    /// Inclusive lower bound on notional, in dollars.
    pub min_notional: f64,
    /// Case-insensitive substring of the symbol; empty matches everything.
    pub symbol: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub gap_direction: Option<GapDirection>,
}

/// Columns the explorer and daily tables can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Symbol,
    Date,
    CompanyName,
    Sector,
    AssetType,
    Notional,
    Volume,
    Executions,
    ReferenceGap,
    TimingDifferential,
    TotalGap,
    VsOpen,
    VsClose,
    AbsTimingDifferential,
}

impl SortField {
    /// Direction applied when the field is first selected: identifiers read
    /// A→Z / oldest first, magnitudes largest first.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortField::Symbol
            | SortField::Date
            | SortField::CompanyName
            | SortField::Sector
            | SortField::AssetType => SortDirection::Ascending,
            SortField::Notional
            | SortField::Volume
            | SortField::Executions
            | SortField::ReferenceGap
            | SortField::TimingDifferential
            | SortField::TotalGap
            | SortField::VsOpen
            | SortField::VsClose
            | SortField::AbsTimingDifferential => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortField::Notional)
    }
}

impl SortState {
    pub fn new(field: SortField) -> Self {
        Self {
            field,
            direction: field.default_direction(),
        }
    }

    /// Header-click semantics: the same field flips direction, a new field
    /// starts from its default direction.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            *self = SortState::new(field);
        }
    }
}

/// View state of one consumer (a table, a chart). Passed explicitly to every
/// query so independent views never share a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryState {
    pub filters: FilterSet,
    pub sort: SortState,
    /// 1-indexed.
    pub page: usize,
    pub quadrant_mode: QuadrantMode,
    pub variant: MetricVariant,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            sort: SortState::default(),
            page: 1,
            quadrant_mode: QuadrantMode::default(),
            variant: MetricVariant::default(),
        }
    }
}

impl QueryState {
    /// Replace the filters and go back to the first page.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(FilterSet::default());
    }

    /// Apply a header click and go back to the first page.
    pub fn select_sort(&mut self, field: SortField) {
        self.sort.select(field);
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}
