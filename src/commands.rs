use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::data::dataset::Dataset;
use crate::engine::aggregator::{self, GroupKey};
use crate::engine::correlation;
use crate::engine::filter;
use crate::engine::metrics::MetricView;
use crate::engine::quadrant::{classify_observation, Thresholds};
use crate::engine::sorter;
use crate::engine::summary;
use crate::errors::AppError;
use crate::models::config::DashboardConfig;
use crate::models::observation::{Metric, Observation, Quadrant};
use crate::models::query::QueryState;
use crate::models::result::{
    AggregateRecord, CorrelationMatrix, DailyPoint, HistogramBin, Page, PositionDetail,
    QuadrantSummary, SummaryStats,
};
use crate::utils::export;

/// Read-only query surface over one loaded dataset.
///
/// Every operation takes the caller's [`QueryState`] explicitly and
/// recomputes from the base snapshot, so independent views never share
/// selection state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    config: DashboardConfig,
}

impl Dashboard {
    /// Fails with `InvalidConfig` when the tunables are unusable.
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            dataset: Arc::new(dataset),
            config,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    fn view(&self, state: &QueryState) -> MetricView {
        MetricView::new(state.variant, self.dataset.bounds)
    }

    fn thresholds(&self) -> Thresholds {
        Thresholds::from_config(&self.config)
    }

    // ── Filtering ──

    pub fn filtered(&self, state: &QueryState) -> Vec<Observation> {
        let rows = state.filters.apply(&self.dataset.observations);
        debug!(
            "Filtered {} of {} observations",
            rows.len(),
            self.dataset.len()
        );
        rows
    }

    pub fn sectors(&self) -> Vec<String> {
        filter::sector_options(&self.dataset.observations)
    }

    pub fn etf_categories(&self) -> Vec<String> {
        filter::etf_category_options(&self.dataset.observations)
    }

    // ── Aggregation ──

    /// Groups of the filtered set in their natural order for `key`.
    pub fn aggregate(&self, state: &QueryState, key: GroupKey, metric: Metric) -> Vec<AggregateRecord> {
        let rows = self.filtered(state);
        let groups = aggregator::aggregate(&rows, key, metric, &self.view(state));
        debug!("Aggregated {} rows into {} {:?} groups", rows.len(), groups.len(), key);
        aggregator::ordered(groups, key)
    }

    pub fn summary(&self, state: &QueryState) -> SummaryStats {
        summary::summary_stats(
            &self.filtered(state),
            self.dataset.trading_days(),
            &self.view(state),
        )
    }

    /// Daily points over the calendar dates inside the filter's date range.
    pub fn daily_series(&self, state: &QueryState) -> Vec<DailyPoint> {
        let from = state.filters.date_from.unwrap_or(NaiveDate::MIN);
        let to = state.filters.date_to.unwrap_or(NaiveDate::MAX);
        let calendar: Vec<NaiveDate> = self
            .dataset
            .calendar
            .iter()
            .copied()
            .filter(|d| *d >= from && *d <= to)
            .collect();
        summary::daily_series(
            &self.filtered(state),
            &calendar,
            &self.view(state),
            self.config.moving_average_window,
        )
    }

    pub fn histogram(&self, state: &QueryState) -> Vec<HistogramBin> {
        summary::histogram(
            &self.filtered(state),
            &self.view(state),
            self.config.histogram_bin_width,
        )
    }

    // ── Quadrants ──

    pub fn classify(&self, state: &QueryState, obs: &Observation) -> Option<Quadrant> {
        classify_observation(obs, &self.view(state), state.quadrant_mode, self.thresholds())
    }

    pub fn quadrant_summary(&self, state: &QueryState) -> Vec<QuadrantSummary> {
        summary::quadrant_summary(
            &self.filtered(state),
            &self.view(state),
            state.quadrant_mode,
            self.thresholds(),
        )
    }

    pub fn top_movers(&self, state: &QueryState) -> Vec<Observation> {
        summary::top_movers(&self.filtered(state), self.config.top_movers_limit)
    }

    /// Lookup by (symbol, date) over the whole dataset, ignoring filters.
    pub fn position_detail(
        &self,
        state: &QueryState,
        symbol: &str,
        date: NaiveDate,
    ) -> Option<PositionDetail> {
        let obs = self
            .dataset
            .observations
            .iter()
            .find(|o| o.symbol == symbol && o.trade_date == date)?;
        let view = self.view(state);
        let quadrant = self.classify(state, obs);
        Some(PositionDetail {
            observation: obs.clone(),
            quadrant,
            quadrant_name: quadrant.map(|q| q.name().to_string()),
            reference_gap: view.reference_gap(obs),
            timing_differential: view.timing_differential(obs),
        })
    }

    // ── Explorer ──

    pub fn sorted(&self, state: &QueryState) -> Vec<Observation> {
        let mut rows = self.filtered(state);
        sorter::sort_observations(&mut rows, state.sort);
        rows
    }

    pub fn sorted_page(&self, state: &QueryState) -> Page<Observation> {
        let page = sorter::paginate(&self.sorted(state), state.page, self.config.page_size);
        debug!(
            "Page {}/{} ({} rows)",
            page.page,
            page.total_pages,
            page.items.len()
        );
        page
    }

    pub fn correlation_matrix(&self, state: &QueryState) -> CorrelationMatrix {
        correlation::correlation_matrix(&self.filtered(state), &self.view(state))
    }

    // ── Export ──

    /// Filtered and sorted rows as CSV text.
    pub fn export_csv(&self, state: &QueryState) -> Result<String, AppError> {
        let rows = self.sorted(state);
        info!("Exporting {} observations to CSV", rows.len());
        export::observations_to_csv(&rows)
    }

    pub fn write_csv(&self, state: &QueryState, path: &Path) -> Result<(), AppError> {
        export::write_observations_csv(&self.sorted(state), path)
    }

    pub fn export_aggregate_csv(
        &self,
        state: &QueryState,
        key: GroupKey,
        metric: Metric,
    ) -> Result<String, AppError> {
        let records = self.aggregate(state, key, metric);
        info!("Exporting {} {:?} groups to CSV", records.len(), key);
        export::aggregates_to_csv(&records, key, metric)
    }
}
