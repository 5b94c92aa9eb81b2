use std::cmp::Ordering;

use crate::models::observation::Observation;
use crate::models::query::{SortDirection, SortField, SortState};
use crate::models::result::Page;

/// Unavailable values order below every available one.
fn cmp_metric(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending comparison of two observations on one field. Metrics compare
/// on their raw values.
pub fn compare(a: &Observation, b: &Observation, field: SortField) -> Ordering {
    match field {
        SortField::Symbol => a.symbol.cmp(&b.symbol),
        SortField::Date => a.trade_date.cmp(&b.trade_date),
        SortField::CompanyName => a.company_name.cmp(&b.company_name),
        SortField::Sector => a.sector.cmp(&b.sector),
        SortField::AssetType => a.asset_type.as_str().cmp(b.asset_type.as_str()),
        SortField::Notional => a.notional.total_cmp(&b.notional),
        SortField::Volume => a.volume.total_cmp(&b.volume),
        SortField::Executions => a.executions.cmp(&b.executions),
        SortField::ReferenceGap => cmp_metric(a.metrics.reference_gap, b.metrics.reference_gap),
        SortField::TimingDifferential => cmp_metric(
            a.metrics.timing_differential,
            b.metrics.timing_differential,
        ),
        SortField::TotalGap => cmp_metric(a.metrics.total_gap, b.metrics.total_gap),
        SortField::VsOpen => cmp_metric(a.metrics.vs_open, b.metrics.vs_open),
        SortField::VsClose => cmp_metric(a.metrics.vs_close, b.metrics.vs_close),
        SortField::AbsTimingDifferential => cmp_metric(
            a.metrics.timing_differential.map(f64::abs),
            b.metrics.timing_differential.map(f64::abs),
        ),
    }
}

/// Stable sort in place; tied rows keep their input order in both directions.
pub fn sort_observations(observations: &mut [Observation], sort: SortState) {
    observations.sort_by(|a, b| {
        let ord = compare(a, b, sort.field);
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// Slice out one 1-indexed page. Out-of-range requests clamp to the first or
/// last page; an empty set yields a single empty page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);
    let (first_row, last_row) = if start < end { (start + 1, end) } else { (0, 0) };

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_pages,
        total_items,
        first_row,
        last_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{observation, with_metrics};

    fn symbols(obs: &[Observation]) -> Vec<&str> {
        obs.iter().map(|o| o.symbol.as_str()).collect()
    }

    #[test]
    fn test_sort_reversal_without_ties() {
        let mut obs: Vec<Observation> = [3.0, 1.0, 4.0, 1.5, 9.0, 2.6]
            .iter()
            .enumerate()
            .map(|(i, n)| with_metrics(&format!("S{}", i), n * 1e5, 0.0, 0.0))
            .collect();
        sort_observations(&mut obs, SortState::new(SortField::Notional));
        let desc: Vec<String> = obs.iter().map(|o| o.symbol.clone()).collect();

        let mut state = SortState::new(SortField::Notional);
        state.select(SortField::Notional);
        assert_eq!(state.direction, SortDirection::Ascending);
        sort_observations(&mut obs, state);
        let mut asc: Vec<String> = obs.iter().map(|o| o.symbol.clone()).collect();
        asc.reverse();
        assert_eq!(desc, asc);
        assert_eq!(desc[0], "S4");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut obs = vec![
            with_metrics("B", 1e6, 0.0, 0.0),
            with_metrics("A", 1e6, 0.0, 0.0),
            with_metrics("C", 2e6, 0.0, 0.0),
            with_metrics("D", 1e6, 0.0, 0.0),
        ];
        sort_observations(&mut obs, SortState::new(SortField::Notional));
        assert_eq!(symbols(&obs), vec!["C", "B", "A", "D"]);
    }

    #[test]
    fn test_unavailable_metrics_sort_lowest() {
        let mut obs = vec![
            with_metrics("A", 1e6, 0.0, -3.0),
            observation("N", "2025-12-01", 1e6, None, None, None),
            with_metrics("B", 1e6, 0.0, 7.0),
        ];
        sort_observations(&mut obs, SortState::new(SortField::TimingDifferential));
        assert_eq!(symbols(&obs), vec!["B", "A", "N"]);
        sort_observations(
            &mut obs,
            SortState {
                field: SortField::TimingDifferential,
                direction: SortDirection::Ascending,
            },
        );
        assert_eq!(symbols(&obs), vec!["N", "A", "B"]);

        sort_observations(&mut obs, SortState::new(SortField::AbsTimingDifferential));
        assert_eq!(symbols(&obs), vec!["B", "A", "N"]);
    }

    #[test]
    fn test_string_fields_ascend_by_default() {
        let mut obs = vec![
            with_metrics("MSFT", 1e6, 0.0, 0.0),
            with_metrics("AAPL", 2e6, 0.0, 0.0),
            with_metrics("GOOG", 3e6, 0.0, 0.0),
        ];
        sort_observations(&mut obs, SortState::new(SortField::Symbol));
        assert_eq!(symbols(&obs), vec!["AAPL", "GOOG", "MSFT"]);
    }

    #[test]
    fn test_pagination_covers_every_row_once() {
        for size in [0usize, 1, 49, 50, 51, 100, 137] {
            let items: Vec<usize> = (0..size).collect();
            let pages = total_pages(size, 50);
            let mut seen = Vec::new();
            for p in 1..=pages {
                let page = paginate(&items, p, 50);
                assert_eq!(page.page, p);
                seen.extend(page.items);
            }
            assert_eq!(seen, items, "size {}", size);

            let last = paginate(&items, pages, 50);
            let expected_last = if size == 0 {
                0
            } else if size % 50 == 0 {
                50
            } else {
                size % 50
            };
            assert_eq!(last.items.len(), expected_last);
        }
    }

    #[test]
    fn test_pagination_clamps() {
        let items: Vec<u32> = (0..120).collect();
        let beyond = paginate(&items, 9, 50);
        assert_eq!(beyond.page, 3);
        assert_eq!(beyond.items.len(), 20);
        assert_eq!((beyond.first_row, beyond.last_row), (101, 120));

        let zero = paginate(&items, 0, 50);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.first_row, 1);

        let empty = paginate::<u32>(&[], 4, 50);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
        assert_eq!((empty.first_row, empty.last_row), (0, 0));
    }
}
