use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::engine::aggregator::GroupKey;
use crate::errors::AppError;
use crate::models::observation::{Metric, Observation};
use crate::models::result::AggregateRecord;

pub const OBSERVATION_HEADER: [&str; 10] = [
    "Symbol",
    "Company",
    "Date",
    "Asset Type",
    "Sector",
    "Notional",
    "Timing Differential (bps)",
    "Reference Gap (bps)",
    "Gap Direction",
    "Directional Consistency",
];

/// Fixed two-decimal rendering; unavailable metrics export as an empty field.
fn format_metric(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    // Non-numeric fields are always quoted, embedded quotes doubled.
    WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(inner)
}

fn write_observations<W: Write>(
    wtr: &mut csv::Writer<W>,
    observations: &[Observation],
) -> Result<(), AppError> {
    wtr.write_record(OBSERVATION_HEADER)
        .map_err(|e| AppError::FileWrite(e.to_string()))?;

    for o in observations {
        wtr.write_record([
            o.symbol.as_str(),
            o.company_name.as_str(),
            o.trade_date.format("%Y-%m-%d").to_string().as_str(),
            o.asset_type.as_str(),
            o.sector.as_str(),
            format!("{:.2}", o.notional).as_str(),
            format_metric(o.metrics.timing_differential).as_str(),
            format_metric(o.metrics.reference_gap).as_str(),
            o.gap_direction.as_str(),
            if o.directional_consistency { "Yes" } else { "No" },
        ])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

fn write_aggregates<W: Write>(
    wtr: &mut csv::Writer<W>,
    records: &[AggregateRecord],
    key: GroupKey,
    metric: Metric,
) -> Result<(), AppError> {
    let weighted = format!("Weighted {}", metric.label());
    wtr.write_record([
        key.label(),
        "Observations",
        "Trading Days",
        "Total Notional",
        weighted.as_str(),
        "Consistency Rate (%)",
    ])
    .map_err(|e| AppError::FileWrite(e.to_string()))?;

    for r in records {
        wtr.write_record([
            r.key.as_str(),
            r.observations.to_string().as_str(),
            r.trading_days.to_string().as_str(),
            format!("{:.2}", r.total_notional).as_str(),
            format!("{:.2}", r.weighted_average).as_str(),
            format!("{:.2}", r.consistency_rate).as_str(),
        ])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV buffer: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// Observations as CSV text with the fixed header row. Metric columns carry
/// raw values.
pub fn observations_to_csv(observations: &[Observation]) -> Result<String, AppError> {
    let mut wtr = csv_writer(Vec::new());
    write_observations(&mut wtr, observations)?;
    into_string(wtr)
}

/// Write observations to a CSV file.
pub fn write_observations_csv(observations: &[Observation], path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;
    let mut wtr = csv_writer(file);
    write_observations(&mut wtr, observations)?;
    info!("Exported {} observations to {}", observations.len(), path.display());
    Ok(())
}

pub fn aggregates_to_csv(
    records: &[AggregateRecord],
    key: GroupKey,
    metric: Metric,
) -> Result<String, AppError> {
    let mut wtr = csv_writer(Vec::new());
    write_aggregates(&mut wtr, records, key, metric)?;
    into_string(wtr)
}

pub fn write_aggregates_csv(
    records: &[AggregateRecord],
    key: GroupKey,
    metric: Metric,
    path: &Path,
) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;
    let mut wtr = csv_writer(file);
    write_aggregates(&mut wtr, records, key, metric)?;
    info!("Exported {} aggregate rows to {}", records.len(), path.display());
    Ok(())
}
