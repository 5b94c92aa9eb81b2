use chrono::NaiveDate;
use tracing::info;

use crate::errors::DecodeError;
use crate::models::observation::{AssetType, BpsMetrics, Observation};
use crate::models::payload::*;

use super::metrics::{directional_consistency, gap_direction};

/// Parse the trading calendar. Dates must be ISO `YYYY-MM-DD`.
pub fn parse_calendar(dates: &[String]) -> Result<Vec<NaiveDate>, DecodeError> {
    dates
        .iter()
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| DecodeError::InvalidDate(d.clone()))
        })
        .collect()
}

/// Expand every encoded row into an [`Observation`].
///
/// Total over well-formed input and performs no filtering: the output has
/// exactly one observation per row, in row order. The first structural
/// problem aborts the whole decode.
pub fn decode(payload: &RawPayload) -> Result<Vec<Observation>, DecodeError> {
    if payload.schema_version != SCHEMA_VERSION {
        return Err(DecodeError::UnsupportedSchema {
            found: payload.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let calendar = parse_calendar(&payload.lookup.dates)?;
    let observations = payload
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| decode_row(i, row, &payload.lookup, &calendar))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Decoded {} observations across {} trading dates",
        observations.len(),
        calendar.len()
    );
    Ok(observations)
}

/// Positional access to one encoded row with schema-aware errors.
struct RowReader<'a> {
    row: usize,
    values: &'a [Option<f64>],
}

impl<'a> RowReader<'a> {
    fn required(&self, col: usize) -> Result<f64, DecodeError> {
        match self.values[col] {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(self.invalid(col, v)),
            None => Err(DecodeError::MissingField {
                row: self.row,
                field: ROW_SCHEMA[col],
            }),
        }
    }

    fn optional(&self, col: usize) -> Option<f64> {
        self.values[col].filter(|v| v.is_finite())
    }

    /// Signed whole number or nothing; fractions are rejected, not rounded.
    fn optional_signed(&self, col: usize) -> Result<Option<i64>, DecodeError> {
        match self.optional(col) {
            Some(v) if v.fract() != 0.0 => Err(self.invalid(col, v)),
            Some(v) => Ok(Some(v as i64)),
            None => Ok(None),
        }
    }

    fn non_negative(&self, col: usize) -> Result<f64, DecodeError> {
        let v = self.required(col)?;
        if v < 0.0 {
            return Err(self.invalid(col, v));
        }
        Ok(v)
    }

    fn integer(&self, col: usize) -> Result<u64, DecodeError> {
        let v = self.non_negative(col)?;
        if v.fract() != 0.0 {
            return Err(self.invalid(col, v));
        }
        Ok(v as u64)
    }

    fn flag(&self, col: usize) -> Result<bool, DecodeError> {
        match self.required(col)? {
            v if v == 0.0 => Ok(false),
            v if v == 1.0 => Ok(true),
            v => Err(self.invalid(col, v)),
        }
    }

    fn lookup<'t>(&self, col: usize, table: &'t [String]) -> Result<&'t str, DecodeError> {
        let index = self.integer(col)? as usize;
        table
            .get(index)
            .map(String::as_str)
            .ok_or(DecodeError::IndexOutOfRange {
                row: self.row,
                field: ROW_SCHEMA[col],
                index,
                len: table.len(),
            })
    }

    fn invalid(&self, col: usize, value: f64) -> DecodeError {
        DecodeError::InvalidValue {
            row: self.row,
            field: ROW_SCHEMA[col],
            value,
        }
    }
}

fn decode_row(
    row: usize,
    values: &[Option<f64>],
    lookup: &Lookup,
    calendar: &[NaiveDate],
) -> Result<Observation, DecodeError> {
    if values.len() != ROW_SCHEMA.len() {
        return Err(DecodeError::Arity {
            row,
            expected: ROW_SCHEMA.len(),
            actual: values.len(),
        });
    }
    let r = RowReader { row, values };

    let symbol = r.lookup(COL_SYMBOL, &lookup.symbols)?.to_string();
    let company_name = r.lookup(COL_COMPANY, &lookup.companies)?.to_string();

    let date_index = r.integer(COL_DATE)? as usize;
    let trade_date = *calendar.get(date_index).ok_or(DecodeError::IndexOutOfRange {
        row,
        field: ROW_SCHEMA[COL_DATE],
        index: date_index,
        len: calendar.len(),
    })?;

    let asset_type = if r.flag(COL_ASSET_TYPE)? {
        AssetType::Etf
    } else {
        AssetType::Stock
    };
    let (sector, etf_category) = resolve_sector(&r, asset_type, lookup)?;

    let leverage_multiple = match asset_type {
        AssetType::Etf => r
            .optional_signed(COL_LEVERAGE)?
            .filter(|&n| n != 0)
            .map(|n| format!("{}x", n)),
        AssetType::Stock => None,
    };

    let prior_close = r.optional(COL_PRIOR_CLOSE);
    let vwap = r.optional(COL_VWAP);
    let next_open = r.optional(COL_NEXT_OPEN);
    let next_close = r.optional(COL_NEXT_CLOSE);
    let metrics = BpsMetrics::from_prices(prior_close, vwap, next_open, next_close);

    Ok(Observation {
        symbol,
        company_name,
        asset_type,
        sector,
        etf_category,
        leverage_multiple,
        trade_date,
        notional: r.non_negative(COL_NOTIONAL)?,
        volume: r.non_negative(COL_VOLUME)?,
        executions: r.integer(COL_EXECUTIONS)?,
        prior_close,
        vwap,
        next_open,
        next_close,
        metrics,
        directional_consistency: directional_consistency(prior_close, vwap, next_open),
        gap_direction: gap_direction(metrics.total_gap, r.flag(COL_GAP_UP)?),
        is_outlier: r.flag(COL_OUTLIER)?,
        market_cap: r.optional(COL_MARKET_CAP),
    })
}

/// Range-offset sector encoding: indices below `sectors.len()` address the
/// sector table, indices at or above it address the ETF category table and
/// are only legal for ETF rows. ETF rows never end up with the placeholder.
fn resolve_sector(
    r: &RowReader<'_>,
    asset_type: AssetType,
    lookup: &Lookup,
) -> Result<(String, Option<String>), DecodeError> {
    let index = r.integer(COL_SECTOR)? as usize;
    let offset = lookup.sectors.len();

    if index < offset {
        let sector = match asset_type {
            AssetType::Stock => lookup.sectors[index].clone(),
            AssetType::Etf => ETF_SECTOR.to_string(),
        };
        return Ok((sector, None));
    }

    let category = match asset_type {
        AssetType::Etf => lookup.etf_categories.get(index - offset),
        AssetType::Stock => None,
    };
    match category {
        Some(cat) if cat != UNKNOWN_SECTOR && !cat.is_empty() => {
            Ok((cat.clone(), Some(cat.clone())))
        }
        Some(_) => Ok((ETF_SECTOR.to_string(), None)),
        None => Err(DecodeError::IndexOutOfRange {
            row: r.row,
            field: ROW_SCHEMA[COL_SECTOR],
            index,
            len: match asset_type {
                AssetType::Etf => offset + lookup.etf_categories.len(),
                AssetType::Stock => offset,
            },
        }),
    }
}
