use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::analysis::date::{DateColumnFormat, parse_date_column};
use crate::analysis::slot::parse_time_of_day;
use crate::analysis::types::{FeeAmounts, Period, TransactionRecord};
use crate::extract::schema::{CanonicalField, ResolvedSchema};
use crate::{ClientError, ClientResult};

const ORDER_TRANSACTION_TYPE: &str = "order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep only `order` rows when a transaction-type column exists.
    pub orders_only: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { orders_only: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub non_order_rows: usize,
    pub coercion_fallbacks: usize,
    pub undated_rows: usize,
    pub untimed_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedExtract {
    pub member_name: String,
    pub schema: ResolvedSchema,
    pub date_format: Option<DateColumnFormat>,
    /// Earliest and latest parsed date over every row read, non-order rows
    /// included.
    pub date_bounds: Option<Period>,
    pub records: Vec<TransactionRecord>,
    pub stats: LoadStats,
}

pub fn parse_extract(
    path: &Path,
    member_name: &str,
    content: &str,
    options: LoadOptions,
) -> ClientResult<LoadedExtract> {
    let csv_error = |error: csv::Error| ClientError::archive_unreadable(path, &format!("malformed CSV: {error}"));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();
    let schema = ResolvedSchema::resolve(&headers);

    let mut rows = Vec::new();
    let mut stats = LoadStats::default();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        stats.rows_read += 1;

        let is_order = schema
            .value(&record, CanonicalField::TransactionType)
            .is_none_or(|kind| kind.eq_ignore_ascii_case(ORDER_TRANSACTION_TYPE));
        let keep = is_order || !options.orders_only;
        if !keep {
            stats.non_order_rows += 1;
        }
        rows.push((record, keep));
    }

    let date_values = rows
        .iter()
        .map(|(record, _)| schema.value(record, CanonicalField::Date).unwrap_or(""))
        .collect::<Vec<&str>>();
    let (date_format, dates) = if schema.has(CanonicalField::Date) {
        let (format, parsed) = parse_date_column(&date_values);
        (Some(format), parsed)
    } else {
        (None, vec![None; rows.len()])
    };
    let date_bounds = bounds_of(dates.iter().flatten().copied());

    let mut records = Vec::with_capacity(rows.len());
    for ((record, keep), date) in rows.iter().zip(dates) {
        if !keep {
            continue;
        }
        let time = schema
            .value(record, CanonicalField::Time)
            .and_then(parse_time_of_day);
        if date.is_none() {
            stats.undated_rows += 1;
        }
        if time.is_none() {
            stats.untimed_rows += 1;
        }

        records.push(TransactionRecord {
            store_id: schema.value(record, CanonicalField::StoreId).map(str::to_string),
            order_id: schema.value(record, CanonicalField::OrderId).map(str::to_string),
            date,
            time,
            sales: coerce_amount(schema.value(record, CanonicalField::Sales), &mut stats),
            payout: coerce_amount(schema.value(record, CanonicalField::Payout), &mut stats),
            fees: FeeAmounts {
                commission: coerce_amount(schema.value(record, CanonicalField::Commission), &mut stats),
                marketing: coerce_amount(schema.value(record, CanonicalField::MarketingFees), &mut stats),
                processing: coerce_amount(schema.value(record, CanonicalField::ProcessingFee), &mut stats),
                customer_discounts: coerce_amount(
                    schema.value(record, CanonicalField::CustomerDiscounts),
                    &mut stats,
                ),
            },
        });
    }
    stats.rows_loaded = records.len();

    debug!(
        member = member_name,
        rows_read = stats.rows_read,
        rows_loaded = stats.rows_loaded,
        non_order_rows = stats.non_order_rows,
        coercion_fallbacks = stats.coercion_fallbacks,
        "financial extract parsed"
    );

    Ok(LoadedExtract {
        member_name: member_name.to_string(),
        schema,
        date_format,
        date_bounds,
        records,
        stats,
    })
}

fn bounds_of<I>(dates: I) -> Option<Period>
where
    I: Iterator<Item = NaiveDate>,
{
    dates.fold(None, |bounds, date| {
        Some(match bounds {
            Some(Period { start, end }) => Period {
                start: start.min(date),
                end: end.max(date),
            },
            None => Period { start: date, end: date },
        })
    })
}

/// Blank amounts are zero; unparseable ones are zero and counted.
fn coerce_amount(value: Option<&str>, stats: &mut LoadStats) -> f64 {
    let Some(raw) = value else {
        return 0.0;
    };
    match parse_amount(raw) {
        Some(amount) => amount,
        None => {
            stats.coercion_fallbacks += 1;
            0.0
        }
    }
}

/// Accepts `1234.5`, `$1,234.50`, `-3.00` and accounting-style `(3.00)`.
pub fn parse_amount(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned = body.replace(['$', ','], "");
    let parsed = cleaned.trim().parse::<f64>().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::NaiveDate;

    use super::{LoadOptions, parse_amount, parse_extract};
    use crate::analysis::date::DateColumnFormat;

    const SAMPLE: &str = "\
Timestamp local date,Timestamp local time,Transaction type,DoorDash order ID,Merchant store ID,Subtotal,Net total
02/12/2026,09:15:00,Order,A1,101,$20.00,15.50
02/12/2026,12:40:00,Adjustment,A1,101,-5.00,-5.00
02/13/2026,,Order,A2,102,abc,10.00
,13:00:00,Order,A3,101,12.00,9.00
";

    #[test]
    fn loads_order_rows_and_counts_fallbacks() {
        let loaded = parse_extract(
            Path::new("sample.csv"),
            "sample.csv",
            SAMPLE,
            LoadOptions::default(),
        );
        assert!(loaded.is_ok());
        if let Ok(extract) = loaded {
            assert_eq!(extract.date_format, Some(DateColumnFormat::UsSlash));
            assert_eq!(extract.stats.rows_read, 4);
            assert_eq!(extract.stats.non_order_rows, 1);
            assert_eq!(extract.stats.rows_loaded, 3);
            assert_eq!(extract.stats.coercion_fallbacks, 1);
            assert_eq!(extract.stats.undated_rows, 1);
            assert_eq!(extract.stats.untimed_rows, 1);
            assert_eq!(extract.records[0].sales, 20.0);
            assert_eq!(extract.records[0].payout, 15.5);
            assert_eq!(extract.records[1].sales, 0.0);
            assert_eq!(extract.records[1].store_id.as_deref(), Some("102"));
        }
    }

    #[test]
    fn transaction_type_filter_can_be_disabled() {
        let loaded = parse_extract(
            Path::new("sample.csv"),
            "sample.csv",
            SAMPLE,
            LoadOptions { orders_only: false },
        );
        assert!(loaded.is_ok());
        if let Ok(extract) = loaded {
            assert_eq!(extract.stats.rows_loaded, 4);
            assert_eq!(extract.stats.non_order_rows, 0);
        }
    }

    #[test]
    fn date_bounds_cover_rows_the_order_filter_drops() {
        let content = "\
Timestamp local date,Transaction type,DoorDash order ID,Subtotal,Net total,Commission,Payment processing fee
02/10/2026,Adjustment,X1,-4.00,-4.00,,
02/12/2026,Order,A1,40.00,30.00,6.00,1.20
02/18/2026,Order,A2,20.00,15.00,3.00,0.60
";
        let loaded = parse_extract(Path::new("x.csv"), "x.csv", content, LoadOptions::default());
        assert!(loaded.is_ok());
        if let Ok(extract) = loaded {
            assert_eq!(extract.records.len(), 2);
            assert!(extract.date_bounds.is_some());
            if let Some(bounds) = extract.date_bounds {
                assert_eq!(bounds.start, NaiveDate::from_ymd_opt(2026, 2, 10).unwrap_or_default());
                assert_eq!(bounds.end, NaiveDate::from_ymd_opt(2026, 2, 18).unwrap_or_default());
            }
            assert_eq!(extract.records[0].fees.commission, 6.0);
            assert_eq!(extract.records[1].fees.processing, 0.6);
            assert_eq!(extract.records[1].fees.marketing, 0.0);
            assert_eq!(extract.stats.coercion_fallbacks, 0);
        }
    }

    #[test]
    fn amounts_accept_currency_shapes() {
        assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("(3.00)"), Some(-3.0));
        assert_eq!(parse_amount(" -2 "), Some(-2.0));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("inf"), None);
    }
}
