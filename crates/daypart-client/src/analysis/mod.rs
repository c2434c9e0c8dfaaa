pub mod aggregate;
pub mod date;
pub mod filter;
pub mod recommend;
pub mod slot;
pub mod tables;
pub mod types;

use tracing::info;

use crate::ClientResult;
use crate::analysis::date::{ResolvedRange, resolve_range, split_period};
use crate::analysis::filter::{ExcludedDateSet, filter_excluded, within_period};
use crate::analysis::tables::{FinancialTables, TableInputs, build_financial_tables};
use crate::analysis::types::{OrderCounting, Period};
use crate::extract::{CanonicalField, LoadedExtract};

#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    /// File name of the source, scanned for an embedded date range.
    pub source_name: Option<&'a str>,
    pub explicit: Option<Period>,
    pub excluded: &'a ExcludedDateSet,
    /// Overrides the id-column based choice when set.
    pub order_counting: Option<OrderCounting>,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub range: Option<ResolvedRange>,
    pub pre: Option<Period>,
    pub post: Option<Period>,
    pub order_counting: OrderCounting,
    pub rows_excluded: usize,
    pub rows_outside_period: usize,
    pub tables: FinancialTables,
}

/// Range resolution, blackout filtering, period bounding, then every table.
pub fn analyze(extract: &LoadedExtract, request: &AnalysisRequest<'_>) -> ClientResult<Analysis> {
    let range = resolve_range(
        request.source_name,
        extract
            .date_bounds
            .into_iter()
            .flat_map(|bounds| [bounds.start, bounds.end]),
        request.explicit,
    );

    let kept = filter_excluded(&extract.records, request.excluded);
    let rows_excluded = extract.records.len() - kept.len();

    let (bounded, pre, post) = match range {
        Some(resolved) => {
            let (pre, post) = split_period(resolved.period);
            (within_period(&kept, resolved.period), Some(pre), Some(post))
        }
        None => (Vec::new(), None, None),
    };
    let rows_outside_period = kept.len() - bounded.len();

    let order_counting = request
        .order_counting
        .unwrap_or_else(|| OrderCounting::for_id_column(extract.schema.has(CanonicalField::OrderId)));

    info!(
        rows = bounded.len(),
        rows_excluded,
        rows_outside_period,
        "aggregating financial records"
    );

    let tables = build_financial_tables(&TableInputs {
        records: &bounded,
        schema: &extract.schema,
        period: range.map(|resolved| resolved.period),
        pre,
        post,
        order_counting,
    })?;

    Ok(Analysis {
        range,
        pre,
        post,
        order_counting,
        rows_excluded,
        rows_outside_period,
        tables,
    })
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
