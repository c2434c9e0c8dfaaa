use tracing::{debug, warn};

use crate::analysis::aggregate::{
    aggregate, aggregate_day_slots, aggregate_totals, aggregate_weekday_means, core_metrics,
    day_slot_row, densify_slots,
};
use crate::analysis::date::format_iso_date;
use crate::analysis::filter::within_period;
use crate::analysis::recommend::recommend;
use crate::analysis::round_to;
use crate::analysis::types::{
    AggregationRequest, CoreMetrics, DaySlotRow, Dimension, DimensionValue, MetricRow, OrderCounting, Period,
    RecommendationRow, Slot, TransactionRecord, compare_store_ids,
};
use crate::extract::{CORE_FIELDS, CanonicalField, ResolvedSchema};
use crate::workbook::{CellValue, Column, ColumnKind, NamedTable, Section, Table, TableSet};
use crate::{ClientError, ClientResult};

pub const FINANCIAL_SET_LABEL: &str = "financial";

pub const SUMMARY_SHEET: &str = "Summary";
pub const CORE_METRICS_SHEET: &str = "Core Metrics";
pub const PRE_POST_SHEET: &str = "Pre vs Post";
pub const STORE_SHEET: &str = "Store-wise";
pub const RECOMMENDATIONS_SHEET: &str = "Campaign Recommendations";
pub const DATE_SHEET: &str = "Date-wise";
pub const WEEKDAY_SHEET: &str = "Day of Week";
pub const DAY_TYPE_SHEET: &str = "Day Type";
pub const SLOT_SHEET: &str = "Slot";
pub const SLOT_PRE_POST_SHEET: &str = "Slot Pre vs Post";
pub const DAY_SLOT_SHEET: &str = "Day-Slot";
pub const STORE_DAY_SLOT_PREFIX: &str = "Day-Slot - ";
pub const STORE_PIVOT_SHEET: &str = "Store Slot Pivot";
const STORE_DAY_SLOT_LABEL: &str = "Day-Slot - {store}";

/// A table left out because its columns could not be resolved.
#[derive(Debug, Clone)]
pub struct SkippedTable {
    pub name: String,
    pub error: ClientError,
}

/// Everything a run needs to build the financial table set.
#[derive(Debug, Clone, Copy)]
pub struct TableInputs<'a> {
    pub records: &'a [TransactionRecord],
    pub schema: &'a ResolvedSchema,
    pub period: Option<Period>,
    pub pre: Option<Period>,
    pub post: Option<Period>,
    pub order_counting: OrderCounting,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialTables {
    pub set: TableSet,
    pub recommendations: Vec<RecommendationRow>,
    pub skipped: Vec<SkippedTable>,
}

impl FinancialTables {
    fn skip(&mut self, name: &str, schema: &ResolvedSchema, missing: &[&str]) {
        warn!(table = name, missing = ?missing, "table skipped: columns not found");
        self.skipped.push(SkippedTable {
            name: name.to_string(),
            error: ClientError::schema_mismatch(name, missing, schema.headers()),
        });
    }

    fn push(&mut self, name: &str, section: Section, table: Table) {
        debug!(table = name, rows = table.row_count(), "table built");
        self.set.push(NamedTable::new(name, section, table));
    }
}

/// Builds the financial table set in issue order. Unresolvable columns skip
/// the affected tables only.
pub fn build_financial_tables(inputs: &TableInputs<'_>) -> ClientResult<FinancialTables> {
    let mut out = FinancialTables {
        set: TableSet::new(FINANCIAL_SET_LABEL),
        ..FinancialTables::default()
    };
    let schema = inputs.schema;
    let counting = inputs.order_counting;

    let core_missing = schema.missing(&CORE_FIELDS);
    if !core_missing.is_empty() {
        out.skip("all tables", schema, &core_missing);
        return Ok(out);
    }
    let records = inputs.records;
    let has_time = schema.has(CanonicalField::Time);
    let has_store = schema.has(CanonicalField::StoreId);

    // Summary section.
    out.push(
        SUMMARY_SHEET,
        Section::Summary,
        summary_table(aggregate_totals(records, counting).as_ref(), inputs.period),
    );
    out.push(
        CORE_METRICS_SHEET,
        Section::Summary,
        core_metrics_table(core_metrics(records, counting).as_ref()),
    );
    if let (Some(pre), Some(post)) = (inputs.pre, inputs.post) {
        out.push(
            PRE_POST_SHEET,
            Section::Summary,
            pre_post_table(records, pre, post, counting),
        );
    }
    if has_store {
        let store_rows = aggregate(records, &AggregationRequest::new(&[Dimension::Store], counting))?;
        out.recommendations = recommend(&store_rows);
        out.push(STORE_SHEET, Section::Summary, metric_table(&[Dimension::Store], &store_rows));
        out.push(
            RECOMMENDATIONS_SHEET,
            Section::Summary,
            recommendation_table(&out.recommendations),
        );
    } else {
        let missing = schema.missing(&[CanonicalField::StoreId]);
        out.skip(STORE_SHEET, schema, &missing);
        out.skip(RECOMMENDATIONS_SHEET, schema, &missing);
    }

    // Per-dimension section.
    let date_rows = aggregate(records, &AggregationRequest::new(&[Dimension::Date], counting))?;
    out.push(DATE_SHEET, Section::Dimension, metric_table(&[Dimension::Date], &date_rows));
    out.push(
        WEEKDAY_SHEET,
        Section::Dimension,
        weekday_table(&aggregate_weekday_means(records, counting)),
    );
    let day_type_rows = aggregate(records, &AggregationRequest::new(&[Dimension::DayType], counting))?;
    out.push(
        DAY_TYPE_SHEET,
        Section::Dimension,
        metric_table(&[Dimension::DayType], &day_type_rows),
    );
    if has_time {
        let slot_rows = densify_slots(aggregate(
            records,
            &AggregationRequest::new(&[Dimension::Slot], counting),
        )?);
        out.push(SLOT_SHEET, Section::Dimension, metric_table(&[Dimension::Slot], &slot_rows));
        if let (Some(pre), Some(post)) = (inputs.pre, inputs.post) {
            out.push(
                SLOT_PRE_POST_SHEET,
                Section::Dimension,
                slot_pre_post_table(records, pre, post, counting)?,
            );
        }
        out.push(
            DAY_SLOT_SHEET,
            Section::Dimension,
            day_slot_table(&aggregate_day_slots(records, counting)),
        );
    } else {
        let missing = schema.missing(&[CanonicalField::Time]);
        for name in [SLOT_SHEET, SLOT_PRE_POST_SHEET, DAY_SLOT_SHEET] {
            out.skip(name, schema, &missing);
        }
    }

    // Per-entity section.
    if has_time && has_store {
        let store_slot_rows = aggregate(
            records,
            &AggregationRequest::new(&[Dimension::Store, Dimension::Weekday, Dimension::Slot], counting),
        )?;
        for (store, rows) in split_by_store(store_slot_rows) {
            let name = format!("{STORE_DAY_SLOT_PREFIX}{store}");
            out.push(&name, Section::Entity, day_slot_table(&rows));
        }
        let pivot_rows = aggregate(
            records,
            &AggregationRequest::new(&[Dimension::Store, Dimension::Slot], counting),
        )?;
        out.push(STORE_PIVOT_SHEET, Section::Entity, store_slot_pivot(&pivot_rows));
    } else {
        let missing = schema.missing(&[CanonicalField::Time, CanonicalField::StoreId]);
        out.skip(STORE_DAY_SLOT_LABEL, schema, &missing);
        out.skip(STORE_PIVOT_SHEET, schema, &missing);
    }

    Ok(out)
}

fn metric_columns() -> Vec<Column> {
    metric_columns_with_orders(ColumnKind::Count)
}

fn metric_columns_with_orders(orders: ColumnKind) -> Vec<Column> {
    vec![
        Column::new("Sales", ColumnKind::Currency),
        Column::new("Payouts", ColumnKind::Currency),
        Column::new("Profitability", ColumnKind::Percent),
        Column::new("Orders", orders),
        Column::new("AOV", ColumnKind::Currency),
    ]
}

fn metric_cells(row: &MetricRow) -> Vec<CellValue> {
    vec![
        CellValue::Number(row.sales),
        CellValue::Number(row.payouts),
        CellValue::maybe_number(row.profitability),
        CellValue::Number(row.orders),
        CellValue::maybe_number(row.aov),
    ]
}

fn key_columns(dimensions: &[Dimension]) -> Vec<Column> {
    dimensions
        .iter()
        .map(|dimension| Column::new(dimension.column_name(), ColumnKind::Text))
        .collect()
}

fn key_cells(row: &MetricRow) -> Vec<CellValue> {
    row.key
        .iter()
        .map(|value| CellValue::Text(value.display()))
        .collect()
}

pub fn metric_table(dimensions: &[Dimension], rows: &[MetricRow]) -> Table {
    let mut columns = key_columns(dimensions);
    columns.extend(metric_columns());
    let mut table = Table::new(columns);
    for row in rows {
        let mut cells = key_cells(row);
        cells.extend(metric_cells(row));
        table.push_row(cells);
    }
    table
}

/// Weekday means keep fractional order counts, so Orders is not a count.
fn weekday_table(rows: &[MetricRow]) -> Table {
    let mut columns = key_columns(&[Dimension::Weekday]);
    columns.extend(metric_columns_with_orders(ColumnKind::Number));
    let mut table = Table::new(columns);
    for row in rows {
        let mut cells = key_cells(row);
        cells.extend(metric_cells(row));
        table.push_row(cells);
    }
    table
}

fn core_metrics_table(metrics: Option<&CoreMetrics>) -> Table {
    let mut table = Table::new(vec![
        Column::new("Metric", ColumnKind::Text),
        Column::new("Value", ColumnKind::Number),
    ]);
    let Some(metrics) = metrics else {
        return table;
    };

    let rows = [
        ("Total Orders", Some(metrics.orders), ColumnKind::Count),
        ("Gross Sales (Subtotal)", Some(metrics.sales), ColumnKind::Currency),
        ("Net Payout (Net total)", Some(metrics.net_payout), ColumnKind::Currency),
        ("AOV", metrics.aov, ColumnKind::Currency),
        ("Commission %", metrics.commission_pct, ColumnKind::Percent),
        ("Marketing Cost %", metrics.marketing_pct, ColumnKind::Percent),
        ("Processing Fee %", metrics.processing_pct, ColumnKind::Percent),
        ("Contribution", Some(metrics.contribution), ColumnKind::Currency),
        ("Contribution %", metrics.contribution_pct, ColumnKind::Percent),
    ];
    for (label, value, kind) in rows {
        table.push_row_as(vec![CellValue::text(label), CellValue::maybe_number(value)], kind);
    }
    table
}

fn summary_table(totals: Option<&MetricRow>, period: Option<Period>) -> Table {
    let mut columns = vec![
        Column::new("Start Date", ColumnKind::Text),
        Column::new("End Date", ColumnKind::Text),
    ];
    columns.extend(metric_columns());
    let mut table = Table::new(columns);
    if let Some(totals) = totals {
        let mut cells = vec![
            CellValue::maybe_text(period.map(|value| format_iso_date(value.start)).as_deref()),
            CellValue::maybe_text(period.map(|value| format_iso_date(value.end)).as_deref()),
        ];
        cells.extend(metric_cells(totals));
        table.push_row(cells);
    }
    table
}

/// Growth in percent, `None` when the baseline is zero or missing.
pub fn growth_percent(pre: Option<f64>, post: Option<f64>) -> Option<f64> {
    let (pre, post) = (pre?, post?);
    if pre == 0.0 {
        return None;
    }
    Some(round_to((post - pre) / pre * 100.0, 2))
}

fn change(pre: Option<f64>, post: Option<f64>) -> Option<f64> {
    Some(round_to(post? - pre?, 2))
}

fn pre_post_table(
    records: &[TransactionRecord],
    pre: Period,
    post: Period,
    counting: OrderCounting,
) -> Table {
    let mut table = Table::new(vec![
        Column::new("Metric", ColumnKind::Text),
        Column::new(&format!("Pre ({} to {})", format_iso_date(pre.start), format_iso_date(pre.end)), ColumnKind::Number),
        Column::new(&format!("Post ({} to {})", format_iso_date(post.start), format_iso_date(post.end)), ColumnKind::Number),
        Column::new("Change", ColumnKind::Number),
        Column::new("Growth%", ColumnKind::Percent),
    ]);

    let pre_totals = aggregate_totals(&within_period(records, pre), counting);
    let post_totals = aggregate_totals(&within_period(records, post), counting);
    if pre_totals.is_none() && post_totals.is_none() {
        return table;
    }

    type Pick = fn(&MetricRow) -> Option<f64>;
    let metrics: [(&str, Pick, ColumnKind); 5] = [
        ("Sales", |row| Some(row.sales), ColumnKind::Currency),
        ("Payouts", |row| Some(row.payouts), ColumnKind::Currency),
        ("Orders", |row| Some(row.orders), ColumnKind::Count),
        ("AOV", |row| row.aov, ColumnKind::Currency),
        ("Profitability", |row| row.profitability, ColumnKind::Percent),
    ];
    let empty = MetricRow {
        key: Vec::new(),
        sales: 0.0,
        payouts: 0.0,
        orders: 0.0,
        profitability: None,
        aov: None,
    };
    for (label, pick, kind) in metrics {
        let pre_value = pick(pre_totals.as_ref().unwrap_or(&empty));
        let post_value = pick(post_totals.as_ref().unwrap_or(&empty));
        table.push_row_as(
            vec![
                CellValue::text(label),
                CellValue::maybe_number(pre_value),
                CellValue::maybe_number(post_value),
                CellValue::maybe_number(change(pre_value, post_value)),
                CellValue::maybe_number(growth_percent(pre_value, post_value)),
            ],
            kind,
        );
    }
    table
}

fn slot_pre_post_table(
    records: &[TransactionRecord],
    pre: Period,
    post: Period,
    counting: OrderCounting,
) -> ClientResult<Table> {
    let mut table = Table::new(vec![
        Column::new(Dimension::Slot.column_name(), ColumnKind::Text),
        Column::new("Pre Sales", ColumnKind::Currency),
        Column::new("Post Sales", ColumnKind::Currency),
        Column::new("Change", ColumnKind::Currency),
        Column::new("Growth%", ColumnKind::Percent),
        Column::new("Pre Payouts", ColumnKind::Currency),
        Column::new("Post Payouts", ColumnKind::Currency),
    ]);

    let request = AggregationRequest::new(&[Dimension::Slot], counting);
    let pre_rows = aggregate(&within_period(records, pre), &request)?;
    let post_rows = aggregate(&within_period(records, post), &request)?;
    if pre_rows.is_empty() && post_rows.is_empty() {
        return Ok(table);
    }

    let totals_for = |rows: &[MetricRow], slot: Slot| {
        rows.iter()
            .find(|row| row.slot() == Some(slot))
            .map_or((0.0, 0.0), |row| (row.sales, row.payouts))
    };
    for slot in Slot::ALL {
        let (pre_sales, pre_payouts) = totals_for(&pre_rows, slot);
        let (post_sales, post_payouts) = totals_for(&post_rows, slot);
        table.push_row(vec![
            CellValue::text(slot.label()),
            CellValue::Number(pre_sales),
            CellValue::Number(post_sales),
            CellValue::maybe_number(change(Some(pre_sales), Some(post_sales))),
            CellValue::maybe_number(growth_percent(Some(pre_sales), Some(post_sales))),
            CellValue::Number(pre_payouts),
            CellValue::Number(post_payouts),
        ]);
    }
    Ok(table)
}

pub fn day_slot_table(rows: &[DaySlotRow]) -> Table {
    let mut columns = key_columns(&[Dimension::Weekday, Dimension::Slot]);
    columns.extend(metric_columns());
    columns.push(Column::new("Uplift", ColumnKind::Currency));
    columns.push(Column::new("Min.Subtotal", ColumnKind::Currency));
    columns.push(Column::new("Campaign", ColumnKind::Text));

    let mut table = Table::new(columns);
    for row in rows {
        let key = row
            .metrics
            .key
            .iter()
            .filter(|value| matches!(value, DimensionValue::Weekday(_) | DimensionValue::Slot(_)))
            .map(|value| CellValue::Text(value.display()));
        let mut cells = key.collect::<Vec<CellValue>>();
        cells.extend(metric_cells(&row.metrics));
        cells.push(CellValue::maybe_number(row.uplift));
        cells.push(CellValue::maybe_number(row.min_subtotal));
        cells.push(CellValue::maybe_text(row.campaign.as_deref()));
        table.push_row(cells);
    }
    table
}

/// Splits `{Store, Weekday, Slot}` rows into per-store day-slot rows, stores
/// in natural id order.
fn split_by_store(rows: Vec<MetricRow>) -> Vec<(String, Vec<DaySlotRow>)> {
    let mut grouped: Vec<(String, Vec<DaySlotRow>)> = Vec::new();
    for row in rows {
        let Some(store) = row.store().map(str::to_string) else {
            continue;
        };
        let metrics = MetricRow {
            key: row
                .key
                .iter()
                .filter(|value| !matches!(value, DimensionValue::Store(_)))
                .cloned()
                .collect(),
            ..row
        };
        match grouped.last_mut() {
            Some((current, bucket)) if *current == store => bucket.push(day_slot_row(metrics)),
            _ => grouped.push((store, vec![day_slot_row(metrics)])),
        }
    }
    grouped.sort_by(|left, right| compare_store_ids(&left.0, &right.0));
    grouped
}

fn store_slot_pivot(rows: &[MetricRow]) -> Table {
    let mut columns = vec![Column::new(Dimension::Store.column_name(), ColumnKind::Text)];
    columns.extend(
        Slot::ALL
            .iter()
            .map(|slot| Column::new(slot.label(), ColumnKind::Currency)),
    );
    let mut table = Table::new(columns);

    let mut current: Option<(String, [f64; 6])> = None;
    for row in rows {
        let (Some(store), Some(slot)) = (row.store(), row.slot()) else {
            continue;
        };
        if current.as_ref().is_some_and(|(active, _)| active != store)
            && let Some((finished, sales)) = current.take()
        {
            table.push_row(pivot_cells(&finished, &sales));
        }
        let entry = current.get_or_insert_with(|| (store.to_string(), [0.0; 6]));
        if let Some(position) = Slot::ALL.iter().position(|candidate| *candidate == slot) {
            entry.1[position] += row.sales;
        }
    }
    if let Some((finished, sales)) = current {
        table.push_row(pivot_cells(&finished, &sales));
    }
    table
}

fn pivot_cells(store: &str, sales: &[f64; 6]) -> Vec<CellValue> {
    let mut cells = vec![CellValue::text(store)];
    cells.extend(sales.iter().map(|value| CellValue::Number(*value)));
    cells
}

fn recommendation_table(rows: &[RecommendationRow]) -> Table {
    let mut table = Table::new(vec![
        Column::new(Dimension::Store.column_name(), ColumnKind::Text),
        Column::new("AOV", ColumnKind::Currency),
        Column::new("Min order (new cust) B", ColumnKind::Currency),
        Column::new("Discount % (new cust) A", ColumnKind::Count),
        Column::new("Recommendation 1", ColumnKind::Text),
        Column::new("Min order (all cust) C", ColumnKind::Currency),
        Column::new("Recommendation 2", ColumnKind::Text),
    ]);
    for row in rows {
        table.push_row(vec![
            CellValue::text(&row.store_id),
            CellValue::Number(row.aov),
            CellValue::Number(row.min_order_new),
            CellValue::Number(f64::from(row.discount_new)),
            CellValue::text(&row.recommendation_new),
            CellValue::Number(row.min_order_all),
            CellValue::text(&row.recommendation_all),
        ]);
    }
    table
}
