use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use tracing::debug;

use crate::analysis::round_to;
use crate::analysis::slot::classify_time;
use crate::analysis::types::{
    AggregationRequest, CoreMetrics, DaySlotRow, DayType, Dimension, DimensionValue, FeeAmounts,
    MetricRow, OrderCounting, Slot, TransactionRecord,
};
use crate::{ClientError, ClientResult};

const CAMPAIGN_UPLIFT: f64 = 1.2;
const THRESHOLD_STEP: f64 = 5.0;

#[derive(Debug, Default)]
struct GroupTotals {
    sales: f64,
    payouts: f64,
    rows: u64,
    order_ids: BTreeSet<String>,
}

impl GroupTotals {
    fn add(&mut self, record: &TransactionRecord) {
        self.sales += record.sales;
        self.payouts += record.payout;
        self.rows += 1;
        if let Some(order_id) = record.order_id.as_deref().map(str::trim)
            && !order_id.is_empty()
        {
            self.order_ids.insert(order_id.to_string());
        }
    }

    fn into_row(self, key: Vec<DimensionValue>, counting: OrderCounting) -> MetricRow {
        let orders = match counting {
            OrderCounting::DistinctIds => self.order_ids.len() as f64,
            OrderCounting::RowCount => self.rows as f64,
        };
        MetricRow {
            key,
            sales: self.sales,
            payouts: self.payouts,
            orders,
            profitability: profitability(self.sales, self.payouts),
            aov: average_order_value(self.sales, orders),
        }
    }
}

pub fn profitability(sales: f64, payouts: f64) -> Option<f64> {
    if sales == 0.0 {
        return None;
    }
    Some(round_to(payouts / sales * 100.0, 2))
}

pub fn average_order_value(sales: f64, orders: f64) -> Option<f64> {
    if orders == 0.0 {
        return None;
    }
    Some(round_to(sales / orders, 2))
}

/// Groups records by the requested dimensions. Rows missing any requested
/// dimension are dropped; output is sorted by the composite key.
pub fn aggregate(
    records: &[TransactionRecord],
    request: &AggregationRequest,
) -> ClientResult<Vec<MetricRow>> {
    validate_dimensions(&request.dimensions)?;
    Ok(group(records, &request.dimensions, request.order_counting))
}

/// Single overall row with an empty key, or `None` when there are no records.
pub fn aggregate_totals(records: &[TransactionRecord], counting: OrderCounting) -> Option<MetricRow> {
    group(records, &[], counting).into_iter().next()
}

pub fn core_metrics(records: &[TransactionRecord], counting: OrderCounting) -> Option<CoreMetrics> {
    let totals = aggregate_totals(records, counting)?;
    let fees = records.iter().fold(FeeAmounts::default(), |sum, record| FeeAmounts {
        commission: sum.commission + record.fees.commission,
        marketing: sum.marketing + record.fees.marketing,
        processing: sum.processing + record.fees.processing,
        customer_discounts: sum.customer_discounts + record.fees.customer_discounts,
    });
    let contribution =
        totals.sales - fees.commission - fees.marketing - fees.processing - fees.customer_discounts;
    let share = |amount: f64| (totals.sales != 0.0).then(|| round_to(amount / totals.sales * 100.0, 2));

    Some(CoreMetrics {
        orders: totals.orders,
        sales: totals.sales,
        net_payout: totals.payouts,
        aov: totals.aov,
        commission_pct: share(fees.commission),
        marketing_pct: share(fees.marketing),
        processing_pct: share(fees.processing),
        contribution,
        contribution_pct: share(contribution),
    })
}

/// Weekday figures as the mean of per-date figures, so one heavy day does not
/// dominate its weekday.
pub fn aggregate_weekday_means(
    records: &[TransactionRecord],
    counting: OrderCounting,
) -> Vec<MetricRow> {
    let per_date = group(records, &[Dimension::Date], counting);

    let mut by_weekday: BTreeMap<DimensionValue, Vec<&MetricRow>> = BTreeMap::new();
    for row in &per_date {
        if let Some(DimensionValue::Date(date)) = row.key.first() {
            by_weekday
                .entry(DimensionValue::Weekday(date.weekday()))
                .or_default()
                .push(row);
        }
    }

    by_weekday
        .into_iter()
        .map(|(weekday, rows)| MetricRow {
            key: vec![weekday],
            sales: round_to(mean(rows.iter().map(|row| row.sales)).unwrap_or(0.0), 2),
            payouts: round_to(mean(rows.iter().map(|row| row.payouts)).unwrap_or(0.0), 2),
            orders: round_to(mean(rows.iter().map(|row| row.orders)).unwrap_or(0.0), 2),
            profitability: mean(rows.iter().filter_map(|row| row.profitability))
                .map(|value| round_to(value, 2)),
            aov: mean(rows.iter().filter_map(|row| row.aov)).map(|value| round_to(value, 2)),
        })
        .collect()
}

/// Slot-only rows padded to all six slots in business order. Empty input
/// stays empty.
pub fn densify_slots(rows: Vec<MetricRow>) -> Vec<MetricRow> {
    if rows.is_empty() {
        return rows;
    }

    let mut by_slot = rows
        .into_iter()
        .filter_map(|row| row.slot().map(|slot| (slot, row)))
        .collect::<BTreeMap<Slot, MetricRow>>();

    Slot::ALL
        .into_iter()
        .map(|slot| {
            by_slot.remove(&slot).unwrap_or_else(|| MetricRow {
                key: vec![DimensionValue::Slot(slot)],
                sales: 0.0,
                payouts: 0.0,
                orders: 0.0,
                profitability: None,
                aov: None,
            })
        })
        .collect()
}

/// Weekday x slot rows with the campaign threshold derived from AOV.
pub fn aggregate_day_slots(
    records: &[TransactionRecord],
    counting: OrderCounting,
) -> Vec<DaySlotRow> {
    group(records, &[Dimension::Weekday, Dimension::Slot], counting)
        .into_iter()
        .map(day_slot_row)
        .collect()
}

pub fn day_slot_row(metrics: MetricRow) -> DaySlotRow {
    let uplift = metrics.aov.map(|aov| round_to(aov * CAMPAIGN_UPLIFT, 2));
    let min_subtotal = uplift.map(|value| (value / THRESHOLD_STEP).ceil() * THRESHOLD_STEP);
    let campaign = min_subtotal.map(|value| {
        format!("All customers 15% off on min order of {value:.0} upto Always lowest")
    });
    DaySlotRow {
        metrics,
        uplift,
        min_subtotal,
        campaign,
    }
}

fn group(
    records: &[TransactionRecord],
    dimensions: &[Dimension],
    counting: OrderCounting,
) -> Vec<MetricRow> {
    let mut groups: BTreeMap<Vec<DimensionValue>, GroupTotals> = BTreeMap::new();
    let mut dropped = 0_usize;

    for record in records {
        let Some(key) = dimension_key(record, dimensions) else {
            dropped += 1;
            continue;
        };
        groups.entry(key).or_default().add(record);
    }

    if dropped > 0 {
        debug!(
            dimensions = ?dimensions,
            dropped,
            "rows without a value for a requested dimension were left out"
        );
    }

    groups
        .into_iter()
        .map(|(key, totals)| totals.into_row(key, counting))
        .collect()
}

fn dimension_key(record: &TransactionRecord, dimensions: &[Dimension]) -> Option<Vec<DimensionValue>> {
    dimensions
        .iter()
        .map(|dimension| dimension_value(record, *dimension))
        .collect()
}

fn dimension_value(record: &TransactionRecord, dimension: Dimension) -> Option<DimensionValue> {
    match dimension {
        Dimension::Date => record.date.map(DimensionValue::Date),
        Dimension::Weekday => record
            .date
            .map(|date| DimensionValue::Weekday(date.weekday())),
        Dimension::DayType => record
            .date
            .map(|date| DimensionValue::DayType(DayType::of(date.weekday()))),
        Dimension::Slot => record
            .time
            .and_then(classify_time)
            .map(DimensionValue::Slot),
        Dimension::Store => record
            .store_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| DimensionValue::Store(value.to_string())),
    }
}

fn validate_dimensions(dimensions: &[Dimension]) -> ClientResult<()> {
    if dimensions.is_empty() {
        return Err(ClientError::invalid_argument(
            "An aggregation needs at least one dimension.",
        ));
    }
    let unique = dimensions.iter().collect::<BTreeSet<&Dimension>>();
    if unique.len() != dimensions.len() {
        return Err(ClientError::invalid_argument(
            "An aggregation cannot repeat a dimension.",
        ));
    }
    Ok(())
}

fn mean<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = f64>,
{
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / f64::from(count))
}
