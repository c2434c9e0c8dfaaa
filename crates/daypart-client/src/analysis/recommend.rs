use tracing::debug;

use crate::analysis::types::{MetricRow, RecommendationRow};

const STEP: f64 = 5.0;
const MIN_THRESHOLD: f64 = 5.0;
const ALL_CUSTOMER_UPLIFT: f64 = 1.2;
const NEW_CUSTOMER_DEEP_DISCOUNT: u32 = 20;
const NEW_CUSTOMER_DISCOUNT: u32 = 15;

/// Thresholds for one store. `f64::round` breaks exact .5 ties away from zero.
pub fn recommend_for_aov(store_id: &str, aov: f64) -> RecommendationRow {
    let min_order_new = ((aov / STEP).round() * STEP).max(MIN_THRESHOLD);
    let discount_new = if min_order_new > aov {
        NEW_CUSTOMER_DEEP_DISCOUNT
    } else {
        NEW_CUSTOMER_DISCOUNT
    };
    let min_order_all = ((aov * ALL_CUSTOMER_UPLIFT / STEP).ceil() * STEP).max(MIN_THRESHOLD);

    RecommendationRow {
        store_id: store_id.to_string(),
        aov,
        min_order_new,
        discount_new,
        recommendation_new: format!(
            "New customers {discount_new}% off on min order of ${min_order_new:.0} upto Always lowest"
        ),
        min_order_all,
        recommendation_all: format!(
            "All customers 15% off on min order of ${min_order_all:.0} upto Always lowest"
        ),
    }
}

/// One recommendation per store row that has an AOV; stores without orders
/// are skipped.
pub fn recommend(store_rows: &[MetricRow]) -> Vec<RecommendationRow> {
    store_rows
        .iter()
        .filter_map(|row| {
            let store = row.store()?;
            match row.aov {
                Some(aov) => Some(recommend_for_aov(store, aov)),
                None => {
                    debug!(store, "no AOV for store, recommendation skipped");
                    None
                }
            }
        })
        .collect()
}
