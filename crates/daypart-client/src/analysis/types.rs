use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub store_id: Option<String>,
    pub order_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub sales: f64,
    pub payout: f64,
    pub fees: FeeAmounts,
}

/// Platform deductions on an order row. Columns absent from the extract read
/// as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeeAmounts {
    pub commission: f64,
    pub marketing: f64,
    pub processing: f64,
    pub customer_discounts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Date,
    Weekday,
    DayType,
    Slot,
    Store,
}

impl Dimension {
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Weekday => "Day",
            Self::DayType => "Day Type",
            Self::Slot => "Slot",
            Self::Store => "Merchant Store ID",
        }
    }
}

/// Day-part buckets in business order; declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Slot {
    EarlyMorning,
    Breakfast,
    Lunch,
    Afternoon,
    Dinner,
    LateNight,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::EarlyMorning,
        Slot::Breakfast,
        Slot::Lunch,
        Slot::Afternoon,
        Slot::Dinner,
        Slot::LateNight,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::EarlyMorning => "Early morning",
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Afternoon => "Afternoon",
            Self::Dinner => "Dinner",
            Self::LateNight => "Late night",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|slot| slot.label().eq_ignore_ascii_case(needle))
    }
}

/// Monday to Friday versus Saturday and Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub const fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat | Weekday::Sun => Self::Weekend,
            _ => Self::Weekday,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Weekday => "Weekday",
            Self::Weekend => "Weekend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderCounting {
    /// Distinct non-blank order ids per group.
    DistinctIds,
    RowCount,
}

impl OrderCounting {
    pub const fn for_id_column(has_order_id: bool) -> Self {
        if has_order_id {
            Self::DistinctIds
        } else {
            Self::RowCount
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub dimensions: Vec<Dimension>,
    pub order_counting: OrderCounting,
}

impl AggregationRequest {
    pub fn new(dimensions: &[Dimension], order_counting: OrderCounting) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            order_counting,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimensionValue {
    Date(NaiveDate),
    Weekday(Weekday),
    DayType(DayType),
    Slot(Slot),
    Store(String),
}

impl DimensionValue {
    pub fn display(&self) -> String {
        match self {
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::Weekday(weekday) => weekday_name(*weekday).to_string(),
            Self::DayType(day_type) => day_type.label().to_string(),
            Self::Slot(slot) => slot.label().to_string(),
            Self::Store(store) => store.clone(),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Date(_) => 0,
            Self::Weekday(_) => 1,
            Self::DayType(_) => 2,
            Self::Slot(_) => 3,
            Self::Store(_) => 4,
        }
    }
}

impl Ord for DimensionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (Self::Weekday(left), Self::Weekday(right)) => left
                .number_from_monday()
                .cmp(&right.number_from_monday()),
            (Self::DayType(left), Self::DayType(right)) => left.cmp(right),
            (Self::Slot(left), Self::Slot(right)) => left.cmp(right),
            (Self::Store(left), Self::Store(right)) => compare_store_ids(left, right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for DimensionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric ids compare as numbers, anything else lexically.
pub fn compare_store_ids(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| left.cmp(right)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub key: Vec<DimensionValue>,
    pub sales: f64,
    pub payouts: f64,
    pub orders: f64,
    pub profitability: Option<f64>,
    pub aov: Option<f64>,
}

impl MetricRow {
    pub fn store(&self) -> Option<&str> {
        self.key.iter().find_map(|value| match value {
            DimensionValue::Store(store) => Some(store.as_str()),
            _ => None,
        })
    }

    pub fn slot(&self) -> Option<Slot> {
        self.key.iter().find_map(|value| match value {
            DimensionValue::Slot(slot) => Some(*slot),
            _ => None,
        })
    }
}

/// Whole-period order economics after platform deductions. Shares are
/// percent of sales and null when sales are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreMetrics {
    pub orders: f64,
    pub sales: f64,
    pub net_payout: f64,
    pub aov: Option<f64>,
    pub commission_pct: Option<f64>,
    pub marketing_pct: Option<f64>,
    pub processing_pct: Option<f64>,
    /// Sales less commission, marketing fees, processing fees and discounts
    /// the store funded.
    pub contribution: f64,
    pub contribution_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySlotRow {
    pub metrics: MetricRow,
    pub uplift: Option<f64>,
    pub min_subtotal: Option<f64>,
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRow {
    pub store_id: String,
    pub aov: f64,
    pub min_order_new: f64,
    pub discount_new: u32,
    pub recommendation_new: String,
    pub min_order_all: f64,
    pub recommendation_all: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::{DayType, DimensionValue, Slot, compare_store_ids};

    #[test]
    fn weekday_values_sort_from_monday() {
        let mut values = vec![
            DimensionValue::Weekday(Weekday::Sun),
            DimensionValue::Weekday(Weekday::Fri),
            DimensionValue::Weekday(Weekday::Mon),
        ];
        values.sort();
        let names = values
            .iter()
            .map(DimensionValue::display)
            .collect::<Vec<String>>();
        assert_eq!(names, vec!["Monday", "Friday", "Sunday"]);
    }

    #[test]
    fn slot_values_sort_in_business_order() {
        let mut values = vec![
            DimensionValue::Slot(Slot::LateNight),
            DimensionValue::Slot(Slot::Afternoon),
            DimensionValue::Slot(Slot::EarlyMorning),
        ];
        values.sort();
        assert_eq!(values[0], DimensionValue::Slot(Slot::EarlyMorning));
        assert_eq!(values[2], DimensionValue::Slot(Slot::LateNight));
    }

    #[test]
    fn weekend_is_saturday_and_sunday() {
        assert_eq!(DayType::of(Weekday::Fri), DayType::Weekday);
        assert_eq!(DayType::of(Weekday::Sat), DayType::Weekend);
        assert_eq!(DayType::of(Weekday::Sun), DayType::Weekend);
        assert!(DimensionValue::DayType(DayType::Weekday) < DimensionValue::DayType(DayType::Weekend));
    }

    #[test]
    fn store_ids_use_natural_order() {
        assert!(compare_store_ids("9", "10").is_lt());
        assert!(compare_store_ids("10", "abc").is_lt());
        assert!(compare_store_ids("abc", "abd").is_lt());
    }
}
