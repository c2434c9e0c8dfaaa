use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::analysis::date::{parse_generic_date, parse_user_date};
use crate::analysis::types::{Period, TransactionRecord};

/// One blackout entry as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludedDate {
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ExcludedDate {
    pub fn normalize(&self) -> Option<NaiveDate> {
        match self {
            Self::Text(value) => parse_user_date(value).or_else(|| parse_generic_date(value)),
            Self::Date(date) => Some(*date),
            Self::DateTime(datetime) => Some(datetime.date()),
        }
    }
}

impl From<&str> for ExcludedDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ExcludedDate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for ExcludedDate {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for ExcludedDate {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedDateSet {
    dates: BTreeSet<NaiveDate>,
    pub ignored: Vec<String>,
}

impl ExcludedDateSet {
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ExcludedDate>,
    {
        let mut set = Self::default();
        for item in items {
            let item = item.into();
            match item.normalize() {
                Some(date) => {
                    set.dates.insert(date);
                }
                None => {
                    let raw = match item {
                        ExcludedDate::Text(value) => value,
                        other => format!("{other:?}"),
                    };
                    warn!(value = %raw, "ignoring unparseable excluded date");
                    set.ignored.push(raw);
                }
            }
        }
        set
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

/// Drops rows whose calendar date is excluded. Undated rows are kept here;
/// date-bearing aggregates skip them on their own.
pub fn filter_excluded(records: &[TransactionRecord], excluded: &ExcludedDateSet) -> Vec<TransactionRecord> {
    if excluded.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| !record.date.is_some_and(|date| excluded.contains(date)))
        .cloned()
        .collect()
}

pub fn within_period(records: &[TransactionRecord], period: Period) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| record.date.is_some_and(|date| period.contains(date)))
        .cloned()
        .collect()
}
