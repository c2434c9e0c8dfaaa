use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::analysis::types::Slot;

const TIME_FORMATS: [&str; 5] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p", "%H:%M:%S%.f"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Half-open minute-of-day upper bounds, paired with the slot they close.
const SLOT_BOUNDS: [(u32, Slot); 6] = [
    (300, Slot::EarlyMorning),
    (659, Slot::Breakfast),
    (839, Slot::Lunch),
    (959, Slot::Afternoon),
    (1159, Slot::Dinner),
    (1440, Slot::LateNight),
];

pub fn classify_minute(minute_of_day: u32) -> Option<Slot> {
    SLOT_BOUNDS
        .iter()
        .find(|(upper, _)| minute_of_day < *upper)
        .map(|(_, slot)| *slot)
}

pub fn classify_time(time: NaiveTime) -> Option<Slot> {
    classify_minute(time.hour() * 60 + time.minute())
}

pub fn classify(value: Option<&str>) -> Option<Slot> {
    parse_time_of_day(value?).and_then(classify_time)
}

pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Some(time);
        }
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.time())
}
