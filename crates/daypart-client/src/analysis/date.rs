use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::analysis::types::Period;
use crate::{ClientError, ClientResult};

const US_DATE_FORMAT: &str = "%m/%d/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const GENERIC_DATE_FORMATS: [&str; 6] = [
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%d %b %Y",
    "%b %d, %Y",
    "%Y%m%d",
];
const GENERIC_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Format chosen once for a whole date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateColumnFormat {
    UsSlash,
    Iso,
    Generic,
}

impl DateColumnFormat {
    pub fn parse(self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self {
            Self::UsSlash => NaiveDate::parse_from_str(trimmed, US_DATE_FORMAT).ok(),
            Self::Iso => NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).ok(),
            Self::Generic => parse_generic_date(trimmed),
        }
    }

    /// First format under which any value in the column parses; the column is
    /// then read with that format only.
    pub fn detect<S: AsRef<str>>(values: &[S]) -> Self {
        for candidate in [Self::UsSlash, Self::Iso] {
            if values
                .iter()
                .any(|value| candidate.parse(value.as_ref()).is_some())
            {
                return candidate;
            }
        }
        Self::Generic
    }
}

pub fn parse_date_column<S: AsRef<str>>(values: &[S]) -> (DateColumnFormat, Vec<Option<NaiveDate>>) {
    let format = DateColumnFormat::detect(values);
    let parsed = values
        .iter()
        .map(|value| format.parse(value.as_ref()))
        .collect::<Vec<Option<NaiveDate>>>();
    (format, parsed)
}

pub fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    for format in [US_DATE_FORMAT, ISO_DATE_FORMAT]
        .into_iter()
        .chain(GENERIC_DATE_FORMATS)
    {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in GENERIC_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Caller-facing date input: MM/DD/YYYY, with ISO accepted as well.
pub fn parse_user_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, US_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
        .ok()
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSource {
    FileName,
    Data,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub period: Period,
    pub source: RangeSource,
}

/// Effective report range: a date pair embedded in the source file name wins,
/// then the min/max of the parsed data dates, then the caller's bounds.
pub fn resolve_range<I>(
    file_name: Option<&str>,
    data_dates: I,
    explicit: Option<Period>,
) -> Option<ResolvedRange>
where
    I: IntoIterator<Item = NaiveDate>,
{
    if let Some(period) = file_name.and_then(range_from_file_name) {
        info!(
            start = %format_iso_date(period.start),
            end = %format_iso_date(period.end),
            "report range taken from file name"
        );
        return Some(ResolvedRange {
            period,
            source: RangeSource::FileName,
        });
    }

    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for date in data_dates {
        bounds = Some(match bounds {
            Some((low, high)) => (low.min(date), high.max(date)),
            None => (date, date),
        });
    }
    if let Some((start, end)) = bounds {
        info!(
            start = %format_iso_date(start),
            end = %format_iso_date(end),
            "report range inferred from data"
        );
        return Some(ResolvedRange {
            period: Period { start, end },
            source: RangeSource::Data,
        });
    }

    explicit.map(|period| ResolvedRange {
        period,
        source: RangeSource::Explicit,
    })
}

/// Finds the first `YYYY-MM-DD_YYYY-MM-DD` window in a file name.
pub fn range_from_file_name(file_name: &str) -> Option<Period> {
    const WINDOW: usize = 21;
    let bytes = file_name.as_bytes();
    if bytes.len() < WINDOW {
        return None;
    }

    for offset in 0..=(bytes.len() - WINDOW) {
        let window = &bytes[offset..offset + WINDOW];
        if !is_iso_date_shape(&window[..10]) || window[10] != b'_' || !is_iso_date_shape(&window[11..]) {
            continue;
        }
        let Some(text) = file_name.get(offset..offset + WINDOW) else {
            continue;
        };
        let start = NaiveDate::parse_from_str(&text[..10], ISO_DATE_FORMAT).ok();
        let end = NaiveDate::parse_from_str(&text[11..], ISO_DATE_FORMAT).ok();
        if let (Some(start), Some(end)) = (start, end)
            && start <= end
        {
            return Some(Period { start, end });
        }
    }
    None
}

fn is_iso_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Splits a range into contiguous pre/post halves. A single-day range yields
/// that day for both halves.
pub fn split_period(period: Period) -> (Period, Period) {
    let total_days = period.days();
    if total_days <= 1 {
        let single = Period {
            start: period.start,
            end: period.start,
        };
        return (single, single);
    }

    let half = total_days / 2;
    let pre_end = period.start + Duration::days(half - 1);
    let pre = Period {
        start: period.start,
        end: pre_end,
    };
    let post = Period {
        start: pre_end + Duration::days(1),
        end: period.end,
    };
    (pre, post)
}

pub fn explicit_period(
    start: Option<&str>,
    end: Option<&str>,
    command: &str,
) -> ClientResult<Option<Period>> {
    let parsed_start = start.map(|value| parse_argument_date(value, "start", command)).transpose()?;
    let parsed_end = end.map(|value| parse_argument_date(value, "end", command)).transpose()?;

    match (parsed_start, parsed_end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(ClientError::invalid_argument_for_command(
                    "Invalid date range: `start` must be on or before `end`.",
                    Some(command),
                ));
            }
            Ok(Some(Period { start, end }))
        }
        (None, None) => Ok(None),
        _ => Err(ClientError::invalid_argument_for_command(
            "Pass both `--start` and `--end`, or neither.",
            Some(command),
        )),
    }
}

fn parse_argument_date(value: &str, field: &str, command: &str) -> ClientResult<NaiveDate> {
    parse_user_date(value).ok_or_else(|| {
        ClientError::invalid_argument_for_command(
            &format!("Invalid `{field}` date `{value}`; expected MM/DD/YYYY."),
            Some(command),
        )
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        DateColumnFormat, RangeSource, explicit_period, parse_date_column, range_from_file_name,
        resolve_range, split_period,
    };
    use crate::analysis::types::Period;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn file_name_range_overrides_explicit_dates() {
        let explicit = Some(Period {
            start: date(2026, 1, 1),
            end: date(2026, 1, 31),
        });
        let resolved = resolve_range(
            Some("financial_2026-02-12_2026-02-18_store.zip"),
            vec![date(2026, 3, 1)],
            explicit,
        );
        assert!(resolved.is_some());
        if let Some(range) = resolved {
            assert_eq!(range.source, RangeSource::FileName);
            assert_eq!(range.period.start, date(2026, 2, 12));
            assert_eq!(range.period.end, date(2026, 2, 18));
        }
    }

    #[test]
    fn data_bounds_come_before_explicit_dates() {
        let resolved = resolve_range(
            Some("export.zip"),
            vec![date(2026, 2, 14), date(2026, 2, 10), date(2026, 2, 12)],
            None,
        );
        assert_eq!(
            resolved.map(|range| (range.source, range.period)),
            Some((
                RangeSource::Data,
                Period {
                    start: date(2026, 2, 10),
                    end: date(2026, 2, 14),
                }
            ))
        );
    }

    #[test]
    fn explicit_dates_are_last_resort() {
        let explicit = Period {
            start: date(2026, 1, 1),
            end: date(2026, 1, 7),
        };
        let resolved = resolve_range(None, Vec::new(), Some(explicit));
        assert_eq!(
            resolved.map(|range| range.source),
            Some(RangeSource::Explicit)
        );
        assert!(resolve_range(None, Vec::new(), None).is_none());
    }

    #[test]
    fn inverted_or_malformed_file_name_pairs_are_ignored() {
        assert!(range_from_file_name("financial_2026-02-18_2026-02-12.zip").is_none());
        assert!(range_from_file_name("financial_2026-13-01_2026-14-01.zip").is_none());
        assert!(range_from_file_name("short.zip").is_none());
    }

    #[test]
    fn split_uses_floor_half_for_pre_period() {
        let (pre, post) = split_period(Period {
            start: date(2026, 2, 12),
            end: date(2026, 2, 18),
        });
        assert_eq!(pre.start, date(2026, 2, 12));
        assert_eq!(pre.end, date(2026, 2, 14));
        assert_eq!(post.start, date(2026, 2, 15));
        assert_eq!(post.end, date(2026, 2, 18));
    }

    #[test]
    fn split_of_single_day_repeats_the_day() {
        let day = Period {
            start: date(2026, 7, 4),
            end: date(2026, 7, 4),
        };
        assert_eq!(split_period(day), (day, day));
    }

    #[test]
    fn column_format_prefers_us_then_iso_then_generic() {
        let (format, parsed) = parse_date_column(&["02/12/2026", "", "2026-02-13"]);
        assert_eq!(format, DateColumnFormat::UsSlash);
        assert_eq!(parsed, vec![Some(date(2026, 2, 12)), None, None]);

        let (format, parsed) = parse_date_column(&["2026-02-13"]);
        assert_eq!(format, DateColumnFormat::Iso);
        assert_eq!(parsed, vec![Some(date(2026, 2, 13))]);

        let (format, parsed) = parse_date_column(&["2026-02-13 10:15:00"]);
        assert_eq!(format, DateColumnFormat::Generic);
        assert_eq!(parsed, vec![Some(date(2026, 2, 13))]);
    }

    #[test]
    fn explicit_period_requires_both_bounds_in_order() {
        assert!(matches!(explicit_period(None, None, "report"), Ok(None)));
        assert!(explicit_period(Some("02/12/2026"), None, "report").is_err());
        assert!(explicit_period(Some("02/18/2026"), Some("02/12/2026"), "report").is_err());
        assert!(explicit_period(Some("13/45/2026"), Some("02/12/2026"), "report").is_err());
        let parsed = explicit_period(Some("02/12/2026"), Some("2026-02-18"), "report");
        assert!(parsed.is_ok());
        if let Ok(Some(period)) = parsed {
            assert_eq!(period.days(), 7);
        }
    }
}
