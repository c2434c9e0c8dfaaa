use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::workbook::TITLED_HEADER_ROW;
use crate::{ClientError, ClientResult};

pub const DEFAULT_MIN_SUBTOTAL: f64 = 20.0;
pub const DAY_COLUMN: &str = "Day";
pub const SLOT_COLUMN: &str = "Slot";
pub const MIN_SUBTOTAL_COLUMN: &str = "Min.Subtotal";
const DAY_SLOT_MARKER: &str = "day-slot";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignCombo {
    pub store_id: String,
    pub day: String,
    pub slot: String,
    pub min_subtotal: f64,
    pub campaign_name: String,
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CampaignReadback {
    pub combos: Vec<CampaignCombo>,
    pub sheets_read: Vec<String>,
    pub sheets_skipped: Vec<String>,
}

/// Store id from `Day-Slot - {store}`, optionally prefixed (e.g.
/// `Financial - Day-Slot - 14351`).
pub fn store_from_sheet_name(sheet_name: &str) -> Option<String> {
    let lowered = sheet_name.to_ascii_lowercase();
    let start = lowered.find(DAY_SLOT_MARKER)? + DAY_SLOT_MARKER.len();
    let rest = sheet_name.get(start..)?.trim_start();
    let store = rest.strip_prefix('-')?.trim();
    if store.is_empty() {
        return None;
    }
    Some(store.to_string())
}

pub fn campaign_name(store_id: &str, day: &str, slot: &str) -> String {
    format!("TODC-{store_id}-{day}-{slot}")
}

/// Reads every per-store day-slot sheet of a produced report.
pub fn read_campaign_combos(path: &Path) -> ClientResult<CampaignReadback> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|error: calamine::XlsxError| ClientError::workbook_read_failed(path, &error.to_string()))?;

    let mut readback = CampaignReadback::default();
    for sheet_name in workbook.sheet_names() {
        let Some(store_id) = store_from_sheet_name(&sheet_name) else {
            continue;
        };

        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(error) => {
                warn!(sheet = %sheet_name, %error, "skipping unreadable day-slot sheet");
                readback.sheets_skipped.push(sheet_name);
                continue;
            }
        };

        match combos_from_range(&range, &store_id, &sheet_name) {
            Some(combos) => {
                debug!(sheet = %sheet_name, combos = combos.len(), "day-slot sheet read");
                readback.combos.extend(combos);
                readback.sheets_read.push(sheet_name);
            }
            None => {
                debug!(sheet = %sheet_name, "no Day/Slot/Min.Subtotal header, sheet skipped");
                readback.sheets_skipped.push(sheet_name);
            }
        }
    }

    info!(
        path = %path.display(),
        combos = readback.combos.len(),
        "campaign combos read"
    );
    Ok(readback)
}

/// Rows below the header until Day or Slot is blank. `None` when the sheet
/// has no recognizable header at either offset.
pub fn combos_from_range(range: &Range<Data>, store_id: &str, sheet_name: &str) -> Option<Vec<CampaignCombo>> {
    let header_row = [TITLED_HEADER_ROW, 0]
        .into_iter()
        .find(|row| header_columns(range, *row).is_some())?;
    let (day_col, slot_col, min_col) = header_columns(range, header_row)?;
    let (last_row, _) = range.end()?;

    let mut combos = Vec::new();
    for row in (header_row + 1)..=last_row {
        let day = cell_text(range.get_value((row, day_col)));
        let slot = cell_text(range.get_value((row, slot_col)));
        let (Some(day), Some(slot)) = (day, slot) else {
            break;
        };
        let min_subtotal = parse_min_subtotal(range.get_value((row, min_col)));
        combos.push(CampaignCombo {
            store_id: store_id.to_string(),
            campaign_name: campaign_name(store_id, &day, &slot),
            day,
            slot,
            min_subtotal,
            sheet: sheet_name.to_string(),
        });
    }
    Some(combos)
}

fn header_columns(range: &Range<Data>, row: u32) -> Option<(u32, u32, u32)> {
    let (_, last_col) = range.end()?;
    let mut day = None;
    let mut slot = None;
    let mut min_subtotal = None;
    for col in 0..=last_col {
        let Some(name) = cell_text(range.get_value((row, col))) else {
            continue;
        };
        match name.as_str() {
            DAY_COLUMN => day = day.or(Some(col)),
            SLOT_COLUMN => slot = slot.or(Some(col)),
            MIN_SUBTOTAL_COLUMN => min_subtotal = min_subtotal.or(Some(col)),
            _ => {}
        }
    }
    Some((day?, slot?, min_subtotal?))
}

fn cell_text(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Numbers are taken as-is, text may carry `$` and thousands separators;
/// anything missing, unparseable or non-positive becomes the default.
pub fn parse_min_subtotal(cell: Option<&Data>) -> f64 {
    let parsed = match cell {
        Some(Data::Float(value)) => Some(*value),
        Some(Data::Int(value)) => Some(*value as f64),
        Some(Data::String(value)) => {
            let cleaned = value.trim().replace(['$', ','], "");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    match parsed {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => DEFAULT_MIN_SUBTOTAL,
    }
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::{campaign_name, parse_min_subtotal, store_from_sheet_name};

    #[test]
    fn store_id_comes_from_sheet_name() {
        assert_eq!(store_from_sheet_name("Day-Slot - 14351"), Some("14351".to_string()));
        assert_eq!(
            store_from_sheet_name("Financial - Day-Slot - 14351"),
            Some("14351".to_string())
        );
        assert_eq!(store_from_sheet_name("day-slot-77"), Some("77".to_string()));
        assert_eq!(store_from_sheet_name("Day-Slot"), None);
        assert_eq!(store_from_sheet_name("Day-Slot - "), None);
        assert_eq!(store_from_sheet_name("Slot Pre vs Post"), None);
    }

    #[test]
    fn min_subtotal_falls_back_to_twenty() {
        assert_eq!(parse_min_subtotal(Some(&Data::Float(30.0))), 30.0);
        assert_eq!(parse_min_subtotal(Some(&Data::Int(25))), 25.0);
        assert_eq!(
            parse_min_subtotal(Some(&Data::String("$1,020.00".to_string()))),
            1020.0
        );
        assert_eq!(parse_min_subtotal(Some(&Data::String("n/a".to_string()))), 20.0);
        assert_eq!(parse_min_subtotal(Some(&Data::Float(0.0))), 20.0);
        assert_eq!(parse_min_subtotal(Some(&Data::Float(-5.0))), 20.0);
        assert_eq!(parse_min_subtotal(Some(&Data::Empty)), 20.0);
        assert_eq!(parse_min_subtotal(None), 20.0);
    }

    #[test]
    fn campaign_name_joins_store_day_and_slot() {
        assert_eq!(campaign_name("14351", "Monday", "Lunch"), "TODC-14351-Monday-Lunch");
    }
}
