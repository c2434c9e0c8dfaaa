use std::io;

use serde_json::Value;

use super::format::{self, Column, array, money, text};

pub fn render_campaigns(data: &Value) -> io::Result<String> {
    let combos = data
        .get("combos")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("campaigns output requires combos"))?;
    let workbook = text(data, "workbook_path");

    let mut lines = Vec::new();
    if combos.is_empty() {
        lines.push(format!("No day/slot campaigns found in {workbook}."));
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push("  1. Pass a workbook written by `daypart report` with a time column in the extract.".to_string());
    } else {
        let stores = {
            let mut ids = combos
                .iter()
                .map(|combo| text(combo, "store_id"))
                .collect::<Vec<String>>();
            ids.dedup();
            ids.len()
        };
        lines.push(format!(
            "{} campaign(s) across {stores} store(s) in {workbook}:",
            combos.len()
        ));
        lines.push(String::new());
        let rows = combos
            .iter()
            .map(|combo| {
                vec![
                    text(combo, "store_id"),
                    text(combo, "day"),
                    text(combo, "slot"),
                    money(combo, "min_subtotal"),
                    text(combo, "campaign_name"),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &[
                Column::left("Store"),
                Column::left("Day"),
                Column::left("Slot"),
                Column::right("Min.Subtotal"),
                Column::left("Campaign"),
            ],
            &rows,
            format::terminal_width(),
            "Campaign",
        ));
    }

    let skipped = array(data, "sheets_skipped")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<&str>>();
    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Sheets without a Day/Slot/Min.Subtotal header: {}",
            skipped.join(", ")
        ));
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_campaigns;

    #[test]
    fn lists_each_combo_with_threshold() {
        let data = json!({
            "workbook_path": "reports/r.xlsx",
            "sheets_read": ["Day-Slot - 101", "Day-Slot - 202"],
            "sheets_skipped": [],
            "combos": [
                {"store_id": "101", "day": "Tuesday", "slot": "Lunch", "min_subtotal": 75.0, "campaign_name": "TODC-101-Tuesday-Lunch"},
                {"store_id": "101", "day": "Sunday", "slot": "Early morning", "min_subtotal": 30.0, "campaign_name": "TODC-101-Sunday-Early morning"},
                {"store_id": "202", "day": "Monday", "slot": "Afternoon", "min_subtotal": 20.0, "campaign_name": "TODC-202-Monday-Afternoon"}
            ]
        });

        let rendered = render_campaigns(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("3 campaign(s) across 2 store(s) in reports/r.xlsx:"));
            assert!(text.contains("TODC-101-Tuesday-Lunch"));
            assert!(text.contains("$75.00"));
            assert!(text.contains("Early morning"));
            assert!(!text.contains("without a Day/Slot"));
        }
    }

    #[test]
    fn empty_workbook_and_skipped_sheets_are_explained() {
        let data = json!({
            "workbook_path": "r.xlsx",
            "sheets_read": [],
            "sheets_skipped": ["Day-Slot - 88"],
            "combos": []
        });

        let rendered = render_campaigns(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("No day/slot campaigns found in r.xlsx."));
            assert!(text.contains("Sheets without a Day/Slot/Min.Subtotal header: Day-Slot - 88"));
        }
    }

    #[test]
    fn missing_combos_is_an_error() {
        assert!(render_campaigns(&json!({})).is_err());
    }
}
