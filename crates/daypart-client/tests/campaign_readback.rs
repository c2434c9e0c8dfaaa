mod support;

use std::path::Path;

use daypart_client::commands::campaigns;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::Value;
use support::report_testkit::{report_options, run_report_payload, temp_workspace, week_zip};

fn combos_payload(path: &Path) -> Value {
    let result = campaigns::run_at(path);
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let value = serde_json::to_value(envelope);
        assert!(value.is_ok());
        if let Ok(payload) = value {
            return payload;
        }
    }
    Value::Null
}

fn combo_tuples(payload: &Value) -> Vec<(String, String, String, f64)> {
    payload["data"]["combos"]
        .as_array()
        .map(|combos| {
            combos
                .iter()
                .map(|combo| {
                    (
                        combo["store_id"].as_str().unwrap_or_default().to_string(),
                        combo["day"].as_str().unwrap_or_default().to_string(),
                        combo["slot"].as_str().unwrap_or_default().to_string(),
                        combo["min_subtotal"].as_f64().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn tuple(store: &str, day: &str, slot: &str, min_subtotal: f64) -> (String, String, String, f64) {
    (store.to_string(), day.to_string(), slot.to_string(), min_subtotal)
}

fn write_manual_workbook(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Day-Slot - 77")?;
    sheet.write_string(0, 0, "Day")?;
    sheet.write_string(0, 1, "Slot")?;
    sheet.write_string(0, 2, "Min.Subtotal")?;
    sheet.write_string(1, 0, "Monday")?;
    sheet.write_string(1, 1, "Lunch")?;
    sheet.write_string(1, 2, "$35.00")?;
    sheet.write_string(2, 0, "Tuesday")?;
    sheet.write_string(2, 1, "Dinner")?;
    sheet.write_string(4, 0, "Friday")?;
    sheet.write_string(4, 1, "Lunch")?;
    sheet.write_number(4, 2, 40.0)?;

    let notes = workbook.add_worksheet();
    notes.set_name("Day-Slot - 88")?;
    notes.write_string(0, 0, "Day")?;
    notes.write_string(0, 1, "Notes")?;
    notes.write_string(1, 0, "Monday")?;

    let other = workbook.add_worksheet();
    other.set_name("Summary")?;
    other.write_string(0, 0, "Day")?;

    workbook.save(path)
}

#[test]
fn produced_report_reads_back_per_store_combos() {
    let workspace = temp_workspace("daypart-campaigns-report-");
    assert!(workspace.is_ok());
    if let Ok((dir, out)) = workspace {
        let source = week_zip(dir.path(), "orders_export.zip");
        let report = run_report_payload(report_options(&source, &out));
        let output = report["data"]["output_path"].as_str().unwrap_or_default().to_string();
        assert!(!output.is_empty());

        let payload = combos_payload(Path::new(&output));
        assert_eq!(payload["command"], "campaigns");
        assert_eq!(
            payload["data"]["sheets_read"],
            serde_json::json!(["Day-Slot - 101", "Day-Slot - 202"])
        );
        assert_eq!(
            combo_tuples(&payload),
            vec![
                tuple("101", "Tuesday", "Lunch", 75.0),
                tuple("101", "Thursday", "Breakfast", 120.0),
                tuple("101", "Thursday", "Lunch", 60.0),
                tuple("101", "Sunday", "Early morning", 30.0),
                tuple("202", "Monday", "Afternoon", 30.0),
                tuple("202", "Wednesday", "Breakfast", 45.0),
                tuple("202", "Friday", "Late night", 40.0),
                tuple("202", "Saturday", "Dinner", 55.0),
            ]
        );
        assert_eq!(
            payload["data"]["combos"][0]["campaign_name"],
            "TODC-101-Tuesday-Lunch"
        );
        assert_eq!(payload["data"]["combos"][0]["sheet"], "Day-Slot - 101");
    }
}

#[test]
fn untitled_sheets_use_first_row_header_and_stop_at_blank_rows() {
    let workspace = temp_workspace("daypart-campaigns-manual-");
    assert!(workspace.is_ok());
    if let Ok((dir, _)) = workspace {
        let path = dir.path().join("manual.xlsx");
        assert!(write_manual_workbook(&path).is_ok());

        let payload = combos_payload(&path);
        assert_eq!(
            combo_tuples(&payload),
            vec![
                tuple("77", "Monday", "Lunch", 35.0),
                tuple("77", "Tuesday", "Dinner", 20.0),
            ]
        );
        assert_eq!(payload["data"]["sheets_read"], serde_json::json!(["Day-Slot - 77"]));
        assert_eq!(payload["data"]["sheets_skipped"], serde_json::json!(["Day-Slot - 88"]));
    }
}

#[test]
fn missing_or_foreign_workbook_fails_to_read() {
    let workspace = temp_workspace("daypart-campaigns-missing-");
    assert!(workspace.is_ok());
    if let Ok((dir, _)) = workspace {
        let missing = campaigns::run_at(&dir.path().join("absent.xlsx"));
        assert!(missing.is_err());
        if let Err(error) = missing {
            assert_eq!(error.code, "workbook_read_failed");
        }

        let bogus = dir.path().join("bogus.xlsx");
        assert!(std::fs::write(&bogus, "plain text").is_ok());
        let unreadable = campaigns::run_at(&bogus);
        assert!(unreadable.is_err());
        if let Err(error) = unreadable {
            assert_eq!(error.code, "workbook_read_failed");
        }
    }
}
