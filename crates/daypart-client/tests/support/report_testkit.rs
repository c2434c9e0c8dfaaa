#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use daypart_client::commands::report::{self, ReportOptions};
use serde_json::Value;
use tempfile::{Builder, TempDir};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const FINANCIAL_HEADER: &str = "Timestamp local date,Timestamp local time,Transaction type,DoorDash order ID,Merchant store ID,Subtotal,Net total";

/// One week of orders for stores 101 and 202, Thursday 2026-02-12 through
/// Wednesday 2026-02-18, plus one adjustment row that must be ignored.
pub const WEEK_ROWS: [&str; 9] = [
    "02/12/2026,09:00:00,Order,D1,101,100.00,80.00",
    "02/12/2026,13:00:00,Order,D2,101,50.00,40.00",
    "02/13/2026,19:30:00,Order,D3,202,30.00,21.00",
    "02/14/2026,18:00:00,Order,D4,202,44.00,30.00",
    "02/15/2026,02:30:00,Order,D5,101,22.00,15.00",
    "02/16/2026,15:00:00,Order,D6,202,25.00,18.00",
    "02/17/2026,12:00:00,Order,D7,101,60.00,45.00",
    "02/18/2026,08:15:00,Order,D8,202,35.00,25.00",
    "02/18/2026,08:20:00,Adjustment,D8,202,-5.00,-5.00",
];

pub fn temp_workspace(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    let out = dir.path().join("reports");
    Ok((dir, out))
}

pub fn week_csv() -> String {
    csv_body(FINANCIAL_HEADER, &WEEK_ROWS)
}

pub fn csv_body(header: &str, rows: &[&str]) -> String {
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body
}

pub fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let result = fs::write(&path, body);
    assert!(result.is_ok());
    path
}

pub fn write_zip(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path);
    assert!(file.is_ok());
    if let Ok(file) = file {
        let mut writer = ZipWriter::new(file);
        for (member, body) in members {
            let started = writer.start_file(*member, SimpleFileOptions::default());
            assert!(started.is_ok());
            assert!(writer.write_all(body.as_bytes()).is_ok());
        }
        assert!(writer.finish().is_ok());
    }
    path
}

pub fn week_zip(dir: &Path, name: &str) -> PathBuf {
    let body = week_csv();
    write_zip(
        dir,
        name,
        &[
            ("README.txt", "export"),
            ("FINANCIAL_DETAILED_TRANSACTIONS_2026.csv", body.as_str()),
        ],
    )
}

pub fn fixed_generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 2, 19)
        .and_then(|date| date.and_hms_opt(8, 30, 0))
        .unwrap_or_default()
}

pub fn report_options<'a>(source: &Path, out_dir: &'a Path) -> ReportOptions<'a> {
    ReportOptions {
        output_dir: Some(out_dir),
        generated_at: Some(fixed_generated_at()),
        ..ReportOptions::new(source.to_path_buf())
    }
}

pub fn run_report_payload(options: ReportOptions<'_>) -> Value {
    let result = report::run_with_options(options);
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

pub fn sheet_names(payload: &Value) -> Vec<String> {
    payload["data"]["sheets"]
        .as_array()
        .map(|sheets| {
            sheets
                .iter()
                .filter_map(|sheet| sheet["name"].as_str())
                .map(std::string::ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn sheet_rows(payload: &Value, name: &str) -> Option<u64> {
    payload["data"]["sheets"]
        .as_array()?
        .iter()
        .find(|sheet| sheet["name"] == name)
        .and_then(|sheet| sheet["rows"].as_u64())
}

pub fn warning_codes(payload: &Value) -> Vec<String> {
    payload["data"]["warnings"]
        .as_array()
        .map(|warnings| {
            warnings
                .iter()
                .filter_map(|warning| warning["code"].as_str())
                .map(std::string::ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
