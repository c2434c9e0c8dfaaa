use std::io;

use serde_json::Value;

use super::format::{self, Column, array, count, money, text};

pub fn render_report(data: &Value) -> io::Result<String> {
    if !data.is_object() {
        return Err(io::Error::other("report output requires a data object"));
    }

    let output_path = data.get("output_path").and_then(Value::as_str);
    let mut lines = vec![match output_path {
        Some(path) => format!("Report written: {path}"),
        None => "No workbook was written.".to_string(),
    }];

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.extend(format::key_value_rows(&summary_entries(data), 2));

    let sheets = array(data, "sheets");
    if !sheets.is_empty() {
        lines.push(String::new());
        lines.push(format!("Sheets ({}):", sheets.len()));
        let rows = sheets
            .iter()
            .map(|sheet| {
                vec![
                    text(sheet, "name"),
                    count(sheet, "rows").to_string(),
                    array(sheet, "columns").len().to_string(),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &[Column::left("Sheet"), Column::right("Rows"), Column::right("Columns")],
            &rows,
            format::terminal_width(),
            "Sheet",
        ));
    }

    let skipped = array(data, "skipped_tables");
    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped tables:".to_string());
        for table in skipped {
            lines.push(format!("  - {}: {}", text(table, "name"), text(table, "reason")));
        }
    }

    let recommendations = render_recommendation_rows(data);
    if !recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Campaign recommendations:".to_string());
        lines.extend(recommendations);
    }

    lines.extend(render_warnings(data));

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    match output_path {
        Some(path) => {
            lines.push(format!("  1. Open {path} and review the Summary sheet."));
            lines.push(format!("  2. Run `daypart campaigns {path}` to list day/slot campaigns."));
        }
        None => {
            lines.push("  1. Check the warnings above.".to_string());
            lines.push("  2. Run `daypart report --help` for source and range rules.".to_string());
        }
    }

    Ok(lines.join("\n"))
}

pub fn render_recommend(data: &Value) -> io::Result<String> {
    if !data.is_object() {
        return Err(io::Error::other("recommend output requires a data object"));
    }

    let mut lines = Vec::new();
    let rows = render_recommendation_rows(data);
    if rows.is_empty() {
        lines.push("No store had orders in the report range.".to_string());
    } else {
        lines.push(match range_label(data) {
            Some(range) => format!("Campaign recommendations for {range}:"),
            None => "Campaign recommendations:".to_string(),
        });
        lines.push(String::new());
        lines.extend(rows);
        lines.push(String::new());
        for recommendation in array(data, "recommendations") {
            lines.push(format!("  {}", text(recommendation, "store_id")));
            lines.push(format!("    {}", text(recommendation, "recommendation_new")));
            lines.push(format!("    {}", text(recommendation, "recommendation_all")));
        }
    }
    lines.extend(render_warnings(data));
    Ok(lines.join("\n"))
}

fn summary_entries(data: &Value) -> Vec<(&'static str, String)> {
    let mut entries = vec![("Source:", text(data, "source_path"))];
    if let Some(member) = data.get("member_name").and_then(Value::as_str) {
        entries.push(("Extract:", member.to_string()));
    }
    if let Some(range) = range_label(data) {
        entries.push(("Range:", range));
    }
    for (label, key) in [("Pre period:", "pre_period"), ("Post period:", "post_period")] {
        if let Some(period) = data.get(key).filter(|value| value.is_object()) {
            entries.push((label, format!("{} to {}", text(period, "start"), text(period, "end"))));
        }
    }
    if let Some(load) = data.get("load").filter(|value| value.is_object()) {
        entries.push((
            "Rows loaded:",
            format!(
                "{} of {} ({} non-order)",
                count(load, "rows_loaded"),
                count(load, "rows_read"),
                count(load, "non_order_rows")
            ),
        ));
        entries.push(("Rows excluded:", count(data, "rows_excluded").to_string()));
        entries.push(("Outside range:", count(data, "rows_outside_period").to_string()));
    }
    if let Some(counting) = data.get("order_counting").and_then(Value::as_str) {
        let label = match counting {
            "distinct_ids" => "distinct order ids",
            _ => "one order per row",
        };
        entries.push(("Orders:", label.to_string()));
    }
    let excluded = array(data, "excluded_dates")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<&str>>();
    if !excluded.is_empty() {
        entries.push(("Excluded dates:", excluded.join(", ")));
    }
    entries
}

fn range_label(data: &Value) -> Option<String> {
    let range = data.get("range").filter(|value| value.is_object())?;
    let origin = match range.get("source").and_then(Value::as_str) {
        Some("file_name") => "from file name",
        Some("data") => "from data",
        Some("explicit") => "from --start/--end",
        _ => "unknown origin",
    };
    Some(format!("{} to {} ({origin})", text(range, "start"), text(range, "end")))
}

fn render_recommendation_rows(data: &Value) -> Vec<String> {
    let rows = array(data, "recommendations")
        .iter()
        .map(|row| {
            vec![
                text(row, "store_id"),
                money(row, "aov"),
                money(row, "min_order_new"),
                format!("{}%", count(row, "discount_new")),
                money(row, "min_order_all"),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    if rows.is_empty() {
        return Vec::new();
    }
    format::render_table_or_blocks(
        &[
            Column::left("Store"),
            Column::right("AOV"),
            Column::right("Min order (new)"),
            Column::right("Discount (new)"),
            Column::right("Min order (all)"),
        ],
        &rows,
        format::terminal_width(),
        "Store",
    )
}

fn render_warnings(data: &Value) -> Vec<String> {
    let warnings = array(data, "warnings");
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Warnings:".to_string()];
    lines.extend(
        warnings
            .iter()
            .map(|warning| format!("  - [{}] {}", text(warning, "code"), text(warning, "message"))),
    );
    lines
}
