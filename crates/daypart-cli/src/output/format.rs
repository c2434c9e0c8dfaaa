use std::cmp;

use daypart_client::workbook::format::format_currency;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: usize = 2;
const COLUMN_GAP: usize = 2;
const MIN_COLUMN_WIDTH: usize = 6;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

/// Column table when it fits in `max_width`, otherwise one labelled block
/// per row. Cells are never truncated.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let widths = natural_widths(columns, rows);
    let needed = INDENT + widths.iter().sum::<usize>() + COLUMN_GAP * columns.len().saturating_sub(1);
    let floor = INDENT + MIN_COLUMN_WIDTH * columns.len() + COLUMN_GAP * columns.len().saturating_sub(1);
    if needed > max_width && floor > max_width {
        return render_blocks(columns, rows, block_label);
    }
    if needed > max_width {
        let Some(fitted) = shrink_widest(&widths, columns, max_width) else {
            return render_blocks(columns, rows, block_label);
        };
        return render_wrapped(columns, rows, &fitted);
    }

    let mut output = vec![format_row(
        columns,
        &columns
            .iter()
            .map(|column| column.name.to_string())
            .collect::<Vec<String>>(),
        &widths,
    )];
    output.extend(rows.iter().map(|row| format_row(columns, row, &widths)));
    output
}

fn natural_widths(columns: &[Column<'_>], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths = columns
        .iter()
        .map(|column| column.name.chars().count())
        .collect::<Vec<usize>>();
    for row in rows {
        for (index, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = cmp::max(*width, value.chars().count());
            }
        }
    }
    widths
}

/// Narrows the widest text column until the row fits; headers keep their
/// full width.
fn shrink_widest(widths: &[usize], columns: &[Column<'_>], max_width: usize) -> Option<Vec<usize>> {
    let mut fitted = widths.to_vec();
    let budget = max_width.saturating_sub(INDENT + COLUMN_GAP * columns.len().saturating_sub(1));
    loop {
        let total = fitted.iter().sum::<usize>();
        if total <= budget {
            return Some(fitted);
        }
        let candidate = fitted
            .iter()
            .enumerate()
            .filter(|(index, width)| {
                let floor = cmp::max(columns[*index].name.chars().count(), MIN_COLUMN_WIDTH);
                **width > floor
            })
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index)?;
        fitted[candidate] -= 1;
    }
}

fn render_wrapped(columns: &[Column<'_>], rows: &[Vec<String>], widths: &[usize]) -> Vec<String> {
    let headers = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let mut output = vec![format_row(columns, &headers, widths)];
    for row in rows {
        let wrapped = widths
            .iter()
            .enumerate()
            .map(|(index, width)| wrap_text(row.get(index).map_or("", String::as_str), *width))
            .collect::<Vec<Vec<String>>>();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        for line in 0..height {
            let cells = wrapped
                .iter()
                .map(|chunks| chunks.get(line).cloned().unwrap_or_default())
                .collect::<Vec<String>>();
            output.push(format_row(columns, &cells, widths));
        }
    }
    output
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let width = widths.get(index).copied().unwrap_or(MIN_COLUMN_WIDTH);
            let value = cells.get(index).map_or("", String::as_str);
            match column.align {
                Align::Left => format!("{value:<width$}"),
                Align::Right => format!("{value:>width$}"),
            }
        })
        .collect::<Vec<String>>();
    format!("{}{}", " ".repeat(INDENT), pieces.join(&" ".repeat(COLUMN_GAP)).trim_end())
}

fn wrap_text(value: &str, width: usize) -> Vec<String> {
    if width == 0 || value.chars().count() <= width {
        return vec![value.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in value.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
        }
        if word_len <= width {
            current.push_str(word);
        } else {
            let chars = word.chars().collect::<Vec<char>>();
            lines.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("  {block_label} {}:", row_index + 1));
        for (column_index, label) in labels.iter().enumerate() {
            let value = row.get(column_index).map_or("", String::as_str);
            output.push(format!("    {label:<label_width$}  {value}"));
        }
    }
    output
}

pub fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

pub fn count(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Dollar amount, or `-` when the field is null or missing.
pub fn money(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map_or_else(|| "-".to_string(), format_currency)
}

pub fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Column, array, key_value_rows, money, render_table_or_blocks, wrap_text};

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[
                ("Rows read:", "9".to_string()),
                ("Rows excluded:", "2".to_string()),
            ],
            2,
        );
        assert_eq!(rows[0], "  Rows read:      9");
        assert_eq!(rows[1], "  Rows excluded:  2");
    }

    #[test]
    fn table_renders_header_and_aligned_cells() {
        let columns = [Column::left("Store"), Column::right("AOV")];
        let rows = vec![
            vec!["101".to_string(), "$58.00".to_string()],
            vec!["9".to_string(), "$1,250.50".to_string()],
        ];
        let rendered = render_table_or_blocks(&columns, &rows, 80, "Store");
        assert_eq!(rendered[0], "  Store        AOV");
        assert_eq!(rendered[1], "  101       $58.00");
        assert_eq!(rendered[2], "  9      $1,250.50");
    }

    #[test]
    fn long_campaign_names_wrap_without_truncating() {
        let columns = [Column::left("Day"), Column::left("Campaign")];
        let rows = vec![vec![
            "Thursday".to_string(),
            "All customers 15% off on min order of 120 upto Always lowest".to_string(),
        ]];
        let rendered = render_table_or_blocks(&columns, &rows, 44, "Row");
        assert!(rendered[0].contains("Campaign"));
        let joined = rendered.join(" ");
        for word in ["All", "customers", "120", "Always", "lowest"] {
            assert!(joined.contains(word), "{word}");
        }
        assert!(rendered.iter().all(|line| line.chars().count() <= 44));
    }

    #[test]
    fn narrow_width_falls_back_to_blocks() {
        let columns = [
            Column::left("Store"),
            Column::left("Day"),
            Column::left("Slot"),
            Column::right("Min.Subtotal"),
        ];
        let rows = vec![vec![
            "101".to_string(),
            "Tuesday".to_string(),
            "Lunch".to_string(),
            "$75.00".to_string(),
        ]];
        let rendered = render_table_or_blocks(&columns, &rows, 20, "Campaign");
        assert_eq!(rendered[0], "  Campaign 1:");
        assert!(rendered[1].contains("Store:"));
        assert!(rendered[4].contains("Min.Subtotal:"));
    }

    #[test]
    fn wrap_splits_overlong_tokens_on_char_boundaries() {
        assert_eq!(wrap_text("éééé", 3), vec!["ééé".to_string(), "é".to_string()]);
        assert_eq!(wrap_text("Late night", 20), vec!["Late night".to_string()]);
    }

    #[test]
    fn json_helpers_tolerate_missing_fields() {
        let value = json!({"aov": 58.0, "profitability": null, "rows": [1, 2]});
        assert_eq!(money(&value, "aov"), "$58.00");
        assert_eq!(money(&value, "profitability"), "-");
        assert_eq!(array(&value, "rows").len(), 2);
        assert!(array(&value, "missing").is_empty());
    }
}
