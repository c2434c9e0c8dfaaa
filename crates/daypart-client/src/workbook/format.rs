use crate::workbook::{CellValue, ColumnKind};

pub const CURRENCY_NUM_FORMAT: &str = "$#,##0.00";
pub const PERCENT_NUM_FORMAT: &str = "0.0\"%\"";
pub const COUNT_NUM_FORMAT: &str = "#,##0";
pub const NUMBER_NUM_FORMAT: &str = "#,##0.00";

/// Spreadsheet number format for a column class. Stored values stay raw.
pub const fn num_format(kind: ColumnKind) -> Option<&'static str> {
    match kind {
        ColumnKind::Currency => Some(CURRENCY_NUM_FORMAT),
        ColumnKind::Percent => Some(PERCENT_NUM_FORMAT),
        ColumnKind::Count => Some(COUNT_NUM_FORMAT),
        ColumnKind::Number => Some(NUMBER_NUM_FORMAT),
        ColumnKind::Text => None,
    }
}

/// Text rendering matching the workbook formats; blanks stay empty.
pub fn display_cell(value: &CellValue, kind: ColumnKind) -> String {
    match value {
        CellValue::Blank => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Number(number) if number.is_nan() => String::new(),
        CellValue::Number(number) => match kind {
            ColumnKind::Currency => format_currency(*number),
            ColumnKind::Percent => format!("{number:.1}%"),
            ColumnKind::Count => {
                if number.fract() == 0.0 {
                    group_thousands(&format!("{number:.0}"))
                } else {
                    group_thousands(&format!("{number:.2}"))
                }
            }
            ColumnKind::Number => group_thousands(&format!("{number:.2}")),
            ColumnKind::Text => number.to_string(),
        },
    }
}

pub fn format_currency(value: f64) -> String {
    let grouped = group_thousands(&format!("{:.2}", value.abs()));
    if value < 0.0 && grouped.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
