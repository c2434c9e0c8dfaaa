pub mod campaigns;
pub mod compose;
pub mod format;
pub mod xlsx;

use serde::Serialize;

pub use compose::{ComposedWorkbook, ComposerSettings, SkippedSheet, compose};

/// Presentation class of a column; drives export-time number formats only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Currency,
    Percent,
    Count,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

impl CellValue {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    pub fn maybe_number(value: Option<f64>) -> Self {
        value.map_or(Self::Blank, Self::Number)
    }

    pub fn maybe_text(value: Option<&str>) -> Self {
        value.map_or(Self::Blank, Self::text)
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::Number(value) => value.is_nan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
    /// Per-row override for `Number` columns, parallel to `rows`.
    pub row_kinds: Vec<Option<ColumnKind>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_kinds: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
        self.row_kinds.push(None);
    }

    /// Adds a row whose `Number` cells render as `kind`, for metric-per-row
    /// layouts mixing money, counts and ratios.
    pub fn push_row_as(&mut self, row: Vec<CellValue>, kind: ColumnKind) {
        self.rows.push(row);
        self.row_kinds.push(Some(kind));
    }

    /// Effective presentation class of one cell.
    pub fn cell_kind(&self, row: usize, column: usize) -> ColumnKind {
        let Some(declared) = self.columns.get(column).map(|value| value.kind) else {
            return ColumnKind::Text;
        };
        match (declared, self.row_kinds.get(row).copied().flatten()) {
            (ColumnKind::Number, Some(kind)) => kind,
            (declared, _) => declared,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// No rows, or every cell blank.
    pub fn has_no_data(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(CellValue::is_blank))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

/// Placement precedence of a sheet within the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Dimension,
    Entity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub name: String,
    pub title: Option<String>,
    pub section: Section,
    pub table: Table,
}

impl NamedTable {
    pub fn new(name: &str, section: Section, table: Table) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            section,
            table,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Tables from one origin, in the order their aggregations were issued.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSet {
    pub label: String,
    pub tables: Vec<NamedTable>,
}

impl TableSet {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            tables: Vec::new(),
        }
    }

    pub fn push(&mut self, table: NamedTable) {
        self.tables.push(table);
    }
}

/// Zero-based row of the title when present.
pub const TITLE_ROW: u32 = 0;
/// Zero-based header row under a title (spreadsheet row 3).
pub const TITLED_HEADER_ROW: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub title: Option<String>,
    pub section: Section,
    pub source_set: String,
    pub table: Table,
}

impl Sheet {
    pub fn header_row(&self) -> u32 {
        if self.title.is_some() {
            TITLED_HEADER_ROW
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, Column, ColumnKind, Table};

    #[test]
    fn row_kind_overrides_number_columns_only() {
        let mut table = Table::new(vec![
            Column::new("Metric", ColumnKind::Text),
            Column::new("Value", ColumnKind::Number),
            Column::new("Growth%", ColumnKind::Percent),
        ]);
        table.push_row_as(
            vec![CellValue::text("Sales"), CellValue::Number(10.0), CellValue::Number(5.0)],
            ColumnKind::Currency,
        );
        table.push_row(vec![CellValue::text("Other"), CellValue::Number(2.0), CellValue::Blank]);

        assert_eq!(table.cell_kind(0, 0), ColumnKind::Text);
        assert_eq!(table.cell_kind(0, 1), ColumnKind::Currency);
        assert_eq!(table.cell_kind(0, 2), ColumnKind::Percent);
        assert_eq!(table.cell_kind(1, 1), ColumnKind::Number);
        assert_eq!(table.cell_kind(0, 9), ColumnKind::Text);
    }
}
