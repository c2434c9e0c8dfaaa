use std::path::Path;

use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::workbook::format::{display_cell, num_format};
use crate::workbook::{CellValue, ColumnKind, Sheet, TITLE_ROW, Workbook};
use crate::{ClientError, ClientResult};

const TITLE_FONT_SIZE: f64 = 12.0;
const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;

struct SheetFormats {
    title: Format,
    header: Format,
    text: Format,
    currency: Format,
    percent: Format,
    count: Format,
    number: Format,
}

impl SheetFormats {
    fn new() -> Self {
        let numeric = |kind: ColumnKind| match num_format(kind) {
            Some(pattern) => Format::new().set_num_format(pattern),
            None => Format::new(),
        };
        Self {
            title: Format::new().set_bold().set_font_size(TITLE_FONT_SIZE),
            header: Format::new().set_bold(),
            text: Format::new(),
            currency: numeric(ColumnKind::Currency),
            percent: numeric(ColumnKind::Percent),
            count: numeric(ColumnKind::Count),
            number: numeric(ColumnKind::Number),
        }
    }

    fn for_kind(&self, kind: ColumnKind) -> &Format {
        match kind {
            ColumnKind::Text => &self.text,
            ColumnKind::Currency => &self.currency,
            ColumnKind::Percent => &self.percent,
            ColumnKind::Count => &self.count,
            ColumnKind::Number => &self.number,
        }
    }
}

/// Writes every sheet to an `.xlsx` file. Null cells are left empty.
pub fn write_workbook(workbook: &Workbook, path: &Path) -> ClientResult<()> {
    let mut xlsx = build(workbook).map_err(|error| write_error(path, &error))?;
    xlsx.save(path).map_err(|error| write_error(path, &error))?;
    info!(path = %path.display(), sheets = workbook.sheets.len(), "workbook written");
    Ok(())
}

fn build(workbook: &Workbook) -> Result<XlsxWorkbook, XlsxError> {
    let formats = SheetFormats::new();
    let mut xlsx = XlsxWorkbook::new();
    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &formats)?;
        debug!(sheet = %sheet.name, rows = sheet.table.row_count(), "sheet laid out");
    }
    Ok(xlsx)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &SheetFormats) -> Result<(), XlsxError> {
    if let Some(title) = &sheet.title {
        worksheet.write_string_with_format(TITLE_ROW, 0, title, &formats.title)?;
    }

    let header_row = sheet.header_row();
    for (column_index, column) in sheet.table.columns.iter().enumerate() {
        let col = column_number(column_index)?;
        worksheet.write_string_with_format(header_row, col, &column.name, &formats.header)?;
    }

    for (row_offset, cells) in sheet.table.rows.iter().enumerate() {
        let row = header_row + 1 + row_number(row_offset)?;
        for (column_index, cell) in cells.iter().take(sheet.table.columns.len()).enumerate() {
            let col = column_number(column_index)?;
            let format = formats.for_kind(sheet.table.cell_kind(row_offset, column_index));
            match cell {
                CellValue::Text(value) => {
                    worksheet.write_string_with_format(row, col, value, format)?;
                }
                CellValue::Number(value) if value.is_finite() => {
                    worksheet.write_number_with_format(row, col, *value, format)?;
                }
                CellValue::Number(_) | CellValue::Blank => {}
            }
        }
    }

    for (column_index, column) in sheet.table.columns.iter().enumerate() {
        let widest = sheet
            .table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(row_offset, cells)| {
                cells
                    .get(column_index)
                    .map(|cell| display_cell(cell, sheet.table.cell_kind(row_offset, column_index)))
            })
            .map(|text| text.chars().count())
            .chain(std::iter::once(column.name.chars().count()))
            .max()
            .unwrap_or(MIN_COLUMN_WIDTH);
        let width = (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet.set_column_width(column_number(column_index)?, width as f64)?;
    }

    Ok(())
}

fn column_number(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn row_number(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_error(path: &Path, error: &XlsxError) -> ClientError {
    ClientError::workbook_write_failed(path, &error.to_string())
}
