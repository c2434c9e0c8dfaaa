use serde::Serialize;
use tracing::{debug, warn};

use crate::workbook::{NamedTable, Section, Sheet, TableSet, Workbook};

/// Local spreadsheet limit on sheet title length.
pub const MAX_SHEET_NAME_LEN: usize = 31;
pub const FALLBACK_SHEET_NAME: &str = "Sheet";
const FORBIDDEN_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSettings {
    pub max_name_len: usize,
    /// Untitled tables get their requested name as title.
    pub default_titles: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            max_name_len: MAX_SHEET_NAME_LEN,
            default_titles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSheet {
    pub name: String,
    pub source_set: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposedWorkbook {
    pub workbook: Workbook,
    pub skipped: Vec<SkippedSheet>,
}

/// Merges table sets into one workbook: summary sheets first, then
/// per-dimension, then per-entity; ties keep set order and issue order.
pub fn compose(sets: &[TableSet], settings: &ComposerSettings) -> ComposedWorkbook {
    let mut placed: Vec<(Section, usize, usize, &str, &NamedTable)> = Vec::new();
    for (set_index, set) in sets.iter().enumerate() {
        for (table_index, named) in set.tables.iter().enumerate() {
            placed.push((named.section, set_index, table_index, set.label.as_str(), named));
        }
    }
    placed.sort_by_key(|(section, set_index, table_index, _, _)| (*section, *set_index, *table_index));

    let mut composed = ComposedWorkbook::default();
    let mut taken: Vec<String> = Vec::new();

    for (section, _, _, source_set, named) in placed {
        if named.table.has_no_data() {
            debug!(sheet = %named.name, source_set, "empty table contributes no sheet");
            composed.skipped.push(SkippedSheet {
                name: named.name.clone(),
                source_set: source_set.to_string(),
                reason: "no data".to_string(),
            });
            continue;
        }

        let base = sanitize_sheet_name(&named.name, settings.max_name_len);
        let name = unique_sheet_name(&base, &taken, settings.max_name_len);
        if name != named.name {
            debug!(requested = %named.name, resolved = %name, "sheet renamed");
        }
        taken.push(name.clone());

        let title = match (&named.title, settings.default_titles) {
            (Some(title), _) => Some(title.clone()),
            (None, true) => Some(named.name.clone()),
            (None, false) => None,
        };

        composed.workbook.sheets.push(Sheet {
            name,
            title,
            section,
            source_set: source_set.to_string(),
            table: named.table.clone(),
        });
    }

    if composed.workbook.is_empty() && !composed.skipped.is_empty() {
        warn!(skipped = composed.skipped.len(), "every table was empty; workbook has no sheets");
    }
    composed
}

/// Strips characters the format forbids, trims stray quotes and whitespace,
/// and truncates to `max_len` characters.
pub fn sanitize_sheet_name(name: &str, max_len: usize) -> String {
    let cleaned = name
        .chars()
        .filter(|ch| !FORBIDDEN_CHARS.contains(ch))
        .collect::<String>();
    let trimmed = cleaned.trim().trim_matches('\'').trim();
    let candidate = if trimmed.is_empty() {
        FALLBACK_SHEET_NAME
    } else {
        trimmed
    };
    truncate_chars(candidate, max_len)
}

/// Appends `_1`, `_2`, ... until the name is unused (case-insensitive),
/// shortening the base so the suffix always fits.
pub fn unique_sheet_name(base: &str, taken: &[String], max_len: usize) -> String {
    let in_use = |candidate: &str| {
        let lowered = candidate.to_lowercase();
        taken.iter().any(|name| name.to_lowercase() == lowered)
    };
    if !in_use(base) {
        return base.to_string();
    }

    let mut counter = 1_usize;
    loop {
        let suffix = format!("_{counter}");
        let room = max_len.saturating_sub(suffix.chars().count());
        let candidate = format!("{}{suffix}", truncate_chars(base, room));
        if !in_use(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::{ComposerSettings, compose, sanitize_sheet_name, unique_sheet_name};
    use crate::workbook::{CellValue, Column, ColumnKind, NamedTable, Section, Table, TableSet};

    fn table_with_rows(rows: usize) -> Table {
        let mut table = Table::new(vec![Column::new("Sales", ColumnKind::Currency)]);
        for index in 0..rows {
            table.push_row(vec![CellValue::Number(index as f64 + 1.0)]);
        }
        table
    }

    #[test]
    fn duplicate_names_get_numeric_suffixes() {
        let mut set = TableSet::new("financial");
        set.push(NamedTable::new("Day-Slot - 123", Section::Entity, table_with_rows(1)));
        set.push(NamedTable::new("Day-Slot - 123", Section::Entity, table_with_rows(1)));
        set.push(NamedTable::new("day-slot - 123", Section::Entity, table_with_rows(1)));
        let composed = compose(&[set], &ComposerSettings::default());
        assert_eq!(
            composed.workbook.sheet_names(),
            vec!["Day-Slot - 123", "Day-Slot - 123_1", "day-slot - 123_2"]
        );
    }

    #[test]
    fn sections_order_sheets_across_sets() {
        let mut financial = TableSet::new("financial");
        financial.push(NamedTable::new("Store Slot Pivot", Section::Entity, table_with_rows(1)));
        financial.push(NamedTable::new("Date-wise", Section::Dimension, table_with_rows(1)));
        financial.push(NamedTable::new("Summary", Section::Summary, table_with_rows(1)));
        let mut marketing = TableSet::new("marketing");
        marketing.push(NamedTable::new("Campaigns", Section::Summary, table_with_rows(1)));
        marketing.push(NamedTable::new("Slot", Section::Dimension, table_with_rows(1)));

        let composed = compose(&[financial, marketing], &ComposerSettings::default());
        assert_eq!(
            composed.workbook.sheet_names(),
            vec!["Summary", "Campaigns", "Date-wise", "Slot", "Store Slot Pivot"]
        );
    }

    #[test]
    fn empty_and_all_blank_tables_are_skipped() {
        let mut blank = Table::new(vec![Column::new("AOV", ColumnKind::Currency)]);
        blank.push_row(vec![CellValue::Blank]);
        let mut set = TableSet::new("financial");
        set.push(NamedTable::new("Empty", Section::Summary, table_with_rows(0)));
        set.push(NamedTable::new("Blank", Section::Summary, blank));
        set.push(NamedTable::new("Kept", Section::Summary, table_with_rows(2)));

        let composed = compose(&[set], &ComposerSettings::default());
        assert_eq!(composed.workbook.sheet_names(), vec!["Kept"]);
        assert_eq!(composed.skipped.len(), 2);
    }

    #[test]
    fn titles_default_to_requested_name_and_move_the_header() {
        let mut set = TableSet::new("financial");
        set.push(NamedTable::new("Slot", Section::Dimension, table_with_rows(1)));
        let titled = compose(&[set.clone()], &ComposerSettings::default());
        assert_eq!(titled.workbook.sheets[0].title.as_deref(), Some("Slot"));
        assert_eq!(titled.workbook.sheets[0].header_row(), 2);

        let untitled = compose(
            &[set],
            &ComposerSettings {
                default_titles: false,
                ..ComposerSettings::default()
            },
        );
        assert_eq!(untitled.workbook.sheets[0].title, None);
        assert_eq!(untitled.workbook.sheets[0].header_row(), 0);
    }

    #[test]
    fn names_are_stripped_and_truncated() {
        assert_eq!(sanitize_sheet_name("Sales [Pre/Post]: *?", 31), "Sales PrePost");
        assert_eq!(sanitize_sheet_name("///", 31), "Sheet");
        let long = "Day-Slot - 12345678901234567890123";
        let sanitized = sanitize_sheet_name(long, 31);
        assert_eq!(sanitized.chars().count(), 31);

        let taken = vec![sanitized.clone()];
        let next = unique_sheet_name(&sanitized, &taken, 31);
        assert_eq!(next.chars().count(), 31);
        assert!(next.ends_with("_1"));
    }
}
