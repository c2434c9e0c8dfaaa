use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const REPORT_HELP_COMMAND: &str = "daypart report --help";
pub(crate) const REPORT_HELP_SECTION_TITLE: &str = "Report Troubleshooting";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_report_help_data(self, data: Value) -> Self {
        self.with_data(merge_report_help_data(data))
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `daypart {cmd} --help` for usage."),
            None => "Run `daypart --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn archive_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "archive_unreadable",
            &format!("Could not read report source `{location}`: {detail}"),
            vec![
                "Verify the path exists and points to a .zip or .csv extract.".to_string(),
                "Re-download the financial report if the archive is truncated.".to_string(),
            ],
        )
        .with_report_help_data(json!({
            "source_path": location,
        }))
    }

    pub fn missing_data(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "missing_data",
            &format!("No FINANCIAL_DETAILED CSV was found in `{location}`."),
            vec![
                "Confirm the archive is the detailed financial export.".to_string(),
                "Or pass the extracted CSV path directly.".to_string(),
            ],
        )
        .with_report_help_data(json!({
            "source_path": location,
        }))
    }

    pub fn schema_mismatch(table: &str, missing_fields: &[&str], actual_headers: &[String]) -> Self {
        let missing = missing_fields.join(", ");
        Self::new(
            "schema_mismatch",
            &format!("Table `{table}` was skipped: no column found for {missing}."),
            vec![
                "Check the extract headers against the documented column synonyms.".to_string(),
                "Other tables in the report are unaffected.".to_string(),
            ],
        )
        .with_report_help_data(json!({
            "table": table,
            "missing_fields": missing_fields,
            "actual_headers": actual_headers,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn output_dir_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "output_dir_failed",
            &format!("Cannot prepare output directory `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `DAYPART_OUTPUT_DIR` to a writable directory."
            )],
        )
    }

    pub fn workbook_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "workbook_write_failed",
            &format!("Writing workbook `{location}` failed: {detail}"),
            vec![format!(
                "Close any program holding `{location}` open and rerun the report."
            )],
        )
    }

    pub fn workbook_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "workbook_read_failed",
            &format!("Could not read workbook `{location}`: {detail}"),
            vec![
                "Pass an .xlsx file produced by `daypart report`.".to_string(),
                "Regenerate the report if the file was edited by hand.".to_string(),
            ],
        )
    }
}

fn merge_report_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(REPORT_HELP_COMMAND.to_string()),
        );
        object.insert(
            "help_section_title".to_string(),
            Value::String(REPORT_HELP_SECTION_TITLE.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;
