use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::{ClientError, ClientResult};

pub const OUTPUT_DIR_ENV: &str = "DAYPART_OUTPUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const REPORT_KIND: &str = "analysis_report";

pub fn resolve_output_dir(dir_override: Option<&Path>) -> ClientResult<PathBuf> {
    let candidate = match dir_override {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(OUTPUT_DIR_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
        },
    };

    absolutize(&candidate)
}

pub fn ensure_output_dir(path: &Path) -> ClientResult<()> {
    fs::create_dir_all(path).map_err(|error| map_io_error(path, &error))
}

/// `{operator}_analysis_report_{YYYYMMDD_HHMMSS}.xlsx`, operator part omitted
/// when no tag is given.
pub fn report_file_name(operator: Option<&str>, generated_at: NaiveDateTime) -> String {
    let stamp = generated_at.format("%Y%m%d_%H%M%S");
    match operator.map(sanitize_operator_tag).filter(|tag| !tag.is_empty()) {
        Some(tag) => format!("{tag}_{REPORT_KIND}_{stamp}.xlsx"),
        None => format!("{REPORT_KIND}_{stamp}.xlsx"),
    }
}

pub fn map_io_error(path: &Path, error: &std::io::Error) -> ClientError {
    ClientError::output_dir_failed(path, &error.to_string())
}

fn sanitize_operator_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn absolutize(path: &Path) -> ClientResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| ClientError::output_dir_failed(path, &error.to_string()))
}
