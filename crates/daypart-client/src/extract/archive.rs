use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::{ClientError, ClientResult};

pub const FINANCIAL_MEMBER_MARKER: &str = "financial_detailed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCsv {
    /// Archive member name, or the file name for a bare CSV.
    pub member_name: String,
    pub content: String,
}

/// Reads the detailed financial CSV from a `.zip` export or a bare `.csv`.
/// `Ok(None)` means the archive opened but holds no matching member.
pub fn read_source(path: &Path) -> ClientResult<Option<SourceCsv>> {
    if !path.is_file() {
        return Err(ClientError::archive_unreadable(path, "file not found"));
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if extension == "csv" {
        let bytes = fs::read(path).map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;
        let member_name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("source.csv")
            .to_string();
        return Ok(Some(SourceCsv {
            member_name,
            content: decode_text(bytes),
        }));
    }

    read_archive_member(path)
}

fn read_archive_member(path: &Path) -> ClientResult<Option<SourceCsv>> {
    let file = File::open(path).map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;
    let mut archive =
        ZipArchive::new(file).map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;

    let mut found = None;
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;
        if is_financial_member(entry.name()) {
            found = Some(index);
            break;
        }
    }
    let Some(index) = found else {
        warn!(path = %path.display(), "archive has no FINANCIAL_DETAILED csv");
        return Ok(None);
    };

    let mut member = archive
        .by_index(index)
        .map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;
    let member_name = member.name().to_string();
    let mut bytes = Vec::new();
    member
        .read_to_end(&mut bytes)
        .map_err(|error| ClientError::archive_unreadable(path, &error.to_string()))?;
    debug!(member = %member_name, bytes = bytes.len(), "financial csv extracted");

    Ok(Some(SourceCsv {
        member_name,
        content: decode_text(bytes),
    }))
}

pub fn is_financial_member(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    lowered.contains(FINANCIAL_MEMBER_MARKER) && lowered.ends_with(".csv")
}

fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    };
    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        return stripped.to_string();
    }
    text
}
