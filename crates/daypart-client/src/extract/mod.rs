pub mod archive;
pub mod parse;
pub mod schema;

use std::path::Path;

use tracing::{debug, info};

pub use parse::{LoadOptions, LoadStats, LoadedExtract};
pub use schema::{CORE_FIELDS, CanonicalField, FEE_FIELDS, ResolvedSchema};

use crate::ClientResult;

/// Loads the financial extract behind `path`. `Ok(None)` when the archive
/// has no detailed financial CSV.
pub fn load_source(path: &Path, options: LoadOptions) -> ClientResult<Option<LoadedExtract>> {
    let Some(source) = archive::read_source(path)? else {
        return Ok(None);
    };
    let loaded = parse::parse_extract(path, &source.member_name, &source.content, options)?;
    info!(
        source = %path.display(),
        member = %loaded.member_name,
        rows = loaded.stats.rows_loaded,
        "financial extract loaded"
    );
    debug!(columns = ?loaded.schema.resolved_columns(), "extract columns resolved");
    Ok(Some(loaded))
}
