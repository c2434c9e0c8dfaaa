use std::path::{Path, PathBuf};

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CampaignCombosData;
use crate::workbook::campaigns::read_campaign_combos;
use crate::{ClientError, ClientResult};

pub fn run(workbook: PathBuf) -> ClientResult<SuccessEnvelope> {
    run_at(&workbook)
}

#[doc(hidden)]
pub fn run_at(workbook: &Path) -> ClientResult<SuccessEnvelope> {
    if !workbook.is_file() {
        return Err(ClientError::workbook_read_failed(workbook, "file not found"));
    }

    let readback = read_campaign_combos(workbook)?;
    success(
        "campaigns",
        CampaignCombosData {
            workbook_path: workbook.display().to_string(),
            sheets_read: readback.sheets_read,
            sheets_skipped: readback.sheets_skipped,
            combos: readback.combos,
        },
    )
}
