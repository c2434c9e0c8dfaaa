use daypart_client::commands;
use daypart_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Report {
            source,
            range,
            operator,
            output_dir,
            json: _,
        } => commands::report::run(
            source.clone(),
            range.start_value(),
            range.end_value(),
            range.exclude.clone(),
            operator.clone(),
            output_dir.clone(),
        ),
        Commands::Recommend { source, range, .. } => commands::recommend::run(
            source.clone(),
            range.start_value(),
            range.end_value(),
            range.exclude.clone(),
        ),
        Commands::Campaigns { workbook, .. } => commands::campaigns::run(workbook.clone()),
    }
}
