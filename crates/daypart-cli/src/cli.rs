use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

const US_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsDate(pub String);

impl UsDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_us_date(value: &str) -> Result<UsDate, String> {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return Err("date must use MM/DD/YYYY format".to_string());
    }
    if NaiveDate::parse_from_str(trimmed, US_DATE_FORMAT).is_err() {
        return Err("date must use valid calendar values".to_string());
    }
    Ok(UsDate(trimmed.to_string()))
}

/// Extended help shown after `daypart report --help`.
pub const REPORT_AFTER_HELP: &str = "\
How the report works:
  <SOURCE> is the downloaded financial export: a .zip holding a
  FINANCIAL_DETAILED*.csv member, or that CSV itself.

  Report range:
    1. A YYYY-MM-DD_YYYY-MM-DD pair in the source file name, if present.
    2. Otherwise the first and last dates found in the data.
    3. Otherwise --start and --end (pass both or neither).
  The range is split into equal pre and post halves.

  --exclude drops whole days (store closures, outages). Repeat it for
  each date. Entries that are not valid dates are reported and ignored.

Output:
  One .xlsx workbook in --output-dir (or $DAYPART_OUTPUT_DIR, default
  ./reports) named {operator}_analysis_report_{YYYYMMDD_HHMMSS}.xlsx.
  Summary sheets come first, then per-dimension, then per-store sheets.

What to do next:
  1. Run `daypart report <SOURCE>` and open the workbook.
  2. Run `daypart campaigns <WORKBOOK>` to list day/slot campaigns per store.
";

#[derive(Debug, Parser)]
#[command(
    name = "daypart",
    version,
    about = "daypart sales analysis for delivery-platform financial exports",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the multi-sheet analysis workbook from a financial export
    #[command(arg_required_else_help = true, after_long_help = REPORT_AFTER_HELP)]
    Report {
        /// Financial export: .zip archive or FINANCIAL_DETAILED .csv
        source: PathBuf,
        #[command(flatten)]
        range: RangeArgs,
        /// Operator tag prefixed to the report file name
        #[arg(long, env = "DAYPART_OPERATOR")]
        operator: Option<String>,
        /// Directory the workbook is written to (default: $DAYPART_OUTPUT_DIR, then ./reports)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Print per-store campaign thresholds without writing a workbook
    #[command(arg_required_else_help = true)]
    Recommend {
        /// Financial export: .zip archive or FINANCIAL_DETAILED .csv
        source: PathBuf,
        #[command(flatten)]
        range: RangeArgs,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List day/slot campaign combinations from a produced report
    #[command(arg_required_else_help = true)]
    Campaigns {
        /// Report workbook written by `daypart report`
        workbook: PathBuf,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct RangeArgs {
    /// Report start date (MM/DD/YYYY), used when the file name and data give none
    #[arg(long, value_parser = parse_us_date)]
    pub start: Option<UsDate>,
    /// Report end date (MM/DD/YYYY)
    #[arg(long, value_parser = parse_us_date)]
    pub end: Option<UsDate>,
    /// Date to leave out of every table (MM/DD/YYYY); repeatable
    #[arg(long = "exclude", value_name = "DATE")]
    pub exclude: Vec<String>,
}

impl RangeArgs {
    pub fn start_value(&self) -> Option<String> {
        self.start.as_ref().map(|value| value.as_str().to_string())
    }

    pub fn end_value(&self) -> Option<String> {
        self.end.as_ref().map(|value| value.as_str().to_string())
    }
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::error::ErrorKind;

    use super::{Commands, UsDate, parse_from, parse_us_date};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 6] = [
            vec!["daypart", "report", "export.zip"],
            vec!["daypart", "report", "export.zip", "--json"],
            vec!["daypart", "recommend", "export.csv"],
            vec!["daypart", "recommend", "export.csv", "--json"],
            vec!["daypart", "campaigns", "report.xlsx"],
            vec!["daypart", "--verbose", "campaigns", "report.xlsx", "--json"],
        ];
        for args in cases {
            let parsed = parse_from(args.clone());
            assert!(parsed.is_ok(), "{args:?}");
        }
    }

    #[test]
    fn parse_report_flags() {
        let parsed = parse_from([
            "daypart",
            "report",
            "export.zip",
            "--start",
            "02/12/2026",
            "--end",
            "02/18/2026",
            "--exclude",
            "02/14/2026",
            "--exclude",
            "02/15/2026",
            "--operator",
            "ops",
            "--output-dir",
            "out",
            "-v",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(cli.verbose);
            match cli.command {
                Commands::Report {
                    source,
                    range,
                    operator,
                    output_dir,
                    json,
                } => {
                    assert_eq!(source, PathBuf::from("export.zip"));
                    assert_eq!(range.start, Some(UsDate("02/12/2026".to_string())));
                    assert_eq!(range.end_value(), Some("02/18/2026".to_string()));
                    assert_eq!(range.exclude, vec!["02/14/2026", "02/15/2026"]);
                    assert_eq!(operator.as_deref(), Some("ops"));
                    assert_eq!(output_dir, Some(PathBuf::from("out")));
                    assert!(!json);
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(parse_us_date("2026-02-12").is_err());
        assert!(parse_us_date("13/01/2026").is_err());
        assert!(parse_us_date("2/3/2026").is_err());
        assert!(parse_us_date("02/29/2026").is_err());
        assert_eq!(parse_us_date(" 02/28/2026 "), Ok(UsDate("02/28/2026".to_string())));

        let parsed = parse_from(["daypart", "report", "export.zip", "--start", "2026-02-12"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn exclude_values_are_not_validated_by_the_parser() {
        let parsed = parse_from(["daypart", "recommend", "export.zip", "--exclude", "someday"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn bare_commands_show_help() {
        for command in ["report", "recommend", "campaigns"] {
            let parsed = parse_from(["daypart", command]);
            assert!(parsed.is_err());
            if let Err(err) = parsed {
                assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
            }
        }
    }

    #[test]
    fn report_help_uses_clap_display_help() {
        let parsed = parse_from(["daypart", "report", "--help"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn unknown_flags_and_commands_are_rejected() {
        assert!(parse_from(["daypart", "campaigns", "r.xlsx", "--start", "02/12/2026"]).is_err());
        assert!(parse_from(["daypart", "help"]).is_err());
        assert!(parse_from(["daypart", "import"]).is_err());
    }
}
