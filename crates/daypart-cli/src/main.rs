mod cli;
mod dispatch;
mod logging;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use daypart_client::ClientError;
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "Daypart - sales analysis for delivery-platform financial exports

Usage:
  daypart <command>

Start here:
  daypart report --help
  daypart report <export.zip>
  daypart campaigns <report.xlsx>
";

const TOP_LEVEL_HELP: &str = "Daypart - sales analysis for delivery-platform financial exports

USAGE: daypart <command>

Build the analysis workbook:
  daypart report <SOURCE>                                 Write the multi-sheet .xlsx report
  daypart report <SOURCE> --start MM/DD/YYYY --end MM/DD/YYYY
                                                          Bound the report when no range is known
  daypart report <SOURCE> --exclude MM/DD/YYYY            Leave a day out (repeatable)

Plan campaigns:
  daypart recommend <SOURCE>                              Per-store minimum order thresholds
  daypart campaigns <WORKBOOK>                            Day/slot campaigns per store from a report

Options on every command:
  --json                                                  Machine-readable output
  --verbose, -v                                           Progress logs on stderr (or set RUST_LOG)

Environment:
  DAYPART_OUTPUT_DIR                                      Report directory (default ./reports)
  DAYPART_OPERATOR                                        Operator tag for report file names

Having issues/errors?
  Run `daypart <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    logging::init(logging::verbose_requested(&raw_args));

    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let body = if is_top_level_help_request(&raw_args) {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if write_stdout_text(&body).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error = ClientError::invalid_argument_for_command(&clean_message, command_hint);
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing usage/"For more information" lines; the error
/// renderer prints its own next steps.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    raw_args
        .iter()
        .skip(1)
        .find(|value| !value.starts_with('-'))
        .and_then(|value| match value.as_str() {
            "report" => Some("report"),
            "recommend" => Some("recommend"),
            "campaigns" => Some("campaigns"),
            _ => None,
        })
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

/// Errors the operator cannot fix by changing arguments.
fn is_internal_error(error: &ClientError) -> bool {
    error.code.starts_with("internal_")
        || matches!(
            error.code.as_str(),
            "output_dir_failed" | "workbook_write_failed"
        )
}

#[cfg(test)]
mod tests {
    use daypart_client::ClientError;

    use super::{command_path_from_args, is_internal_error, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_hint_is_first_known_subcommand() {
        assert_eq!(
            command_path_from_args(&args(&["daypart", "--verbose", "report", "x.zip"])),
            Some("report")
        );
        assert_eq!(
            command_path_from_args(&args(&["daypart", "campaigns", "--bogus"])),
            Some("campaigns")
        );
        assert_eq!(command_path_from_args(&args(&["daypart", "export"])), None);
    }

    #[test]
    fn clap_usage_tail_is_removed() {
        let message = "error: unexpected argument '--bogus' found\n\nUsage: daypart report <SOURCE>\n\nFor more information, try '--help'.\n";
        assert_eq!(
            strip_clap_boilerplate(message),
            "error: unexpected argument '--bogus' found"
        );
    }

    #[test]
    fn io_failures_are_internal_and_input_problems_are_not() {
        let path = std::path::Path::new("/tmp/out.xlsx");
        assert!(is_internal_error(&ClientError::workbook_write_failed(path, "disk full")));
        assert!(is_internal_error(&ClientError::output_dir_failed(path, "denied")));
        assert!(is_internal_error(&ClientError::internal_serialization("bad")));
        assert!(!is_internal_error(&ClientError::archive_unreadable(path, "truncated")));
        assert!(!is_internal_error(&ClientError::invalid_argument("bad date")));
        assert!(!is_internal_error(&ClientError::workbook_read_failed(path, "not xlsx")));
    }
}
