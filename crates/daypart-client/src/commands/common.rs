use std::path::Path;

use crate::analysis::date::{ResolvedRange, explicit_period, format_iso_date};
use crate::analysis::filter::ExcludedDateSet;
use crate::analysis::types::{OrderCounting, Period};
use crate::analysis::{Analysis, AnalysisRequest, analyze};
use crate::contracts::types::{PeriodSummary, RangeSummary, ReportWarning};
use crate::extract::{LoadOptions, LoadedExtract, load_source};
use crate::{ClientError, ClientResult};

/// Inputs shared by every command that analyzes a financial extract.
#[derive(Debug, Clone)]
pub struct ExtractInputs<'a> {
    pub source: &'a Path,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub exclude: &'a [String],
    pub orders_only: bool,
    pub order_counting: Option<OrderCounting>,
}

#[derive(Debug, Clone)]
pub(crate) struct PreparedRun {
    pub excluded: ExcludedDateSet,
    pub loaded: Option<LoadedExtract>,
    pub analysis: Option<Analysis>,
    pub warnings: Vec<ReportWarning>,
}

/// Validates arguments, loads the extract and runs the analysis. A source
/// without financial data yields `loaded: None` plus a warning.
pub(crate) fn prepare_run(inputs: &ExtractInputs<'_>, command: &str) -> ClientResult<PreparedRun> {
    let explicit = explicit_period(inputs.start, inputs.end, command)?;
    let excluded = ExcludedDateSet::from_items(inputs.exclude.iter().cloned());

    let mut warnings = excluded
        .ignored
        .iter()
        .map(|value| ReportWarning {
            code: "excluded_date_ignored".to_string(),
            message: format!("Excluded date `{value}` is not a valid MM/DD/YYYY date and was ignored."),
        })
        .collect::<Vec<ReportWarning>>();

    let loaded = load_source(
        inputs.source,
        LoadOptions {
            orders_only: inputs.orders_only,
        },
    )?;
    let Some(loaded) = loaded else {
        warnings.push(warning_from_error(&ClientError::missing_data(inputs.source)));
        return Ok(PreparedRun {
            excluded,
            loaded: None,
            analysis: None,
            warnings,
        });
    };

    warnings.extend(load_warnings(&loaded));

    let source_name = inputs
        .source
        .file_name()
        .and_then(|value| value.to_str());
    let analysis = analyze(
        &loaded,
        &AnalysisRequest {
            source_name,
            explicit,
            excluded: &excluded,
            order_counting: inputs.order_counting,
        },
    )?;

    if analysis.range.is_none() {
        warnings.push(ReportWarning {
            code: "no_report_range".to_string(),
            message: "No report dates could be determined; pass --start and --end.".to_string(),
        });
    }
    warnings.extend(
        analysis
            .tables
            .skipped
            .iter()
            .map(|skipped| warning_from_error(&skipped.error)),
    );

    Ok(PreparedRun {
        excluded,
        loaded: Some(loaded),
        analysis: Some(analysis),
        warnings,
    })
}

fn load_warnings(loaded: &LoadedExtract) -> Vec<ReportWarning> {
    let stats = loaded.stats;
    let mut warnings = Vec::new();
    if stats.coercion_fallbacks > 0 {
        warnings.push(ReportWarning {
            code: "numeric_coercion".to_string(),
            message: format!(
                "{} amount cell(s) could not be read as numbers and were counted as 0.",
                stats.coercion_fallbacks
            ),
        });
    }
    if stats.undated_rows > 0 {
        warnings.push(ReportWarning {
            code: "undated_rows".to_string(),
            message: format!(
                "{} row(s) had no readable date and were left out of the report period.",
                stats.undated_rows
            ),
        });
    }
    warnings
}

pub(crate) fn warning_from_error(error: &ClientError) -> ReportWarning {
    ReportWarning {
        code: error.code.clone(),
        message: error.message.clone(),
    }
}

pub(crate) fn range_summary(range: Option<ResolvedRange>) -> Option<RangeSummary> {
    range.map(|resolved| RangeSummary {
        start: format_iso_date(resolved.period.start),
        end: format_iso_date(resolved.period.end),
        source: resolved.source,
    })
}

pub(crate) fn period_summary(period: Option<Period>) -> Option<PeriodSummary> {
    period.map(|value| PeriodSummary {
        start: format_iso_date(value.start),
        end: format_iso_date(value.end),
    })
}
