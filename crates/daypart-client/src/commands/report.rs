use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::analysis::date::format_iso_date;
use crate::analysis::types::OrderCounting;
use crate::commands::common::{ExtractInputs, period_summary, prepare_run, range_summary};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    RecommendationSummary, ReportData, ReportWarning, SheetSummary, SkippedTableSummary,
};
use crate::paths::{ensure_output_dir, report_file_name, resolve_output_dir};
use crate::workbook::xlsx::write_workbook;
use crate::workbook::{ComposedWorkbook, ComposerSettings, TableSet, compose};
use crate::ClientResult;

#[derive(Debug, Clone)]
pub struct ReportOptions<'a> {
    pub source: PathBuf,
    pub start: Option<String>,
    pub end: Option<String>,
    pub exclude: Vec<String>,
    pub operator: Option<String>,
    pub output_dir: Option<&'a Path>,
    pub generated_at: Option<NaiveDateTime>,
    pub orders_only: bool,
    pub order_counting: Option<OrderCounting>,
    pub composer: ComposerSettings,
    /// Table sets from other origins merged after the financial set.
    pub extra_sets: Vec<TableSet>,
}

impl ReportOptions<'_> {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            start: None,
            end: None,
            exclude: Vec::new(),
            operator: None,
            output_dir: None,
            generated_at: None,
            orders_only: true,
            order_counting: None,
            composer: ComposerSettings::default(),
            extra_sets: Vec::new(),
        }
    }
}

pub fn run(
    source: PathBuf,
    start: Option<String>,
    end: Option<String>,
    exclude: Vec<String>,
    operator: Option<String>,
    output_dir: Option<PathBuf>,
) -> ClientResult<SuccessEnvelope> {
    run_with_options(ReportOptions {
        start,
        end,
        exclude,
        operator,
        output_dir: output_dir.as_deref(),
        ..ReportOptions::new(source)
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ReportOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let prepared = prepare_run(
        &ExtractInputs {
            source: &options.source,
            start: options.start.as_deref(),
            end: options.end.as_deref(),
            exclude: &options.exclude,
            orders_only: options.orders_only,
            order_counting: options.order_counting,
        },
        "report",
    )?;

    let mut warnings = prepared.warnings;
    let excluded_dates = prepared
        .excluded
        .dates()
        .map(format_iso_date)
        .collect::<Vec<String>>();

    let mut data = ReportData {
        source_path: options.source.display().to_string(),
        member_name: prepared.loaded.as_ref().map(|loaded| loaded.member_name.clone()),
        output_path: None,
        range: None,
        pre_period: None,
        post_period: None,
        order_counting: None,
        load: prepared.loaded.as_ref().map(|loaded| loaded.stats),
        rows_excluded: 0,
        rows_outside_period: 0,
        excluded_dates,
        sheets: Vec::new(),
        skipped_tables: Vec::new(),
        recommendations: Vec::new(),
        warnings: Vec::new(),
    };

    let Some(analysis) = prepared.analysis else {
        data.warnings = warnings;
        return success("report", data);
    };

    data.range = range_summary(analysis.range);
    data.pre_period = period_summary(analysis.pre);
    data.post_period = period_summary(analysis.post);
    data.order_counting = Some(analysis.order_counting);
    data.rows_excluded = analysis.rows_excluded;
    data.rows_outside_period = analysis.rows_outside_period;
    data.recommendations = analysis
        .tables
        .recommendations
        .iter()
        .map(RecommendationSummary::from)
        .collect();
    data.skipped_tables = analysis
        .tables
        .skipped
        .iter()
        .map(|skipped| SkippedTableSummary {
            name: skipped.name.clone(),
            code: skipped.error.code.clone(),
            reason: skipped.error.message.clone(),
        })
        .collect();

    let mut sets = vec![analysis.tables.set];
    sets.extend(options.extra_sets);
    let composed = compose(&sets, &options.composer);
    data.sheets = sheet_summaries(&composed);

    if composed.workbook.is_empty() {
        warn!(source = %options.source.display(), "no sheets to write");
        warnings.push(ReportWarning {
            code: "empty_report".to_string(),
            message: "No table had data for the report period; no workbook was written.".to_string(),
        });
        data.warnings = warnings;
        return success("report", data);
    }

    let output_dir = resolve_output_dir(options.output_dir)?;
    ensure_output_dir(&output_dir)?;
    let generated_at = options
        .generated_at
        .unwrap_or_else(|| Local::now().naive_local());
    let output_path = output_dir.join(report_file_name(options.operator.as_deref(), generated_at));
    write_workbook(&composed.workbook, &output_path)?;
    info!(path = %output_path.display(), sheets = data.sheets.len(), "report written");

    data.output_path = Some(output_path.display().to_string());
    data.warnings = warnings;
    success("report", data)
}

fn sheet_summaries(composed: &ComposedWorkbook) -> Vec<SheetSummary> {
    composed
        .workbook
        .sheets
        .iter()
        .map(|sheet| SheetSummary {
            name: sheet.name.clone(),
            title: sheet.title.clone(),
            section: sheet.section,
            source_set: sheet.source_set.clone(),
            header_row: sheet.header_row(),
            rows: sheet.table.row_count(),
            columns: sheet
                .table
                .columns
                .iter()
                .map(|column| column.name.clone())
                .collect(),
        })
        .collect()
}
