use std::path::PathBuf;

use crate::ClientResult;
use crate::commands::common::{ExtractInputs, prepare_run, range_summary};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{RecommendationData, RecommendationSummary};

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub source: PathBuf,
    pub start: Option<String>,
    pub end: Option<String>,
    pub exclude: Vec<String>,
    pub orders_only: bool,
}

pub fn run(
    source: PathBuf,
    start: Option<String>,
    end: Option<String>,
    exclude: Vec<String>,
) -> ClientResult<SuccessEnvelope> {
    run_with_options(RecommendOptions {
        source,
        start,
        end,
        exclude,
        orders_only: true,
    })
}

/// Per-store thresholds only; nothing is written to disk.
#[doc(hidden)]
pub fn run_with_options(options: RecommendOptions) -> ClientResult<SuccessEnvelope> {
    let prepared = prepare_run(
        &ExtractInputs {
            source: &options.source,
            start: options.start.as_deref(),
            end: options.end.as_deref(),
            exclude: &options.exclude,
            orders_only: options.orders_only,
            order_counting: None,
        },
        "recommend",
    )?;

    let (range, recommendations) = match &prepared.analysis {
        Some(analysis) => (
            range_summary(analysis.range),
            analysis
                .tables
                .recommendations
                .iter()
                .map(RecommendationSummary::from)
                .collect(),
        ),
        None => (None, Vec::new()),
    };

    success(
        "recommend",
        RecommendationData {
            source_path: options.source.display().to_string(),
            range,
            recommendations,
            warnings: prepared.warnings,
        },
    )
}
