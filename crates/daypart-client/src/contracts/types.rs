use serde::Serialize;

use crate::analysis::date::RangeSource;
use crate::analysis::types::{OrderCounting, RecommendationRow};
use crate::extract::LoadStats;
use crate::workbook::Section;
use crate::workbook::campaigns::CampaignCombo;

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSummary {
    pub start: String,
    pub end: String,
    pub source: RangeSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportWarning {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub title: Option<String>,
    pub section: Section,
    pub source_set: String,
    pub header_row: u32,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedTableSummary {
    pub name: String,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSummary {
    pub store_id: String,
    pub aov: f64,
    pub min_order_new: f64,
    pub discount_new: u32,
    pub recommendation_new: String,
    pub min_order_all: f64,
    pub recommendation_all: String,
}

impl From<&RecommendationRow> for RecommendationSummary {
    fn from(row: &RecommendationRow) -> Self {
        Self {
            store_id: row.store_id.clone(),
            aov: row.aov,
            min_order_new: row.min_order_new,
            discount_new: row.discount_new,
            recommendation_new: row.recommendation_new.clone(),
            min_order_all: row.min_order_all,
            recommendation_all: row.recommendation_all.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub source_path: String,
    pub member_name: Option<String>,
    pub output_path: Option<String>,
    pub range: Option<RangeSummary>,
    pub pre_period: Option<PeriodSummary>,
    pub post_period: Option<PeriodSummary>,
    pub order_counting: Option<OrderCounting>,
    pub load: Option<LoadStats>,
    pub rows_excluded: usize,
    pub rows_outside_period: usize,
    pub excluded_dates: Vec<String>,
    pub sheets: Vec<SheetSummary>,
    pub skipped_tables: Vec<SkippedTableSummary>,
    pub recommendations: Vec<RecommendationSummary>,
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationData {
    pub source_path: String,
    pub range: Option<RangeSummary>,
    pub recommendations: Vec<RecommendationSummary>,
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignCombosData {
    pub workbook_path: String,
    pub sheets_read: Vec<String>,
    pub sheets_skipped: Vec<String>,
    pub combos: Vec<CampaignCombo>,
}
