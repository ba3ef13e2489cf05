//! Caller-facing request and response shapes.

use gridlens::{
    AnomalyResult, ColumnStats, CorrelationResult, FormulaReport, QualityIssue, TrendResult,
};
use serde::{Deserialize, Serialize};

/// One comprehensive-analysis request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheet_id: Option<u64>,
    /// Requested sample size; non-positive values are rejected.
    #[serde(default)]
    pub sample_size: Option<i64>,
    /// Row count above which sheets are analyzed from a sample.
    #[serde(default)]
    pub sampling_threshold: Option<usize>,
    #[serde(default)]
    pub force_full_data: bool,
    #[serde(default)]
    pub include_formulas: bool,
    #[serde(default)]
    pub include_visualizations: bool,
    #[serde(default)]
    pub include_performance: bool,
    /// Opaque pagination cursor from a previous response.
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Which tier a sheet's analysis was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Sample,
    Full,
}

/// A suggested chart for one sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationSuggestion {
    pub chart_type: String,
    pub columns: Vec<String>,
    pub rationale: String,
}

/// Full analysis of a single sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetAnalysis {
    pub sheet_id: u64,
    pub title: String,
    pub total_rows: usize,
    pub analyzed_rows: usize,
    pub data_source: DataSource,
    pub columns: Vec<ColumnStats>,
    pub issues: Vec<QualityIssue>,
    pub trends: Vec<TrendResult>,
    pub anomalies: Vec<AnomalyResult>,
    pub correlations: Vec<CorrelationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formulas: Option<FormulaReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Vec<VisualizationSuggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_notes: Option<Vec<String>>,
}

/// Aggregate counts over the analyzed page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTotals {
    pub sheets_analyzed: usize,
    pub total_columns: usize,
    pub total_issues: usize,
    pub total_trends: usize,
    pub total_anomalies: usize,
    pub total_correlations: usize,
}

/// The complete analysis response for one request.
///
/// Created fresh per request and never persisted here; on overflow the
/// full value is handed to the result sink and `resource_uri` points at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveResult {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheet_count: usize,
    pub analyzed_sheets: Vec<SheetAnalysis>,
    pub totals: AnalysisTotals,
    pub top_insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_uri: Option<String>,
}
