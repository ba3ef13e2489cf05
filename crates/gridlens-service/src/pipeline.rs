//! Comprehensive analysis pipeline: retrieval, profiling, patterns,
//! optional formula enrichment, and the bounded response envelope.

use std::sync::Arc;

use serde_json::Value;

use gridlens::{
    analyze_formulas, detect_anomalies, detect_correlations, detect_issues, detect_trends,
    profile_columns,
};

use crate::cache::TierCache;
use crate::config::ServiceConfig;
use crate::envelope::{parse_cursor, sheet_page};
use crate::error::{ServiceError, ServiceResult};
use crate::insights::{performance_notes, suggest_visualizations, top_insights};
use crate::orchestrator::{resolve_sheet, TierFetcher};
use crate::overflow::{finalize, ResultSink};
use crate::source::{SheetSource, ValueRender};
use crate::tiers::{column_letter, SheetInfo, StructureInfo};
use crate::types::{
    AnalysisTotals, AnalyzeRequest, ComprehensiveResult, DataSource, SheetAnalysis,
};

/// Runs one analysis request end to end.
///
/// Sheets are analyzed strictly in page order, one completed before the
/// next begins; the only awaits are at remote fetch boundaries. Any tier
/// fetch failure aborts the whole request.
pub struct SheetAnalyzer {
    fetcher: TierFetcher,
    source: Arc<dyn SheetSource>,
    sink: Arc<dyn ResultSink>,
}

impl SheetAnalyzer {
    pub fn new(
        source: Arc<dyn SheetSource>,
        cache: Arc<dyn TierCache>,
        sink: Arc<dyn ResultSink>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            fetcher: TierFetcher::new(source.clone(), cache, config),
            source,
            sink,
        }
    }

    pub fn fetcher(&self) -> &TierFetcher {
        &self.fetcher
    }

    /// Analyze one page of sheets and return a size-bounded result.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> ServiceResult<ComprehensiveResult> {
        let config = self.fetcher.config().clone();

        // Argument validation happens before any fetch.
        let sample_size = validate_sample_size(request.sample_size)?;
        let page_size = match request.page_size {
            Some(0) => {
                return Err(ServiceError::InvalidArgument(
                    "page size must be positive".to_string(),
                ))
            }
            Some(n) => n.min(config.max_page_size),
            None => config.default_page_size,
        };
        let start = parse_cursor(request.cursor.as_deref())?;

        let structure = self.fetcher.get_structure(&request.spreadsheet_id).await?;
        let metadata = &structure.metadata;

        let scoped: Vec<SheetInfo> = match request.sheet_id {
            Some(id) => vec![resolve_sheet(metadata, Some(id))?.clone()],
            None => {
                let mut sheets = metadata.sheets.clone();
                sheets.sort_by_key(|s| s.index);
                sheets
            }
        };

        let page = sheet_page(scoped.len(), start, page_size);
        tracing::info!(
            spreadsheet = request.spreadsheet_id,
            sheets = scoped.len(),
            page_start = page.start,
            page_end = page.end,
            "analyzing sheet page"
        );

        let mut analyzed = Vec::with_capacity(page.end - page.start);
        for sheet in &scoped[page.start..page.end] {
            analyzed.push(
                self.analyze_sheet(&structure, sheet, request, sample_size)
                    .await?,
            );
        }

        let totals = AnalysisTotals {
            sheets_analyzed: analyzed.len(),
            total_columns: analyzed.iter().map(|s| s.columns.len()).sum(),
            total_issues: analyzed.iter().map(|s| s.issues.len()).sum(),
            total_trends: analyzed.iter().map(|s| s.trends.len()).sum(),
            total_anomalies: analyzed.iter().map(|s| s.anomalies.len()).sum(),
            total_correlations: analyzed.iter().map(|s| s.correlations.len()).sum(),
        };
        let insights = top_insights(&analyzed);

        let result = ComprehensiveResult {
            spreadsheet_id: metadata.spreadsheet_id.clone(),
            title: metadata.title.clone(),
            sheet_count: scoped.len(),
            analyzed_sheets: analyzed,
            totals,
            top_insights: insights,
            next_cursor: page.next_cursor.clone(),
            has_more: page.has_more,
            resource_uri: None,
        };

        finalize(result, self.sink.as_ref(), &config).await
    }

    async fn analyze_sheet(
        &self,
        structure: &StructureInfo,
        sheet: &SheetInfo,
        request: &AnalyzeRequest,
        sample_size: Option<usize>,
    ) -> ServiceResult<SheetAnalysis> {
        let config = self.fetcher.config();
        let threshold = request
            .sampling_threshold
            .unwrap_or(config.default_sampling_threshold);
        let use_full = request.force_full_data || sheet.row_count <= threshold;

        let (headers, rows, data_source) = if use_full {
            let full = self
                .fetcher
                .get_full(&request.spreadsheet_id, Some(sheet.sheet_id))
                .await?;
            let rows: Vec<Vec<Value>> = full.values.iter().skip(1).cloned().collect();
            (full.sample.headers.clone(), rows, DataSource::Full)
        } else {
            let sample = self
                .fetcher
                .get_sample(&request.spreadsheet_id, Some(sheet.sheet_id), sample_size)
                .await?;
            (
                sample.headers.clone(),
                sample.sampled_rows.clone(),
                DataSource::Sample,
            )
        };

        let columns = profile_columns(&headers, &rows);
        let issues = detect_issues(&columns);
        let trends = detect_trends(&columns, &rows);
        let anomalies = detect_anomalies(&columns, &rows);
        let correlations = detect_correlations(&columns, &rows);

        // Formula enrichment is best-effort: a failure here degrades the
        // sheet's result instead of aborting the request.
        let formulas = if request.include_formulas {
            match self.fetch_formulas(request, sheet, rows.len()).await {
                Ok(pairs) => Some(analyze_formulas(&pairs)),
                Err(e) => {
                    tracing::warn!(
                        sheet = sheet.title,
                        error = %e,
                        "formula enrichment failed, continuing without formula data"
                    );
                    None
                }
            }
        } else {
            None
        };

        let sheet_structure = structure
            .sheet_structures
            .iter()
            .find(|s| s.sheet_id == sheet.sheet_id);
        let visualizations = request
            .include_visualizations
            .then(|| suggest_visualizations(&columns));
        let performance = request
            .include_performance
            .then(|| performance_notes(sheet_structure, formulas.as_ref()));

        Ok(SheetAnalysis {
            sheet_id: sheet.sheet_id,
            title: sheet.title.clone(),
            total_rows: sheet.row_count,
            analyzed_rows: rows.len(),
            data_source,
            columns,
            issues,
            trends,
            anomalies,
            correlations,
            formulas,
            visualizations,
            performance_notes: performance,
        })
    }

    /// Fetch (cell, formula) pairs over the analyzed region of one sheet.
    async fn fetch_formulas(
        &self,
        request: &AnalyzeRequest,
        sheet: &SheetInfo,
        data_rows: usize,
    ) -> ServiceResult<Vec<(String, String)>> {
        let config = self.fetcher.config();
        let rows = (data_rows + 1)
            .min(sheet.row_count.max(1))
            .min(config.max_full_rows);
        let cols = sheet
            .column_count
            .min(config.max_full_columns)
            .max(1);
        let range = format!("A1:{}{}", column_letter(cols - 1), rows);

        let values = self
            .source
            .fetch_values(
                &request.spreadsheet_id,
                &sheet.title,
                &range,
                ValueRender::Formula,
            )
            .await?;

        let mut pairs = Vec::new();
        for (r, row) in values.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Value::String(s) = cell {
                    if s.starts_with('=') {
                        pairs.push((format!("{}{}", column_letter(c), r + 1), s.clone()));
                    }
                }
            }
        }
        Ok(pairs)
    }
}

fn validate_sample_size(requested: Option<i64>) -> ServiceResult<Option<usize>> {
    match requested {
        Some(s) if s <= 0 => Err(ServiceError::InvalidArgument(format!(
            "sample size must be positive, got {s}"
        ))),
        Some(s) => Ok(Some(s as usize)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_sample_size_rejected() {
        assert!(matches!(
            validate_sample_size(Some(-5)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_sample_size(Some(0)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert_eq!(validate_sample_size(Some(10)).unwrap(), Some(10));
        assert_eq!(validate_sample_size(None).unwrap(), None);
    }
}
