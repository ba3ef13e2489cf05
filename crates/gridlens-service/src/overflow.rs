//! Overflow defense: keep every response under the transport size ceiling.
//!
//! Three stages: a cheap linear estimate (skip serialization entirely when
//! it alone crosses the spill threshold), an exact measurement of the
//! serialized bytes, and a last-resort catch of serializer failures. All
//! three degrade into a successful minimal envelope with a resource URI,
//! never an error.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::types::ComprehensiveResult;

/// URI scheme under which spilled results are resolvable.
pub const RESULT_URI_PREFIX: &str = "gridlens://results/";

/// Rough serialized bytes per value cell.
const BYTES_PER_CELL: usize = 12;

/// Rough serialized bytes per finding record.
const BYTES_PER_RECORD: usize = 160;

/// Rough serialized bytes per column profile.
const BYTES_PER_COLUMN: usize = 300;

/// External store for results too large to return inline.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the full result; returns an opaque identifier.
    async fn store(&self, seed: &str, result: &ComprehensiveResult) -> ServiceResult<String>;
}

/// In-process sink, used in tests and single-process deployments.
#[derive(Default)]
pub struct MemoryResultSink {
    entries: Mutex<HashMap<String, ComprehensiveResult>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, id: &str) -> Option<ComprehensiveResult> {
        self.entries.lock().await.get(id).cloned()
    }
}

#[async_trait]
impl ResultSink for MemoryResultSink {
    async fn store(&self, seed: &str, result: &ComprehensiveResult) -> ServiceResult<String> {
        let id = format!("{seed}-{}", Uuid::new_v4());
        self.entries
            .lock()
            .await
            .insert(id.clone(), result.clone());
        Ok(id)
    }
}

/// Resource URI for a stored result.
pub fn result_uri(id: &str) -> String {
    format!("{RESULT_URI_PREFIX}{id}")
}

/// Linear size estimate from record counts; never serializes anything.
pub fn estimate_size(result: &ComprehensiveResult) -> usize {
    let mut bytes = 512;
    for sheet in &result.analyzed_sheets {
        let cells = sheet
            .columns
            .len()
            .saturating_mul(sheet.analyzed_rows)
            .saturating_mul(BYTES_PER_CELL);
        let records = (sheet.issues.len()
            + sheet.trends.len()
            + sheet.anomalies.len()
            + sheet.correlations.len()
            + sheet.formulas.as_ref().map_or(0, |f| f.flagged.len()))
            * BYTES_PER_RECORD;
        bytes += cells + records + sheet.columns.len() * BYTES_PER_COLUMN;
    }
    bytes
}

/// Apply the staged size defense to a finished result.
pub async fn finalize(
    result: ComprehensiveResult,
    sink: &dyn ResultSink,
    config: &ServiceConfig,
) -> ServiceResult<ComprehensiveResult> {
    let estimate = estimate_size(&result);
    if estimate > config.estimate_spill_bytes {
        tracing::warn!(
            estimate,
            threshold = config.estimate_spill_bytes,
            "estimated size over spill threshold, skipping serialization"
        );
        return spill(result, sink).await;
    }

    match serde_json::to_string(&result) {
        Ok(serialized) if serialized.len() > config.max_response_bytes => {
            tracing::warn!(
                bytes = serialized.len(),
                ceiling = config.max_response_bytes,
                "serialized response over ceiling"
            );
            spill(result, sink).await
        }
        Ok(_) => Ok(result),
        Err(e) => {
            // Serializer refused the value outright; treat as oversized.
            tracing::warn!(error = %e, "serialization failed, spilling to result store");
            spill(result, sink).await
        }
    }
}

/// Store the full result externally and return the minimal envelope.
async fn spill(
    result: ComprehensiveResult,
    sink: &dyn ResultSink,
) -> ServiceResult<ComprehensiveResult> {
    let id = sink.store(&result.spreadsheet_id, &result).await?;
    let uri = result_uri(&id);
    tracing::info!(uri, "stored oversized result externally");

    Ok(ComprehensiveResult {
        spreadsheet_id: result.spreadsheet_id,
        title: result.title,
        sheet_count: result.sheet_count,
        analyzed_sheets: Vec::new(),
        totals: result.totals,
        top_insights: result.top_insights,
        next_cursor: result.next_cursor,
        has_more: result.has_more,
        resource_uri: Some(uri),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisTotals, DataSource, SheetAnalysis};
    use gridlens::profile_columns;
    use serde_json::json;

    fn result_with_rows(analyzed_rows: usize, column_count: usize) -> ComprehensiveResult {
        let rows: Vec<Vec<serde_json::Value>> = (0..20)
            .map(|i| (0..column_count).map(|c| json!(i * c)).collect())
            .collect();
        let headers: Vec<String> = (0..column_count).map(|i| format!("c{i}")).collect();
        let columns = profile_columns(&headers, &rows);
        ComprehensiveResult {
            spreadsheet_id: "s1".to_string(),
            title: "t".to_string(),
            sheet_count: 1,
            analyzed_sheets: vec![SheetAnalysis {
                sheet_id: 0,
                title: "Sheet1".to_string(),
                total_rows: analyzed_rows,
                analyzed_rows,
                data_source: DataSource::Sample,
                columns,
                issues: vec![],
                trends: vec![],
                anomalies: vec![],
                correlations: vec![],
                formulas: None,
                visualizations: None,
                performance_notes: None,
            }],
            totals: AnalysisTotals {
                sheets_analyzed: 1,
                total_columns: column_count,
                ..Default::default()
            },
            top_insights: vec!["insight".to_string()],
            next_cursor: None,
            has_more: false,
            resource_uri: None,
        }
    }

    #[tokio::test]
    async fn test_small_result_returned_inline() {
        let sink = MemoryResultSink::new();
        let config = ServiceConfig::default();
        let out = finalize(result_with_rows(20, 2), &sink, &config)
            .await
            .unwrap();
        assert!(out.resource_uri.is_none());
        assert_eq!(out.analyzed_sheets.len(), 1);
    }

    #[tokio::test]
    async fn test_huge_estimate_spills_without_serializing() {
        let sink = MemoryResultSink::new();
        let config = ServiceConfig::default();
        // 10M analyzed rows x 100 columns: the estimate alone crosses the
        // threshold; serializing such a structure is never attempted.
        let out = finalize(result_with_rows(10_000_000, 100), &sink, &config)
            .await
            .unwrap();
        let uri = out.resource_uri.expect("expected spill");
        assert!(uri.starts_with(RESULT_URI_PREFIX));
        assert!(out.analyzed_sheets.is_empty());
        assert_eq!(out.totals.sheets_analyzed, 1);
        assert_eq!(out.top_insights, vec!["insight"]);
    }

    #[tokio::test]
    async fn test_measured_overflow_spills_and_is_resolvable() {
        let sink = MemoryResultSink::new();
        let config = ServiceConfig {
            max_response_bytes: 200,
            ..Default::default()
        };
        let out = finalize(result_with_rows(20, 3), &sink, &config)
            .await
            .unwrap();
        let uri = out.resource_uri.expect("expected spill");
        let id = uri.strip_prefix(RESULT_URI_PREFIX).unwrap();
        let stored = sink.resolve(id).await.expect("stored result");
        assert_eq!(stored.analyzed_sheets.len(), 1);
    }

    #[test]
    fn test_estimate_scales_with_cells() {
        let small = estimate_size(&result_with_rows(10, 2));
        let large = estimate_size(&result_with_rows(10_000, 2));
        assert!(large > small);
    }
}
