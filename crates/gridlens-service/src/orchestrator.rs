//! Tiered retrieval: fetch-or-cache each fidelity level atop the previous.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{cache_key, TierCache};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::source::{SheetSource, ValueRender};
use crate::tiers::{
    column_letter, FullData, SampleData, SheetInfo, SpreadsheetMetadata, StructureInfo, Tier,
    TierSnapshot,
};

/// Sampling method used for tier 3: first N data rows after the header.
const SAMPLING_METHOD: &str = "top-n";

/// Ensures each tier is fetched-or-cached, building on the tier below.
///
/// Every getter follows the same shape: compute the cache key, return on
/// hit, otherwise ensure tier N−1 (itself possibly a hit), perform exactly
/// one remote fetch scoped to the new tier's fields, merge, cache, return.
pub struct TierFetcher {
    source: Arc<dyn SheetSource>,
    cache: Arc<dyn TierCache>,
    config: ServiceConfig,
}

impl TierFetcher {
    pub fn new(
        source: Arc<dyn SheetSource>,
        cache: Arc<dyn TierCache>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Tier 1: spreadsheet identity and sheet inventory.
    pub async fn get_metadata(&self, spreadsheet_id: &str) -> ServiceResult<SpreadsheetMetadata> {
        let key = cache_key(Tier::Metadata, spreadsheet_id, None);
        if let Some(TierSnapshot::Metadata(hit)) = self.cache.get(&key).await {
            return Ok(hit);
        }

        tracing::debug!(spreadsheet = spreadsheet_id, "metadata cache miss");
        let metadata = self.source.fetch_metadata(spreadsheet_id).await?;
        self.cache
            .set(
                &key,
                TierSnapshot::Metadata(metadata.clone()),
                self.config.ttl_for(Tier::Metadata),
            )
            .await;
        Ok(metadata)
    }

    /// Tier 2: metadata plus structural element counts.
    pub async fn get_structure(&self, spreadsheet_id: &str) -> ServiceResult<StructureInfo> {
        let key = cache_key(Tier::Structure, spreadsheet_id, None);
        if let Some(TierSnapshot::Structure(hit)) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let metadata = self.get_metadata(spreadsheet_id).await?;
        tracing::debug!(spreadsheet = spreadsheet_id, "structure cache miss");
        let (named_ranges, sheet_structures) =
            self.source.fetch_structure(spreadsheet_id).await?;

        let structure = StructureInfo {
            metadata,
            named_ranges,
            sheet_structures,
        };
        self.cache
            .set(
                &key,
                TierSnapshot::Structure(structure.clone()),
                self.config.ttl_for(Tier::Structure),
            )
            .await;
        Ok(structure)
    }

    /// Tier 3: structure plus a top-N sample of one sheet.
    ///
    /// The effective sample size is
    /// `min(requested ?? default, max_sample_size, data rows)` where the
    /// data row count excludes the header row.
    pub async fn get_sample(
        &self,
        spreadsheet_id: &str,
        sheet_id: Option<u64>,
        sample_size: Option<usize>,
    ) -> ServiceResult<SampleData> {
        if sample_size == Some(0) {
            return Err(ServiceError::InvalidArgument(
                "sample size must be positive".to_string(),
            ));
        }

        let key = cache_key(Tier::Sample, spreadsheet_id, sheet_id);
        if let Some(TierSnapshot::Sample(hit)) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let structure = self.get_structure(spreadsheet_id).await?;
        let sheet = resolve_sheet(&structure.metadata, sheet_id)?.clone();

        let effective = sample_size
            .unwrap_or(self.config.default_sample_size)
            .min(self.config.max_sample_size)
            .min(sheet.row_count.saturating_sub(1));

        tracing::debug!(
            spreadsheet = spreadsheet_id,
            sheet = sheet.title,
            rows = effective,
            "sample cache miss"
        );

        // Header row plus N data rows, capped to the sheet's real extent.
        let end_row = (effective + 1).min(sheet.row_count.max(1));
        let range = grid_range(sheet.column_count, end_row);
        let mut values = self
            .source
            .fetch_values(spreadsheet_id, &sheet.title, &range, ValueRender::Unformatted)
            .await?;

        let headers = derive_headers(values.first(), sheet.column_count);
        let sampled_rows: Vec<Vec<Value>> = if values.is_empty() {
            Vec::new()
        } else {
            values.split_off(1)
        };

        let sample = SampleData {
            structure,
            sampled_sheet_id: sheet.sheet_id,
            headers,
            sampled_rows,
            sample_size: effective,
            total_rows: sheet.row_count,
            sampling_method: SAMPLING_METHOD.to_string(),
        };
        self.cache
            .set(
                &key,
                TierSnapshot::Sample(sample.clone()),
                self.config.ttl_for(Tier::Sample),
            )
            .await;
        Ok(sample)
    }

    /// Tier 4: the sheet's full value grid, hard-capped by configuration.
    pub async fn get_full(
        &self,
        spreadsheet_id: &str,
        sheet_id: Option<u64>,
    ) -> ServiceResult<FullData> {
        let key = cache_key(Tier::Full, spreadsheet_id, sheet_id);
        if let Some(TierSnapshot::Full(hit)) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let sample = self.get_sample(spreadsheet_id, sheet_id, None).await?;
        let sheet = resolve_sheet(&sample.structure.metadata, sheet_id)?.clone();

        tracing::warn!(
            spreadsheet = spreadsheet_id,
            sheet = sheet.title,
            rows = sheet.row_count,
            "fetching full data, the most expensive tier"
        );

        let row_cap = sheet.row_count.min(self.config.max_full_rows).max(1);
        let col_cap = sheet.column_count.min(self.config.max_full_columns).max(1);
        if row_cap < sheet.row_count || col_cap < sheet.column_count {
            tracing::warn!(
                sheet = sheet.title,
                rows = sheet.row_count,
                columns = sheet.column_count,
                row_cap,
                col_cap,
                "full data truncated to configured caps"
            );
        }

        let range = grid_range(col_cap, row_cap);
        let values = self
            .source
            .fetch_values(spreadsheet_id, &sheet.title, &range, ValueRender::Unformatted)
            .await?;

        let row_count = values.len();
        let column_count = values.iter().map(Vec::len).max().unwrap_or(0);
        let full = FullData {
            sample,
            values,
            row_count,
            column_count,
        };
        self.cache
            .set(
                &key,
                TierSnapshot::Full(full.clone()),
                self.config.ttl_for(Tier::Full),
            )
            .await;
        Ok(full)
    }
}

/// A1 range for the top-left `columns × rows` block.
fn grid_range(columns: usize, rows: usize) -> String {
    format!("A1:{}{}", column_letter(columns.saturating_sub(1)), rows)
}

/// Pick the target sheet: first in metadata order when unspecified,
/// NotFound when a requested sheet is absent.
pub fn resolve_sheet(
    metadata: &SpreadsheetMetadata,
    sheet_id: Option<u64>,
) -> ServiceResult<&SheetInfo> {
    match sheet_id {
        Some(id) => metadata
            .sheets
            .iter()
            .find(|s| s.sheet_id == id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "sheet {id} not found in spreadsheet {}",
                    metadata.spreadsheet_id
                ))
            }),
        None => metadata
            .sheets
            .iter()
            .min_by_key(|s| s.index)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "spreadsheet {} has no sheets",
                    metadata.spreadsheet_id
                ))
            }),
    }
}

/// Header row for a sheet: explicit cells where present, "Column N" otherwise.
///
/// Remote APIs trim trailing blank cells, so the width is padded to the
/// sheet's declared column count.
fn derive_headers(first_row: Option<&Vec<Value>>, column_count: usize) -> Vec<String> {
    match first_row {
        None => gridlens::synthesize_headers(column_count),
        Some(row) => {
            let width = row.len().max(column_count).max(1);
            (0..width)
                .map(|i| match row.get(i) {
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    Some(Value::Null) | None => format!("Column {}", i + 1),
                    Some(Value::String(_)) => format!("Column {}", i + 1),
                    Some(other) => other.to_string(),
                })
                .collect()
        }
    }
}
