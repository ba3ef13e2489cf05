//! Remote spreadsheet source: the read-only fetch collaborator.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ServiceResult;
use crate::tiers::{SheetStructure, SpreadsheetMetadata};

/// Render mode for a range-value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRender {
    /// Raw cell values, unformatted.
    Unformatted,
    /// Formula text for formula cells, values otherwise.
    Formula,
}

/// Read-only remote spreadsheet collaborator.
///
/// Implementations own transport, auth, and retry policy; this layer
/// propagates their failures unchanged and never issues write calls.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Per-sheet identity and grid dimensions, with field selection applied.
    async fn fetch_metadata(&self, spreadsheet_id: &str) -> ServiceResult<SpreadsheetMetadata>;

    /// Structural element counts plus the spreadsheet's named-range count.
    async fn fetch_structure(
        &self,
        spreadsheet_id: &str,
    ) -> ServiceResult<(usize, Vec<SheetStructure>)>;

    /// Values for one A1 range of one sheet.
    async fn fetch_values(
        &self,
        spreadsheet_id: &str,
        sheet_title: &str,
        range: &str,
        render: ValueRender,
    ) -> ServiceResult<Vec<Vec<Value>>>;
}
