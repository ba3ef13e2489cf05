//! Tiered snapshot model: four fidelity levels of one spreadsheet.
//!
//! Each tier embeds the previous one, so a tier-N snapshot always carries
//! every field of tier N−1 for the same identity. Snapshots are immutable
//! whole values; a refresh replaces the cached object, never patches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fidelity level, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Metadata,
    Structure,
    Sample,
    Full,
}

impl Tier {
    /// The tier below this one, which a fetch must ensure first.
    pub fn prev(self) -> Option<Tier> {
        match self {
            Tier::Metadata => None,
            Tier::Structure => Some(Tier::Metadata),
            Tier::Sample => Some(Tier::Structure),
            Tier::Full => Some(Tier::Sample),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Metadata => "metadata",
            Tier::Structure => "structure",
            Tier::Sample => "sample",
            Tier::Full => "full",
        }
    }
}

/// Per-sheet identity and grid dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub sheet_id: u64,
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
    pub index: usize,
}

/// Tier 1: spreadsheet identity and sheet inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheets: Vec<SheetInfo>,
    pub retrieved_at: DateTime<Utc>,
}

/// Structural element counts for one sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStructure {
    pub sheet_id: u64,
    pub merges: usize,
    pub conditional_formats: usize,
    pub protected_ranges: usize,
    pub charts: usize,
    pub pivot_tables: usize,
    pub basic_filters: usize,
    pub frozen_rows: usize,
    pub frozen_columns: usize,
}

/// Tier 2: metadata plus structural elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInfo {
    #[serde(flatten)]
    pub metadata: SpreadsheetMetadata,
    pub named_ranges: usize,
    pub sheet_structures: Vec<SheetStructure>,
}

/// Tier 3: structure plus a top-N sample of one sheet's rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleData {
    #[serde(flatten)]
    pub structure: StructureInfo,
    pub sampled_sheet_id: u64,
    pub headers: Vec<String>,
    pub sampled_rows: Vec<Vec<Value>>,
    pub sample_size: usize,
    pub total_rows: usize,
    pub sampling_method: String,
}

/// Tier 4: sample plus the sheet's full (capped) value grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullData {
    #[serde(flatten)]
    pub sample: SampleData,
    pub values: Vec<Vec<Value>>,
    pub row_count: usize,
    pub column_count: usize,
}

/// A cached snapshot, tagged with its tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum TierSnapshot {
    Metadata(SpreadsheetMetadata),
    Structure(StructureInfo),
    Sample(SampleData),
    Full(FullData),
}

impl TierSnapshot {
    pub fn tier(&self) -> Tier {
        match self {
            TierSnapshot::Metadata(_) => Tier::Metadata,
            TierSnapshot::Structure(_) => Tier::Structure,
            TierSnapshot::Sample(_) => Tier::Sample,
            TierSnapshot::Full(_) => Tier::Full,
        }
    }
}

/// Convert a 0-based column index to its letter form (0→A, 25→Z, 26→AA).
///
/// Bijective base-26: there is no zero digit, so Z rolls over to AA.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    // Always ASCII uppercase.
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert a column letter back to its 0-based index (A→0, AA→26).
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        acc = acc * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(acc - 1)
}
