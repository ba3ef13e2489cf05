//! Pairwise Pearson correlation between numeric columns.

use serde_json::Value;

use crate::profiler::numeric_value;
use crate::types::{
    ColumnStats, CorrelationDirection, CorrelationResult, CorrelationStrength, DataType,
};

/// Minimum overlapping numeric pairs required per column pair.
const MIN_OVERLAP: usize = 5;

/// |r| below or at which a pair is not reported.
const COEFFICIENT_THRESHOLD: f64 = 0.3;

/// Correlate every unordered pair of numeric columns, sorted by |r| descending.
pub fn detect_correlations(columns: &[ColumnStats], rows: &[Vec<Value>]) -> Vec<CorrelationResult> {
    let numeric_cols: Vec<&ColumnStats> = columns
        .iter()
        .filter(|c| c.data_type == DataType::Number)
        .collect();

    let mut results = Vec::new();

    for (i, a) in numeric_cols.iter().enumerate() {
        for b in numeric_cols.iter().skip(i + 1) {
            let pairs = overlapping_values(rows, a.index, b.index);
            if pairs.len() < MIN_OVERLAP {
                continue;
            }

            let Some(r) = pearson(&pairs) else { continue };
            if r.abs() <= COEFFICIENT_THRESHOLD {
                continue;
            }

            results.push(CorrelationResult {
                column_a: a.name.clone(),
                column_b: b.name.clone(),
                coefficient: r,
                strength: strength_band(r.abs()),
                direction: if r >= 0.0 {
                    CorrelationDirection::Positive
                } else {
                    CorrelationDirection::Negative
                },
            });
        }
    }

    results.sort_by(|x, y| {
        y.coefficient
            .abs()
            .partial_cmp(&x.coefficient.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

/// Rows where both columns hold a numeric value.
fn overlapping_values(rows: &[Vec<Value>], col_a: usize, col_b: usize) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|cells| {
            let a = cells.get(col_a).and_then(numeric_value)?;
            let b = cells.get(col_b).and_then(numeric_value)?;
            Some((a, b))
        })
        .collect()
}

/// Pearson coefficient; `None` when either series has zero variance.
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let sum_x: f64 = pairs.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = pairs.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = pairs.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = pairs.iter().map(|(x, _)| x * x).sum();
    let sum_y2: f64 = pairs.iter().map(|(_, y)| y * y).sum();

    let denom = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denom)
}

fn strength_band(abs_r: f64) -> CorrelationStrength {
    if abs_r > 0.8 {
        CorrelationStrength::VeryStrong
    } else if abs_r > 0.6 {
        CorrelationStrength::Strong
    } else if abs_r > 0.4 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}
