//! Column profiling: type inference and descriptive statistics over raw rows.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::types::{ColumnStats, DataType, NumericStats, TextStats};

/// Dominance ratio below which a column is classified as mixed.
const MIXED_TYPE_THRESHOLD: f64 = 0.8;

/// Maximum distinct values retained as a preview.
const SAMPLE_VALUE_LIMIT: usize = 5;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}([T ].+)?$").unwrap());
static SLASH_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap());

/// Classification of a single non-null cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ValueClass {
    Number,
    Boolean,
    Date,
    Text,
}

/// Classify one cell. `None` means null/blank (JSON null or empty string).
fn classify(value: &Value) -> Option<ValueClass> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ValueClass::Boolean),
        Value::Number(_) => Some(ValueClass::Number),
        Value::String(s) => {
            if s.is_empty() {
                return None;
            }
            if s.parse::<f64>().is_ok() {
                return Some(ValueClass::Number);
            }
            if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
                return Some(ValueClass::Boolean);
            }
            if looks_like_date(s) {
                return Some(ValueClass::Date);
            }
            Some(ValueClass::Text)
        }
        // Arrays/objects do not occur in tabular value ranges; treat as text.
        _ => Some(ValueClass::Text),
    }
}

fn looks_like_date(s: &str) -> bool {
    ISO_DATE.is_match(s) || SLASH_DATE.is_match(s)
}

/// Extract a cell's numeric value, if it has one.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.is_empty() => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a non-null cell to its string form.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collect a column's numeric values as (data row index, value) pairs,
/// skipping cells that carry no number.
pub fn numeric_series(rows: &[Vec<Value>], column: usize) -> Vec<(usize, f64)> {
    rows.iter()
        .enumerate()
        .filter_map(|(row, cells)| {
            cells
                .get(column)
                .and_then(numeric_value)
                .map(|v| (row, v))
        })
        .collect()
}

/// Synthesize headers "Column 1".."Column N" for a headerless sheet.
pub fn synthesize_headers(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("Column {n}")).collect()
}

/// Profile every column of one sheet.
///
/// `headers` names the columns; `rows` are the data rows (header excluded).
/// Rows may be ragged; missing trailing cells count as nulls.
pub fn profile_columns(headers: &[String], rows: &[Vec<Value>]) -> Vec<ColumnStats> {
    headers
        .iter()
        .enumerate()
        .map(|(index, name)| profile_column(name, index, rows))
        .collect()
}

fn profile_column(name: &str, index: usize, rows: &[Vec<Value>]) -> ColumnStats {
    let total = rows.len();

    let mut counts = [0usize; 4]; // number, boolean, date, text
    let mut null_count = 0usize;
    let mut uniques: HashSet<String> = HashSet::new();
    let mut sample_values: Vec<String> = Vec::new();
    let mut numbers: Vec<f64> = Vec::new();
    let mut lengths: Vec<usize> = Vec::new();

    static NULL: Value = Value::Null;

    for cells in rows {
        let cell = cells.get(index).unwrap_or(&NULL);
        match classify(cell) {
            None => null_count += 1,
            Some(class) => {
                counts[class_slot(class)] += 1;
                let coerced = coerce_string(cell);
                lengths.push(coerced.chars().count());
                if uniques.insert(coerced.clone()) && sample_values.len() < SAMPLE_VALUE_LIMIT {
                    sample_values.push(coerced);
                }
                if class == ValueClass::Number {
                    if let Some(v) = numeric_value(cell) {
                        numbers.push(v);
                    }
                }
            }
        }
    }

    let data_type = infer_type(&counts);
    let numeric = (data_type == DataType::Number).then(|| numeric_stats(&numbers));
    let text = (data_type == DataType::Text).then(|| text_stats(&lengths));

    let completeness = if total == 0 {
        100.0
    } else {
        ((total - null_count) as f64 / total as f64) * 100.0
    };

    tracing::debug!(
        column = name,
        ?data_type,
        nulls = null_count,
        uniques = uniques.len(),
        "profiled column"
    );

    ColumnStats {
        name: name.to_string(),
        index,
        data_type,
        count: total,
        null_count,
        unique_count: uniques.len(),
        completeness,
        sample_values,
        numeric,
        text,
    }
}

fn class_slot(class: ValueClass) -> usize {
    match class {
        ValueClass::Number => 0,
        ValueClass::Boolean => 1,
        ValueClass::Date => 2,
        ValueClass::Text => 3,
    }
}

fn infer_type(counts: &[usize; 4]) -> DataType {
    let typed: usize = counts.iter().sum();
    if typed == 0 {
        return DataType::Empty;
    }

    let (slot, &dominant) = counts
        .iter()
        .enumerate()
        .max_by_key(|(_, &c)| c)
        .unwrap_or((3, &0));

    if (dominant as f64) / (typed as f64) < MIXED_TYPE_THRESHOLD {
        return DataType::Mixed;
    }

    match slot {
        0 => DataType::Number,
        1 => DataType::Boolean,
        2 => DataType::Date,
        _ => DataType::Text,
    }
}

fn numeric_stats(values: &[f64]) -> NumericStats {
    if values.is_empty() {
        return NumericStats {
            sum: 0.0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    NumericStats {
        sum,
        mean,
        median,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

fn text_stats(lengths: &[usize]) -> TextStats {
    if lengths.is_empty() {
        return TextStats {
            min_length: 0,
            max_length: 0,
            avg_length: 0.0,
        };
    }
    let sum: usize = lengths.iter().sum();
    TextStats {
        min_length: *lengths.iter().min().unwrap_or(&0),
        max_length: *lengths.iter().max().unwrap_or(&0),
        avg_length: sum as f64 / lengths.len() as f64,
    }
}
