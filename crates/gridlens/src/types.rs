//! Core data types for column profiles, detected patterns, and formula analysis.

use serde::{Deserialize, Serialize};

/// Inferred type of a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    Text,
    Date,
    Boolean,
    Mixed,
    Empty,
}

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Length statistics for a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
}

/// Per-column profile: inferred type, completeness, and type-conditional stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub name: String,
    pub index: usize,
    pub data_type: DataType,
    /// Total data rows considered for this column.
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    /// Percentage of non-null cells, 0..=100.
    pub completeness: f64,
    /// Up to five distinct values retained as a preview.
    pub sample_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStats>,
}

/// Severity of a data quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
}

/// Kind of data quality issue detected in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    HighNullRatio,
    MixedTypes,
    EmptyColumn,
    DuplicateHeader,
}

/// A data quality finding for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub column: String,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub description: String,
}

/// Direction of a detected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// A linear trend detected in a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub column: String,
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    /// round(R² × 100), 0..=100.
    pub confidence: u8,
}

/// Severity band of an anomalous value, by |z-score|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

/// A statistical outlier in a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyResult {
    pub column: String,
    /// 0-based data row index (header excluded).
    pub row: usize,
    pub value: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

/// Strength band of a correlation, by |r|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

/// Sign of a correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// Pearson correlation between two numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub column_a: String,
    pub column_b: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

/// Complexity band of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaComplexity {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

/// Analysis of a single (cell, formula) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaInfo {
    pub cell: String,
    pub formula: String,
    pub complexity: FormulaComplexity,
    pub function_count: usize,
    pub nesting_depth: usize,
    pub length: usize,
    /// Volatile function names found in the formula, uppercased.
    pub volatile_functions: Vec<String>,
    /// Cell and range references, deduplicated in order of appearance.
    pub dependencies: Vec<String>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Complexity histogram across all analyzed formulas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityBreakdown {
    pub simple: usize,
    pub moderate: usize,
    pub complex: usize,
    pub very_complex: usize,
}

/// Aggregate view over one sheet's formulas, plus the top flagged entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaReport {
    pub total_formulas: usize,
    pub volatile_count: usize,
    pub complexity: ComplexityBreakdown,
    /// Flagged formulas, capped to the top 20.
    pub flagged: Vec<FormulaInfo>,
}
