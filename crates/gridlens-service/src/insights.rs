//! Derived insights: chart suggestions, performance notes, top findings.

use gridlens::{
    ColumnStats, CorrelationStrength, DataType, FormulaReport, IssueSeverity, TrendDirection,
};

use crate::tiers::SheetStructure;
use crate::types::{SheetAnalysis, VisualizationSuggestion};

/// Distinct values at or below which a text column reads as categorical.
const CATEGORY_CARDINALITY: usize = 12;

/// Structural element count above which rendering cost is worth noting.
const STRUCTURE_NOTE_THRESHOLD: usize = 50;

/// Maximum insights surfaced at the top of a response.
const MAX_TOP_INSIGHTS: usize = 5;

/// Suggest charts for one sheet from its profiled columns.
pub fn suggest_visualizations(columns: &[ColumnStats]) -> Vec<VisualizationSuggestion> {
    let mut suggestions = Vec::new();

    let numeric: Vec<&ColumnStats> = columns
        .iter()
        .filter(|c| c.data_type == DataType::Number)
        .collect();
    let dates: Vec<&ColumnStats> = columns
        .iter()
        .filter(|c| c.data_type == DataType::Date)
        .collect();
    let categories: Vec<&ColumnStats> = columns
        .iter()
        .filter(|c| c.data_type == DataType::Text && c.unique_count <= CATEGORY_CARDINALITY)
        .collect();

    if let (Some(date), Some(value)) = (dates.first(), numeric.first()) {
        suggestions.push(VisualizationSuggestion {
            chart_type: "line".to_string(),
            columns: vec![date.name.clone(), value.name.clone()],
            rationale: format!("'{}' over '{}' reads as a time series", value.name, date.name),
        });
    }

    if numeric.len() >= 2 {
        suggestions.push(VisualizationSuggestion {
            chart_type: "scatter".to_string(),
            columns: vec![numeric[0].name.clone(), numeric[1].name.clone()],
            rationale: format!(
                "'{}' against '{}' shows their relationship",
                numeric[0].name, numeric[1].name
            ),
        });
    }

    if let (Some(category), Some(value)) = (categories.first(), numeric.first()) {
        suggestions.push(VisualizationSuggestion {
            chart_type: "bar".to_string(),
            columns: vec![category.name.clone(), value.name.clone()],
            rationale: format!(
                "'{}' groups '{}' into {} categories",
                category.name, value.name, category.unique_count
            ),
        });
    }

    if suggestions.is_empty() {
        if let Some(value) = numeric.first() {
            suggestions.push(VisualizationSuggestion {
                chart_type: "histogram".to_string(),
                columns: vec![value.name.clone()],
                rationale: format!("distribution of '{}'", value.name),
            });
        }
    }

    suggestions
}

/// Note structural and formula costs for one sheet.
pub fn performance_notes(
    structure: Option<&SheetStructure>,
    formulas: Option<&FormulaReport>,
) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(s) = structure {
        if s.conditional_formats > STRUCTURE_NOTE_THRESHOLD {
            notes.push(format!(
                "{} conditional format rules slow down rendering and recalculation",
                s.conditional_formats
            ));
        }
        if s.merges > STRUCTURE_NOTE_THRESHOLD {
            notes.push(format!(
                "{} merged ranges complicate programmatic reads",
                s.merges
            ));
        }
    }

    if let Some(report) = formulas {
        if report.volatile_count > 0 {
            notes.push(format!(
                "{} volatile formulas recalculate on every edit",
                report.volatile_count
            ));
        }
        if report.complexity.very_complex > 0 {
            notes.push(format!(
                "{} very complex formulas are candidates for splitting into helper cells",
                report.complexity.very_complex
            ));
        }
    }

    notes
}

/// Surface the strongest findings across the analyzed page.
pub fn top_insights(sheets: &[SheetAnalysis]) -> Vec<String> {
    let mut insights = Vec::new();

    for sheet in sheets {
        if let Some(trend) = sheet.trends.iter().max_by_key(|t| t.confidence) {
            let direction = match trend.direction {
                TrendDirection::Increasing => "increasing",
                TrendDirection::Decreasing => "decreasing",
                TrendDirection::Stable => "stable",
            };
            insights.push(format!(
                "'{}'!'{}' trends {} (confidence {}%)",
                sheet.title, trend.column, direction, trend.confidence
            ));
        }

        if let Some(corr) = sheet.correlations.first() {
            if matches!(
                corr.strength,
                CorrelationStrength::Strong | CorrelationStrength::VeryStrong
            ) {
                insights.push(format!(
                    "'{}' and '{}' correlate at r={:.2} on '{}'",
                    corr.column_a, corr.column_b, corr.coefficient, sheet.title
                ));
            }
        }

        if !sheet.anomalies.is_empty() {
            insights.push(format!(
                "{} outliers detected on '{}'",
                sheet.anomalies.len(),
                sheet.title
            ));
        }

        let warnings = sheet
            .issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count();
        if warnings > 0 {
            insights.push(format!(
                "{} data quality warnings on '{}'",
                warnings, sheet.title
            ));
        }
    }

    insights.truncate(MAX_TOP_INSIGHTS);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlens::profile_columns;
    use serde_json::json;

    #[test]
    fn test_date_and_numeric_suggest_line_chart() {
        let rows = vec![
            vec![json!("2024-01-01"), json!(10)],
            vec![json!("2024-01-02"), json!(12)],
        ];
        let headers = vec!["day".to_string(), "sales".to_string()];
        let columns = profile_columns(&headers, &rows);
        let suggestions = suggest_visualizations(&columns);
        assert!(suggestions.iter().any(|s| s.chart_type == "line"));
    }

    #[test]
    fn test_two_numeric_columns_suggest_scatter() {
        let rows = vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]];
        let headers = vec!["a".to_string(), "b".to_string()];
        let columns = profile_columns(&headers, &rows);
        let suggestions = suggest_visualizations(&columns);
        assert!(suggestions.iter().any(|s| s.chart_type == "scatter"));
    }

    #[test]
    fn test_no_columns_no_suggestions() {
        assert!(suggest_visualizations(&[]).is_empty());
    }

    #[test]
    fn test_performance_notes_flag_heavy_structure() {
        let structure = SheetStructure {
            sheet_id: 0,
            conditional_formats: 120,
            ..Default::default()
        };
        let notes = performance_notes(Some(&structure), None);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("conditional format"));
    }
}
