//! Data quality checks over profiled columns.

use std::collections::HashMap;

use crate::types::{ColumnStats, DataType, IssueKind, IssueSeverity, QualityIssue};

/// Null ratio above which a column gets a warning.
const NULL_RATIO_WARNING: f64 = 0.5;

/// Null ratio above which a column gets an informational note.
const NULL_RATIO_INFO: f64 = 0.2;

/// Detect quality issues across one sheet's profiled columns.
pub fn detect_issues(columns: &[ColumnStats]) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    let mut header_counts: HashMap<&str, usize> = HashMap::new();
    for col in columns {
        *header_counts.entry(col.name.as_str()).or_insert(0) += 1;
    }

    for col in columns {
        if col.count > 0 {
            let null_ratio = col.null_count as f64 / col.count as f64;
            if null_ratio > NULL_RATIO_WARNING {
                issues.push(QualityIssue {
                    column: col.name.clone(),
                    kind: IssueKind::HighNullRatio,
                    severity: IssueSeverity::Warning,
                    description: format!(
                        "Column '{}' is {:.0}% empty ({} of {} cells)",
                        col.name,
                        null_ratio * 100.0,
                        col.null_count,
                        col.count
                    ),
                });
            } else if null_ratio > NULL_RATIO_INFO {
                issues.push(QualityIssue {
                    column: col.name.clone(),
                    kind: IssueKind::HighNullRatio,
                    severity: IssueSeverity::Info,
                    description: format!(
                        "Column '{}' has {} empty cells ({:.0}%)",
                        col.name,
                        col.null_count,
                        null_ratio * 100.0
                    ),
                });
            }
        }

        if col.data_type == DataType::Mixed {
            issues.push(QualityIssue {
                column: col.name.clone(),
                kind: IssueKind::MixedTypes,
                severity: IssueSeverity::Warning,
                description: format!(
                    "Column '{}' mixes value types; no dominant type reaches 80%",
                    col.name
                ),
            });
        }

        if col.data_type == DataType::Empty && col.count > 0 {
            issues.push(QualityIssue {
                column: col.name.clone(),
                kind: IssueKind::EmptyColumn,
                severity: IssueSeverity::Info,
                description: format!("Column '{}' contains no values", col.name),
            });
        }

        if header_counts.get(col.name.as_str()).copied().unwrap_or(0) > 1 {
            issues.push(QualityIssue {
                column: col.name.clone(),
                kind: IssueKind::DuplicateHeader,
                severity: IssueSeverity::Warning,
                description: format!("Header '{}' appears more than once", col.name),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::profile_columns;
    use serde_json::json;

    #[test]
    fn test_high_null_ratio_warning() {
        let data = vec![
            vec![json!(1)],
            vec![json!(null)],
            vec![json!(null)],
            vec![json!(null)],
        ];
        let cols = profile_columns(&["a".to_string()], &data);
        let issues = detect_issues(&cols);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::HighNullRatio && i.severity == IssueSeverity::Warning));
    }

    #[test]
    fn test_moderate_null_ratio_info() {
        let data = vec![
            vec![json!(1)],
            vec![json!(2)],
            vec![json!(3)],
            vec![json!(null)],
        ];
        let cols = profile_columns(&["a".to_string()], &data);
        let issues = detect_issues(&cols);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::HighNullRatio && i.severity == IssueSeverity::Info));
    }

    #[test]
    fn test_duplicate_headers_flagged() {
        let data = vec![vec![json!(1), json!(2)]];
        let headers = vec!["id".to_string(), "id".to_string()];
        let cols = profile_columns(&headers, &data);
        let issues = detect_issues(&cols);
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.kind == IssueKind::DuplicateHeader)
                .count(),
            2
        );
    }

    #[test]
    fn test_clean_column_no_issues() {
        let data = vec![vec![json!(1)], vec![json!(2)], vec![json!(3)]];
        let cols = profile_columns(&["a".to_string()], &data);
        assert!(detect_issues(&cols).is_empty());
    }
}
