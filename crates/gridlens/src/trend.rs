//! Trend detection: ordinary least squares over numeric columns.

use serde_json::Value;

use crate::profiler::numeric_series;
use crate::types::{ColumnStats, DataType, TrendDirection, TrendResult};

/// Minimum numeric values required before fitting a trend.
const MIN_TREND_POINTS: usize = 5;

/// R² below or at which a fit is not reported.
const R_SQUARED_THRESHOLD: f64 = 0.3;

/// |slope| at or below which a trend is considered flat.
const SLOPE_DEAD_BAND: f64 = 0.01;

/// Detect linear trends across all numeric columns of one sheet.
///
/// A trend is emitted only when the fit explains more than 30% of the
/// variance (R² > 0.3).
pub fn detect_trends(columns: &[ColumnStats], rows: &[Vec<Value>]) -> Vec<TrendResult> {
    let mut trends = Vec::new();

    for col in columns.iter().filter(|c| c.data_type == DataType::Number) {
        let points = numeric_series(rows, col.index);
        if points.len() < MIN_TREND_POINTS {
            continue;
        }

        let (slope, r_squared) = least_squares(&points);
        if r_squared <= R_SQUARED_THRESHOLD {
            continue;
        }

        let direction = if slope.abs() <= SLOPE_DEAD_BAND {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        trends.push(TrendResult {
            column: col.name.clone(),
            direction,
            slope,
            r_squared,
            confidence: (r_squared * 100.0).round() as u8,
        });
    }

    trends
}

/// Fit y = a + b·x where x is the 0-based data row index; returns (slope, R²).
///
/// Rows whose cell is null are absent from `points`, so gaps widen the x
/// spacing instead of compacting it.
fn least_squares(points: &[(usize, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|&(x, _)| x as f64).sum();
    let sum_y: f64 = points.iter().map(|&(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|&(x, y)| x as f64 * y).sum();
    let sum_x2: f64 = points.iter().map(|&(x, _)| (x as f64).powi(2)).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return (0.0, 0.0);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = points.iter().map(|&(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|&(x, y)| {
            let predicted = intercept + slope * x as f64;
            (y - predicted).powi(2)
        })
        .sum();

    // A constant series fits itself perfectly.
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };
    (slope, r_squared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::profile_columns;
    use serde_json::json;

    fn single_column(values: &[f64]) -> (Vec<ColumnStats>, Vec<Vec<Value>>) {
        let rows: Vec<Vec<Value>> = values.iter().map(|v| vec![json!(v)]).collect();
        let cols = profile_columns(&["series".to_string()], &rows);
        (cols, rows)
    }

    #[test]
    fn test_perfect_increasing_trend() {
        let (cols, rows) = single_column(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let trends = detect_trends(&cols, &rows);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Increasing);
        assert_eq!(trends[0].confidence, 100);
    }

    #[test]
    fn test_decreasing_trend() {
        let (cols, rows) = single_column(&[10.0, 8.0, 6.0, 4.0, 2.0]);
        let trends = detect_trends(&cols, &rows);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_noise_not_reported() {
        let (cols, rows) = single_column(&[5.0, 1.0, 9.0, 2.0, 8.0, 1.0, 7.0, 3.0]);
        assert!(detect_trends(&cols, &rows).is_empty());
    }

    #[test]
    fn test_too_few_points() {
        let (cols, rows) = single_column(&[1.0, 2.0, 3.0, 4.0]);
        assert!(detect_trends(&cols, &rows).is_empty());
    }

    #[test]
    fn test_gapped_rows_fit_against_row_index() {
        // Values sit exactly on y = row; nulls between rows 4 and 50 must
        // not compact the x axis.
        let mut data = vec![vec![Value::Null]; 51];
        for row in [0usize, 1, 2, 3, 4, 50] {
            data[row] = vec![json!(row)];
        }
        let cols = profile_columns(&["series".to_string()], &data);
        let trends = detect_trends(&cols, &data);
        assert_eq!(trends.len(), 1);
        assert!((trends[0].slope - 1.0).abs() < 1e-9);
        assert_eq!(trends[0].direction, TrendDirection::Increasing);
        assert_eq!(trends[0].confidence, 100);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let (cols, rows) = single_column(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let trends = detect_trends(&cols, &rows);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Stable);
    }

    #[test]
    fn test_confidence_never_at_or_below_threshold() {
        for series in [
            vec![1.0, 5.0, 2.0, 8.0, 3.0, 9.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 2.1, 1.9, 2.0, 2.05, 2.0],
        ] {
            let (cols, rows) = single_column(&series);
            for t in detect_trends(&cols, &rows) {
                assert!(t.r_squared > 0.3);
                assert!(t.confidence > 30);
            }
        }
    }
}
