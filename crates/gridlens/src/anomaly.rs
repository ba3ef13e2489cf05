//! Anomaly detection: z-score outliers in numeric columns.

use serde_json::Value;

use crate::profiler::numeric_series;
use crate::types::{AnomalyResult, AnomalySeverity, ColumnStats, DataType};

/// |z| above which a value is anomalous (strictly greater).
const Z_SCORE_THRESHOLD: f64 = 2.0;

/// Maximum anomalies reported per sheet.
const MAX_ANOMALIES: usize = 20;

/// Flag outliers across all numeric columns, top 20 by |z| descending.
pub fn detect_anomalies(columns: &[ColumnStats], rows: &[Vec<Value>]) -> Vec<AnomalyResult> {
    let mut anomalies = Vec::new();

    for col in columns.iter().filter(|c| c.data_type == DataType::Number) {
        let Some(stats) = &col.numeric else { continue };
        if stats.std_dev == 0.0 {
            continue;
        }

        for (row, value) in numeric_series(rows, col.index) {
            let z = (value - stats.mean) / stats.std_dev;
            if z.abs() > Z_SCORE_THRESHOLD {
                anomalies.push(AnomalyResult {
                    column: col.name.clone(),
                    row,
                    value,
                    z_score: z,
                    severity: severity_band(z.abs()),
                });
            }
        }
    }

    anomalies.sort_by(|a, b| {
        b.z_score
            .abs()
            .partial_cmp(&a.z_score.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    anomalies.truncate(MAX_ANOMALIES);
    anomalies
}

fn severity_band(abs_z: f64) -> AnomalySeverity {
    if abs_z > 3.0 {
        AnomalySeverity::High
    } else if abs_z > 2.5 {
        AnomalySeverity::Medium
    } else {
        AnomalySeverity::Low
    }
}
