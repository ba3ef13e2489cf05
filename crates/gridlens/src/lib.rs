//! GridLens core analysis library: column profiling, data quality,
//! pattern detection, and formula intelligence over spreadsheet data.

pub mod anomaly;
pub mod correlation;
pub mod formulas;
pub mod profiler;
pub mod quality;
pub mod trend;
pub mod types;

pub use anomaly::detect_anomalies;
pub use correlation::detect_correlations;
pub use formulas::{analyze_formula, analyze_formulas};
pub use profiler::{profile_columns, synthesize_headers};
pub use quality::detect_issues;
pub use trend::detect_trends;
pub use types::*;
