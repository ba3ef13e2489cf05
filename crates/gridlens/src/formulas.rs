//! Formula intelligence: complexity, dependencies, and issue detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ComplexityBreakdown, FormulaComplexity, FormulaInfo, FormulaReport};

/// Functions that force recalculation on every edit.
const VOLATILE_FUNCTIONS: [&str; 7] = [
    "NOW",
    "TODAY",
    "RAND",
    "RANDBETWEEN",
    "INDIRECT",
    "OFFSET",
    "INFO",
];

/// Maximum flagged formulas reported per sheet.
const MAX_FLAGGED: usize = 20;

static FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9_.]*\s*\(").unwrap());
static VOLATILE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(NOW|TODAY|RANDBETWEEN|RAND|INDIRECT|OFFSET|INFO)\(").unwrap()
});
static CELL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?[A-Z]+\$?[0-9]+").unwrap());
static RANGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?[A-Z]+\$?[0-9]+:\$?[A-Z]+\$?[0-9]+").unwrap());
static FULL_COLUMN_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?[A-Z]+:\$?[A-Z]+").unwrap());
static LOOKUP_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b[VH]LOOKUP\(").unwrap());
static LONG_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^A-Za-z0-9.$])([0-9]{4,})").unwrap());

/// Analyze one sheet's (cell, formula) pairs.
pub fn analyze_formulas(pairs: &[(String, String)]) -> FormulaReport {
    let mut complexity = ComplexityBreakdown::default();
    let mut volatile_count = 0usize;
    let mut analyzed: Vec<FormulaInfo> = Vec::with_capacity(pairs.len());

    for (cell, formula) in pairs {
        let info = analyze_formula(cell, formula);
        match info.complexity {
            FormulaComplexity::Simple => complexity.simple += 1,
            FormulaComplexity::Moderate => complexity.moderate += 1,
            FormulaComplexity::Complex => complexity.complex += 1,
            FormulaComplexity::VeryComplex => complexity.very_complex += 1,
        }
        if !info.volatile_functions.is_empty() {
            volatile_count += 1;
        }
        analyzed.push(info);
    }

    let mut flagged: Vec<FormulaInfo> = analyzed
        .into_iter()
        .filter(|f| {
            !f.issues.is_empty()
                || !f.volatile_functions.is_empty()
                || f.complexity >= FormulaComplexity::Complex
        })
        .collect();
    flagged.sort_by(|a, b| priority(b).cmp(&priority(a)));
    flagged.truncate(MAX_FLAGGED);

    tracing::debug!(
        total = pairs.len(),
        volatile = volatile_count,
        flagged = flagged.len(),
        "analyzed formulas"
    );

    FormulaReport {
        total_formulas: pairs.len(),
        volatile_count,
        complexity,
        flagged,
    }
}

/// Analyze a single formula.
pub fn analyze_formula(cell: &str, formula: &str) -> FormulaInfo {
    let function_count = FUNCTION_CALL.find_iter(formula).count();
    let nesting_depth = max_nesting_depth(formula);
    let length = formula.chars().count();

    let volatile_functions: Vec<String> = VOLATILE_CALL
        .captures_iter(formula)
        .map(|c| c[1].to_uppercase())
        .collect();

    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    if FULL_COLUMN_REF.is_match(formula) {
        issues.push("Full column reference can be slow on large sheets".to_string());
        suggestions.push("Bound the reference to the rows actually used".to_string());
    }
    if LOOKUP_CALL.is_match(formula) {
        issues.push("Prefer INDEX/MATCH over lookup-by-first-column functions".to_string());
        suggestions.push("Rewrite with INDEX/MATCH for flexibility and speed".to_string());
    }
    if let Some(cap) = LONG_LITERAL.captures(formula) {
        issues.push(format!("Hard-coded numeric literal {}", &cap[1]));
        suggestions.push("Move magic numbers into a named range".to_string());
    }

    FormulaInfo {
        cell: cell.to_string(),
        formula: formula.to_string(),
        complexity: classify_complexity(function_count, nesting_depth, length),
        function_count,
        nesting_depth,
        length,
        volatile_functions,
        dependencies: extract_dependencies(formula),
        issues,
        suggestions,
    }
}

fn classify_complexity(count: usize, depth: usize, length: usize) -> FormulaComplexity {
    if count > 10 || depth > 4 || length > 200 {
        FormulaComplexity::VeryComplex
    } else if count > 5 || depth > 2 || length > 100 {
        FormulaComplexity::Complex
    } else if count > 2 || depth > 1 || length > 50 {
        FormulaComplexity::Moderate
    } else {
        FormulaComplexity::Simple
    }
}

/// Maximum parenthesis nesting depth, via a running counter.
fn max_nesting_depth(formula: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for c in formula.chars() {
        match c {
            '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Collect cell and range references, deduplicated in order of appearance.
fn extract_dependencies(formula: &str) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();

    let mut covered: Vec<(usize, usize)> = Vec::new();
    for m in RANGE_REF.find_iter(formula) {
        covered.push((m.start(), m.end()));
        if !deps.iter().any(|d| d == m.as_str()) {
            deps.push(m.as_str().to_string());
        }
    }

    // Single-cell refs that are not part of an already-collected range.
    for m in CELL_REF.find_iter(formula) {
        let inside_range = covered
            .iter()
            .any(|&(start, end)| m.start() >= start && m.end() <= end);
        if !inside_range && !deps.iter().any(|d| d == m.as_str()) {
            deps.push(m.as_str().to_string());
        }
    }

    deps
}

/// Ranking key for flagged formulas: complex formulas carrying issues or
/// volatile functions come first.
fn priority(info: &FormulaInfo) -> (bool, FormulaComplexity, usize) {
    let has_signal = !info.issues.is_empty() || !info.volatile_functions.is_empty();
    (
        has_signal && info.complexity >= FormulaComplexity::Complex,
        info.complexity,
        info.issues.len() + info.volatile_functions.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(formula: &str) -> FormulaInfo {
        analyze_formula("A1", formula)
    }

    #[test]
    fn test_vlookup_full_column_issues() {
        let info = analyze("=VLOOKUP(A1,B:B,2,FALSE)");
        assert!(info.issues.iter().any(|i| i.contains("column reference")));
        assert!(info.issues.iter().any(|i| i.contains("INDEX/MATCH")));
        assert!(!info.suggestions.is_empty());
    }

    #[test]
    fn test_volatile_detection_case_insensitive() {
        let info = analyze("=now() + RandBetween(1,10)");
        assert_eq!(info.volatile_functions, vec!["NOW", "RANDBETWEEN"]);
    }

    #[test]
    fn test_volatile_requires_call_parenthesis() {
        let info = analyze("=A1 + NOWHERE");
        assert!(info.volatile_functions.is_empty());
    }

    #[test]
    fn test_nesting_depth() {
        let info = analyze("=IF(AND(A1>0,B1<5),SUM(C1:C10),0)");
        assert_eq!(info.nesting_depth, 2);
        assert_eq!(info.function_count, 3);
    }

    #[test]
    fn test_complexity_simple() {
        assert_eq!(analyze("=A1+B1").complexity, FormulaComplexity::Simple);
    }

    #[test]
    fn test_complexity_moderate_by_count() {
        let info = analyze("=SUM(A1)+MAX(B1)+MIN(C1)");
        assert_eq!(info.complexity, FormulaComplexity::Moderate);
    }

    #[test]
    fn test_complexity_complex_by_depth() {
        let info = analyze("=IF(IF(IF(A1,1,2),3,4),5,6)");
        assert_eq!(info.complexity, FormulaComplexity::Complex);
    }

    #[test]
    fn test_complexity_very_complex_by_length() {
        let long = format!("=SUM({})", "A1+".repeat(70));
        assert_eq!(analyze(&long).complexity, FormulaComplexity::VeryComplex);
    }

    #[test]
    fn test_dependencies_dedup_ranges_and_cells() {
        let info = analyze("=SUM(A1:A10)+A1:A10+B2+$C$3+B2");
        assert_eq!(info.dependencies, vec!["A1:A10", "B2", "$C$3"]);
    }

    #[test]
    fn test_long_literal_suggests_named_range() {
        let info = analyze("=A1*10000");
        assert!(info.issues.iter().any(|i| i.contains("10000")));
        assert!(info
            .suggestions
            .iter()
            .any(|s| s.contains("named range")));
    }

    #[test]
    fn test_cell_ref_digits_not_a_literal() {
        let info = analyze("=SUM(A1000:A2000)");
        assert!(info.issues.is_empty());
    }

    #[test]
    fn test_report_caps_flagged_at_twenty() {
        let pairs: Vec<(String, String)> = (0..40)
            .map(|i| (format!("A{i}"), "=VLOOKUP(A1,B:B,2,FALSE)".to_string()))
            .collect();
        let report = analyze_formulas(&pairs);
        assert_eq!(report.total_formulas, 40);
        assert_eq!(report.flagged.len(), 20);
    }

    #[test]
    fn test_report_prioritizes_complex_with_issues() {
        let pairs = vec![
            ("A1".to_string(), "=A1+B1".to_string()),
            (
                "A2".to_string(),
                "=IF(IF(IF(VLOOKUP(A1,B:B,2,FALSE),1,2),3,4),5,6)".to_string(),
            ),
            ("A3".to_string(), "=NOW()".to_string()),
        ];
        let report = analyze_formulas(&pairs);
        assert_eq!(report.flagged[0].cell, "A2");
        // The plain arithmetic formula is not flagged at all.
        assert!(report.flagged.iter().all(|f| f.cell != "A1"));
    }

    #[test]
    fn test_complexity_breakdown_counts_all() {
        let pairs = vec![
            ("A1".to_string(), "=A1".to_string()),
            ("A2".to_string(), "=SUM(A1)+MAX(B1)+MIN(C1)".to_string()),
        ];
        let report = analyze_formulas(&pairs);
        assert_eq!(report.complexity.simple, 1);
        assert_eq!(report.complexity.moderate, 1);
    }
}
