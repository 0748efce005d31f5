//! End-of-run aggregate reporting.
//!
//! Rendering is pure: the node writes the returned lines to the log
//! sink exactly once at teardown.

use std::collections::BTreeMap;

use sqlstress_generator::Category;

use crate::worker::{CategoryStats, WorkerStats};

/// Render the replay-mode summary line.
///
/// A run with zero executed queries reports 0.00% rather than dividing
/// by zero.
pub fn replay_summary(stats: &WorkerStats) -> String {
    let total = stats.queries_executed;
    let failed = stats.queries_failed;
    let percentage = if total == 0 {
        0.0
    } else {
        (total - failed) as f64 * 100.0 / total as f64
    };
    format!("* NODE SUMMARY: {failed}/{total} queries failed, ({percentage:.2}% were successful)")
}

/// Render the dynamic-mode report: one line per category with non-zero
/// usage, then a grand summary with an integer (floor) percentage.
pub fn dynamic_report(per_category: &BTreeMap<Category, CategoryStats>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total = 0u64;
    let mut success = 0u64;
    for (category, stats) in per_category {
        if stats.total == 0 {
            continue;
        }
        total += stats.total;
        success += stats.success;
        lines.push(format!(
            "{}, total=>{}, success=> {}",
            category.label(),
            stats.total,
            stats.success
        ));
    }
    let percentage = if total == 0 { 0 } else { success * 100 / total };
    lines.push(format!(
        "* NODE SUMMARY: {}/{total} queries failed, ({percentage}% were successful)",
        total - success
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_summary_with_zero_total_is_defined() {
        let stats = WorkerStats::default();
        assert_eq!(
            replay_summary(&stats),
            "* NODE SUMMARY: 0/0 queries failed, (0.00% were successful)"
        );
    }

    #[test]
    fn replay_summary_renders_failure_ratio() {
        let stats = WorkerStats {
            queries_executed: 200,
            queries_failed: 50,
            per_category: BTreeMap::new(),
        };
        assert_eq!(
            replay_summary(&stats),
            "* NODE SUMMARY: 50/200 queries failed, (75.00% were successful)"
        );
    }

    #[test]
    fn dynamic_report_skips_unused_categories() {
        let mut per_category = BTreeMap::new();
        per_category.insert(Category::Select, CategoryStats { total: 10, success: 9 });
        per_category.insert(Category::Ddl, CategoryStats { total: 0, success: 0 });

        let lines = dynamic_report(&per_category);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "SELECT, total=>10, success=> 9");
        assert_eq!(
            lines[1],
            "* NODE SUMMARY: 1/10 queries failed, (90% were successful)"
        );
    }

    #[test]
    fn dynamic_grand_total_is_the_sum_of_category_totals() {
        let mut per_category = BTreeMap::new();
        per_category.insert(Category::Select, CategoryStats { total: 40, success: 40 });
        per_category.insert(Category::Insert, CategoryStats { total: 25, success: 20 });
        per_category.insert(Category::Delete, CategoryStats { total: 10, success: 3 });

        let lines = dynamic_report(&per_category);
        // 75 total, 63 success -> 12 failed, floor(63 * 100 / 75) = 84
        assert_eq!(
            lines.last().unwrap(),
            "* NODE SUMMARY: 12/75 queries failed, (84% were successful)"
        );
    }

    #[test]
    fn dynamic_report_with_no_usage_is_defined() {
        let lines = dynamic_report(&BTreeMap::new());
        assert_eq!(
            lines,
            vec!["* NODE SUMMARY: 0/0 queries failed, (0% were successful)".to_string()]
        );
    }
}
