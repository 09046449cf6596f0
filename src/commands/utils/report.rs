// src/commands/utils/report.rs
use crate::fs::tree_ops::TreeReport;

/// One diagnostic line per accumulated failure, then the interrupt marker.
/// Returns whether anything was written.
pub fn push_report(name: &str, report: &TreeReport, stderr: &mut String) -> bool {
    for failure in &report.failures {
        stderr.push_str(&format!("{}: {}\n", name, failure));
    }
    if report.interrupted {
        stderr.push_str(&format!("{}: interrupted\n", name));
    }
    !report.is_clean()
}
