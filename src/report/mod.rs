use crate::render::{sorted_by_label, RED_THRESHOLD};
use crate::types::*;

/// Aggregated uptime report for every reported test
#[derive(Debug)]
pub struct UptimeReport {
    pub project: String,
    pub results: Vec<AggregatedResult>,
}

impl UptimeReport {
    pub fn new(project: &str, results: Vec<AggregatedResult>) -> Self {
        Self {
            project: project.to_string(),
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in the order they appear on the grid
    pub fn sorted(&self) -> Vec<&AggregatedResult> {
        sorted_by_label(&self.results)
    }

    /// Count results by health for one window
    pub fn summary(&self, window: Window) -> ReportSummary {
        let values = self.results.iter().map(|r| r.value(window));
        ReportSummary {
            window,
            total: self.results.len(),
            below_threshold: values.clone().filter(|v| *v < RED_THRESHOLD).count(),
            no_data: values.filter(|v| *v == 0.0).count(),
        }
    }
}

pub struct ReportSummary {
    pub window: Window,
    pub total: usize,
    /// Includes the no-data results.
    pub below_threshold: usize,
    pub no_data: usize,
}

impl ReportSummary {
    pub fn healthy(&self) -> usize {
        self.total - self.below_threshold
    }

    pub fn has_issues(&self) -> bool {
        self.below_threshold > 0
    }
}
