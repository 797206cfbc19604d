use serde::{Deserialize, Serialize};

use crate::workflows::visa::domain::{CheckStatus, ValidationResult};

/// Aggregated verdict over an application's current validation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    pub overall_status: CheckStatus,
}

impl ValidationSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        Self::from_statuses(results.iter().map(|result| result.status))
    }

    /// Any fail wins, then any warning; an empty batch counts as a pass.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = CheckStatus>,
    {
        let mut summary = Self {
            total: 0,
            passed: 0,
            warnings: 0,
            failed: 0,
            overall_status: CheckStatus::Pass,
        };

        for status in statuses {
            summary.total += 1;
            match status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Warning => summary.warnings += 1,
                CheckStatus::Fail => summary.failed += 1,
            }
        }

        summary.overall_status = if summary.failed > 0 {
            CheckStatus::Fail
        } else if summary.warnings > 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Pass
        };

        summary
    }
}
