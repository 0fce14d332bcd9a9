//! Validator result types shared between the pipeline executor, the
//! contract checker, and the hull synthesis engine (which treats a
//! validator pass the same way the phase pipeline does).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal (and in-flight) states a validator run can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorState {
    Pending,
    Running,
    Passed,
    Warning,
    Failed,
    Error,
}

impl ValidatorState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ValidatorState::Pending | ValidatorState::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub finding_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub references: Vec<String>,
}

impl ValidationFinding {
    pub fn new(
        finding_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        ValidationFinding {
            finding_id: finding_id.into(),
            severity,
            message: message.into(),
            references: Vec::new(),
        }
    }
}

/// The result of running a single validator. Error and warning counts are
/// derived from `findings` rather than tracked separately, so they can
/// never drift out of sync with what's actually recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub validator_id: String,
    pub state: ValidatorState,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub findings: Vec<ValidationFinding>,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn new(validator_id: impl Into<String>) -> Self {
        ValidationResult {
            validator_id: validator_id.into(),
            state: ValidatorState::Pending,
            started_at: None,
            completed_at: None,
            findings: Vec::new(),
            error_message: None,
        }
    }

    pub fn add_finding(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity >= Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    /// The highest (worst) severity among this result's findings, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Resolve `state` from the findings recorded so far. Called once a
    /// validator's `run` body has finished populating findings.
    pub fn finalize(&mut self) {
        self.state = if self.error_count() > 0 {
            ValidatorState::Failed
        } else if self.warning_count() > 0 {
            ValidatorState::Warning
        } else {
            ValidatorState::Passed
        };
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_passes_with_no_findings() {
        let mut result = ValidationResult::new("hull/form");
        result.finalize();
        assert_eq!(result.state, ValidatorState::Passed);
    }

    #[test]
    fn finalize_warns_on_warning_finding() {
        let mut result = ValidationResult::new("hull/form");
        result.add_finding(ValidationFinding::new("w1", Severity::Warning, "low gm"));
        result.finalize();
        assert_eq!(result.state, ValidatorState::Warning);
    }

    #[test]
    fn finalize_fails_on_error_or_critical_finding() {
        let mut result = ValidationResult::new("stability/gz_curve");
        result.add_finding(ValidationFinding::new("e1", Severity::Critical, "capsizes"));
        result.finalize();
        assert_eq!(result.state, ValidatorState::Failed);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn worst_severity_picks_the_maximum() {
        let mut result = ValidationResult::new("hull/form");
        result.add_finding(ValidationFinding::new("a", Severity::Info, "fyi"));
        result.add_finding(ValidationFinding::new("b", Severity::Warning, "hmm"));
        assert_eq!(result.worst_severity(), Some(Severity::Warning));
    }

    #[test]
    fn severity_ordering_places_critical_above_error() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
