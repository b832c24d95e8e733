//! Non-fatal findings collected by post-processing transforms.
//!
//! Transforms that detect a questionable but workable condition (for example
//! a sequence transform applied to a visibly unbalanced system) record it
//! here instead of failing; callers decide what a warning is worth.

use std::fmt;

/// How serious a recorded issue is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The result is usable; an assumption is under strain.
    Warning,
    /// The result should not be trusted.
    Error,
}

/// One recorded finding.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticIssue {
    /// Issue severity.
    pub severity: Severity,
    /// Short machine-matchable category, e.g. `"fortescue.unbalanced"`.
    pub category: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.category, self.message)
    }
}

/// Ordered collection of findings from one transform or computation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics {
    issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn add_warning(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.issues.push(DiagnosticIssue {
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
        });
    }

    /// Records an error-severity finding.
    pub fn add_error(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.issues.push(DiagnosticIssue {
            severity: Severity::Error,
            category: category.into(),
            message: message.into(),
        });
    }

    /// All findings, in recording order.
    #[must_use]
    pub fn issues(&self) -> &[DiagnosticIssue] {
        &self.issues
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_counts_findings() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_clean());
        diag.add_warning("fortescue.unbalanced", "off-diagonal leakage 12%");
        diag.add_error("kron.singular", "grounded block is singular");
        assert!(!diag.is_clean());
        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.issues().len(), 2);
        assert!(diag.issues()[0].to_string().contains("fortescue.unbalanced"));
    }
}
