use crate::{AuditRecord, CriticalRepoSet, IgnoreRuleSet, RepositoryIdentity};

/// Outcome of evaluating one record against the ignore policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Suppressed by the universal tier. Criticality cannot rescue it.
    SuppressedUniversal,
    /// Suppressed by the non-critical tier on a non-critical repository.
    SuppressedNonCritical,
    /// Alert-worthy.
    Alert,
}

impl Classification {
    /// Returns a stable label for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuppressedUniversal => "suppressed_universal",
            Self::SuppressedNonCritical => "suppressed_non_critical",
            Self::Alert => "alert",
        }
    }
}

/// Decides per record whether it is alert-worthy.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    organization: String,
    rules: IgnoreRuleSet,
    critical: CriticalRepoSet,
}

impl RuleClassifier {
    /// Creates a classifier for one run's organization.
    #[must_use]
    pub fn new(
        organization: impl Into<String>,
        rules: IgnoreRuleSet,
        critical: CriticalRepoSet,
    ) -> Self {
        Self {
            organization: organization.into(),
            rules,
            critical,
        }
    }

    /// Classifies one record. Pure.
    #[must_use]
    pub fn classify(&self, record: &AuditRecord) -> Classification {
        let action = record.action();
        if self.rules.ignores_everywhere(action) {
            return Classification::SuppressedUniversal;
        }

        if !self.is_critical(record) && self.rules.ignores_outside_critical(action) {
            return Classification::SuppressedNonCritical;
        }

        Classification::Alert
    }

    /// Returns whether the record targets a critical repository.
    ///
    /// Records without a resolvable repository are never critical.
    #[must_use]
    pub fn is_critical(&self, record: &AuditRecord) -> bool {
        RepositoryIdentity::resolve(record, self.organization.as_str())
            .qualified()
            .is_some_and(|repository| self.critical.contains(repository))
    }
}
