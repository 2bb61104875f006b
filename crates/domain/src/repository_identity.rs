//! Canonical repository identities.
//!
//! The audit source populates `repository` and `repo` inconsistently, and
//! either may hold `org/name` or a bare `name`. Every consumer resolves
//! identities through this module:
//!
//! - the *qualified* identity prefers `repository`, falls back to `repo`, and
//!   prefixes bare names with an organization;
//! - the *base-path* identity is the final path segment of `repository` only,
//!   so a fork addressed as `other/upstream` and `acme/upstream` collapse into
//!   `upstream`.
//!
//! Clone reporting deduplicates on the literal `repo` field instead of either
//! of these. That asymmetry is kept on purpose; see `clone_aggregation`.

use crate::AuditRecord;

/// Identities derived from one record's repository fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    qualified: Option<String>,
    base_path: Option<String>,
}

impl RepositoryIdentity {
    /// Resolves both identities, qualifying bare names with `organization`.
    #[must_use]
    pub fn resolve(record: &AuditRecord, organization: &str) -> Self {
        let qualified = repository_reference(record)
            .map(|reference| qualify_repository(reference, organization));
        let base_path = record.repository().and_then(base_path).map(str::to_owned);

        Self {
            qualified,
            base_path,
        }
    }

    /// Returns the fully-qualified `org/name`, if the record names a repository.
    #[must_use]
    pub fn qualified(&self) -> Option<&str> {
        self.qualified.as_deref()
    }

    /// Returns the final path segment of the `repository` field.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }
}

/// Returns the repository reference a record carries, `repository` first.
#[must_use]
pub fn repository_reference(record: &AuditRecord) -> Option<&str> {
    record.repository().or_else(|| record.repo())
}

/// Prefixes a bare repository name with `organization`.
///
/// References that already contain a `/` are returned unchanged.
#[must_use]
pub fn qualify_repository(reference: &str, organization: &str) -> String {
    if reference.contains('/') || organization.is_empty() {
        reference.to_owned()
    } else {
        format!("{organization}/{reference}")
    }
}

/// Returns the final path segment of a repository reference.
#[must_use]
pub fn base_path(reference: &str) -> Option<&str> {
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{RepositoryIdentity, base_path, qualify_repository};
    use crate::AuditRecord;

    fn record() -> AuditRecord {
        AuditRecord::new("alice", "repo.access", Utc::now())
    }

    #[test]
    fn repository_field_takes_precedence_over_repo() {
        let identity = RepositoryIdentity::resolve(
            &record().with_repository("acme/api").with_repo("legacy"),
            "acme",
        );

        assert_eq!(identity.qualified(), Some("acme/api"));
    }

    #[test]
    fn repo_field_is_used_when_repository_is_missing() {
        let identity = RepositoryIdentity::resolve(&record().with_repo("billing"), "acme");

        assert_eq!(identity.qualified(), Some("acme/billing"));
        assert_eq!(identity.base_path(), None);
    }

    #[test]
    fn records_without_repository_have_no_identity() {
        let identity = RepositoryIdentity::resolve(&record(), "acme");

        assert_eq!(identity.qualified(), None);
        assert_eq!(identity.base_path(), None);
    }

    #[test]
    fn qualified_references_are_not_requalified() {
        assert_eq!(qualify_repository("other/api", "acme"), "other/api");
        assert_eq!(qualify_repository("api", "acme"), "acme/api");
        assert_eq!(qualify_repository("api", ""), "api");
    }

    #[test]
    fn base_path_unifies_forks() {
        assert_eq!(base_path("acme/upstream"), Some("upstream"));
        assert_eq!(base_path("fork-owner/upstream"), Some("upstream"));
        assert_eq!(base_path("upstream"), Some("upstream"));
        assert_eq!(base_path("acme/upstream/"), Some("upstream"));
        assert_eq!(base_path("/"), None);
    }
}
