use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action emitted by the audit source for every git clone.
pub const GIT_CLONE_ACTION: &str = "git.clone";

/// Audit trail partitions that can be queried independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    /// Activity performed through the web UI and REST API.
    Web,
    /// Git protocol activity such as clones and pushes.
    Git,
}

impl AuditCategory {
    /// Returns the stable query value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Git => "git",
        }
    }
}

/// One immutable entry of the organization audit trail.
///
/// Optional descriptive fields are normalized on construction: blank values
/// are stored as absent so that formatting and identity resolution never have
/// to distinguish "missing" from "empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    actor: String,
    action: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repo: Option<String>,
    #[serde(default)]
    is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl AuditRecord {
    /// Creates a record carrying only the mandatory fields.
    #[must_use]
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            timestamp,
            created_at: None,
            org: None,
            repository: None,
            repo: None,
            is_public: false,
            visibility: None,
            previous_visibility: None,
            user: None,
            name: None,
            explanation: None,
        }
    }

    /// Sets the owning organization.
    #[must_use]
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = non_blank(org);
        self
    }

    /// Sets the `repository` field (`org/name` or bare `name`).
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = non_blank(repository);
        self
    }

    /// Sets the alternate `repo` field.
    #[must_use]
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = non_blank(repo);
        self
    }

    /// Sets repository visibility at the time of the action.
    #[must_use]
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Sets the creation time reported by the source.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the visibility transition carried by visibility-change actions.
    #[must_use]
    pub fn with_visibility_change(
        mut self,
        previous_visibility: impl Into<String>,
        visibility: impl Into<String>,
    ) -> Self {
        self.previous_visibility = non_blank(previous_visibility);
        self.visibility = non_blank(visibility);
        self
    }

    /// Sets the subject user of the action.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = non_blank(user);
        self
    }

    /// Sets the descriptive subject name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_blank(name);
        self
    }

    /// Sets the free-text explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = non_blank(explanation);
        self
    }

    /// Returns the acting identity.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.actor.as_str()
    }

    /// Returns the dot-namespaced action.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns the authoritative ordering timestamp.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the creation time, if the source reported one.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Returns the `repository` field.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Returns the alternate `repo` field.
    #[must_use]
    pub fn repo(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    /// Returns whether the repository was public when the action happened.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Returns the new visibility for visibility-change actions.
    #[must_use]
    pub fn visibility(&self) -> Option<&str> {
        self.visibility.as_deref()
    }

    /// Returns the previous visibility for visibility-change actions.
    #[must_use]
    pub fn previous_visibility(&self) -> Option<&str> {
        self.previous_visibility.as_deref()
    }

    /// Returns the subject user.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the descriptive subject name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the free-text explanation.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Returns whether this record is a git clone.
    #[must_use]
    pub fn is_clone(&self) -> bool {
        self.action == GIT_CLONE_ACTION
    }
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
