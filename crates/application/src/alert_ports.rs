use async_trait::async_trait;
use auditwatch_core::AppResult;
use auditwatch_domain::{AuditCategory, AuditRecord};
use chrono::{DateTime, Utc};

/// Port for reading the organization audit trail.
#[async_trait]
pub trait AuditLogSource: Send + Sync {
    /// Fetches records of one category, newest first.
    ///
    /// Implementations stop no later than the first record older than
    /// `since`; that record may still be returned. Transport and auth
    /// failures must surface as errors, never as an empty result.
    async fn fetch_records(
        &self,
        category: AuditCategory,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AuditRecord>>;
}

/// Port for delivering formatted alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Attempts exactly one delivery of `message`.
    async fn notify(&self, message: &str) -> AppResult<()>;
}
