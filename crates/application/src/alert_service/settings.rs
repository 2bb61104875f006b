use auditwatch_core::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// Per-run settings supplied by the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSettings {
    /// Organization whose audit trail is inspected.
    pub organization: String,
    /// Oldest web event that can raise an alert.
    pub alert_since: DateTime<Utc>,
    /// Start of the long window used to count cloned repositories.
    pub clone_since: DateTime<Utc>,
    /// Start of the short window used to report individual clones.
    pub clone_report_since: DateTime<Utc>,
    /// Distinct repositories that flag an actor. Must be at least one.
    pub max_cloned_repos: usize,
    /// Critical repository names, bare or `org/name`.
    pub critical_repos: Vec<String>,
    /// Action patterns ignored for every repository.
    pub universal_ignore_actions: Vec<String>,
    /// Action patterns ignored outside critical repositories.
    pub non_critical_ignore_actions: Vec<String>,
    /// Actor suffixes identifying automation accounts.
    pub bot_names: Vec<String>,
    /// Base URL of the audit web UI used for deep links.
    pub audit_web_base_url: String,
}

/// Outcome of one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertRunReport {
    /// Alerts raised by the web-event pipeline.
    pub web_alerts: usize,
    /// Alerts raised by the excessive-clone pipeline.
    pub clone_alerts: usize,
    /// Alert deliveries that failed.
    pub failed_notifications: usize,
}

impl AlertRunReport {
    /// Returns the total number of alerts attempted.
    #[must_use]
    pub fn total_alerts(&self) -> usize {
        self.web_alerts.saturating_add(self.clone_alerts)
    }

    /// Turns a report with failed deliveries into a notification error.
    pub fn into_result(self) -> AppResult<Self> {
        if self.failed_notifications > 0 {
            return Err(AppError::Notification(format!(
                "{} of {} alert notifications failed",
                self.failed_notifications,
                self.total_alerts()
            )));
        }

        Ok(self)
    }
}
