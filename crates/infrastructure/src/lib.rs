//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_alert_notifier;
mod github_audit_log_source;
mod webhook_alert_notifier;

pub use console_alert_notifier::ConsoleAlertNotifier;
pub use github_audit_log_source::{
    GitHubAuditLogConfig, GitHubAuditLogSource, MAX_AUDIT_LOG_PAGE_SIZE,
};
pub use webhook_alert_notifier::WebhookAlertNotifier;
