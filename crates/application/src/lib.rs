//! Application services and ports.

#![forbid(unsafe_code)]

mod alert_ports;
mod alert_service;
mod default_rules;

pub use alert_ports::{AlertNotifier, AuditLogSource};
pub use alert_service::{AlertRunReport, AlertSettings, AuditAlertService};
pub use default_rules::{
    DEFAULT_ALERT_INTERVAL_SECONDS, DEFAULT_BOT_NAMES, DEFAULT_CLONE_SEARCH_INTERVAL_SECONDS,
    DEFAULT_MAX_REPOS_CLONED, DEFAULT_NON_CRITICAL_IGNORE_ACTIONS, DEFAULT_UNIVERSAL_IGNORE_ACTIONS,
};
