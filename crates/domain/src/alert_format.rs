use std::fmt::Write as _;

use auditwatch_core::{AppError, AppResult};
use chrono::SecondsFormat;
use url::Url;

use crate::{AuditRecord, RepositoryIdentity};

/// Web UI used for audit-log deep links when none is configured.
pub const DEFAULT_AUDIT_WEB_BASE_URL: &str = "https://github.com";

/// Renders audit records as single-line, human-readable alerts.
///
/// Output is a pure function of the record, so the same record always yields
/// the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertFormatter {
    web_base_url: Url,
}

impl AlertFormatter {
    /// Creates a formatter linking into the audit UI at `web_base_url`.
    pub fn new(web_base_url: &str) -> AppResult<Self> {
        let web_base_url = Url::parse(web_base_url).map_err(|error| {
            AppError::Configuration(format!(
                "invalid audit web base URL '{web_base_url}': {error}"
            ))
        })?;
        if web_base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "audit web base URL '{web_base_url}' cannot carry a path"
            )));
        }

        Ok(Self { web_base_url })
    }

    /// Formats one alert line.
    #[must_use]
    pub fn format(&self, record: &AuditRecord) -> String {
        let org = record.org().unwrap_or_default();
        let identity = RepositoryIdentity::resolve(record, org);
        let location = identity.qualified().unwrap_or(org);

        let mut message = format!(
            "{}: *{}* on *{}*",
            record.actor(),
            record.action(),
            location
        );

        // Writing into a String cannot fail.
        if let Some(previous) = record.previous_visibility() {
            let _ = write!(
                message,
                " visibility: {previous}->{}",
                record.visibility().unwrap_or_default()
            );
        }
        if let Some(user) = record.user() {
            let _ = write!(message, " user: {user:?}");
        }
        if let Some(name) = record.name() {
            let _ = write!(message, " name: {name:?}");
        }
        if let Some(explanation) = record.explanation() {
            let _ = write!(message, " explanation: {explanation:?}");
        }

        let timestamp = record.created_at().unwrap_or_else(|| record.timestamp());
        let _ = write!(
            message,
            ": {} [<{}|logs>]",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.audit_log_link(record)
        );

        message
    }

    /// Formats one excessive-clone alert, prefixed with the threshold.
    #[must_use]
    pub fn format_clone_alert(&self, record: &AuditRecord, threshold: usize) -> String {
        format!("excessive clone[>={threshold}]: {}", self.format(record))
    }

    /// Builds the audit UI link filtered to the record's action and actor.
    #[must_use]
    pub fn audit_log_link(&self, record: &AuditRecord) -> String {
        let mut link = self.web_base_url.clone();
        let base_path = link.path().trim_end_matches('/').to_owned();
        link.set_path(
            format!(
                "{base_path}/organizations/{}/settings/audit-log",
                record.org().unwrap_or_default()
            )
            .as_str(),
        );
        link.query_pairs_mut().clear().append_pair(
            "q",
            format!("action:{} actor:{}", record.action(), record.actor()).as_str(),
        );

        link.to_string()
    }
}
