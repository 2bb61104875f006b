//! Auditwatch organization audit-log alerter.

#![forbid(unsafe_code)]

mod alerter_config;

use std::sync::Arc;

use auditwatch_application::{AlertNotifier, AlertRunReport, AuditAlertService};
use auditwatch_core::{AppError, AppResult};
use auditwatch_infrastructure::{
    ConsoleAlertNotifier, GitHubAuditLogConfig, GitHubAuditLogSource, WebhookAlertNotifier,
};
use chrono::Utc;
use tracing::info;

use crate::alerter_config::{AlerterConfig, NotifierConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AlerterConfig::load()?;
    let service = build_service(&config)?;

    info!(
        organization = %config.organization,
        alert_interval_seconds = config.alert_interval.as_secs(),
        clone_search_interval_seconds = config.clone_search_interval.as_secs(),
        max_cloned_repos = config.max_cloned_repos,
        dry_run = config.notifier == NotifierConfig::Console,
        "auditwatch-alerter started"
    );

    finish(service.run().await?)
}

/// Maps a finished run onto the process exit status.
fn finish(report: AlertRunReport) -> AppResult<()> {
    report.into_result().map(|_| ())
}

fn build_service(config: &AlerterConfig) -> AppResult<AuditAlertService> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let source = Arc::new(GitHubAuditLogSource::new(
        http_client.clone(),
        GitHubAuditLogConfig {
            api_base_url: config.github_api_base_url.to_string(),
            organization: config.organization.clone(),
            token: config.github_token.clone(),
            page_size: config.page_size,
            page_delay: config.page_delay,
        },
    ));

    let notifier: Arc<dyn AlertNotifier> = match &config.notifier {
        NotifierConfig::Console => Arc::new(ConsoleAlertNotifier::new()),
        NotifierConfig::Webhook(webhook_url) => {
            Arc::new(WebhookAlertNotifier::new(http_client, webhook_url.as_str()))
        }
    };

    AuditAlertService::new(source, notifier, config.alert_settings(Utc::now())?)
}
