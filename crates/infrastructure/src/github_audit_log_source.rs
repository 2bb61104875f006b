use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header;
use serde::Deserialize;
use tracing::info;
use url::Url;

use auditwatch_application::AuditLogSource;
use auditwatch_core::{AppError, AppResult};
use auditwatch_domain::{AuditCategory, AuditRecord};

/// Largest page size accepted by the audit-log endpoint.
pub const MAX_AUDIT_LOG_PAGE_SIZE: u8 = 100;

const PROGRESS_LOG_EVERY: usize = 1_000;

/// Connection settings for the GitHub organization audit-log endpoint.
#[derive(Clone)]
pub struct GitHubAuditLogConfig {
    /// REST API base, e.g. `https://api.github.com`.
    pub api_base_url: String,
    /// Organization login.
    pub organization: String,
    /// Token with `read:audit_log` scope.
    pub token: String,
    /// Records requested per page, clamped to `1..=100`.
    pub page_size: u8,
    /// Pause between page requests.
    pub page_delay: Duration,
}

/// Audit-log source backed by the GitHub REST API with cursor pagination.
#[derive(Clone)]
pub struct GitHubAuditLogSource {
    http_client: reqwest::Client,
    config: GitHubAuditLogConfig,
}

#[derive(Debug)]
struct AuditLogPage {
    entries: Vec<GitHubAuditEntry>,
    next_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GitHubAuditEntry {
    #[serde(rename = "@timestamp")]
    timestamp: Option<i64>,
    created_at: Option<i64>,
    action: Option<String>,
    actor: Option<String>,
    org: Option<String>,
    repo: Option<String>,
    repository: Option<String>,
    repository_public: Option<bool>,
    visibility: Option<String>,
    previous_visibility: Option<String>,
    user: Option<String>,
    name: Option<String>,
    explanation: Option<String>,
}

impl GitHubAuditLogSource {
    /// Creates a source. The client is expected to carry the request timeout.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut config: GitHubAuditLogConfig) -> Self {
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_owned();
        config.page_size = config.page_size.clamp(1, MAX_AUDIT_LOG_PAGE_SIZE);
        Self {
            http_client,
            config,
        }
    }

    fn page_url(&self, category: AuditCategory, cursor: Option<&str>) -> AppResult<Url> {
        let endpoint = format!(
            "{}/orgs/{}/audit-log",
            self.config.api_base_url, self.config.organization
        );
        let mut url = Url::parse(endpoint.as_str()).map_err(|error| {
            AppError::Configuration(format!("invalid audit log endpoint '{endpoint}': {error}"))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("include", category.as_str())
                .append_pair("per_page", self.config.page_size.to_string().as_str());
            if let Some(cursor) = cursor {
                query.append_pair("after", cursor);
            }
        }

        Ok(url)
    }

    async fn fetch_page(
        &self,
        category: AuditCategory,
        cursor: Option<&str>,
    ) -> AppResult<AuditLogPage> {
        let url = self.page_url(category, cursor)?;
        let response = self
            .http_client
            .get(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.token),
            )
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, "auditwatch")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|error| {
                AppError::Fetch(format!(
                    "failed to call {} audit log endpoint: {error}",
                    category.as_str()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Fetch(format!(
                "{} audit log endpoint returned status {}: {body}",
                category.as_str(),
                status.as_u16()
            )));
        }

        let next_cursor = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_cursor_from_link_header);

        let entries = response
            .json::<Vec<GitHubAuditEntry>>()
            .await
            .map_err(|error| {
                AppError::Fetch(format!(
                    "failed to parse {} audit log response body: {error}",
                    category.as_str()
                ))
            })?;

        Ok(AuditLogPage {
            entries,
            next_cursor,
        })
    }
}

#[async_trait]
impl AuditLogSource for GitHubAuditLogSource {
    async fn fetch_records(
        &self,
        category: AuditCategory,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AuditRecord>> {
        info!(
            category = category.as_str(),
            since = %since,
            "querying audit events"
        );

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            if cursor.is_some() && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }

            let page = self.fetch_page(category, cursor.as_deref()).await?;
            if page.entries.is_empty() {
                break;
            }

            let fetched_before = records.len();
            for entry in page.entries {
                let record = entry.into_record();
                let reached_cutoff = record.timestamp() < since;
                records.push(record);
                if reached_cutoff {
                    return Ok(records);
                }
            }

            if records.len() / PROGRESS_LOG_EVERY > fetched_before / PROGRESS_LOG_EVERY {
                info!(
                    category = category.as_str(),
                    fetched = records.len(),
                    oldest = %records.last().map(AuditRecord::timestamp).unwrap_or(since),
                    "audit log pagination progress"
                );
            }

            match page.next_cursor {
                Some(next_cursor) => cursor = Some(next_cursor),
                None => break,
            }
        }

        Ok(records)
    }
}

impl GitHubAuditEntry {
    fn into_record(self) -> AuditRecord {
        let created_at = self.created_at.and_then(DateTime::from_timestamp_millis);
        // Entries without any timestamp sort as oldest and end pagination.
        let timestamp = self
            .timestamp
            .and_then(DateTime::from_timestamp_millis)
            .or(created_at)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut record = AuditRecord::new(
            self.actor.unwrap_or_default(),
            self.action.unwrap_or_default(),
            timestamp,
        )
        .with_org(self.org.unwrap_or_default())
        .with_repository(self.repository.unwrap_or_default())
        .with_repo(self.repo.unwrap_or_default())
        .with_public(self.repository_public.unwrap_or(false))
        .with_visibility_change(
            self.previous_visibility.unwrap_or_default(),
            self.visibility.unwrap_or_default(),
        )
        .with_user(self.user.unwrap_or_default())
        .with_name(self.name.unwrap_or_default())
        .with_explanation(self.explanation.unwrap_or_default());

        if let Some(created_at) = created_at {
            record = record.with_created_at(created_at);
        }

        record
    }
}

/// Extracts the `after` cursor from the `rel="next"` entry of a `Link` header.
fn next_cursor_from_link_header(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|link| {
        let mut sections = link.split(';');
        let target = sections.next()?.trim();
        if !sections.any(|param| param.trim() == "rel=\"next\"") {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "after")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    })
}
