use std::env;
use std::time::Duration;

use auditwatch_application::{
    AlertSettings, DEFAULT_ALERT_INTERVAL_SECONDS, DEFAULT_BOT_NAMES,
    DEFAULT_CLONE_SEARCH_INTERVAL_SECONDS, DEFAULT_MAX_REPOS_CLONED,
    DEFAULT_NON_CRITICAL_IGNORE_ACTIONS, DEFAULT_UNIVERSAL_IGNORE_ACTIONS,
};
use auditwatch_core::{AppError, AppResult};
use auditwatch_domain::DEFAULT_AUDIT_WEB_BASE_URL;
use auditwatch_infrastructure::MAX_AUDIT_LOG_PAGE_SIZE;
use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 15;
const PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierConfig {
    /// No webhook configured: alerts are only logged.
    Console,
    Webhook(Url),
}

#[derive(Clone)]
pub struct AlerterConfig {
    pub github_token: String,
    pub organization: String,
    pub alert_interval: Duration,
    pub clone_search_interval: Duration,
    pub clone_report_interval: Duration,
    pub max_cloned_repos: usize,
    pub critical_repos: Vec<String>,
    pub bot_names: Vec<String>,
    pub universal_ignore_actions: Vec<String>,
    pub non_critical_ignore_actions: Vec<String>,
    pub notifier: NotifierConfig,
    pub github_api_base_url: Url,
    pub github_web_base_url: String,
    pub http_timeout: Duration,
    pub page_size: u8,
    pub page_delay: Duration,
}

impl AlerterConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let github_token = required_env(&lookup, "GITHUB_TOKEN")?;
        let organization = required_env(&lookup, "AUDIT_ORG")?;

        let alert_interval = parse_seconds(
            &lookup,
            "AUDIT_ALERT_INTERVAL_SECONDS",
            DEFAULT_ALERT_INTERVAL_SECONDS,
        )?;
        let clone_search_interval = parse_seconds(
            &lookup,
            "AUDIT_CLONE_SEARCH_INTERVAL_SECONDS",
            DEFAULT_CLONE_SEARCH_INTERVAL_SECONDS,
        )?;
        let clone_report_interval = parse_seconds(
            &lookup,
            "AUDIT_CLONE_REPORT_INTERVAL_SECONDS",
            alert_interval.as_secs(),
        )?;
        let http_timeout = parse_seconds(
            &lookup,
            "AUDIT_HTTP_TIMEOUT_SECONDS",
            DEFAULT_HTTP_TIMEOUT_SECONDS,
        )?;

        let max_cloned_repos: usize =
            parse_env(&lookup, "AUDIT_MAX_REPOS_CLONED", DEFAULT_MAX_REPOS_CLONED)?;
        if max_cloned_repos == 0 {
            return Err(AppError::Configuration(
                "AUDIT_MAX_REPOS_CLONED must be greater than zero".to_owned(),
            ));
        }

        let page_size: u8 = parse_env(&lookup, "AUDIT_PAGE_SIZE", MAX_AUDIT_LOG_PAGE_SIZE)?;
        if !(1..=MAX_AUDIT_LOG_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::Configuration(format!(
                "AUDIT_PAGE_SIZE must be between 1 and {MAX_AUDIT_LOG_PAGE_SIZE}"
            )));
        }

        let notifier = match non_empty_env(&lookup, "GH_AUDIT_SLACK_WEBHOOK") {
            Some(webhook_url) => {
                NotifierConfig::Webhook(parse_http_url("GH_AUDIT_SLACK_WEBHOOK", &webhook_url)?)
            }
            None => NotifierConfig::Console,
        };
        let github_api_base_url = parse_http_url(
            "GITHUB_API_BASE_URL",
            non_empty_env(&lookup, "GITHUB_API_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_GITHUB_API_BASE_URL),
        )?;

        Ok(Self {
            github_token,
            organization,
            alert_interval,
            clone_search_interval,
            clone_report_interval,
            max_cloned_repos,
            critical_repos: list_env(&lookup, "AUDIT_CRITICAL_REPOS", &[]),
            bot_names: list_env(&lookup, "AUDIT_BOT_NAMES", DEFAULT_BOT_NAMES),
            universal_ignore_actions: list_env(
                &lookup,
                "AUDIT_UNIVERSAL_IGNORE",
                DEFAULT_UNIVERSAL_IGNORE_ACTIONS,
            ),
            non_critical_ignore_actions: list_env(
                &lookup,
                "AUDIT_NON_CRITICAL_IGNORE",
                DEFAULT_NON_CRITICAL_IGNORE_ACTIONS,
            ),
            notifier,
            github_api_base_url,
            github_web_base_url: non_empty_env(&lookup, "GITHUB_WEB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AUDIT_WEB_BASE_URL.to_owned()),
            http_timeout,
            page_size,
            page_delay: PAGE_DELAY,
        })
    }

    /// Resolves the relative windows against `now` into service settings.
    pub fn alert_settings(&self, now: DateTime<Utc>) -> AppResult<AlertSettings> {
        Ok(AlertSettings {
            organization: self.organization.clone(),
            alert_since: window_start(now, self.alert_interval)?,
            clone_since: window_start(now, self.clone_search_interval)?,
            clone_report_since: window_start(now, self.clone_report_interval)?,
            max_cloned_repos: self.max_cloned_repos,
            critical_repos: self.critical_repos.clone(),
            universal_ignore_actions: self.universal_ignore_actions.clone(),
            non_critical_ignore_actions: self.non_critical_ignore_actions.clone(),
            bot_names: self.bot_names.clone(),
            audit_web_base_url: self.github_web_base_url.clone(),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn window_start(now: DateTime<Utc>, interval: Duration) -> AppResult<DateTime<Utc>> {
    chrono::Duration::from_std(interval)
        .ok()
        .and_then(|interval| now.checked_sub_signed(interval))
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "interval of {} seconds is out of range",
                interval.as_secs()
            ))
        })
}

fn parse_http_url(name: &str, value: &str) -> AppResult<Url> {
    let url = Url::parse(value).map_err(|error| {
        AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Configuration(format!(
            "{name} must be an http or https URL"
        )));
    }

    Ok(url)
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    non_empty_env(lookup, name).ok_or_else(|| AppError::Configuration(format!("{name} is required")))
}

fn non_empty_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_env(lookup, name) {
        Some(value) => value.parse::<T>().map_err(|error| {
            AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<Duration> {
    let seconds: u64 = parse_env(lookup, name, default)?;
    if seconds == 0 {
        return Err(AppError::Configuration(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(Duration::from_secs(seconds))
}

/// Reads a comma-separated list; an unset variable falls back to `defaults`.
fn list_env(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    defaults: &[&str],
) -> Vec<String> {
    match lookup(name) {
        Some(value) => split_list(value.as_str()),
        None => defaults.iter().map(|item| (*item).to_owned()).collect(),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use auditwatch_application::{DEFAULT_BOT_NAMES, DEFAULT_UNIVERSAL_IGNORE_ACTIONS};
    use auditwatch_core::AppError;
    use chrono::DateTime;

    use super::{AlerterConfig, NotifierConfig, split_list};

    fn load(pairs: &[(&str, &str)]) -> Result<AlerterConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        AlerterConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("GITHUB_TOKEN", "ghp_test"), ("AUDIT_ORG", "acme")];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = load(&REQUIRED).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.alert_interval, Duration::from_secs(900));
        assert_eq!(config.clone_search_interval, Duration::from_secs(86_400));
        assert_eq!(config.clone_report_interval, config.alert_interval);
        assert_eq!(config.max_cloned_repos, 5);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.notifier, NotifierConfig::Console);
        assert_eq!(config.github_api_base_url.as_str(), "https://api.github.com/");
        assert!(config.critical_repos.is_empty());
        assert_eq!(config.bot_names.len(), DEFAULT_BOT_NAMES.len());
        assert_eq!(
            config.universal_ignore_actions.len(),
            DEFAULT_UNIVERSAL_IGNORE_ACTIONS.len()
        );
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let result = load(&[("AUDIT_ORG", "acme"), ("GITHUB_TOKEN", "  ")]);

        assert!(matches!(
            result,
            Err(AppError::Configuration(message)) if message == "GITHUB_TOKEN is required"
        ));
    }

    #[test]
    fn lists_and_webhook_are_read_from_environment() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("AUDIT_CRITICAL_REPOS", "payments, ,acme/ledger"),
            ("AUDIT_UNIVERSAL_IGNORE", ""),
            ("GH_AUDIT_SLACK_WEBHOOK", "https://hooks.slack.test/T/B"),
            ("AUDIT_CLONE_REPORT_INTERVAL_SECONDS", "60"),
        ]);

        let config = load(&pairs).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.critical_repos, ["payments", "acme/ledger"]);
        assert!(config.universal_ignore_actions.is_empty());
        assert!(matches!(
            &config.notifier,
            NotifierConfig::Webhook(url) if url.as_str() == "https://hooks.slack.test/T/B"
        ));
        assert_eq!(config.clone_report_interval, Duration::from_secs(60));
    }

    #[test]
    fn zero_or_malformed_numbers_are_rejected() {
        for (name, value) in [
            ("AUDIT_ALERT_INTERVAL_SECONDS", "0"),
            ("AUDIT_MAX_REPOS_CLONED", "0"),
            ("AUDIT_HTTP_TIMEOUT_SECONDS", "0"),
            ("AUDIT_PAGE_SIZE", "101"),
            ("AUDIT_MAX_REPOS_CLONED", "five"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((name, value));

            assert!(
                matches!(load(&pairs), Err(AppError::Configuration(_))),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_urls_are_rejected_at_load() {
        for (name, value) in [
            ("GH_AUDIT_SLACK_WEBHOOK", "not a url"),
            ("GH_AUDIT_SLACK_WEBHOOK", "mailto:security@example.com"),
            ("GITHUB_API_BASE_URL", "::::"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((name, value));

            let rejected = matches!(
                load(&pairs),
                Err(AppError::Configuration(message)) if message.contains(name)
            );
            assert!(rejected, "{name}={value} should be rejected");
        }
    }

    #[test]
    fn settings_resolve_windows_against_now() {
        let config = load(&REQUIRED).unwrap_or_else(|_| unreachable!());
        let now = DateTime::from_timestamp(1_790_000_000, 0).unwrap_or_else(|| unreachable!());

        let settings = config
            .alert_settings(now)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(settings.alert_since.timestamp(), 1_790_000_000 - 900);
        assert_eq!(settings.clone_since.timestamp(), 1_790_000_000 - 86_400);
        assert_eq!(settings.clone_report_since, settings.alert_since);
        assert_eq!(settings.organization, "acme");
    }

    #[test]
    fn split_list_drops_blank_items() {
        assert_eq!(split_list(" -bot ,,[bot]"), ["-bot", "[bot]"]);
        assert!(split_list("").is_empty());
    }
}
