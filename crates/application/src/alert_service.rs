use std::sync::Arc;

use auditwatch_core::{AppError, AppResult, NonEmptyString};
use auditwatch_domain::{
    AlertFormatter, AuditCategory, AuditRecord, BotNamePatterns, Classification,
    CloneDetectionPolicy, CriticalRepoSet, IgnoreRuleSet, RuleClassifier, detect_excessive_clones,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{AlertNotifier, AuditLogSource};

mod settings;

pub use settings::{AlertRunReport, AlertSettings};


/// Runs the web-event and excessive-clone pipelines for one organization and
/// delivers the resulting alerts.
///
/// All rule material is compiled once in [`AuditAlertService::new`], so a
/// malformed pattern fails before any record is fetched.
#[derive(Clone)]
pub struct AuditAlertService {
    source: Arc<dyn AuditLogSource>,
    notifier: Arc<dyn AlertNotifier>,
    organization: NonEmptyString,
    alert_since: DateTime<Utc>,
    classifier: RuleClassifier,
    bots: BotNamePatterns,
    clone_policy: CloneDetectionPolicy,
    formatter: AlertFormatter,
}

impl AuditAlertService {
    /// Creates the service, validating and compiling `settings`.
    pub fn new(
        source: Arc<dyn AuditLogSource>,
        notifier: Arc<dyn AlertNotifier>,
        settings: AlertSettings,
    ) -> AppResult<Self> {
        let AlertSettings {
            organization,
            alert_since,
            clone_since,
            clone_report_since,
            max_cloned_repos,
            critical_repos,
            universal_ignore_actions,
            non_critical_ignore_actions,
            bot_names,
            audit_web_base_url,
        } = settings;

        let organization = NonEmptyString::new(organization).map_err(|_| {
            AppError::Configuration("organization must not be empty".to_owned())
        })?;
        let rules = IgnoreRuleSet::compile(&universal_ignore_actions, &non_critical_ignore_actions)?;
        let critical = CriticalRepoSet::new(&critical_repos, organization.as_str());
        let classifier = RuleClassifier::new(organization.as_str(), rules, critical);
        let bots = BotNamePatterns::new(bot_names)?;
        let clone_policy =
            CloneDetectionPolicy::new(clone_since, clone_report_since, max_cloned_repos)?;
        let formatter = AlertFormatter::new(audit_web_base_url.as_str())?;

        Ok(Self {
            source,
            notifier,
            organization,
            alert_since,
            classifier,
            bots,
            clone_policy,
            formatter,
        })
    }

    /// Returns web-activity records that should raise an alert, newest first.
    pub async fn web_events(&self) -> AppResult<Vec<AuditRecord>> {
        info!(
            organization = %self.organization.as_str(),
            since = %self.alert_since,
            "looking for web events"
        );

        let records = self
            .source
            .fetch_records(AuditCategory::Web, self.alert_since)
            .await?;

        let mut matches = Vec::new();
        for record in records {
            // The source may hand back the first record past the cutoff.
            if record.timestamp() < self.alert_since {
                continue;
            }

            if self.bots.is_bot(record.actor()) {
                continue;
            }

            match self.classifier.classify(&record) {
                Classification::Alert => {
                    info!(record = %record_json(&record), "found");
                    matches.push(record);
                }
                suppressed => {
                    debug!(
                        action = %record.action(),
                        actor = %record.actor(),
                        outcome = suppressed.as_str(),
                        "web event suppressed"
                    );
                }
            }
        }

        Ok(matches)
    }

    /// Returns the reported clone events of every actor that crossed the
    /// distinct-repository threshold.
    pub async fn clone_events(&self) -> AppResult<Vec<AuditRecord>> {
        info!(
            organization = %self.organization.as_str(),
            since = %self.clone_policy.long_window_start(),
            "looking for clone events impacting private repos"
        );

        let records = self
            .source
            .fetch_records(AuditCategory::Git, self.clone_policy.long_window_start())
            .await?;

        let aggregation = detect_excessive_clones(&records, &self.clone_policy, &self.bots);
        info!(
            since = %self.clone_policy.short_window_start(),
            flagged_actors = aggregation.flagged().count(),
            "finding excessive clones"
        );
        for activity in aggregation.activities() {
            info!(
                actor = %activity.actor(),
                clone_events = activity.clone_events(),
                distinct_repositories = activity.distinct_repositories(),
                flagged = activity.is_flagged(),
                "git clone activity"
            );

            if activity.skipped_before_short_window() > 0 {
                debug!(
                    actor = %activity.actor(),
                    skipped = activity.skipped_before_short_window(),
                    "ignoring excessive clones before the report window"
                );
            }

            for record in activity.reported() {
                info!(record = %record_json(record), "found");
            }
        }

        Ok(aggregation.into_reported_records())
    }

    /// Attempts delivery of every message and returns how many failed.
    ///
    /// A failed delivery never stops the remaining ones.
    pub async fn notify_all<S: AsRef<str>>(&self, messages: &[S]) -> usize {
        let mut failures = 0_usize;
        for message in messages {
            if let Err(error) = self.notifier.notify(message.as_ref()).await {
                failures = failures.saturating_add(1);
                warn!(error = %error, "notify failed");
            }
        }

        failures
    }

    /// Runs both pipelines and notifies every match.
    ///
    /// A fetch failure in either pipeline aborts the run before any alert is
    /// sent. Notification failures are only counted; inspect
    /// [`AlertRunReport::failed_notifications`] or call
    /// [`AlertRunReport::into_result`].
    pub async fn run(&self) -> AppResult<AlertRunReport> {
        let (web_matches, clone_matches) =
            tokio::try_join!(self.web_events(), self.clone_events())?;

        let threshold = self.clone_policy.threshold();
        let messages = web_matches
            .iter()
            .map(|record| self.formatter.format(record))
            .chain(
                clone_matches
                    .iter()
                    .map(|record| self.formatter.format_clone_alert(record, threshold)),
            )
            .collect::<Vec<_>>();

        let failed_notifications = self.notify_all(&messages).await;
        let report = AlertRunReport {
            web_alerts: web_matches.len(),
            clone_alerts: clone_matches.len(),
            failed_notifications,
        };

        info!(
            organization = %self.organization.as_str(),
            web_alerts = report.web_alerts,
            clone_alerts = report.clone_alerts,
            failed_notifications = report.failed_notifications,
            "audit alert run finished"
        );

        Ok(report)
    }
}

fn record_json(record: &AuditRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|error| format!("<unserializable: {error}>"))
}
