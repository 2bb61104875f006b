//! Excessive-clone detection.
//!
//! An actor is flagged when the number of distinct private repositories they
//! cloned inside the long window reaches the threshold. Only the clones that
//! also fall inside the short window are reported, so a flagged actor does not
//! re-alert on the same old activity every run.
//!
//! Two different identities are used:
//! - the threshold counts base-path identities (final segment of
//!   `repository`), so cloning forks of one upstream counts once;
//! - reporting keeps the first event per literal `repo` value.

use std::collections::{HashMap, HashSet};

use auditwatch_core::{AppError, AppResult};
use chrono::{DateTime, Utc};

use crate::{AuditRecord, BotNamePatterns, repository_identity::base_path};

/// Windows and threshold for one clone-detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneDetectionPolicy {
    long_window_start: DateTime<Utc>,
    short_window_start: DateTime<Utc>,
    threshold: usize,
}

impl CloneDetectionPolicy {
    /// Creates a validated policy. The threshold must be at least one and the
    /// short window must lie inside the long one.
    pub fn new(
        long_window_start: DateTime<Utc>,
        short_window_start: DateTime<Utc>,
        threshold: usize,
    ) -> AppResult<Self> {
        if threshold == 0 {
            return Err(AppError::Configuration(
                "clone threshold must be at least 1".to_owned(),
            ));
        }

        if short_window_start < long_window_start {
            return Err(AppError::Configuration(format!(
                "clone report window starting {short_window_start} begins before the clone \
                 search window starting {long_window_start}"
            )));
        }

        Ok(Self {
            long_window_start,
            short_window_start,
            threshold,
        })
    }

    /// Returns the oldest timestamp considered for counting.
    #[must_use]
    pub fn long_window_start(&self) -> DateTime<Utc> {
        self.long_window_start
    }

    /// Returns the oldest timestamp considered for reporting.
    #[must_use]
    pub fn short_window_start(&self) -> DateTime<Utc> {
        self.short_window_start
    }

    /// Returns the distinct-repository threshold.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// Clone activity of one actor within the long window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorCloneActivity {
    actor: String,
    clone_events: usize,
    distinct_repositories: usize,
    flagged: bool,
    skipped_before_short_window: usize,
    reported: Vec<AuditRecord>,
}

impl ActorCloneActivity {
    /// Returns the acting identity.
    #[must_use]
    pub fn actor(&self) -> &str {
        self.actor.as_str()
    }

    /// Returns the number of qualifying clone events.
    #[must_use]
    pub fn clone_events(&self) -> usize {
        self.clone_events
    }

    /// Returns the number of distinct base-path repositories cloned.
    #[must_use]
    pub fn distinct_repositories(&self) -> usize {
        self.distinct_repositories
    }

    /// Returns whether the actor reached the threshold.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Returns how many events of a flagged actor fell before the short window.
    #[must_use]
    pub fn skipped_before_short_window(&self) -> usize {
        self.skipped_before_short_window
    }

    /// Returns the events reported for this actor. Empty unless flagged.
    #[must_use]
    pub fn reported(&self) -> &[AuditRecord] {
        &self.reported
    }
}

/// Result of one clone-detection pass, one entry per actor with any
/// qualifying clone, in order of the actor's first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneAggregation {
    activities: Vec<ActorCloneActivity>,
}

impl CloneAggregation {
    /// Returns all per-actor activity, flagged or not.
    #[must_use]
    pub fn activities(&self) -> &[ActorCloneActivity] {
        &self.activities
    }

    /// Returns only the flagged actors.
    pub fn flagged(&self) -> impl Iterator<Item = &ActorCloneActivity> {
        self.activities.iter().filter(|activity| activity.flagged)
    }

    /// Flattens the reported events of every flagged actor, preserving order.
    #[must_use]
    pub fn into_reported_records(self) -> Vec<AuditRecord> {
        self.activities
            .into_iter()
            .flat_map(|activity| activity.reported)
            .collect()
    }
}

/// Detects actors cloning an excessive number of distinct private repositories.
///
/// Input is expected newest-first but ordering is not required for
/// correctness. Records older than the long window are dropped even if the
/// source already bounded its query.
#[must_use]
pub fn detect_excessive_clones(
    records: &[AuditRecord],
    policy: &CloneDetectionPolicy,
    bots: &BotNamePatterns,
) -> CloneAggregation {
    let mut actor_order: Vec<&str> = Vec::new();
    let mut events_by_actor: HashMap<&str, Vec<&AuditRecord>> = HashMap::new();

    for record in records.iter().filter(|record| {
        record.is_clone()
            && !record.is_public()
            && !bots.is_bot(record.actor())
            && record.timestamp() >= policy.long_window_start
    }) {
        events_by_actor
            .entry(record.actor())
            .or_insert_with(|| {
                actor_order.push(record.actor());
                Vec::new()
            })
            .push(record);
    }

    let activities = actor_order
        .into_iter()
        .filter_map(|actor| {
            events_by_actor
                .remove(actor)
                .map(|events| summarize_actor(actor, &events, policy))
        })
        .collect();

    CloneAggregation { activities }
}

fn summarize_actor(
    actor: &str,
    events: &[&AuditRecord],
    policy: &CloneDetectionPolicy,
) -> ActorCloneActivity {
    // Missing `repository` values collapse into one shared identity.
    let distinct_repositories = events
        .iter()
        .map(|event| event.repository().and_then(base_path))
        .collect::<HashSet<_>>()
        .len();
    let flagged = distinct_repositories >= policy.threshold;

    let mut reported = Vec::new();
    let mut skipped_before_short_window = 0;
    if flagged {
        let mut seen_repos = HashSet::new();
        for event in events {
            if event.timestamp() < policy.short_window_start {
                skipped_before_short_window += 1;
                continue;
            }

            if seen_repos.insert(event.repo()) {
                reported.push((*event).clone());
            }
        }
    }

    ActorCloneActivity {
        actor: actor.to_owned(),
        clone_events: events.len(),
        distinct_repositories,
        flagged,
        skipped_before_short_window,
        reported,
    }
}

#[cfg(test)]
mod tests {
    use auditwatch_core::AppError;
    use chrono::{DateTime, Duration, Utc};

    use super::{CloneDetectionPolicy, detect_excessive_clones};
    use crate::{AuditRecord, BotNamePatterns};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_790_000_000, 0).unwrap_or_else(|| unreachable!())
    }

    fn policy(threshold: usize) -> CloneDetectionPolicy {
        CloneDetectionPolicy::new(
            now() - Duration::hours(24),
            now() - Duration::minutes(15),
            threshold,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn bots() -> BotNamePatterns {
        BotNamePatterns::new(["[bot]", "-bot"]).unwrap_or_else(|_| unreachable!())
    }

    fn clone(actor: &str, repository: &str, minutes_ago: i64) -> AuditRecord {
        let bare = repository.rsplit('/').next().unwrap_or(repository);
        AuditRecord::new(actor, "git.clone", now() - Duration::minutes(minutes_ago))
            .with_org("acme")
            .with_repository(repository)
            .with_repo(bare)
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let result = CloneDetectionPolicy::new(now(), now(), 0);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn report_window_longer_than_search_window_is_rejected() {
        let result = CloneDetectionPolicy::new(
            now() - Duration::hours(24),
            now() - Duration::hours(25),
            3,
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));

        let start = now() - Duration::hours(24);
        let equal = CloneDetectionPolicy::new(start, start, 3);
        assert!(equal.is_ok());
    }

    #[test]
    fn actor_reaching_threshold_is_flagged() {
        let records = vec![
            clone("mallory", "acme/one", 1),
            clone("mallory", "acme/two", 2),
            clone("mallory", "acme/three", 3),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(3), &bots());

        assert_eq!(aggregation.flagged().count(), 1);
        assert_eq!(aggregation.activities()[0].distinct_repositories(), 3);
        assert_eq!(aggregation.into_reported_records(), records);
    }

    #[test]
    fn actor_below_threshold_reports_nothing() {
        let records = vec![
            clone("alice", "acme/one", 1),
            clone("alice", "acme/two", 2),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(3), &bots());

        assert_eq!(aggregation.activities().len(), 1);
        assert!(!aggregation.activities()[0].is_flagged());
        assert!(aggregation.into_reported_records().is_empty());
    }

    #[test]
    fn forks_of_one_upstream_count_once() {
        let records = vec![
            clone("mallory", "acme/upstream", 1),
            clone("mallory", "mallory-fork/upstream", 2),
            clone("mallory", "acme/two", 3),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(3), &bots());

        assert_eq!(aggregation.activities()[0].distinct_repositories(), 2);
        assert_eq!(aggregation.flagged().count(), 0);
    }

    #[test]
    fn reporting_keeps_first_event_per_bare_repo() {
        let records = vec![
            clone("mallory", "acme/one", 1),
            clone("mallory", "acme/one", 5),
            clone("mallory", "acme/two", 6),
            clone("mallory", "acme/three", 7),
        ];

        let reported =
            detect_excessive_clones(&records, &policy(3), &bots()).into_reported_records();

        assert_eq!(reported.len(), 3);
        assert_eq!(reported[0].timestamp(), now() - Duration::minutes(1));
    }

    #[test]
    fn dedup_uses_repo_field_not_base_path() {
        // Same base path, distinct `repo` values: counted once, reported twice.
        let records = vec![
            clone("mallory", "acme/one", 1),
            AuditRecord::new("mallory", "git.clone", now() - Duration::minutes(2))
                .with_repository("fork/one")
                .with_repo("fork-one"),
            clone("mallory", "acme/two", 3),
        ];

        let reported =
            detect_excessive_clones(&records, &policy(2), &bots()).into_reported_records();

        assert_eq!(reported.len(), 3);
    }

    #[test]
    fn short_window_boundary_is_inclusive() {
        let records = vec![
            clone("mallory", "acme/one", 15),
            AuditRecord::new(
                "mallory",
                "git.clone",
                now() - Duration::minutes(15) - Duration::seconds(1),
            )
            .with_repository("acme/two")
            .with_repo("two"),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(2), &bots());
        let activity = &aggregation.activities()[0];

        assert!(activity.is_flagged());
        assert_eq!(activity.skipped_before_short_window(), 1);
        assert_eq!(activity.reported().len(), 1);
        assert_eq!(activity.reported()[0].repo(), Some("one"));
    }

    #[test]
    fn old_events_still_count_toward_threshold() {
        let records = vec![
            clone("mallory", "acme/one", 1),
            clone("mallory", "acme/two", 120),
            clone("mallory", "acme/three", 600),
        ];

        let reported =
            detect_excessive_clones(&records, &policy(3), &bots()).into_reported_records();

        assert_eq!(reported.len(), 1);
    }

    #[test]
    fn events_older_than_long_window_are_dropped() {
        let records = vec![
            clone("mallory", "acme/one", 1),
            clone("mallory", "acme/two", 2),
            clone("mallory", "acme/three", 24 * 60 + 1),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(3), &bots());

        assert_eq!(aggregation.activities()[0].clone_events(), 2);
        assert_eq!(aggregation.flagged().count(), 0);
    }

    #[test]
    fn public_clones_are_never_reported() {
        let records = vec![
            clone("mallory", "acme/one", 1).with_public(true),
            clone("mallory", "acme/two", 2).with_public(true),
            clone("mallory", "acme/three", 3).with_public(true),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(1), &bots());

        assert!(aggregation.activities().is_empty());
    }

    #[test]
    fn bots_and_other_actions_are_ignored() {
        let records = vec![
            clone("ci-bot", "acme/one", 1),
            clone("dependabot[bot]", "acme/two", 2),
            AuditRecord::new("alice", "git.push", now()).with_repository("acme/one"),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(1), &bots());

        assert!(aggregation.activities().is_empty());
    }

    #[test]
    fn actors_are_reported_in_order_of_first_appearance() {
        let records = vec![
            clone("bob", "acme/one", 1),
            clone("mallory", "acme/one", 2),
            clone("bob", "acme/two", 3),
            clone("mallory", "acme/two", 4),
        ];

        let aggregation = detect_excessive_clones(&records, &policy(2), &bots());
        let actors: Vec<&str> = aggregation.flagged().map(|activity| activity.actor()).collect();

        assert_eq!(actors, ["bob", "mallory"]);
    }
}
