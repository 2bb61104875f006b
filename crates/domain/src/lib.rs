//! Domain model and pure decision logic for audit-trail alerting.

#![forbid(unsafe_code)]

mod alert_format;
mod audit_record;
mod bot_filter;
mod classification;
mod clone_aggregation;
mod critical_repos;
mod ignore_rules;
pub mod repository_identity;

pub use alert_format::{AlertFormatter, DEFAULT_AUDIT_WEB_BASE_URL};
pub use audit_record::{AuditCategory, AuditRecord, GIT_CLONE_ACTION};
pub use bot_filter::BotNamePatterns;
pub use classification::{Classification, RuleClassifier};
pub use clone_aggregation::{
    ActorCloneActivity, CloneAggregation, CloneDetectionPolicy, detect_excessive_clones,
};
pub use critical_repos::CriticalRepoSet;
pub use ignore_rules::{ActionMatcher, IgnoreRuleSet};
pub use repository_identity::RepositoryIdentity;
