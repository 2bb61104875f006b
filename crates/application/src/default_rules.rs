//! Default alerting policy. Every list here can be replaced in full by
//! configuration.

/// Default web alert window (15 minutes).
pub const DEFAULT_ALERT_INTERVAL_SECONDS: u64 = 15 * 60;

/// Default clone-counting window (24 hours).
pub const DEFAULT_CLONE_SEARCH_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

/// Default number of distinct repositories that flags an actor.
pub const DEFAULT_MAX_REPOS_CLONED: usize = 5;

/// Default actor suffixes of automation identities.
pub const DEFAULT_BOT_NAMES: &[&str] = &["-bot", "[bot]", "deploy", "guardian"];

/// Actions ignored for every repository.
pub const DEFAULT_UNIVERSAL_IGNORE_ACTIONS: &[&str] = &[
    "account.plan_change",
    "actions_cache.*",
    "environment.add_protection_rule",
    "environment.create",
    "environment.delete",
    "hook.events_changed",
    "integration_installation.repositories_removed",
    "issue.*",
    "merge_queue.*",
    "org_credential_authorization.*",
    "org.self_hosted_runner_.*",
    "org.sso_response",
    "packages.package_deleted",
    "packages.package_version_published",
    "personal_access_token.access_revoked",
    "personal_access_token.request_created",
    "project.*",
    "protected_branch.authorized_users_teams",
    "public_key.delete",
    "public_key.update",
    "pull_request.*",
    "repo.create",
    "repo.download_zip",
    "repo.pages_.*",
    "repo.remove_actions_secret",
    "repo.remove_member",
    "repo.remove_self_hosted_runner",
    "repo.self_hosted_runner_offline",
    "repository_dependency_graph.enable",
    "repository_projects.*",
    "repository_secret_scanning.enable",
    "repository_vulnerability_alert.auto_dismiss",
    "repository_vulnerability_alert.dismiss",
    "repository_vulnerability_alert.resolve",
    "repository_vulnerability_alerts.enable",
    "repo.update_actions_secret",
    "required_status_check.create",
    "team.add_repository",
    "workflows.*",
];

/// Actions ignored only outside critical repositories.
pub const DEFAULT_NON_CRITICAL_IGNORE_ACTIONS: &[&str] = &[
    "environment.update_protection_rule",
    "hook.config_changed",
    "hook.create",
    "integration_installation.*",
    "org.add_member",
    "org.add_outside_collaborator",
    "org.invite_member",
    "private_repository_forking.*",
    "protected_branch.*",
    "public_key.create",
    "public_key.verify",
    "repo.actions_enabled",
    "repo.add_member",
    "repo.add_topic",
    "repo.archived",
    "repo.change_merge_setting",
    "repo.create_actions_secret",
    "repo.destroy",
    "repo.register_self_hosted_runner",
    "repo.rename",
    "repo.self_hosted_runner_online",
    "repo.set_default_workflow_permissions",
    "repo.set_workflow_permission_can_approve_pr",
    "repository_invitation.accept",
    "repository_invitation.cancel",
    "repository_invitation.create",
    "repository_vulnerability_alert.create",
    "repository_vulnerability_alert.reintroduce",
    "repo.transfer",
    "repo.unarchived",
    "repo.update_member",
    "required_status_check.destroy",
    "team.*",
];
