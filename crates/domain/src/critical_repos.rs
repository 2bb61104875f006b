use std::collections::HashSet;

use crate::repository_identity::qualify_repository;

/// Repositories held to the stricter alerting policy, stored as `org/name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalRepoSet {
    repositories: HashSet<String>,
}

impl CriticalRepoSet {
    /// Builds the set, qualifying bare names with `organization`.
    ///
    /// Blank entries are skipped.
    #[must_use]
    pub fn new<I, S>(names: I, organization: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let repositories = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref().trim();
                (!name.is_empty()).then(|| qualify_repository(name, organization))
            })
            .collect();

        Self { repositories }
    }

    /// Returns whether a fully-qualified repository is critical.
    #[must_use]
    pub fn contains(&self, qualified_repository: &str) -> bool {
        self.repositories.contains(qualified_repository)
    }
}
