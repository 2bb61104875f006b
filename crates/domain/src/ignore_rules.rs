use auditwatch_core::{AppError, AppResult};
use regex::Regex;

/// One list of action patterns compiled into a single anchored alternation.
///
/// Patterns use regular-expression syntax and must match the whole action,
/// so `workflows.*` matches every action beginning with `workflows.` but
/// `repo.create` does not match `repo.create_actions_secret`.
#[derive(Debug, Clone)]
pub struct ActionMatcher {
    matcher: Option<Regex>,
}

impl ActionMatcher {
    /// Compiles a pattern list. An empty list matches nothing.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> AppResult<Self> {
        let mut alternatives = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.trim().is_empty() {
                return Err(AppError::Configuration(
                    "ignore patterns must not be empty".to_owned(),
                ));
            }

            // Compiled alone first so the error names the offending pattern.
            Regex::new(pattern).map_err(|error| {
                AppError::Configuration(format!("invalid ignore pattern '{pattern}': {error}"))
            })?;
            alternatives.push(format!("(?:{pattern})"));
        }

        let matcher = if alternatives.is_empty() {
            None
        } else {
            let combined = format!("^(?:{})$", alternatives.join("|"));
            Some(Regex::new(combined.as_str()).map_err(|error| {
                AppError::Configuration(format!("failed to compile ignore patterns: {error}"))
            })?)
        };

        Ok(Self { matcher })
    }

    /// Returns whether the whole action matches any pattern.
    #[must_use]
    pub fn is_match(&self, action: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(action))
    }
}

/// The two-tier ignore policy.
///
/// Universal patterns suppress an action everywhere. Non-critical patterns
/// suppress an action only outside critical repositories.
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    universal: ActionMatcher,
    non_critical: ActionMatcher,
}

impl IgnoreRuleSet {
    /// Compiles both tiers. Any malformed pattern is a configuration error.
    pub fn compile<U: AsRef<str>, N: AsRef<str>>(
        universal: &[U],
        non_critical: &[N],
    ) -> AppResult<Self> {
        Ok(Self {
            universal: ActionMatcher::compile(universal)?,
            non_critical: ActionMatcher::compile(non_critical)?,
        })
    }

    /// Returns whether the universal tier suppresses the action.
    #[must_use]
    pub fn ignores_everywhere(&self, action: &str) -> bool {
        self.universal.is_match(action)
    }

    /// Returns whether the non-critical tier suppresses the action.
    #[must_use]
    pub fn ignores_outside_critical(&self, action: &str) -> bool {
        self.non_critical.is_match(action)
    }
}
