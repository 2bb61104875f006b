use auditwatch_core::{AppError, AppResult};

/// Actor suffixes that identify automation and service accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotNamePatterns {
    suffixes: Vec<String>,
}

impl BotNamePatterns {
    /// Creates the pattern set. Empty suffixes are rejected since they would
    /// match every actor.
    pub fn new<I, S>(suffixes: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suffixes = suffixes.into_iter().map(Into::into).collect::<Vec<_>>();
        if suffixes.iter().any(String::is_empty) {
            return Err(AppError::Configuration(
                "bot name patterns must not be empty".to_owned(),
            ));
        }

        Ok(Self { suffixes })
    }

    /// Returns whether the actor ends with any configured suffix.
    ///
    /// Case-sensitive exact suffix comparison.
    #[must_use]
    pub fn is_bot(&self, actor: &str) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| actor.ends_with(suffix.as_str()))
    }
}
