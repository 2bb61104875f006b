//! Console notifier for dry runs. Logs alerts to tracing output.

use async_trait::async_trait;
use auditwatch_application::AlertNotifier;
use auditwatch_core::AppResult;
use tracing::info;

/// Dry-run notifier used when no webhook is configured.
#[derive(Clone)]
pub struct ConsoleAlertNotifier;

impl ConsoleAlertNotifier {
    /// Creates a new console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleAlertNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertNotifier for ConsoleAlertNotifier {
    async fn notify(&self, message: &str) -> AppResult<()> {
        info!(message = message, "[would notify]");

        Ok(())
    }
}
