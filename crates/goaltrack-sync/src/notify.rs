//! User-visible failure notifications
//!
//! A rolled-back mutation raises one transient [`Notice`]; how it is shown
//! (toast, status line, log) is up to the injected [`Notifier`].

use crate::mutation::Action;
use goaltrack_store::StoreError;
use serde::Serialize;

/// Transient message about a failed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Action that failed
    pub action: Action,
    /// Message for the user
    pub message: String,
    /// Whether trying again later may help
    pub retryable: bool,
}

impl Notice {
    /// Notice for a rolled-back mutation
    #[must_use]
    pub fn rolled_back(action: Action, error: &StoreError) -> Self {
        Self {
            action,
            message: format!("Failed to {action}. {}", error.user_message()),
            retryable: error.is_retryable(),
        }
    }
}

/// Sink for notices
pub trait Notifier: Send + Sync {
    /// Show a notice
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(action = %notice.action, retryable = notice.retryable, "{}", notice.message);
    }
}
