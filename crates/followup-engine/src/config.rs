//! Engine configuration.

use std::env;
use std::time::Duration;

use brain_core::ContextWindow;

/// Default limit on a single reply generation.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables of the conversation orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How much of the transcript reaches the brain.
    pub context_window: ContextWindow,
    /// Upper bound on one brain call.
    pub reply_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_window: ContextWindow::unbounded(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Read `FOLLOWUP_CONTEXT_MAX_TURNS` and `FOLLOWUP_REPLY_TIMEOUT_SECS`.
    ///
    /// Unset, zero or unparsable values keep the defaults (unbounded
    /// context, 60 second timeout).
    pub fn from_env() -> Self {
        let context_window = env::var("FOLLOWUP_CONTEXT_MAX_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|turns| *turns > 0)
            .map(ContextWindow::sliding)
            .unwrap_or_default();

        let reply_timeout = env::var("FOLLOWUP_REPLY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REPLY_TIMEOUT);

        Self {
            context_window,
            reply_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_context_turns() {
        std::env::set_var("FOLLOWUP_CONTEXT_MAX_TURNS", "12");
        assert_eq!(
            EngineConfig::from_env().context_window,
            ContextWindow::sliding(12)
        );

        std::env::set_var("FOLLOWUP_CONTEXT_MAX_TURNS", "0");
        assert_eq!(
            EngineConfig::from_env().context_window,
            ContextWindow::unbounded()
        );

        std::env::set_var("FOLLOWUP_CONTEXT_MAX_TURNS", "lots");
        assert_eq!(
            EngineConfig::from_env().context_window,
            ContextWindow::unbounded()
        );

        std::env::remove_var("FOLLOWUP_CONTEXT_MAX_TURNS");
    }
}
