//! Protocol timing configuration.
//!
//! The collection window and the readiness poll interval are the
//! protocol's synchrony assumption made explicit: all correct processes'
//! round-k votes are assumed to arrive within the window. Both carry the
//! reference defaults and are first-class configuration so tests can
//! tighten them.

/// Configuration for the round driver.
///
/// All durations are in milliseconds.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Fixed wait after each broadcast during which votes for the current
    /// round are collected. Never shortened or lengthened at runtime.
    /// Default: 500.
    pub collection_window_ms: u64,

    /// Interval between cluster-readiness polls before the first round.
    /// Default: 100.
    pub readiness_poll_interval_ms: u64,

    /// Optional cap on the total readiness wait. `None` (the default)
    /// waits indefinitely; `Some(ms)` fails the run with a
    /// cluster-never-ready error once exceeded.
    pub readiness_wait_limit_ms: Option<u64>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            collection_window_ms: 500,
            readiness_poll_interval_ms: 100,
            readiness_wait_limit_ms: None,
        }
    }
}

impl ProtocolConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_window_ms == 0 {
            return Err(ConfigError::InvalidCollectionWindow);
        }
        if self.readiness_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if let Some(limit) = self.readiness_wait_limit_ms {
            if limit < self.readiness_poll_interval_ms {
                return Err(ConfigError::WaitLimitBelowPollInterval {
                    limit,
                    poll: self.readiness_poll_interval_ms,
                });
            }
        }
        Ok(())
    }

    /// Create a config suitable for local testing with shorter timings.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn dev_default() -> Self {
        Self {
            collection_window_ms: 200,
            readiness_poll_interval_ms: 10,
            readiness_wait_limit_ms: None,
        }
    }
}

/// Errors in protocol configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("collection_window_ms must be > 0")]
    InvalidCollectionWindow,
    #[error("readiness_poll_interval_ms must be > 0")]
    InvalidPollInterval,
    #[error("readiness_wait_limit_ms ({limit}) must be >= readiness_poll_interval_ms ({poll})")]
    WaitLimitBelowPollInterval { limit: u64, poll: u64 },
}
