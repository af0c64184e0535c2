//! Engine configuration

use std::time::Duration;

/// Tunables for the call engine.
///
/// The settle delays pace chained modem commands where the protocol offers
/// no acknowledgment for the first step; see the request operations for
/// where each applies.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of simultaneous call contexts
    pub max_calls: usize,
    /// Wait between releasing the foreground call and activating the held one
    pub release_settle: Duration,
    /// Wait between holding the active call and answering the waiting one
    pub hold_settle: Duration,
    /// Wait after stopping an unfinished tone before starting the next
    pub dtmf_settle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_calls: 7,
            release_settle: Duration::from_millis(300),
            hold_settle: Duration::from_millis(500),
            dtmf_settle: Duration::from_micros(300),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_calls(mut self, max_calls: usize) -> Self {
        self.max_calls = max_calls;
        self
    }

    pub fn with_release_settle(mut self, delay: Duration) -> Self {
        self.release_settle = delay;
        self
    }

    pub fn with_hold_settle(mut self, delay: Duration) -> Self {
        self.hold_settle = delay;
        self
    }

    pub fn with_dtmf_settle(mut self, delay: Duration) -> Self {
        self.dtmf_settle = delay;
        self
    }

    /// Configuration with all settle delays zeroed, for tests
    pub fn immediate() -> Self {
        Self::default()
            .with_release_settle(Duration::ZERO)
            .with_hold_settle(Duration::ZERO)
            .with_dtmf_settle(Duration::ZERO)
    }
}
