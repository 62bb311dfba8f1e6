/// Reconnect policy: bounded attempts spaced by a fixed delay
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum number of consecutive reconnect attempts
    pub max_attempts: u32,
    /// Wait before every attempt
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
        }
    }

    /// Five attempts, three seconds apart
    pub fn fixed_default() -> Self {
        Self::fixed(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }

    /// Delay before reconnect attempt `attempt` (1-based), or `None` once the
    /// attempt number exceeds the budget.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(self.base_delay)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed_default()
    }
}

/// Attempt counter for one logical connection.
///
/// Each unexpected close asks for [`ReconnectBudget::next_delay`]; a
/// successful handshake calls [`ReconnectBudget::reset`].
#[derive(Debug, Clone)]
pub struct ReconnectBudget {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectBudget {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Reconnect attempts consumed since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Consume one attempt and return the delay to wait before it.
    ///
    /// Returns `None` without consuming anything once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            warn!(
                "Reconnect budget exhausted after {} attempts",
                self.policy.max_attempts
            );
            return None;
        }

        self.attempts += 1;
        let delay = self.policy.delay_for(self.attempts)?;
        debug!(
            "Reconnect attempt {}/{}, waiting {:?}",
            self.attempts, self.policy.max_attempts, delay
        );
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
