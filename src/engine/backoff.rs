use std::time::Duration;

/// Two-level retry policy for consecutive clipboard read failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before retrying after an isolated failure
    pub retry_delay: Duration,
    /// Pause once `max_consecutive_errors` failures pile up
    pub cooldown: Duration,
    /// Consecutive failures that trigger the cooldown
    pub max_consecutive_errors: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            retry_delay: Duration::from_secs(5),
            cooldown: Duration::from_secs(60),
            max_consecutive_errors: 5,
        }
    }
}

/// What the monitor should do after a failed read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStep {
    /// Short fixed delay, then poll again
    Retry(Duration),
    /// Long pause; the failure count has been reset
    Cooldown(Duration),
}

/// Consecutive-failure counter driving `BackoffPolicy`
#[derive(Debug, Clone)]
pub struct ErrorBackoff {
    policy: BackoffPolicy,
    consecutive: u32,
}

impl ErrorBackoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        ErrorBackoff {
            policy,
            consecutive: 0,
        }
    }

    /// A read succeeded, whatever it returned
    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// A read failed; decide how long to wait
    pub fn record_failure(&mut self) -> BackoffStep {
        self.consecutive += 1;

        if self.consecutive >= self.policy.max_consecutive_errors {
            self.consecutive = 0;
            BackoffStep::Cooldown(self.policy.cooldown)
        } else {
            BackoffStep::Retry(self.policy.retry_delay)
        }
    }

    /// Failures since the last success or cooldown
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive
    }
}
