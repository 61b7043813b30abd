//! Polling policy.

use std::time::Duration;

use docforge_client::ClientError;
use docforge_client::config::read_number;
use docforge_core::{DomainError, DomainResult};

pub const POLL_INTERVAL_VAR: &str = "DOCFORGE_POLL_INTERVAL_MS";
pub const POLL_MAX_ATTEMPTS_VAR: &str = "DOCFORGE_POLL_MAX_ATTEMPTS";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Fixed-interval polling with an attempt ceiling. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> DomainResult<Self> {
        if interval.is_zero() {
            return Err(DomainError::validation("poll interval must be greater than zero"));
        }
        if max_attempts == 0 {
            return Err(DomainError::validation("poll max_attempts must be at least 1"));
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }

    /// Delay between the end of one status check and the start of the next.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Longest time a job is watched before giving up, saturating at
    /// `Duration::MAX`.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_ms = read_number(&lookup, POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL.as_millis() as u64)?;
        let max_attempts = read_number(&lookup, POLL_MAX_ATTEMPTS_VAR, DEFAULT_MAX_ATTEMPTS)?;

        Self::new(Duration::from_millis(interval_ms), max_attempts).map_err(|e| {
            ClientError::Config(format!("{POLL_INTERVAL_VAR}/{POLL_MAX_ATTEMPTS_VAR}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<PollPolicy, ClientError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PollPolicy::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_two_seconds_and_sixty_attempts() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval(), Duration::from_millis(2000));
        assert_eq!(policy.max_attempts(), 60);
        assert_eq!(policy.budget(), Duration::from_secs(120));
        assert_eq!(load(&[]).unwrap(), policy);
    }

    #[test]
    fn env_overrides() {
        let policy = load(&[(POLL_INTERVAL_VAR, "250"), (POLL_MAX_ATTEMPTS_VAR, "4")]).unwrap();
        assert_eq!(policy.interval(), Duration::from_millis(250));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(PollPolicy::new(Duration::ZERO, 60).is_err());
        assert!(matches!(
            load(&[(POLL_INTERVAL_VAR, "0")]),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn budget_saturates_instead_of_overflowing() {
        let policy = PollPolicy::new(Duration::from_millis(u64::MAX), u32::MAX).unwrap();
        assert_eq!(policy.budget(), Duration::MAX);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(PollPolicy::new(Duration::from_secs(1), 0).is_err());
        assert!(matches!(
            load(&[(POLL_MAX_ATTEMPTS_VAR, "0")]),
            Err(ClientError::Config(_))
        ));
    }
}
