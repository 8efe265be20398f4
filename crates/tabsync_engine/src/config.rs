//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default delay between polls of one direction.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// One of the two replication directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Store A is the source, store B the target.
    AToB,
    /// Store B is the source, store A the target.
    BToA,
}

impl Direction {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::AToB => "a->b",
            Direction::BToA => "b->a",
        }
    }

    /// Returns the opposite direction.
    pub fn reverse(&self) -> Self {
        match self {
            Direction::AToB => Direction::BToA,
            Direction::BToA => Direction::AToB,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a pass writes its changes to the target store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyMode {
    /// Upsert changed rows by key, then delete removed keys.
    #[default]
    Incremental,
    /// Replace every record below the header in one call.
    BulkReplace,
}

/// Which keys form the addressable record set of a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyPolicy {
    /// Any non-empty key.
    #[default]
    NonEmpty,
    /// Keys made only of ASCII digits.
    Numeric,
}

impl KeyPolicy {
    /// Returns true if `key` is addressable under this policy.
    pub fn admits(&self, key: &str) -> bool {
        match self {
            KeyPolicy::NonEmpty => !key.is_empty(),
            KeyPolicy::Numeric => !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}

/// Per-direction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionConfig {
    /// Delay between polls.
    pub poll_interval: Duration,
    /// How changes are written to the target.
    pub apply_mode: ApplyMode,
    /// Which source keys are replicated.
    pub key_policy: KeyPolicy,
}

impl DirectionConfig {
    /// Creates a direction config with the given poll interval.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            apply_mode: ApplyMode::default(),
            key_policy: KeyPolicy::default(),
        }
    }

    /// Sets the apply mode.
    pub fn with_apply_mode(mut self, mode: ApplyMode) -> Self {
        self.apply_mode = mode;
        self
    }

    /// Sets the key policy.
    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// Configuration for the sync coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Settings for store A → store B.
    pub a_to_b: DirectionConfig,
    /// Settings for store B → store A.
    pub b_to_a: DirectionConfig,
    /// Whether gate acquisition skips instead of waiting. Must be true.
    pub gate_acquire_non_blocking: bool,
}

impl SyncConfig {
    /// Creates a configuration with the given poll intervals.
    pub fn new(poll_interval_a_to_b: Duration, poll_interval_b_to_a: Duration) -> Self {
        Self {
            a_to_b: DirectionConfig::new(poll_interval_a_to_b),
            b_to_a: DirectionConfig::new(poll_interval_b_to_a),
            gate_acquire_non_blocking: true,
        }
    }

    /// Replaces the A → B settings.
    pub fn with_a_to_b(mut self, config: DirectionConfig) -> Self {
        self.a_to_b = config;
        self
    }

    /// Replaces the B → A settings.
    pub fn with_b_to_a(mut self, config: DirectionConfig) -> Self {
        self.b_to_a = config;
        self
    }

    /// Sets whether gate acquisition is non-blocking.
    pub fn with_gate_acquire_non_blocking(mut self, non_blocking: bool) -> Self {
        self.gate_acquire_non_blocking = non_blocking;
        self
    }

    /// Returns the settings for one direction.
    pub fn direction(&self, direction: Direction) -> &DirectionConfig {
        match direction {
            Direction::AToB => &self.a_to_b,
            Direction::BToA => &self.b_to_a,
        }
    }

    /// Checks that the configuration can drive a coordinator.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.gate_acquire_non_blocking {
            return Err(SyncError::Config(
                "gate acquisition must be non-blocking".into(),
            ));
        }
        for direction in [Direction::AToB, Direction::BToA] {
            if self.direction(direction).poll_interval.is_zero() {
                return Err(SyncError::Config(format!(
                    "poll interval for {direction} must be non-zero"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.a_to_b.poll_interval, Duration::from_secs(3));
        assert_eq!(config.b_to_a.poll_interval, Duration::from_secs(3));
        assert!(config.gate_acquire_non_blocking);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = SyncConfig::new(Duration::from_secs(5), Duration::from_secs(30)).with_b_to_a(
            DirectionConfig::new(Duration::from_secs(10))
                .with_apply_mode(ApplyMode::BulkReplace)
                .with_key_policy(KeyPolicy::Numeric),
        );

        assert_eq!(config.direction(Direction::AToB).poll_interval, Duration::from_secs(5));
        let b_to_a = config.direction(Direction::BToA);
        assert_eq!(b_to_a.poll_interval, Duration::from_secs(10));
        assert_eq!(b_to_a.apply_mode, ApplyMode::BulkReplace);
        assert_eq!(b_to_a.key_policy, KeyPolicy::Numeric);
    }

    #[test]
    fn validate_rejects_blocking_gate() {
        let config = SyncConfig::default().with_gate_acquire_non_blocking(false);
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = SyncConfig::new(Duration::ZERO, Duration::from_secs(1));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("a->b"));
    }

    #[test]
    fn key_policies() {
        assert!(KeyPolicy::NonEmpty.admits("abc"));
        assert!(!KeyPolicy::NonEmpty.admits(""));
        assert!(KeyPolicy::Numeric.admits("0042"));
        assert!(!KeyPolicy::Numeric.admits("42a"));
        assert!(!KeyPolicy::Numeric.admits(""));
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::AToB.to_string(), "a->b");
        assert_eq!(Direction::BToA.reverse(), Direction::AToB);
    }
}
