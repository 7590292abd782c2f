use std::time::Duration;

use thiserror::Error;

use crate::{DelayRange, PacingTiers, RecencyWindow};

/// Escalating cooldown applied while the source shows a failure surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    pub base: Duration,
    pub cap: Duration,
    /// Consecutive recoveries allowed before the run terminates.
    pub max_attempts: u32,
}

impl RecoveryPolicy {
    /// `min(cap, base * (attempt + 1))` where `attempt` counts prior consecutive recoveries.
    pub fn cooldown_for(&self, attempt: u32) -> Duration {
        self.base
            .checked_mul(attempt.saturating_add(1))
            .map_or(self.cap, |d| d.min(self.cap))
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(6),
            cap: Duration::from_secs(60),
            max_attempts: 6,
        }
    }
}

/// Stall handling: one long cooldown at `trigger_rounds`, give up at `hard_cap_rounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub trigger_rounds: u32,
    pub hard_cap_rounds: u32,
    pub cooldown: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            trigger_rounds: 10,
            hard_cap_rounds: 20,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub target: usize,
    pub window: RecencyWindow,
    pub tail_window_size: usize,
    pub checkpoint_every: usize,
    pub max_rounds: u64,
    /// Refresh the source after this many new admissions; `None` disables.
    pub refresh_every: Option<usize>,
    pub stale_hit_ceiling: u64,
    pub recovery: RecoveryPolicy,
    pub throttle: ThrottlePolicy,
    pub pacing: PacingTiers,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target: 2_000,
            window: RecencyWindow::default(),
            tail_window_size: 80,
            checkpoint_every: 50,
            max_rounds: 8_000,
            refresh_every: Some(150),
            stale_hit_ceiling: 350,
            recovery: RecoveryPolicy::default(),
            throttle: ThrottlePolicy::default(),
            pacing: PacingTiers::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("stall hard cap ({hard_cap}) must exceed the throttle trigger ({trigger})")]
    StallThresholds { trigger: u32, hard_cap: u32 },
    #[error("error cooldown cap is below its base")]
    CooldownCap,
    #[error("pacing tier `{0}` has min above max")]
    PacingRange(&'static str),
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("target", self.target as u64),
            ("tail_window_size", self.tail_window_size as u64),
            ("checkpoint_every", self.checkpoint_every as u64),
            ("max_rounds", self.max_rounds),
            ("error_recovery_cap", u64::from(self.recovery.max_attempts)),
            ("stall_trigger_rounds", u64::from(self.throttle.trigger_rounds)),
            ("stale_hit_ceiling", self.stale_hit_ceiling),
        ];
        if let Some(&(name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero(name));
        }
        if self.refresh_every == Some(0) {
            return Err(ConfigError::Zero("refresh_every"));
        }
        if self.throttle.hard_cap_rounds <= self.throttle.trigger_rounds {
            return Err(ConfigError::StallThresholds {
                trigger: self.throttle.trigger_rounds,
                hard_cap: self.throttle.hard_cap_rounds,
            });
        }
        if self.recovery.cap < self.recovery.base {
            return Err(ConfigError::CooldownCap);
        }
        let tiers: [(&'static str, DelayRange); 3] = [
            ("busy", self.pacing.busy),
            ("steady", self.pacing.steady),
            ("idle", self.pacing.idle),
        ];
        if let Some(&(name, _)) = tiers.iter().find(|(_, range)| range.min > range.max) {
            return Err(ConfigError::PacingRange(name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(HarvestConfig::default().validate(), Ok(()));
    }

    #[test]
    fn hard_cap_must_exceed_trigger() {
        let mut config = HarvestConfig::default();
        config.throttle.hard_cap_rounds = config.throttle.trigger_rounds;
        assert_eq!(
            config.validate(),
            Err(ConfigError::StallThresholds {
                trigger: 10,
                hard_cap: 10
            })
        );
    }

    #[test]
    fn zero_target_rejected() {
        let config = HarvestConfig {
            target: 0,
            ..HarvestConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("target")));
    }

    #[test]
    fn cooldown_escalates_then_caps() {
        let policy = RecoveryPolicy::default();
        let steps: Vec<_> = (0..12).map(|a| policy.cooldown_for(a).as_secs()).collect();
        assert_eq!(steps, vec![6, 12, 18, 24, 30, 36, 42, 48, 54, 60, 60, 60]);
    }
}
