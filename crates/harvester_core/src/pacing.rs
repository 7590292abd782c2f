use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Rounds admitting at least this many records use the busy tier.
pub const BUSY_THRESHOLD: usize = 10;
/// Rounds admitting at least this many records (and fewer than busy) use the steady tier.
pub const STEADY_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min && delay <= self.max
    }
}

/// Delay ranges, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingTiers {
    pub busy: DelayRange,
    pub steady: DelayRange,
    pub idle: DelayRange,
}

impl Default for PacingTiers {
    fn default() -> Self {
        Self {
            busy: DelayRange::from_millis(500, 1_000),
            steady: DelayRange::from_millis(1_000, 2_000),
            idle: DelayRange::from_millis(2_000, 3_000),
        }
    }
}

impl PacingTiers {
    pub fn tier_for(&self, new_records: usize) -> DelayRange {
        if new_records >= BUSY_THRESHOLD {
            self.busy
        } else if new_records >= STEADY_THRESHOLD {
            self.steady
        } else {
            self.idle
        }
    }
}

/// Throughput-proportional poll delay with uniform jitter inside each tier.
#[derive(Debug, Clone)]
pub struct PacingController {
    tiers: PacingTiers,
    rng: StdRng,
}

impl PacingController {
    pub fn new(tiers: PacingTiers) -> Self {
        Self {
            tiers,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(tiers: PacingTiers, seed: u64) -> Self {
        Self {
            tiers,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_delay(&mut self, new_records: usize) -> Duration {
        let range = self.tiers.tier_for(new_records);
        let min = range.min.as_millis() as u64;
        let max = range.max.as_millis() as u64;
        if max <= min {
            return range.min;
        }
        Duration::from_millis(self.rng.gen_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_inside_their_tier() {
        let tiers = PacingTiers::default();
        let mut pacing = PacingController::with_seed(tiers, 7);
        for _ in 0..200 {
            assert!(tiers.busy.contains(pacing.next_delay(12)));
            assert!(tiers.steady.contains(pacing.next_delay(5)));
            assert!(tiers.idle.contains(pacing.next_delay(0)));
        }
    }

    #[test]
    fn tier_boundaries() {
        let tiers = PacingTiers::default();
        assert_eq!(tiers.tier_for(10), tiers.busy);
        assert_eq!(tiers.tier_for(9), tiers.steady);
        assert_eq!(tiers.tier_for(3), tiers.steady);
        assert_eq!(tiers.tier_for(2), tiers.idle);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PacingController::with_seed(PacingTiers::default(), 42);
        let mut b = PacingController::with_seed(PacingTiers::default(), 42);
        let left: Vec<_> = (0..16).map(|n| a.next_delay(n)).collect();
        let right: Vec<_> = (0..16).map(|n| b.next_delay(n)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn degenerate_range_returns_min() {
        let fixed = DelayRange::from_millis(250, 250);
        let tiers = PacingTiers {
            busy: fixed,
            steady: fixed,
            idle: fixed,
        };
        let mut pacing = PacingController::with_seed(tiers, 1);
        assert_eq!(pacing.next_delay(0), Duration::from_millis(250));
    }
}
