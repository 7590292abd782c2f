use std::fmt;

use crate::{Deduplicator, ExtractedRecord, HarvestConfig};

/// Why a harvest run stopped polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    ErrorBudgetExhausted,
    SourceExhausted,
    RecencyBoundaryCrossed,
    RoundLimitReached,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::ErrorBudgetExhausted => write!(f, "error recovery budget exhausted"),
            StopReason::SourceExhausted => write!(f, "no new records for too many rounds"),
            StopReason::RecencyBoundaryCrossed => write!(f, "stale hit ceiling reached"),
            StopReason::RoundLimitReached => write!(f, "round limit reached"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Resilience state. Stalling is a counter, not a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Normal,
    ErrorRecovery,
    ThrottleCooldown,
    Terminated(StopReason),
}

/// Mutable state of one harvest run. Owned by the harvest loop and threaded
/// through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestState {
    config: HarvestConfig,
    collected: Vec<ExtractedRecord>,
    dedup: Deduplicator,
    phase: Phase,
    rounds: u64,
    rounds_since_new_record: u32,
    consecutive_error_recoveries: u32,
    stale_hit_count: u64,
    throttle_cooldown_used: bool,
    last_checkpoint_count: usize,
    last_refresh_count: usize,
}

impl HarvestState {
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Appends `record` if the deduplicator admits it and the target is not yet met.
    pub fn admit(&mut self, record: ExtractedRecord) -> bool {
        if self.is_full() || !self.dedup.admit(&record) {
            return false;
        }
        self.collected.push(record);
        true
    }

    /// Seeds the run with records from an earlier checkpoint. Returns how many were kept.
    pub fn restore(&mut self, records: impl IntoIterator<Item = ExtractedRecord>) -> usize {
        let before = self.collected.len();
        for record in records {
            if self.is_full() {
                break;
            }
            self.admit(record);
        }
        self.last_checkpoint_count = self.collected.len();
        self.last_refresh_count = self.collected.len();
        self.collected.len() - before
    }

    pub fn is_full(&self) -> bool {
        self.collected.len() >= self.config.target
    }

    pub fn collected(&self) -> &[ExtractedRecord] {
        &self.collected
    }

    pub fn into_collected(self) -> Vec<ExtractedRecord> {
        self.collected
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.stop_reason().is_some()
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn rounds_since_new_record(&self) -> u32 {
        self.rounds_since_new_record
    }

    pub fn consecutive_error_recoveries(&self) -> u32 {
        self.consecutive_error_recoveries
    }

    pub fn stale_hit_count(&self) -> u64 {
        self.stale_hit_count
    }

    pub fn throttle_cooldown_used(&self) -> bool {
        self.throttle_cooldown_used
    }

    pub fn last_checkpoint_count(&self) -> usize {
        self.last_checkpoint_count
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn begin_round(&mut self) {
        self.rounds += 1;
    }

    pub(crate) fn record_error_recovery(&mut self) -> u32 {
        let attempt = self.consecutive_error_recoveries;
        self.consecutive_error_recoveries += 1;
        attempt
    }

    pub(crate) fn record_healthy_round(&mut self, admitted: usize, stale: usize) {
        self.consecutive_error_recoveries = 0;
        self.stale_hit_count += stale as u64;
        if admitted > 0 {
            self.rounds_since_new_record = 0;
        } else {
            self.rounds_since_new_record += 1;
        }
    }

    pub(crate) fn mark_throttle_cooldown_used(&mut self) {
        self.throttle_cooldown_used = true;
    }

    /// True (and the marker advanced) when enough admissions accumulated since the last save.
    pub(crate) fn take_checkpoint_due(&mut self) -> bool {
        let len = self.collected.len();
        if len - self.last_checkpoint_count >= self.config.checkpoint_every {
            self.last_checkpoint_count = len;
            return true;
        }
        false
    }

    pub(crate) fn take_refresh_due(&mut self) -> bool {
        let Some(every) = self.config.refresh_every else {
            return false;
        };
        let len = self.collected.len();
        if len - self.last_refresh_count >= every {
            self.last_refresh_count = len;
            return true;
        }
        false
    }
}
