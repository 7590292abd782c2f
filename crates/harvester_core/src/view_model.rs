use crate::{HarvestState, Phase};

/// Read-only summary of a run, for progress logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestView {
    pub phase: Phase,
    pub rounds: u64,
    pub collected: usize,
    pub target: usize,
    pub stale_hits: u64,
    pub rounds_since_new_record: u32,
    pub consecutive_error_recoveries: u32,
    pub throttle_cooldown_used: bool,
}

impl HarvestState {
    pub fn view(&self) -> HarvestView {
        HarvestView {
            phase: self.phase(),
            rounds: self.rounds(),
            collected: self.collected().len(),
            target: self.config().target,
            stale_hits: self.stale_hit_count(),
            rounds_since_new_record: self.rounds_since_new_record(),
            consecutive_error_recoveries: self.consecutive_error_recoveries(),
            throttle_cooldown_used: self.throttle_cooldown_used(),
        }
    }
}
