use std::time::Duration;

use crate::StopReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Cooldown {
        duration: Duration,
        reason: CooldownReason,
    },
    Refresh {
        reason: RefreshReason,
    },
    Checkpoint,
    /// Reveal more items, then wait the pacing delay for `new_records`.
    Advance {
        new_records: usize,
    },
    Terminate(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownReason {
    ErrorRecovery { attempt: u32 },
    Throttle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    ErrorRecovery,
    Throttle,
    Maintenance,
}
