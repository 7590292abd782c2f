/// Outcome counts of scanning one batch tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundTally {
    pub scanned: usize,
    pub admitted: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub rejected: usize,
    pub filtered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// The source reported a failure surface instead of content.
    SourceUnhealthy,
    /// A healthy batch was scanned.
    RoundCompleted(RoundTally),
    /// External interrupt observed between rounds or during a wait.
    CancelRequested,
}
