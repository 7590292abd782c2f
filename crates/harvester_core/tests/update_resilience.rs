use std::sync::Once;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use harvester_core::{
    update, CooldownReason, Effect, Engagement, ExtractedRecord, HarvestConfig, HarvestState,
    Msg, Phase, RecoveryPolicy, RefreshReason, RoundTally, StopReason, ThrottlePolicy,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

fn record(n: usize) -> ExtractedRecord {
    let base = DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    ExtractedRecord {
        id: format!("id-{n}"),
        timestamp: base + TimeDelta::seconds(n as i64),
        text: format!("record {n}"),
        engagement: Engagement::default(),
        tags: Vec::new(),
        mentions: Vec::new(),
        source_url: format!("https://example.com/status/{n}"),
    }
}

fn completed(admitted: usize) -> Msg {
    Msg::RoundCompleted(RoundTally {
        scanned: admitted,
        admitted,
        ..RoundTally::default()
    })
}

fn stale_round(stale: usize) -> Msg {
    Msg::RoundCompleted(RoundTally {
        scanned: stale,
        stale,
        ..RoundTally::default()
    })
}

#[test]
fn unhealthy_rounds_escalate_then_terminate() {
    init_logging();
    let config = HarvestConfig {
        recovery: RecoveryPolicy {
            base: Duration::from_secs(6),
            cap: Duration::from_secs(60),
            max_attempts: 3,
        },
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);
    assert!(state.admit(record(1)));

    let (next, effects) = update(state, Msg::SourceUnhealthy);
    assert_eq!(next.phase(), Phase::ErrorRecovery);
    assert_eq!(
        effects,
        vec![
            Effect::Cooldown {
                duration: Duration::from_secs(6),
                reason: CooldownReason::ErrorRecovery { attempt: 0 },
            },
            Effect::Refresh {
                reason: RefreshReason::ErrorRecovery
            },
        ]
    );

    let (next, effects) = update(next, Msg::SourceUnhealthy);
    assert_eq!(next.phase(), Phase::ErrorRecovery);
    assert_eq!(
        effects[0],
        Effect::Cooldown {
            duration: Duration::from_secs(12),
            reason: CooldownReason::ErrorRecovery { attempt: 1 },
        }
    );

    // The exhausting attempt still cools down and refreshes before terminating.
    let (next, effects) = update(next, Msg::SourceUnhealthy);
    assert_eq!(
        effects,
        vec![
            Effect::Cooldown {
                duration: Duration::from_secs(18),
                reason: CooldownReason::ErrorRecovery { attempt: 2 },
            },
            Effect::Refresh {
                reason: RefreshReason::ErrorRecovery
            },
            Effect::Terminate(StopReason::ErrorBudgetExhausted),
        ]
    );
    assert_eq!(
        next.phase(),
        Phase::Terminated(StopReason::ErrorBudgetExhausted)
    );
    assert_eq!(next.collected().len(), 1);
}

#[test]
fn healthy_round_resets_error_escalation() {
    init_logging();
    let state = HarvestState::new(HarvestConfig::default());

    let (state, _) = update(state, Msg::SourceUnhealthy);
    let (state, _) = update(state, Msg::SourceUnhealthy);
    assert_eq!(state.consecutive_error_recoveries(), 2);

    let (state, _) = update(state, completed(0));
    assert_eq!(state.consecutive_error_recoveries(), 0);
    assert_eq!(state.phase(), Phase::Normal);

    let (_, effects) = update(state, Msg::SourceUnhealthy);
    assert_eq!(
        effects[0],
        Effect::Cooldown {
            duration: Duration::from_secs(6),
            reason: CooldownReason::ErrorRecovery { attempt: 0 },
        }
    );
}

#[test]
fn consecutive_cooldowns_never_decrease() {
    init_logging();
    let config = HarvestConfig {
        recovery: RecoveryPolicy {
            base: Duration::from_secs(7),
            cap: Duration::from_secs(30),
            max_attempts: 50,
        },
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);
    let mut previous = Duration::ZERO;
    for _ in 0..20 {
        let (next, effects) = update(state, Msg::SourceUnhealthy);
        state = next;
        let Some(Effect::Cooldown { duration, .. }) = effects.first().copied() else {
            panic!("expected a cooldown, got {effects:?}");
        };
        assert!(duration >= previous);
        assert!(duration <= Duration::from_secs(30));
        previous = duration;
    }
    assert_eq!(previous, Duration::from_secs(30));
}

#[test]
fn stall_trigger_fires_one_throttle_cooldown() {
    init_logging();
    let mut state = HarvestState::new(HarvestConfig::default());
    for _ in 0..9 {
        let (next, effects) = update(state, completed(0));
        state = next;
        assert_eq!(effects, vec![Effect::Advance { new_records: 0 }]);
    }

    let (state, effects) = update(state, completed(0));
    assert_eq!(state.rounds_since_new_record(), 10);
    assert!(state.throttle_cooldown_used());
    assert_eq!(state.phase(), Phase::ThrottleCooldown);
    assert_eq!(
        effects,
        vec![
            Effect::Cooldown {
                duration: Duration::from_secs(30),
                reason: CooldownReason::Throttle,
            },
            Effect::Refresh {
                reason: RefreshReason::Throttle
            },
        ]
    );

    let (state, effects) = update(state, completed(0));
    assert_eq!(state.phase(), Phase::Normal);
    assert_eq!(effects, vec![Effect::Advance { new_records: 0 }]);
}

#[test]
fn stall_hard_cap_terminates() {
    init_logging();
    let config = HarvestConfig {
        throttle: ThrottlePolicy {
            trigger_rounds: 2,
            hard_cap_rounds: 4,
            cooldown: Duration::from_secs(1),
        },
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);
    let mut last = Vec::new();
    for _ in 0..4 {
        let (next, effects) = update(state, completed(0));
        state = next;
        last = effects;
    }
    assert_eq!(last, vec![Effect::Terminate(StopReason::SourceExhausted)]);
}

#[test]
fn admission_resets_stall_counter() {
    init_logging();
    let mut state = HarvestState::new(HarvestConfig::default());
    for _ in 0..5 {
        state = update(state, completed(0)).0;
    }
    assert_eq!(state.rounds_since_new_record(), 5);

    assert!(state.admit(record(1)));
    let (state, _) = update(state, completed(1));
    assert_eq!(state.rounds_since_new_record(), 0);
}

#[test]
fn stale_ceiling_terminates() {
    init_logging();
    let config = HarvestConfig {
        stale_hit_ceiling: 100,
        ..HarvestConfig::default()
    };
    let state = HarvestState::new(config);
    let (state, effects) = update(state, stale_round(60));
    assert_eq!(effects, vec![Effect::Advance { new_records: 0 }]);
    assert_eq!(state.stale_hit_count(), 60);

    let (state, effects) = update(state, stale_round(40));
    assert_eq!(
        effects,
        vec![Effect::Terminate(StopReason::RecencyBoundaryCrossed)]
    );
    assert_eq!(state.stop_reason(), Some(StopReason::RecencyBoundaryCrossed));
}

#[test]
fn checkpoint_is_due_every_n_admissions() {
    init_logging();
    let config = HarvestConfig {
        checkpoint_every: 3,
        refresh_every: None,
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);

    assert!(state.admit(record(1)));
    assert!(state.admit(record(2)));
    let (mut state, effects) = update(state, completed(2));
    assert_eq!(effects, vec![Effect::Advance { new_records: 2 }]);

    assert!(state.admit(record(3)));
    let (state, effects) = update(state, completed(1));
    assert_eq!(
        effects,
        vec![Effect::Checkpoint, Effect::Advance { new_records: 1 }]
    );
    assert_eq!(state.last_checkpoint_count(), 3);
}

#[test]
fn maintenance_refresh_after_n_admissions() {
    init_logging();
    let config = HarvestConfig {
        checkpoint_every: 100,
        refresh_every: Some(2),
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);
    assert!(state.admit(record(1)));
    assert!(state.admit(record(2)));

    let (_, effects) = update(state, completed(2));
    assert_eq!(
        effects,
        vec![
            Effect::Refresh {
                reason: RefreshReason::Maintenance
            },
            Effect::Advance { new_records: 2 },
        ]
    );
}

#[test]
fn target_terminates_without_periodic_checkpoint() {
    init_logging();
    let config = HarvestConfig {
        target: 2,
        checkpoint_every: 1,
        ..HarvestConfig::default()
    };
    let mut state = HarvestState::new(config);
    assert!(state.admit(record(1)));
    assert!(state.admit(record(2)));
    assert!(!state.admit(record(3)));

    let (state, effects) = update(state, completed(2));
    assert_eq!(effects, vec![Effect::Terminate(StopReason::TargetReached)]);
    assert_eq!(state.collected().len(), 2);
}

#[test]
fn round_limit_terminates() {
    init_logging();
    let config = HarvestConfig {
        max_rounds: 2,
        ..HarvestConfig::default()
    };
    let state = HarvestState::new(config);
    let (state, _) = update(state, completed(0));
    let (_, effects) = update(state, Msg::SourceUnhealthy);
    assert_eq!(effects, vec![Effect::Terminate(StopReason::RoundLimitReached)]);
}

#[test]
fn cancel_terminates_and_is_absorbing() {
    init_logging();
    let state = HarvestState::new(HarvestConfig::default());
    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(effects, vec![Effect::Terminate(StopReason::Cancelled)]);

    let before = state.clone();
    let (after, effects) = update(state, Msg::SourceUnhealthy);
    assert!(effects.is_empty());
    assert_eq!(after, before);
}
