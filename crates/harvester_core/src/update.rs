use crate::{
    CooldownReason, Effect, HarvestState, Msg, Phase, RefreshReason, RoundTally, StopReason,
};

/// Pure resilience transition: applies a message to state and returns the
/// effects the harvest loop must execute, in order.
///
/// `Terminated` is absorbing; once reached every message is ignored.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    if state.is_terminated() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::CancelRequested => terminate(&mut state, StopReason::Cancelled),
        Msg::SourceUnhealthy => on_unhealthy(&mut state),
        Msg::RoundCompleted(tally) => on_round(&mut state, tally),
    };

    (state, effects)
}

fn terminate(state: &mut HarvestState, reason: StopReason) -> Vec<Effect> {
    state.set_phase(Phase::Terminated(reason));
    vec![Effect::Terminate(reason)]
}

/// Every recovery attempt cools down and refreshes, including the one that
/// exhausts the budget; its `Terminate` follows the refresh.
fn on_unhealthy(state: &mut HarvestState) -> Vec<Effect> {
    state.begin_round();
    state.set_phase(Phase::ErrorRecovery);
    let policy = state.config().recovery;
    let attempt = state.record_error_recovery();

    if state.rounds() >= state.config().max_rounds
        && state.consecutive_error_recoveries() < policy.max_attempts
    {
        return terminate(state, StopReason::RoundLimitReached);
    }

    let mut effects = vec![
        Effect::Cooldown {
            duration: policy.cooldown_for(attempt),
            reason: CooldownReason::ErrorRecovery { attempt },
        },
        Effect::Refresh {
            reason: RefreshReason::ErrorRecovery,
        },
    ];
    if state.consecutive_error_recoveries() >= policy.max_attempts {
        effects.extend(terminate(state, StopReason::ErrorBudgetExhausted));
    }
    effects
}

fn on_round(state: &mut HarvestState, tally: RoundTally) -> Vec<Effect> {
    state.begin_round();
    state.set_phase(Phase::Normal);
    state.record_healthy_round(tally.admitted, tally.stale);

    let config = state.config().clone();
    let stop = if state.is_full() {
        Some(StopReason::TargetReached)
    } else if state.stale_hit_count() >= config.stale_hit_ceiling {
        Some(StopReason::RecencyBoundaryCrossed)
    } else if state.rounds_since_new_record() >= config.throttle.hard_cap_rounds {
        Some(StopReason::SourceExhausted)
    } else if state.rounds() >= config.max_rounds {
        Some(StopReason::RoundLimitReached)
    } else {
        None
    };
    // No periodic checkpoint on the way out; the loop always writes the final one.
    if let Some(reason) = stop {
        return terminate(state, reason);
    }

    let mut effects = Vec::new();
    if state.take_checkpoint_due() {
        effects.push(Effect::Checkpoint);
    }

    if state.rounds_since_new_record() >= config.throttle.trigger_rounds
        && !state.throttle_cooldown_used()
    {
        state.mark_throttle_cooldown_used();
        state.set_phase(Phase::ThrottleCooldown);
        effects.push(Effect::Cooldown {
            duration: config.throttle.cooldown,
            reason: CooldownReason::Throttle,
        });
        effects.push(Effect::Refresh {
            reason: RefreshReason::Throttle,
        });
        return effects;
    }

    if state.take_refresh_due() {
        effects.push(Effect::Refresh {
            reason: RefreshReason::Maintenance,
        });
    }
    effects.push(Effect::Advance {
        new_records: tally.admitted,
    });
    effects
}
