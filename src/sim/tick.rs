//! Per-frame simulation step
//!
//! Advances every fork, settles collections and re-evaluates the end of the match.

use super::fork::{Fork, ForkState, ForkStep};
use super::state::{MatchEvent, MatchOutcome, MatchState};
use super::target::TargetRegistry;
use crate::config::EndPolicy;

/// Advance the match to wall-clock time `now` (seconds)
pub fn tick(state: &mut MatchState, now: f64) {
    state.frame += 1;

    for i in 0..state.forks.len() {
        let held_weight = state.forks[i]
            .held()
            .and_then(|t| state.registry.kind_of(t))
            .map(|k| k.weight);

        let step = state.forks[i].update(now, &state.field, held_weight);
        let player = state.forks[i].id;

        match step {
            ForkStep::Moved => {}
            ForkStep::LeftField => {
                state.events.push(MatchEvent::LeftField { player });
            }
            ForkStep::Returned => {
                let fork = &mut state.forks[i];
                if let Some((target, value)) = state.registry.collect(fork) {
                    fork.score += value;
                    log::info!(
                        "{} collects {:?} for {:+}, score {}",
                        fork.name,
                        target,
                        value,
                        fork.score
                    );
                    state.events.push(MatchEvent::Collected {
                        player,
                        target,
                        value,
                    });
                }
                state.events.push(MatchEvent::Returned { player });
            }
        }

        // Held target rides on the tip
        let fork = &state.forks[i];
        if fork.state == ForkState::Retracting {
            if let Some(target) = fork.held() {
                state.registry.set_position(target, fork.tip(state.tip_length));
            }
        }
    }

    debug_assert!(state.registry.ownership_consistent(&state.forks));

    let ended = state.outcome.is_some() || end_reached(state.end_policy, &state.registry, &state.forks);
    if ended {
        let outcome = decide_outcome(&state.forks);
        if state.outcome.is_none() {
            log::info!("Match over: {}", outcome.message(&state.forks));
            state.events.push(MatchEvent::Ended(outcome));
        }
        state.outcome = Some(outcome);
    }
}

/// Whether the end condition holds for the given policy
pub fn end_reached(policy: EndPolicy, registry: &TargetRegistry, forks: &[Fork]) -> bool {
    if registry.scoring_remaining() == 0 {
        return true;
    }
    match policy {
        EndPolicy::Exhaustion => false,
        EndPolicy::Mercy => score_gap(forks) > registry.remaining_potential(),
    }
}

/// Absolute score difference between the two players
fn score_gap(forks: &[Fork]) -> i64 {
    match forks {
        [a, b, ..] => (i64::from(a.score) - i64::from(b.score)).abs(),
        _ => 0,
    }
}

/// Strictly higher score wins, equal scores draw
pub fn decide_outcome(forks: &[Fork]) -> MatchOutcome {
    match forks {
        [a, b, ..] if a.score > b.score => MatchOutcome::Winner(a.id),
        [a, b, ..] if b.score > a.score => MatchOutcome::Winner(b.id),
        _ => MatchOutcome::Draw,
    }
}
