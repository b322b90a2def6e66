//! Race lifecycle
//!
//! Per-racer transitions (Ready -> Racing -> Finished | Wrecked), the round
//! timer, race-over detection and round reset. Race-over is checked after
//! every state-affecting event and closes the race exactly once.

use crate::game::input::Throttle;
use crate::game::race_result::{determine_result, RaceResult};
use crate::game::state::{RaceState, RacerId, RacerState};

/// Things consumers may want to react to (HUD, audio, camera)
#[derive(Debug, Clone, PartialEq)]
pub enum RaceEvent {
    RoundStarted { round: u32 },
    /// Player's first throttle: timer runs, rivals released
    RaceStarted,
    WallImpact {
        racer: RacerId,
        speed: f32,
        damage: u32,
        health: u32,
    },
    WaypointReached { racer: RacerId, index: usize },
    RacerWrecked { racer: RacerId },
    RacerFinished { racer: RacerId, time_ms: f64 },
    NewBestTime { time_ms: f64 },
    RaceOver(RaceResult),
}

/// Start the race on the player's first non-neutral throttle.
/// Rivals start together with the player. Returns true on the transition.
pub fn observe_player_throttle(state: &mut RaceState, throttle: Throttle) -> bool {
    if throttle == Throttle::None || state.player.state != RacerState::Ready || state.session.is_race_over {
        return false;
    }

    state.player.state = RacerState::Racing;
    state.session.has_started = true;
    state.session.timer_running = true;
    for npc in state.rivals.iter_mut().filter(|npc| npc.state == RacerState::Ready) {
        npc.state = RacerState::Racing;
    }

    tracing::info!(round = state.session.round, rivals = state.rivals.len(), "Race started");
    true
}

pub fn advance_timer(state: &mut RaceState, delta_ms: f64) {
    if state.session.timer_running {
        state.session.elapsed_ms += delta_ms.max(0.0);
    }
}

/// Move a non-terminal racer to Wrecked and pin it. Returns true on the transition.
pub fn wreck(state: &mut RaceState, racer: RacerId) -> bool {
    let slot = match racer {
        RacerId::Player => &mut state.player.state,
        RacerId::Rival(i) => match state.rivals.get_mut(i) {
            Some(npc) => &mut npc.state,
            None => return false,
        },
    };
    if slot.is_terminal() {
        return false;
    }
    *slot = RacerState::Wrecked;

    if let Some(vehicle) = state.vehicle_mut(racer) {
        vehicle.pin();
    }
    tracing::debug!(?racer, "Racer wrecked");
    true
}

/// Goal overlap: a Racing racer finishes at the current elapsed time.
/// Later overlaps are no-ops. Returns the finish time on the transition.
pub fn finish(state: &mut RaceState, racer: RacerId) -> Option<f64> {
    let time_ms = state.session.elapsed_ms;
    let slot = match racer {
        RacerId::Player => &mut state.player.state,
        RacerId::Rival(i) => &mut state.rivals.get_mut(i)?.state,
    };
    if !slot.is_racing() {
        return None;
    }
    *slot = RacerState::Finished { time_ms };

    if let Some(vehicle) = state.vehicle_mut(racer) {
        vehicle.pin();
    }
    tracing::debug!(?racer, time_ms, "Racer finished");
    Some(time_ms)
}

/// Close the race when the player and every rival are terminal.
/// Only the first call that sees the condition returns the result.
pub fn check_race_over(state: &mut RaceState) -> Option<RaceResult> {
    if state.session.is_race_over {
        return None;
    }
    if !state.player.state.is_terminal() || !state.all_rivals_terminal() {
        return None;
    }

    state.session.is_race_over = true;
    state.session.timer_running = false;
    let result = determine_result(state);
    state.session.results = Some(result.clone());

    tracing::info!(
        round = state.session.round,
        elapsed_ms = state.session.elapsed_ms,
        player_rank = result.player_rank,
        "Race over"
    );
    Some(result)
}

/// Reset every racer to its grid slot and start a fresh round.
/// The best time survives; rival jitter is kept.
pub fn start_new_round(state: &mut RaceState) -> u32 {
    state.session.reset_round();

    state.player.vehicle.reset_to_spawn();
    state.player.state = RacerState::Ready;
    for npc in state.rivals.iter_mut() {
        npc.reset();
    }

    tracing::info!(round = state.session.round, best_time_ms = ?state.session.best_time_ms, "Round started");
    state.session.round
}
