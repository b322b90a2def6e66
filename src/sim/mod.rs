//! Headless harness
//!
//! Wires a [`Race`] to the reference [`ArcadeWorld`] and the scripted
//! [`Autopilot`] so whole rounds can run without a renderer.

pub mod autopilot;
pub mod world;

use crate::game::game_loop::Race;
use crate::game::input::DriverInput;
use crate::game::race_result::RaceResult;
use crate::game::systems::lifecycle::RaceEvent;

use self::autopilot::Autopilot;
use self::world::ArcadeWorld;

/// How a round run by [`HeadlessSession::run_round`] ended
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: u32,
    pub ticks: u32,
    /// None when the tick cap was hit before the race closed
    pub result: Option<RaceResult>,
    pub impacts: u32,
    /// Set when the player beat the session best this round
    pub new_best_ms: Option<f64>,
}

pub struct HeadlessSession {
    race: Race,
    world: ArcadeWorld,
    autopilot: Autopilot,
    tick_ms: f32,
}

impl HeadlessSession {
    pub fn new(race: Race, tick_ms: f32) -> Self {
        let world = ArcadeWorld::new(race.track().clone());
        let autopilot = Autopilot::for_track(race.track());
        Self {
            race,
            world,
            autopilot,
            tick_ms,
        }
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    /// One frame: race tick, physics step, then contact handling
    pub fn frame(&mut self, input: &DriverInput) -> Vec<RaceEvent> {
        if input.restart_pressed {
            self.autopilot.reset();
        }

        let mut events = self.race.tick(input, self.tick_ms);
        for contact in self.world.step(&mut self.race, self.tick_ms) {
            events.extend(self.race.handle_contact(contact));
        }
        events
    }

    /// One frame with the autopilot at the wheel
    pub fn autopilot_frame(&mut self) -> Vec<RaceEvent> {
        let input = self.autopilot.drive(&self.race.state().player.vehicle);
        self.frame(&input)
    }

    /// Start the next round through the restart input
    pub fn restart(&mut self) -> Vec<RaceEvent> {
        self.frame(&DriverInput::restart())
    }

    /// Drive the current round until it closes or `max_ticks` frames pass
    pub fn run_round(&mut self, max_ticks: u32) -> RoundOutcome {
        let round = self.race.state().session.round;
        let mut impacts = 0;
        let mut new_best_ms = None;

        for tick in 1..=max_ticks {
            for event in self.autopilot_frame() {
                match event {
                    RaceEvent::WallImpact { racer, damage, health, .. } => {
                        impacts += 1;
                        tracing::debug!(?racer, damage, health, "Impact");
                    }
                    RaceEvent::RacerWrecked { racer } => tracing::info!(?racer, "Wrecked"),
                    RaceEvent::RacerFinished { racer, time_ms } => tracing::info!(?racer, time_ms, "Finished"),
                    RaceEvent::NewBestTime { time_ms } => new_best_ms = Some(time_ms),
                    RaceEvent::RaceOver(result) => {
                        return RoundOutcome {
                            round,
                            ticks: tick,
                            result: Some(result),
                            impacts,
                            new_best_ms,
                        };
                    }
                    _ => {}
                }
            }
        }

        tracing::warn!(round, max_ticks, "Round hit the tick cap before closing");
        RoundOutcome {
            round,
            ticks: max_ticks,
            result: None,
            impacts,
            new_best_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::harness::DEFAULT_TICK_MS;
    use crate::game::state::{RacerId, RacerState};
    use crate::util::vec2::Vec2;

    fn session(rivals: usize, seed: u64) -> HeadlessSession {
        HeadlessSession::new(Race::level_1(rivals, Some(seed)).unwrap(), DEFAULT_TICK_MS)
    }

    #[test]
    fn test_idle_frames_do_nothing() {
        let mut session = session(3, 1);
        for _ in 0..60 {
            assert!(session.frame(&DriverInput::default()).is_empty());
        }
        let state = session.race().state();
        assert_eq!(state.session.elapsed_ms, 0.0);
        assert_eq!(state.player.vehicle.position, state.player.vehicle.spawn_position);
    }

    #[test]
    fn test_player_moves_east_from_spawn() {
        let mut session = session(0, 1);
        for _ in 0..30 {
            session.frame(&DriverInput::forward());
        }
        let player = &session.race().state().player.vehicle;
        assert!(player.position.x > player.spawn_position.x + 20.0);
        assert!((player.position.y - player.spawn_position.y).abs() < 1e-3);
    }

    #[test]
    fn test_long_run_invariants() {
        let mut session = session(4, 2024);
        let mut race_overs = 0;
        let mut last_elapsed = 0.0;

        for _ in 0..4000 {
            for event in session.autopilot_frame() {
                if matches!(event, RaceEvent::RaceOver(_)) {
                    race_overs += 1;
                }
            }

            let state = session.race().state();
            assert!(state.session.elapsed_ms >= last_elapsed);
            last_elapsed = state.session.elapsed_ms;

            for racer in state.racer_ids() {
                let vehicle = state.vehicle(racer).unwrap();
                let racer_state = state.racer_state(racer).unwrap();
                assert!(vehicle.health <= vehicle.max_health);
                if racer_state.is_terminal() {
                    assert_eq!(vehicle.velocity, Vec2::ZERO);
                }
                if vehicle.health == 0 {
                    assert!(racer_state.is_terminal());
                }
                match racer {
                    RacerId::Player => assert!(vehicle.speed() <= 260.0 + 1e-2),
                    RacerId::Rival(i) => assert!(vehicle.speed() <= state.rivals[i].base_speed + 1e-2),
                }
            }
        }

        assert_eq!(race_overs, 1);
        assert!(session.race().state().session.is_race_over);
    }

    #[test]
    fn test_restart_mid_race() {
        let mut session = session(2, 3);
        for _ in 0..120 {
            session.autopilot_frame();
        }
        assert!(session.race().state().session.has_started);

        let events = session.restart();

        assert!(events.contains(&RaceEvent::RoundStarted { round: 2 }));
        let state = session.race().state();
        assert!(!state.session.has_started);
        assert_eq!(state.player.vehicle.position, state.player.vehicle.spawn_position);
        assert!(state.rivals.iter().all(|npc| npc.waypoint_index == 0));
    }

    #[test]
    fn test_run_round_respects_cap() {
        let mut session = session(1, 9);
        let outcome = session.run_round(50);
        assert!(outcome.ticks <= 50);
        assert_eq!(outcome.round, 1);
    }

    #[test]
    fn test_level_1_round_finishes() {
        let mut session = session(3, 2024);

        let outcome = session.run_round(7200);

        let result = outcome.result.expect("round closes before the cap");
        let state = session.race().state();
        assert!(matches!(state.player.state, RacerState::Finished { .. }));
        assert!(result
            .rankings
            .iter()
            .any(|row| matches!(row.racer, RacerId::Rival(_)) && row.finished));
        let best = outcome.new_best_ms.expect("first player finish sets a best time");
        assert_eq!(state.session.best_time_ms, Some(best));
        assert!(outcome.ticks < 7200);
    }

    #[test]
    fn test_best_time_carries_into_next_round() {
        let mut session = session(2, 5);
        let first = session.run_round(7200);
        assert!(first.result.is_some());
        let best = session.race().state().session.best_time_ms.expect("player finished round 1");

        session.restart();
        assert_eq!(session.race().state().session.round, 2);
        assert_eq!(session.race().state().session.best_time_ms, Some(best));

        let second = session.run_round(7200);
        assert_eq!(second.round, 2);
        assert!(second.result.is_some());
        let carried = session.race().state().session.best_time_ms.expect("best time survives the restart");
        assert!(carried <= best);
    }
}
