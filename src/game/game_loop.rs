//! Per-tick race orchestration
//!
//! `Race` owns the simulation state and the cosmetic effect queue. A host
//! drives it in two steps per frame: `tick` with the frame's driver input
//! (velocities are decided here), then, after its physics integrated
//! positions, `handle_contact` for every contact the physics reported.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::constants::effects::FLASH_DURATION_MS;
use crate::game::constants::race::{PLAYER_COLOR, PLAYER_LABEL, SPAWN_HEADING};
use crate::game::effects::{EffectKind, EffectQueue};
use crate::game::input::DriverInput;
use crate::game::snapshot::{self, RaceSnapshot};
use crate::game::state::{Player, RaceSession, RaceState, RacerId, RacerState, Vehicle};
use crate::game::systems::collision::{self, ImpactProfile};
use crate::game::systems::kinetics::{self, KineticsTuning};
use crate::game::systems::lifecycle::{self, RaceEvent};
use crate::game::systems::pilot::{self, ROSTER};
use crate::game::track::{self, TrackError, TrackGrid, WallId};
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum RaceSetupError {
    #[error("Track failed to load: {0}")]
    Track(#[from] TrackError),
    #[error("Racing line has no waypoints")]
    EmptyWaypoints,
    #[error("Requested {requested} rivals, roster has {available}")]
    TooManyRivals { requested: usize, available: usize },
}

/// Contact reported by the physics collaborator, carrying the handles the
/// bodies were registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Wall { racer: RacerId, wall: WallId },
    Goal { racer: RacerId },
}

pub struct Race {
    state: RaceState,
    effects: EffectQueue,
    tuning: KineticsTuning,
}

impl Race {
    /// Build a race on `track` with `rivals` AI cars. `seed` fixes rival jitter
    /// and speed spread; without it they are drawn from entropy.
    pub fn new(
        track: TrackGrid,
        waypoints: Vec<Vec2>,
        rivals: usize,
        seed: Option<u64>,
    ) -> Result<Self, RaceSetupError> {
        if waypoints.is_empty() {
            return Err(RaceSetupError::EmptyWaypoints);
        }
        if rivals > ROSTER.len() {
            return Err(RaceSetupError::TooManyRivals {
                requested: rivals,
                available: ROSTER.len(),
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spawn = track.spawn_point();
        let rivals = pilot::spawn_rivals(spawn, rivals, &mut rng);

        let mut state = RaceState {
            track,
            waypoints,
            player: Player {
                label: PLAYER_LABEL.to_string(),
                vehicle: Vehicle::new(spawn, SPAWN_HEADING, PLAYER_COLOR),
                state: RacerState::Ready,
            },
            rivals,
            session: RaceSession::new(),
        };
        lifecycle::start_new_round(&mut state);

        Ok(Self {
            state,
            effects: EffectQueue::new(),
            tuning: KineticsTuning::default(),
        })
    }

    /// Built-in level 1 with its racing line
    pub fn level_1(rivals: usize, seed: Option<u64>) -> Result<Self, RaceSetupError> {
        Self::new(track::level_1()?, track::level_1_waypoints(), rivals, seed)
    }

    pub fn with_tuning(mut self, tuning: KineticsTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    /// Mutable state for the physics collaborator to write integrated positions
    pub fn state_mut(&mut self) -> &mut RaceState {
        &mut self.state
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn track(&self) -> &TrackGrid {
        &self.state.track
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        snapshot::capture(&self.state)
    }

    /// Advance one frame: restart handling, due effects, race start, timer,
    /// then new velocities for the player and every rival.
    pub fn tick(&mut self, input: &DriverInput, delta_ms: f32) -> Vec<RaceEvent> {
        let delta_ms = delta_ms.max(0.0);

        if input.restart_pressed {
            return self.start_new_round();
        }

        let mut events = Vec::new();

        for effect in self.effects.advance(delta_ms as f64) {
            match effect {
                EffectKind::ClearFlash(racer) => {
                    if let Some(vehicle) = self.state.vehicle_mut(racer) {
                        vehicle.flash = false;
                    }
                }
            }
        }

        let throttle = input.throttle();
        if lifecycle::observe_player_throttle(&mut self.state, throttle) {
            events.push(RaceEvent::RaceStarted);
        }
        lifecycle::advance_timer(&mut self.state, delta_ms as f64);

        // A Ready car sits on the grid: steering alone does not start the race
        let player = &mut self.state.player;
        match player.state {
            RacerState::Racing => {
                kinetics::update(&mut player.vehicle, input.steer(), throttle, delta_ms, &self.tuning);
            }
            RacerState::Ready => {}
            RacerState::Finished { .. } | RacerState::Wrecked => player.vehicle.pin(),
        }

        let waypoints = &self.state.waypoints;
        for (i, npc) in self.state.rivals.iter_mut().enumerate() {
            if npc.state.is_terminal() {
                npc.vehicle.pin();
                continue;
            }
            if let Some(index) = pilot::steer(npc, waypoints, delta_ms).advanced_to {
                events.push(RaceEvent::WaypointReached {
                    racer: RacerId::Rival(i),
                    index,
                });
            }
        }

        events
    }

    /// Pre-collision filter for the physics collaborator: may a car centred
    /// at `point` touch this wall body?
    pub fn should_collide(&self, wall: WallId, point: Vec2) -> bool {
        self.state
            .track
            .wall(wall)
            .is_some_and(|body| collision::should_collide(body, point))
    }

    /// React to one contact reported after integration
    pub fn handle_contact(&mut self, contact: Contact) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        match contact {
            Contact::Wall { racer, wall } => self.handle_wall(racer, wall, &mut events),
            Contact::Goal { racer } => self.handle_goal(racer, &mut events),
        }
        events
    }

    /// Reset every racer and drop cosmetic effects from the previous round
    pub fn start_new_round(&mut self) -> Vec<RaceEvent> {
        self.effects.invalidate();
        let round = lifecycle::start_new_round(&mut self.state);
        vec![RaceEvent::RoundStarted { round }]
    }

    fn handle_wall(&mut self, racer: RacerId, wall: WallId, events: &mut Vec<RaceEvent>) {
        let Some(wall_position) = self.state.track.wall(wall).map(|body| body.center) else {
            tracing::warn!(wall, "Contact with unknown wall body");
            return;
        };
        let (profile, racer_state) = match racer {
            RacerId::Player => (ImpactProfile::player(), self.state.player.state),
            RacerId::Rival(i) => match self.state.rivals.get(i) {
                Some(npc) => (ImpactProfile::npc(npc.base_speed), npc.state),
                None => return,
            },
        };
        let Some(vehicle) = self.state.vehicle_mut(racer) else {
            return;
        };

        let Some(impact) = collision::apply_wall_contact(vehicle, racer_state, wall_position, &profile) else {
            return;
        };
        vehicle.flash = true;
        let health = vehicle.health;
        self.effects.schedule(FLASH_DURATION_MS, EffectKind::ClearFlash(racer));

        events.push(RaceEvent::WallImpact {
            racer,
            speed: impact.speed,
            damage: impact.damage,
            health,
        });

        if impact.wrecked && lifecycle::wreck(&mut self.state, racer) {
            events.push(RaceEvent::RacerWrecked { racer });
            self.close_if_over(events);
        }
    }

    fn handle_goal(&mut self, racer: RacerId, events: &mut Vec<RaceEvent>) {
        let Some(time_ms) = lifecycle::finish(&mut self.state, racer) else {
            return;
        };
        events.push(RaceEvent::RacerFinished { racer, time_ms });

        if racer == RacerId::Player && self.state.session.record_time(time_ms) {
            tracing::info!(time_ms, "New best time");
            events.push(RaceEvent::NewBestTime { time_ms });
        }
        self.close_if_over(events);
    }

    fn close_if_over(&mut self, events: &mut Vec<RaceEvent>) {
        if let Some(result) = lifecycle::check_race_over(&mut self.state) {
            events.push(RaceEvent::RaceOver(result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 16.0;

    fn race(rivals: usize) -> Race {
        Race::level_1(rivals, Some(11)).unwrap()
    }

    /// Wall body whose centre is closest to `point`
    fn wall_near(race: &Race, point: Vec2) -> WallId {
        race.track()
            .wall_bodies()
            .iter()
            .min_by(|a, b| {
                a.center
                    .distance_sq_to(point)
                    .partial_cmp(&b.center.distance_sq_to(point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|w| w.id)
            .unwrap()
    }

    fn count_race_over(events: &[RaceEvent]) -> usize {
        events.iter().filter(|e| matches!(e, RaceEvent::RaceOver(_))).count()
    }

    #[test]
    fn test_setup_errors() {
        let track = track::level_1().unwrap();
        assert!(matches!(
            Race::new(track.clone(), vec![], 3, None),
            Err(RaceSetupError::EmptyWaypoints)
        ));
        assert!(matches!(
            Race::new(track, vec![Vec2::ZERO], 9, None),
            Err(RaceSetupError::TooManyRivals { requested: 9, .. })
        ));
    }

    #[test]
    fn test_first_round_numbered() {
        let race = race(3);
        assert_eq!(race.state().session.round, 1);
        assert_eq!(race.state().rivals.len(), 3);
    }

    #[test]
    fn test_rivals_wait_for_player_throttle() {
        let mut race = race(3);

        for _ in 0..10 {
            let events = race.tick(&DriverInput::default(), DT);
            assert!(events.is_empty());
        }
        assert!(race.state().rivals.iter().all(|npc| npc.vehicle.velocity == Vec2::ZERO));
        assert_eq!(race.state().session.elapsed_ms, 0.0);

        let events = race.tick(&DriverInput::forward(), DT);
        assert!(events.contains(&RaceEvent::RaceStarted));
        assert!(race.state().rivals.iter().all(|npc| npc.vehicle.velocity.length() > 0.0));
        assert!(race.state().player.vehicle.velocity.x > 0.0);
        assert_eq!(race.state().session.elapsed_ms, DT as f64);
    }

    #[test]
    fn test_steering_on_the_grid_does_nothing() {
        let mut race = race(1);
        let steer_only = DriverInput {
            steer_right: true,
            ..DriverInput::default()
        };

        for _ in 0..30 {
            assert!(race.tick(&steer_only, DT).is_empty());
        }

        let player = &race.state().player;
        assert_eq!(player.state, RacerState::Ready);
        assert_eq!(player.vehicle.heading, player.vehicle.spawn_heading);
        assert_eq!(player.vehicle.position, player.vehicle.spawn_position);

        // The first throttle frame applies steering too
        let events = race.tick(
            &DriverInput {
                steer_right: true,
                throttle_forward: true,
                ..DriverInput::default()
            },
            DT,
        );
        assert!(events.contains(&RaceEvent::RaceStarted));
        assert!(race.state().player.vehicle.heading > race.state().player.vehicle.spawn_heading);
    }

    #[test]
    fn test_wall_hit_flashes_then_clears() {
        let mut race = race(0);
        race.tick(&DriverInput::forward(), DT);
        let player = race.state().player.vehicle.position;
        race.state_mut().player.vehicle.velocity = Vec2::new(0.0, -200.0);
        let wall = wall_near(&race, player + Vec2::new(0.0, -40.0));

        let events = race.handle_contact(Contact::Wall { racer: RacerId::Player, wall });

        assert!(matches!(events[0], RaceEvent::WallImpact { damage: 5, health: 95, .. }));
        assert!(race.state().player.vehicle.flash);
        assert!(race.state().player.vehicle.velocity.y > 0.0);

        race.tick(&DriverInput::default(), FLASH_DURATION_MS as f32 + 1.0);
        assert!(!race.state().player.vehicle.flash);
    }

    #[test]
    fn test_stale_flash_cannot_clear_new_round() {
        let mut race = race(0);
        race.tick(&DriverInput::forward(), DT);
        race.state_mut().player.vehicle.velocity = Vec2::new(-300.0, 0.0);
        let player = race.state().player.vehicle.position;
        let wall = wall_near(&race, player + Vec2::new(-40.0, 0.0));
        race.handle_contact(Contact::Wall { racer: RacerId::Player, wall });

        race.tick(&DriverInput::restart(), DT);
        assert_eq!(race.effects().pending_len(), 0);

        // New round tint set by the host; the old clear must not fire on it
        race.state_mut().player.vehicle.flash = true;
        race.tick(&DriverInput::default(), FLASH_DURATION_MS as f32 * 2.0);
        assert!(race.state().player.vehicle.flash);
    }

    #[test]
    fn test_all_rivals_finish_then_player() {
        let mut race = race(3);
        race.tick(&DriverInput::forward(), DT);

        for i in 0..3 {
            let events = race.handle_contact(Contact::Goal { racer: RacerId::Rival(i) });
            assert_eq!(count_race_over(&events), 0);
        }
        race.tick(&DriverInput::forward(), DT);
        let events = race.handle_contact(Contact::Goal { racer: RacerId::Player });

        assert_eq!(count_race_over(&events), 1);
        assert!(events.iter().any(|e| matches!(e, RaceEvent::NewBestTime { .. })));
        assert!(race.state().session.is_race_over);
        assert_eq!(race.state().session.best_time_ms, Some(2.0 * DT as f64));
    }

    #[test]
    fn test_race_over_exactly_once_with_simultaneous_events() {
        let mut race = race(2);
        race.tick(&DriverInput::forward(), DT);

        let mut over = 0;
        for contact in [
            Contact::Goal { racer: RacerId::Rival(0) },
            Contact::Goal { racer: RacerId::Rival(1) },
            Contact::Goal { racer: RacerId::Player },
            Contact::Goal { racer: RacerId::Player },
            Contact::Goal { racer: RacerId::Rival(1) },
        ] {
            over += count_race_over(&race.handle_contact(contact));
        }

        assert_eq!(over, 1);
    }

    #[test]
    fn test_player_wreck_waits_for_rivals() {
        let mut race = race(1);
        race.tick(&DriverInput::forward(), DT);
        race.state_mut().player.vehicle.health = 5;
        race.state_mut().player.vehicle.velocity = Vec2::new(0.0, -300.0);
        let player = race.state().player.vehicle.position;
        let wall = wall_near(&race, player + Vec2::new(0.0, -40.0));

        let events = race.handle_contact(Contact::Wall { racer: RacerId::Player, wall });

        assert!(events.contains(&RaceEvent::RacerWrecked { racer: RacerId::Player }));
        assert_eq!(count_race_over(&events), 0);
        assert_eq!(race.state().player.vehicle.velocity, Vec2::ZERO);

        // Wrecked player stays put whatever the input
        race.tick(&DriverInput::forward(), DT);
        assert_eq!(race.state().player.vehicle.velocity, Vec2::ZERO);
        // Further hits are ignored
        assert!(race.handle_contact(Contact::Wall { racer: RacerId::Player, wall }).is_empty());

        let events = race.handle_contact(Contact::Goal { racer: RacerId::Rival(0) });
        assert_eq!(count_race_over(&events), 1);
    }

    #[test]
    fn test_restart_preserves_best_time() {
        let mut race = race(0);
        race.tick(&DriverInput::forward(), DT);
        race.handle_contact(Contact::Goal { racer: RacerId::Player });
        let best = race.state().session.best_time_ms;
        assert!(best.is_some());

        let events = race.tick(&DriverInput::restart(), DT);

        assert_eq!(events, vec![RaceEvent::RoundStarted { round: 2 }]);
        assert_eq!(race.state().session.best_time_ms, best);
        assert!(!race.state().session.is_race_over);
        assert_eq!(race.state().player.state, RacerState::Ready);
    }

    #[test]
    fn test_custom_tuning_applies_to_player() {
        let tuning = KineticsTuning {
            max_forward_speed: 50.0,
            ..KineticsTuning::default()
        };
        let mut race = race(0).with_tuning(tuning);

        for _ in 0..60 {
            race.tick(&DriverInput::forward(), DT);
        }

        assert!((race.state().player.vehicle.speed() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_should_collide_uses_corner_filter() {
        let track = TrackGrid::load(&["#####", "#S.1#", "#..G#", "#####"]).unwrap();
        let race = Race::new(track, vec![Vec2::new(100.0, 100.0)], 0, Some(1)).unwrap();
        let corner = race
            .track()
            .wall_bodies()
            .iter()
            .find(|w| w.tile.is_corner())
            .map(|w| w.id)
            .unwrap();

        // Corner at col 3, row 1: origin (120, 40); solid in its upper-left half
        assert!(race.should_collide(corner, Vec2::new(125.0, 45.0)));
        assert!(!race.should_collide(corner, Vec2::new(155.0, 75.0)));
        assert!(!race.should_collide(usize::MAX, Vec2::new(125.0, 45.0)));

        let plain = race.track().wall_bodies()[0].id;
        assert!(race.should_collide(plain, Vec2::new(0.0, 0.0)));
    }
}
