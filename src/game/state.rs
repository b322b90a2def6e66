//! Race state definitions
//!
//! Plain data for the player car, the AI rivals and the round-scoped session.
//! Systems in [`crate::game::systems`] mutate these in place each tick.

use serde::Serialize;

use crate::game::constants::race::{MAX_HEALTH, VEHICLE_SCALE};
use crate::game::race_result::RaceResult;
use crate::game::track::TrackGrid;
use crate::util::vec2::Vec2;

/// Handle a physics collaborator registers each car body with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RacerId {
    Player,
    Rival(usize),
}

/// Car body state shared by the player and the rivals
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub position: Vec2,
    /// Heading in radians, 0 = +x
    pub heading: f32,
    pub velocity: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// 0xRRGGBB
    pub color: u32,
    pub scale: f32,
    /// Damage tint currently shown
    pub flash: bool,
    pub spawn_position: Vec2,
    pub spawn_heading: f32,
}

impl Vehicle {
    pub fn new(spawn_position: Vec2, spawn_heading: f32, color: u32) -> Self {
        Self {
            position: spawn_position,
            heading: spawn_heading,
            velocity: Vec2::ZERO,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            color,
            scale: VEHICLE_SCALE,
            flash: false,
            spawn_position,
            spawn_heading,
        }
    }

    #[inline]
    pub fn heading_vector(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Subtract damage, flooring at 0. Returns true if this hit emptied health.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        let before = self.health;
        self.health = self.health.saturating_sub(damage);
        before > 0 && self.health == 0
    }

    /// Back to the grid slot with full health and no motion
    pub fn reset_to_spawn(&mut self) {
        self.position = self.spawn_position;
        self.heading = self.spawn_heading;
        self.velocity = Vec2::ZERO;
        self.health = self.max_health;
        self.flash = false;
    }

    /// Stop dead and stay stopped
    pub fn pin(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

/// Per-racer lifecycle. `Finished` and `Wrecked` are terminal for the round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RacerState {
    Ready,
    Racing,
    Finished { time_ms: f64 },
    /// Did not finish
    Wrecked,
}

impl Default for RacerState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Flag view of a racer's lifecycle for HUD and results consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RacerStatus {
    pub finished: bool,
    pub finish_time_ms: Option<f64>,
    pub dnf: bool,
}

impl RacerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RacerState::Finished { .. } | RacerState::Wrecked)
    }

    pub fn is_racing(&self) -> bool {
        matches!(self, RacerState::Racing)
    }

    pub fn finish_time_ms(&self) -> Option<f64> {
        match self {
            RacerState::Finished { time_ms } => Some(*time_ms),
            _ => None,
        }
    }

    pub fn status(&self) -> RacerStatus {
        RacerStatus {
            finished: matches!(self, RacerState::Finished { .. }),
            finish_time_ms: self.finish_time_ms(),
            dnf: matches!(self, RacerState::Wrecked),
        }
    }

    /// Short HUD label
    pub fn label(&self) -> &'static str {
        match self {
            RacerState::Ready => "READY",
            RacerState::Racing => "RACING",
            RacerState::Finished { .. } => "FINISHED",
            RacerState::Wrecked => "DNF",
        }
    }
}

/// The human-driven car
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub label: String,
    pub vehicle: Vehicle,
    pub state: RacerState,
}

/// An AI rival following the shared racing line
#[derive(Debug, Clone, Serialize)]
pub struct NpcAgent {
    pub label: String,
    pub vehicle: Vehicle,
    pub state: RacerState,
    /// Index into the shared waypoint list, wraps modulo its length
    pub waypoint_index: usize,
    /// Fixed racing-line bias drawn once at creation
    pub jitter: Vec2,
    /// Cruise speed, also the cap after wall bounces
    pub base_speed: f32,
    /// Radians per millisecond
    pub turn_rate: f32,
    /// Velocity blend factor in [0, 1]
    pub traction: f32,
}

/// Round-scoped timing and outcome. `best_time_ms` is the only field that
/// survives [`RaceSession::reset_round`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RaceSession {
    pub elapsed_ms: f64,
    pub timer_running: bool,
    /// Set once the player first applies throttle; releases the rivals
    pub has_started: bool,
    pub best_time_ms: Option<f64>,
    pub is_race_over: bool,
    pub results: Option<RaceResult>,
    /// Rounds started this session, 1-based once the first round begins
    pub round: u32,
}

impl RaceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_round(&mut self) {
        *self = Self {
            best_time_ms: self.best_time_ms,
            round: self.round + 1,
            ..Self::default()
        };
    }

    /// Record a player finish time. Returns true when it beats the best.
    pub fn record_time(&mut self, time_ms: f64) -> bool {
        match self.best_time_ms {
            Some(best) if best <= time_ms => false,
            _ => {
                self.best_time_ms = Some(time_ms);
                true
            }
        }
    }
}

/// Complete simulation state for one track
#[derive(Debug, Clone)]
pub struct RaceState {
    pub track: TrackGrid,
    /// Shared cyclic racing line
    pub waypoints: Vec<Vec2>,
    pub player: Player,
    pub rivals: Vec<NpcAgent>,
    pub session: RaceSession,
}

impl RaceState {
    pub fn vehicle(&self, racer: RacerId) -> Option<&Vehicle> {
        match racer {
            RacerId::Player => Some(&self.player.vehicle),
            RacerId::Rival(i) => self.rivals.get(i).map(|npc| &npc.vehicle),
        }
    }

    pub fn vehicle_mut(&mut self, racer: RacerId) -> Option<&mut Vehicle> {
        match racer {
            RacerId::Player => Some(&mut self.player.vehicle),
            RacerId::Rival(i) => self.rivals.get_mut(i).map(|npc| &mut npc.vehicle),
        }
    }

    pub fn racer_state(&self, racer: RacerId) -> Option<RacerState> {
        match racer {
            RacerId::Player => Some(self.player.state),
            RacerId::Rival(i) => self.rivals.get(i).map(|npc| npc.state),
        }
    }

    pub fn label(&self, racer: RacerId) -> &str {
        match racer {
            RacerId::Player => &self.player.label,
            RacerId::Rival(i) => self.rivals.get(i).map(|npc| npc.label.as_str()).unwrap_or("?"),
        }
    }

    /// Player first, then rivals in roster order
    pub fn racer_ids(&self) -> impl Iterator<Item = RacerId> {
        std::iter::once(RacerId::Player).chain((0..self.rivals.len()).map(RacerId::Rival))
    }

    pub fn all_rivals_terminal(&self) -> bool {
        self.rivals.iter().all(|npc| npc.state.is_terminal())
    }

    /// Mutable access to every car body, for the physics collaborator
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (RacerId, &mut Vehicle)> {
        std::iter::once((RacerId::Player, &mut self.player.vehicle)).chain(
            self.rivals
                .iter_mut()
                .enumerate()
                .map(|(i, npc)| (RacerId::Rival(i), &mut npc.vehicle)),
        )
    }
}
