use rand::Rng;

use crate::game::constants::ai::*;
use crate::game::constants::race::{RIVAL_SPAWN_OFFSETS, SPAWN_HEADING};
use crate::game::constants::waypoint_reach_sq;
use crate::game::state::{NpcAgent, RacerState, Vehicle};
use crate::util::vec2::{wrap_angle, Vec2};

/// Fixed traits of a named rival
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpcProfile {
    pub label: &'static str,
    pub color: u32,
    /// Cruise speed in units per second
    pub base_speed: f32,
    /// Radians per millisecond
    pub turn_rate: f32,
    pub traction: f32,
}

/// Rivals in grid order
pub const ROSTER: [NpcProfile; 4] = [
    NpcProfile {
        label: "Crimson",
        color: 0xE5_3B_3B,
        base_speed: 150.0,
        turn_rate: 0.0045,
        traction: 0.25,
    },
    NpcProfile {
        label: "Verdant",
        color: 0x3B_C4_5A,
        base_speed: 140.0,
        turn_rate: 0.0050,
        traction: 0.30,
    },
    NpcProfile {
        label: "Cobalt",
        color: 0x3B_6F_E5,
        base_speed: 160.0,
        turn_rate: 0.0040,
        traction: 0.20,
    },
    NpcProfile {
        label: "Amber",
        color: 0xE5_9A_3B,
        base_speed: 145.0,
        turn_rate: 0.0048,
        traction: 0.28,
    },
];

impl NpcAgent {
    /// Build a rival on its grid slot. Jitter and a small base-speed spread are
    /// drawn here once and kept for the life of the agent.
    pub fn spawn<R: Rng>(profile: &NpcProfile, spawn_position: Vec2, rng: &mut R) -> Self {
        let jitter = Vec2::new(
            rng.gen_range(-JITTER_RADIUS..=JITTER_RADIUS),
            rng.gen_range(-JITTER_RADIUS..=JITTER_RADIUS),
        );
        let spread = 1.0 + rng.gen_range(-SPEED_VARIANCE..=SPEED_VARIANCE);

        Self {
            label: profile.label.to_string(),
            vehicle: Vehicle::new(spawn_position, SPAWN_HEADING, profile.color),
            state: RacerState::Ready,
            waypoint_index: 0,
            jitter,
            base_speed: profile.base_speed * spread,
            turn_rate: profile.turn_rate,
            traction: profile.traction,
        }
    }

    /// Back to the grid for a new round. Jitter is kept.
    pub fn reset(&mut self) {
        self.vehicle.reset_to_spawn();
        self.state = RacerState::Ready;
        self.waypoint_index = 0;
    }

    /// Current steering target: waypoint plus this agent's bias
    pub fn target(&self, waypoints: &[Vec2]) -> Option<Vec2> {
        if waypoints.is_empty() {
            return None;
        }
        Some(waypoints[self.waypoint_index % waypoints.len()] + self.jitter)
    }
}

/// Spawn `count` rivals from the roster on the grid behind `spawn_point`
pub fn spawn_rivals<R: Rng>(spawn_point: Vec2, count: usize, rng: &mut R) -> Vec<NpcAgent> {
    ROSTER
        .iter()
        .zip(RIVAL_SPAWN_OFFSETS.iter())
        .take(count)
        .map(|(profile, &(dx, dy))| NpcAgent::spawn(profile, spawn_point + Vec2::new(dx, dy), rng))
        .collect()
}

/// What one pilot step did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilotStep {
    /// Waypoint index the agent moved on to, if it reached its target
    pub advanced_to: Option<usize>,
}

/// Steer one agent toward its waypoint and blend its velocity.
///
/// Does nothing for agents that are not racing. Turning is limited to
/// `turn_rate * delta_ms` per call and velocity moves toward the heading
/// at `base_speed` by the clamped traction factor.
pub fn steer(agent: &mut NpcAgent, waypoints: &[Vec2], delta_ms: f32) -> PilotStep {
    let idle = PilotStep { advanced_to: None };
    if !agent.state.is_racing() {
        return idle;
    }
    let target = match agent.target(waypoints) {
        Some(t) => t,
        None => return idle,
    };

    let vehicle = &mut agent.vehicle;
    let to_target = target - vehicle.position;
    let desired_heading = to_target.angle();
    let angle_diff = wrap_angle(desired_heading - vehicle.heading);
    let max_turn = agent.turn_rate * delta_ms.max(0.0);
    vehicle.heading = wrap_angle(vehicle.heading + angle_diff.clamp(-max_turn, max_turn));

    let desired_velocity = vehicle.heading_vector() * agent.base_speed;
    let traction = agent.traction.clamp(TRACTION_MIN, TRACTION_MAX);
    vehicle.velocity = vehicle.velocity.lerp(desired_velocity, traction);

    if vehicle.position.distance_sq_to(target) < waypoint_reach_sq() {
        agent.waypoint_index = (agent.waypoint_index + 1) % waypoints.len();
        tracing::debug!(agent = %agent.label, waypoint = agent.waypoint_index, "Waypoint reached");
        return PilotStep {
            advanced_to: Some(agent.waypoint_index),
        };
    }

    idle
}
