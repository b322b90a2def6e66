//! Wall collision response
//!
//! Broad-phase detection belongs to the physics collaborator. This system
//! decides whether a wall body may collide at all (corner tiles are only
//! half solid) and what a reported contact does to the car: damage from
//! impact speed and a restitution bounce off an approximate normal.

use crate::game::constants::collision::*;
use crate::game::corner;
use crate::game::state::{RacerState, Vehicle};
use crate::game::track::WallBody;
use crate::util::vec2::Vec2;

/// How a car takes wall hits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactProfile {
    pub min_damage: u32,
    pub max_damage: u32,
    pub restitution: f32,
    pub damping: f32,
    /// Post-bounce speed cap
    pub speed_cap: Option<f32>,
}

impl ImpactProfile {
    pub fn player() -> Self {
        Self {
            min_damage: PLAYER_MIN_DAMAGE,
            max_damage: PLAYER_MAX_DAMAGE,
            restitution: PLAYER_RESTITUTION,
            damping: PLAYER_DAMPING,
            speed_cap: None,
        }
    }

    /// Rivals cannot out-run their cruise speed off a bounce
    pub fn npc(base_speed: f32) -> Self {
        Self {
            min_damage: NPC_MIN_DAMAGE,
            max_damage: NPC_MAX_DAMAGE,
            restitution: NPC_RESTITUTION,
            damping: NPC_DAMPING,
            speed_cap: Some(base_speed),
        }
    }
}

/// Outcome of a contact that was hard enough to count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub speed: f32,
    pub damage: u32,
    /// This hit emptied the car's health
    pub wrecked: bool,
    /// Velocity was reflected
    pub bounced: bool,
}

/// Pre-collision filter: may `wall` collide with a car at `point`?
/// Plain walls always may; corner walls only when the car is in their solid half.
pub fn should_collide(wall: &WallBody, point: Vec2) -> bool {
    if wall.tile.is_corner() {
        corner::is_solid_at(wall.tile, point, wall.origin)
    } else {
        true
    }
}

/// Damage for an impact at `speed`, or None when the hit is soft enough to be free
pub fn damage_for_speed(speed: f32, profile: &ImpactProfile) -> Option<u32> {
    if speed <= IMPACT_THRESHOLD {
        return None;
    }
    let raw = (speed / DAMAGE_DIVISOR).floor() as u32;
    Some(raw.clamp(profile.min_damage, profile.max_damage))
}

/// Reflect the normal component of `velocity` off a wall at `wall_position`.
/// Returns None when the car is already separating (or sits on the wall centre).
pub fn bounce(
    velocity: Vec2,
    vehicle_position: Vec2,
    wall_position: Vec2,
    profile: &ImpactProfile,
) -> Option<Vec2> {
    let normal = (vehicle_position - wall_position).normalize();
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return None;
    }

    let mut reflected = velocity - normal * ((1.0 + profile.restitution) * vn);
    reflected *= profile.damping;
    if let Some(cap) = profile.speed_cap {
        reflected = reflected.clamp_length(cap);
    }
    Some(reflected)
}

/// Apply a reported wall contact to a car.
///
/// Finished or wrecked cars are skipped so a wreck cannot be triggered twice.
/// A hit that empties health zeroes velocity instead of bouncing.
pub fn apply_wall_contact(
    vehicle: &mut Vehicle,
    state: RacerState,
    wall_position: Vec2,
    profile: &ImpactProfile,
) -> Option<Impact> {
    if state.is_terminal() {
        return None;
    }

    let speed = vehicle.speed();
    let damage = damage_for_speed(speed, profile)?;
    let wrecked = vehicle.apply_damage(damage);

    let mut bounced = false;
    if vehicle.health == 0 {
        vehicle.pin();
    } else if let Some(velocity) = bounce(vehicle.velocity, vehicle.position, wall_position, profile) {
        vehicle.velocity = velocity;
        bounced = true;
    }

    tracing::debug!(speed, damage, health = vehicle.health, wrecked, "Wall impact");

    Some(Impact {
        speed,
        damage,
        wrecked,
        bounced,
    })
}
