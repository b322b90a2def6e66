//! Reference physics collaborator
//!
//! A small arcade world: car bodies are circles, walls are the track's
//! static tile bodies. Each step integrates positions from the velocities
//! the race decided, blocks moves into walls (sliding along an axis when
//! it can) and reports the contacts for the race to react to.

use smallvec::SmallVec;

use crate::game::constants::harness::VEHICLE_RADIUS;
use crate::game::constants::track::TILE_SIZE;
use crate::game::game_loop::{Contact, Race};
use crate::game::state::RacerId;
use crate::game::track::{TileCoord, TrackGrid, WallBody, WallId};
use crate::util::vec2::Vec2;

/// Contacts produced by one step; usually none or a handful
pub type Contacts = SmallVec<[Contact; 8]>;

pub struct ArcadeWorld {
    track: TrackGrid,
    radius: f32,
}

impl ArcadeWorld {
    /// Register the static wall bodies of `track`
    pub fn new(track: TrackGrid) -> Self {
        tracing::debug!(walls = track.wall_bodies().len(), "Physics world built");
        Self {
            track,
            radius: VEHICLE_RADIUS,
        }
    }

    /// Integrate every car over `delta_ms` and collect contacts
    pub fn step(&self, race: &mut Race, delta_ms: f32) -> Contacts {
        let dt = delta_ms.max(0.0) / 1000.0;
        let racers: SmallVec<[RacerId; 8]> = race.state().racer_ids().collect();
        let mut contacts = Contacts::new();

        for racer in racers {
            let Some(vehicle) = race.state().vehicle(racer) else {
                continue;
            };
            let from = vehicle.position;
            let motion = vehicle.velocity * dt;
            if motion.length_sq() == 0.0 {
                self.check_goal(race, racer, from, &mut contacts);
                continue;
            }

            let full = from + motion;
            let resting = match self.blocking_wall(race, full) {
                None => full,
                Some(wall) => {
                    contacts.push(Contact::Wall { racer, wall });
                    // Slide along whichever axis is still open
                    let along_x = from + Vec2::new(motion.x, 0.0);
                    let along_y = from + Vec2::new(0.0, motion.y);
                    if self.blocking_wall(race, along_x).is_none() {
                        along_x
                    } else if self.blocking_wall(race, along_y).is_none() {
                        along_y
                    } else {
                        from
                    }
                }
            };

            if let Some(vehicle) = race.state_mut().vehicle_mut(racer) {
                vehicle.position = resting;
            }
            self.check_goal(race, racer, resting, &mut contacts);
        }

        contacts
    }

    fn check_goal(&self, race: &Race, racer: RacerId, position: Vec2, contacts: &mut Contacts) {
        if self.track.is_goal_at(position) && race.state().racer_state(racer).is_some_and(|s| s.is_racing()) {
            contacts.push(Contact::Goal { racer });
        }
    }

    /// Nearest wall the car would overlap at `center`, honouring the
    /// race's corner filter
    fn blocking_wall(&self, race: &Race, center: Vec2) -> Option<WallId> {
        self.overlapping_walls(center)
            .filter(|wall| race.should_collide(wall.id, center))
            .min_by(|a, b| {
                a.center
                    .distance_sq_to(center)
                    .partial_cmp(&b.center.distance_sq_to(center))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|wall| wall.id)
    }

    fn overlapping_walls(&self, center: Vec2) -> impl Iterator<Item = &WallBody> + '_ {
        let (width, height) = self.track.dimensions();
        let r = self.radius;
        let min_col = ((center.x - r) / TILE_SIZE).floor().max(0.0) as u32;
        let min_row = ((center.y - r) / TILE_SIZE).floor().max(0.0) as u32;
        let max_col = (((center.x + r) / TILE_SIZE).floor().max(0.0) as u32).min(width.saturating_sub(1));
        let max_row = (((center.y + r) / TILE_SIZE).floor().max(0.0) as u32).min(height.saturating_sub(1));

        (min_row..=max_row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| TileCoord::new(col, row)))
            .filter_map(move |coord| self.track.wall_at(coord))
            .filter(move |wall| circle_hits_tile(center, r, wall.origin))
    }
}

fn circle_hits_tile(center: Vec2, radius: f32, origin: Vec2) -> bool {
    let closest = Vec2::new(
        center.x.clamp(origin.x, origin.x + TILE_SIZE),
        center.y.clamp(origin.y, origin.y + TILE_SIZE),
    );
    closest.distance_sq_to(center) < radius * radius
}
