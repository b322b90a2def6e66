//! Scripted player driver
//!
//! Plans a route from spawn to goal over the tile grid, then follows it with
//! key-style input, so a headless run exercises the same input path a human
//! would. The route hugs corridor centres; the racing line the rivals use is
//! cyclic and cuts corners, which suits a traction-blended pilot but not a
//! car that has to brake for its turns.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::game::input::DriverInput;
use crate::game::state::Vehicle;
use crate::game::track::{world_position, TileCoord, TrackGrid};
use crate::util::vec2::{wrap_angle, Vec2};

/// Distance ahead of the car, along the route, that it steers toward
const LOOKAHEAD: f32 = 22.0;
const CRUISE_SPEED: f32 = 150.0;
const CORNER_SPEED: f32 = 70.0;
/// Distance before a vertex where the car slows for a sharp turn
const BRAKE_ZONE: f32 = 60.0;
/// Turn angle (radians) that counts as sharp, both for route vertices and heading error
const SHARP_TURN: f32 = 0.35;
/// Heading error below which the wheel is left alone (radians)
const STEER_DEADBAND: f32 = 0.03;
/// Overspeed tolerated before braking
const BRAKE_MARGIN: f32 = 15.0;

/// Step cost of entering a tile: a base plus one per solid neighbour, so
/// routes keep to the middle of wide areas.
fn entry_cost(track: &TrackGrid, col: i64, row: i64) -> u32 {
    let mut cost = 2;
    for dr in -1..=1 {
        for dc in -1..=1 {
            if (dc, dr) != (0, 0) && blocked(track, col + dc, row + dr) {
                cost += 1;
            }
        }
    }
    cost
}

fn blocked(track: &TrackGrid, col: i64, row: i64) -> bool {
    match (u32::try_from(col), u32::try_from(row)) {
        (Ok(col), Ok(row)) => track.is_solid(TileCoord::new(col, row)),
        _ => true,
    }
}

/// Cheapest 4-connected tile path from spawn to goal, reduced to its turning
/// points and returned as tile centres. Empty when the goal is unreachable.
pub fn plan_route(track: &TrackGrid) -> Vec<Vec2> {
    let (width, height) = track.dimensions();
    let index = |coord: TileCoord| (coord.row * width + coord.col) as usize;
    let coord = |index: usize| TileCoord::new(index as u32 % width, index as u32 / width);

    let cells = (width * height) as usize;
    let start = index(track.spawn_tile());
    let goal = index(track.goal_tile());

    let mut best = vec![u32::MAX; cells];
    let mut previous: Vec<Option<usize>> = vec![None; cells];
    let mut open = BinaryHeap::new();
    best[start] = 0;
    open.push(Reverse((0u32, start)));

    while let Some(Reverse((cost, current))) = open.pop() {
        if cost > best[current] {
            continue;
        }
        if current == goal {
            break;
        }
        let here = coord(current);
        for (dc, dr) in [(0i64, -1i64), (1, 0), (0, 1), (-1, 0)] {
            let (col, row) = (here.col as i64 + dc, here.row as i64 + dr);
            if blocked(track, col, row) {
                continue;
            }
            let next = index(TileCoord::new(col as u32, row as u32));
            let next_cost = cost + entry_cost(track, col, row);
            if next_cost < best[next] {
                best[next] = next_cost;
                previous[next] = Some(current);
                open.push(Reverse((next_cost, next)));
            }
        }
    }

    if best[goal] == u32::MAX {
        tracing::warn!("No route from spawn to goal");
        return Vec::new();
    }

    let mut tiles = vec![coord(goal)];
    let mut cursor = goal;
    while let Some(step) = previous[cursor] {
        tiles.push(coord(step));
        cursor = step;
    }
    tiles.reverse();

    let mut turns = Vec::with_capacity(tiles.len());
    for (i, &tile) in tiles.iter().enumerate() {
        let keep = match (i.checked_sub(1).map(|p| tiles[p]), tiles.get(i + 1)) {
            (Some(before), Some(after)) => {
                let inbound = (tile.col as i64 - before.col as i64, tile.row as i64 - before.row as i64);
                let outbound = (after.col as i64 - tile.col as i64, after.row as i64 - tile.row as i64);
                inbound != outbound
            }
            _ => true,
        };
        if keep {
            turns.push(world_position(tile));
        }
    }
    turns
}

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    route: Vec<Vec2>,
    segment: usize,
}

impl Autopilot {
    pub fn new(route: Vec<Vec2>) -> Self {
        Self { route, segment: 0 }
    }

    pub fn for_track(track: &TrackGrid) -> Self {
        Self::new(plan_route(track))
    }

    pub fn route(&self) -> &[Vec2] {
        &self.route
    }

    pub fn segment(&self) -> usize {
        self.segment
    }

    pub fn reset(&mut self) {
        self.segment = 0;
    }

    /// Input for this frame. The route is followed once; past its end the
    /// autopilot keeps aiming at the final point.
    pub fn drive(&mut self, vehicle: &Vehicle) -> DriverInput {
        if self.route.len() < 2 {
            return DriverInput::default();
        }
        let position = vehicle.position;

        while self.segment + 2 < self.route.len() && self.progress(self.segment, position) >= 1.0 {
            self.segment += 1;
        }

        let target = self.lookahead_point(position);
        let error = wrap_angle((target - position).angle() - vehicle.heading);

        let (from, to) = (self.route[self.segment], self.route[self.segment + 1]);
        let sharp_ahead = self.route.get(self.segment + 2).is_some_and(|&next| {
            let turn = wrap_angle((next - to).angle() - (to - from).angle()).abs();
            turn > SHARP_TURN && position.distance_sq_to(to) < BRAKE_ZONE * BRAKE_ZONE
        });
        let desired = if sharp_ahead || error.abs() > SHARP_TURN {
            CORNER_SPEED
        } else {
            CRUISE_SPEED
        };
        let speed = vehicle.speed();

        DriverInput {
            steer_left: error < -STEER_DEADBAND,
            steer_right: error > STEER_DEADBAND,
            throttle_forward: speed < desired,
            throttle_back: speed > desired + BRAKE_MARGIN,
            restart_pressed: false,
        }
    }

    /// Projection of `position` onto segment `segment`, 0 at its start and 1 at its end
    fn progress(&self, segment: usize, position: Vec2) -> f32 {
        let (from, to) = (self.route[segment], self.route[segment + 1]);
        let span = to - from;
        let length_sq = span.length_sq();
        if length_sq <= f32::EPSILON {
            return 1.0;
        }
        (position - from).dot(span) / length_sq
    }

    /// Point LOOKAHEAD further along the route than the car's projection
    fn lookahead_point(&self, position: Vec2) -> Vec2 {
        let last = self.route.len() - 1;
        let mut along = self.progress(self.segment, position).clamp(0.0, 1.0)
            * (self.route[self.segment + 1] - self.route[self.segment]).length();
        let mut remaining = LOOKAHEAD;
        let mut segment = self.segment;

        loop {
            let (from, to) = (self.route[segment], self.route[segment + 1]);
            let length = (to - from).length();
            if along + remaining <= length || segment + 1 == last {
                if length <= f32::EPSILON {
                    return to;
                }
                let t = ((along + remaining) / length).min(1.0);
                return from.lerp(to, t);
            }
            remaining -= length - along;
            along = 0.0;
            segment += 1;
        }
    }
}
