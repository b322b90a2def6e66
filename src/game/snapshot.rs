//! Read-only presentation snapshot
//!
//! Everything a renderer or HUD needs for one frame, detached from the
//! simulation so consumers never hold references into it.

use serde::Serialize;

use crate::game::race_result::format_time;
use crate::game::state::{RaceState, RacerId};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleView {
    pub racer: RacerId,
    pub position: Vec2,
    pub heading: f32,
    pub color: u32,
    pub scale: f32,
    pub flash: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudRow {
    pub label: String,
    pub health: u32,
    pub status: &'static str,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSnapshot {
    pub round: u32,
    pub vehicles: Vec<VehicleView>,
    pub hud: Vec<HudRow>,
    pub current_time: String,
    pub best_time: String,
    pub race_over: bool,
    /// Ranked lines once the race is over
    pub results: Option<Vec<String>>,
}

const NO_TIME: &str = "--:--.---";

pub fn capture(state: &RaceState) -> RaceSnapshot {
    let mut vehicles = Vec::with_capacity(state.rivals.len() + 1);
    let mut hud = Vec::with_capacity(state.rivals.len() + 1);

    for racer in state.racer_ids() {
        let (Some(vehicle), Some(racer_state)) = (state.vehicle(racer), state.racer_state(racer)) else {
            continue;
        };
        vehicles.push(VehicleView {
            racer,
            position: vehicle.position,
            heading: vehicle.heading,
            color: vehicle.color,
            scale: vehicle.scale,
            flash: vehicle.flash,
        });
        hud.push(HudRow {
            label: state.label(racer).to_string(),
            health: vehicle.health,
            status: racer_state.label(),
            color: vehicle.color,
        });
    }

    let session = &state.session;
    RaceSnapshot {
        round: session.round,
        vehicles,
        hud,
        current_time: format_time(session.elapsed_ms),
        best_time: session
            .best_time_ms
            .map(format_time)
            .unwrap_or_else(|| NO_TIME.to_string()),
        race_over: session.is_race_over,
        results: session.results.as_ref().map(|r| r.lines()),
    }
}
