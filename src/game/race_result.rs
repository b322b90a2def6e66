//! Race result and ranking
//!
//! Built once when the race closes: finishers by time, then every DNF in
//! roster order.

use serde::Serialize;

use crate::game::state::{RaceState, RacerId};

/// One row of the results table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub rank: u32,
    pub racer: RacerId,
    pub label: String,
    pub finished: bool,
    /// Finish time, None for a DNF
    pub time_ms: Option<f64>,
}

impl ResultRow {
    /// `"1. You  0:42.118"` or `"4. Cobalt  DNF"`
    pub fn render(&self) -> String {
        let time = match self.time_ms {
            Some(ms) => format_time(ms),
            None => "DNF".to_string(),
        };
        format!("{}. {}  {}", self.rank, self.label, time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    pub rankings: Vec<ResultRow>,
    /// Fastest finisher, if anyone finished
    pub winner: Option<RacerId>,
    pub player_rank: u32,
    pub round: u32,
}

impl RaceResult {
    pub fn lines(&self) -> Vec<String> {
        self.rankings.iter().map(ResultRow::render).collect()
    }
}

/// Rank every racer by current state
pub fn determine_result(state: &RaceState) -> RaceResult {
    let mut rankings: Vec<ResultRow> = state
        .racer_ids()
        .filter_map(|racer| {
            let racer_state = state.racer_state(racer)?;
            let status = racer_state.status();
            Some(ResultRow {
                rank: 0,
                racer,
                label: state.label(racer).to_string(),
                finished: status.finished,
                time_ms: status.finish_time_ms,
            })
        })
        .collect();

    // Stable: DNFs keep roster order behind all finishers
    rankings.sort_by(|a, b| match (a.time_ms, b.time_ms) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    for (i, row) in rankings.iter_mut().enumerate() {
        row.rank = (i + 1) as u32;
    }

    let winner = rankings.first().filter(|row| row.finished).map(|row| row.racer);
    let player_rank = rankings
        .iter()
        .find(|row| row.racer == RacerId::Player)
        .map(|row| row.rank)
        .unwrap_or(0);

    RaceResult {
        rankings,
        winner,
        player_rank,
        round: state.session.round,
    }
}

/// `M:SS.mmm`
pub fn format_time(ms: f64) -> String {
    let total_ms = ms.max(0.0).round() as u64;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{}:{:02}.{:03}", minutes, seconds, millis)
}
