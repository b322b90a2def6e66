pub mod constants;
pub mod track;
pub mod corner;
pub mod input;
pub mod state;
pub mod effects;
pub mod systems;
pub mod race_result;
pub mod snapshot;
pub mod game_loop;
