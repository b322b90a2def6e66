//! Distro Derby simulation core
//!
//! A top-down arcade racing simulation: tile tracks, player kinetics, wall
//! damage, waypoint-following rivals and the round lifecycle. Rendering,
//! audio and real physics live outside; the core reads intents and
//! contacts and writes velocities and state.
//!
//! # Features
//!
//! - `harness` - Reference arcade physics world, scripted autopilot and the headless runner (enabled by default)

pub mod config;
pub mod util;
pub mod game;

#[cfg(feature = "harness")]
pub mod sim;
