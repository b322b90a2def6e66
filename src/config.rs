use std::path::PathBuf;

use crate::game::constants::harness::DEFAULT_TICK_MS;
use crate::game::systems::pilot::ROSTER;

/// Headless runner configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Fixed frame delta in milliseconds
    pub tick_ms: f32,
    /// Frames per round before the runner gives up on it
    pub max_ticks: u32,
    /// Number of AI rivals (0 up to the roster size)
    pub rivals: usize,
    /// Seed for rival jitter and speed spread, entropy when unset
    pub seed: Option<u64>,
    /// Track text file to race on instead of level 1
    pub track_path: Option<PathBuf>,
    /// Rounds to run back to back
    pub rounds: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            max_ticks: 7200,
            rivals: 3,
            seed: None,
            track_path: None,
            rounds: 1,
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Bad values are logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tick) = lookup("DERBY_TICK_MS") {
            match tick.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed <= 250.0 => config.tick_ms = parsed,
                Ok(_) => tracing::warn!("DERBY_TICK_MS must be in (0, 250], using default"),
                Err(_) => tracing::warn!("Invalid DERBY_TICK_MS '{}', using default", tick),
            }
        }

        if let Some(max_ticks) = lookup("DERBY_MAX_TICKS") {
            match max_ticks.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.max_ticks = parsed,
                Ok(_) => tracing::warn!("DERBY_MAX_TICKS must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid DERBY_MAX_TICKS '{}', using default", max_ticks),
            }
        }

        if let Some(rivals) = lookup("DERBY_RIVALS") {
            match rivals.parse::<usize>() {
                Ok(parsed) if parsed <= ROSTER.len() => config.rivals = parsed,
                Ok(_) => tracing::warn!("DERBY_RIVALS must be 0-{}, using default", ROSTER.len()),
                Err(_) => tracing::warn!("Invalid DERBY_RIVALS '{}', using default", rivals),
            }
        }

        if let Some(seed) = lookup("DERBY_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid DERBY_SEED '{}', using entropy", seed);
            }
        }

        if let Some(path) = lookup("DERBY_TRACK") {
            if !path.trim().is_empty() {
                config.track_path = Some(PathBuf::from(path));
            }
        }

        if let Some(rounds) = lookup("DERBY_ROUNDS") {
            match rounds.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.rounds = parsed,
                Ok(_) => tracing::warn!("DERBY_ROUNDS must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid DERBY_ROUNDS '{}', using default", rounds),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tick_ms > 0.0 && self.tick_ms <= 250.0) {
            return Err("tick_ms must be in (0, 250]".to_string());
        }
        if self.max_ticks == 0 {
            return Err("max_ticks must be at least 1".to_string());
        }
        if self.rivals > ROSTER.len() {
            return Err(format!("rivals cannot exceed the roster of {}", ROSTER.len()));
        }
        if self.rounds == 0 {
            return Err("rounds must be at least 1".to_string());
        }
        Ok(())
    }
}
