use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use distro_derby::config::SimConfig;
use distro_derby::game::game_loop::Race;
use distro_derby::game::race_result::format_time;
use distro_derby::game::track::{self, TrackGrid};
use distro_derby::sim::HeadlessSession;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Distro Derby v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: tick={}ms, rivals={}, rounds={}, seed={:?}",
        config.tick_ms, config.rivals, config.rounds, config.seed
    );

    let track = match &config.track_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading track {}", path.display()))?;
            TrackGrid::parse(&text).with_context(|| format!("parsing track {}", path.display()))?
        }
        None => track::level_1()?,
    };
    let (width, height) = track.dimensions();
    info!("Track {}x{} with {} wall bodies", width, height, track.wall_bodies().len());

    let race = Race::new(track, track::level_1_waypoints(), config.rivals, config.seed)?;
    let mut session = HeadlessSession::new(race, config.tick_ms);

    for round in 1..=config.rounds {
        if round > 1 {
            session.restart();
        }

        let outcome = session.run_round(config.max_ticks);
        match &outcome.result {
            Some(result) => {
                info!(
                    "Round {} over after {} ticks, player rank {}, {} impacts",
                    outcome.round, outcome.ticks, result.player_rank, outcome.impacts
                );
                if let Some(best) = outcome.new_best_ms {
                    info!("New best time {}", format_time(best));
                }
                for line in result.lines() {
                    println!("{}", line);
                }
            }
            None => warn!("Round {} did not finish within {} ticks", outcome.round, outcome.ticks),
        }
    }

    let snapshot = session.race().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
