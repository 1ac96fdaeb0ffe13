mod blackboard;   // brings `blackboard.rs` in as `crate::blackboard`
mod config;       // brings `config.rs` in as `crate::config`
mod rollout;      // brings `rollout.rs` in as `crate::rollout`

use std::sync::Arc;

use anyhow::Context;
use minibot_world::MapSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use blackboard::{Blackboard, snapshot};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Minibot simulator started.");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let app = config::load_config(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    let builtin = MapSet::builtin().context("built-in maps are invalid")?;
    let maps = match &app.maps {
        Some(indices) => builtin.select(indices).context("invalid `maps` selection")?,
        None => builtin,
    };
    let maps = Arc::new(maps);
    for (index, map) in maps.iter().enumerate() {
        debug!(map = index, "Loaded map:\n{}", map);
    }

    let bb: Blackboard = Arc::default();
    rollout::run_workers(&maps, &app.simulator, &app.rollout, &bb)?;

    let totals = snapshot(&bb);
    info!(
        episodes = totals.episodes,
        goals = totals.goals,
        holes = totals.holes,
        timeouts = totals.timeouts,
        steps = totals.steps,
        goal_rate = totals.goal_rate(),
        "Rollouts finished."
    );

    let mut rng = StdRng::seed_from_u64(app.rollout.seed);
    if let Err(e) = rollout::demonstrate_search(&maps, &app.simulator, &mut rng) {
        warn!("Pose search demonstration failed: {:#}", e);
    }

    Ok(())
}
