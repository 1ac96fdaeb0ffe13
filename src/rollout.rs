use std::sync::Arc;
use std::thread;

use anyhow::{Context, anyhow};
use minibot_world::{MapSet, MotorCommand, SimSession, SimulatorConfig, TileType, WorldError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::blackboard::{Blackboard, EpisodeEnd, raise_fault, record_episode};
use crate::config::RolloutConfig;

/// Moves made before the pose search demonstration samples an observation.
const DEMO_MOVES: usize = 4;

const FORWARD: MotorCommand = MotorCommand { left: 1.0, right: 1.0 };
const TURN_LEFT: MotorCommand = MotorCommand { left: -1.0, right: 1.0 };
const TURN_RIGHT: MotorCommand = MotorCommand { left: 1.0, right: -1.0 };

/// Runs one episode under a uniformly random motor policy.
///
/// Returns how it ended and the number of steps taken.
pub fn run_episode<R: Rng + ?Sized>(
    session: &mut SimSession,
    rng: &mut R,
    max_steps: usize,
) -> (EpisodeEnd, usize) {
    for step in 1..=max_steps {
        let outcome = session.step(random_command(rng));
        if outcome.terminal {
            let end = if outcome.tile == TileType::Goal {
                EpisodeEnd::Goal
            } else {
                EpisodeEnd::Hole
            };
            return (end, step);
        }
    }
    (EpisodeEnd::Timeout, max_steps)
}

fn random_command<R: Rng + ?Sized>(rng: &mut R) -> MotorCommand {
    MotorCommand::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
}

fn run_worker(
    worker: usize,
    maps: Arc<MapSet>,
    simulator: &SimulatorConfig,
    rollout: &RolloutConfig,
    bb: &Blackboard,
) -> Result<(), WorldError> {
    let mut session = SimSession::new(maps, simulator)?;
    let mut rng = StdRng::seed_from_u64(rollout.seed.wrapping_add(worker as u64));

    for episode in 0..rollout.episodes_per_worker {
        session.reset(&mut rng);
        let map = session.map_index();
        let (end, steps) = run_episode(&mut session, &mut rng, rollout.max_steps);
        record_episode(bb, end, steps);
        debug!(worker, episode, map, ?end, steps, "Episode finished");
    }
    info!(worker, episodes = rollout.episodes_per_worker, "Rollout worker finished");
    Ok(())
}

/// Runs `rollout.workers` threads, each driving its own session over the
/// shared map set, and waits for all of them.
pub fn run_workers(
    maps: &Arc<MapSet>,
    simulator: &SimulatorConfig,
    rollout: &RolloutConfig,
    bb: &Blackboard,
) -> anyhow::Result<()> {
    info!(workers = rollout.workers, "Spawning rollout workers...");
    let handles = (0..rollout.workers)
        .map(|worker| {
            let maps = Arc::clone(maps);
            let simulator = simulator.clone();
            let rollout = rollout.clone();
            let bb = Arc::clone(bb);
            thread::Builder::new()
                .name(format!("rollout-{worker}"))
                .spawn(move || {
                    let result = run_worker(worker, maps, &simulator, &rollout, &bb);
                    if let Err(e) = &result {
                        error!(worker, "Rollout worker failed: {}", e);
                        raise_fault(&bb, &format!("rollout-{worker}: {e}"));
                    }
                    result
                })
                .with_context(|| format!("failed to spawn rollout-{worker}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Join every worker before reporting the first failure.
    let mut failure = None;
    for (worker, handle) in handles.into_iter().enumerate() {
        let result = match handle.join() {
            Ok(result) => result.with_context(|| format!("rollout-{worker} failed")),
            Err(_) => Err(anyhow!("rollout-{worker} panicked")),
        };
        if let Err(e) = result {
            failure.get_or_insert(e);
        }
    }
    failure.map_or(Ok(()), Err)
}

/// Drives a session through a few random quarter turns and two-step moves,
/// then recovers a state consistent with the resulting observation from the
/// observation alone.
pub fn demonstrate_search<R: Rng + ?Sized>(
    maps: &Arc<MapSet>,
    simulator: &SimulatorConfig,
    rng: &mut R,
) -> anyhow::Result<()> {
    let mut source = SimSession::new(Arc::clone(maps), simulator)?;
    source.reset(rng);
    for _ in 0..DEMO_MOVES {
        let (command, repeat) = match rng.random_range(0..3) {
            0 => (TURN_LEFT, 3),
            1 => (TURN_RIGHT, 3),
            _ => (FORWARD, 2),
        };
        for _ in 0..repeat {
            source.step(command);
        }
    }
    let observation = source.observation();
    info!(map = source.map_index(), pose = %source.pose(), "Observation to recover:\n{}", observation);

    let mut restored = SimSession::new(Arc::clone(maps), simulator)?;
    restored
        .reset_to_state(&observation, rng)
        .context("pose search could not reproduce the observation")?;
    info!(
        map = restored.map_index(),
        pose = %restored.pose(),
        "Recovered a consistent state"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::snapshot;

    fn maps() -> Arc<MapSet> {
        Arc::new(MapSet::builtin().unwrap())
    }

    #[test]
    fn test_run_episode_stops_at_max_steps() {
        // No goal or hole reachable: every episode times out.
        let maps = Arc::new(MapSet::from_rows([["S.", ".."]]).unwrap());
        let mut session = SimSession::new(maps, &SimulatorConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(run_episode(&mut session, &mut rng, 30), (EpisodeEnd::Timeout, 30));
    }

    #[test]
    fn test_run_episode_reaches_adjacent_goal() {
        let maps = Arc::new(MapSet::from_rows([["G", "S"]]).unwrap());
        let mut session = SimSession::new(maps, &SimulatorConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (end, steps) = run_episode(&mut session, &mut rng, 10_000);
        assert_eq!(end, EpisodeEnd::Goal);
        assert!(steps >= 3);
    }

    #[test]
    fn test_run_workers_records_every_episode() {
        let bb: Blackboard = Arc::default();
        let rollout = RolloutConfig {
            workers: 3,
            episodes_per_worker: 4,
            max_steps: 20,
            seed: 5,
        };
        run_workers(&maps(), &SimulatorConfig::default(), &rollout, &bb).unwrap();
        let state = snapshot(&bb);
        assert_eq!(state.episodes, 12);
        assert_eq!(state.goals + state.holes + state.timeouts, 12);
        assert!(state.faults.is_empty());
    }

    #[test]
    fn test_run_workers_reports_invalid_simulator() {
        let bb: Blackboard = Arc::default();
        let simulator = SimulatorConfig { radar_resolution: 0.0, ..SimulatorConfig::default() };
        let rollout = RolloutConfig { workers: 2, ..RolloutConfig::default() };
        assert!(run_workers(&maps(), &simulator, &rollout, &bb).is_err());
        assert_eq!(snapshot(&bb).faults.len(), 2);
    }

    #[test]
    fn test_demonstrate_search() {
        let mut rng = StdRng::seed_from_u64(9);
        demonstrate_search(&maps(), &SimulatorConfig::default(), &mut rng).unwrap();
    }
}
