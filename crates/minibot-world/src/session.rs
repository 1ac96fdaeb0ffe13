//! One simulated robot driving around one map of a shared map set.

use std::sync::Arc;

use minibot_kinematics::{
    DEFAULT_AGENT_WIDTH, DEFAULT_MAX_ACTION_DISTANCE, DifferentialDrive, MotorCommand, Pose,
};
use rand::Rng;
use tracing::{debug, info};

use crate::collision::{self, MAX_STEP_DISTANCE};
use crate::error::WorldError;
use crate::map::{MapSet, TileMap, TileType};
use crate::radar::{DEFAULT_RADAR_RANGE, DEFAULT_RADAR_RESOLUTION, Observation, Radar, RadarConfig};
use crate::search;

/// Construction parameters of a [`SimSession`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SimulatorConfig {
    /// Radar samples on each side of the agent.
    pub radar_range: usize,
    /// Spacing between radar samples.
    pub radar_resolution: f64,
    /// Snap motor powers to `{-1, 0, 1}` before moving.
    pub discretized: bool,
    /// Wheel separation.
    pub agent_width: f64,
    /// Travel per step at full power.
    pub max_action_distance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            radar_range: DEFAULT_RADAR_RANGE,
            radar_resolution: DEFAULT_RADAR_RESOLUTION,
            discretized: true,
            agent_width: DEFAULT_AGENT_WIDTH,
            max_action_distance: DEFAULT_MAX_ACTION_DISTANCE,
        }
    }
}

/// Result of a single step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Pose after the move and collision correction.
    pub pose: Pose,
    /// Radar reading at the new pose.
    pub observation: Observation,
    /// Tile under the agent.
    pub tile: TileType,
    /// Whether the tile ends the episode (goal or hole).
    pub terminal: bool,
}

/// Simulation state of one agent.
///
/// The map set is shared read-only; the pose and the current map index are
/// owned by the session, so independent sessions can run on separate threads.
#[derive(Debug, Clone)]
pub struct SimSession {
    maps: Arc<MapSet>,
    drive: DifferentialDrive,
    radar: Radar,
    discretized: bool,
    map_index: usize,
    pose: Pose,
}

impl SimSession {
    /// Creates a session placed at the start of the first map.
    ///
    /// # Errors
    /// Fails on an empty map set, invalid radar parameters, invalid drive
    /// geometry, or a `max_action_distance` of half a tile or more.
    pub fn new(maps: Arc<MapSet>, config: &SimulatorConfig) -> Result<Self, WorldError> {
        if maps.is_empty() {
            return Err(WorldError::EmptyMapSet);
        }
        let drive = DifferentialDrive::new(config.agent_width, config.max_action_distance)?;
        if drive.max_action_distance() >= MAX_STEP_DISTANCE {
            return Err(WorldError::StepTooLong {
                max_action_distance: drive.max_action_distance(),
                limit: MAX_STEP_DISTANCE,
            });
        }
        let radar = Radar::new(RadarConfig {
            range: config.radar_range,
            resolution: config.radar_resolution,
        })?;
        let pose = start_pose(&maps[0]);
        Ok(SimSession {
            maps,
            drive,
            radar,
            discretized: config.discretized,
            map_index: 0,
            pose,
        })
    }

    /// Starts an episode on a uniformly chosen map, at its start tile, facing north.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Observation {
        let index = rng.random_range(0..self.maps.len());
        self.place_at_start(index);
        self.observation()
    }

    /// Starts an episode on a given map.
    ///
    /// # Errors
    /// Returns `WorldError::MapIndexOutOfRange` for an unknown map.
    pub fn reset_on_map(&mut self, index: usize) -> Result<Observation, WorldError> {
        if index >= self.maps.len() {
            return Err(WorldError::MapIndexOutOfRange {
                index,
                len: self.maps.len(),
            });
        }
        self.place_at_start(index);
        Ok(self.observation())
    }

    fn place_at_start(&mut self, index: usize) {
        self.map_index = index;
        self.pose = start_pose(&self.maps[index]);
        info!(map = index, pose = %self.pose, "Episode reset");
    }

    /// Puts the session in some state that produces `observation`.
    ///
    /// # Errors
    /// Propagates the pose search failures; the session is left untouched then.
    pub fn reset_to_state<R: Rng + ?Sized>(
        &mut self,
        observation: &Observation,
        rng: &mut R,
    ) -> Result<Observation, WorldError> {
        let found = search::search(observation, &self.maps, &self.radar, rng)?;
        self.map_index = found.map_index;
        self.pose = found.pose;
        Ok(self.observation())
    }

    /// Applies one motor command.
    ///
    /// Powers are clamped to `[-1, 1]` (and discretized if configured), the
    /// move is corrected for walls, and the new pose is committed.
    pub fn step(&mut self, command: MotorCommand) -> StepOutcome {
        let command = MotorCommand::new(command.left, command.right);
        let command = if self.discretized { command.discretized() } else { command };

        let map = &self.maps[self.map_index];
        let proposed = self.drive.propose(self.pose, command);
        self.pose = collision::resolve(&self.pose, &proposed, map);

        let tile = map.tile_at(self.pose.position());
        let observation = self.radar.sample(&self.pose, map);
        debug!(%command, pose = %self.pose, %tile, "Step");
        StepOutcome {
            pose: self.pose,
            observation,
            tile,
            terminal: tile.is_terminal(),
        }
    }

    /// Radar reading at the current pose.
    pub fn observation(&self) -> Observation {
        self.radar.sample(&self.pose, self.current_map())
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Index of the current map in the shared set.
    pub fn map_index(&self) -> usize {
        self.map_index
    }

    /// The current map.
    pub fn current_map(&self) -> &TileMap {
        &self.maps[self.map_index]
    }

    /// The shared map set.
    pub fn maps(&self) -> &Arc<MapSet> {
        &self.maps
    }

    /// The radar.
    pub fn radar(&self) -> &Radar {
        &self.radar
    }
}

fn start_pose(map: &TileMap) -> Pose {
    let start = map.start_position();
    Pose::new(start.x, start.y, 0.0)
}
