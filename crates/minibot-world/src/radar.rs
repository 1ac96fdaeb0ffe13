//! Grid "radar" around the agent.
//!
//! The radar samples obstacle presence on a square lattice centered on the
//! agent and rotated with it. Row 0 of an [`Observation`] is the row furthest
//! ahead of the agent, column 0 the leftmost one.

use minibot_kinematics::{Pose, Vector2};

use crate::error::WorldError;
use crate::map::TileMap;

/// Default number of samples on each side of the agent.
pub const DEFAULT_RADAR_RANGE: usize = 2;
/// Default spacing between two samples.
pub const DEFAULT_RADAR_RESOLUTION: f64 = 1.0;

/// Radar parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadarConfig {
    /// Samples on each side of the agent, per axis.
    pub range: usize,
    /// Distance between neighbouring samples.
    pub resolution: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        RadarConfig {
            range: DEFAULT_RADAR_RANGE,
            resolution: DEFAULT_RADAR_RESOLUTION,
        }
    }
}

impl RadarConfig {
    /// Side length of the observation, `2 * range + 1`.
    pub fn side(&self) -> usize {
        2 * self.range + 1
    }
}

/// A square bit matrix of obstacle samples, row-major, in the agent's frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    side: usize,
    cells: Vec<u8>,
}

impl Observation {
    /// Builds an observation from its rows; every non-zero value counts as an obstacle.
    ///
    /// # Errors
    /// Returns `WorldError::ObservationShape` when the rows do not form a square.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        let rows: Vec<R> = rows.into_iter().collect();
        let side = rows.len();
        let mut cells = Vec::with_capacity(side * side);
        for row in &rows {
            let row = row.as_ref();
            if row.len() != side {
                return Err(WorldError::ObservationShape { expected: side, actual: row.len() });
            }
            cells.extend(row.iter().map(|&v| u8::from(v != 0)));
        }
        Ok(Observation { side, cells })
    }

    /// Side length.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Sample at `(row, col)`, or `None` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        (row < self.side && col < self.side).then(|| self.cells[row * self.side + col])
    }

    /// All samples, row-major.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Iterates the rows, front to back.
    pub fn rows(&self) -> std::slice::Chunks<'_, u8> {
        self.cells.chunks(self.side.max(1))
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Sensor model. Sample offsets are computed once per radar.
#[derive(Debug, Clone)]
pub struct Radar {
    config: RadarConfig,
    offsets: Vec<Vector2>,
}

impl Radar {
    /// Creates a radar.
    ///
    /// # Errors
    /// Returns `WorldError::InvalidRadar` if the resolution is not positive and finite.
    pub fn new(config: RadarConfig) -> Result<Self, WorldError> {
        if !(config.resolution > 0.0 && config.resolution.is_finite()) {
            return Err(WorldError::InvalidRadar("resolution must be positive and finite"));
        }
        let range = config.range as isize;
        let offsets = (-range..=range)
            .rev()
            .flat_map(|forward| {
                (-range..=range).map(move |lateral| {
                    Vector2::new(lateral as f64 * config.resolution, forward as f64 * config.resolution)
                })
            })
            .collect();
        Ok(Radar { config, offsets })
    }

    /// The radar parameters.
    pub fn config(&self) -> RadarConfig {
        self.config
    }

    /// Side length of the observations this radar produces.
    pub fn side(&self) -> usize {
        self.config.side()
    }

    /// Samples obstacle presence around `pose`. Points outside the map count
    /// as obstacles.
    pub fn sample(&self, pose: &Pose, map: &TileMap) -> Observation {
        let position = pose.position();
        let cells = self
            .offsets
            .iter()
            .map(|offset| u8::from(map.obstacle_at(offset.rotated(pose.theta) + position)))
            .collect();
        Observation {
            side: self.side(),
            cells,
        }
    }
}
