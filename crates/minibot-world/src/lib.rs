#![warn(missing_docs)]
#![doc = "Tile-map world for a differential-drive robot."]
#![doc = ""]
#![doc = "Maps, wall collision, the grid radar, state search from observations,"]
#![doc = "and the simulator session tying them to `minibot-kinematics`."]

pub mod collision;
pub mod error;
pub mod map;
pub mod radar;
pub mod search;
pub mod session;

pub use error::{MapDefect, WorldError};
pub use map::{BUILTIN_MAPS, GridPoint, MapSet, TileMap, TileType};
pub use radar::{Observation, Radar, RadarConfig};
pub use search::Candidate;
pub use session::{SimSession, SimulatorConfig, StepOutcome};

pub use minibot_kinematics::{DifferentialDrive, MotorCommand, Pose, Vector2};
