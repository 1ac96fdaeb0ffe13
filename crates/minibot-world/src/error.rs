//! This module defines the error types used by the `minibot-world` crate.

#![warn(missing_docs)]

use minibot_kinematics::KinematicsError;
use thiserror::Error;

use crate::radar::Observation;

/// What is wrong with a raw map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapDefect {
    /// The map has no rows, or its first row is empty.
    #[error("map has no tiles")]
    Empty,
    /// A row differs in length from the first row.
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A character outside the map legend.
    #[error("unknown tile {ch:?} at row {row}, column {col}")]
    UnknownTile {
        /// Row of the character.
        row: usize,
        /// Column of the character.
        col: usize,
        /// The character itself.
        ch: char,
    },
    /// No `S` tile.
    #[error("map has no start tile")]
    MissingStart,
    /// More than one `S` tile.
    #[error("map has {0} start tiles, expected exactly one")]
    MultipleStarts(usize),
}

/// Error type for world operations.
///
/// Map errors surface at load time only. Per-step geometry never fails.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A raw map could not be normalized.
    #[error("invalid map #{index}: {defect}")]
    InvalidMap {
        /// Position of the map in the set being loaded.
        index: usize,
        /// What is wrong with it.
        defect: MapDefect,
    },
    /// Pose search exhausted every candidate without reproducing the observation.
    #[error("no pose in the map set reproduces the observation:\n{observation}")]
    UnreachableState {
        /// The observation that could not be matched.
        observation: Observation,
    },
    /// An observation of the wrong size was handed to pose search.
    #[error("observation side is {actual}, radar produces {expected}")]
    ObservationShape {
        /// Side length produced by the radar.
        expected: usize,
        /// Side length received.
        actual: usize,
    },
    /// Radar parameters out of range.
    #[error("invalid radar configuration: {0}")]
    InvalidRadar(&'static str),
    /// A session needs at least one map.
    #[error("map set is empty")]
    EmptyMapSet,
    /// A map index outside the set.
    #[error("map index {index} out of range for {len} maps")]
    MapIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of maps available.
        len: usize,
    },
    /// Full-power travel too long for wall collision to be resolved in one step.
    #[error("max action distance {max_action_distance} must be below {limit} tiles")]
    StepTooLong {
        /// Requested travel per step.
        max_action_distance: f64,
        /// Exclusive upper bound.
        limit: f64,
    },
    /// Invalid drive geometry.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}
