//! Map-related functionality.
//!
//! This module provides the canonical tile grid, its derived obstacle grid,
//! the row/column ↔ world coordinate transforms and the map sets a
//! simulator draws its episodes from.

pub mod map_set;
pub mod point_types;
pub mod tile_map;

pub use map_set::{BUILTIN_MAPS, MapSet};
pub use point_types::GridPoint;
pub use tile_map::{TileMap, TileType, to_obstacle_grid};
