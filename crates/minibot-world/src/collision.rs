//! Position correction for moves that end inside a wall.
//!
//! Only walls block (points outside the map read as walls). Holes and the
//! goal are entered normally and end the episode instead. Heading is never
//! touched: a blocked agent still turns.

use minibot_kinematics::{Pose, Vector2};
use tracing::debug;

use crate::map::{TileMap, TileType};

/// How far short of a tile boundary a blocked agent stops.
pub const BOUNDARY_EPSILON: f64 = 0.01;

/// Exclusive bound on the travel of one step, in tiles. Below it a move
/// crosses at most one boundary per axis, which is all [`resolve`] handles.
pub const MAX_STEP_DISTANCE: f64 = 0.5;

/// The kind of wall impact, keyed on which tile coordinates changed and
/// which of the two corner-adjacent tiles are walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// The move stayed within one tile; only reachable from inside a wall.
    Inside,
    /// Only the x tile changed.
    AxisX,
    /// Only the y tile changed.
    AxisY,
    /// Diagonal move with both corner-adjacent tiles free.
    DiagonalGap,
    /// Diagonal move, the tile beside along x is a wall.
    CornerX,
    /// Diagonal move, the tile beside along y is a wall.
    CornerY,
    /// Diagonal move into a concave corner.
    Concave,
}

impl Impact {
    /// Decision table over `(dtx, dty, ew_wall, ns_wall)`.
    pub fn classify(dtx: bool, dty: bool, ew_wall: bool, ns_wall: bool) -> Self {
        match (dtx, dty, ew_wall, ns_wall) {
            (false, false, _, _) => Impact::Inside,
            (true, false, _, _) => Impact::AxisX,
            (false, true, _, _) => Impact::AxisY,
            (true, true, false, false) => Impact::DiagonalGap,
            (true, true, true, false) => Impact::CornerX,
            (true, true, false, true) => Impact::CornerY,
            (true, true, true, true) => Impact::Concave,
        }
    }

    /// Which axes to clamp, given the fractions of the move at which the x
    /// and y tile boundaries are crossed.
    ///
    /// Through a diagonal gap, the axis crossed first is the one travelled
    /// cleanly, so the other one is clamped. Ties clamp y.
    pub fn clamped_axes(self, toi_x: f64, toi_y: f64) -> Clamp {
        match self {
            Impact::Inside => Clamp { x: false, y: false },
            Impact::AxisX | Impact::CornerX => Clamp { x: true, y: false },
            Impact::AxisY | Impact::CornerY => Clamp { x: false, y: true },
            Impact::DiagonalGap if toi_x <= toi_y => Clamp { x: false, y: true },
            Impact::DiagonalGap => Clamp { x: true, y: false },
            Impact::Concave => Clamp { x: true, y: true },
        }
    }
}

/// Axes on which the position is pulled back to the tile boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamp {
    /// Clamp the x coordinate.
    pub x: bool,
    /// Clamp the y coordinate.
    pub y: bool,
}

fn tile_center(position: Vector2) -> Vector2 {
    Vector2::new(position.x.round(), position.y.round())
}

fn is_wall(map: &TileMap, position: Vector2) -> bool {
    map.tile_at(position) == TileType::Wall
}

/// Coordinate just short of the boundary between two adjacent tiles.
fn boundary(t0: f64, t1: f64) -> f64 {
    (t0 + t1) / 2.0 - BOUNDARY_EPSILON * (t1 - t0).signum()
}

/// Fraction of the move `from -> to` at which the boundary between tiles
/// `t0` and `t1` is crossed.
fn time_of_impact(from: f64, to: f64, t0: f64, t1: f64) -> f64 {
    ((t0 + t1) / 2.0 - from) / (to - from)
}

/// Corrects `proposed` so that it does not end inside a wall.
///
/// `pose0` is the pose before the move; it is expected not to be inside a
/// wall itself, and to be less than [`MAX_STEP_DISTANCE`] away from
/// `proposed`, so both are in the same or in neighbouring tiles.
pub fn resolve(pose0: &Pose, proposed: &Pose, map: &TileMap) -> Pose {
    let p0 = pose0.position();
    let p1 = proposed.position();
    if !is_wall(map, p1) {
        return *proposed;
    }

    let t0 = tile_center(p0);
    let t1 = tile_center(p1);
    let dtx = t0.x != t1.x;
    let dty = t0.y != t1.y;
    let ew_wall = is_wall(map, Vector2::new(t1.x, t0.y));
    let ns_wall = is_wall(map, Vector2::new(t0.x, t1.y));

    let impact = Impact::classify(dtx, dty, ew_wall, ns_wall);
    let clamp = match impact {
        Impact::DiagonalGap => impact.clamped_axes(
            time_of_impact(p0.x, p1.x, t0.x, t1.x),
            time_of_impact(p0.y, p1.y, t0.y, t1.y),
        ),
        _ => impact.clamped_axes(0.0, 0.0),
    };

    let x = if clamp.x { boundary(t0.x, t1.x) } else { p1.x };
    let y = if clamp.y { boundary(t0.y, t1.y) } else { p1.y };
    let corrected = Vector2::new(x, y);
    debug!(?impact, from = %p0, blocked = %p1, to = %corrected, "Wall collision");
    proposed.with_position(corrected)
}
