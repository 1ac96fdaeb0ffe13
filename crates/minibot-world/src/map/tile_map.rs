#![warn(missing_docs)]

use minibot_kinematics::Vector2;

use super::GridPoint;
use crate::error::MapDefect;

/// Canonical type of a map tile.
///
/// Raw legend characters are mapped onto these once, at load time; geometry
/// code only ever matches on this enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileType {
    /// Free space (`.`, ` `, `F`).
    Free,
    /// Impassable wall (`W`, `X`, `#`). Also returned for points outside the map.
    Wall,
    /// Hole (`H`, `O`); entering one ends the episode.
    Hole,
    /// Starting tile (`S`), free otherwise.
    Start,
    /// Goal tile (`G`); entering it ends the episode.
    Goal,
}

impl TileType {
    /// Parses a legend character, case-insensitively.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            '.' | ' ' | 'F' => Some(TileType::Free),
            'W' | 'X' | '#' => Some(TileType::Wall),
            'H' | 'O' => Some(TileType::Hole),
            'S' => Some(TileType::Start),
            'G' => Some(TileType::Goal),
            _ => None,
        }
    }

    /// Canonical legend character.
    pub fn as_char(self) -> char {
        match self {
            TileType::Free => '.',
            TileType::Wall => '#',
            TileType::Hole => 'O',
            TileType::Start => 'S',
            TileType::Goal => 'G',
        }
    }

    /// Walls and holes are obstacles for the radar.
    pub fn is_obstacle(self) -> bool {
        matches!(self, TileType::Wall | TileType::Hole)
    }

    /// Tiles that end an episode when entered.
    pub fn is_terminal(self) -> bool {
        matches!(self, TileType::Hole | TileType::Goal)
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileType::Free => "Free",
            TileType::Wall => "Wall",
            TileType::Hole => "Hole",
            TileType::Start => "Start",
            TileType::Goal => "Goal",
        };
        f.write_str(name)
    }
}

/// Derives the binary obstacle grid of a tile grid.
pub fn to_obstacle_grid(tiles: &[TileType]) -> Vec<bool> {
    tiles.iter().map(|t| t.is_obstacle()).collect()
}

/// An immutable tile grid with its derived obstacle grid.
///
/// World coordinates put tile centers on integer points: column `c`, row `r`
/// sits at `x = c`, `y = height - r - 1`, so y grows northwards and row 0
/// is the top of the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
    obstacles: Vec<bool>,
    start: GridPoint,
}

impl TileMap {
    /// Normalizes raw map rows into a canonical tile grid.
    ///
    /// # Errors
    /// Returns a [`MapDefect`] when the map is empty, rows are ragged, a
    /// character is outside the legend, or there is not exactly one start tile.
    pub fn parse<I, R>(rows: I) -> Result<Self, MapDefect>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let mut width = None;
        let mut height = 0;
        let mut tiles = Vec::new();
        let mut starts = Vec::new();
        for (row, raw) in rows.into_iter().enumerate() {
            let raw = raw.as_ref();
            let actual = raw.chars().count();
            let expected = *width.get_or_insert(actual);
            if actual != expected {
                return Err(MapDefect::RaggedRow { row, expected, actual });
            }
            for (col, ch) in raw.chars().enumerate() {
                let tile = TileType::from_char(ch).ok_or(MapDefect::UnknownTile { row, col, ch })?;
                if tile == TileType::Start {
                    starts.push(GridPoint::new(row as isize, col as isize));
                }
                tiles.push(tile);
            }
            height += 1;
        }

        let width = width.unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapDefect::Empty);
        }

        let start = match starts.as_slice() {
            [] => return Err(MapDefect::MissingStart),
            [single] => *single,
            many => return Err(MapDefect::MultipleStarts(many.len())),
        };

        let obstacles = to_obstacle_grid(&tiles);
        Ok(TileMap { width, height, tiles, obstacles, start })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Canonical tiles, row-major.
    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    /// Obstacle grid, row-major, `true` on walls and holes.
    pub fn obstacle_grid(&self) -> &[bool] {
        &self.obstacles
    }

    /// The start tile.
    pub fn start(&self) -> GridPoint {
        self.start
    }

    /// World position of the start tile center.
    pub fn start_position(&self) -> Vector2 {
        self.rc_to_xy(self.start)
    }

    fn index(&self, p: GridPoint) -> Option<usize> {
        let in_bounds = p.row >= 0
            && p.col >= 0
            && (p.row as usize) < self.height
            && (p.col as usize) < self.width;
        in_bounds.then(|| p.row as usize * self.width + p.col as usize)
    }

    /// Tile at a grid point; anything outside the map reads as a wall.
    pub fn tile(&self, p: GridPoint) -> TileType {
        self.index(p).map_or(TileType::Wall, |i| self.tiles[i])
    }

    /// Obstacle flag at a grid point; anything outside the map is an obstacle.
    pub fn is_obstacle(&self, p: GridPoint) -> bool {
        self.index(p).is_none_or(|i| self.obstacles[i])
    }

    /// Center of a tile in world coordinates.
    pub fn rc_to_xy(&self, p: GridPoint) -> Vector2 {
        Vector2::new(p.col as f64, (self.height as isize - p.row - 1) as f64)
    }

    /// Tile containing a world point, rounding to the nearest tile center.
    ///
    /// Coordinates too large for `isize` saturate, and non-finite positions
    /// map to a point outside the grid; both read as walls.
    pub fn xy_to_rc(&self, position: Vector2) -> GridPoint {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return GridPoint::new(-1, -1);
        }
        let x = position.x.round() as isize;
        let y = position.y.round() as isize;
        GridPoint::new((self.height as isize - 1).saturating_sub(y), x)
    }

    /// Tile type under a world point.
    pub fn tile_at(&self, position: Vector2) -> TileType {
        self.tile(self.xy_to_rc(position))
    }

    /// Obstacle flag under a world point.
    pub fn obstacle_at(&self, position: Vector2) -> bool {
        self.is_obstacle(self.xy_to_rc(position))
    }

    /// Every tile with its world-frame center, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (TileType, Vector2)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| {
                let p = GridPoint::new(row as isize, col as isize);
                (self.tiles[row * self.width + col], self.rc_to_xy(p))
            })
        })
    }
}

impl std::fmt::Display for TileMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.tiles.chunks(self.width) {
            let line: String = row.iter().map(|t| t.as_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_normalizes_legend() {
        let map = TileMap::parse(&["sF#", "x O", "hg."]).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(
            map.tiles(),
            &[
                TileType::Start,
                TileType::Free,
                TileType::Wall,
                TileType::Wall,
                TileType::Free,
                TileType::Hole,
                TileType::Hole,
                TileType::Goal,
                TileType::Free,
            ]
        );
        assert_eq!(map.start(), GridPoint::new(0, 0));
        assert_eq!(map.to_string(), "S.#\n#.O\nOG.\n");
    }

    #[test]
    fn test_obstacle_grid_follows_tiles() {
        let map = TileMap::parse(&["S#", "OG"]).unwrap();
        assert_eq!(map.obstacle_grid(), &[false, true, true, false]);
        assert_eq!(to_obstacle_grid(map.tiles()), map.obstacle_grid());
    }

    #[test]
    fn test_invalid_maps() {
        let empty: [&str; 0] = [];
        assert_eq!(TileMap::parse(&empty), Err(MapDefect::Empty));
        assert_eq!(TileMap::parse(&[""]), Err(MapDefect::Empty));
        assert_eq!(
            TileMap::parse(&["S..", ".."]),
            Err(MapDefect::RaggedRow { row: 1, expected: 3, actual: 2 })
        );
        assert_eq!(
            TileMap::parse(&["S.", ".?"]),
            Err(MapDefect::UnknownTile { row: 1, col: 1, ch: '?' })
        );
        assert_eq!(TileMap::parse(&["..", ".."]), Err(MapDefect::MissingStart));
        assert_eq!(TileMap::parse(&["S.", ".s"]), Err(MapDefect::MultipleStarts(2)));
    }

    #[test]
    fn test_coordinate_conversion() {
        let map = TileMap::parse(&["....", "....", "S..."]).unwrap();
        // Bottom-left tile is the world origin.
        assert_eq!(map.start_position(), Vector2::new(0.0, 0.0));
        assert_eq!(map.rc_to_xy(GridPoint::new(0, 3)), Vector2::new(3.0, 2.0));
        assert_eq!(map.xy_to_rc(Vector2::new(2.6, 0.4)), GridPoint::new(2, 3));
        assert_eq!(map.xy_to_rc(Vector2::new(-0.6, 2.4)), GridPoint::new(0, -1));
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let map = TileMap::parse(&["S."]).unwrap();
        assert_eq!(map.tile_at(Vector2::new(-1.0, 0.0)), TileType::Wall);
        assert_eq!(map.tile_at(Vector2::new(0.0, 1.0)), TileType::Wall);
        assert_eq!(map.tile_at(Vector2::new(2.0, 0.0)), TileType::Wall);
        assert!(map.obstacle_at(Vector2::new(0.0, -0.7)));
        assert_eq!(map.tile_at(Vector2::new(1.3, 0.2)), TileType::Free);
        assert!(!map.obstacle_at(Vector2::new(0.1, 0.0)));
    }

    #[test]
    fn test_far_and_non_finite_points_are_walls() {
        let map = TileMap::parse(&["S."]).unwrap();
        for position in [
            Vector2::new(0.0, -1e30),
            Vector2::new(0.0, 1e30),
            Vector2::new(-1e30, 0.0),
            Vector2::new(1e300, -1e300),
            Vector2::new(f64::NAN, 0.0),
            Vector2::new(0.0, f64::INFINITY),
        ] {
            assert_eq!(map.tile_at(position), TileType::Wall, "at {}", position);
            assert!(map.obstacle_at(position));
        }
    }

    #[test]
    fn test_cells_are_row_major() {
        let map = TileMap::parse(&["G.", "S#"]).unwrap();
        let cells: Vec<_> = map.cells().collect();
        assert_eq!(cells[0], (TileType::Goal, Vector2::new(0.0, 1.0)));
        assert_eq!(cells[3], (TileType::Wall, Vector2::new(1.0, 0.0)));
    }

    proptest! {
        #[test]
        fn grid_world_round_trip(height in 1usize..12, width in 1usize..12, r in 0usize..12, c in 0usize..12) {
            let row = ".".repeat(width);
            let mut rows = vec![row; height];
            rows[0].replace_range(0..1, "S");
            let map = TileMap::parse(&rows).unwrap();
            let p = GridPoint::new((r % height) as isize, (c % width) as isize);
            prop_assert_eq!(map.xy_to_rc(map.rc_to_xy(p)), p);
        }
    }
}
