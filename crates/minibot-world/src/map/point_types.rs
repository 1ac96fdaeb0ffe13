/// Represents a tile in grid coordinates.
///
/// Indices are signed so that points just outside the map (which read as
/// walls) can still be represented.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// Row index, growing southwards.
    pub row: isize,
    /// Column index, growing eastwards.
    pub col: isize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[r{}, c{}]", self.row, self.col)
    }
}
