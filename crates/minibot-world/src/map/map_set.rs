use std::ops::Index;

use tracing::debug;

use super::TileMap;
use crate::error::WorldError;

/// Reference maps. The comments give the shortest number of full-power
/// actions needed to reach the goal.
pub const BUILTIN_MAPS: [&[&str]; 3] = [
    &[
        "........", // min = 11 actions
        "........",
        "........",
        "........",
        "........",
        "...##...",
        "...##...",
        "..S##G..",
    ],
    &[
        "........", // min = 13 actions
        "........",
        "...##...",
        "...##...",
        "...##...",
        "...##...",
        "..S##G..",
        "...##...",
    ],
    &[
        "........", // min = 21 actions
        "........",
        "...###..",
        "..S###..",
        "...###..",
        "######..",
        "..G###..",
        "........",
    ],
];

/// An ordered, immutable collection of maps.
///
/// Built once and shared read-only (typically behind an `Arc`) by every
/// simulator session that draws episodes from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSet {
    maps: Vec<TileMap>,
}

impl MapSet {
    /// Parses every raw map.
    ///
    /// # Errors
    /// Returns `WorldError::InvalidMap` naming the first map that fails to parse.
    pub fn from_rows<I, M, R>(raw_maps: I) -> Result<Self, WorldError>
    where
        I: IntoIterator<Item = M>,
        M: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let maps = raw_maps
            .into_iter()
            .enumerate()
            .map(|(index, rows)| {
                TileMap::parse(rows).map_err(|defect| WorldError::InvalidMap { index, defect })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = maps.len(), "Loaded map set");
        Ok(MapSet { maps })
    }

    /// The reference maps.
    pub fn builtin() -> Result<Self, WorldError> {
        Self::from_rows(BUILTIN_MAPS)
    }

    /// A new set holding only the maps at `indices`, in that order.
    ///
    /// # Errors
    /// Returns `WorldError::MapIndexOutOfRange` for an index outside the set.
    pub fn select(&self, indices: &[usize]) -> Result<Self, WorldError> {
        let maps = indices
            .iter()
            .map(|&index| {
                self.maps
                    .get(index)
                    .cloned()
                    .ok_or(WorldError::MapIndexOutOfRange { index, len: self.maps.len() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MapSet { maps })
    }

    /// Number of maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether the set holds no maps.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&TileMap> {
        self.maps.get(index)
    }

    /// Iterates the maps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TileMap> {
        self.maps.iter()
    }
}

impl Index<usize> for MapSet {
    type Output = TileMap;

    fn index(&self, index: usize) -> &TileMap {
        &self.maps[index]
    }
}

impl From<Vec<TileMap>> for MapSet {
    fn from(maps: Vec<TileMap>) -> Self {
        MapSet { maps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapDefect;
    use crate::map::{GridPoint, TileType};

    #[test]
    fn test_builtin_maps_load() {
        let set = MapSet::builtin().unwrap();
        assert_eq!(set.len(), 3);
        for map in set.iter() {
            assert_eq!((map.width(), map.height()), (8, 8));
        }
        assert_eq!(set[0].start(), GridPoint::new(7, 2));
        assert_eq!(set[2].tile(GridPoint::new(6, 2)), TileType::Goal);
    }

    #[test]
    fn test_from_rows_reports_map_index() {
        let raw = vec![vec!["S."], vec!["S", "x."]];
        match MapSet::from_rows(raw) {
            Err(WorldError::InvalidMap { index, defect }) => {
                assert_eq!(index, 1);
                assert_eq!(defect, MapDefect::RaggedRow { row: 1, expected: 1, actual: 2 });
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_select() {
        let set = MapSet::builtin().unwrap();
        let picked = set.select(&[2, 0]).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], set[2]);
        assert_eq!(picked[1], set[0]);
        assert!(matches!(
            set.select(&[3]),
            Err(WorldError::MapIndexOutOfRange { index: 3, len: 3 })
        ));
    }
}
