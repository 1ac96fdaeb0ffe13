//! Recovering a state from an observation alone.
//!
//! The radar is many-to-one, so the search only promises *some* pose whose
//! observation equals the target. Candidates are enumerated lazily, map by
//! map, heading by heading, tile by tile, and the first exact match wins.
//! Round 1 tries tile centers only; round 2 adds sub-tile offsets.

use minibot_kinematics::{Pose, Vector2};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::error::WorldError;
use crate::map::{MapSet, TileType};
use crate::radar::{Observation, Radar};

/// Candidate headings in degrees: the four cardinal directions, then each
/// turned by 30 and by 60 degrees.
pub const CANDIDATE_HEADINGS_DEG: [f64; 12] = [
    0.0, 90.0, 180.0, 270.0, //
    30.0, 120.0, 210.0, 300.0, //
    60.0, 150.0, 240.0, 330.0,
];

/// Per-axis offsets from the tile center tried in round 1.
pub const ROUND_1_OFFSETS: &[f64] = &[0.0];

/// Per-axis offsets from the tile center tried in round 2 (25 combinations).
pub const ROUND_2_OFFSETS: &[f64] = &[-0.4, -0.2, 0.0, 0.2, 0.4];

/// Every `(dx, dy)` pair of per-axis offsets, x varying slowest.
pub fn offset_grid(axis: &[f64]) -> impl Iterator<Item = Vector2> + '_ {
    axis.iter()
        .flat_map(move |&dx| axis.iter().map(move |&dy| Vector2::new(dx, dy)))
}

/// Position offsets of both search rounds. Round 2 leaves out the pairs
/// round 1 already tried.
pub fn round_offsets() -> [Vec<Vector2>; 2] {
    let round_1: Vec<Vector2> = offset_grid(ROUND_1_OFFSETS).collect();
    let round_2 = offset_grid(ROUND_2_OFFSETS)
        .filter(|offset| !round_1.contains(offset))
        .collect();
    [round_1, round_2]
}

/// A pose on a particular map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index into the searched map set.
    pub map_index: usize,
    /// Pose on that map.
    pub pose: Pose,
}

/// Lazily enumerates every candidate of one search round.
///
/// Maps are visited in `order`; within a map, headings vary slowest, then
/// tiles (row-major, walls skipped), then `offsets` in their given order.
pub fn candidates<'a>(
    maps: &'a MapSet,
    order: &'a [usize],
    offsets: &'a [Vector2],
) -> impl Iterator<Item = Candidate> + 'a {
    order.iter().flat_map(move |&map_index| {
        let map = &maps[map_index];
        CANDIDATE_HEADINGS_DEG.into_iter().flat_map(move |deg| {
            let theta = Pose::normalize_angle(deg.to_radians());
            map.cells()
                .filter(|&(tile, _)| tile != TileType::Wall)
                .flat_map(move |(_, center)| {
                    offsets.iter().map(move |&offset| Candidate {
                        map_index,
                        pose: Pose::new(center.x + offset.x, center.y + offset.y, theta),
                    })
                })
        })
    })
}

/// Finds a pose on one of `maps` whose radar reading equals `target`.
///
/// Maps are tried in a random order drawn from `rng`.
///
/// # Errors
/// Returns `WorldError::ObservationShape` if `target` does not have the
/// radar's side length, and `WorldError::UnreachableState` once both rounds
/// are exhausted.
pub fn search<R: Rng + ?Sized>(
    target: &Observation,
    maps: &MapSet,
    radar: &Radar,
    rng: &mut R,
) -> Result<Candidate, WorldError> {
    if target.side() != radar.side() {
        return Err(WorldError::ObservationShape {
            expected: radar.side(),
            actual: target.side(),
        });
    }

    let mut order: Vec<usize> = (0..maps.len()).collect();
    order.shuffle(rng);

    for (round, offsets) in round_offsets().iter().enumerate() {
        debug!(round = round + 1, ?order, "Searching for a matching state");
        let found = candidates(maps, &order, offsets)
            .find(|c| radar.sample(&c.pose, &maps[c.map_index]) == *target);
        if let Some(candidate) = found {
            info!(
                round = round + 1,
                map = candidate.map_index,
                pose = %candidate.pose,
                "Found state matching observation"
            );
            return Ok(candidate);
        }
    }

    warn!(observation = %target, "No state reproduces observation");
    Err(WorldError::UnreachableState {
        observation: target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::RadarConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn maps() -> MapSet {
        MapSet::from_rows([["S..#", "..##", "O..."]]).unwrap()
    }

    #[test]
    fn test_headings_are_distinct_multiples_of_thirty() {
        let mut sorted = CANDIDATE_HEADINGS_DEG.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..12).map(|k| k as f64 * 30.0).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_round_two_skips_tile_centers() {
        let [round_1, round_2] = round_offsets();
        assert_eq!(round_1, vec![Vector2::ZERO]);
        assert_eq!(offset_grid(ROUND_2_OFFSETS).count(), 25);
        assert_eq!(round_2.len(), 24);
        assert!(!round_2.contains(&Vector2::ZERO));
        assert_eq!(round_2[0], Vector2::new(-0.4, -0.4));
        assert_eq!(round_2[1], Vector2::new(-0.4, -0.2));
    }

    #[test]
    fn test_candidate_counts() {
        let maps = maps();
        let order = [0];
        let [round_1, round_2] = round_offsets();
        // 12 tiles, 3 of them walls.
        assert_eq!(candidates(&maps, &order, &round_1).count(), 12 * 9);
        assert_eq!(candidates(&maps, &order, &round_2).count(), 12 * 9 * 24);
    }

    #[test]
    fn test_candidate_order() {
        let maps = MapSet::from_rows([["S.", ".."], ["#S", ".."]]).unwrap();
        let order = [1, 0];
        let first: Vec<Candidate> = candidates(&maps, &order, &[Vector2::ZERO]).take(4).collect();
        assert!(first.iter().all(|c| c.map_index == 1));
        assert!(first.iter().all(|c| c.pose.theta == 0.0));
        // The wall at row 0, column 0 of map 1 is skipped.
        assert_eq!((first[0].pose.x, first[0].pose.y), (1.0, 1.0));
        assert_eq!((first[1].pose.x, first[1].pose.y), (0.0, 0.0));
        assert_eq!(first[3].pose.theta, Pose::normalize_angle(90f64.to_radians()));
    }

    #[test]
    fn test_search_recovers_consistent_pose() {
        let maps = maps();
        let radar = Radar::new(RadarConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let pose = maps[0].start_position();
        let target = radar.sample(&Pose::new(pose.x, pose.y, 0.0), &maps[0]);

        let found = search(&target, &maps, &radar, &mut rng).unwrap();
        assert_eq!(found.map_index, 0);
        assert_eq!(radar.sample(&found.pose, &maps[found.map_index]), target);
    }

    #[test]
    fn test_search_falls_back_to_sub_tile_offsets() {
        let maps = MapSet::builtin().unwrap();
        let radar = Radar::new(RadarConfig::default()).unwrap();
        let target = radar.sample(&Pose::new(2.4, 3.4, 30f64.to_radians()), &maps[0]);

        // No tile center on any map reproduces the reading.
        let order: Vec<usize> = (0..maps.len()).collect();
        let [round_1, _] = round_offsets();
        assert!(
            candidates(&maps, &order, &round_1)
                .all(|c| radar.sample(&c.pose, &maps[c.map_index]) != target)
        );

        let found = search(&target, &maps, &radar, &mut StdRng::seed_from_u64(17)).unwrap();
        let off_center = |v: f64| (v - v.round()).abs() > 1e-9;
        assert!(off_center(found.pose.x) || off_center(found.pose.y), "{}", found.pose);
        assert_eq!(radar.sample(&found.pose, &maps[found.map_index]), target);
    }

    #[test]
    fn test_search_rejects_wrong_shape() {
        let maps = maps();
        let radar = Radar::new(RadarConfig::default()).unwrap();
        let target = Observation::from_rows([[0u8, 0, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        let result = search(&target, &maps, &radar, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(WorldError::ObservationShape { expected: 5, actual: 3 })
        ));
    }

    #[test]
    fn test_search_reports_unreachable() {
        // No holes: the agent's own tile is never sampled as an obstacle.
        let maps = MapSet::from_rows([["S..", "..#"]]).unwrap();
        let radar = Radar::new(RadarConfig { range: 1, resolution: 1.0 }).unwrap();
        let target = Observation::from_rows([[0u8, 0, 0], [0, 1, 0], [0, 0, 0]]).unwrap();
        match search(&target, &maps, &radar, &mut StdRng::seed_from_u64(3)) {
            Err(WorldError::UnreachableState { observation }) => assert_eq!(observation, target),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
