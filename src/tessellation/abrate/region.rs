//! Region queries over the spiral tessellation.

use std::collections::VecDeque;

use glam::DVec3;
use rustc_hash::FxHashMap;

use super::AbrateTessellation;
use crate::constants::MIN_CENTROID_NORM;
use crate::coords::LatLon;
use crate::error::Result;
use crate::projection::{Polygon2, StereographicProjection};
use crate::tessellation::{SphericalTessellation, TileIndex, TileSet};

impl AbrateTessellation {
    /// Connected set of tiles whose centers satisfy `predicate`, grown from `seed`.
    ///
    /// Runs along the spiral are extended left and right, then the tiles above
    /// and below each run are queued. A seed that fails the predicate yields an
    /// empty set. Tiles that match but are not connected to the seed through
    /// other matching tiles are not found.
    pub fn matching_tiles_from<F>(&self, seed: TileIndex, predicate: F) -> Result<TileSet>
    where
        F: Fn(DVec3) -> bool,
    {
        self.check_index(seed)?;
        Ok(self.flood(seed, &predicate))
    }

    /// Tiles whose centers lie inside the spherical polygon `outline`.
    ///
    /// Vertices are joined in order and the polygon closes itself. Both the
    /// outline and the tile centers are projected stereographically about the
    /// outline's centroid, so the polygon must not reach the antipode of that
    /// centroid. Fewer than 3 vertices, or an outline whose vertices cancel
    /// out, give an empty set.
    pub fn tiles_within(&self, outline: &[LatLon]) -> TileSet {
        if outline.len() < 3 {
            log::debug!(
                "Outline with {} vertices encloses no tiles",
                outline.len()
            );
            return TileSet::default();
        }

        let sum: DVec3 = outline.iter().map(|ll| ll.to_unit()).sum();
        if sum.length() < MIN_CENTROID_NORM * outline.len() as f64 {
            log::warn!("Outline centroid is undefined; vertices cancel out");
            return TileSet::default();
        }

        let proj = StereographicProjection::new(LatLon::from_vec(sum));
        let polygon: Polygon2 = outline.iter().map(|&ll| proj.forward(ll)).collect();
        let inside = |p: DVec3| polygon.contains(proj.forward_vec(p));

        let seed = self.tile_index(sum);
        let tiles = if inside(self.center(seed)) {
            self.flood(seed, &inside)
        } else {
            // Concave outlines can leave the centroid's tile outside.
            log::debug!("Seed tile {} lies outside outline; scanning all tiles", seed);
            self.matching_tiles(inside)
        };
        log::trace!(
            "{} of {} tiles inside {}-vertex outline",
            tiles.len(),
            self.num_tiles(),
            outline.len()
        );
        tiles
    }

    /// Group the tiles of `other` by the tile of `self` containing their centers.
    ///
    /// Every tile of `other` appears in exactly one value set.
    pub fn map_tiles<T: SphericalTessellation>(&self, other: &T) -> FxHashMap<TileIndex, TileSet> {
        let mut groups: FxHashMap<TileIndex, TileSet> = FxHashMap::default();
        for tile in 0..other.num_tiles() {
            let Ok(center) = other.tile_center(tile) else {
                continue;
            };
            groups
                .entry(self.tile_index(center))
                .or_default()
                .insert(tile);
        }
        groups
    }

    fn flood<F>(&self, seed: TileIndex, predicate: &F) -> TileSet
    where
        F: Fn(DVec3) -> bool,
    {
        let accepts = |i: TileIndex| predicate(self.center(i));
        let mut matches = TileSet::default();
        let mut visited = TileSet::default();
        let mut queue = VecDeque::from([seed]);

        while let Some(tile) = queue.pop_front() {
            if !visited.insert(tile) || !accepts(tile) {
                continue;
            }

            let (first, last) = self.extend_run(tile, &accepts, &mut visited);
            for t in first..=last {
                matches.insert(t);
                for next in self.above(t).chain(self.below(t)) {
                    if !visited.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        matches
    }

    /// Widen a matching tile into the longest run of unvisited matching
    /// tiles along the spiral. Every tile examined is marked visited.
    fn extend_run<A>(
        &self,
        tile: TileIndex,
        accepts: &A,
        visited: &mut TileSet,
    ) -> (TileIndex, TileIndex)
    where
        A: Fn(TileIndex) -> bool,
    {
        let mut first = tile;
        while first > 0 {
            let next = self.left_tile(first);
            if !visited.insert(next) || !accepts(next) {
                break;
            }
            first = next;
        }

        let mut last = tile;
        while last < self.south_pole() {
            let next = self.right_tile(last);
            if !visited.insert(next) || !accepts(next) {
                break;
            }
            last = next;
        }
        (first, last)
    }
}
