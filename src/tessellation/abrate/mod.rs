//! Equal-area spiral tessellation of the sphere.
//!
//! Tiles are quadrilaterals laid end to end along a spiral that winds `n`
//! times from the north pole to the south pole, plus one cap at each pole.
//! Each quadrilateral is bounded above and below by consecutive turns of the
//! spiral and on the sides by meridians, and all `m` of them have the same
//! area. Index 0 is the north cap and index `m + 1` the south cap.
//!
//! Reference: M. Abrate, "Spiral tessellation on the sphere",
//! IAENG Int. J. Applied Math. 42(3), 2012. The curve is
//!
//! ```text
//! x(t) = cos t · cos(nπ + 2nt)
//! y(t) = cos t · sin(nπ + 2nt)      t ∈ [-π/2, π/2]
//! z(t) = -sin t
//! ```
//!
//! and tile `i` starts at curve parameter
//! `t(i) = acos(cos(π/2n)·(1 - 2(i-1)/m)) - (n+1)π/2n`.

mod region;

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::RangeInclusive;

use glam::DVec3;

use super::{SphericalTessellation, TileIndex};
use crate::constants::{EDGE_NUDGE, POLE_EPSILON, TURN_EPSILON};
use crate::coords::LatLon;
use crate::error::{Result, TessellationError};

/// Vertex of a quadrilateral tile, numbered clockwise from the northwest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest = 0,
    NorthEast = 1,
    SouthEast = 2,
    SouthWest = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
    ];

    /// Corner from its vertex number 0..=3.
    pub fn from_index(v: usize) -> Option<Self> {
        Self::ALL.get(v).copied()
    }

    fn is_east(self) -> bool {
        matches!(self, Corner::NorthEast | Corner::SouthEast)
    }

    fn is_south(self) -> bool {
        matches!(self, Corner::SouthEast | Corner::SouthWest)
    }
}

/// Spiral equal-area tessellation with `n` turns and `m` quadrilateral tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct AbrateTessellation {
    n: usize,
    m: usize,
    /// π/n, the curve-parameter height of one band
    step: f64,
    /// cos(π/2n)
    cos_half_step: f64,
}

impl AbrateTessellation {
    /// Tessellation with `n` spiral turns and `m` non-polar tiles.
    pub fn new(n: usize, m: usize) -> Result<Self> {
        if n < 2 {
            return Err(TessellationError::InvalidParameters(format!(
                "spiral needs at least 2 turns, got n = {n}"
            )));
        }
        if m == 0 {
            return Err(TessellationError::InvalidParameters(
                "spiral needs at least one non-polar tile".to_string(),
            ));
        }

        let nf = n as f64;
        let tess = Self {
            n,
            m,
            step: PI / nf,
            cos_half_step: (PI / (2.0 * nf)).cos(),
        };
        log::debug!(
            "Abrate tessellation: n={} m={} ({} tiles)",
            n,
            m,
            tess.num_tiles()
        );
        Ok(tess)
    }

    /// Tessellation with approximately `tiles` tiles of equal area.
    ///
    /// Use [`SphericalTessellation::num_tiles`] for the exact count.
    pub fn with_tile_count(tiles: usize) -> Result<Self> {
        if tiles == 0 {
            return Err(TessellationError::InvalidParameters(
                "tile count must be positive".to_string(),
            ));
        }

        let area = 4.0 * PI / tiles as f64;
        // Abrate eqs. 6 and 7
        let n = (PI / area.sqrt()).round();
        let m = (4.0 * PI * area.sqrt().sin() / area.powf(1.5)).round();

        Self::new(n as usize, m as usize).map_err(|e| {
            TessellationError::InvalidParameters(format!("{tiles} tiles is too few: {e}"))
        })
    }

    /// Number of spiral turns.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of non-polar tiles (`num_tiles() - 2`).
    pub fn m(&self) -> usize {
        self.m
    }

    /// Index of the south polar cap.
    pub fn south_pole(&self) -> TileIndex {
        self.m + 1
    }

    /// Point on the spiral at parameter `t`. Clamps to the poles outside `[-π/2, π/2]`.
    pub fn spiral_point(&self, t: f64) -> DVec3 {
        if t < -FRAC_PI_2 {
            return DVec3::Z;
        }
        if t > FRAC_PI_2 {
            return -DVec3::Z;
        }

        let nf = self.n as f64;
        let (sin_t, cos_t) = t.sin_cos();
        let (sin_a, cos_a) = (nf * PI + 2.0 * nf * t).sin_cos();
        DVec3::new(cos_t * cos_a, cos_t * sin_a, -sin_t)
    }

    /// Curve parameter where non-polar tile `i` begins (Abrate eq. 4).
    ///
    /// `tile_parameter(m + 1)` is where the last tile ends.
    pub fn tile_parameter(&self, i: TileIndex) -> f64 {
        let nf = self.n as f64;
        let u = self.cos_half_step * (1.0 - 2.0 * (i as f64 - 1.0) / self.m as f64);
        u.clamp(-1.0, 1.0).acos() - (nf + 1.0) * PI / (2.0 * nf)
    }

    /// Tile whose upper edge spans curve parameter `t`.
    ///
    /// Intervals are half-open, `[t(i), t(i+1)) -> i`. Parameters before the
    /// spiral start fall in the north cap, those past the last tile in the south cap.
    pub fn tile_at_parameter(&self, t: f64) -> TileIndex {
        if t < -FRAC_PI_2 {
            return 0;
        }
        if t >= FRAC_PI_2 - self.step {
            return self.m + 1;
        }

        let nf = self.n as f64;
        let c = self.cos_half_step;
        let x = self.m as f64 * (c - (t + (nf + 1.0) * PI / (2.0 * nf)).cos()) / (2.0 * c);
        let i = x.floor() + 1.0;
        (i.max(1.0) as usize).min(self.m)
    }

    /// Index of the tile containing `ll`, by closed-form inversion of the spiral.
    pub fn locate(&self, ll: LatLon) -> TileIndex {
        if ll.lat >= FRAC_PI_2 - POLE_EPSILON {
            return 0;
        }
        if ll.lat <= -FRAC_PI_2 + POLE_EPSILON {
            return self.m + 1;
        }

        let nf = self.n as f64;
        // turn of the spiral passing directly above the point at its longitude
        let k = ((nf * PI - ll.lon - 2.0 * nf * ll.lat) / TAU + TURN_EPSILON).floor();
        let tt = ll.lon / (2.0 * nf) + self.step * k - FRAC_PI_2;
        self.tile_at_parameter(tt)
    }

    /// Vertex of tile `i`. Every corner of a polar cap is its pole.
    pub fn tile_vertex(&self, i: TileIndex, corner: Corner) -> Result<DVec3> {
        self.check_index(i)?;
        Ok(self.vertex(i, corner))
    }

    /// Vertex of tile `i` as latitude/longitude.
    pub fn tile_vertex_latlon(&self, i: TileIndex, corner: Corner) -> Result<LatLon> {
        self.tile_vertex(i, corner).map(LatLon::from_vec)
    }

    /// All four vertices of tile `i`, in [`Corner::ALL`] order.
    pub fn tile_vertices(&self, i: TileIndex) -> Result<[DVec3; 4]> {
        self.check_index(i)?;
        Ok(Corner::ALL.map(|c| self.vertex(i, c)))
    }

    /// Exact area of tile `i` on the unit sphere.
    ///
    /// Quadrilaterals all have area `4n·sin(π/n)/m`; the two caps share the rest.
    pub fn tile_area(&self, i: TileIndex) -> Result<f64> {
        self.check_index(i)?;
        let quad = 4.0 * self.n as f64 * self.step.sin() / self.m as f64;
        if self.is_pole(i) {
            Ok(0.5 * (4.0 * PI - self.m as f64 * quad))
        } else {
            Ok(quad)
        }
    }

    /// Neighbor across the western edge (toward the north pole along the spiral).
    pub fn left_tile(&self, i: TileIndex) -> TileIndex {
        i.min(self.m + 2).saturating_sub(1)
    }

    /// Neighbor across the eastern edge (toward the south pole along the spiral).
    pub fn right_tile(&self, i: TileIndex) -> TileIndex {
        i.saturating_add(1).min(self.m + 1)
    }

    /// Tiles sharing the northern edge of tile `i`, as a contiguous range.
    ///
    /// First-turn tiles border the north cap, so the range includes 0.
    /// The north cap itself has nothing above it.
    pub fn above_tiles(&self, i: TileIndex) -> Result<RangeInclusive<TileIndex>> {
        self.check_index(i)?;
        Ok(self.above(i))
    }

    /// Tiles sharing the southern edge of tile `i`, as a contiguous range.
    ///
    /// Last-turn tiles border the south cap, so the range includes `m + 1`.
    /// The south cap itself has nothing below it.
    pub fn below_tiles(&self, i: TileIndex) -> Result<RangeInclusive<TileIndex>> {
        self.check_index(i)?;
        Ok(self.below(i))
    }

    fn is_pole(&self, i: TileIndex) -> bool {
        i == 0 || i == self.m + 1
    }

    /// Inward nudge for edge parameters, a fraction of the narrowest tile width.
    fn nudge(&self) -> f64 {
        EDGE_NUDGE * 2.0 * self.cos_half_step / self.m as f64
    }

    fn vertex(&self, i: TileIndex, corner: Corner) -> DVec3 {
        if i == 0 {
            return DVec3::Z;
        }
        if i == self.m + 1 {
            return -DVec3::Z;
        }

        let tile = if corner.is_east() { i + 1 } else { i };
        let dt = if corner.is_south() { self.step } else { 0.0 };
        self.spiral_point(self.tile_parameter(tile) + dt)
    }

    /// Normalized sum of the vertices; the pole itself for the caps.
    fn center(&self, i: TileIndex) -> DVec3 {
        if i == 0 {
            return DVec3::Z;
        }
        if i == self.m + 1 {
            return -DVec3::Z;
        }
        Corner::ALL
            .iter()
            .map(|&c| self.vertex(i, c))
            .sum::<DVec3>()
            .normalize()
    }

    fn above(&self, i: TileIndex) -> RangeInclusive<TileIndex> {
        let south = self.m + 1;
        let nudge = self.nudge();
        if i == 0 {
            return 1..=0;
        }
        if i == south {
            // tiles whose lower edge reaches the last turn
            let lo = self.tile_at_parameter(FRAC_PI_2 - 2.0 * self.step + nudge);
            return lo.min(self.m)..=self.m;
        }

        let lo = self.tile_at_parameter(self.tile_parameter(i) - self.step + nudge);
        let hi = self.tile_at_parameter(self.tile_parameter(i + 1) - self.step - nudge);
        lo..=hi
    }

    fn below(&self, i: TileIndex) -> RangeInclusive<TileIndex> {
        let south = self.m + 1;
        let nudge = self.nudge();
        if i == south {
            return 1..=0;
        }
        if i == 0 {
            // tiles whose upper edge lies on the first turn
            let hi = self.tile_at_parameter(-FRAC_PI_2 + self.step - nudge);
            return 1..=hi.clamp(1, self.m);
        }

        let lo = self.tile_at_parameter(self.tile_parameter(i) + self.step + nudge);
        let hi = self.tile_at_parameter(self.tile_parameter(i + 1) + self.step - nudge);
        lo..=hi
    }
}

impl SphericalTessellation for AbrateTessellation {
    fn num_tiles(&self) -> usize {
        self.m + 2
    }

    fn tile_index(&self, p: DVec3) -> TileIndex {
        self.locate(LatLon::from_vec(p))
    }

    fn tile_center(&self, i: TileIndex) -> Result<DVec3> {
        self.check_index(i)?;
        Ok(self.center(i))
    }
}
