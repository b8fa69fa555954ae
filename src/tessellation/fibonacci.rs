//! Spherical Fibonacci point sets with closed-form nearest-point lookup.
//!
//! Point `i` of `N` sits at longitude `2π·frac(i·(φ-1))` and height
//! `z = 1 - (2i+1)/N`, which spaces the points evenly in area.
//!
//! The inverse lookup follows Keinert et al., "Spherical Fibonacci Mapping",
//! ACM Trans. Graph. 34(6), 2015: the query is expressed in the local
//! Fibonacci lattice for its latitude zone, and the four surrounding lattice
//! corners are mapped back to point indices. A short greedy walk over the
//! lattice neighbors then settles on the exact nearest point.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::sync::OnceLock;

use glam::{DMat2, DVec2, DVec3};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use super::{SphericalTessellation, TileIndex};
use crate::constants::{GOLDEN_RATIO, MAX_FIBONACCI_ZONE};
use crate::coords::angular_separation;
use crate::error::{Result, TessellationError};
use crate::util::Timed;

/// Below this many points the lattice is too coarse to help; scan instead.
const BRUTE_FORCE_LIMIT: usize = 64;

/// Queries whose zone number is at or below this lie in the polar region
/// where the lattice approximation degenerates.
const POLAR_ZONE: i32 = 3;

/// Result of a nearest-point lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the closest generator.
    pub index: TileIndex,
    /// Angular distance to it in radians.
    pub distance: f64,
}

/// Summary of the nearest-neighbor distances of a point set, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    pub median: f64,
}

impl DistanceStats {
    /// Summarize a list of angles given in degrees.
    pub fn from_degrees(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std_dev: f64::NAN,
                median: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable_by_key(|&d| OrderedFloat(d));

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let ss: f64 = sorted.iter().map(|d| (d - mean) * (d - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            0.5 * (sorted[count / 2 - 1] + sorted[count / 2])
        };

        Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            std_dev,
            median,
        }
    }
}

impl fmt::Display for DistanceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "n:       {}", self.count)?;
        writeln!(f, "min:     {:.6}", self.min)?;
        writeln!(f, "max:     {:.6}", self.max)?;
        writeln!(f, "mean:    {:.6}", self.mean)?;
        writeln!(f, "std dev: {:.6}", self.std_dev)?;
        write!(f, "median:  {:.6}", self.median)
    }
}

/// A quasi-uniform set of points on the golden-ratio spiral.
#[derive(Debug)]
pub struct FibonacciSphere {
    points: Vec<DVec3>,
    neighbor_distance: OnceLock<Vec<f64>>,
    stats: OnceLock<DistanceStats>,
}

impl FibonacciSphere {
    /// Generate `num_points` points. At least one point is required.
    pub fn new(num_points: usize) -> Result<Self> {
        if num_points == 0 {
            return Err(TessellationError::InvalidParameters(
                "a Fibonacci sphere needs at least one point".to_string(),
            ));
        }

        let n = num_points as f64;
        let points = (0..num_points)
            .map(|i| {
                let phi = TAU * madfrac(i as f64, GOLDEN_RATIO - 1.0);
                let z = 1.0 - (2.0 * i as f64 + 1.0) / n;
                let sin_theta = (1.0 - z * z).max(0.0).sqrt();
                DVec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
            })
            .collect();

        log::debug!("Fibonacci sphere: {} points", num_points);

        Ok(Self {
            points,
            neighbor_distance: OnceLock::new(),
            stats: OnceLock::new(),
        })
    }

    /// All generators in index order.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// The generator closest to `p`, found without scanning the whole set.
    pub fn nearest(&self, p: DVec3) -> Nearest {
        let q = p.try_normalize().unwrap_or(DVec3::Z);
        let n = self.points.len();

        let mut best = if n <= BRUTE_FORCE_LIMIT {
            self.scan(q, 0..n)
        } else {
            let seed = self.lattice_candidate(q);
            self.descend(q, seed)
        };

        if n > BRUTE_FORCE_LIMIT && zone_number(q.z, n as f64) <= POLAR_ZONE {
            best = self.polar_refine(q, best);
        }

        Nearest {
            index: best,
            distance: angular_separation(self.points[best], q),
        }
    }

    /// Every tile paired with its angular distance from `p`, nearest first.
    pub fn distance_map(&self, p: DVec3) -> Vec<(f64, TileIndex)> {
        let q = p.try_normalize().unwrap_or(DVec3::Z);
        let mut out: Vec<(f64, TileIndex)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, &c)| (angular_separation(c, q), i))
            .collect();
        out.sort_unstable_by_key(|&(d, i)| (OrderedFloat(d), i));
        out
    }

    /// Angular distance in radians from tile `i` to its closest neighbor.
    ///
    /// The first call computes the table for every tile (O(N²)); later calls
    /// and concurrent callers share that single result.
    pub fn closest_neighbor_distance(&self, i: TileIndex) -> Result<f64> {
        self.check_index(i)?;
        Ok(self.neighbor_distances()[i])
    }

    /// Statistics of the closest-neighbor distances, in degrees.
    pub fn distance_stats(&self) -> DistanceStats {
        *self.stats.get_or_init(|| {
            let degrees: Vec<f64> = self
                .neighbor_distances()
                .iter()
                .map(|d| d.to_degrees())
                .collect();
            DistanceStats::from_degrees(&degrees)
        })
    }

    /// Closest-neighbor distance of every tile, computed exactly once.
    pub fn neighbor_distances(&self) -> &[f64] {
        self.neighbor_distance.get_or_init(|| {
            let _t = Timed::debug("Fibonacci closest-neighbor scan", self.points.len());
            self.points
                .par_iter()
                .enumerate()
                .map(|(i, &p)| {
                    self.points
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, &q)| angular_separation(p, q))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect()
        })
    }

    /// Best of the four lattice corners around `q` (unit vector).
    fn lattice_candidate(&self, q: DVec3) -> TileIndex {
        let n = self.points.len() as f64;
        let rcp_n = 1.0 / n;

        // (0, 0) is the first point of the set
        let phi = q.y.atan2(q.x).min(PI);
        let uv = DVec2::new(phi, q.z - (1.0 - rcp_n));

        let basis = local_to_global(q.z, n);
        let local = (basis.inverse() * uv).floor();

        let mut best = (f64::INFINITY, 0);
        for s in 0..4 {
            let corner = local + DVec2::new((s % 2) as f64, (s / 2) as f64);
            let global = basis * corner;

            let mut cos_theta = global.y + (1.0 - rcp_n);
            cos_theta = cos_theta.clamp(-1.0, 1.0) * 2.0 - cos_theta;

            let i = index_for_height(cos_theta, self.points.len());
            let d2 = self.points[i].distance_squared(q);
            if d2 < best.0 || (d2 == best.0 && i < best.1) {
                best = (d2, i);
            }
        }
        best.1
    }

    /// Walk to strictly closer lattice neighbors until none is closer.
    fn descend(&self, q: DVec3, start: TileIndex) -> TileIndex {
        let n = self.points.len();
        let mut best = start;
        let mut best_d2 = self.points[best].distance_squared(q);

        loop {
            let k = zone_number(self.points[best].z, n as f64);
            let mut next = best;
            let mut next_d2 = best_d2;

            let offsets = std::iter::once(1).chain((k - 1..=k + 2).map(fibonacci));
            for off in offsets {
                let candidates = [best.checked_sub(off), best.checked_add(off)];
                for c in candidates.into_iter().flatten().filter(|&c| c < n) {
                    let d2 = self.points[c].distance_squared(q);
                    if d2 < next_d2 || (d2 == next_d2 && c < next) {
                        next = c;
                        next_d2 = d2;
                    }
                }
            }

            if next == best {
                return best;
            }
            best = next;
            best_d2 = next_d2;
        }
    }

    /// Near the poles, check every point whose height is within reach of the
    /// current best distance.
    fn polar_refine(&self, q: DVec3, best: TileIndex) -> TileIndex {
        let n = self.points.len();
        let nf = n as f64;
        let reach = self.points[best].distance(q);

        // z_i = 1 - (2i+1)/N  =>  i = (N(1 - z) - 1) / 2
        let lo = ((nf * (1.0 - (q.z + reach)) - 1.0) / 2.0).floor().max(0.0) as usize;
        let hi = ((nf * (1.0 - (q.z - reach)) - 1.0) / 2.0).ceil().max(0.0) as usize;
        let hi = hi.min(n - 1);

        let scanned = self.scan(q, lo..hi + 1);
        if self.points[scanned].distance_squared(q) < self.points[best].distance_squared(q) {
            scanned
        } else {
            best
        }
    }

    /// Nearest point among `range`; ties keep the lower index.
    fn scan(&self, q: DVec3, range: std::ops::Range<usize>) -> TileIndex {
        range
            .min_by_key(|&i| (OrderedFloat(self.points[i].distance_squared(q)), i))
            .unwrap_or(0)
    }
}

impl SphericalTessellation for FibonacciSphere {
    fn num_tiles(&self) -> usize {
        self.points.len()
    }

    fn tile_index(&self, p: DVec3) -> TileIndex {
        self.nearest(p).index
    }

    fn tile_center(&self, i: TileIndex) -> Result<DVec3> {
        self.check_index(i)?;
        Ok(self.points[i])
    }
}

/// Fractional part of `a·b`, always in `[0, 1)`.
fn madfrac(a: f64, b: f64) -> f64 {
    let ab = a * b;
    ab - ab.floor()
}

/// The `j`-th Fibonacci number via Binet's formula (F(0) = 0, F(1) = F(2) = 1).
fn fibonacci(j: i32) -> usize {
    if j <= 0 {
        return 0;
    }
    (GOLDEN_RATIO.powi(j) / 5f64.sqrt()).round() as usize
}

/// Zone number for height `z` in an `n`-point set (Keinert eq. 5), clamped to
/// `[2, MAX_FIBONACCI_ZONE]`.
fn zone_number(z: f64, n: f64) -> i32 {
    let k = ((n * PI * 5f64.sqrt() * (1.0 - z * z)).ln() / (GOLDEN_RATIO + 1.0).ln()).floor();
    // NaN and -inf (exactly at a pole) both fall to the lower clamp
    if k.is_nan() {
        return 2;
    }
    k.clamp(2.0, MAX_FIBONACCI_ZONE as f64) as i32
}

/// Columns are the two local lattice basis vectors for the zone of `z`.
fn local_to_global(z: f64, n: f64) -> DMat2 {
    let k = zone_number(z, n);

    let fk = GOLDEN_RATIO.powi(k) / 5f64.sqrt();
    let f0 = fk.round();
    let f1 = (fk * GOLDEN_RATIO).round();

    let phi_frac = GOLDEN_RATIO - 1.0;
    let bk = DVec2::new(TAU * (madfrac(f0 + 1.0, phi_frac) - phi_frac), -2.0 * f0 / n);
    let bkp = DVec2::new(TAU * (madfrac(f1 + 1.0, phi_frac) - phi_frac), -2.0 * f1 / n);

    DMat2::from_cols(bk, bkp)
}

/// Index of the point whose height band contains `cos_theta`, clamped into range.
fn index_for_height(cos_theta: f64, n: usize) -> TileIndex {
    let i = (n as f64 * 0.5 * (1.0 - cos_theta)).floor();
    if i.is_nan() || i < 0.0 {
        0
    } else {
        (i as usize).min(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(fs: &FibonacciSphere, p: DVec3) -> TileIndex {
        let q = p.normalize();
        fs.scan(q, 0..fs.num_tiles())
    }

    #[test]
    fn test_points_on_unit_sphere() {
        let fs = FibonacciSphere::new(1000).unwrap();
        for p in fs.points() {
            assert!((p.length() - 1.0).abs() < 1e-12, "length {}", p.length());
        }
    }

    #[test]
    fn test_heights_are_evenly_spaced() {
        let n = 200;
        let fs = FibonacciSphere::new(n).unwrap();
        for (i, p) in fs.points().iter().enumerate() {
            let expected = 1.0 - (2.0 * i as f64 + 1.0) / n as f64;
            assert!((p.z - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_zero_points_rejected() {
        assert!(matches!(
            FibonacciSphere::new(0),
            Err(TessellationError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_fibonacci_numbers() {
        let got: Vec<usize> = (0..12).map(fibonacci).collect();
        assert_eq!(got, vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89]);
    }

    #[test]
    fn test_madfrac_in_unit_interval() {
        for i in 0..1000 {
            let f = madfrac(i as f64, GOLDEN_RATIO - 1.0);
            assert!((0.0..1.0).contains(&f));
        }
        assert!((madfrac(-1.5, 1.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_generators_map_to_themselves() {
        let fs = FibonacciSphere::new(5000).unwrap();
        for i in (0..5000).step_by(7) {
            let c = fs.tile_center(i).unwrap();
            assert_eq!(fs.tile_index(c), i);
        }
    }

    #[test]
    fn test_poles_and_seam() {
        let fs = FibonacciSphere::new(2000).unwrap();
        let probes = [
            DVec3::Z,
            -DVec3::Z,
            DVec3::new(-1.0, 1e-15, 0.0),
            DVec3::new(-1.0, -1e-15, 0.0),
            DVec3::new(-0.5, 0.0, 0.8),
            DVec3::new(1e-9, 0.0, -1.0),
        ];
        for p in probes {
            assert_eq!(fs.tile_index(p), brute_force(&fs, p), "probe {:?}", p);
        }
        assert_eq!(fs.tile_index(DVec3::Z), 0);
        assert_eq!(fs.tile_index(-DVec3::Z), 1999);
    }

    #[test]
    fn test_small_sets_use_scan() {
        let fs = FibonacciSphere::new(5).unwrap();
        for i in 0..5 {
            assert_eq!(fs.tile_index(fs.points()[i]), i);
        }
        let single = FibonacciSphere::new(1).unwrap();
        assert_eq!(single.tile_index(DVec3::X), 0);
        assert!(single.closest_neighbor_distance(0).unwrap().is_infinite());
    }

    #[test]
    fn test_nearest_distance_matches_separation() {
        let fs = FibonacciSphere::new(800).unwrap();
        let q = DVec3::new(0.3, -0.4, 0.5).normalize();
        let near = fs.nearest(q);
        let expected = angular_separation(fs.points()[near.index], q);
        assert!((near.distance - expected).abs() < 1e-15);
        assert!(near.distance < 0.2);
    }

    #[test]
    fn test_distance_map_sorted() {
        let fs = FibonacciSphere::new(300).unwrap();
        let q = DVec3::new(0.0, 1.0, 0.2);
        let map = fs.distance_map(q);
        assert_eq!(map.len(), 300);
        assert!(map.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(map[0].1, fs.tile_index(q));
    }

    #[test]
    fn test_neighbor_distances_reasonable() {
        let n = 1000;
        let fs = FibonacciSphere::new(n).unwrap();
        let stats = fs.distance_stats();
        assert_eq!(stats.count, n);

        // Mean spacing on a uniform set is roughly sqrt(4π/N)
        let spacing = (4.0 * PI / n as f64).sqrt().to_degrees();
        assert!(stats.mean > 0.5 * spacing && stats.mean < 1.5 * spacing);
        assert!(stats.min > 0.0);
        assert!(stats.min <= stats.median && stats.median <= stats.max);

        let d = fs.closest_neighbor_distance(10).unwrap();
        assert!((d.to_degrees() - fs.neighbor_distances()[10].to_degrees()).abs() < 1e-12);
        assert!(fs.closest_neighbor_distance(n).is_err());
    }

    #[test]
    fn test_neighbor_distances_computed_once_across_threads() {
        let fs = FibonacciSphere::new(600).unwrap();
        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| fs.neighbor_distances().as_ptr() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(fs.distance_stats(), fs.distance_stats());
    }

    #[test]
    fn test_distance_stats_from_degrees() {
        let stats = DistanceStats::from_degrees(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert!((stats.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(DistanceStats::from_degrees(&[]).count, 0);
    }
}
