//! Tessellations of the unit sphere into tiles of roughly equal area.
//!
//! Two schemes are provided:
//! - [`FibonacciSphere`] - a point set on the golden-ratio spiral; each tile is
//!   the region nearest one generator.
//! - [`AbrateTessellation`] - equal-area quadrilaterals laid along a spiral
//!   curve, plus two polar caps.
//!
//! Both implement [`SphericalTessellation`]. [`Tessellation`] wraps either one
//! when the scheme is chosen at runtime.

mod abrate;
mod fibonacci;

use std::fmt;

use glam::DVec3;
use rustc_hash::FxHashSet;

use crate::coords::LatLon;
use crate::error::{Result, TessellationError};

pub use abrate::{AbrateTessellation, Corner};
pub use fibonacci::{DistanceStats, FibonacciSphere, Nearest};

/// Identifier of one tile, in `[0, num_tiles)`.
pub type TileIndex = usize;

/// Unordered set of tile indices returned by region queries.
pub type TileSet = FxHashSet<TileIndex>;

/// Operations shared by every tessellation scheme.
pub trait SphericalTessellation {
    /// Total number of tiles, fixed at construction.
    fn num_tiles(&self) -> usize;

    /// Index of the tile containing the direction `p`.
    ///
    /// Defined for every direction, including the poles and the ±180° seam.
    /// `p` need not be normalized but must be nonzero.
    fn tile_index(&self, p: DVec3) -> TileIndex;

    /// Index of the tile containing `ll`.
    fn tile_index_latlon(&self, ll: LatLon) -> TileIndex {
        self.tile_index(ll.to_unit())
    }

    /// Representative unit vector of tile `i`.
    fn tile_center(&self, i: TileIndex) -> Result<DVec3>;

    /// Representative location of tile `i`.
    fn tile_center_latlon(&self, i: TileIndex) -> Result<LatLon> {
        self.tile_center(i).map(LatLon::from_vec)
    }

    /// All tiles whose center satisfies `predicate`, by testing every tile.
    fn matching_tiles<F>(&self, predicate: F) -> TileSet
    where
        F: Fn(DVec3) -> bool,
        Self: Sized,
    {
        (0..self.num_tiles())
            .filter(|&i| self.tile_center(i).is_ok_and(&predicate))
            .collect()
    }

    /// Reject indices outside `[0, num_tiles)`.
    fn check_index(&self, i: TileIndex) -> Result<()> {
        if i < self.num_tiles() {
            Ok(())
        } else {
            Err(TessellationError::TileOutOfRange {
                index: i,
                num_tiles: self.num_tiles(),
            })
        }
    }
}

/// Which tessellation scheme to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Fibonacci,
    Abrate,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Fibonacci => write!(f, "fibonacci"),
            Scheme::Abrate => write!(f, "abrate"),
        }
    }
}

/// A tessellation whose scheme is chosen at runtime.
#[derive(Debug)]
pub enum Tessellation {
    Fibonacci(FibonacciSphere),
    Abrate(AbrateTessellation),
}

impl Tessellation {
    /// Build a tessellation of roughly `tiles` tiles.
    ///
    /// Fibonacci spheres have exactly `tiles` tiles; the Abrate count is rounded
    /// to the nearest valid spiral.
    pub fn build(scheme: Scheme, tiles: usize) -> Result<Self> {
        match scheme {
            Scheme::Fibonacci => FibonacciSphere::new(tiles).map(Self::Fibonacci),
            Scheme::Abrate => AbrateTessellation::with_tile_count(tiles).map(Self::Abrate),
        }
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Tessellation::Fibonacci(_) => Scheme::Fibonacci,
            Tessellation::Abrate(_) => Scheme::Abrate,
        }
    }

    pub fn as_fibonacci(&self) -> Option<&FibonacciSphere> {
        match self {
            Tessellation::Fibonacci(fs) => Some(fs),
            Tessellation::Abrate(_) => None,
        }
    }

    pub fn as_abrate(&self) -> Option<&AbrateTessellation> {
        match self {
            Tessellation::Abrate(at) => Some(at),
            Tessellation::Fibonacci(_) => None,
        }
    }
}

impl From<FibonacciSphere> for Tessellation {
    fn from(fs: FibonacciSphere) -> Self {
        Tessellation::Fibonacci(fs)
    }
}

impl From<AbrateTessellation> for Tessellation {
    fn from(at: AbrateTessellation) -> Self {
        Tessellation::Abrate(at)
    }
}

impl SphericalTessellation for Tessellation {
    fn num_tiles(&self) -> usize {
        match self {
            Tessellation::Fibonacci(fs) => fs.num_tiles(),
            Tessellation::Abrate(at) => at.num_tiles(),
        }
    }

    fn tile_index(&self, p: DVec3) -> TileIndex {
        match self {
            Tessellation::Fibonacci(fs) => fs.tile_index(p),
            Tessellation::Abrate(at) => at.tile_index(p),
        }
    }

    fn tile_index_latlon(&self, ll: LatLon) -> TileIndex {
        match self {
            Tessellation::Fibonacci(fs) => fs.tile_index_latlon(ll),
            Tessellation::Abrate(at) => at.tile_index_latlon(ll),
        }
    }

    fn tile_center(&self, i: TileIndex) -> Result<DVec3> {
        match self {
            Tessellation::Fibonacci(fs) => fs.tile_center(i),
            Tessellation::Abrate(at) => at.tile_center(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dispatches_to_scheme() {
        let fib = Tessellation::build(Scheme::Fibonacci, 500).unwrap();
        assert_eq!(fib.scheme(), Scheme::Fibonacci);
        assert_eq!(fib.num_tiles(), 500);
        assert!(fib.as_fibonacci().is_some());

        let abr = Tessellation::build(Scheme::Abrate, 500).unwrap();
        assert_eq!(abr.scheme(), Scheme::Abrate);
        let inner = abr.as_abrate().unwrap();
        assert_eq!(abr.num_tiles(), inner.num_tiles());
    }

    #[test]
    fn test_enum_agrees_with_concrete_types() {
        let concrete = AbrateTessellation::with_tile_count(2000).unwrap();
        let wrapped = Tessellation::from(concrete.clone());
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(40) {
                let ll = LatLon::from_degrees(lat as f64, lon as f64);
                assert_eq!(wrapped.tile_index_latlon(ll), concrete.tile_index_latlon(ll));
            }
        }
        assert_eq!(wrapped.tile_center(17).unwrap(), concrete.tile_center(17).unwrap());
    }

    #[test]
    fn test_default_matching_tiles_scans_everything() {
        let fs = FibonacciSphere::new(300).unwrap();
        let north = fs.matching_tiles(|p| p.z > 0.0);
        assert_eq!(north.len(), 150);
        assert!(fs.matching_tiles(|_| false).is_empty());
        assert_eq!(fs.matching_tiles(|_| true).len(), 300);
    }

    #[test]
    fn test_out_of_range_center_is_rejected() {
        let t = Tessellation::build(Scheme::Fibonacci, 10).unwrap();
        assert_eq!(
            t.tile_center(10),
            Err(TessellationError::TileOutOfRange {
                index: 10,
                num_tiles: 10
            })
        );
    }

    #[test]
    fn test_scheme_display() {
        assert_eq!(Scheme::Fibonacci.to_string(), "fibonacci");
        assert_eq!(Scheme::Abrate.to_string(), "abrate");
    }
}
