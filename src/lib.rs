//! Equal-area tessellations of the unit sphere.
//!
//! Two interchangeable schemes partition the sphere into tiles of nearly equal
//! area and map any direction to the tile containing it in better than linear
//! time:
//!
//! - [`FibonacciSphere`]: nearest-generator cells of the spherical Fibonacci
//!   point set, located with an inverse lattice mapping.
//! - [`AbrateTessellation`]: quadrilaterals along a spiral between two polar
//!   caps, located in closed form, with neighbor queries and flood-filled
//!   region searches.
//!
//! # Example
//!
//! ```
//! use sphere_tiles::{AbrateTessellation, LatLon, SphericalTessellation};
//!
//! let tess = AbrateTessellation::with_tile_count(10_000).unwrap();
//! assert_eq!(tess.num_tiles(), 10_000);
//!
//! let here = LatLon::from_degrees(45.0, 0.5);
//! let tile = tess.tile_index_latlon(here);
//! let center = tess.tile_center(tile).unwrap();
//! assert_eq!(tess.tile_index(center), tile);
//!
//! let square: Vec<LatLon> = [(40.0, -5.0), (40.0, 5.0), (50.0, 5.0), (50.0, -5.0)]
//!     .iter()
//!     .map(|&(lat, lon)| LatLon::from_degrees(lat, lon))
//!     .collect();
//! assert!(tess.tiles_within(&square).contains(&tile));
//! ```

pub mod constants;
pub mod coords;
pub mod error;
pub mod projection;
pub mod tessellation;
pub mod util;

pub use coords::{angular_separation, LatLon};
pub use error::{Result, TessellationError};
pub use projection::{Polygon2, StereographicProjection};
pub use tessellation::{
    AbrateTessellation, Corner, DistanceStats, FibonacciSphere, Nearest, Scheme,
    SphericalTessellation, Tessellation, TileIndex, TileSet,
};
