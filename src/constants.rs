//! Shared tolerances for the tessellation formulas.

/// Golden ratio φ = (1 + √5) / 2.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Bias added before flooring the spiral turn number in the Abrate inverse lookup.
///
/// A point lying exactly on a spiral edge resolves to the band below the edge.
pub const TURN_EPSILON: f64 = 1e-12;

/// Points whose latitude is within this many radians of ±π/2 resolve straight
/// to the polar cap tile, where longitude is meaningless.
pub const POLE_EPSILON: f64 = 1e-12;

/// Inward nudge applied to edge parameters when resolving above/below neighbors,
/// as a fraction of the narrowest tile's curve-parameter width.
///
/// Keeps tiles that only touch at a corner out of the neighbor range.
pub const EDGE_NUDGE: f64 = 1e-3;

/// Centroids shorter than this are treated as vanished (e.g. an outline that
/// wraps the whole sphere).
pub const MIN_CENTROID_NORM: f64 = 1e-12;

/// Largest zone number used by the Fibonacci inverse mapping; `φ^k / √5` stays
/// an exact integer in f64 well past this.
pub const MAX_FIBONACCI_ZONE: i32 = 70;
