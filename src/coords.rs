//! Latitude/longitude points and their unit-vector form.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// A point on the unit sphere as latitude and longitude in radians.
///
/// Latitude is positive north and longitude is positive east of the +x axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLon {
    /// Latitude in radians, `[-π/2, π/2]`.
    pub lat: f64,
    /// Longitude in radians.
    pub lon: f64,
}

impl LatLon {
    pub const NORTH_POLE: Self = Self { lat: PI / 2.0, lon: 0.0 };
    pub const SOUTH_POLE: Self = Self { lat: -PI / 2.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from degrees.
    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians())
    }

    /// Latitude and longitude in degrees.
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lat.to_degrees(), self.lon.to_degrees())
    }

    /// Direction of a (not necessarily unit) vector. The zero vector maps to
    /// latitude 0, longitude 0.
    pub fn from_vec(v: DVec3) -> Self {
        let horizontal = v.x.hypot(v.y);
        Self {
            lat: v.z.atan2(horizontal),
            lon: v.y.atan2(v.x),
        }
    }

    /// The unit vector pointing at this location.
    pub fn to_unit(self) -> DVec3 {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Same point with longitude folded into `(-π, π]`.
    pub fn normalized(self) -> Self {
        Self {
            lat: self.lat,
            lon: normalize_lon(self.lon),
        }
    }
}

impl From<LatLon> for DVec3 {
    fn from(ll: LatLon) -> Self {
        ll.to_unit()
    }
}

impl From<DVec3> for LatLon {
    fn from(v: DVec3) -> Self {
        LatLon::from_vec(v)
    }
}

/// Fold a longitude into `(-π, π]`.
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Great-circle angle between two vectors, in radians.
///
/// Uses `atan2(|a×b|, a·b)`, which stays accurate for nearly parallel inputs.
pub fn angular_separation(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_vector_round_trip() {
        for &(lat, lon) in &[(0.0, 0.0), (45.0, 120.0), (-30.0, -170.0), (89.0, 179.9)] {
            let ll = LatLon::from_degrees(lat, lon);
            let v = ll.to_unit();
            assert!((v.length() - 1.0).abs() < 1e-12);
            let back = LatLon::from_vec(v);
            assert!((back.lat - ll.lat).abs() < 1e-12, "lat {} -> {}", ll.lat, back.lat);
            assert!((back.lon - ll.lon).abs() < 1e-12, "lon {} -> {}", ll.lon, back.lon);
        }
    }

    #[test]
    fn test_poles() {
        assert!((LatLon::NORTH_POLE.to_unit() - DVec3::Z).length() < 1e-15);
        assert!((LatLon::SOUTH_POLE.to_unit() + DVec3::Z).length() < 1e-15);
        assert_eq!(LatLon::from_vec(DVec3::Z).lat, PI / 2.0);
    }

    #[test]
    fn test_normalize_lon() {
        assert!((normalize_lon(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert_eq!(normalize_lon(-PI), PI);
        assert_eq!(normalize_lon(PI), PI);
        assert!((normalize_lon(-5.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_angular_separation() {
        assert!((angular_separation(DVec3::X, DVec3::Y) - PI / 2.0).abs() < 1e-15);
        assert!((angular_separation(DVec3::X, -DVec3::X) - PI).abs() < 1e-15);
        assert_eq!(angular_separation(DVec3::Z, DVec3::Z), 0.0);
    }
}
