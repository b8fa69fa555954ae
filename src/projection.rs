//! Stereographic charts and planar polygon containment.
//!
//! Used to decide whether a point on the sphere lies inside a spherical
//! outline: both are projected onto a plane tangent at the outline's centroid
//! and the test is done in 2D.

use glam::{DVec2, DVec3};

use crate::coords::{normalize_lon, LatLon};

/// Stereographic projection centered on an arbitrary point (Snyder 1987, eqs. 21-2 to 21-4).
#[derive(Debug, Clone, Copy)]
pub struct StereographicProjection {
    center: LatLon,
    sin_center_lat: f64,
    cos_center_lat: f64,
    radius: f64,
}

impl StereographicProjection {
    /// Projection tangent at `center` with unit scale.
    pub fn new(center: LatLon) -> Self {
        Self::with_scale(1.0, center)
    }

    /// Projection tangent at `center` with scale `radius`.
    pub fn with_scale(radius: f64, center: LatLon) -> Self {
        let (sin_center_lat, cos_center_lat) = center.lat.sin_cos();
        Self {
            center,
            sin_center_lat,
            cos_center_lat,
            radius,
        }
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    /// Project a location onto the plane.
    ///
    /// The antipode of the center has no image; the result there is non-finite.
    pub fn forward(&self, ll: LatLon) -> DVec2 {
        let (sin_lat, cos_lat) = ll.lat.sin_cos();
        let (sin_dlon, cos_dlon) = (ll.lon - self.center.lon).sin_cos();

        let k = 2.0
            / (1.0 + self.sin_center_lat * sin_lat + self.cos_center_lat * cos_lat * cos_dlon);
        let x = self.radius * k * cos_lat * sin_dlon;
        let y = self.radius
            * k
            * (self.cos_center_lat * sin_lat - self.sin_center_lat * cos_lat * cos_dlon);
        DVec2::new(x, y)
    }

    /// Project a direction vector onto the plane.
    pub fn forward_vec(&self, v: DVec3) -> DVec2 {
        self.forward(LatLon::from_vec(v))
    }

    /// Map a plane point back to the sphere. Longitude is returned in `(-π, π]`.
    pub fn inverse(&self, p: DVec2) -> LatLon {
        let rho = p.length();
        if rho == 0.0 {
            return self.center.normalized();
        }

        let c = 2.0 * (rho / (2.0 * self.radius)).atan();
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_center_lat + p.y * sin_c * self.cos_center_lat / rho)
            .clamp(-1.0, 1.0)
            .asin();

        let dlon = if self.sin_center_lat == 1.0 {
            p.x.atan2(-p.y)
        } else if self.sin_center_lat == -1.0 {
            p.x.atan2(p.y)
        } else {
            (p.x * sin_c).atan2(
                rho * self.cos_center_lat * cos_c - p.y * self.sin_center_lat * sin_c,
            )
        };

        LatLon::new(lat, normalize_lon(self.center.lon + dlon))
    }
}

/// A closed planar polygon. The last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2 {
    vertices: Vec<DVec2>,
}

impl Polygon2 {
    pub fn new(vertices: Vec<DVec2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Non-zero winding containment test.
    ///
    /// Edges are treated as half-open in y, so a point on a shared horizontal
    /// crossing is counted once. Fewer than 3 vertices contain nothing.
    pub fn contains(&self, p: DVec2) -> bool {
        if self.vertices.len() < 3 || !p.is_finite() {
            return false;
        }

        let mut winding = 0i32;
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            // > 0 when p is left of a→b
            let side = (b - a).perp_dot(p - a);
            if a.y <= p.y {
                if b.y > p.y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && side < 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }
}

impl FromIterator<DVec2> for Polygon2 {
    fn from_iter<I: IntoIterator<Item = DVec2>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
