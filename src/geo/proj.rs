//! Geographic → projected coordinate transform.
//!
//! The pipeline only requires a pure function from a geographic point and a
//! 6°-zone to planar meters; [`ProjectTo`] is the seam callers substitute
//! their own transform through. The built-in implementation is the 6°-zone
//! Gauss–Krüger projection on the Krassovsky 1940 ellipsoid, evaluated with
//! the classic Transverse-Mercator series.

use crate::types::{GeoPoint, ProjPoint};

/// Pure geographic → projected transform for a fixed zone.
pub trait ProjectTo {
    fn project(&self, point: GeoPoint, zone: u32) -> ProjPoint;
}

/// Zone of a longitude in the 6°-zone numbering: `floor(lon / 6) + 1`.
#[inline]
pub fn auto_zone(lon: f64) -> u32 {
    ((lon / 6.0).floor() + 1.0) as u32
}

/// 6°-zone Gauss–Krüger projection (Krassovsky 1940 ellipsoid).
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussKruger;

impl ProjectTo for GaussKruger {
    fn project(&self, point: GeoPoint, zone: u32) -> ProjPoint {
        // Krassovsky 1940 semi-axes.
        let a = 6_378_245.0_f64;
        let b = 6_356_863.019_f64;
        let e2 = (a * a - b * b) / (a * a);
        let n = (a - b) / (a + b);

        let lon0 = (zone as f64 * 6.0 - 3.0).to_radians();
        let e0 = zone as f64 * 1e6 + 500_000.0;

        let lat = point.lat.to_radians();
        let lon = point.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let tan_lat = lat.tan();

        let v = a * (1.0 - e2 * sin_lat * sin_lat).powf(-0.5);
        let p = a * (1.0 - e2) * (1.0 - e2 * sin_lat * sin_lat).powf(-1.5);
        let n2 = v / p - 1.0;

        let m1 = (1.0 + n + 1.25 * n.powi(2) + 1.25 * n.powi(3)) * lat;
        let m2 = (3.0 * n + 3.0 * n.powi(2) + 21.0 / 8.0 * n.powi(3)) * lat.sin() * lat.cos();
        let m3 = (15.0 / 8.0 * n.powi(2) + 15.0 / 8.0 * n.powi(3))
            * (2.0 * lat).sin()
            * (2.0 * lat).cos();
        let m4 = 35.0 / 24.0 * n.powi(3) * (3.0 * lat).sin() * (3.0 * lat).cos();
        let m = b * (m1 - m2 + m3 - m4);

        let term_i = m;
        let term_ii = v / 2.0 * sin_lat * cos_lat;
        let term_iii =
            v / 24.0 * sin_lat * cos_lat.powi(3) * (5.0 - tan_lat.powi(2) + 9.0 * n2);
        let term_iiia = v / 720.0
            * sin_lat
            * cos_lat.powi(5)
            * (61.0 - 58.0 * tan_lat.powi(2) + tan_lat.powi(4));
        let term_iv = v * cos_lat;
        let term_v = v / 6.0 * cos_lat.powi(3) * (v / p - tan_lat.powi(2));
        let term_vi = v / 120.0
            * cos_lat.powi(5)
            * (5.0 - 18.0 * tan_lat.powi(2)
                + tan_lat.powi(4)
                + 14.0 * n2
                - 58.0 * tan_lat.powi(2) * n2);

        let dl = lon - lon0;
        let northing =
            term_i + term_ii * dl.powi(2) + term_iii * dl.powi(4) + term_iiia * dl.powi(6);
        let easting = e0 + term_iv * dl + term_v * dl.powi(3) + term_vi * dl.powi(5);

        ProjPoint::new(easting, northing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_zone_six_degree_bands() {
        assert_eq!(auto_zone(0.5), 1);
        assert_eq!(auto_zone(5.9), 1);
        assert_eq!(auto_zone(6.0), 2);
        assert_eq!(auto_zone(30.0), 6);
        assert_eq!(auto_zone(68.9), 12);
    }

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let zone = 12u32;
        let p = GaussKruger.project(
            GeoPoint {
                lon: zone as f64 * 6.0 - 3.0,
                lat: 55.0,
            },
            zone,
        );
        assert!((p.x - 12_500_000.0).abs() < 1e-6);
        assert!(p.y > 0.0);
    }

    #[test]
    fn projection_is_locally_monotonic() {
        let zone = 7u32;
        let base = GeoPoint {
            lon: 39.0,
            lat: 60.0,
        };
        let origin = GaussKruger.project(base, zone);
        let north = GaussKruger.project(
            GeoPoint {
                lat: base.lat + 0.01,
                ..base
            },
            zone,
        );
        let east = GaussKruger.project(
            GeoPoint {
                lon: base.lon + 0.01,
                ..base
            },
            zone,
        );
        assert!(north.y > origin.y);
        assert!(east.x > origin.x);
        // A hundredth of a degree of latitude is roughly 1.1 km.
        assert!((north.y - origin.y - 1_113.0).abs() < 10.0);
    }
}
