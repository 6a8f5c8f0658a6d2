//! Spherical geometry on the unit sphere.
//!
//! Cell areas are solid angles (steradians). Edges between corners are
//! great-circle arcs, so neighbouring cells that share corners tile the
//! sphere exactly.

use crate::constants::CORNER_COUNT;

type Vec3 = [f64; 3];

/// Unit vector for a (longitude, latitude) pair in degrees.
pub fn unit_vector(lon_deg: f64, lat_deg: f64) -> Vec3 {
    let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Signed solid angle of the spherical triangle `abc`.
///
/// Van Oosterom & Strackee (1983): `tan(E/2) = a·(b×c) / (1 + a·b + b·c + c·a)`.
/// Positive when `abc` runs counter-clockwise seen from outside the sphere.
fn signed_triangle_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let numerator = dot(a, &cross(b, c));
    let denominator = 1.0 + dot(a, b) + dot(b, c) + dot(c, a);
    2.0 * numerator.atan2(denominator)
}

/// Signed area of a spherical polygon given by its vertices in order.
///
/// Counter-clockwise polygons are positive. Repeated vertices contribute
/// nothing, so collapsed edges at poles or seams are harmless.
pub fn signed_polygon_area(lons: &[f64], lats: &[f64]) -> f64 {
    debug_assert_eq!(lons.len(), lats.len());
    if lons.len() < 3 {
        return 0.0;
    }
    let vertices: Vec<Vec3> = lons
        .iter()
        .zip(lats)
        .map(|(&lon, &lat)| unit_vector(lon, lat))
        .collect();

    vertices
        .windows(2)
        .skip(1)
        .map(|pair| signed_triangle_area(&vertices[0], &pair[0], &pair[1]))
        .sum()
}

/// Area of a grid cell from its four corners, in steradians.
///
/// Never negative and never NaN: degenerate cells floor at zero.
pub fn cell_area(lons: &[f64; CORNER_COUNT], lats: &[f64; CORNER_COUNT]) -> f64 {
    let area = signed_polygon_area(lons, lats).abs();
    if area.is_finite() {
        area
    } else {
        0.0
    }
}

/// Wrap a longitude into `[min, min + 360)`.
pub fn wrap_longitude(lon: f64, min: f64) -> f64 {
    let wrapped = (lon - min).rem_euclid(360.0) + min;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= min + 360.0 {
        min
    } else {
        wrapped
    }
}

/// Longitude half way between `a` and `b` along the shorter arc.
pub fn mid_longitude(a: f64, b: f64) -> f64 {
    let delta = wrap_longitude(b - a, -180.0);
    a + delta / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_octant_triangle_area() {
        // Quadrilateral with a repeated pole vertex: one eighth of the sphere.
        let lons = [0.0, 90.0, 90.0, 0.0];
        let lats = [0.0, 0.0, 90.0, 90.0];
        let area = cell_area(&lons, &lats);
        assert!((area - FRAC_PI_2).abs() < 1e-12, "area = {}", area);
    }

    #[test]
    fn test_counter_clockwise_is_positive() {
        let lons = [10.0, 11.0, 11.0, 10.0];
        let lats = [40.0, 40.0, 41.0, 41.0];
        assert!(signed_polygon_area(&lons, &lats) > 0.0);

        let reversed_lons = [10.0, 10.0, 11.0, 11.0];
        let reversed_lats = [40.0, 41.0, 41.0, 40.0];
        assert!(signed_polygon_area(&reversed_lons, &reversed_lats) < 0.0);
    }

    #[test]
    fn test_small_cell_matches_lat_lon_rectangle() {
        let (lon0, lat0, d) = (30.0_f64, 45.0_f64, 0.1_f64);
        let lons = [lon0, lon0 + d, lon0 + d, lon0];
        let lats = [lat0, lat0, lat0 + d, lat0 + d];
        let exact = d.to_radians() * ((lat0 + d).to_radians().sin() - lat0.to_radians().sin());
        let area = cell_area(&lons, &lats);
        assert!(((area - exact) / exact).abs() < 1e-5);
    }

    #[test]
    fn test_cell_across_date_line() {
        let a = cell_area(&[359.5, 0.5, 0.5, 359.5], &[0.0, 0.0, 1.0, 1.0]);
        let b = cell_area(&[-0.5, 0.5, 0.5, -0.5], &[0.0, 0.0, 1.0, 1.0]);
        assert!((a - b).abs() < 1e-15);
        assert!(a > 0.0);
    }

    #[test]
    fn test_degenerate_cells_floor_at_zero() {
        assert_eq!(cell_area(&[5.0; 4], &[5.0; 4]), 0.0);
        let pole = cell_area(&[0.0, 90.0, 180.0, 270.0], &[90.0; 4]);
        assert!((0.0..1e-20).contains(&pole));
        let nan = cell_area(&[f64::NAN, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(nan, 0.0);
    }

    #[test]
    fn test_hemisphere_band_sums_to_sphere() {
        // Eight 90°x90° cells cover the sphere.
        let mut total = 0.0;
        for k in 0..4 {
            let w = k as f64 * 90.0;
            let e = w + 90.0;
            total += cell_area(&[w, e, e, w], &[0.0, 0.0, 90.0, 90.0]);
            total += cell_area(&[w, e, e, w], &[-90.0, -90.0, 0.0, 0.0]);
        }
        assert!((total - 4.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(-10.0, 0.0), 350.0);
        assert_eq!(wrap_longitude(370.0, 0.0), 10.0);
        assert_eq!(wrap_longitude(190.0, -180.0), -170.0);
        assert_eq!(wrap_longitude(180.0, -180.0), -180.0);
        assert!(wrap_longitude(-1e-17, 0.0) < 360.0);
    }

    #[test]
    fn test_mid_longitude_takes_short_arc() {
        assert!((mid_longitude(359.0, 1.0) - 360.0).abs() < 1e-12);
        assert!((mid_longitude(10.0, 20.0) - 15.0).abs() < 1e-12);
    }
}
