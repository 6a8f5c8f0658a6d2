//! Synthetic grid generators.
//!
//! All arrays are row-major `(ny, nx)` with row 0 in the south. Synthetic
//! ocean grids cover 360° of longitude and `SOUTH..NORTH` of latitude.

/// Southern edge of synthetic ocean grids.
pub const SOUTH: f64 = -80.0;
/// Northern edge of synthetic ocean grids.
pub const NORTH: f64 = 80.0;
/// Earth radius matching the one used to convert areas to steradians.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Area in m² of the lat/lon rectangle between the given edges (degrees).
pub fn rectangle_area_m2(west: f64, east: f64, south: f64, north: f64) -> f64 {
    EARTH_RADIUS_M.powi(2)
        * (east - west).to_radians()
        * (north.to_radians().sin() - south.to_radians().sin())
}

/// Evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|k| if k + 1 == n { end } else { start + k as f64 * step })
        .collect()
}

/// A MOM supergrid for `ny x nx` T cells.
#[derive(Debug, Clone)]
pub struct Supergrid {
    pub nyp: usize,
    pub nxp: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `(nyp - 1, nxp - 1)` sub-cell areas in m².
    pub area: Vec<f64>,
}

/// Regular supergrid starting at 280°W like MOM's tripolar grids.
pub fn supergrid(ny: usize, nx: usize) -> Supergrid {
    let (nyp, nxp) = (2 * ny + 1, 2 * nx + 1);
    let xs = linspace(-280.0, 80.0, nxp);
    let ys = linspace(SOUTH, NORTH, nyp);

    let mut x = Vec::with_capacity(nyp * nxp);
    let mut y = Vec::with_capacity(nyp * nxp);
    for &lat in &ys {
        for &lon in &xs {
            x.push(lon);
            y.push(lat);
        }
    }

    let mut area = Vec::with_capacity((nyp - 1) * (nxp - 1));
    for r in 0..nyp - 1 {
        for c in 0..nxp - 1 {
            area.push(rectangle_area_m2(xs[c], xs[c + 1], ys[r], ys[r + 1]));
        }
    }

    Supergrid {
        nyp,
        nxp,
        x,
        y,
        area,
    }
}

/// Ocean mask (1 = ocean, 0 = land) with a rectangular continent in the
/// middle of the domain.
pub fn continent_mask(ny: usize, nx: usize) -> Vec<f64> {
    let mut mask = Vec::with_capacity(ny * nx);
    for j in 0..ny {
        for i in 0..nx {
            let land = j >= ny / 4 && j < 3 * ny / 4 && i >= nx / 3 && i < nx / 2;
            mask.push(if land { 0.0 } else { 1.0 });
        }
    }
    mask
}

/// Number of land cells in [`continent_mask`].
pub fn continent_land_cells(ny: usize, nx: usize) -> usize {
    continent_mask(ny, nx).iter().filter(|&&v| v == 0.0).count()
}

/// Arrays of a regular C-grid in NEMO naming.
#[derive(Debug, Clone)]
pub struct CGrid {
    pub ny: usize,
    pub nx: usize,
    pub dlon: f64,
    pub dlat: f64,
}

impl CGrid {
    pub fn new(ny: usize, nx: usize) -> Self {
        Self {
            ny,
            nx,
            dlon: 360.0 / nx as f64,
            dlat: (NORTH - SOUTH) / ny as f64,
        }
    }

    /// Longitude of column `i` shifted by `half` half-cells.
    fn lon(&self, i: usize, half: f64) -> f64 {
        (i as f64 + half) * self.dlon
    }

    fn lat(&self, j: usize, half: f64) -> f64 {
        SOUTH + (j as f64 + half) * self.dlat
    }

    fn build(&self, f: impl Fn(usize, usize) -> f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.ny * self.nx);
        for j in 0..self.ny {
            for i in 0..self.nx {
                out.push(f(j, i));
            }
        }
        out
    }

    /// `(glam, gphi)` for point letter `t`, `u`, `v` or `f`.
    pub fn coordinates(&self, point: char) -> (Vec<f64>, Vec<f64>) {
        let (dx, dy) = match point {
            't' => (0.5, 0.5),
            'u' => (1.0, 0.5),
            'v' => (0.5, 1.0),
            _ => (1.0, 1.0),
        };
        (
            self.build(|_, i| self.lon(i, dx)),
            self.build(|j, _| self.lat(j, dy)),
        )
    }

    /// `(e1, e2)` scale factors in metres for point letter `t`, `u` or `v`.
    pub fn scale_factors(&self, point: char) -> (Vec<f64>, Vec<f64>) {
        let dy = if point == 'v' { 1.0 } else { 0.5 };
        let e1 = self.build(|j, _| {
            EARTH_RADIUS_M * self.dlon.to_radians() * self.lat(j, dy).to_radians().cos()
        });
        let e2 = self.build(|_, _| EARTH_RADIUS_M * self.dlat.to_radians());
        (e1, e2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supergrid_shape() {
        let sg = supergrid(3, 5);
        assert_eq!((sg.nyp, sg.nxp), (7, 11));
        assert_eq!(sg.x.len(), 77);
        assert_eq!(sg.area.len(), 60);
        assert_eq!(sg.x[0], -280.0);
        assert_eq!(sg.x[10], 80.0);
        assert_eq!(sg.y[0], SOUTH);
        assert_eq!(sg.y[76], NORTH);
    }

    #[test]
    fn test_continent_mask_has_land_and_ocean() {
        let mask = continent_mask(8, 12);
        let land = continent_land_cells(8, 12);
        assert!(land > 0);
        assert!(land < mask.len());
    }

    #[test]
    fn test_cgrid_staggering() {
        let grid = CGrid::new(4, 8);
        let (glamt, gphit) = grid.coordinates('t');
        let (glamf, gphif) = grid.coordinates('f');
        assert_eq!(glamt[0], 22.5);
        assert_eq!(glamf[0], 45.0);
        assert_eq!(gphit[0], -60.0);
        assert_eq!(gphif[0], -40.0);
    }
}
