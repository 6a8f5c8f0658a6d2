//! NEMO grid reader (`coordinates.nc` + `mesh_mask.nc`).
//!
//! NEMO uses an Arakawa C-grid. Cell corners come from the neighbouring
//! staggered points:
//!
//! | Point | SW | SE | NE | NW |
//! |-------|----|----|----|----|
//! | T | F(j-1,i-1) | F(j-1,i) | F(j,i) | F(j,i-1) |
//! | U | V(j-1,i) | V(j-1,i+1) | V(j,i+1) | V(j,i) |
//! | V | U(j,i-1) | U(j,i) | U(j+1,i) | U(j+1,i-1) |
//!
//! The grid is cyclic in x. Rows outside the domain are extrapolated
//! linearly in latitude.

use std::path::Path;

use grid_common::{CornerField, Field2D, GridResult, PointType};
use tracing::info;

use crate::mask::read_mask;
use crate::{metric_to_steradians, native, ModelGrid, PointFieldSet, PointFields};

const DESCRIPTION: &str = "NEMO ORCA";

/// Staggered coordinate and scale-factor arrays from `coordinates.nc`.
#[derive(Debug, Clone)]
pub struct NemoCoordinates {
    pub glamt: Field2D<f64>,
    pub gphit: Field2D<f64>,
    pub glamu: Field2D<f64>,
    pub gphiu: Field2D<f64>,
    pub glamv: Field2D<f64>,
    pub gphiv: Field2D<f64>,
    pub glamf: Field2D<f64>,
    pub gphif: Field2D<f64>,
    pub e1t: Field2D<f64>,
    pub e2t: Field2D<f64>,
    pub e1u: Field2D<f64>,
    pub e2u: Field2D<f64>,
    pub e1v: Field2D<f64>,
    pub e2v: Field2D<f64>,
}

impl NemoCoordinates {
    fn read(path: &Path) -> GridResult<Self> {
        let file = native::open(path)?;
        let read = |name: &str| native::read_field(&file, name);
        Ok(Self {
            glamt: read("glamt")?,
            gphit: read("gphit")?,
            glamu: read("glamu")?,
            gphiu: read("gphiu")?,
            glamv: read("glamv")?,
            gphiv: read("gphiv")?,
            glamf: read("glamf")?,
            gphif: read("gphif")?,
            e1t: read("e1t")?,
            e2t: read("e2t")?,
            e1u: read("e1u")?,
            e2u: read("e2u")?,
            e1v: read("e1v")?,
            e2v: read("e2v")?,
        })
    }

    fn validate(&self) -> GridResult<()> {
        let shape = self.glamt.shape();
        let others = [
            (&self.gphit, "gphit"),
            (&self.glamu, "glamu"),
            (&self.gphiu, "gphiu"),
            (&self.glamv, "glamv"),
            (&self.gphiv, "gphiv"),
            (&self.glamf, "glamf"),
            (&self.gphif, "gphif"),
            (&self.e1t, "e1t"),
            (&self.e2t, "e2t"),
            (&self.e1u, "e1u"),
            (&self.e2u, "e2u"),
            (&self.e1v, "e1v"),
            (&self.e2v, "e2v"),
        ];
        for (field, name) in others {
            native::expect_shape(field, shape, &format!("NEMO {} vs glamt", name))?;
        }
        Ok(())
    }
}

/// Surface masks for the three point types.
#[derive(Debug, Clone)]
pub struct NemoMasks {
    pub t: Field2D<bool>,
    pub u: Field2D<bool>,
    pub v: Field2D<bool>,
}

impl NemoMasks {
    fn read(path: &Path) -> GridResult<Self> {
        Ok(Self {
            t: read_mask(path, &["tmask"])?,
            u: read_mask(path, &["umask"])?,
            v: read_mask(path, &["vmask"])?,
        })
    }
}

/// NEMO ocean grid.
#[derive(Debug, Clone)]
pub struct NemoGrid {
    description: String,
    points: PointFieldSet,
}

impl NemoGrid {
    /// Read the coordinates and mesh mask files.
    pub fn from_files(coordinates: impl AsRef<Path>, mask: impl AsRef<Path>) -> GridResult<Self> {
        let (coordinates, mask) = (coordinates.as_ref(), mask.as_ref());
        native::ensure_exists(coordinates)?;
        native::ensure_exists(mask)?;

        let coords = NemoCoordinates::read(coordinates)?;
        let masks = NemoMasks::read(mask)?;

        info!(
            coordinates = %coordinates.display(),
            mask = %mask.display(),
            "Read NEMO grid definition"
        );
        Self::from_arrays(coords, masks)
    }

    pub fn from_arrays(coords: NemoCoordinates, masks: NemoMasks) -> GridResult<Self> {
        coords.validate()?;
        let shape = coords.glamt.shape();
        native::expect_shape(&masks.t, shape, "NEMO tmask vs grid definition")?;
        native::expect_shape(&masks.u, shape, "NEMO umask vs grid definition")?;
        native::expect_shape(&masks.v, shape, "NEMO vmask vs grid definition")?;

        let (ny, nx) = shape;
        let f = Staggered::new(&coords.glamf, &coords.gphif);
        let u = Staggered::new(&coords.glamu, &coords.gphiu);
        let v = Staggered::new(&coords.glamv, &coords.gphiv);

        let t_offsets = [(-1, -1), (-1, 0), (0, 0), (0, -1)];
        let u_offsets = [(-1, 0), (-1, 1), (0, 1), (0, 0)];
        let v_offsets = [(0, -1), (0, 0), (1, 0), (1, -1)];

        let area = |e1: &Field2D<f64>, e2: &Field2D<f64>| {
            let metric = Field2D::from_fn(ny, nx, |j, i| e1.get(j, i) * e2.get(j, i));
            metric_to_steradians(&metric)
        };

        let mut points = PointFieldSet::new();
        let (clon, clat) = f.corners(ny, nx, &t_offsets);
        points.insert(
            PointType::T,
            PointFields::new(
                coords.glamt.clone(),
                coords.gphit.clone(),
                clon,
                clat,
                Some(area(&coords.e1t, &coords.e2t)),
                masks.t,
            )?,
        );
        let (clon, clat) = v.corners(ny, nx, &u_offsets);
        points.insert(
            PointType::U,
            PointFields::new(
                coords.glamu.clone(),
                coords.gphiu.clone(),
                clon,
                clat,
                Some(area(&coords.e1u, &coords.e2u)),
                masks.u,
            )?,
        );
        let (clon, clat) = u.corners(ny, nx, &v_offsets);
        points.insert(
            PointType::V,
            PointFields::new(
                coords.glamv.clone(),
                coords.gphiv.clone(),
                clon,
                clat,
                Some(area(&coords.e1v, &coords.e2v)),
                masks.v,
            )?,
        );

        Ok(Self {
            description: DESCRIPTION.to_string(),
            points,
        })
    }
}

impl ModelGrid for NemoGrid {
    fn description(&self) -> &str {
        &self.description
    }

    fn point_types(&self) -> Vec<PointType> {
        self.points.point_types()
    }

    fn fields(&self, point: PointType) -> GridResult<&PointFields> {
        self.points.get(point, &self.description)
    }
}

/// One staggered coordinate pair, looked up with out-of-domain handling.
struct Staggered<'a> {
    lon: &'a Field2D<f64>,
    lat: &'a Field2D<f64>,
}

impl<'a> Staggered<'a> {
    fn new(lon: &'a Field2D<f64>, lat: &'a Field2D<f64>) -> Self {
        Self { lon, lat }
    }

    /// Point `(j, i)`: cyclic in i, linear latitude extrapolation in j.
    fn at(&self, j: isize, i: isize) -> (f64, f64) {
        let (ny, nx) = self.lon.shape();
        let i = i.rem_euclid(nx as isize) as usize;
        let last = ny as isize - 1;

        if (0..=last).contains(&j) {
            let j = j as usize;
            return (*self.lon.get(j, i), *self.lat.get(j, i));
        }
        let (edge, inner, steps) = if j < 0 {
            (0, 1.min(ny - 1), -j)
        } else {
            (ny - 1, ny.saturating_sub(2), j - last)
        };
        let step = self.lat.get(edge, i) - self.lat.get(inner, i);
        let lat = self.lat.get(edge, i) + step * steps as f64;
        (*self.lon.get(edge, i), lat.clamp(-90.0, 90.0))
    }

    fn corners(
        &self,
        ny: usize,
        nx: usize,
        offsets: &[(isize, isize); 4],
    ) -> (CornerField, CornerField) {
        let lookup = |j: usize, i: usize| {
            offsets.map(|(dj, di)| self.at(j as isize + dj, i as isize + di))
        };
        let clon = CornerField::from_fn(ny, nx, |j, i| lookup(j, i).map(|p| p.0));
        let clat = CornerField::from_fn(ny, nx, |j, i| lookup(j, i).map(|p| p.1));
        (clon, clat)
    }
}
