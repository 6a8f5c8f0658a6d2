//! Reading model grids from NetCDF files in their native layout.

use std::f64::consts::PI;

use grid_common::geometry::cell_area;
use grid_common::{GridError, PointType};
use model_grid::{Mom1Grid, MomGrid, ModelGrid, NemoGrid, RegularGrid};
use test_utils::{
    assert_approx_eq, assert_rel_eq, continent_land_cells, rectangle_area_m2, require_test_files,
    temp_test_dir, write_atmosphere_mask, write_continent_mask, write_mask, write_mom1_grid_spec,
    write_mom_hgrid, write_nemo_coordinates, write_nemo_mesh_mask, EARTH_RADIUS_M, NORTH, SOUTH,
};

fn count_valid(grid: &dyn ModelGrid, point: PointType) -> usize {
    grid.fields(point)
        .unwrap()
        .valid
        .as_slice()
        .iter()
        .filter(|&&v| v)
        .count()
}

#[test]
fn test_mom_grid_from_files() {
    let dir = temp_test_dir();
    let hgrid = dir.path().join("ocean_hgrid.nc");
    let mask = dir.path().join("ocean_mask.nc");
    write_mom_hgrid(&hgrid, 100, 200).unwrap();
    write_continent_mask(&mask, 100, 200).unwrap();

    let grid = MomGrid::from_files(&hgrid, &mask).unwrap();
    assert_eq!(grid.point_types(), vec![PointType::T, PointType::U]);
    for point in grid.point_types() {
        assert_eq!(grid.fields(point).unwrap().shape(), (100, 200));
    }

    let t = grid.fields(PointType::T).unwrap();
    assert_approx_eq!(*t.lon.get(0, 0), -279.1, 1e-9);
    assert_eq!(count_valid(&grid, PointType::T), 100 * 200 - continent_land_cells(100, 200));
    // Velocity points around the continent lose their neighbours too
    assert!(count_valid(&grid, PointType::U) < count_valid(&grid, PointType::T));

    // Supergrid areas add up to the whole latitude band
    let total: f64 = t.area.as_ref().unwrap().as_slice().iter().sum();
    let band = rectangle_area_m2(0.0, 360.0, SOUTH, NORTH) / EARTH_RADIUS_M.powi(2);
    assert_rel_eq!(total, band, 1e-10);
}

#[test]
fn test_mom_mask_shape_mismatch() {
    let dir = temp_test_dir();
    let hgrid = dir.path().join("ocean_hgrid.nc");
    let mask = dir.path().join("ocean_mask.nc");
    write_mom_hgrid(&hgrid, 100, 200).unwrap();
    write_mask(&mask, 100, 199, &vec![1.0; 100 * 199]).unwrap();

    match MomGrid::from_files(&hgrid, &mask) {
        Err(GridError::DimensionMismatch { expected, found, .. }) => {
            assert_eq!(expected, vec![100, 200]);
            assert_eq!(found, vec![100, 199]);
        }
        other => panic!("expected DimensionMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_mom_missing_mask_file() {
    let dir = temp_test_dir();
    let hgrid = dir.path().join("ocean_hgrid.nc");
    write_mom_hgrid(&hgrid, 4, 8).unwrap();

    let result = MomGrid::from_files(&hgrid, dir.path().join("absent.nc"));
    assert!(matches!(result, Err(GridError::FileNotFound(_))));
}

#[test]
fn test_mom1_grid_from_files() {
    let dir = temp_test_dir();
    let grid_spec = dir.path().join("grid_spec.nc");
    let mask = dir.path().join("ocean_mask.nc");
    write_mom1_grid_spec(&grid_spec, 20, 36).unwrap();
    write_continent_mask(&mask, 20, 36).unwrap();

    let grid = Mom1Grid::from_files(&grid_spec, &mask).unwrap();
    assert_eq!(grid.description(), "MOM 1 degree");
    assert_eq!(grid.point_types(), vec![PointType::T, PointType::U]);

    let t = grid.fields(PointType::T).unwrap();
    assert_eq!(t.shape(), (20, 36));
    assert_eq!(t.clon.cell(0, 0), [0.0, 10.0, 10.0, 0.0]);
    assert_eq!(count_valid(&grid, PointType::T), 20 * 36 - continent_land_cells(20, 36));

    // Supplied areas agree with the corner geometry for lat/lon rectangles
    // to within the small-circle vs great-circle difference.
    let area = *t.area.as_ref().unwrap().get(10, 5);
    assert_rel_eq!(area, cell_area(&t.clon.cell(10, 5), &t.clat.cell(10, 5)), 1e-2);
}

#[test]
fn test_nemo_grid_from_files() {
    let dir = temp_test_dir();
    let coordinates = dir.path().join("coordinates.nc");
    let mesh_mask = dir.path().join("mesh_mask.nc");
    write_nemo_coordinates(&coordinates, 16, 24).unwrap();
    write_nemo_mesh_mask(&mesh_mask, 16, 24).unwrap();

    let grid = NemoGrid::from_files(&coordinates, &mesh_mask).unwrap();
    assert_eq!(
        grid.point_types(),
        vec![PointType::T, PointType::U, PointType::V]
    );

    let land = continent_land_cells(16, 24);
    for point in grid.point_types() {
        let fields = grid.fields(point).unwrap();
        assert_eq!(fields.shape(), (16, 24));
        assert_eq!(count_valid(&grid, point), 16 * 24 - land);
        for j in 0..16 {
            for i in 0..24 {
                let a = cell_area(&fields.clon.cell(j, i), &fields.clat.cell(j, i));
                assert!(a > 0.0, "{} cell ({}, {}) is degenerate", point, j, i);
            }
        }
    }

    // T corners are the surrounding F points
    let t = grid.fields(PointType::T).unwrap();
    let (lon, lat) = (*t.lon.get(5, 5), *t.lat.get(5, 5));
    let clon = t.clon.cell(5, 5);
    let clat = t.clat.cell(5, 5);
    assert!(clon[0] < lon && lon < clon[1]);
    assert!(clat[0] < lat && lat < clat[3]);
}

#[test]
fn test_nemo_missing_coordinates() {
    let dir = temp_test_dir();
    let mesh_mask = dir.path().join("mesh_mask.nc");
    write_nemo_mesh_mask(&mesh_mask, 4, 4).unwrap();

    let result = NemoGrid::from_files(dir.path().join("coordinates.nc"), &mesh_mask);
    assert!(matches!(result, Err(GridError::FileNotFound(_))));
}

#[test]
fn test_spectral_grid_t42() {
    let grid = RegularGrid::spectral(129, 64, None).unwrap();
    let t = grid.fields(PointType::T).unwrap();
    assert_eq!(t.shape(), (64, 129));

    let dlon = 360.0 / 129.0;
    for i in 1..129 {
        assert_rel_eq!(t.lon.get(0, i) - t.lon.get(0, i - 1), dlon, 1e-12);
    }
    for j in 1..64 {
        assert!(t.lat.get(j, 0) > t.lat.get(j - 1, 0));
        assert_eq!(*t.lat.get(j, 0), -*t.lat.get(63 - j, 0));
    }
    assert!(t.valid.as_slice().iter().all(|&v| v));
}

#[test]
fn test_regular_grids_tile_the_sphere() {
    for grid in [
        RegularGrid::spectral(48, 24, None).unwrap(),
        RegularGrid::finite_volume(72, 46, None).unwrap(),
    ] {
        let t = grid.fields(PointType::T).unwrap();
        let (ny, nx) = t.shape();
        let mut total = 0.0;
        for j in 0..ny {
            for i in 0..nx {
                total += cell_area(&t.clon.cell(j, i), &t.clat.cell(j, i));
            }
        }
        assert_rel_eq!(total, 4.0 * PI, 1e-10);
    }
}

#[test]
fn test_atmosphere_mask_with_any_variable_name() {
    let dir = temp_test_dir();
    let mask = dir.path().join("land_sea.nc");
    write_atmosphere_mask(&mask, 46, 72).unwrap();

    let grid = RegularGrid::finite_volume(72, 46, Some(mask.as_path())).unwrap();
    assert_eq!(count_valid(&grid, PointType::T), 23 * 72);
    let t = grid.fields(PointType::T).unwrap();
    assert!(*t.valid.get(0, 0));
    assert!(!*t.valid.get(45, 0));
}

#[test]
fn test_atmosphere_mask_shape_mismatch() {
    let dir = temp_test_dir();
    let mask = dir.path().join("land_sea.nc");
    write_atmosphere_mask(&mask, 64, 128).unwrap();

    let result = RegularGrid::spectral(129, 64, Some(mask.as_path()));
    assert!(matches!(result, Err(GridError::DimensionMismatch { .. })));
}

#[test]
fn test_real_mom_grid() {
    let paths = require_test_files!("ocean_hgrid.nc", "ocean_mask.nc");
    let grid = MomGrid::from_files(&paths[0], &paths[1]).unwrap();
    let t = grid.fields(PointType::T).unwrap();
    let u = grid.fields(PointType::U).unwrap();
    assert_eq!(t.shape(), u.shape());
    assert!(t.lat.as_slice().iter().all(|lat| (-90.0..=90.0).contains(lat)));
}
