//! Integration test: assemble coupling grids, write the OASIS triplet and
//! read it back.
//!
//! 1. Build a model grid (synthetic files or an analytic grid)
//! 2. Assemble records and write grids.nc / areas.nc / masks.nc
//! 3. Inspect the files directly and through OasisReader

use std::path::Path;

use grid_common::{GridError, GridIdentifier, PointType};
use model_grid::{MomGrid, NemoGrid, RegularGrid};
use oasis_grid::{
    CouplingGridAssembler, MaskPolarity, OasisConventions, OasisFile, OasisReader, OasisWriter,
    OutputPaths,
};
use test_utils::{
    continent_land_cells, temp_test_dir, write_continent_mask, write_mom_hgrid,
    write_nemo_coordinates, write_nemo_mesh_mask,
};

fn id(s: &str) -> GridIdentifier {
    GridIdentifier::new(s).unwrap()
}

fn spectral_records(cols: usize, rows: usize) -> Vec<oasis_grid::CouplingGridRecord> {
    let grid = RegularGrid::spectral(cols, rows, None).unwrap();
    CouplingGridAssembler::default()
        .assemble(&id("spec"), &grid, &[PointType::T])
        .unwrap()
}

fn dims_of(path: &Path, var: &str) -> Vec<(String, usize)> {
    let file = netcdf::open(path).unwrap();
    let var = file
        .variable(var)
        .unwrap_or_else(|| panic!("{} missing in {}", var, path.display()));
    var.dimensions().iter().map(|d| (d.name(), d.len())).collect()
}

fn string_attribute(file: &netcdf::File, name: &str) -> String {
    match file.attribute(name).unwrap().value().unwrap() {
        netcdf::AttributeValue::Str(s) => s,
        other => panic!("attribute {} is {:?}", name, other),
    }
}

#[test]
fn test_spectral_triplet_layout() {
    let dir = temp_test_dir();
    let paths = OutputPaths::in_dir(dir.path());
    let records = spectral_records(129, 64);
    OasisWriter::default().write_all(&records, &paths).unwrap();

    let grid_dims = vec![("y_spect".to_string(), 64), ("x_spect".to_string(), 129)];
    let corner_dims = vec![
        ("crn".to_string(), 4),
        ("y_spect".to_string(), 64),
        ("x_spect".to_string(), 129),
    ];
    assert_eq!(dims_of(&paths.grids, "spect.lon"), grid_dims);
    assert_eq!(dims_of(&paths.grids, "spect.lat"), grid_dims);
    assert_eq!(dims_of(&paths.grids, "spect.clo"), corner_dims);
    assert_eq!(dims_of(&paths.grids, "spect.cla"), corner_dims);
    assert_eq!(dims_of(&paths.areas, "spect.srf"), grid_dims);
    assert_eq!(dims_of(&paths.masks, "spect.msk"), grid_dims);

    for kind in OasisFile::ALL {
        let file = netcdf::open(paths.get(kind)).unwrap();
        let mut names: Vec<String> = file.variables().map(|v| v.name()).collect();
        names.sort();
        let mut expected: Vec<String> =
            kind.suffixes().iter().map(|s| format!("spect.{}", s)).collect();
        expected.sort();
        assert_eq!(names, expected, "variables of {}", kind);
    }

    let grids = netcdf::open(&paths.grids).unwrap();
    let history = string_attribute(&grids, "history");
    assert!(history.contains("spect"));
    assert!(history.contains(&format!("oasis-grid {}", env!("CARGO_PKG_VERSION"))));
    assert!(string_attribute(&grids, "title").starts_with("OASIS coupling grids"));
    let lon = grids.variable("spect.lon").unwrap();
    match lon.attribute("units").unwrap().value().unwrap() {
        netcdf::AttributeValue::Str(units) => assert_eq!(units, "degrees_east"),
        other => panic!("units is {:?}", other),
    }

    // No mask file: every cell in use
    let masks = netcdf::open(&paths.masks).unwrap();
    let msk: Vec<i32> = masks.variable("spect.msk").unwrap().get_values(..).unwrap();
    assert!(msk.iter().all(|&m| m == 0));
}

#[test]
fn test_round_trip_through_reader() {
    let dir = temp_test_dir();
    let hgrid = dir.path().join("ocean_hgrid.nc");
    let mask = dir.path().join("ocean_mask.nc");
    write_mom_hgrid(&hgrid, 10, 20).unwrap();
    write_continent_mask(&mask, 10, 20).unwrap();

    let grid = MomGrid::from_files(&hgrid, &mask).unwrap();
    let records = CouplingGridAssembler::default()
        .assemble(&id("mom0"), &grid, &[PointType::T, PointType::U])
        .unwrap();

    let paths = OutputPaths::in_dir(dir.path());
    OasisWriter::default().write_all(&records, &paths).unwrap();

    let reader = OasisReader::open(&paths).unwrap();
    assert_eq!(reader.grid_names(), vec!["mom0t", "mom0u"]);
    let read = reader.read_all().unwrap();
    assert_eq!(read, records);

    // Longitudes start at -280 in the file but are written in [0, 360)
    assert!(read[0].lon.as_slice().iter().all(|&l| (0.0..360.0).contains(&l)));
    let masked = read[0].msk.as_slice().iter().filter(|&&m| m == 1).count();
    assert_eq!(masked, continent_land_cells(10, 20));
}

#[test]
fn test_nemo_grids_share_corner_dimension() {
    let dir = temp_test_dir();
    let coordinates = dir.path().join("coordinates.nc");
    let mesh_mask = dir.path().join("mesh_mask.nc");
    write_nemo_coordinates(&coordinates, 8, 12).unwrap();
    write_nemo_mesh_mask(&mesh_mask, 8, 12).unwrap();

    let grid = NemoGrid::from_files(&coordinates, &mesh_mask).unwrap();
    let records = CouplingGridAssembler::default()
        .assemble(&id("nemo"), &grid, &PointType::ALL)
        .unwrap();
    let paths = OutputPaths::in_dir(dir.path());
    OasisWriter::default().write_all(&records, &paths).unwrap();

    let file = netcdf::open(&paths.grids).unwrap();
    let corner_dims: Vec<_> = file.dimensions().filter(|d| d.name() == "crn").collect();
    assert_eq!(corner_dims.len(), 1);
    for name in ["nemot", "nemou", "nemov"] {
        assert!(file.variable(&format!("{}.clo", name)).is_some());
    }
}

#[test]
fn test_overwrite_is_idempotent() {
    let dir = temp_test_dir();
    let paths = OutputPaths::in_dir(dir.path());
    let records = spectral_records(16, 8);
    let writer = OasisWriter::default();

    writer.write_all(&records, &paths).unwrap();
    writer.write_all(&records, &paths).unwrap();

    let read = OasisReader::open(&paths).unwrap().read_all().unwrap();
    assert_eq!(read, records);

    // Only the three outputs remain; temporary files are renamed away
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["areas.nc", "grids.nc", "masks.nc"]);
}

#[cfg(unix)]
#[test]
fn test_overwrite_keeps_target_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = temp_test_dir();
    let paths = OutputPaths::in_dir(dir.path());
    let records = spectral_records(16, 8);
    let writer = OasisWriter::default();
    writer.write_all(&records, &paths).unwrap();

    // New files are at least owner read/write, never executable
    let mode = std::fs::metadata(&paths.grids).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & 0o600, 0o600);
    assert_eq!(mode & 0o111, 0);

    std::fs::set_permissions(&paths.masks, std::fs::Permissions::from_mode(0o640)).unwrap();
    writer.write_all(&records, &paths).unwrap();
    let mode = std::fs::metadata(&paths.masks).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[test]
fn test_merge_keeps_other_grids() {
    let dir = temp_test_dir();
    let paths = OutputPaths::in_dir(dir.path());

    let atmosphere = spectral_records(16, 8);
    OasisWriter::default().write_all(&atmosphere, &paths).unwrap();

    let grid = RegularGrid::finite_volume(12, 7, None).unwrap();
    let ocean = CouplingGridAssembler::default()
        .assemble(&id("fvol"), &grid, &[PointType::T])
        .unwrap();
    let writer = OasisWriter::default().with_merge(true);
    writer.write_all(&ocean, &paths).unwrap();
    // Writing the same grid again replaces it rather than failing
    writer.write_all(&ocean, &paths).unwrap();

    let reader = OasisReader::open(&paths).unwrap();
    assert_eq!(reader.grid_names(), vec!["spect", "fvolt"]);
    assert_eq!(reader.read("spect").unwrap(), atmosphere[0]);
    assert_eq!(reader.read("fvolt").unwrap(), ocean[0]);

    // Without merge the earlier grid is gone
    OasisWriter::default().write_all(&ocean, &paths).unwrap();
    let reader = OasisReader::open(&paths).unwrap();
    assert_eq!(reader.grid_names(), vec!["fvolt"]);
}

#[test]
fn test_failed_write_leaves_target_untouched() {
    let dir = temp_test_dir();
    let paths = OutputPaths::in_dir(dir.path());
    let records = spectral_records(16, 8);
    OasisWriter::default().write_all(&records, &paths).unwrap();
    let before = std::fs::read(&paths.grids).unwrap();

    let duplicated = vec![records[0].clone(), records[0].clone()];
    let result = OasisWriter::default().write_all(&duplicated, &paths);
    assert!(matches!(result, Err(GridError::Configuration(_))));
    assert_eq!(std::fs::read(&paths.grids).unwrap(), before);
}

#[test]
fn test_individual_writers_and_polarity() {
    let dir = temp_test_dir();
    let conventions = OasisConventions {
        mask_polarity: MaskPolarity::OneIsValid,
        ..OasisConventions::default()
    };
    let grid = RegularGrid::spectral(16, 8, None).unwrap();
    let records = CouplingGridAssembler::new(conventions.clone())
        .assemble(&id("spec"), &grid, &[PointType::T])
        .unwrap();

    let masks = dir.path().join("my_masks.nc");
    OasisWriter::new(conventions).write_masks(&records, &masks).unwrap();

    let file = netcdf::open(&masks).unwrap();
    let msk: Vec<i32> = file.variable("spect.msk").unwrap().get_values(..).unwrap();
    assert!(msk.iter().all(|&m| m == 1));
    assert!(file.variable("spect.lon").is_none());
}

#[test]
fn test_reader_missing_file() {
    let dir = temp_test_dir();
    let result = OasisReader::open(&OutputPaths::in_dir(dir.path()));
    assert!(matches!(result, Err(GridError::FileNotFound(_))));
}
