//! Fixed conventions of the OASIS grid file format.
//!
//! These are contracts with the coupler's grid reader, not tunables.

/// Length of a coupler grid identifier (e.g. `nemo`).
pub const GRID_ID_LEN: usize = 4;

/// Length of a per-point-type grid name (identifier plus point letter).
pub const GRID_NAME_LEN: usize = GRID_ID_LEN + 1;

/// Number of corners describing each cell.
pub const CORNER_COUNT: usize = 4;

/// Name of the corner dimension shared by every grid in `grids.nc`.
pub const CORNER_DIM: &str = "crn";

/// Mean Earth radius used to turn metric cell areas into steradians.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Variable suffixes understood by the coupler.
pub mod suffix {
    pub const LON: &str = "lon";
    pub const LAT: &str = "lat";
    pub const CORNER_LON: &str = "clo";
    pub const CORNER_LAT: &str = "cla";
    pub const AREA: &str = "srf";
    pub const MASK: &str = "msk";
}

/// Corner slots in their fixed counter-clockwise order.
pub mod corner {
    pub const SW: usize = 0;
    pub const SE: usize = 1;
    pub const NE: usize = 2;
    pub const NW: usize = 3;
}
