use serde::Serialize;

/// Geographic position in decimal degrees (WGS84).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Position in a planar projected coordinate system (meters), together
/// with the 6°-zone the projection was evaluated in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjPoint {
    /// Easting in meters.
    pub x: f64,
    /// Northing in meters.
    pub y: f64,
}

impl ProjPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Summary of one processed survey file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FileReport {
    pub name: String,
    pub pings: usize,
    pub stripes: usize,
    pub corrected_pings: usize,
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub projection_zone: u32,
    pub skipped: bool,
}
