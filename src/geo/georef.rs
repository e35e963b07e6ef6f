//! Georeference export: canvas corner control points and the affine
//! transform embedded next to the output raster.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::mosaic::CanvasExtent;
use crate::types::ProjPoint;

/// One pixel ↔ projected-coordinate correspondence.
///
/// Pixel coordinates follow the bottom-left origin convention used by the
/// sidecar consumers: `(0, 0)` is the canvas' bottom-left pixel even though
/// raster row 0 is the top.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ControlPoint {
    pub pixel_x: u32,
    pub pixel_y: u32,
    pub x: f64,
    pub y: f64,
}

/// The four canvas corners in sidecar order: top-left, bottom-left,
/// bottom-right, top-right.
pub fn control_points(extent: CanvasExtent, width_px: usize, height_px: usize) -> [ControlPoint; 4] {
    let (w, h) = (width_px as u32, height_px as u32);
    let corner = |px, py, p: ProjPoint| ControlPoint {
        pixel_x: px,
        pixel_y: py,
        x: p.x,
        y: p.y,
    };
    [
        corner(0, h, ProjPoint::new(extent.min_x, extent.max_y)),
        corner(0, 0, ProjPoint::new(extent.min_x, extent.min_y)),
        corner(w, 0, ProjPoint::new(extent.max_x, extent.min_y)),
        corner(w, h, ProjPoint::new(extent.max_x, extent.max_y)),
    ]
}

/// Write the Surfer-style control-point sidecar.
pub fn write_control_points(path: &Path, points: &[ControlPoint]) -> Result<(), String> {
    let file = fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write!(
        writer,
        "Surfer Georeference Control Point File\nVersion=1\nMethod=3\nName,Raster X,Raster Y,Longitude,Latitude,Active\n"
    )
    .and_then(|_| {
        for cp in points {
            writeln!(writer, ",{},{},{},{},1", cp.pixel_x, cp.pixel_y, cp.x, cp.y)?;
        }
        writer.flush()
    })
    .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Affine transform of the output raster: the projected coordinate of the
/// top-left pixel origin and the signed-positive pixel size in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    /// EPSG code of the projected coordinate system (zone-tagged).
    pub epsg: u32,
}

/// Derive the raster's affine transform from the canvas extent. The EPSG
/// tag offsets the projection zone into the Pulkovo 1942 zoned family.
pub fn affine_transform(
    extent: CanvasExtent,
    width_px: usize,
    height_px: usize,
    zone: u32,
) -> GeoTransform {
    GeoTransform {
        origin_x: extent.min_x,
        origin_y: extent.max_y,
        pixel_width: extent.width_m() / width_px as f64,
        pixel_height: extent.height_m() / height_px as f64,
        epsg: 28_400 + zone,
    }
}
