//! Geographic collaborators: the projected-coordinate transform, track CSV
//! sidecars and georeference exports.

pub mod csv;
pub mod georef;
pub mod proj;

pub use georef::{affine_transform, control_points, ControlPoint, GeoTransform};
pub use proj::{auto_zone, GaussKruger, ProjectTo};
