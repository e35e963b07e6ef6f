#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod error;
pub mod geo;
pub mod mosaic;
pub mod ping;
pub mod pipeline;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
pub mod angle;
pub mod image;
pub mod slant;
pub mod stripe;
pub mod track;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline + configuration + results.
pub use crate::config::{CableLag, MosaicConfig, MosaicParams};
pub use crate::error::PipelineError;
pub use crate::pipeline::{AbortToken, LogProgress, MosaicPipeline, ProgressSink, SurveyFile};
pub use crate::types::{FileReport, GeoPoint, ProjPoint};

// Collaborator seams generally useful to embedders.
pub use crate::geo::{auto_zone, GaussKruger, ProjectTo};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::config::{CableLag, MosaicConfig, MosaicParams};
    pub use crate::pipeline::{AbortToken, LogProgress, MosaicPipeline, SurveyFile};
    pub use crate::types::{FileReport, GeoPoint, ProjPoint};
}
