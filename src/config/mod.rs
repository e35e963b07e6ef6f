//! Configuration types for the mosaic pipeline.
//!
//! [`MosaicConfig`] is the serde-deserializable form read from a JSON file;
//! [`MosaicParams`] is the validated, immutable value handed to the pipeline
//! at construction. Validation fails fast, before any survey file is touched.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Tow-cable lag target: one value for the whole track, or a piecewise
/// schedule of `(stripe index, lag)` breakpoints, each applying from its
/// index onward.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CableLag {
    Uniform(f64),
    Schedule(Vec<LagBreakpoint>),
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct LagBreakpoint {
    pub from_stripe: usize,
    pub lag_m: f64,
}

impl Default for CableLag {
    fn default() -> Self {
        CableLag::Uniform(0.0)
    }
}

impl CableLag {
    /// Lag target in meters for the stripe at `index`. Before the first
    /// breakpoint of a schedule the lag is zero.
    pub fn lag_at(&self, index: usize) -> f64 {
        match self {
            CableLag::Uniform(lag) => *lag,
            CableLag::Schedule(points) => points
                .iter()
                .filter(|bp| bp.from_stripe <= index)
                .last()
                .map(|bp| bp.lag_m)
                .unwrap_or(0.0),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            CableLag::Uniform(lag) if *lag < 0.0 => {
                Err(format!("cable lag must be >= 0, got {lag}"))
            }
            CableLag::Schedule(points) => {
                if points.iter().any(|bp| bp.lag_m < 0.0) {
                    return Err("cable lag breakpoints must be >= 0".into());
                }
                if points.windows(2).any(|w| w[0].from_stripe > w[1].from_stripe) {
                    return Err("cable lag breakpoints must be ordered by stripe index".into());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Slant-range correction knobs.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlantConfig {
    /// Whether the correction pass runs at all.
    pub enabled: bool,
    /// Physical distance below the sensor where the bottom search begins (m).
    pub search_start_m: f64,
    /// Odd width of the step kernel applied to the edge-response curve.
    pub search_window: usize,
    /// Signed sample offset added to the detected first-reflection index.
    /// Negative values keep a usable blind strip near nadir.
    pub reflection_bias: i32,
}

impl Default for SlantConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            search_start_m: 0.0,
            search_window: 51,
            reflection_bias: 0,
        }
    }
}

/// Raw pipeline configuration as read from disk.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MosaicConfig {
    /// Output scale in pixels per meter (> 0).
    pub scale: f64,
    /// Canvas margin around the outermost stripes, meters (>= 0).
    pub margin_m: f64,
    /// Tow-cable lag compensation.
    pub cable_lag: CableLag,
    /// Gamma exponent applied to the stacked amplitude image (> 0).
    pub gamma: f64,
    /// Heading smoothing window (odd, >= 3).
    pub smoothing_window: usize,
    /// Polynomial order of the heading smoother (< window).
    pub smoothing_order: usize,
    /// Minimum rendered stripe thickness in pixels (>= 1).
    pub min_stripe_px: u32,
    /// Fixed projection zone; `None` selects the zone from the first
    /// ping's longitude.
    pub projection_zone: Option<u32>,
    pub slant: SlantConfig,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            margin_m: 10.0,
            cable_lag: CableLag::default(),
            gamma: 1.0,
            smoothing_window: 11,
            smoothing_order: 2,
            min_stripe_px: 3,
            projection_zone: None,
            slant: SlantConfig::default(),
        }
    }
}

/// Validated pipeline parameters. Constructed once per run; immutable while
/// files are processed.
#[derive(Clone, Debug, PartialEq)]
pub struct MosaicParams {
    pub scale: f64,
    pub margin_m: f64,
    pub cable_lag: CableLag,
    pub gamma: f64,
    pub smoothing_window: usize,
    pub smoothing_order: usize,
    pub min_stripe_px: u32,
    pub projection_zone: Option<u32>,
    pub slant: SlantConfig,
}

impl Default for MosaicParams {
    fn default() -> Self {
        MosaicParams::try_from(MosaicConfig::default()).expect("default config is valid")
    }
}

impl TryFrom<MosaicConfig> for MosaicParams {
    type Error = PipelineError;

    fn try_from(cfg: MosaicConfig) -> Result<Self, PipelineError> {
        let fail = |detail: String| PipelineError::Configuration { detail };

        if !(cfg.scale > 0.0) {
            return Err(fail(format!("scale must be > 0 px/m, got {}", cfg.scale)));
        }
        if cfg.margin_m < 0.0 {
            return Err(fail(format!("margin must be >= 0 m, got {}", cfg.margin_m)));
        }
        if !(cfg.gamma > 0.0) {
            return Err(fail(format!("gamma must be > 0, got {}", cfg.gamma)));
        }
        if cfg.smoothing_window < 3 || cfg.smoothing_window % 2 == 0 {
            return Err(fail(format!(
                "smoothing window must be odd and >= 3, got {}",
                cfg.smoothing_window
            )));
        }
        if cfg.smoothing_order + 2 > cfg.smoothing_window {
            return Err(fail(format!(
                "smoothing window {} too small for polynomial order {}",
                cfg.smoothing_window, cfg.smoothing_order
            )));
        }
        if cfg.slant.search_window % 2 == 0 || cfg.slant.search_window == 0 {
            return Err(fail(format!(
                "slant search window must be odd, got {}",
                cfg.slant.search_window
            )));
        }
        if cfg.slant.search_start_m < 0.0 {
            return Err(fail(format!(
                "slant search start must be >= 0 m, got {}",
                cfg.slant.search_start_m
            )));
        }
        if cfg.min_stripe_px < 1 {
            return Err(fail("minimum stripe thickness must be >= 1 px".into()));
        }
        cfg.cable_lag.validate().map_err(fail)?;

        Ok(Self {
            scale: cfg.scale,
            margin_m: cfg.margin_m,
            cable_lag: cfg.cable_lag,
            gamma: cfg.gamma,
            smoothing_window: cfg.smoothing_window,
            smoothing_order: cfg.smoothing_order,
            min_stripe_px: cfg.min_stripe_px,
            projection_zone: cfg.projection_zone,
            slant: cfg.slant,
        })
    }
}

/// Read a [`MosaicConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<MosaicConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
