//! Per-file mosaic pipeline orchestration.
//!
//! Files are processed strictly one at a time; every stage fully consumes
//! the previous stage's output. Each file gets a fresh ping store, track and
//! canvas, released before the next file begins. Cancellation is
//! cooperative and coarse-grained: the abort token is polled before each
//! file and between stages, and a cancelled file commits no outputs.

mod naming;

pub use naming::FileNaming;

use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::MosaicParams;
use crate::error::PipelineError;
use crate::geo::csv::{read_projected_csv, write_track_csv};
use crate::geo::{affine_transform, auto_zone, control_points, GaussKruger, ProjectTo};
use crate::image::io::{save_rgba_png, write_json_file};
use crate::mosaic::{Canvas, StripeBlock};
use crate::ping::{Ping, PingStore};
use crate::slant::SlantCorrector;
use crate::stripe::segment_stripes;
use crate::track::Track;
use crate::types::{FileReport, ProjPoint};

/// Single-writer, single-reader cooperative cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the pipeline stops at the next stage boundary.
    pub fn request_abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receiver of status text and in-progress canvas images.
pub trait ProgressSink {
    fn status(&mut self, message: &str);
    /// Called once per file with the finished canvas.
    fn canvas(&mut self, _canvas: &Canvas) {}
}

/// Default sink that forwards status text to the `log` facade.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn status(&mut self, message: &str) {
        info!("{message}");
    }
}

/// One survey recording queued for processing.
///
/// `projected_track` names a previously exported projected-position CSV to
/// load instead of recomputing positions; `output_dir` selects where the
/// file's outputs land (none means an in-memory run).
pub struct SurveyFile {
    pub name: String,
    pub pings: Vec<Ping>,
    pub projected_track: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl SurveyFile {
    pub fn new(name: &str, pings: Vec<Ping>) -> Self {
        Self {
            name: name.to_string(),
            pings,
            projected_track: None,
            output_dir: None,
        }
    }
}

/// The mosaic-assembly pipeline for a fixed parameter set.
pub struct MosaicPipeline {
    params: MosaicParams,
    projector: Box<dyn ProjectTo>,
}

impl MosaicPipeline {
    pub fn new(params: MosaicParams) -> Self {
        Self {
            params,
            projector: Box::new(GaussKruger),
        }
    }

    /// Substitute the geographic → projected transform.
    pub fn with_projector(params: MosaicParams, projector: Box<dyn ProjectTo>) -> Self {
        Self { params, projector }
    }

    /// Process `files` in order. Per-file failures (missing sidecars,
    /// degenerate geometry) skip that file and continue; an abort request
    /// surfaces as [`PipelineError::Aborted`] distinct from completion.
    pub fn run(
        &self,
        files: Vec<SurveyFile>,
        abort: &AbortToken,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<FileReport>, PipelineError> {
        let total = files.len();
        let mut reports = Vec::with_capacity(total);
        for (file_no, file) in files.into_iter().enumerate() {
            if abort.is_aborted() {
                progress.status("Processing cancelled");
                return Err(PipelineError::Aborted);
            }
            let head = format!("File {} of {total} - {}", file_no + 1, file.name);
            progress.status(&head);
            let name = file.name.clone();
            match self.process_file(file, abort, progress) {
                Ok(report) => reports.push(report),
                Err(PipelineError::Aborted) => {
                    progress.status("Processing cancelled");
                    return Err(PipelineError::Aborted);
                }
                Err(err) if err.is_per_file() => {
                    warn!("{name}: {err}");
                    progress.status(&format!("{head}: skipped ({err})"));
                    reports.push(FileReport {
                        name,
                        skipped: true,
                        ..Default::default()
                    });
                }
                Err(err) => return Err(err),
            }
        }
        progress.status("Processing finished");
        Ok(reports)
    }

    fn process_file(
        &self,
        file: SurveyFile,
        abort: &AbortToken,
        progress: &mut dyn ProgressSink,
    ) -> Result<FileReport, PipelineError> {
        let params = &self.params;
        let ping_count = file.pings.len();
        if ping_count < 2 {
            return Err(PipelineError::TooFewPings {
                found: ping_count,
                minimum: 2,
            });
        }
        let mut store = PingStore::new(file.pings);

        // Navigation: project the recorded track, or load a previously
        // exported projected CSV.
        let track_geo = store.track_wgs84();
        let zone = params
            .projection_zone
            .unwrap_or_else(|| auto_zone(track_geo[0].lon));
        let projected: Vec<ProjPoint> = match &file.projected_track {
            Some(path) => read_projected_csv(path)?,
            None => track_geo
                .iter()
                .map(|&g| self.projector.project(g, zone))
                .collect(),
        };
        store.assign_projected_positions(&projected)?;

        if abort.is_aborted() {
            return Err(PipelineError::Aborted);
        }

        // Slant-range correction runs to completion once started; abort is
        // only honored at stage boundaries.
        let corrected = if params.slant.enabled {
            progress.status("Applying slant range correction");
            SlantCorrector::new(&params.slant).correct_store(&mut store)
        } else {
            0
        };

        let stacked = store.stacked_image(params.gamma);
        let stripes = segment_stripes(&store, &stacked)?;
        if stripes.is_empty() {
            return Err(PipelineError::DegenerateGeometry {
                detail: "no stripes could be segmented".into(),
            });
        }
        progress.status(&format!("Segmented {} stripes", stripes.len()));

        if abort.is_aborted() {
            return Err(PipelineError::Aborted);
        }

        let mut track = Track::from_stripes(&stripes);
        track.smooth_headings(params.smoothing_window, params.smoothing_order);
        track.apply_cable_lag(&params.cable_lag);
        track.smooth_headings(params.smoothing_window, params.smoothing_order);

        progress.status("Building mosaic");
        let blocks: Vec<StripeBlock> = stripes
            .iter()
            .zip(track.points())
            .zip(track.headings())
            .map(|((stripe, &center), &heading)| {
                let mut block = StripeBlock::render(stripe, params.scale, params.min_stripe_px);
                block.set_center(center);
                block.rotate(heading);
                block
            })
            .collect();

        let mut canvas = Canvas::for_blocks(&blocks, params.scale, params.margin_m)?;
        for block in &blocks {
            canvas.place(block);
        }
        progress.canvas(&canvas);

        if abort.is_aborted() {
            return Err(PipelineError::Aborted);
        }

        // Outputs are committed in one final step so a cancelled or failed
        // file leaves nothing half-written.
        if let Some(dir) = &file.output_dir {
            let naming = FileNaming::new(dir, &file.name);
            let io_err = |detail: String| PipelineError::Io { detail };

            write_track_csv(
                &naming.track_wgs84(),
                track_geo.iter().map(|g| (g.lon, g.lat)),
            )
            .map_err(io_err)?;
            write_track_csv(
                &naming.track_projected(),
                projected.iter().map(|p| (p.x, p.y)),
            )
            .map_err(io_err)?;

            let extent = canvas.extent();
            let corners = control_points(extent, canvas.width(), canvas.height());
            crate::geo::georef::write_control_points(&naming.control_points(), &corners)
                .map_err(io_err)?;
            let transform = affine_transform(extent, canvas.width(), canvas.height(), zone);
            write_json_file(&naming.mosaic_meta(), &transform).map_err(io_err)?;
            save_rgba_png(
                &naming.mosaic_png(),
                canvas.width(),
                canvas.height(),
                canvas.to_rgba(),
            )
            .map_err(io_err)?;
            progress.status(&format!("Saved mosaic {}", naming.mosaic_png().display()));
        }

        Ok(FileReport {
            name: file.name,
            pings: ping_count,
            stripes: stripes.len(),
            corrected_pings: corrected,
            canvas_width: canvas.width(),
            canvas_height: canvas.height(),
            projection_zone: zone,
            skipped: false,
        })
    }
}
