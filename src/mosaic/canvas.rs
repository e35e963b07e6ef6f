use log::debug;

use super::StripeBlock;
use crate::error::PipelineError;
use crate::image::RgbU8;
use crate::types::ProjPoint;

/// Projected-coordinate bounds of the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasExtent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CanvasExtent {
    #[inline]
    pub fn width_m(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height_m(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// "Over" alpha compositing of a block pixel onto the accumulated canvas.
#[inline]
pub fn composite_over(background: [u8; 3], color: [u8; 3], alpha: u8) -> [u8; 3] {
    let a = alpha as u32;
    let inv = 255 - a;
    [
        ((background[0] as u32 * inv + color[0] as u32 * a) / 255) as u8,
        ((background[1] as u32 * inv + color[1] as u32 * a) / 255) as u8,
        ((background[2] as u32 * inv + color[2] as u32 * a) / 255) as u8,
    ]
}

/// Output raster spanning the union of all rendered blocks plus a margin.
///
/// Holds the white-initialized RGB buffer, the saturating alpha accumulator
/// and the projected corner coordinates used for georeferencing.
pub struct Canvas {
    rgb: RgbU8,
    alpha: Vec<u8>,
    scale: f64,
    extent: CanvasExtent,
}

impl Canvas {
    /// Allocate a canvas covering every block's corners expanded by
    /// `margin_m` meters on all sides.
    pub fn for_blocks(
        blocks: &[StripeBlock],
        scale: f64,
        margin_m: f64,
    ) -> Result<Self, PipelineError> {
        if blocks.is_empty() {
            return Err(PipelineError::DegenerateGeometry {
                detail: "no rendered stripes to place on the canvas".into(),
            });
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for block in blocks {
            let tl = block.top_left();
            let br = block.bottom_right();
            min_x = min_x.min(tl.x);
            max_x = max_x.max(br.x);
            max_y = max_y.max(tl.y);
            min_y = min_y.min(br.y);
        }
        let extent = CanvasExtent {
            min_x: min_x - margin_m,
            max_x: max_x + margin_m,
            min_y: min_y - margin_m,
            max_y: max_y + margin_m,
        };

        let w = ((extent.width_m() * scale) as usize).max(1);
        let h = ((extent.height_m() * scale) as usize).max(1);
        debug!(
            "canvas {w}x{h} px covering {:.1}x{:.1} m",
            extent.width_m(),
            extent.height_m()
        );
        Ok(Self {
            rgb: RgbU8::filled(w, h, 255),
            alpha: vec![0; w * h],
            scale,
            extent,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rgb.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rgb.h
    }

    #[inline]
    pub fn extent(&self) -> CanvasExtent {
        self.extent
    }

    #[inline]
    pub fn rgb(&self) -> &RgbU8 {
        &self.rgb
    }

    /// Canvas pixel of a projected point; row 0 is the canvas top
    /// (largest northing).
    pub fn to_pixel(&self, p: ProjPoint) -> (i64, i64) {
        let x = (p.x - self.extent.min_x) * self.scale;
        let y = self.rgb.h as f64 - (p.y - self.extent.min_y) * self.scale;
        (x as i64, y as i64)
    }

    /// Composite a block onto the canvas at its projected center. Later
    /// blocks dominate overlap regions; canvas alpha saturates upward so
    /// overlaps stay opaque.
    pub fn place(&mut self, block: &StripeBlock) {
        let (cx, cy) = self.to_pixel(block.center());
        let left = cx - block.width_px() as i64 / 2;
        let top = cy - block.height_px() as i64 / 2;

        for by in 0..block.height_px() {
            let y = top + by as i64;
            if y < 0 || y >= self.rgb.h as i64 {
                continue;
            }
            for bx in 0..block.width_px() {
                let x = left + bx as i64;
                if x < 0 || x >= self.rgb.w as i64 {
                    continue;
                }
                let a = block.alpha().get(bx, by);
                if a == 0 {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                let blended = composite_over(
                    self.rgb.pixel(x, y),
                    block.image().pixel(bx, by),
                    a,
                );
                self.rgb.set_pixel(x, y, blended);
                let idx = y * self.rgb.w + x;
                self.alpha[idx] = self.alpha[idx].saturating_add(a);
            }
        }
    }

    /// Interleaved RGBA bytes: the composited color with the accumulated
    /// alpha as the fourth channel.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.rgb.w * self.rgb.h * 4);
        for (px, &a) in self.rgb.data.chunks_exact(3).zip(&self.alpha) {
            out.extend_from_slice(px);
            out.push(a);
        }
        out
    }
}
