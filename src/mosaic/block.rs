use crate::image::ops::{resize_bilinear, rotate_block};
use crate::image::{GrayU8, RgbU8};
use crate::stripe::Stripe;
use crate::types::ProjPoint;

/// A stripe rendered at the output pixel scale, ready for compositing.
///
/// The block starts axis-aligned and fully opaque; rotation grows it to the
/// rotated bounding box and attenuates the mask at the corners. The center
/// defaults to the stripe origin and is usually overwritten with the
/// lag-corrected track point.
#[derive(Clone, Debug)]
pub struct StripeBlock {
    image: RgbU8,
    alpha: GrayU8,
    center: ProjPoint,
    scale: f64,
}

impl StripeBlock {
    /// Resample a stripe so it occupies `width_m * scale` by
    /// `height_m * scale` device pixels. Both dimensions are floored at
    /// `min_px` so thin stripes never vanish and adjacent stripes leave no
    /// gaps.
    pub fn render(stripe: &Stripe, scale: f64, min_px: u32) -> Self {
        let w = ((stripe.width_m * scale) as usize).max(min_px as usize);
        let h = ((stripe.height_m * scale) as usize).max(min_px as usize);
        let resized = resize_bilinear(&stripe.image, w, h);
        Self {
            image: resized.to_rgb(),
            alpha: GrayU8::filled(w, h, 255),
            center: stripe.origin,
            scale,
        }
    }

    #[inline]
    pub fn width_px(&self) -> usize {
        self.image.w
    }

    #[inline]
    pub fn height_px(&self) -> usize {
        self.image.h
    }

    #[inline]
    pub fn center(&self) -> ProjPoint {
        self.center
    }

    /// Anchor the block at a new projected center.
    pub fn set_center(&mut self, center: ProjPoint) {
        self.center = center;
    }

    #[inline]
    pub fn image(&self) -> &RgbU8 {
        &self.image
    }

    #[inline]
    pub fn alpha(&self) -> &GrayU8 {
        &self.alpha
    }

    /// Rotate image and mask by `degrees` about the block center.
    pub fn rotate(&mut self, degrees: f64) {
        let (image, alpha) = rotate_block(&self.image, &self.alpha, degrees);
        self.image = image;
        self.alpha = alpha;
    }

    /// Projected coordinate of the block's top-left corner.
    pub fn top_left(&self) -> ProjPoint {
        ProjPoint::new(
            self.center.x - self.image.w as f64 / (2.0 * self.scale),
            self.center.y + self.image.h as f64 / (2.0 * self.scale),
        )
    }

    /// Projected coordinate of the block's bottom-right corner.
    pub fn bottom_right(&self) -> ProjPoint {
        ProjPoint::new(
            self.center.x + self.image.w as f64 / (2.0 * self.scale),
            self.center.y - self.image.h as f64 / (2.0 * self.scale),
        )
    }
}
