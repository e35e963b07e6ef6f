//! Geometric resampling: bilinear resize and center rotation.
//!
//! Rotation grows the output to the rotated bounding box of the input
//! rectangle and maps pixels through an affine transform composed of the
//! rotation about the source center and the translation onto the new
//! center. Destination pixels falling outside the source read as zero,
//! which attenuates the opacity mask at rotated corners.

use nalgebra::Matrix3;

use super::{GrayU8, RgbU8};

/// Bounding box of a `w × h` rectangle rotated by `degrees`.
pub fn rotated_extent(w: usize, h: usize, degrees: f64) -> (usize, usize) {
    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let w_new = (w as f64) * cos + (h as f64) * sin;
    let h_new = (h as f64) * cos + (w as f64) * sin;
    (w_new as usize, h_new as usize)
}

/// Affine transform rotating by `degrees` (counterclockwise in image
/// coordinates) about `center` and translating the result by `translation`.
pub fn rotation_about_center(center: (f64, f64), translation: (f64, f64), degrees: f64) -> Matrix3<f64> {
    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin(), rad.cos());
    let (cx, cy) = center;
    #[rustfmt::skip]
    let rot = Matrix3::new(
        cos,  sin, (1.0 - cos) * cx - sin * cy,
        -sin, cos, sin * cx + (1.0 - cos) * cy,
        0.0,  0.0, 1.0,
    );
    let mut tr = Matrix3::identity();
    tr[(0, 2)] = translation.0;
    tr[(1, 2)] = translation.1;
    tr * rot
}

#[inline]
fn sample_bilinear(data: &[u8], w: usize, h: usize, channels: usize, c: usize, x: f64, y: f64) -> f64 {
    if x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64 {
        return 0.0;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let fetch = |xi: f64, yi: f64| -> f64 {
        if xi < 0.0 || yi < 0.0 || xi >= w as f64 || yi >= h as f64 {
            0.0
        } else {
            data[(yi as usize * w + xi as usize) * channels + c] as f64
        }
    };
    let v00 = fetch(x0, y0);
    let v10 = fetch(x0 + 1.0, y0);
    let v01 = fetch(x0, y0 + 1.0);
    let v11 = fetch(x0 + 1.0, y0 + 1.0);
    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}

fn warp(data: &[u8], w: usize, h: usize, channels: usize, inv: &Matrix3<f64>, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut out = vec![0u8; dst_w * dst_h * channels];
    for y in 0..dst_h {
        for x in 0..dst_w {
            let sx = inv[(0, 0)] * x as f64 + inv[(0, 1)] * y as f64 + inv[(0, 2)];
            let sy = inv[(1, 0)] * x as f64 + inv[(1, 1)] * y as f64 + inv[(1, 2)];
            for c in 0..channels {
                let v = sample_bilinear(data, w, h, channels, c, sx, sy);
                out[(y * dst_w + x) * channels + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Rotate an RGB block and its opacity mask by `degrees` about their shared
/// center, growing both to the rotated bounding box.
pub fn rotate_block(image: &RgbU8, mask: &GrayU8, degrees: f64) -> (RgbU8, GrayU8) {
    debug_assert_eq!(image.w, mask.w);
    debug_assert_eq!(image.h, mask.h);
    let (dst_w, dst_h) = rotated_extent(image.w, image.h, degrees);
    let center = ((image.w / 2) as f64, (image.h / 2) as f64);
    let translation = (
        (dst_w / 2) as f64 - center.0,
        (dst_h / 2) as f64 - center.1,
    );
    let forward = rotation_about_center(center, translation, degrees);
    let inv = forward
        .try_inverse()
        .unwrap_or_else(Matrix3::identity);

    let rgb = RgbU8 {
        w: dst_w,
        h: dst_h,
        data: warp(&image.data, image.w, image.h, 3, &inv, dst_w, dst_h),
    };
    let alpha = GrayU8 {
        w: dst_w,
        h: dst_h,
        data: warp(&mask.data, mask.w, mask.h, 1, &inv, dst_w, dst_h),
    };
    (rgb, alpha)
}

/// Bilinear resize of a single-channel block.
pub fn resize_bilinear(src: &GrayU8, dst_w: usize, dst_h: usize) -> GrayU8 {
    if dst_w == src.w && dst_h == src.h {
        return src.clone();
    }
    let mut out = GrayU8::new(dst_w, dst_h);
    if src.w == 0 || src.h == 0 || dst_w == 0 || dst_h == 0 {
        return out;
    }
    let sx = src.w as f64 / dst_w as f64;
    let sy = src.h as f64 / dst_h as f64;
    for y in 0..dst_h {
        let src_y = (y as f64 + 0.5) * sy - 0.5;
        for x in 0..dst_w {
            let src_x = (x as f64 + 0.5) * sx - 0.5;
            let v = sample_bilinear(
                &src.data,
                src.w,
                src.h,
                1,
                0,
                src_x.clamp(0.0, (src.w - 1) as f64),
                src_y.clamp(0.0, (src.h - 1) as f64),
            );
            out.set(x, y, v.round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}
