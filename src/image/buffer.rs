//! Owned raster buffers in row-major layout.

/// Single-channel f32 image. Suited for numeric processing of amplitude
/// data before quantization.
#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    /// Quantize to 8 bits, clamping values to [0, 255].
    pub fn to_gray_u8(&self) -> GrayU8 {
        let data = self
            .data
            .iter()
            .map(|&v| v.clamp(0.0, 255.0) as u8)
            .collect();
        GrayU8 {
            w: self.w,
            h: self.h,
            data,
        }
    }
}

/// Owned 8-bit single-channel buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayU8 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl GrayU8 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Buffer filled with a constant value.
    pub fn filled(w: usize, h: usize, value: u8) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.w + x] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }

    /// Replicate the single channel into an interleaved RGB buffer.
    pub fn to_rgb(&self) -> RgbU8 {
        let mut data = Vec::with_capacity(self.w * self.h * 3);
        for &v in &self.data {
            data.extend_from_slice(&[v, v, v]);
        }
        RgbU8 {
            w: self.w,
            h: self.h,
            data,
        }
    }
}

/// Owned interleaved 3-channel 8-bit buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbU8 {
    pub w: usize,
    pub h: usize,
    /// `w * h * 3` bytes, row-major, RGB interleaved.
    pub data: Vec<u8>,
}

impl RgbU8 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h * 3],
        }
    }

    /// Buffer filled with a constant gray value.
    pub fn filled(w: usize, h: usize, value: u8) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h * 3],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.w + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, px: [u8; 3]) {
        let i = (y * self.w + x) * 3;
        self.data[i..i + 3].copy_from_slice(&px);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_layout() {
        let img = ImageF32 {
            w: 2,
            h: 2,
            data: vec![1.0, 2.0, 3.0, 4.0],
        };
        assert_eq!(img.get(1, 0), 2.0);
        assert_eq!(img.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn quantization_clamps() {
        let img = ImageF32 {
            w: 3,
            h: 1,
            data: vec![-5.0, 127.6, 300.0],
        };
        let gray = img.to_gray_u8();
        assert_eq!(gray.data, vec![0, 127, 255]);
    }

    #[test]
    fn gray_to_rgb_replicates_channels() {
        let mut gray = GrayU8::new(2, 1);
        gray.set(0, 0, 10);
        gray.set(1, 0, 20);
        let rgb = gray.to_rgb();
        assert_eq!(rgb.pixel(0, 0), [10, 10, 10]);
        assert_eq!(rgb.pixel(1, 0), [20, 20, 20]);
    }
}
