use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl Default for ImageSize {
    /// Broadcast 720p frame, 1280x720.
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ImageSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Principal point of an ideal camera centred on this frame.
    pub fn center(&self) -> [f64; 2] {
        [self.width as f64 / 2.0, self.height as f64 / 2.0]
    }

    /// `true` when `p` lies inside `[0, width) x [0, height)`.
    #[inline]
    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f64 && p.y < self.height as f64
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Image of the given size with every pixel set to `value`.
    pub fn filled(size: ImageSize, value: u8) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![value; size.area()],
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
fn get_gray_clamped(src: &GrayImageView<'_>, x: i64, y: i64) -> f32 {
    let xc = x.clamp(0, src.width as i64 - 1) as usize;
    let yc = y.clamp(0, src.height as i64 - 1) as usize;
    src.data[yc * src.width + xc] as f32
}

/// Bilinear sample with a constant zero border.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).round().clamp(0.0, 255.0) as u8
}

// Keys cubic kernel with a = -0.75, the usual choice for image resampling.
const CUBIC_A: f32 = -0.75;

#[inline]
fn cubic_weights(t: f32) -> [f32; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let w2 = ((a + 2.0) * (1.0 - t) - (a + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}

/// Resample `src` to `out_w x out_h` with bicubic interpolation.
///
/// Pixel centres are aligned (`src = (dst + 0.5) * scale - 0.5`) and the
/// border is replicated, so a constant image stays constant.
pub fn resize_bicubic(src: &GrayImageView<'_>, out_w: usize, out_h: usize) -> GrayImage {
    let mut out = vec![0u8; out_w * out_h];
    if src.width == 0 || src.height == 0 {
        return GrayImage {
            width: out_w,
            height: out_h,
            data: out,
        };
    }

    let scale_x = src.width as f32 / out_w as f32;
    let scale_y = src.height as f32 / out_h as f32;

    for y in 0..out_h {
        let sy = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = sy.floor();
        let wy = cubic_weights(sy - y0);
        let y0 = y0 as i64;

        for x in 0..out_w {
            let sx = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = sx.floor();
            let wx = cubic_weights(sx - x0);
            let x0 = x0 as i64;

            let mut acc = 0.0f32;
            for (j, wyj) in wy.iter().enumerate() {
                let yy = y0 - 1 + j as i64;
                let mut row = 0.0f32;
                for (i, wxi) in wx.iter().enumerate() {
                    row += wxi * get_gray_clamped(src, x0 - 1 + i as i64, yy);
                }
                acc += wyj * row;
            }
            out[y * out_w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_weights_partition_unity() {
        for t in [0.0_f32, 0.25, 0.5, 0.9] {
            let w = cubic_weights(t);
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "t={t} sum={sum}");
        }
        assert_eq!(cubic_weights(0.0)[1], 1.0);
    }

    #[test]
    fn resize_keeps_constant_image_constant() {
        let img = GrayImage::filled(ImageSize::new(100, 70), 255);
        let out = resize_bicubic(&img.view(), 105, 68);
        assert_eq!(out.size(), ImageSize::new(105, 68));
        assert!(out.data.iter().all(|&v| v == 255));
    }

    #[test]
    fn bilinear_sampling_fades_into_zero_border() {
        let img = GrayImage::filled(ImageSize::new(4, 4), 200);
        let view = img.view();
        assert_eq!(sample_bilinear_u8(&view, 1.0, 1.0), 200);
        assert_eq!(sample_bilinear_u8(&view, 3.5, 1.0), 100);
        assert_eq!(sample_bilinear_u8(&view, -2.0, 1.0), 0);
    }

    #[test]
    fn frame_containment_is_half_open() {
        let size = ImageSize::default();
        assert!(size.contains(Point2::new(0.0, 0.0)));
        assert!(size.contains(Point2::new(1279.4, 719.9)));
        assert!(!size.contains(Point2::new(1280.0, 10.0)));
        assert!(!size.contains(Point2::new(-0.1, 10.0)));
        assert_eq!(size.center(), [640.0, 360.0]);
    }
}
