//! Bilinear gray-level sampling with an extend-edge border.
//!
//! Refiners work in undistorted pixel coordinates. When a lens model is set,
//! every sample position is first mapped into the distorted input image.

use super::ImageView;
use crate::distort::PixelTransform;

/// Borrowed gray image plus optional undistorted → distorted mapping.
pub struct ImageSampler<'a, I: ImageView> {
    image: &'a I,
    to_distorted: Option<&'a dyn PixelTransform>,
}

impl<'a, I> ImageSampler<'a, I>
where
    I: ImageView,
    I::Pixel: Into<f32>,
{
    pub fn new(image: &'a I) -> Self {
        Self {
            image,
            to_distorted: None,
        }
    }

    pub fn with_transform(image: &'a I, to_distorted: Option<&'a dyn PixelTransform>) -> Self {
        Self {
            image,
            to_distorted,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height()
    }

    #[inline]
    fn to_image(&self, x: f64, y: f64) -> [f64; 2] {
        match self.to_distorted {
            Some(t) => t.compute(x, y),
            None => [x, y],
        }
    }

    /// True when `(x, y)` maps to a position covered by the image pixels.
    pub fn is_inside(&self, x: f64, y: f64) -> bool {
        let [u, v] = self.to_image(x, y);
        u >= 0.0
            && v >= 0.0
            && u <= (self.image.width() as f64 - 1.0)
            && v <= (self.image.height() as f64 - 1.0)
    }

    /// Interpolated intensity at `(x, y)`; positions outside the image read
    /// the nearest edge pixel. Empty images and NaN positions read zero.
    pub fn get(&self, x: f64, y: f64) -> f32 {
        let [u, v] = self.to_image(x, y);
        let w = self.image.width();
        let h = self.image.height();
        if w == 0 || h == 0 || !u.is_finite() || !v.is_finite() {
            return 0.0;
        }

        let x0 = u.floor();
        let y0 = v.floor();
        let dx = (u - x0) as f32;
        let dy = (v - y0) as f32;
        let x0 = x0 as isize;
        let y0 = y0 as isize;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x0 + 1, y0);
        let p01 = self.pixel(x0, y0 + 1);
        let p11 = self.pixel(x0 + 1, y0 + 1);

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;
        top * (1.0 - dy) + bottom * dy
    }

    #[inline]
    fn pixel(&self, x: isize, y: isize) -> f32 {
        let xi = clamp_index(x, self.image.width());
        let yi = clamp_index(y, self.image.height());
        self.image.pixel(xi, yi).into()
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else {
        (i as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageU8;

    struct Shift(f64);

    impl PixelTransform for Shift {
        fn compute(&self, x: f64, y: f64) -> [f64; 2] {
            [x + self.0, y]
        }
    }

    fn gradient_3x3() -> Vec<u8> {
        vec![
            0, 10, 20, //
            30, 40, 50, //
            60, 70, 80,
        ]
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let data = gradient_3x3();
        let img = ImageU8 {
            w: 3,
            h: 3,
            stride: 3,
            data: &data,
        };
        let s = ImageSampler::new(&img);
        assert!((s.get(0.5, 0.0) - 5.0).abs() < 1e-5);
        assert!((s.get(1.0, 1.0) - 40.0).abs() < 1e-5);
        assert!((s.get(0.5, 0.5) - 20.0).abs() < 1e-5);
    }

    #[test]
    fn border_extends_edge_pixels() {
        let data = gradient_3x3();
        let img = ImageU8 {
            w: 3,
            h: 3,
            stride: 3,
            data: &data,
        };
        let s = ImageSampler::new(&img);
        assert!((s.get(-4.0, 0.0) - 0.0).abs() < 1e-5);
        assert!((s.get(7.0, 7.0) - 80.0).abs() < 1e-5);
        assert!(!s.is_inside(-0.1, 1.0));
        assert!(s.is_inside(2.0, 2.0));
    }

    #[test]
    fn transform_is_applied_before_sampling() {
        let data = gradient_3x3();
        let img = ImageU8 {
            w: 3,
            h: 3,
            stride: 3,
            data: &data,
        };
        let shift = Shift(1.0);
        let s = ImageSampler::with_transform(&img, Some(&shift));
        assert!((s.get(0.0, 1.0) - 40.0).abs() < 1e-5);
        assert!(!s.is_inside(1.5, 0.0));
    }
}
