//! Random training-time augmentation
//!
//! Each image gets one affine warp about its centre combining rotation,
//! shear, per-axis zoom and a shift, followed by an optional horizontal
//! flip. Pixels uncovered by the warp are filled black.

use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use rand::Rng;

/// Ranges the random transform is drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentConfig {
    /// Maximum rotation either way, in degrees
    pub rotation_degrees: f32,
    /// Maximum shift either way, as a fraction of width / height
    pub shift_fraction: f32,
    /// Maximum shear angle either way, in degrees
    pub shear_degrees: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub flip_probability: f64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            rotation_degrees: 10.0,
            shift_fraction: 0.05,
            shear_degrees: 0.05,
            zoom_min: 0.9,
            zoom_max: 1.1,
            flip_probability: 0.5,
        }
    }
}

/// One drawn transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentParams {
    pub rotation_degrees: f32,
    pub shift_x: f32,
    pub shift_y: f32,
    pub shear_degrees: f32,
    pub zoom_x: f32,
    pub zoom_y: f32,
    pub flip: bool,
}

impl AugmentParams {
    pub fn identity() -> Self {
        Self {
            rotation_degrees: 0.0,
            shift_x: 0.0,
            shift_y: 0.0,
            shear_degrees: 0.0,
            zoom_x: 1.0,
            zoom_y: 1.0,
            flip: false,
        }
    }

    /// Row-major 3x3 matrix mapping input pixels to output pixels
    pub fn matrix(&self, width: u32, height: u32) -> [f32; 9] {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;

        let (sin_r, cos_r) = self.rotation_degrees.to_radians().sin_cos();
        let (sin_s, cos_s) = self.shear_degrees.to_radians().sin_cos();

        // rotation * shear * zoom
        let a00 = cos_r * self.zoom_x;
        let a01 = (-cos_r * sin_s - sin_r * cos_s) * self.zoom_y;
        let a10 = sin_r * self.zoom_x;
        let a11 = (-sin_r * sin_s + cos_r * cos_s) * self.zoom_y;

        let tx = cx + self.shift_x - (a00 * cx + a01 * cy);
        let ty = cy + self.shift_y - (a10 * cx + a11 * cy);

        [a00, a01, tx, a10, a11, ty, 0.0, 0.0, 1.0]
    }
}

/// Applies random transforms drawn from an [`AugmentConfig`]
#[derive(Debug, Clone, Default)]
pub struct Augmenter {
    config: AugmentConfig,
}

impl Augmenter {
    pub fn new(config: AugmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Draw a transform for an image of the given size
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, width: u32, height: u32) -> AugmentParams {
        let c = &self.config;
        let max_dx = c.shift_fraction * width as f32;
        let max_dy = c.shift_fraction * height as f32;

        AugmentParams {
            rotation_degrees: symmetric(rng, c.rotation_degrees),
            shift_x: symmetric(rng, max_dx),
            shift_y: symmetric(rng, max_dy),
            shear_degrees: symmetric(rng, c.shear_degrees),
            zoom_x: between(rng, c.zoom_min, c.zoom_max),
            zoom_y: between(rng, c.zoom_min, c.zoom_max),
            flip: rng.gen_bool(c.flip_probability.clamp(0.0, 1.0)),
        }
    }

    /// Augment one image; the output keeps its dimensions
    pub fn apply<R: Rng + ?Sized>(&self, image: &RgbImage, rng: &mut R) -> RgbImage {
        let (width, height) = image.dimensions();
        let params = self.sample(rng, width, height);
        transform(image, &params)
    }
}

/// Apply a fixed transform
pub fn transform(image: &RgbImage, params: &AugmentParams) -> RgbImage {
    let (width, height) = image.dimensions();

    let warped = match Projection::from_matrix(params.matrix(width, height)) {
        Some(projection) => warp(image, &projection, Interpolation::Bilinear, Rgb([0, 0, 0])),
        None => {
            tracing::debug!("Skipping non-invertible transform {:?}", params);
            image.clone()
        }
    };

    if params.flip {
        imageops::flip_horizontal(&warped)
    } else {
        warped
    }
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    if max > 0.0 {
        rng.gen_range(-max..=max)
    } else {
        0.0
    }
}

fn between<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 128]))
    }

    #[test]
    fn test_identity_keeps_interior() {
        let image = gradient(16, 12);
        let out = transform(&image, &AugmentParams::identity());
        assert_eq!(out.dimensions(), image.dimensions());
        assert_eq!(out.get_pixel(5, 4), image.get_pixel(5, 4));
        assert_eq!(out.get_pixel(10, 7), image.get_pixel(10, 7));
    }

    #[test]
    fn test_flip_only() {
        let image = gradient(8, 4);
        let params = AugmentParams {
            flip: true,
            ..AugmentParams::identity()
        };
        let out = transform(&image, &params);
        assert_eq!(out.get_pixel(5, 1), image.get_pixel(2, 1));
    }

    #[test]
    fn test_samples_stay_in_range() {
        let augmenter = Augmenter::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let p = augmenter.sample(&mut rng, 100, 50);
            assert!(p.rotation_degrees.abs() <= 10.0);
            assert!(p.shift_x.abs() <= 5.0);
            assert!(p.shift_y.abs() <= 2.5);
            assert!(p.shear_degrees.abs() <= 0.05);
            assert!((0.9..=1.1).contains(&p.zoom_x));
            assert!((0.9..=1.1).contains(&p.zoom_y));
        }
    }

    #[test]
    fn test_apply_keeps_dimensions() {
        let augmenter = Augmenter::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let out = augmenter.apply(&gradient(30, 20), &mut rng);
        assert_eq!(out.dimensions(), (30, 20));
    }
}
