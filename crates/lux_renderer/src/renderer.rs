//! Core path tracing.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a bounce budget
//! - Sky gradient background
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma-2 correction and 8-bit quantization

use rand::RngCore;

use crate::{Camera, Hittable, ImageConfig, Quantization};
use lux_math::random::gen_f64;
use lux_math::{Color, Interval, Ray};

/// Lower bound of the hit window for every traced ray.
pub const HIT_EPSILON: f64 = 0.0001;

const SKY_HORIZON: Color = Color::ONE;
const SKY_ZENITH: Color = Color::new(0.5, 0.7, 1.0);

/// Compute the color seen by a ray.
///
/// Each scatter multiplies the rest of the path by the material's
/// attenuation. Paths that run out of bounces or are absorbed contribute
/// black; paths that escape see the sky.
pub fn trace_color(ray: &Ray, world: &dyn Hittable, bounces: u32, rng: &mut dyn RngCore) -> Color {
    if bounces == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(HIT_EPSILON, f64::INFINITY)) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * trace_color(&result.scattered, world, bounces - 1, rng),
        None => Color::ZERO,
    }
}

/// Vertical blend from white at the horizon to light blue overhead.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    SKY_HORIZON * (1.0 - a) + SKY_ZENITH * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct and quantize a linear color into `out`.
///
/// Writes RGB, plus an opaque alpha when `out` has a fourth byte.
pub fn encode_pixel(color: Color, quantization: Quantization, out: &mut [u8]) {
    let rgb = [color.x, color.y, color.z].map(|c| quantization.quantize(linear_to_gamma(c)));
    out[..3].copy_from_slice(&rgb);
    if let Some(alpha) = out.get_mut(3) {
        *alpha = u8::MAX;
    }
}

/// Everything a worker needs to shade pixels, borrowed for one frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub camera: &'a Camera,
    pub world: &'a dyn Hittable,
    pub image: &'a ImageConfig,
    pub quantization: Quantization,
}

impl<'a> FrameContext<'a> {
    /// Average linear color of pixel `(x, y)`, with `y = 0` at the top.
    pub fn render_pixel(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
        let width_span = (self.image.width.saturating_sub(1)).max(1) as f64;
        let height_span = (self.image.height.saturating_sub(1)).max(1) as f64;
        let top = (self.image.height as f64 - 1.0).max(0.0);

        let mut pixel_color = Color::ZERO;
        for _ in 0..self.image.samples_per_pixel {
            let s = (x as f64 + gen_f64(rng)) / width_span;
            let t = (top - (y as f64 + gen_f64(rng))) / height_span;
            let ray = self.camera.get_ray(s, t, rng);
            pixel_color += trace_color(&ray, self.world, self.image.max_bounces, rng);
        }

        pixel_color / self.image.samples_per_pixel as f64
    }

    /// Render row `y` into `out`, which holds exactly one row of bytes.
    pub fn render_row(&self, y: u32, rng: &mut dyn RngCore, out: &mut [u8]) {
        let channels = self.image.color_channels as usize;
        for (x, pixel) in (0..self.image.width).zip(out.chunks_exact_mut(channels)) {
            let color = self.render_pixel(x, y, rng);
            encode_pixel(color, self.quantization, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraConfig, GeometryList, Lambertian, Sphere};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_sky_gradient() {
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(up, Color::new(0.5, 0.7, 1.0));

        let horizontal = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));
        assert!((horizontal - Color::new(0.75, 0.85, 1.0)).length() < 1e-12);

        let down = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));
        assert_eq!(down, Color::ONE);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-0.5), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-12);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_bounces_is_black() {
        let world = GeometryList::new();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(trace_color(&ray, &world, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_sky() {
        let world = GeometryList::new();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(trace_color(&ray, &world, 5, &mut rng), Color::new(0.5, 0.7, 1.0));
    }

    #[test]
    fn test_hit_is_attenuated() {
        // Camera inside a white-ish sphere: every path bounces until the
        // budget runs out, so the result is black.
        let world = GeometryList::new().with(Sphere::new(
            Vec3::ZERO,
            10.0,
            Arc::new(Lambertian::new(Color::splat(0.9))),
        ));
        let mut rng = StdRng::seed_from_u64(2);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(trace_color(&ray, &world, 4, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_encode_pixel() {
        let mut rgb = [0u8; 3];
        encode_pixel(Color::new(1.0, 0.25, -3.0), Quantization::Reference, &mut rgb);
        assert_eq!(rgb, [255, 128, 0]);

        let mut rgba = [0u8; 4];
        encode_pixel(Color::new(f64::NAN, 4.0, 0.0), Quantization::Unclamped256, &mut rgba);
        assert_eq!(rgba, [0, 255, 0, 255]);
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let world = GeometryList::new().with(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));
        let camera =
            Camera::new(CameraConfig::pinhole(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 90.0, 1.0)).unwrap();
        let image = ImageConfig::new(11, 11).with_quality(8, 5);
        let ctx = FrameContext {
            camera: &camera,
            world: &world,
            image: &image,
            quantization: Quantization::Reference,
        };
        let mut rng = StdRng::seed_from_u64(42);

        // Center pixel sees the sphere: darker than the sky behind it
        let center = ctx.render_pixel(5, 5, &mut rng);
        assert!(center.x < 0.5);

        // Top-left corner misses it and sees only sky
        let corner = ctx.render_pixel(0, 0, &mut rng);
        assert!(corner.x > 0.5);
        assert!((corner.z - 1.0).abs() < 1e-12);
    }
}
