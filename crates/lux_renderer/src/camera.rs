//! Thin-lens camera for ray generation.

use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult};
use lux_math::random::random_in_unit_disk;
use lux_math::{Point, Ray, Vec3};
use rand::RngCore;

/// Camera parameters as they appear in a scene description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f64,
    pub aspect_ratio: f64,
    /// Distance from the lens to the plane of perfect focus
    pub focus_distance: f64,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f64,
    pub position: Point,
    pub look_at: Point,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 25.0,
            aspect_ratio: 16.0 / 9.0,
            focus_distance: 13.0,
            aperture: 0.25,
            position: Point::new(8.0, 2.5, 7.0),
            look_at: Point::new(0.0, 0.0, -10.0),
            up: Vec3::Y,
        }
    }
}

impl CameraConfig {
    /// Pinhole camera at `position` looking at `look_at`, focused at unit distance.
    pub fn pinhole(position: Point, look_at: Point, fov: f64, aspect_ratio: f64) -> Self {
        Self {
            fov,
            aspect_ratio,
            focus_distance: 1.0,
            aperture: 0.0,
            position,
            look_at,
            up: Vec3::Y,
        }
    }

    fn validate(&self) -> RenderResult<()> {
        if !self.fov.is_finite() || self.fov <= 0.0 || self.fov >= 180.0 {
            return Err(RenderError::InvalidCamera(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(RenderError::InvalidCamera(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if !self.focus_distance.is_finite() || self.focus_distance <= 0.0 {
            return Err(RenderError::InvalidCamera(format!(
                "focus distance must be positive, got {}",
                self.focus_distance
            )));
        }
        if !self.aperture.is_finite() || self.aperture < 0.0 {
            return Err(RenderError::InvalidCamera(format!(
                "aperture must be non-negative, got {}",
                self.aperture
            )));
        }
        Ok(())
    }
}

/// Camera with a precomputed orthonormal basis and viewport.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,

    // Basis: w points backwards (away from the look-at target)
    u: Vec3,
    v: Vec3,
    w: Vec3,

    lower_left_corner: Point,
    horizontal: Vec3,
    vertical: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Build a camera, rejecting degenerate or out-of-range parameters.
    pub fn new(config: CameraConfig) -> RenderResult<Self> {
        config.validate()?;

        let w = (config.position - config.look_at).try_normalize().ok_or_else(|| {
            RenderError::DegenerateCamera("position and look-at target coincide".to_string())
        })?;
        let u = config.up.cross(w).try_normalize().ok_or_else(|| {
            RenderError::DegenerateCamera("up vector is parallel to the view direction".to_string())
        })?;
        let v = w.cross(u);

        let viewport_height = 2.0 * (config.fov.to_radians() / 2.0).tan();
        let viewport_width = viewport_height * config.aspect_ratio;
        let focus = config.focus_distance;

        let horizontal = focus * viewport_width * u;
        let vertical = focus * viewport_height * v;
        let lower_left_corner = config.position - horizontal / 2.0 - vertical / 2.0 - focus * w;

        Ok(Self {
            config,
            u,
            v,
            w,
            lower_left_corner,
            horizontal,
            vertical,
            lens_radius: config.aperture / 2.0,
        })
    }

    /// Ray through viewport coordinates `s` (left to right) and `t` (bottom to top).
    ///
    /// With a non-zero aperture the origin is jittered across the lens disk;
    /// a pinhole camera draws nothing from `rng`.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = random_in_unit_disk(rng) * self.lens_radius;
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.config.position + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin)
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn position(&self) -> Point {
        self.config.position
    }

    /// Camera basis `(u, v, w)`: right, up, backwards.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}
