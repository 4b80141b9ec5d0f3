use glam::Vec3;
use serde::Deserialize;

use crate::camera::Camera;

/// Controls how the orbit camera moves between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitMode {
    /// Stays where [`OrbitCamera::orbit`] and [`OrbitCamera::zoom`] put it.
    #[default]
    Fixed,
    /// Circles the target on its own.
    AutoRotate {
        /// Rotation speed in radians per second (positive = counterclockwise from above).
        speed: f32,
    },
}

/// Third-person camera that orbits the aircraft.
///
/// It produces a fresh [`Camera`] every frame and never receives the
/// aircraft's rotation.
///
/// # Example
/// ```
/// use propwash::{OrbitCamera, OrbitMode, Vec3};
///
/// let mut orbit = OrbitCamera::new()
///     .target(Vec3::ZERO)
///     .distance(2.0)
///     .mode(OrbitMode::AutoRotate { speed: 0.5 });
///
/// orbit.update(1.0 / 60.0);
/// let camera = orbit.camera();
/// assert!((camera.position.length() - 2.0).abs() < 1e-4);
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub mode: OrbitMode,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
}

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.3,
            fov: 45f32.to_radians(),
            near: 0.1,
            far: 300.0,
            mode: OrbitMode::Fixed,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the orbit so the camera sits at `eye`, looking at `target`.
    pub fn from_eye(eye: impl Into<Vec3>, target: impl Into<Vec3>) -> Self {
        let eye = eye.into();
        let target = target.into();
        let offset = eye - target;
        let distance = offset.length();
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();

        let mut orbit = Self::default().target(target);
        orbit.max_distance = orbit.max_distance.max(distance);
        orbit
            .distance(distance)
            .azimuth(offset.x.atan2(offset.z))
            .elevation(offset.y.atan2(horizontal))
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    pub fn mode(mut self, mode: OrbitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the initial azimuth (horizontal angle) in radians.
    pub fn azimuth(mut self, azimuth: f32) -> Self {
        self.azimuth = azimuth;
        self
    }

    /// Set the initial elevation (vertical angle) in radians.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self
    }

    /// Turns the orbit by the given angles in radians.
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth += d_azimuth;
        self.elevation = (self.elevation + d_elevation).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
    }

    /// Moves toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(self.min_distance, self.max_distance);
    }

    /// Advances auto-rotation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if let OrbitMode::AutoRotate { speed } = self.mode {
            self.azimuth += speed * dt;
        }
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        // Spherical to Cartesian conversion
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );

        let position = self.target + offset;

        Camera::new()
            .at(position)
            .looking_toward(self.target - position)
            .clip_planes(self.near, self.far)
            .with_fov(self.fov.to_degrees())
    }
}
