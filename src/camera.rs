use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;

/// Largest pitch away from level, in radians. Looking straight along `up` has no view basis.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Which camera the frame is viewed through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Orbiting chase view. Never rotates with the aircraft.
    #[default]
    ThirdPerson,
    /// Cockpit view, rigidly attached to the aircraft's rotation.
    FirstPerson,
}

impl TryFrom<u8> for CameraMode {
    type Error = u8;

    /// Decodes the radio-button index used by the parameter UI (0/1).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CameraMode::ThirdPerson),
            1 => Ok(CameraMode::FirstPerson),
            other => Err(other),
        }
    }
}

/// One discrete camera nudge, as bound to the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CameraMove {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
}

/// A camera for 3D scenes.
///
/// Besides its eye frame it carries a `transform` that is reset and
/// recomposed each frame, the same way a model's parts are. The transform
/// moves the whole eye frame, which is how the cockpit view follows the
/// aircraft.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
    transform: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 45f32.to_radians(),
            near: 0.1,
            far: 300.0,
            transform: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Looks along `direction` (normalized here).
    pub fn looking_toward(mut self, direction: impl Into<Vec3>) -> Self {
        self.forward = direction.into().normalize_or(Vec3::NEG_Z);
        self
    }

    pub fn looking_at(mut self, target: impl Into<Vec3>) -> Self {
        self.forward = (target.into() - self.position).normalize_or(Vec3::NEG_Z);
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn reset_transform(&mut self) {
        self.transform = Mat4::IDENTITY;
    }

    /// Compute the right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// Eye position after the attached transform.
    pub fn eye(&self) -> Vec3 {
        self.transform.transform_point3(self.position)
    }

    /// World-to-view matrix for the transformed eye frame.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.transform.transform_vector3(self.forward);
        let up = self.transform.transform_vector3(self.up);
        Mat4::look_to_rh(self.eye(), forward.normalize_or(Vec3::NEG_Z), up.normalize_or(Vec3::Y))
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Applies one nudge: translations move `step` units, turns `turn_degrees`.
    pub fn nudge(&mut self, movement: CameraMove, step: f32, turn_degrees: f32) {
        let right = self.right();
        let turn = turn_degrees.to_radians();
        match movement {
            CameraMove::Forward => self.position += self.forward * step,
            CameraMove::Back => self.position -= self.forward * step,
            CameraMove::Left => self.position -= right * step,
            CameraMove::Right => self.position += right * step,
            CameraMove::Up => self.position += self.up * step,
            CameraMove::Down => self.position -= self.up * step,
            CameraMove::YawLeft => self.turn(Quat::from_axis_angle(self.up, turn)),
            CameraMove::YawRight => self.turn(Quat::from_axis_angle(self.up, -turn)),
            CameraMove::PitchUp => self.pitch(turn),
            CameraMove::PitchDown => self.pitch(-turn),
        }
    }

    /// Tilts `forward` toward `up`, keeping it within [`PITCH_LIMIT`] of level.
    fn pitch(&mut self, delta: f32) {
        let right = self.right();
        if right == Vec3::ZERO {
            return;
        }
        let up = self.up.normalize_or(Vec3::Y);
        let current = self.forward.dot(up).clamp(-1.0, 1.0).asin();
        let target = (current + delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.turn(Quat::from_axis_angle(right, target - current));
    }

    fn turn(&mut self, rotation: Quat) {
        self.forward = (rotation * self.forward).normalize_or(self.forward);
    }
}
