//! Attitude composition: turning pitch/roll/yaw sliders into one rigid-body rotation.
//!
//! Three [`SceneMode`]s share the same inputs but build the rotation differently:
//!
//! - [`SceneMode::Euler`] multiplies three axis rotations in yaw → pitch → roll order.
//! - [`SceneMode::Quaternion`] folds the angles into one quaternion first.
//! - [`SceneMode::Turbulent`] does the same as `Quaternion` after adding the
//!   turbulence offsets to pitch and roll. Yaw is never perturbed.
//!
//! Switching modes is stateless: nothing is carried from one frame to the next.

use glam::{Mat4, Quat};
use serde::Deserialize;

/// Orientation of a rigid body in degrees. UI range is `[-180, 180]` per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Attitude {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl Attitude {
    pub const LEVEL: Self = Self {
        pitch: 0.0,
        roll: 0.0,
        yaw: 0.0,
    };

    pub fn new(pitch: f32, roll: f32, yaw: f32) -> Self {
        Self { pitch, roll, yaw }
    }

    /// Clamps every axis into `[-limit, limit]`.
    pub fn clamped(self, limit: f32) -> Self {
        Self {
            pitch: self.pitch.clamp(-limit, limit),
            roll: self.roll.clamp(-limit, limit),
            yaw: self.yaw.clamp(-limit, limit),
        }
    }
}

/// Which attitude algorithm runs this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    /// Three independent axis rotations.
    #[default]
    Euler,
    /// One quaternion built from the Euler vector.
    Quaternion,
    /// Quaternion mode with synthetic turbulence on pitch and roll.
    Turbulent,
}

impl SceneMode {
    pub fn uses_turbulence(self) -> bool {
        matches!(self, SceneMode::Turbulent)
    }
}

impl TryFrom<u8> for SceneMode {
    type Error = u8;

    /// Decodes the radio-button index used by the parameter UI (0/1/2).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SceneMode::Euler),
            1 => Ok(SceneMode::Quaternion),
            2 => Ok(SceneMode::Turbulent),
            other => Err(other),
        }
    }
}

/// Turbulence offsets in degrees, sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TurbulenceOffset {
    pub pitch: f32,
    pub roll: f32,
}

/// A rigid-body rotation ready to be multiplied into a transform chain.
///
/// Euler rotations keep their three angles so they can be applied as three
/// separate multiplications; composed rotations are a single unit quaternion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rotation {
    /// Angles in radians, applied yaw (Y) then pitch (X) then roll (Z).
    Euler { yaw: f32, pitch: f32, roll: f32 },
    /// Single orientation.
    Composed(Quat),
}

impl Rotation {
    pub const IDENTITY: Self = Rotation::Composed(Quat::IDENTITY);

    /// The three axis rotations in the order they are multiplied in.
    pub fn euler_steps(yaw: f32, pitch: f32, roll: f32) -> [Mat4; 3] {
        [
            Mat4::from_rotation_y(yaw),
            Mat4::from_rotation_x(pitch),
            Mat4::from_rotation_z(roll),
        ]
    }

    /// Multiplies this rotation onto `matrix` from the right.
    pub fn apply_to(&self, matrix: Mat4) -> Mat4 {
        match *self {
            Rotation::Euler { yaw, pitch, roll } => Self::euler_steps(yaw, pitch, roll)
                .into_iter()
                .fold(matrix, |acc, step| acc * step),
            Rotation::Composed(q) => matrix * Mat4::from_quat(q),
        }
    }

    /// The rotation as a 4×4 homogeneous matrix.
    pub fn matrix(&self) -> Mat4 {
        self.apply_to(Mat4::IDENTITY)
    }
}

/// Builds the per-frame [`Rotation`] for a given [`SceneMode`].
pub struct AttitudeComposer;

impl AttitudeComposer {
    /// Composes `attitude` under `mode`.
    ///
    /// `turbulence` is only read in [`SceneMode::Turbulent`]; `None` there
    /// behaves like zero offsets.
    pub fn compose(
        mode: SceneMode,
        attitude: Attitude,
        turbulence: Option<TurbulenceOffset>,
    ) -> Rotation {
        match mode {
            SceneMode::Euler => Rotation::Euler {
                yaw: attitude.yaw.to_radians(),
                pitch: attitude.pitch.to_radians(),
                roll: attitude.roll.to_radians(),
            },
            SceneMode::Quaternion => Rotation::Composed(Self::quat_from_euler(attitude)),
            SceneMode::Turbulent => {
                let offset = turbulence.unwrap_or_default();
                let perturbed = Attitude {
                    pitch: attitude.pitch + offset.pitch,
                    roll: attitude.roll + offset.roll,
                    yaw: attitude.yaw,
                };
                Rotation::Composed(Self::quat_from_euler(perturbed))
            }
        }
    }

    /// Quaternion for the Euler vector `{pitch, yaw, roll}` (degrees).
    ///
    /// Equivalent to rotating about X by pitch, then Y by yaw, then Z by roll
    /// in the fixed frame, i.e. `Qz(roll) * Qy(yaw) * Qx(pitch)`.
    pub fn quat_from_euler(attitude: Attitude) -> Quat {
        let pitch = Quat::from_rotation_x(attitude.pitch.to_radians());
        let yaw = Quat::from_rotation_y(attitude.yaw.to_radians());
        let roll = Quat::from_rotation_z(attitude.roll.to_radians());
        (roll * yaw * pitch).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const EPSILON: f32 = 1e-5;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, EPSILON), "{a:?} != {b:?}");
    }

    #[test]
    fn level_attitude_is_identity_in_every_mode() {
        for mode in [SceneMode::Euler, SceneMode::Quaternion, SceneMode::Turbulent] {
            let rotation = AttitudeComposer::compose(mode, Attitude::LEVEL, None);
            assert_mat_eq(rotation.matrix(), Mat4::IDENTITY);
        }
        let zero = Some(TurbulenceOffset::default());
        let rotation = AttitudeComposer::compose(SceneMode::Turbulent, Attitude::LEVEL, zero);
        assert_mat_eq(rotation.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn single_axis_agrees_between_euler_and_quaternion() {
        for angle in [-170.0, -90.0, -12.5, 30.0, 90.0, 179.0] {
            for attitude in [
                Attitude::new(angle, 0.0, 0.0),
                Attitude::new(0.0, angle, 0.0),
                Attitude::new(0.0, 0.0, angle),
            ] {
                let euler = AttitudeComposer::compose(SceneMode::Euler, attitude, None);
                let quat = AttitudeComposer::compose(SceneMode::Quaternion, attitude, None);
                assert_mat_eq(euler.matrix(), quat.matrix());
            }
        }
    }

    #[test]
    fn pitch_up_rotates_y_onto_z() {
        let rotation =
            AttitudeComposer::compose(SceneMode::Euler, Attitude::new(90.0, 0.0, 0.0), None);
        let up = rotation.matrix().transform_vector3(Vec3::Y);
        assert!(up.abs_diff_eq(Vec3::Z, EPSILON), "{up:?}");
    }

    #[test]
    fn euler_order_is_yaw_pitch_roll() {
        let attitude = Attitude::new(30.0, 45.0, 60.0);
        let rotation = AttitudeComposer::compose(SceneMode::Euler, attitude, None);
        let expected = Mat4::from_rotation_y(60f32.to_radians())
            * Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_rotation_z(45f32.to_radians());
        assert_mat_eq(rotation.matrix(), expected);

        let swapped = Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_rotation_y(60f32.to_radians())
            * Mat4::from_rotation_z(45f32.to_radians());
        assert!(!rotation.matrix().abs_diff_eq(swapped, 1e-3));
    }

    #[test]
    fn quaternion_order_is_roll_yaw_pitch() {
        let attitude = Attitude::new(20.0, -35.0, 50.0);
        let rotation = AttitudeComposer::compose(SceneMode::Quaternion, attitude, None);
        let expected = Mat4::from_rotation_z((-35f32).to_radians())
            * Mat4::from_rotation_y(50f32.to_radians())
            * Mat4::from_rotation_x(20f32.to_radians());
        assert_mat_eq(rotation.matrix(), expected);
    }

    #[test]
    fn turbulence_perturbs_pitch_and_roll_only() {
        let attitude = Attitude::new(10.0, 5.0, 40.0);
        let offset = TurbulenceOffset {
            pitch: 1.5,
            roll: -0.75,
        };
        let turbulent = AttitudeComposer::compose(SceneMode::Turbulent, attitude, Some(offset));
        let expected = AttitudeComposer::compose(
            SceneMode::Quaternion,
            Attitude::new(11.5, 4.25, 40.0),
            None,
        );
        assert_mat_eq(turbulent.matrix(), expected.matrix());

        // Offsets are ignored outside turbulent mode.
        let quat = AttitudeComposer::compose(SceneMode::Quaternion, attitude, Some(offset));
        let plain = AttitudeComposer::compose(SceneMode::Quaternion, attitude, None);
        assert_eq!(quat, plain);
    }

    #[test]
    fn composed_rotation_is_orthonormal() {
        let attitude = Attitude::new(123.0, -77.0, 161.0);
        for mode in [SceneMode::Euler, SceneMode::Quaternion] {
            let m = AttitudeComposer::compose(mode, attitude, None).matrix();
            let product = m * m.transpose();
            assert_mat_eq(product, Mat4::IDENTITY);
            assert!((m.determinant() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn scene_mode_from_ui_index() {
        assert_eq!(SceneMode::try_from(0), Ok(SceneMode::Euler));
        assert_eq!(SceneMode::try_from(1), Ok(SceneMode::Quaternion));
        assert_eq!(SceneMode::try_from(2), Ok(SceneMode::Turbulent));
        assert_eq!(SceneMode::try_from(3), Err(3));
    }

    #[test]
    fn attitude_clamps_to_slider_range() {
        let attitude = Attitude::new(200.0, -181.0, 90.0).clamped(180.0);
        assert_eq!(attitude, Attitude::new(180.0, -180.0, 90.0));
    }
}
