//! JSON configuration for a simulation run.
//!
//! Every field has a default, so an empty object `{}` is a valid config:
//!
//! ```json
//! {
//!   "norm_size": 1.0,
//!   "seed": 7,
//!   "turbulence_roll": { "harmonic_count": 20, "min_amplitude": -0.6, "max_amplitude": 0.6 },
//!   "third_person": { "position": [1.0, 0.5, 1.0], "direction": [-1.0, -0.5, -1.0] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::attitude::{Attitude, SceneMode};
use crate::camera::{Camera, CameraMode};
use crate::orbit_camera::{OrbitCamera, OrbitMode};
use crate::turbulence::TurbulenceParams;

/// Largest absolute angle the attitude sliders accept, in degrees.
pub const ATTITUDE_LIMIT: f32 = 180.0;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where a camera starts and how it sees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::third_person()
    }
}

impl CameraConfig {
    /// Chase view off the aircraft's shoulder.
    pub fn third_person() -> Self {
        Self {
            position: [1.0, 0.5, 1.0],
            direction: [-1.0, -0.5, -1.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 300.0,
        }
    }

    /// Cockpit view looking down the nose.
    pub fn first_person() -> Self {
        Self {
            position: [0.0, 0.0, -1.5],
            direction: [0.0, 0.0, 1.0],
            ..Self::third_person()
        }
    }

    pub fn camera(&self) -> Camera {
        Camera::new()
            .at(self.position)
            .looking_toward(self.direction)
            .with_fov(self.fov_degrees)
            .clip_planes(self.near, self.far)
    }

    /// An orbit whose initial eye sits at `position`, looking along `direction`
    /// toward the point closest to the origin on that line.
    pub fn orbit(&self, mode: OrbitMode) -> OrbitCamera {
        let eye = glam::Vec3::from(self.position);
        let dir = glam::Vec3::from(self.direction).normalize_or(glam::Vec3::NEG_Z);
        let along = (-eye).dot(dir).max(0.0);
        OrbitCamera::from_eye(eye, eye + dir * along)
            .mode(mode)
            .fov(self.fov_degrees)
            .clip_planes(self.near, self.far)
    }
}

/// Slider values the run starts with.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InitialState {
    pub attitude: Attitude,
    pub scene_mode: SceneMode,
    pub camera_mode: CameraMode,
    pub propeller_rpm: f32,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            attitude: Attitude::LEVEL,
            scene_mode: SceneMode::Euler,
            camera_mode: CameraMode::ThirdPerson,
            propeller_rpm: 600.0,
        }
    }
}

/// Step sizes for keyboard-style camera nudges.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    pub step: f32,
    pub turn_degrees: f32,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            turn_degrees: 2.0,
        }
    }
}

/// Everything a [`Simulation`](crate::Simulation) needs besides geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Size the largest model extent is normalized to.
    pub norm_size: f32,
    /// Seed for both turbulence generators; entropy when absent.
    pub seed: Option<u64>,
    pub turbulence_pitch: TurbulenceParams,
    pub turbulence_roll: TurbulenceParams,
    /// Which sub-geometry of a loaded model is the propeller.
    pub propeller_index: usize,
    /// Upper end of the RPM slider.
    pub max_rpm: f32,
    pub third_person: CameraConfig,
    pub first_person: CameraConfig,
    pub orbit_mode: OrbitMode,
    pub aspect: f32,
    pub nudge: NudgeConfig,
    pub initial: InitialState,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            norm_size: 1.0,
            seed: None,
            turbulence_pitch: TurbulenceParams::pitch_default(),
            turbulence_roll: TurbulenceParams::roll_default(),
            propeller_index: 0,
            max_rpm: 20.0 * 60.0,
            third_person: CameraConfig::third_person(),
            first_person: CameraConfig::first_person(),
            orbit_mode: OrbitMode::Fixed,
            aspect: 16.0 / 9.0,
            nudge: NudgeConfig::default(),
            initial: InitialState::default(),
        }
    }
}

impl SimConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded config {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.norm_size.is_finite() && self.norm_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "norm_size must be positive (got {})",
                self.norm_size
            )));
        }
        if !(self.max_rpm.is_finite() && self.max_rpm >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_rpm must be non-negative (got {})",
                self.max_rpm
            )));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "aspect must be positive (got {})",
                self.aspect
            )));
        }
        for camera in [&self.third_person, &self.first_person] {
            if !(camera.near > 0.0 && camera.far > camera.near) {
                return Err(ConfigError::Invalid(format!(
                    "camera clip planes must satisfy 0 < near < far (got {}..{})",
                    camera.near, camera.far
                )));
            }
        }
        self.turbulence_pitch.validate()?;
        self.turbulence_roll.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let config: SimConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SimConfig = serde_json::from_str(
            r#"{
                "seed": 9,
                "turbulence_roll": { "harmonic_count": 3 },
                "initial": { "scene_mode": "turbulent", "attitude": { "pitch": 12.0 } },
                "orbit_mode": { "auto_rotate": { "speed": 0.5 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.turbulence_roll.harmonic_count, 3);
        // Fields missing inside a section come from TurbulenceParams::default().
        assert_eq!(config.turbulence_roll.max_amplitude, 0.2);
        assert_eq!(config.initial.scene_mode, SceneMode::Turbulent);
        assert_eq!(config.initial.attitude, Attitude::new(12.0, 0.0, 0.0));
        assert_eq!(config.orbit_mode, OrbitMode::AutoRotate { speed: 0.5 });
    }

    #[test]
    fn load_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "norm_size": 2.5, "propeller_index": 1 }}"#).unwrap();
        file.flush().unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.norm_size, 2.5);
        assert_eq!(config.propeller_index, 1);
    }

    #[test]
    fn load_reports_parse_and_validation_errors() {
        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "{{ not json").unwrap();
        broken.flush().unwrap();
        assert!(matches!(
            SimConfig::load(broken.path()),
            Err(ConfigError::Parse { .. })
        ));

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        write!(invalid, r#"{{ "norm_size": 0.0 }}"#).unwrap();
        invalid.flush().unwrap();
        assert!(matches!(
            SimConfig::load(invalid.path()),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn third_person_orbit_starts_at_configured_eye() {
        let orbit = CameraConfig::third_person().orbit(OrbitMode::Fixed);
        let camera = orbit.camera();
        assert!(
            camera
                .position
                .abs_diff_eq(glam::Vec3::new(1.0, 0.5, 1.0), 1e-4)
        );
        assert!(
            camera
                .forward
                .abs_diff_eq(glam::Vec3::new(-1.0, -0.5, -1.0).normalize(), 1e-4)
        );
    }
}
