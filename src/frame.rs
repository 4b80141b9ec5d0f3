//! Per-frame orchestration.
//!
//! The caller owns a [`FrameState`] (the live slider values) and a
//! [`Simulation`] (everything built once at startup). Each frame it reads the
//! clock once and calls [`Simulation::update`], which runs:
//!
//! 1. turbulence sampling (turbulent mode only),
//! 2. attitude composition,
//! 3. placement of every model and, in first-person mode, the cockpit camera,
//! 4. propeller spin,
//!
//! and returns the matrices the renderer consumes. Every frame starts from
//! scratch, so the previous frame's transforms are fully superseded.
//!
//! ```
//! use propwash::*;
//!
//! let config = SimConfig { seed: Some(1), ..SimConfig::default() };
//! let mut sim = Simulation::new(&config).unwrap();
//!
//! let model = Model::new(vec![
//!     SubGeometry::new("propeller", BoundingBox::new(Vec3::new(-1.0, -1.0, 1.9), Vec3::new(1.0, 1.0, 2.0))),
//!     SubGeometry::new("body", BoundingBox::new(Vec3::new(-0.5, -0.5, -2.0), Vec3::new(0.5, 0.5, 1.9))),
//! ]).unwrap();
//! sim.spawn_aircraft(model, Some(0)).unwrap();
//!
//! let state = FrameState {
//!     attitude: Attitude::new(10.0, 0.0, 0.0),
//!     scene_mode: SceneMode::Turbulent,
//!     camera_mode: CameraMode::FirstPerson,
//!     propeller_rpm: 600.0,
//! };
//! let frame = sim.update(&state, 0.5);
//! assert_eq!(frame.objects[0].transforms.len(), 2);
//! ```

use glam::Mat4;
use hecs::{Entity, World};

use crate::attitude::{Attitude, AttitudeComposer, Rotation, SceneMode, TurbulenceOffset};
use crate::camera::{Camera, CameraMode, CameraMove};
use crate::clock::TimeSource;
use crate::config::{ATTITUDE_LIMIT, ConfigError, InitialState, SimConfig};
use crate::geometry::{GeometryError, Model, Propeller};
use crate::hierarchy::{apply_to_camera, place_model};
use crate::orbit_camera::OrbitCamera;
use crate::propeller::apply_propeller_spin;
use crate::turbulence::TurbulenceSignal;
use crate::uniforms::{CameraUniforms, ModelUniforms};

/// Live UI state, read synchronously at the top of each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub attitude: Attitude,
    pub scene_mode: SceneMode,
    pub camera_mode: CameraMode,
    /// Revolutions per minute.
    pub propeller_rpm: f32,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::from(&InitialState::default())
    }
}

impl From<&InitialState> for FrameState {
    fn from(initial: &InitialState) -> Self {
        Self {
            attitude: initial.attitude,
            scene_mode: initial.scene_mode,
            camera_mode: initial.camera_mode,
            propeller_rpm: initial.propeller_rpm,
        }
    }
}

impl FrameState {
    /// Clamps slider values into their UI ranges: ±180° per axis, `0..=max_rpm`.
    pub fn clamped(self, max_rpm: f32) -> Self {
        let clamped = Self {
            attitude: self.attitude.clamped(ATTITUDE_LIMIT),
            propeller_rpm: self.propeller_rpm.clamp(0.0, max_rpm),
            ..self
        };
        if clamped != self {
            log::warn!("frame state {:?} clamped to {:?}", self, clamped);
        }
        clamped
    }
}

/// The two cameras and which one is live.
#[derive(Clone, Debug)]
pub struct CameraRig {
    /// Third-person view; never receives the aircraft rotation.
    pub orbit: OrbitCamera,
    /// First-person view; its transform follows the aircraft.
    pub cockpit: Camera,
}

impl CameraRig {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            orbit: config.third_person.orbit(config.orbit_mode),
            cockpit: config.first_person.camera(),
        }
    }

    pub fn active(&self, mode: CameraMode) -> Camera {
        match mode {
            CameraMode::ThirdPerson => self.orbit.camera(),
            CameraMode::FirstPerson => self.cockpit,
        }
    }

    /// Nudges the active camera. Third-person nudges orbit and zoom instead of translating.
    pub fn nudge(&mut self, mode: CameraMode, movement: CameraMove, step: f32, turn_degrees: f32) {
        match mode {
            CameraMode::FirstPerson => self.cockpit.nudge(movement, step, turn_degrees),
            CameraMode::ThirdPerson => {
                let turn = turn_degrees.to_radians();
                match movement {
                    CameraMove::Forward => self.orbit.zoom(step),
                    CameraMove::Back => self.orbit.zoom(-step),
                    CameraMove::Left | CameraMove::YawLeft => self.orbit.orbit(-turn, 0.0),
                    CameraMove::Right | CameraMove::YawRight => self.orbit.orbit(turn, 0.0),
                    CameraMove::Up | CameraMove::PitchUp => self.orbit.orbit(0.0, turn),
                    CameraMove::Down | CameraMove::PitchDown => self.orbit.orbit(0.0, -turn),
                }
            }
        }
    }
}

/// Transforms for one aircraft entity.
#[derive(Clone, Debug)]
pub struct ObjectFrame {
    pub entity: Entity,
    /// One matrix per sub-geometry, in part order.
    pub transforms: Vec<Mat4>,
}

impl ObjectFrame {
    pub fn uniforms(&self) -> Vec<ModelUniforms> {
        self.transforms.iter().copied().map(ModelUniforms::from).collect()
    }
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Seconds since start, as read at the top of the frame.
    pub elapsed: f64,
    /// The rigid-body rotation applied this frame.
    pub rotation: Mat4,
    /// Turbulence offsets that went into `rotation`, if any.
    pub turbulence: Option<TurbulenceOffset>,
    pub objects: Vec<ObjectFrame>,
    /// The active camera's transform after this frame.
    pub camera_transform: Mat4,
    pub camera: CameraUniforms,
}

/// Consumer of finished frames (the rendering collaborator).
pub trait RenderSink {
    fn submit(&mut self, frame: &FrameOutput);
}

/// Owns all state that lives longer than a frame.
pub struct Simulation {
    world: World,
    turbulence_pitch: TurbulenceSignal,
    turbulence_roll: TurbulenceSignal,
    cameras: CameraRig,
    norm_size: f32,
    aspect: f32,
    last_elapsed: Option<f64>,
    last_modes: Option<(SceneMode, CameraMode)>,
}

impl Simulation {
    /// Validates `config` and builds the turbulence generators from it, seeded when a seed is set.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (pitch, roll) = match config.seed {
            Some(seed) => (
                TurbulenceSignal::seeded(config.turbulence_pitch, seed),
                TurbulenceSignal::seeded(config.turbulence_roll, seed.wrapping_add(1)),
            ),
            None => (
                TurbulenceSignal::from_entropy(config.turbulence_pitch),
                TurbulenceSignal::from_entropy(config.turbulence_roll),
            ),
        };
        Ok(Self::with_turbulence(config, pitch, roll))
    }

    pub fn with_turbulence(
        config: &SimConfig,
        turbulence_pitch: TurbulenceSignal,
        turbulence_roll: TurbulenceSignal,
    ) -> Self {
        log::info!(
            "turbulence bounds: pitch ±{:.3}°, roll ±{:.3}°",
            turbulence_pitch.amplitude_bound(),
            turbulence_roll.amplitude_bound()
        );
        Self {
            world: World::new(),
            turbulence_pitch,
            turbulence_roll,
            cameras: CameraRig::from_config(config),
            norm_size: config.norm_size,
            aspect: config.aspect,
            last_elapsed: None,
            last_modes: None,
        }
    }

    /// Adds an aircraft. `propeller_index`, when given, is checked against the model here.
    pub fn spawn_aircraft(
        &mut self,
        model: Model,
        propeller_index: Option<usize>,
    ) -> Result<Entity, GeometryError> {
        let entity = match propeller_index {
            Some(index) => {
                let propeller = Propeller::attach(&model, index)?;
                self.world.spawn((model, propeller))
            }
            None => self.world.spawn((model,)),
        };
        log::info!("spawned aircraft {:?}", entity);
        Ok(entity)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn cameras(&self) -> &CameraRig {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraRig {
        &mut self.cameras
    }

    /// Both turbulence offsets at `elapsed`.
    pub fn turbulence_offset(&self, elapsed: f64) -> TurbulenceOffset {
        TurbulenceOffset {
            pitch: self.turbulence_pitch.sample(elapsed),
            roll: self.turbulence_roll.sample(elapsed),
        }
    }

    /// Computes every transform for the frame at `elapsed` seconds.
    pub fn update(&mut self, state: &FrameState, elapsed: f64) -> FrameOutput {
        let modes = (state.scene_mode, state.camera_mode);
        if self.last_modes != Some(modes) {
            log::debug!("scene {:?}, camera {:?}", state.scene_mode, state.camera_mode);
            self.last_modes = Some(modes);
        }

        let dt = self.last_elapsed.map_or(0.0, |last| (elapsed - last).max(0.0));
        self.last_elapsed = Some(elapsed);
        self.cameras.orbit.update(dt as f32);

        let turbulence = state
            .scene_mode
            .uses_turbulence()
            .then(|| self.turbulence_offset(elapsed));
        let rotation = AttitudeComposer::compose(state.scene_mode, state.attitude, turbulence);
        log::trace!(
            "t={:.3} attitude {:?} turbulence {:?}",
            elapsed,
            state.attitude,
            turbulence
        );

        let mut objects = self.place_objects(&rotation, state.propeller_rpm, elapsed);
        objects.sort_by_key(|o| o.entity.id());

        if state.camera_mode == CameraMode::FirstPerson {
            apply_to_camera(&mut self.cameras.cockpit, &rotation);
        }
        let camera = self.cameras.active(state.camera_mode);

        FrameOutput {
            elapsed,
            rotation: rotation.matrix(),
            turbulence,
            objects,
            camera_transform: camera.transform(),
            camera: CameraUniforms::new(&camera, self.aspect, elapsed as f32),
        }
    }

    fn place_objects(&mut self, rotation: &Rotation, rpm: f32, elapsed: f64) -> Vec<ObjectFrame> {
        let norm_size = self.norm_size;
        self.world
            .query_mut::<(&mut Model, Option<&Propeller>)>()
            .into_iter()
            .map(|(entity, (model, propeller))| {
                let mut placed = place_model(model, norm_size, rotation);
                if let Some(propeller) = propeller {
                    apply_propeller_spin(&mut placed, propeller.index, rpm, elapsed);
                }
                ObjectFrame {
                    entity,
                    transforms: placed.transforms(),
                }
            })
            .collect()
    }

    /// Reads `clock` once, updates, and hands the result to `sink`.
    pub fn render_frame<C, R>(&mut self, state: &FrameState, clock: &mut C, sink: &mut R) -> f64
    where
        C: TimeSource + ?Sized,
        R: RenderSink + ?Sized,
    {
        let elapsed = clock.elapsed();
        let frame = self.update(state, elapsed);
        sink.submit(&frame);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_respects_slider_ranges() {
        let state = FrameState {
            attitude: Attitude::new(270.0, -200.0, 10.0),
            propeller_rpm: 5000.0,
            ..FrameState::default()
        }
        .clamped(1200.0);
        assert_eq!(state.attitude, Attitude::new(180.0, -180.0, 10.0));
        assert_eq!(state.propeller_rpm, 1200.0);

        let negative = FrameState {
            propeller_rpm: -5.0,
            ..FrameState::default()
        };
        assert_eq!(negative.clamped(1200.0).propeller_rpm, 0.0);
    }

    #[test]
    fn third_person_nudges_orbit() {
        let mut rig = CameraRig::from_config(&SimConfig::default());
        let azimuth = rig.orbit.azimuth;
        let distance = rig.orbit.distance;

        rig.nudge(CameraMode::ThirdPerson, CameraMove::Right, 0.1, 10.0);
        assert!((rig.orbit.azimuth - azimuth - 10f32.to_radians()).abs() < 1e-6);

        rig.nudge(CameraMode::ThirdPerson, CameraMove::Forward, 0.1, 10.0);
        assert!((rig.orbit.distance - (distance - 0.1)).abs() < 1e-6);
    }

    #[test]
    fn first_person_nudges_cockpit() {
        let mut rig = CameraRig::from_config(&SimConfig::default());
        let before = rig.cockpit.position;
        rig.nudge(CameraMode::FirstPerson, CameraMove::Forward, 0.5, 0.0);
        let moved = rig.cockpit.position - before;
        assert!(moved.abs_diff_eq(glam::Vec3::new(0.0, 0.0, 0.5), 1e-6));
    }

    #[test]
    fn new_rejects_invalid_turbulence_ranges() {
        let mut config = SimConfig::default();
        config.turbulence_roll.min_amplitude = 1.0;
        config.turbulence_roll.max_amplitude = -1.0;
        assert!(matches!(
            Simulation::new(&config),
            Err(ConfigError::Invalid(_))
        ));

        let seeded = SimConfig {
            seed: Some(3),
            ..SimConfig::default()
        };
        assert!(Simulation::new(&seeded).is_ok());
    }

    #[test]
    fn turbulence_offset_is_zero_without_harmonics() {
        let config = SimConfig::default();
        let silent = TurbulenceSignal::from_harmonics(Vec::new());
        let sim = Simulation::with_turbulence(&config, silent.clone(), silent);
        assert_eq!(sim.turbulence_offset(3.0), TurbulenceOffset::default());
    }
}
