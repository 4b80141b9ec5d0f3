//! # Propwash
//!
//! **Per-frame transforms for a multi-part aircraft: attitude, turbulence and a spinning propeller.**
//!
//! Each frame reads the slider state once and produces one model matrix per
//! sub-geometry plus the camera uniforms. Rendering, windowing and the slider
//! UI live outside this crate; they consume [`FrameOutput`] through a
//! [`RenderSink`].
//!
//! ## Quick Start
//!
//! ```
//! use propwash::*;
//!
//! let config = SimConfig { seed: Some(42), ..SimConfig::default() };
//! let mut sim = Simulation::new(&config).unwrap();
//!
//! let nose = BoundingBox::new(Vec3::new(-1.0, -1.0, 1.9), Vec3::new(1.0, 1.0, 2.0));
//! let body = BoundingBox::new(Vec3::new(-0.4, -0.4, -2.0), Vec3::new(0.4, 0.4, 1.9));
//! let model = Model::new(vec![
//!     SubGeometry::new("propeller", nose),
//!     SubGeometry::new("fuselage", body),
//! ])
//! .unwrap();
//! sim.spawn_aircraft(model, Some(0)).unwrap();
//!
//! let mut clock = FixedStepClock::from_fps(60.0);
//! let state = FrameState {
//!     attitude: Attitude::new(15.0, -5.0, 30.0),
//!     scene_mode: SceneMode::Quaternion,
//!     ..FrameState::default()
//! };
//! let t = clock.elapsed();
//! let frame = sim.update(&state, t);
//! let draws: Vec<ModelUniforms> = frame.objects[0].uniforms();
//! assert_eq!(draws.len(), 2);
//! ```
//!
//! ## Pieces
//!
//! - **Attitude** ([`AttitudeComposer`]): Euler, quaternion or turbulent rotation from three angles.
//! - **Turbulence** ([`TurbulenceSignal`]): a bounded sum of random sinusoids, sampled by time.
//! - **Hierarchy** ([`place_model`]): the same rotation applied to every part about the model's centroid.
//! - **Propeller** ([`apply_propeller_spin`]): a time-driven spin about the propeller's own hub.
//! - **Typestate chain** ([`TransformChain`]): scale, rotate and recenter can only happen in order.

mod attitude;
mod camera;
mod clock;
mod config;
mod frame;
mod geometry;
mod hierarchy;
mod orbit_camera;
mod propeller;
mod transform;
mod turbulence;
mod uniforms;

pub use attitude::{Attitude, AttitudeComposer, Rotation, SceneMode, TurbulenceOffset};
pub use camera::{Camera, CameraMode, CameraMove};
pub use clock::{FixedStepClock, FrameClock, TimeSource};
pub use config::{ATTITUDE_LIMIT, CameraConfig, ConfigError, InitialState, NudgeConfig, SimConfig};
pub use frame::{CameraRig, FrameOutput, FrameState, ObjectFrame, RenderSink, Simulation};
pub use geometry::{BoundingBox, GeometryError, Model, Propeller, SubGeometry};
pub use hierarchy::{PlacedModel, apply_to_camera, apply_to_object, place_model};
pub use orbit_camera::{OrbitCamera, OrbitMode};
pub use propeller::{apply_propeller_spin, spin_angle};
pub use transform::{TransformChain, spin_matrix, stage};
pub use turbulence::{Harmonic, TurbulenceParams, TurbulenceSignal};
pub use uniforms::{CameraUniforms, ModelUniforms};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3};

// ECS storage for aircraft entities
pub use hecs::{Entity, World};
