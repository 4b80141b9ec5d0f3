//! Ordered transform composition.
//!
//! Correctness depends on the order reset → scale → rotate → recenter →
//! propeller spin. [`TransformChain`] encodes the first four steps in its type,
//! so each stage only offers the steps that may follow it; the spin is only
//! reachable through a [`PlacedModel`](crate::PlacedModel):
//!
//! ```
//! use propwash::{Rotation, TransformChain, Vec3};
//!
//! let matrix = TransformChain::identity()
//!     .scale(1.0)
//!     .rotate(&Rotation::IDENTITY)
//!     .recenter(Vec3::ONE)
//!     .matrix();
//!
//! let origin = matrix.transform_point3(Vec3::ZERO);
//! assert!(origin.abs_diff_eq(Vec3::splat(-1.0), 1e-6));
//! ```
//!
//! Steps multiply from the right, so the last step in the chain is the first
//! one applied to a vertex: recentering moves the model's centroid to the
//! origin before it is rotated and scaled.

use std::marker::PhantomData;

use glam::{Mat4, Vec3};

use crate::attitude::Rotation;

/// Stage markers for [`TransformChain`].
pub mod stage {
    /// Freshly reset; may be scaled or rotated.
    #[derive(Debug)]
    pub struct Reset;
    /// Uniformly scaled; must be rotated next.
    #[derive(Debug)]
    pub struct Scaled;
    /// Rotated; may be recentered or finished.
    #[derive(Debug)]
    pub struct Rotated;
    /// Recentered about the object's centroid; complete.
    #[derive(Debug)]
    pub struct Placed;
}

/// A `Mat4` under construction, tagged with the last step applied.
#[derive(Debug)]
pub struct TransformChain<S> {
    matrix: Mat4,
    _stage: PhantomData<S>,
}

impl<S> TransformChain<S> {
    fn advance<T>(matrix: Mat4) -> TransformChain<T> {
        TransformChain {
            matrix,
            _stage: PhantomData,
        }
    }

    /// The matrix composed so far.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

impl TransformChain<stage::Reset> {
    /// Starts from the identity.
    pub fn identity() -> Self {
        Self::from_rest(Mat4::IDENTITY)
    }

    /// Starts from a load-time pre-transform.
    pub fn from_rest(rest: Mat4) -> Self {
        Self::advance(rest)
    }

    pub fn scale(self, factor: f32) -> TransformChain<stage::Scaled> {
        Self::advance(self.matrix * Mat4::from_scale(Vec3::splat(factor)))
    }

    /// Rotates without scaling (cameras).
    pub fn rotate(self, rotation: &Rotation) -> TransformChain<stage::Rotated> {
        Self::advance(rotation.apply_to(self.matrix))
    }
}

impl TransformChain<stage::Scaled> {
    pub fn rotate(self, rotation: &Rotation) -> TransformChain<stage::Rotated> {
        Self::advance(rotation.apply_to(self.matrix))
    }
}

impl TransformChain<stage::Rotated> {
    /// Moves `centroid` to the origin before any rotation or scale acts.
    pub fn recenter(self, centroid: Vec3) -> TransformChain<stage::Placed> {
        Self::advance(self.matrix * Mat4::from_translation(-centroid))
    }
}

/// `translate(+pivot) * Rz(degrees) * translate(-pivot)`.
pub fn spin_matrix(pivot: Vec3, degrees: f32) -> Mat4 {
    Mat4::from_translation(pivot)
        * Mat4::from_rotation_z(degrees.to_radians())
        * Mat4::from_translation(-pivot)
}
