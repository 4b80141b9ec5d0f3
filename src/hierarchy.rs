//! Applies one rigid-body rotation to every part of a model, and to the cockpit camera.

use glam::{Mat4, Vec3};

use crate::attitude::Rotation;
use crate::camera::Camera;
use crate::geometry::Model;
use crate::transform::TransformChain;

/// A model whose parts have just been scaled, rotated and recentered this frame.
///
/// Only a placed model can receive a propeller spin, which keeps the spin
/// after the placement pass.
#[derive(Debug)]
pub struct PlacedModel<'a> {
    model: &'a mut Model,
}

impl<'a> PlacedModel<'a> {
    pub fn model(&self) -> &Model {
        &*self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut Model {
        &mut *self.model
    }

    /// Current transform of every part, in part order.
    pub fn transforms(&self) -> Vec<Mat4> {
        self.model.transforms()
    }
}

/// Positions every sub-geometry of `model` as one rigid unit.
///
/// Per part: reset to its rest transform, scale uniformly by `scale_factor`,
/// multiply in `rotation`, then translate by `-center` (the centroid of the
/// whole model's box, not the part's own) so the object turns about its own
/// middle.
pub fn apply_to_object<'a>(
    model: &'a mut Model,
    scale_factor: f32,
    rotation: &Rotation,
    center: Vec3,
) -> PlacedModel<'a> {
    for part in model.parts_mut() {
        part.transform = TransformChain::from_rest(part.rest)
            .scale(scale_factor)
            .rotate(rotation)
            .recenter(center)
            .matrix();
    }
    PlacedModel { model }
}

/// Places `model` using its own aggregate box and the normalizing scale for `norm_size`.
///
/// `norm_size / max_extent` is undefined for degenerate boxes; [`Model::new`]
/// refuses those, so nothing is checked here.
pub fn place_model<'a>(model: &'a mut Model, norm_size: f32, rotation: &Rotation) -> PlacedModel<'a> {
    let scale = model.normalizing_scale(norm_size);
    let center = model.bounds().centroid();
    apply_to_object(model, scale, rotation, center)
}

/// Gives the camera the same rotation as the tracked object: reset, then rotate.
pub fn apply_to_camera(camera: &mut Camera, rotation: &Rotation) {
    camera.reset_transform();
    let transform = TransformChain::from_rest(camera.transform())
        .rotate(rotation)
        .matrix();
    camera.set_transform(transform);
}
