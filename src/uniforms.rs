//! GPU-ready uniform blocks handed to the rendering collaborator.
//!
//! Layouts match what a wgpu mesh pass binds: one [`CameraUniforms`] per frame
//! (group 0) and one [`ModelUniforms`] per sub-geometry draw (group 1).

use glam::Mat4;

use crate::camera::Camera;

/// Camera uniforms for 3D rendering.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// Combined view-projection matrix for transforming world positions to clip space.
    pub view_proj: [[f32; 4]; 4],
    /// View matrix (world to camera space transformation).
    pub view: [[f32; 4]; 4],
    /// Projection matrix (camera to clip space transformation).
    pub proj: [[f32; 4]; 4],
    /// Camera position in world space, useful for lighting calculations.
    pub camera_pos: [f32; 3],
    /// Elapsed time in seconds, for animated shaders.
    pub time: f32,
}

impl CameraUniforms {
    pub fn new(camera: &Camera, aspect: f32, time: f32) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix(aspect);
        let view_proj = proj * view;

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos: camera.eye().to_array(),
            time,
        }
    }
}

/// Per-draw model uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of model matrix) for correct normal transformation.
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4) -> Self {
        let normal_matrix = model.inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}

impl From<Mat4> for ModelUniforms {
    fn from(model: Mat4) -> Self {
        Self::new(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_sizes_are_gpu_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 208);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 128);
        assert_eq!(std::mem::size_of::<CameraUniforms>() % 16, 0);
    }

    #[test]
    fn normal_matrix_undoes_uniform_scale() {
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let uniforms = ModelUniforms::from(model);
        let normal = Mat4::from_cols_array_2d(&uniforms.normal_matrix);
        assert!(normal.abs_diff_eq(Mat4::from_scale(Vec3::splat(0.5)), 1e-6));
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 128);
    }

    #[test]
    fn camera_uniforms_carry_eye_and_time() {
        let camera = Camera::new().at([1.0, 2.0, 3.0]);
        let uniforms = CameraUniforms::new(&camera, 16.0 / 9.0, 1.5);
        assert_eq!(uniforms.camera_pos, [1.0, 2.0, 3.0]);
        assert_eq!(uniforms.time, 1.5);
        let view_proj = Mat4::from_cols_array_2d(&uniforms.view_proj);
        let expected = camera.projection_matrix(16.0 / 9.0) * camera.view_matrix();
        assert!(view_proj.abs_diff_eq(expected, 1e-6));
    }
}
