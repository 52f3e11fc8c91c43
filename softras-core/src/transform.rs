/// View, projection and viewport matrix builders
use crate::math::{normalized_or_panic, Mat4f, Vec3f};

/// Stateless builder for the pipeline's transformation matrices
pub struct Transform;

impl Transform {
    /// Map NDC `[-1, 1]^2` onto pixel space `[0, w] x [0, h]`.
    pub fn viewport_matrix(width: f32, height: f32) -> Mat4f {
        Mat4f::new(
            width / 2.0, 0.0, 0.0, width / 2.0,
            0.0, height / 2.0, 0.0, height / 2.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Symmetric-frustum perspective projection.
    ///
    /// `near` and `far` are z coordinates in camera space, so both are
    /// negative. The last row copies camera-space z into `w`; after the
    /// homogeneous divide, points inside the frustum land in `[-1, 1]` on all
    /// three axes with NDC z growing towards the viewer (`near -> 1`,
    /// `far -> -1`).
    pub fn projection_matrix(near: f32, far: f32, fov_y: f32, aspect_ratio: f32) -> Mat4f {
        let top = -near * (fov_y / 2.0).tan();
        let right = aspect_ratio * top;
        Mat4f::new(
            near / right, 0.0, 0.0, 0.0,
            0.0, near / top, 0.0, 0.0,
            0.0, 0.0, (near + far) / (near - far), -2.0 * near * far / (near - far),
            0.0, 0.0, 1.0, 0.0,
        )
    }

    /// Right-handed look-at matrix; the camera looks down its local -Z.
    pub fn view_matrix(target: &Vec3f, position: &Vec3f, up: &Vec3f) -> Mat4f {
        let z = normalized_or_panic(&(target - position));
        let x = normalized_or_panic(&z.cross(up));
        let y = normalized_or_panic(&x.cross(&z));

        let rotation = Mat4f::new(
            x.x, x.y, x.z, 0.0,
            y.x, y.y, y.z, 0.0,
            -z.x, -z.y, -z.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        rotation * Self::translation_matrix(-position.x, -position.y, -position.z)
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Mat4f {
        Mat4f::new_translation(&Vec3f::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Mat4f {
        Mat4f::new_nonuniform_scaling(&Vec3f::new(sx, sy, sz))
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model: &Mat4f, view: &Mat4f, projection: &Mat4f) -> Mat4f {
        projection * view * model
    }
}
