/// Linear algebra aliases and small helpers on top of nalgebra
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

pub type Vec2f = Vector2<f32>;
pub type Vec3f = Vector3<f32>;
pub type Vec4f = Vector4<f32>;
pub type Vec2i = Vector2<i32>;
pub type Mat4f = Matrix4<f32>;

pub const PI: f32 = std::f32::consts::PI;

/// Tolerance used for pole clamping and degenerate triangle rejection
pub const EPSILON: f32 = 1e-2;

/// Keep the first three components of a homogeneous vector
pub fn clip3(v: &Vec4f) -> Vec3f {
    v.xyz()
}

/// Keep the first two components, e.g. `(u, v)` out of an OBJ `(u, v, w)`
pub fn clip2(v: &Vec3f) -> Vec2f {
    v.xy()
}

/// Append a fourth component to a 3D vector
pub fn embed4(v: &Vec3f, w: f32) -> Vec4f {
    Vec4f::new(v.x, v.y, v.z, w)
}

pub fn to_vecf(v: &Vec2i) -> Vec2f {
    v.map(|c| c as f32)
}

/// Normalize a vector, treating a zero-length input as a caller bug.
pub fn normalized_or_panic(v: &Vec3f) -> Vec3f {
    let len = v.norm();
    assert!(
        len > f32::EPSILON && len.is_finite(),
        "cannot normalize vector of length {len}"
    );
    v / len
}

pub fn deg_to_rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}
