/// Two-stage shading contract invoked by the rasterizer
use crate::frame_buffer::FrameColor;
use crate::math::{embed4, Mat4f, Vec2f, Vec3f, Vec4f};

/// Attributes of one mesh corner, in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexContext {
    pub pos: Vec3f,
    pub normal: Vec3f,
    pub uv: Vec2f,
}

/// Output of the vertex stage and input of the fragment stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentContext {
    /// Homogeneous position before the perspective divide
    pub clip_pos: Vec4f,
    pub world_pos: Vec3f,
    pub world_normal: Vec3f,
    pub uv: Vec2f,
    /// Light alignment of the face, filled in by the rasterizer
    pub intensity: f32,
}

impl Default for FragmentContext {
    fn default() -> Self {
        Self {
            clip_pos: Vec4f::zeros(),
            world_pos: Vec3f::zeros(),
            world_normal: Vec3f::zeros(),
            uv: Vec2f::zeros(),
            intensity: 0.0,
        }
    }
}

/// Per-frame values the host sets before invoking the rasterizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub model: Mat4f,
    pub view: Mat4f,
    pub projection: Mat4f,
    pub viewport: Mat4f,
    pub light_dir: Vec3f,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model: Mat4f::identity(),
            view: Mat4f::identity(),
            projection: Mat4f::identity(),
            viewport: Mat4f::identity(),
            light_dir: Vec3f::new(0.0, 0.0, 1.0),
        }
    }
}

pub trait Shader {
    fn uniforms(&self) -> &Uniforms;

    fn uniforms_mut(&mut self) -> &mut Uniforms;

    /// Transform one corner to clip space and pass attributes through.
    fn vertex(&self, vctx: &VertexContext) -> FragmentContext;

    /// Shade one covered pixel; `None` discards it, leaving color and depth
    /// untouched.
    fn fragment(&self, fctx: &FragmentContext) -> Option<FrameColor>;
}

/// One grey level per face from the light alignment
#[derive(Debug, Clone, Default)]
pub struct FlatShader {
    uniforms: Uniforms,
}

impl FlatShader {
    /// Pushes geometry away from the camera between the view and projection
    /// transforms to keep it off the near plane
    pub const Z_BIAS: f32 = 1.1;

    pub fn new(uniforms: Uniforms) -> Self {
        Self { uniforms }
    }
}

impl Shader for FlatShader {
    fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    fn vertex(&self, vctx: &VertexContext) -> FragmentContext {
        let u = &self.uniforms;
        let mut eye = u.view * u.model * embed4(&vctx.pos, 1.0);
        eye.z -= Self::Z_BIAS;

        FragmentContext {
            clip_pos: u.projection * eye,
            world_pos: vctx.pos,
            world_normal: vctx.normal,
            uv: vctx.uv,
            intensity: 0.0,
        }
    }

    fn fragment(&self, fctx: &FragmentContext) -> Option<FrameColor> {
        // Faces turned away from the light are not drawn at all
        if fctx.intensity < 0.0 {
            return None;
        }
        // Saturating cast: intensities above 1 clip to white
        let level = (fctx.intensity * 255.0) as u8;
        Some(FrameColor::rgb(level, level, level))
    }
}
